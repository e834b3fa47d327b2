use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, ensure};

use crate::drill::plot_state::PlotState;

/// Write every drill line as one CSV column next to an `index` column.
///
/// ```text
/// index,vol_Drillbit #0,vol_Drillbit #1
/// 0,0.12,0.80
/// 1,0.15,0.77
/// ```
pub fn write_lines_csv<W: Write>(plot: &PlotState, writer: W) -> Result<()> {
    ensure!(!plot.is_empty(), "there are no drill lines to export");

    let mut csv = csv::Writer::from_writer(writer);
    let mut header = vec!["index".to_string()];
    header.extend(plot.lines().iter().map(|line| line.label.clone()));
    csv.write_record(&header).context("writing CSV header")?;

    for (row, x) in plot.xs().iter().enumerate() {
        let mut record = vec![x.to_string()];
        record.extend(plot.lines().iter().map(|line| line.values[row].to_string()));
        csv.write_record(&record)
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    csv.flush().context("flushing CSV")?;
    Ok(())
}

pub fn export_lines(plot: &PlotState, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_lines_csv(plot, file)?;
    log::info!("Exported {} drill lines to {}", plot.lines().len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::layers::LayerId;
    use crate::viewer::points::PointsLayer;
    use eframe::egui::Color32;

    #[test]
    fn one_column_per_line() {
        let mut markers = PointsLayer::new("vol_Drillbit", 3);
        let a = markers.add(vec![0.0, 1.0, 1.0]);
        let b = markers.add(vec![0.0, 2.0, 2.0]);
        let mut plot = PlotState::default();
        plot.add_line(LayerId(1), a, vec![0.5, 1.5], &mut markers, Color32::WHITE)
            .unwrap();
        plot.add_line(LayerId(1), b, vec![2.0, 3.0], &mut markers, Color32::WHITE)
            .unwrap();

        let mut out = Vec::new();
        write_lines_csv(&plot, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "index,vol_Drillbit #0,vol_Drillbit #1\n0,0.5,2\n1,1.5,3\n"
        );
    }

    #[test]
    fn empty_plot_is_refused() {
        let mut out = Vec::new();
        assert!(write_lines_csv(&PlotState::default(), &mut out).is_err());
    }

    #[test]
    fn export_writes_file() {
        let mut markers = PointsLayer::new("p", 3);
        let a = markers.add(vec![0.0, 0.0, 0.0]);
        let mut plot = PlotState::default();
        plot.add_line(LayerId(0), a, vec![1.0], &mut markers, Color32::WHITE)
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.csv");
        export_lines(&plot, &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("index,p #0"));
    }
}
