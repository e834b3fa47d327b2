use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_ENV: &str = "DRILLBIT_CONFIG";

/// Application settings, read from a TOML file. Every field is optional.
///
/// ```toml
/// title = "Drillbit"
/// width = 1400.0
/// height = 900.0
/// plot_height = 260.0
/// dark_plot = true
/// marker_radius = 5.0
/// pending_marker_color = [255, 255, 255]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
    /// Initial height of the docked drill plot.
    pub plot_height: f32,
    pub dark_plot: bool,
    pub marker_radius: f32,
    /// Fill of a clicked point before its line is drawn.
    pub pending_marker_color: [u8; 3],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Drillbit – Volume Driller".to_string(),
            width: 1400.0,
            height: 900.0,
            plot_height: 260.0,
            dark_plot: true,
            marker_radius: 5.0,
            pending_marker_color: [255, 255, 255],
        }
    }
}

impl AppConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load from `explicit`, else from `$DRILLBIT_CONFIG`, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        match path {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::from_path(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn pending_color(&self) -> Color32 {
        let [r, g, b] = self.pending_marker_color;
        Color32::from_rgb(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drillbit.toml");
        std::fs::write(&path, "plot_height = 120.0\npending_marker_color = [0, 0, 0]\n").unwrap();

        let config = AppConfig::from_path(&path).unwrap();
        assert_eq!(config.plot_height, 120.0);
        assert_eq!(config.pending_color(), Color32::BLACK);
        assert_eq!(config.title, AppConfig::default().title);
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "width = \"wide\"").unwrap();
        assert!(AppConfig::from_path(&path).is_err());
    }
}
