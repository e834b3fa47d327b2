use std::collections::BTreeMap;

use eframe::egui::Color32;

use super::limits::axis_limits;
use crate::color::LineColors;
use crate::error::DrillError;
use crate::viewer::layers::LayerId;
use crate::viewer::points::{PointId, PointsLayer};

// ---------------------------------------------------------------------------
// Drill plot state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId(pub usize);

/// The marker a line was drilled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerKey {
    pub layer: LayerId,
    pub point: PointId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrillLine {
    pub id: LineId,
    pub marker: MarkerKey,
    /// Legend / export label, e.g. `"cells_Drillbit #3"`.
    pub label: String,
    pub values: Vec<f64>,
    pub color: Color32,
}

impl DrillLine {
    /// Smallest and largest finite value, `None` if there are none.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Axis bounds the plot should jump to on its next redraw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotLimits {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

/// Append-only collection of drill lines sharing one x-axis.
///
/// Lines outlive drilling sessions; nothing ever removes them.
#[derive(Debug, Default)]
pub struct PlotState {
    xs: Vec<f64>,
    lines: Vec<DrillLine>,
    by_marker: BTreeMap<MarkerKey, LineId>,
    limits: Option<PlotLimits>,
    redraw_pending: bool,
    colors: LineColors,
}

impl PlotState {
    pub fn lines(&self) -> &[DrillLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Shared x-coordinates (slice indices). Empty until the first line.
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn limits(&self) -> Option<PlotLimits> {
        self.limits
    }

    pub fn line_for(&self, marker: MarkerKey) -> Option<&DrillLine> {
        let id = self.by_marker.get(&marker)?;
        self.lines.get(id.0)
    }

    /// Add the line drilled at `point` of the `markers` layer, then colour
    /// that marker like the line and reset the layer's pending colour.
    pub fn add_line(
        &mut self,
        layer: LayerId,
        point: PointId,
        values: Vec<f64>,
        markers: &mut PointsLayer,
        pending_color: Color32,
    ) -> Result<LineId, DrillError> {
        if values.is_empty() {
            return Err(DrillError::invalid("cannot plot an empty drill line"));
        }
        let marker = MarkerKey { layer, point };
        if self.by_marker.contains_key(&marker) {
            return Err(DrillError::invalid(format!(
                "point {point} of layer {layer} already has a line"
            )));
        }
        if self.lines.is_empty() {
            self.xs = (0..values.len()).map(|i| i as f64).collect();
        } else if values.len() != self.xs.len() {
            return Err(DrillError::LengthMismatch {
                expected: self.xs.len(),
                got: values.len(),
            });
        }

        let y = {
            let mut all_ys: Vec<&[f64]> = self.lines.iter().map(|l| l.values.as_slice()).collect();
            all_ys.push(&values);
            axis_limits(&all_ys)?
        };
        let x = (0.0, (self.xs.len() - 1) as f64);

        let id = LineId(self.lines.len());
        let color = self.colors.next_color();
        self.lines.push(DrillLine {
            id,
            marker,
            label: format!("{} {point}", markers.name),
            values,
            color,
        });
        self.by_marker.insert(marker, id);
        self.limits = Some(PlotLimits { x, y });
        self.redraw_pending = true;

        if !markers.set_face_color(point, color) {
            log::warn!(
                "point {point} vanished from '{}' before it could be coloured",
                markers.name
            );
        }
        markers.current_face_color = pending_color;

        log::debug!("added drill line {} ({} values) for point {point}", id.0, self.xs.len());
        Ok(id)
    }

    /// Limits to apply on the next frame, handed out once per change so the
    /// user can still pan and zoom in between.
    pub fn take_pending_limits(&mut self) -> Option<PlotLimits> {
        if std::mem::take(&mut self.redraw_pending) {
            self.limits
        } else {
            None
        }
    }
}
