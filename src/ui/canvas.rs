use eframe::egui::{
    self, Color32, ColorImage, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions, Ui,
};
use ndarray::ArrayView2;

use crate::drill::plot_state::MarkerKey;
use crate::state::AppState;
use crate::viewer::dims::SliceState;
use crate::viewer::layers::{Layer, LayerId};
use crate::viewer::points::{PointId, PointsMode};

// ---------------------------------------------------------------------------
// Image canvas (central panel)
// ---------------------------------------------------------------------------

/// Which plane the cached texture shows.
#[derive(Debug, Clone, PartialEq)]
struct PlaneKey {
    layer: LayerId,
    slice: SliceState,
}

/// Renders the displayed plane of the picked image, draws point markers and
/// turns clicks into points.
#[derive(Default)]
pub struct ImageCanvas {
    texture: Option<(PlaneKey, TextureHandle)>,
    /// Point of the active layer being dragged in select mode.
    dragging: Option<PointId>,
}

/// Maps between data (row, col) and screen positions for one frame.
struct Placement {
    rect: Rect,
    scale: f32,
}

impl Placement {
    fn to_screen(&self, row: f64, col: f64) -> Pos2 {
        self.rect.min + egui::vec2(col as f32 * self.scale, row as f32 * self.scale)
    }

    fn to_data(&self, pos: Pos2) -> (f64, f64) {
        let local = pos - self.rect.min;
        ((local.y / self.scale) as f64, (local.x / self.scale) as f64)
    }
}

impl ImageCanvas {
    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        let Some(image_id) = state.displayed_image() else {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open an image to start drilling  (File → Open…)");
            });
            return;
        };

        let (rows, cols) = match self.prepare_texture(ui, state, image_id) {
            Ok(dim) => dim,
            Err(message) => {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.label(egui::RichText::new(message).color(Color32::RED));
                });
                return;
            }
        };
        let Some((_, texture)) = &self.texture else {
            return;
        };

        let available = ui.available_size();
        let scale = (available.x / cols as f32)
            .min(available.y / rows as f32)
            .max(f32::EPSILON);
        let (area, response) = ui.allocate_exact_size(available, Sense::click_and_drag());
        let placement = Placement {
            rect: Rect::from_center_size(
                area.center(),
                egui::vec2(cols as f32 * scale, rows as f32 * scale),
            ),
            scale,
        };

        let painter = ui.painter_at(area);
        painter.image(
            texture.id(),
            placement.rect,
            Rect::from_min_max(Pos2::ZERO, egui::pos2(1.0, 1.0)),
            Color32::WHITE,
        );
        draw_markers(&painter, state, &placement);

        let hovered = response.hover_pos();
        if let Some(text) = hovered.and_then(|pos| marker_tooltip(state, &placement, pos)) {
            response.clone().on_hover_text(text);
        }

        let pointer = response.interact_pointer_pos();
        if let (true, Some(pos)) = (response.drag_started(), pointer) {
            self.dragging = grab_point(state, &placement, pos);
        }
        if let Some(id) = self.dragging {
            if let (true, Some(pos)) = (response.dragged(), pointer) {
                let (row, col) = placement.to_data(pos);
                move_point(state, id, row, col);
            }
            if response.drag_stopped() {
                self.dragging = None;
            }
            return;
        }

        let Some(pos) = pointer else {
            return;
        };
        if response.clicked() && placement.rect.contains(pos) {
            let (row, col) = placement.to_data(pos);
            if add_point(state, row, col) {
                ui.ctx().request_repaint();
            }
        } else if response.secondary_clicked() {
            remove_point_near(state, &placement, pos);
        }
    }

    /// Upload the current plane unless the cached texture already shows it.
    fn prepare_texture(
        &mut self,
        ui: &Ui,
        state: &AppState,
        image_id: LayerId,
    ) -> Result<(usize, usize), String> {
        let image = state
            .viewer
            .layers
            .image(image_id)
            .map_err(|e| e.to_string())?;
        let slice = state
            .viewer
            .dims
            .for_layer(image.ndim())
            .map_err(|e| e.to_string())?;
        let plane = image.slice_2d(&slice).map_err(|e| e.to_string())?;
        let dim = plane.dim();

        let key = PlaneKey {
            layer: image_id,
            slice,
        };
        if self.texture.as_ref().map(|(k, _)| k) != Some(&key) {
            let pixels = plane_to_color_image(plane, image.contrast_limits);
            let handle = ui
                .ctx()
                .load_texture(format!("plane_{image_id}"), pixels, TextureOptions::NEAREST);
            self.texture = Some((key, handle));
        }
        Ok(dim)
    }
}

/// Grayscale rendering of a plane, `contrast_limits` mapped to black..white.
pub fn plane_to_color_image(
    plane: ArrayView2<'_, f64>,
    contrast_limits: (f64, f64),
) -> ColorImage {
    let (rows, cols) = plane.dim();
    let (lo, hi) = contrast_limits;
    let span = (hi - lo).max(f64::EPSILON);
    let pixels: Vec<u8> = plane
        .iter()
        .map(|&v| {
            if v.is_finite() {
                (((v - lo) / span).clamp(0.0, 1.0) * 255.0).round() as u8
            } else {
                0
            }
        })
        .collect();
    ColorImage::from_gray([cols, rows], &pixels)
}

/// Displayed (row, col) axes and fixed (axis, step) pairs of a points layer.
fn point_axes(slice: &SliceState) -> Option<((usize, usize), Vec<(usize, usize)>)> {
    let &[row_axis, col_axis] = slice.displayed.as_slice() else {
        return None;
    };
    let fixed = slice
        .current_step
        .iter()
        .enumerate()
        .filter(|(axis, _)| !slice.displayed.contains(axis))
        .map(|(axis, &step)| (axis, step))
        .collect();
    Some(((row_axis, col_axis), fixed))
}

fn draw_markers(painter: &egui::Painter, state: &AppState, placement: &Placement) {
    let radius = state.config.marker_radius;
    for (_, layer) in state.viewer.layers.iter() {
        let Layer::Points(points) = layer else {
            continue;
        };
        let Ok(slice) = state.viewer.dims.for_layer(points.ndim()) else {
            continue;
        };
        let Some(((row_axis, col_axis), fixed)) = point_axes(&slice) else {
            continue;
        };
        for point in points.points_in_slice(&fixed) {
            let center = placement.to_screen(point.coords[row_axis], point.coords[col_axis]);
            painter.circle(center, radius, point.face_color, Stroke::new(1.0, Color32::BLACK));
        }
    }
}

/// Add a point at displayed (row, col) to the active points layer if it is
/// in add mode. Axes that are not displayed take the current slice index.
pub(crate) fn add_point(state: &mut AppState, row: f64, col: f64) -> bool {
    let Some(active) = state.viewer.layers.active() else {
        return false;
    };
    let ndim = match state.viewer.layers.points(active) {
        Ok(points) if points.mode == PointsMode::Add => points.ndim(),
        _ => return false,
    };
    let Ok(slice) = state.viewer.dims.for_layer(ndim) else {
        return false;
    };
    let Some(((row_axis, col_axis), _)) = point_axes(&slice) else {
        return false;
    };

    let mut coords: Vec<f64> = slice.current_step.iter().map(|&s| s as f64).collect();
    coords[row_axis] = row;
    coords[col_axis] = col;
    match state.viewer.layers.points_mut(active) {
        Ok(points) => {
            let id = points.add(coords);
            log::debug!("added point {id} at ({row:.1}, {col:.1}) to '{}'", points.name);
            true
        }
        Err(_) => false,
    }
}

/// Id of the visible point of `layer` closest to `pos`, if any lies within
/// two marker radii.
fn nearest_point(
    state: &AppState,
    layer: LayerId,
    placement: &Placement,
    pos: Pos2,
) -> Option<PointId> {
    let max_dist = state.config.marker_radius * 2.0;
    let points = state.viewer.layers.points(layer).ok()?;
    let slice = state.viewer.dims.for_layer(points.ndim()).ok()?;
    let ((row_axis, col_axis), fixed) = point_axes(&slice)?;
    points
        .points_in_slice(&fixed)
        .map(|p| {
            let screen = placement.to_screen(p.coords[row_axis], p.coords[col_axis]);
            (p.id, screen.distance(pos))
        })
        .filter(|&(_, dist)| dist <= max_dist)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Label and value range of the drill line behind the marker under `pos`.
fn marker_tooltip(state: &AppState, placement: &Placement, pos: Pos2) -> Option<String> {
    state.viewer.layers.iter().find_map(|(layer, kind)| {
        if !matches!(kind, Layer::Points(_)) {
            return None;
        }
        let point = nearest_point(state, layer, placement, pos)?;
        let line = state.plot.line_for(MarkerKey { layer, point })?;
        Some(match line.value_range() {
            Some((lo, hi)) => format!("{}\n{lo:.3} .. {hi:.3}", line.label),
            None => line.label.clone(),
        })
    })
}

/// Start dragging a point of the active layer if it is in select mode.
fn grab_point(state: &AppState, placement: &Placement, pos: Pos2) -> Option<PointId> {
    let active = state.viewer.layers.active()?;
    match state.viewer.layers.points(active) {
        Ok(points) if points.mode == PointsMode::Select => {
            nearest_point(state, active, placement, pos)
        }
        _ => None,
    }
}

/// Move point `id` of the active layer to displayed (row, col).
fn move_point(state: &mut AppState, id: PointId, row: f64, col: f64) -> bool {
    let Some(active) = state.viewer.layers.active() else {
        return false;
    };
    let Ok(points) = state.viewer.layers.points_mut(active) else {
        return false;
    };
    let Ok(slice) = state.viewer.dims.for_layer(points.ndim()) else {
        return false;
    };
    let Some(((row_axis, col_axis), _)) = point_axes(&slice) else {
        return false;
    };
    let Some(mut coords) = points.get(id).map(|p| p.coords.clone()) else {
        return false;
    };
    coords[row_axis] = row;
    coords[col_axis] = col;
    points.set_coords(id, coords)
}

/// Remove the visible point of the active layer closest to `pos`, if any is
/// within two marker radii.
fn remove_point_near(state: &mut AppState, placement: &Placement, pos: Pos2) {
    let Some(active) = state.viewer.layers.active() else {
        return;
    };
    let target = nearest_point(state, active, placement, pos);
    if let (Some(id), Ok(points)) = (target, state.viewer.layers.points_mut(active)) {
        points.remove(id);
        log::debug!("removed point {id} from '{}'", points.name);
    }
}
