use eframe::egui::Color32;

use super::extract::drill_values;
use super::plot_state::{LineId, PlotState};
use super::MIN_DRILL_NDIM;
use crate::error::DrillError;
use crate::viewer::events::{DataAction, Subscription};
use crate::viewer::layers::LayerId;
use crate::viewer::points::{PointId, PointsMode};
use crate::viewer::Viewer;

// ---------------------------------------------------------------------------
// Drilling session state machine
// ---------------------------------------------------------------------------

/// Live wiring of an active session. Dropping it releases the subscription.
#[derive(Debug)]
pub struct ActiveSession {
    pub image: LayerId,
    pub points: LayerId,
    subscription: Subscription,
}

#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    Inactive,
    Active(ActiveSession),
}

/// Outcome of handling the events queued since the last poll.
#[derive(Debug, Default)]
pub struct DrillReport {
    pub lines: Vec<LineId>,
    pub failures: Vec<(PointId, DrillError)>,
}

impl DrillReport {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.failures.is_empty()
    }
}

/// Start/stop controller connecting a points layer's "added" events to the
/// drill plot.
#[derive(Debug)]
pub struct DrillSession {
    state: SessionState,
    /// Colour of a freshly clicked point until its line exists.
    pending_color: Color32,
}

impl Default for DrillSession {
    fn default() -> Self {
        Self::new(Color32::WHITE)
    }
}

impl DrillSession {
    pub fn new(pending_color: Color32) -> Self {
        Self {
            state: SessionState::Inactive,
            pending_color,
        }
    }

    /// The image being drilled, while a session runs.
    pub fn image(&self) -> Option<LayerId> {
        match &self.state {
            SessionState::Active(active) => Some(active.image),
            SessionState::Inactive => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    pub fn button_label(&self) -> &'static str {
        if self.is_active() {
            "Stop Drilling"
        } else {
            "Start Drilling"
        }
    }

    /// The single external command: start when inactive, stop when active.
    pub fn toggle(
        &mut self,
        viewer: &mut Viewer,
        image: Option<LayerId>,
    ) -> Result<(), DrillError> {
        if self.is_active() {
            self.stop();
            Ok(())
        } else {
            self.start(viewer, image).map(|_| ())
        }
    }

    /// Begin drilling `image`: create `<name>_Drillbit`, switch it to add
    /// mode and subscribe to its data events. Returns the new points layer.
    ///
    /// On error the session stays inactive and the viewer is untouched.
    pub fn start(
        &mut self,
        viewer: &mut Viewer,
        image: Option<LayerId>,
    ) -> Result<LayerId, DrillError> {
        if self.is_active() {
            return Err(DrillError::invalid("a drilling session is already running"));
        }
        let image = image.ok_or_else(|| DrillError::invalid("no image layer selected"))?;
        let name = {
            let layer = viewer.layers.image(image)?;
            if layer.ndim() < MIN_DRILL_NDIM {
                return Err(DrillError::invalid(format!(
                    "Image must have >={MIN_DRILL_NDIM} dimensions."
                )));
            }
            layer.name.clone()
        };

        let points = viewer.add_points(format!("{name}_Drillbit"));
        let layer = viewer.layers.points_mut(points)?;
        layer.current_face_color = self.pending_color;
        layer.mode = PointsMode::Add;
        let subscription = layer.subscribe();

        log::info!("Started drilling '{name}' into points layer {points}");
        self.state = SessionState::Active(ActiveSession {
            image,
            points,
            subscription,
        });
        Ok(points)
    }

    /// Tear down the live wiring. Layers and plotted lines are kept.
    pub fn stop(&mut self) {
        if let SessionState::Active(active) = std::mem::take(&mut self.state) {
            log::info!("Stopped drilling into points layer {}", active.points);
            active.subscription.unsubscribe();
        }
    }

    /// Handle every event queued since the last call, in delivery order.
    ///
    /// Only `Added` events produce lines; removals and moves are ignored.
    /// A point that cannot be drilled is reported and skipped.
    pub fn poll(&mut self, viewer: &mut Viewer, plot: &mut PlotState) -> DrillReport {
        let mut report = DrillReport::default();
        let SessionState::Active(active) = &self.state else {
            return report;
        };

        for event in active.subscription.drain() {
            if event.action != DataAction::Added {
                log::debug!(
                    "ignoring {:?} event on layer {} ({} points left)",
                    event.action,
                    active.points,
                    event.value.len()
                );
                continue;
            }
            for point in event.points {
                match self.drill_point(active, point, viewer, plot) {
                    Ok(line) => report.lines.push(line),
                    Err(err) => {
                        log::warn!("could not drill point {point}: {err}");
                        report.failures.push((point, err));
                    }
                }
            }
        }
        report
    }

    fn drill_point(
        &self,
        active: &ActiveSession,
        point: PointId,
        viewer: &mut Viewer,
        plot: &mut PlotState,
    ) -> Result<LineId, DrillError> {
        let values = {
            let image = viewer.layers.image(active.image)?;
            let markers = viewer.layers.points(active.points)?;
            let coords = &markers
                .get(point)
                .ok_or_else(|| DrillError::invalid(format!("point {point} no longer exists")))?
                .coords;

            // Displayed coordinates of the point, in display order.
            let point_dims = viewer.dims.for_layer(markers.ndim())?;
            let clicked: Vec<f64> = point_dims
                .displayed
                .iter()
                .map(|&axis| coords[axis])
                .collect();

            let slice = viewer.dims.for_layer(image.ndim())?;
            drill_values(image.data(), &clicked, &slice)?
        };

        let markers = viewer.layers.points_mut(active.points)?;
        plot.add_line(active.points, point, values, markers, self.pending_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::layers::ImageLayer;
    use ndarray::{Array, ArrayD, IxDyn};

    fn ramp(shape: &[usize]) -> ArrayD<f64> {
        let n: usize = shape.iter().product();
        Array::from_shape_vec(IxDyn(shape), (0..n).map(|v| (v as f64).sin()).collect())
            .expect("shape matches length")
    }

    /// Click at displayed (row, col) on the session's points layer.
    fn click(viewer: &mut Viewer, layer: LayerId, row: f64, col: f64) -> PointId {
        let mut coords: Vec<f64> =
            viewer.dims.current_step().iter().map(|&s| s as f64).collect();
        let displayed = viewer.dims.displayed().to_vec();
        coords[displayed[0]] = row;
        coords[displayed[1]] = col;
        viewer.layers.points_mut(layer).unwrap().add(coords)
    }

    #[test]
    fn volume_click_drills_axis_zero() {
        let data = ramp(&[10, 4, 4]);
        let mut viewer = Viewer::default();
        let image = viewer.add_image(ImageLayer::new("vol", data.clone()));
        let mut session = DrillSession::default();
        let mut plot = PlotState::default();

        let points = session.start(&mut viewer, Some(image)).unwrap();
        assert_eq!(viewer.layers.points(points).unwrap().name, "vol_Drillbit");
        assert_eq!(session.button_label(), "Stop Drilling");

        click(&mut viewer, points, 2.0, 3.0);
        let report = session.poll(&mut viewer, &mut plot);
        assert_eq!(report.lines.len(), 1);

        let expected: Vec<f64> = (0..10).map(|z| data[IxDyn(&[z, 2, 3])]).collect();
        assert_eq!(plot.lines()[0].values, expected);
    }

    #[test]
    fn hypervolume_click_uses_current_leading_step() {
        let data = ramp(&[5, 10, 4, 4]);
        let mut viewer = Viewer::default();
        let image = viewer.add_image(ImageLayer::new("hyper", data.clone()));
        viewer.dims.set_current_step(0, 2);
        let mut session = DrillSession::default();
        let mut plot = PlotState::default();

        let points = session.start(&mut viewer, Some(image)).unwrap();
        click(&mut viewer, points, 1.0, 2.0);
        session.poll(&mut viewer, &mut plot);

        let expected: Vec<f64> = (0..10).map(|z| data[IxDyn(&[2, z, 1, 2])]).collect();
        assert_eq!(plot.lines().len(), 1);
        assert_eq!(plot.lines()[0].values, expected);
    }

    #[test]
    fn flat_image_is_rejected_and_session_stays_inactive() {
        let mut viewer = Viewer::default();
        let image = viewer.add_image(ImageLayer::new("flat", ramp(&[8, 8])));
        let mut session = DrillSession::default();

        let err = session.start(&mut viewer, Some(image)).unwrap_err();
        assert_eq!(err, DrillError::invalid("Image must have >=3 dimensions."));
        assert!(!session.is_active());
        assert_eq!(session.button_label(), "Start Drilling");
        assert_eq!(viewer.layers.len(), 1);
    }

    #[test]
    fn missing_selection_is_rejected() {
        let mut viewer = Viewer::default();
        let mut session = DrillSession::default();
        assert!(session.toggle(&mut viewer, None).is_err());
        assert!(!session.is_active());
    }

    #[test]
    fn clicks_become_lines_in_order_with_matching_markers() {
        let data = ramp(&[6, 5, 5]);
        let mut viewer = Viewer::default();
        let image = viewer.add_image(ImageLayer::new("vol", data.clone()));
        let mut session = DrillSession::default();
        let mut plot = PlotState::default();
        let points = session.start(&mut viewer, Some(image)).unwrap();

        let clicks = [(0.0, 1.0), (4.0, 4.0), (2.0, 3.0)];
        let ids: Vec<PointId> = clicks
            .iter()
            .map(|&(r, c)| click(&mut viewer, points, r, c))
            .collect();
        session.poll(&mut viewer, &mut plot);

        assert_eq!(plot.lines().len(), 3);
        let markers = viewer.layers.points(points).unwrap();
        for ((line, &(r, c)), id) in plot.lines().iter().zip(&clicks).zip(&ids) {
            let expected: Vec<f64> = (0..6)
                .map(|z| data[IxDyn(&[z, r as usize, c as usize])])
                .collect();
            assert_eq!(line.values, expected);
            assert_eq!(line.marker.point, *id);
            assert_eq!(markers.get(*id).map(|p| p.face_color), Some(line.color));
        }
        assert_eq!(markers.current_face_color, Color32::WHITE);
    }

    #[test]
    fn removals_and_moves_are_ignored() {
        let mut viewer = Viewer::default();
        let image = viewer.add_image(ImageLayer::new("vol", ramp(&[4, 3, 3])));
        let mut session = DrillSession::default();
        let mut plot = PlotState::default();
        let points = session.start(&mut viewer, Some(image)).unwrap();

        let id = click(&mut viewer, points, 1.0, 1.0);
        session.poll(&mut viewer, &mut plot);
        let layer = viewer.layers.points_mut(points).unwrap();
        layer.set_coords(id, vec![0.0, 2.0, 2.0]);
        layer.remove(id);

        let report = session.poll(&mut viewer, &mut plot);
        assert!(report.is_empty());
        assert_eq!(plot.lines().len(), 1);
    }

    #[test]
    fn events_after_stop_are_dropped() {
        let mut viewer = Viewer::default();
        let image = viewer.add_image(ImageLayer::new("vol", ramp(&[4, 3, 3])));
        let mut session = DrillSession::default();
        let mut plot = PlotState::default();
        let points = session.start(&mut viewer, Some(image)).unwrap();

        // Queued but never polled before the stop.
        click(&mut viewer, points, 1.0, 1.0);
        session.stop();
        click(&mut viewer, points, 2.0, 2.0);

        assert!(session.poll(&mut viewer, &mut plot).is_empty());
        assert!(plot.is_empty());
        assert_eq!(viewer.layers.points(points).unwrap().subscriber_count(), 0);
        // The layer itself is kept.
        assert_eq!(viewer.layers.points(points).unwrap().len(), 2);
    }

    #[test]
    fn restart_on_another_image_does_not_leak_old_wiring() {
        let first = ramp(&[4, 3, 3]);
        let second = ramp(&[4, 6, 6]).mapv(|v| v * 10.0);
        let mut viewer = Viewer::default();
        let a = viewer.add_image(ImageLayer::new("a", first));
        let b = viewer.add_image(ImageLayer::new("b", second.clone()));
        let mut session = DrillSession::default();
        let mut plot = PlotState::default();

        let old_points = session.start(&mut viewer, Some(a)).unwrap();
        click(&mut viewer, old_points, 0.0, 0.0);
        session.poll(&mut viewer, &mut plot);
        session.stop();

        let new_points = session.start(&mut viewer, Some(b)).unwrap();
        assert_eq!(session.image(), Some(b));

        click(&mut viewer, old_points, 1.0, 1.0);
        click(&mut viewer, new_points, 5.0, 5.0);
        let report = session.poll(&mut viewer, &mut plot);

        assert_eq!(report.lines.len(), 1);
        assert_eq!(plot.lines().len(), 2);
        assert_eq!(plot.lines()[1].marker.layer, new_points);
        let expected: Vec<f64> = (0..4).map(|z| second[IxDyn(&[z, 5, 5])]).collect();
        assert_eq!(plot.lines()[1].values, expected);
        assert_eq!(viewer.layers.points(old_points).unwrap().subscriber_count(), 0);
    }

    #[test]
    fn out_of_bounds_click_is_reported_and_session_continues() {
        let mut viewer = Viewer::default();
        let image = viewer.add_image(ImageLayer::new("vol", ramp(&[4, 3, 3])));
        let mut session = DrillSession::default();
        let mut plot = PlotState::default();
        let points = session.start(&mut viewer, Some(image)).unwrap();

        let bad = click(&mut viewer, points, 7.0, 0.0);
        click(&mut viewer, points, 1.0, 1.0);
        let report = session.poll(&mut viewer, &mut plot);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, bad);
        assert_eq!(report.lines.len(), 1);
        assert!(session.is_active());
    }

    #[test]
    fn rolled_axes_are_reported_not_guessed() {
        let mut viewer = Viewer::default();
        let image = viewer.add_image(ImageLayer::new("hyper", ramp(&[5, 6, 4, 4])));
        let mut session = DrillSession::default();
        let mut plot = PlotState::default();
        let points = session.start(&mut viewer, Some(image)).unwrap();

        viewer.dims.roll();
        click(&mut viewer, points, 1.0, 1.0);
        let report = session.poll(&mut viewer, &mut plot);

        assert!(matches!(
            report.failures.first(),
            Some((_, DrillError::UnsupportedAxisLayout { .. }))
        ));
        assert!(plot.is_empty());
    }
}
