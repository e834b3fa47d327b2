use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::data::{export, loader};
use crate::drill::plot_state::PlotState;
use crate::drill::session::DrillSession;
use crate::viewer::layers::{ImageLayer, LayerId};
use crate::viewer::Viewer;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Layers and slicing state.
    pub viewer: Viewer,

    /// Current value of the image layer picker. Locked while drilling.
    pub picked_image: Option<LayerId>,

    /// Start/stop drilling controller.
    pub session: DrillSession,

    /// Drill lines shown in the docked plot. Survives session restarts.
    pub plot: PlotState,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let session = DrillSession::new(config.pending_color());
        Self {
            config,
            viewer: Viewer::default(),
            picked_image: None,
            session,
            plot: PlotState::default(),
            status_message: None,
        }
    }

    /// Add an image layer and point the picker at it if nothing is picked.
    pub fn add_image(&mut self, image: ImageLayer) -> LayerId {
        let id = self.viewer.add_image(image);
        if self.picked_image.is_none() {
            self.picked_image = Some(id);
        }
        id
    }

    /// Open every path as a layer; failures are logged and reported.
    pub fn open_paths(&mut self, paths: &[PathBuf]) {
        for path in paths {
            match loader::load_file(path) {
                Ok(image) => {
                    log::info!(
                        "Loaded '{}' with shape {:?} from {}",
                        image.name,
                        image.shape(),
                        path.display()
                    );
                    self.add_image(image);
                    self.status_message = None;
                }
                Err(e) => self.report_error(format!("{e:#}")),
            }
        }
    }

    pub fn open_png_stack(&mut self, paths: &[PathBuf]) {
        match loader::load_png_stack(paths) {
            Ok(image) => {
                log::info!("Loaded PNG stack '{}' with shape {:?}", image.name, image.shape());
                self.add_image(image);
                self.status_message = None;
            }
            Err(e) => self.report_error(format!("{e:#}")),
        }
    }

    /// The image the canvas shows: the drilled one while a session runs,
    /// otherwise the picker's choice.
    pub fn displayed_image(&self) -> Option<LayerId> {
        self.session.image().or(self.picked_image)
    }

    /// The "Start Drilling" / "Stop Drilling" button.
    pub fn toggle_drilling(&mut self) {
        match self.session.toggle(&mut self.viewer, self.picked_image) {
            Ok(()) => self.status_message = None,
            Err(e) => self.report_error(e.to_string()),
        }
    }

    /// Feed queued point events through the drill pipeline. Returns whether
    /// the plot changed.
    pub fn poll_drilling(&mut self) -> bool {
        let report = self.session.poll(&mut self.viewer, &mut self.plot);
        if report.is_empty() {
            return false;
        }
        match report.failures.last() {
            Some((point, err)) => {
                self.status_message = Some(format!("Error: point {point}: {err}"));
            }
            None => self.status_message = None,
        }
        !report.lines.is_empty()
    }

    pub fn export_lines(&mut self, path: &Path) {
        match export::export_lines(&self.plot, path) {
            Ok(()) => self.status_message = None,
            Err(e) => self.report_error(format!("{e:#}")),
        }
    }

    fn report_error(&mut self, message: String) {
        log::error!("{message}");
        self.status_message = Some(format!("Error: {message}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn first_image_is_picked() {
        let mut state = AppState::default();
        let a = state.add_image(ImageLayer::new("a", ArrayD::zeros(IxDyn(&[3, 2, 2]))));
        state.add_image(ImageLayer::new("b", ArrayD::zeros(IxDyn(&[3, 2, 2]))));
        assert_eq!(state.picked_image, Some(a));
    }

    #[test]
    fn refused_start_shows_a_message() {
        let mut state = AppState::default();
        state.add_image(ImageLayer::new("flat", ArrayD::zeros(IxDyn(&[4, 4]))));
        state.toggle_drilling();
        assert!(!state.session.is_active());
        assert_eq!(
            state.status_message.as_deref(),
            Some("Error: Image must have >=3 dimensions.")
        );
    }

    #[test]
    fn toggle_round_trip_keeps_lines() {
        let mut state = AppState::default();
        state.add_image(ImageLayer::new("vol", ArrayD::ones(IxDyn(&[3, 2, 2]))));
        state.toggle_drilling();
        assert!(state.session.is_active());

        let points = state.viewer.layers.active().unwrap();
        state.viewer.layers.points_mut(points).unwrap().add(vec![0.0, 1.0, 1.0]);
        assert!(state.poll_drilling());

        state.toggle_drilling();
        assert!(!state.session.is_active());
        assert_eq!(state.plot.lines().len(), 1);
    }

    #[test]
    fn canvas_follows_the_drilled_image_while_active() {
        let mut state = AppState::default();
        let a = state.add_image(ImageLayer::new("a", ArrayD::from_elem(IxDyn(&[3, 2, 2]), 1.0)));
        let b = state.add_image(ImageLayer::new("b", ArrayD::from_elem(IxDyn(&[3, 2, 2]), 9.0)));
        state.toggle_drilling();

        state.picked_image = Some(b);
        assert_eq!(state.displayed_image(), Some(a));

        let points = state.viewer.layers.active().unwrap();
        state.viewer.layers.points_mut(points).unwrap().add(vec![0.0, 1.0, 1.0]);
        state.poll_drilling();
        assert_eq!(state.plot.lines()[0].values, vec![1.0; 3]);

        state.toggle_drilling();
        assert_eq!(state.displayed_image(), Some(b));
    }

    #[test]
    fn successful_drill_clears_a_previous_point_error() {
        let mut state = AppState::default();
        state.add_image(ImageLayer::new("vol", ArrayD::ones(IxDyn(&[3, 2, 2]))));
        state.toggle_drilling();
        let points = state.viewer.layers.active().unwrap();

        state.viewer.layers.points_mut(points).unwrap().add(vec![0.0, 5.0, 5.0]);
        assert!(!state.poll_drilling());
        assert!(state.status_message.as_deref().is_some_and(|m| m.starts_with("Error: point #0")));

        // Nothing queued: the message stays.
        state.poll_drilling();
        assert!(state.status_message.is_some());

        state.viewer.layers.points_mut(points).unwrap().add(vec![0.0, 1.0, 1.0]);
        assert!(state.poll_drilling());
        assert_eq!(state.status_message, None);
    }

    #[test]
    fn unreadable_file_is_reported() {
        let mut state = AppState::default();
        state.open_paths(&[PathBuf::from("/definitely/not/here.json")]);
        assert!(state.status_message.is_some());
        assert!(state.viewer.layers.is_empty());
    }
}
