use eframe::egui;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::ui::canvas::ImageCanvas;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DrillbitApp {
    pub state: AppState,
    canvas: ImageCanvas,
}

impl DrillbitApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
            canvas: ImageCanvas::default(),
        }
    }
}

impl eframe::App for DrillbitApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Points clicked last frame are drilled before anything is drawn.
        if self.state.poll_drilling() {
            ctx.request_repaint();
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: drilling controls ----
        egui::SidePanel::left("drill_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom dock: drill plot ----
        egui::TopBottomPanel::bottom("drill_plot_dock")
            .resizable(true)
            .default_height(self.state.config.plot_height)
            .show(ctx, |ui| {
                plot::drill_plot(ui, &mut self.state);
            });

        // ---- Central panel: image ----
        egui::CentralPanel::default().show(ctx, |ui| {
            self.canvas.show(ui, &mut self.state);
        });
    }
}
