use eframe::egui::{Ui, Visuals};
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Drill plot (bottom dock)
// ---------------------------------------------------------------------------

/// Render the docked drill plot. Axis limits are applied once after each new
/// line; in between, the user is free to pan and zoom.
pub fn drill_plot(ui: &mut Ui, state: &mut AppState) {
    if state.config.dark_plot {
        ui.style_mut().visuals = Visuals::dark();
    }

    let pending = state.plot.take_pending_limits();
    let plot = &state.plot;

    let mut chart = Plot::new("drill_plot")
        .legend(Legend::default())
        .x_axis_label("slice")
        .y_axis_label("value")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if plot.is_empty() {
        chart = chart.include_y(-1.0).include_y(1.0);
    }

    chart.show(ui, |plot_ui| {
        if let Some(limits) = pending {
            let (mut x_min, mut x_max) = limits.x;
            // A single-sample line still needs a visible x-range.
            if x_max <= x_min {
                x_min -= 0.5;
                x_max += 0.5;
            }
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [x_min, limits.y.0],
                [x_max, limits.y.1],
            ));
        }

        for line in plot.lines() {
            let points: PlotPoints = plot
                .xs()
                .iter()
                .zip(line.values.iter())
                .map(|(&x, &y)| [x, y])
                .collect();
            plot_ui.line(
                Line::new(points)
                    .name(&line.label)
                    .color(line.color)
                    .width(1.5),
            );
        }
    });
}
