use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;
use crate::viewer::layers::{Layer, LayerId};
use crate::viewer::points::PointsMode;

// ---------------------------------------------------------------------------
// Left side panel – drilling controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Drillbit");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            drilling_controls(ui, state);
            ui.separator();
            dims_controls(ui, state);
            ui.separator();
            layer_list(ui, state);
            ui.separator();
            drill_table(ui, state);
        });
}

fn drilling_controls(ui: &mut Ui, state: &mut AppState) {
    // ---- Layer picker ----
    ui.strong("Image");
    let images: Vec<(LayerId, String)> = state
        .viewer
        .layers
        .images()
        .map(|(id, image)| (id, image.name.clone()))
        .collect();
    let picked_name = state
        .picked_image
        .and_then(|id| images.iter().find(|(lid, _)| *lid == id))
        .map(|(_, name)| name.clone())
        .unwrap_or_else(|| "(none)".to_string());
    // The drilled image is locked until the session stops.
    let drilling = state.session.is_active();
    ui.add_enabled_ui(!drilling, |ui: &mut Ui| {
        egui::ComboBox::from_id_salt("image_picker")
            .selected_text(picked_name)
            .show_ui(ui, |ui: &mut Ui| {
                for (id, name) in &images {
                    ui.selectable_value(&mut state.picked_image, Some(*id), name);
                }
            });
    });

    // ---- Start / stop ----
    if ui.button(state.session.button_label()).clicked() {
        state.toggle_drilling();
    }

    // ---- Click mode of the active points layer ----
    if let Some(active) = state.viewer.layers.active() {
        if let Ok(points) = state.viewer.layers.points_mut(active) {
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut points.mode, PointsMode::Add, "Add points");
                ui.radio_value(&mut points.mode, PointsMode::Select, "Select / move");
            });
        }
    }
}

fn dims_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Dimensions");
    let dims = &mut state.viewer.dims;
    let sliced: Vec<usize> = dims.not_displayed().to_vec();
    if sliced.is_empty() {
        ui.label("All axes displayed.");
    }
    for axis in sliced {
        let extent = dims.range()[axis];
        let mut step = dims.current_step()[axis];
        let slider = egui::Slider::new(&mut step, 0..=extent.saturating_sub(1))
            .text(format!("axis {axis}"));
        if ui.add(slider).changed() {
            dims.set_current_step(axis, step);
        }
    }
    ui.label(format!(
        "order: {:?}  displayed: {:?}",
        dims.order(),
        dims.displayed()
    ));
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("Roll dims").clicked() {
            dims.roll();
        }
        if ui.small_button("Transpose").clicked() {
            dims.transpose();
        }
    });
}

fn layer_list(ui: &mut Ui, state: &mut AppState) {
    let entries: Vec<(LayerId, String, bool)> = state
        .viewer
        .layers
        .iter()
        .map(|(id, layer)| {
            let label = match layer {
                Layer::Image(image) => format!("🖼 {}  {:?}", image.name, image.shape()),
                Layer::Points(points) if points.subscriber_count() > 0 => {
                    format!("• {}  ({} pts, drilling)", points.name, points.len())
                }
                Layer::Points(points) => format!("• {}  ({} pts)", points.name, points.len()),
            };
            (id, label, matches!(layer, Layer::Points(_)))
        })
        .collect();

    egui::CollapsingHeader::new(RichText::new(format!("Layers  ({})", entries.len())).strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            let active = state.viewer.layers.active();
            for (id, label, _) in entries.iter().rev() {
                if ui.selectable_label(active == Some(*id), label).clicked() {
                    state.viewer.layers.set_active(*id);
                }
            }
            if state.viewer.layers.is_empty() {
                ui.small("No layers loaded.");
            } else if !entries.iter().any(|(_, _, is_points)| *is_points) {
                ui.small("Points layers appear here once drilling starts.");
            }
        });
}

fn drill_table(ui: &mut Ui, state: &AppState) {
    let lines = state.plot.lines();
    egui::CollapsingHeader::new(RichText::new(format!("Drill lines  ({})", lines.len())).strong())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if let Some(limits) = state.plot.limits() {
                ui.small(format!("y range {:.3} .. {:.3}", limits.y.0, limits.y.1));
            }
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto())
                .column(Column::remainder())
                .column(Column::auto())
                .column(Column::auto())
                .header(18.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("");
                    });
                    header.col(|ui| {
                        ui.strong("Point");
                    });
                    header.col(|ui| {
                        ui.strong("Min");
                    });
                    header.col(|ui| {
                        ui.strong("Max");
                    });
                })
                .body(|mut body| {
                    for line in lines {
                        let (lo, hi) = line.value_range().unwrap_or((f64::NAN, f64::NAN));
                        body.row(18.0, |mut row| {
                            row.col(|ui| {
                                ui.label(RichText::new("■").color(line.color));
                            });
                            row.col(|ui| {
                                ui.label(&line.label);
                            });
                            row.col(|ui| {
                                ui.label(format!("{lo:.3}"));
                            });
                            row.col(|ui| {
                                ui.label(format!("{hi:.3}"));
                            });
                        });
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open PNG stack…").clicked() {
                open_stack_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui
                .add_enabled(!state.plot.is_empty(), egui::Button::new("Export drill lines…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} layers, {} drill lines",
            state.viewer.layers.len(),
            state.plot.lines().len()
        ));
        if state.session.is_active() {
            ui.separator();
            ui.label(RichText::new("● drilling").color(Color32::LIGHT_GREEN));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open image")
        .add_filter("Supported files", &["json", "png"])
        .add_filter("JSON volume", &["json"])
        .add_filter("PNG", &["png"])
        .pick_files();

    if let Some(paths) = files {
        state.open_paths(&paths);
    }
}

pub fn open_stack_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open PNG stack (one file per slice)")
        .add_filter("PNG", &["png"])
        .pick_files();

    if let Some(mut paths) = files {
        paths.sort();
        state.open_png_stack(&paths);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export drill lines")
        .add_filter("CSV", &["csv"])
        .set_file_name("drill_lines.csv")
        .save_file();

    if let Some(path) = file {
        state.export_lines(&path);
    }
}
