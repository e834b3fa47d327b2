mod app;
mod color;
mod config;
mod data;
mod drill;
mod error;
mod state;
mod ui;
mod viewer;

use std::path::PathBuf;

use app::DrillbitApp;
use clap::Parser;
use config::AppConfig;
use eframe::egui;

#[derive(Parser)]
#[command(
    name = "drillbit",
    version,
    about = "Plot values through hidden axes of multi-dimensional images"
)]
struct Cli {
    /// Images to open at startup (.json volumes or .png planes)
    files: Vec<PathBuf>,
    /// TOML config file (defaults to $DRILLBIT_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> eframe::Result {
    env_logger::init();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        log::error!("Falling back to default config: {e:#}");
        AppConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width, config.height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| {
            let mut app = DrillbitApp::new(config);
            app.state.open_paths(&cli.files);
            Ok(Box::new(app))
        }),
    )
}
