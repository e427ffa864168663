mod app;
mod color;
mod config;
mod data;
mod heatmap;
mod state;
mod ui;

use app::StormViewerApp;
use config::Config;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();
    let config = Config::load();
    log::debug!("{config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Storm Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(StormViewerApp::new(&config)))),
    )
}
