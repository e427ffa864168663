use eframe::egui;

use crate::config::Config;
use crate::state::AppState;
use crate::ui::{map, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct StormViewerApp {
    pub state: AppState,
}

impl StormViewerApp {
    pub fn new(config: &Config) -> Self {
        Self {
            state: AppState::from_config(config),
        }
    }
}

impl eframe::App for StormViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: filtered dataset ----
        egui::TopBottomPanel::bottom("dataset_panel")
            .resizable(true)
            .default_height(260.0)
            .show(ctx, |ui| {
                table::records_table(ui, &self.state);
            });

        // ---- Central panel: heatmaps ----
        egui::CentralPanel::default().show(ctx, |ui| {
            map::heatmaps(ui, &self.state);
        });
    }
}
