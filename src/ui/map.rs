use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Polygon};

use crate::color::{heat_color, legend_stops};
use crate::heatmap::CenterKind;
use crate::state::AppState;

/// Initial map center (lat, lon) over the Kanawha basin.
const MAP_CENTER: (f64, f64) = (37.75153, -80.94911);

/// Degrees shown either side of the center before the user zooms.
const INITIAL_SPAN: f64 = 3.0;

// ---------------------------------------------------------------------------
// Storm-center heatmaps (central panel)
// ---------------------------------------------------------------------------

/// Render the historic and SST heatmaps side by side.
pub fn heatmaps(ui: &mut Ui, state: &AppState) {
    if state.output.records.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No storms match the current filters");
        });
        return;
    }

    ui.columns(2, |cols| {
        heatmap(&mut cols[0], state, CenterKind::Historic);
        heatmap(&mut cols[1], state, CenterKind::Sst);
    });
}

fn heatmap(ui: &mut Ui, state: &AppState, kind: CenterKind) {
    let layer = state.layer(kind);
    ui.strong(kind.title());
    if layer.skipped > 0 {
        ui.label(format!(
            "{} storms plotted, {} without a usable center",
            layer.points, layer.skipped
        ));
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.label("sparse");
        for (_, color) in legend_stops(6) {
            ui.label(RichText::new("■").color(color));
        }
        ui.label(format!("dense ({} per cell)", layer.grid.max_count));
    });

    let (lat, lon) = MAP_CENTER;
    let size = layer.grid.cell_size;

    Plot::new(kind.title())
        .legend(Legend::default())
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .include_x(lon - INITIAL_SPAN)
        .include_x(lon + INITIAL_SPAN)
        .include_y(lat - INITIAL_SPAN)
        .include_y(lat + INITIAL_SPAN)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for ring in &state.outline {
                let points: PlotPoints = ring.iter().copied().collect();
                plot_ui.line(
                    Line::new(points)
                        .name("Watershed")
                        .color(Color32::DARK_GRAY)
                        .width(1.5),
                );
            }

            for cell in &layer.grid.cells {
                let color = heat_color(layer.grid.intensity(cell));
                let points: PlotPoints = cell.corners(size).into_iter().collect();
                plot_ui.polygon(
                    Polygon::new(points)
                        .fill_color(color)
                        .stroke(Stroke::new(0.0, color)),
                );
            }
        });
}
