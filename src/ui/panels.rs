use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::config::Source;
use crate::data::catalog::FileCatalog;
use crate::data::export::export_csv;
use crate::data::filter::{Choice, MembershipSelection, SEASONS};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel. Widgets are laid out in pipeline order so
/// each one only offers what the widgets above it let through.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.records.is_empty() {
        ui.label("No storms loaded.");
        return;
    }

    // Domains come from the last pipeline run; clone so we can mutate state.
    let output = state.output.clone();
    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Realization ----
            let options: Vec<Choice> = output
                .realization_options
                .iter()
                .cloned()
                .map(Choice::Value)
                .collect();
            changed |= multiselect(ui, "Select by Realization", &options, &mut state.selections.realizations);

            // ---- Block range ----
            ui.strong("Select by Block Range");
            match (output.block_bounds, state.selections.block_range.as_mut()) {
                (Some((min, max)), Some((lo, hi))) => {
                    changed |= ui.add(Slider::new(&mut *lo, min..=max).text("from")).changed();
                    changed |= ui.add(Slider::new(&mut *hi, min..=max).text("to")).changed();
                    if *lo > *hi {
                        std::mem::swap(lo, hi);
                    }
                }
                (Some((min, max)), None) => {
                    if ui.button("Limit blocks").clicked() {
                        state.selections.block_range = Some((min, max));
                        changed = true;
                    }
                }
                (None, _) => {
                    ui.label("No numeric blocks.");
                }
            }
            ui.separator();

            // ---- Id search ----
            let n_ids = state.selections.search_ids.len();
            egui::CollapsingHeader::new(RichText::new(format!("Search by ID  ({n_ids})")).strong())
                .id_salt("search_id")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    for id in &output.id_options {
                        let mut checked = state.selections.search_ids.contains(id);
                        if ui.checkbox(&mut checked, id.as_str()).changed() {
                            AppState::toggle_search_id(&mut state.selections.search_ids, id);
                            changed = true;
                        }
                    }
                });
            if n_ids > 0 {
                ui.label("filtering by search_id");
            }
            ui.separator();

            // ---- Minimum precipitation ----
            if let Some(domain) = output.precip {
                ui.strong("Search by Max Precipitation (inches)");
                changed |= state.selections.min_precip.is_none();
                let threshold = state.selections.min_precip.get_or_insert(domain.mean);
                changed |= ui
                    .add(Slider::new(threshold, domain.min..=domain.max).step_by(0.1))
                    .changed();
                ui.separator();
            }

            // ---- Season ----
            let seasons: Vec<Choice> = std::iter::once(Choice::All)
                .chain(SEASONS.iter().map(|s| Choice::from(*s)))
                .collect();
            changed |= multiselect(ui, "Search for Seasonal Storms", &seasons, &mut state.selections.seasons);

            // ---- Date ----
            let dates: Vec<Choice> = std::iter::once(Choice::All)
                .chain(output.date_options.iter().cloned().map(Choice::Value))
                .collect();
            changed |= multiselect(ui, "Search by Storm Date", &dates, &mut state.selections.dates);
        });

    if changed {
        state.refilter();
    }
}

/// Collapsible checkbox list. Returns whether the selection changed.
fn multiselect(ui: &mut Ui, title: &str, options: &[Choice], selected: &mut MembershipSelection) -> bool {
    let mut changed = false;
    let header = if selected.contains(&Choice::All) {
        format!("{title}  (All)")
    } else {
        format!("{title}  ({}/{})", selected.len(), options.len())
    };

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            for choice in options {
                let mut checked = selected.contains(choice);
                if ui.checkbox(&mut checked, choice.to_string()).changed() {
                    AppState::toggle_choice(selected, choice.clone());
                    changed = true;
                }
            }
        });
    ui.separator();
    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar. Fetching blocks until every page is in,
/// so the bar shows counts rather than progress.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open snapshot…").clicked() {
                open_snapshot_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.output.records.is_empty(), egui::Button::new("Export CSV…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label("Collection");
        let response = ui.text_edit_singleline(&mut state.collection_input);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Fetch").clicked() || submitted {
            state.fetch();
        }

        ui.separator();

        if let Some(collection) = &state.collection {
            ui.label(format!(
                "{collection}: {} storms loaded, {} visible",
                state.records.len(),
                state.output.records.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_snapshot_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open STAC item collection")
        .add_filter("GeoJSON / JSON", &["json", "geojson"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Using snapshot {}", path.display());
        state.set_source(Source::File(FileCatalog::new(&path)));
        if !state.collection_input.trim().is_empty() {
            state.fetch();
        }
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered storms")
        .add_filter("CSV", &["csv"])
        .set_file_name("storms.csv")
        .save_file();

    if let Some(path) = file {
        match export_csv(&state.output.records, &path) {
            Ok(()) => {
                log::info!(
                    "Exported {} storms to {}",
                    state.output.records.len(),
                    path.display()
                );
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
