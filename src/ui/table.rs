use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Field, FieldValue};
use crate::state::AppState;

/// Columns shown in the dataset table. The link gets its own hyperlink
/// column; the WKT centers are shown on the maps instead.
const COLUMNS: [Field; 7] = [
    Field::Id,
    Field::Event,
    Field::Realization,
    Field::BlockGroup,
    Field::HistoricStormDate,
    Field::HistoricStormSeason,
    Field::HistoricStormMaxPrecipInches,
];

/// Render the filtered records.
pub fn records_table(ui: &mut Ui, state: &AppState) {
    ui.strong("Filtered Dataset");
    let records = &state.output.records;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(220.0)
        .columns(Column::auto().at_least(60.0), COLUMNS.len())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for field in COLUMNS {
                header.col(|ui| {
                    ui.strong(field.label());
                });
            }
            header.col(|ui| {
                ui.strong(Field::Link.label());
            });
        })
        .body(|body| {
            body.rows(18.0, records.len(), |mut row| {
                let record = &records.records[row.index()];
                for field in COLUMNS {
                    row.col(|ui| {
                        ui.label(record.get(field).to_string());
                    });
                }
                row.col(|ui| match &record.link {
                    FieldValue::Text(url) => {
                        ui.hyperlink_to("See in Catalog", url);
                    }
                    other => {
                        ui.label(other.to_string());
                    }
                });
            });
        });
}
