use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::{CellValue, Dataset, RawTable};

const ROW_HEIGHT: f32 = 18.0;
const MAX_TABLE_HEIGHT: f32 = 320.0;

/// Render a header row plus `n_rows` rows of cells produced by `cell`.
fn cell_table<'a>(
    ui: &mut Ui,
    id: &str,
    columns: &[String],
    n_rows: usize,
    cell: impl Fn(usize, usize) -> &'a CellValue,
) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(MAX_TABLE_HEIGHT)
            .columns(Column::auto().at_least(60.0), columns.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for name in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, n_rows, |mut row| {
                    let r = row.index();
                    for c in 0..columns.len() {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell(r, c).to_string());
                        });
                    }
                });
            });
    });
}

/// First rows of the country-level dataset, one per entity.
pub fn country_snapshot(ui: &mut Ui, snapshot: &RawTable) {
    ui.heading("Country-Level CO2 Emissions Data");
    if snapshot.is_empty() {
        ui.label("The country dataset is empty.");
        return;
    }
    cell_table(ui, "country_snapshot", &snapshot.columns, snapshot.len(), move |r, c| {
        &snapshot.rows[r][c]
    });
}

/// Source rows behind the current filtered view.
pub fn raw_data(ui: &mut Ui, dataset: &Dataset, indices: &[usize]) {
    ui.heading(format!("Raw Data ({} rows)", indices.len()));
    if indices.is_empty() {
        return;
    }
    cell_table(ui, "raw_data", &dataset.columns, indices.len(), move |r, c| {
        &dataset.cells[indices[r]][c]
    });
}
