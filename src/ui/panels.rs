use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

const MAX_HORIZON: usize = 50;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        impact_notes(ui);
        return;
    };

    // Clone what we need so we can mutate state below.
    let bounds = dataset.year_bounds();
    let has_country = dataset.has_country();
    let countries = dataset.countries();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year range ----
            if let Some((min, max)) = bounds {
                ui.strong("Select Year Range");
                let mut lo = state.filters.years.lo;
                let mut hi = state.filters.years.hi;
                ui.add(egui::Slider::new(&mut lo, min..=max).text("from"));
                ui.add(egui::Slider::new(&mut hi, min..=max).text("to"));
                state.set_year_range(lo, hi);
                ui.separator();
            }

            // ---- Single country ----
            if has_country {
                ui.strong("Select Country");
                let current = state.filters.country.clone();
                let mut selected = current.clone();
                egui::ComboBox::from_id_salt("country")
                    .selected_text(current.as_deref().unwrap_or("Global"))
                    .show_ui(ui, |ui: &mut Ui| {
                        ui.selectable_value(&mut selected, None, "Global");
                        for country in &countries {
                            ui.selectable_value(&mut selected, Some(country.clone()), country.as_str());
                        }
                    });
                state.select_country(selected);
                ui.separator();

                // ---- Comparison ----
                let n_selected = state.filters.comparison.len();
                egui::CollapsingHeader::new(
                    RichText::new(format!("Compare Countries  ({n_selected}/{})", countries.len()))
                        .strong(),
                )
                .id_salt("compare")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    if ui.small_button("Clear").clicked() {
                        state.clear_comparison();
                    }
                    for country in &countries {
                        let mut checked = state.filters.comparison.contains(country);
                        let mut text = RichText::new(country);
                        if let Some(cm) = &state.color_map {
                            text = text.color(cm.color_for(country));
                        }
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_comparison(country);
                        }
                    }
                });
                ui.separator();
            } else {
                ui.label("No country column: country filters are disabled.");
                ui.separator();
            }

            // ---- Forecast horizon ----
            ui.strong("Forecast horizon (years)");
            let mut horizon = state.horizon;
            ui.add(egui::Slider::new(&mut horizon, 1..=MAX_HORIZON));
            state.set_horizon(horizon);
            ui.separator();

            impact_notes(ui);
        });
}

fn impact_notes(ui: &mut Ui) {
    ui.strong("Global Warming Impact");
    ui.label(
        "CO2 emissions trap heat in the atmosphere, causing global temperatures to rise. \
         This leads to severe weather, rising sea levels, and biodiversity loss.",
    );
    ui.add_space(6.0);
    ui.strong("How to Reduce CO2 Emissions");
    for tip in [
        "Use renewable energy sources",
        "Promote energy efficiency",
        "Support carbon capture technologies",
        "Encourage sustainable transportation",
        "Plant trees and protect forests",
    ] {
        ui.label(format!("• {tip}"));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open local dataset…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!("Source: {}", state.emissions_source.describe()));

        if let (Some(ds), Some(out)) = (&state.dataset, &state.output) {
            ui.separator();
            ui.label(format!("{} records loaded, {} visible", ds.len(), out.filtered.len()));
        }
    });

    for err in [&state.emissions_error, &state.country_error].into_iter().flatten() {
        ui.label(RichText::new(format!("Error: {err}")).color(Color32::RED));
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open emissions data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("Delimited text", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_local(path);
    }
}
