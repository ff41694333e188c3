use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::pipeline::ForecastOutcome;
use crate::state::AppState;
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct Co2DashboardApp {
    pub state: AppState,
}

impl Co2DashboardApp {
    /// Takes a state whose inputs are already loaded.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for Co2DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts and tables ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dashboard(ui, &self.state));
        });
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    ui.heading(RichText::new("Global CO2 Emissions Dashboard").size(24.0));
    ui.add_space(8.0);

    match (&state.dataset, &state.output) {
        (Some(dataset), Some(output)) => {
            plot::emissions_over_time(ui, state, dataset);
            ui.separator();
            plot::latest_year_bars(ui, state, dataset);
            ui.separator();

            match &output.forecast {
                ForecastOutcome::Points(points) => plot::forecast(ui, state, dataset, points),
                ForecastOutcome::Failed(e) => {
                    ui.heading("CO2 Emissions Forecast");
                    ui.label(RichText::new(e.to_string()).color(Color32::YELLOW));
                }
                ForecastOutcome::Skipped => {}
            }
            ui.separator();

            plot::comparison(ui, state, dataset);
        }
        _ => {
            ui.label("Emissions data unavailable. Use File → Reload or open a local dataset.");
        }
    }

    ui.separator();
    if let Some(snapshot) = &state.snapshot {
        tables::country_snapshot(ui, snapshot);
        ui.separator();
    }

    if let (Some(dataset), Some(output)) = (&state.dataset, &state.output) {
        tables::raw_data(ui, dataset, &output.filtered);
    }
}
