use std::collections::BTreeMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::data::forecast::ForecastPoint;
use crate::data::model::Dataset;
use crate::state::AppState;

const PLOT_HEIGHT: f32 = 260.0;
/// Above this many series the legend is hidden.
const MAX_LEGEND_ENTRIES: usize = 12;

/// Group the given records into one `[year, co2]` series per country.
/// Records without a finite value are left out.
fn series_by_country<'a>(dataset: &'a Dataset, indices: &[usize]) -> BTreeMap<&'a str, Vec<[f64; 2]>> {
    let mut series: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for &i in indices {
        let r = &dataset.records[i];
        if !r.co2.is_finite() {
            continue;
        }
        let key = r.country.as_deref().unwrap_or("Global");
        series.entry(key).or_default().push([r.year as f64, r.co2]);
    }
    for points in series.values_mut() {
        points.sort_by(|a, b| a[0].total_cmp(&b[0]));
    }
    series
}

/// Draw one coloured line per series.
fn draw_series(
    ui: &mut Ui,
    id: &str,
    y_label: &str,
    series: BTreeMap<&str, Vec<[f64; 2]>>,
    state: &AppState,
) {
    let mut plot = Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label(y_label)
        .allow_scroll(false);
    if series.len() <= MAX_LEGEND_ENTRIES {
        plot = plot.legend(Legend::default());
    }
    plot.show(ui, |plot_ui| {
        for (country, points) in series {
            let color = state
                .color_map
                .as_ref()
                .map(|cm| cm.color_for(country))
                .unwrap_or(Color32::LIGHT_BLUE);
            let points: PlotPoints = points.into_iter().collect();
            plot_ui.line(Line::new(points).name(country).color(color).width(1.5));
        }
    });
}

// ---------------------------------------------------------------------------
// Emissions over time
// ---------------------------------------------------------------------------

/// Line chart of the filtered records, one line per country.
pub fn emissions_over_time(ui: &mut Ui, state: &AppState, dataset: &Dataset) {
    let Some(output) = &state.output else {
        return;
    };
    let scope = state.filters.country.as_deref().unwrap_or("Global");
    ui.heading(format!("CO2 Emissions Over Time ({scope})"));

    if output.filtered.is_empty() {
        ui.label("No data for the current selection.");
        return;
    }
    let series = series_by_country(dataset, &output.filtered);
    draw_series(ui, "emissions_over_time", &dataset.mapping.co2.name, series, state);
}

// ---------------------------------------------------------------------------
// Latest year bar chart
// ---------------------------------------------------------------------------

/// Bar chart of the filtered records from the dataset's latest year.
pub fn latest_year_bars(ui: &mut Ui, state: &AppState, dataset: &Dataset) {
    let Some(output) = &state.output else {
        return;
    };
    if output.filtered.is_empty() {
        return;
    }
    let Some(year) = output.latest_year else {
        return;
    };
    ui.heading(format!("CO2 Emissions in {year}"));

    if output.latest.is_empty() {
        ui.label(format!("The selected range does not include {year}."));
        return;
    }

    let bars: Vec<Bar> = output
        .latest
        .iter()
        .map(|&i| &dataset.records[i])
        .filter(|r| r.co2.is_finite())
        .enumerate()
        .map(|(pos, r)| {
            let name = r.country.clone().unwrap_or_else(|| year.to_string());
            let color = state
                .color_map
                .as_ref()
                .map(|cm| cm.color_for(&name))
                .unwrap_or(Color32::LIGHT_BLUE);
            Bar::new(pos as f64, r.co2).name(name).fill(color)
        })
        .collect();

    Plot::new("latest_year_bars")
        .height(PLOT_HEIGHT)
        .y_axis_label(dataset.mapping.co2.name.clone())
        .show_x(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(format!("CO2 emissions in {year}")));
        });
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

/// Projected trend, drawn after the history it was fitted on.
pub fn forecast(ui: &mut Ui, state: &AppState, dataset: &Dataset, points: &[ForecastPoint]) {
    let Some(output) = &state.output else {
        return;
    };
    ui.heading(format!(
        "Forecasted CO2 Emissions for Next {} Years",
        points.len()
    ));

    let history: PlotPoints = output
        .filtered
        .iter()
        .map(|&i| &dataset.records[i])
        .filter(|r| r.co2.is_finite())
        .map(|r| [r.year as f64, r.co2])
        .collect();
    let projected: PlotPoints = points
        .iter()
        .map(|p| [p.year as f64, p.predicted_co2])
        .collect();

    Plot::new("forecast")
        .height(PLOT_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("predicted_co2")
        .legend(Legend::default())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(history)
                    .name("history")
                    .color(Color32::GRAY)
                    .radius(2.0),
            );
            plot_ui.line(
                Line::new(projected)
                    .name("predicted_co2")
                    .color(Color32::from_rgb(230, 120, 40))
                    .width(2.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// One line per compared country.
pub fn comparison(ui: &mut Ui, state: &AppState, dataset: &Dataset) {
    let Some(output) = &state.output else {
        return;
    };
    if state.filters.comparison.is_empty() {
        return;
    }
    ui.heading("CO2 Emissions Comparison by Country");

    if output.comparison.is_empty() {
        ui.label("No data for the compared countries in the selected range.");
        return;
    }
    let series = series_by_country(dataset, &output.comparison);
    draw_series(ui, "comparison", &dataset.mapping.co2.name, series, state);
}
