use std::fmt::Write;

use crate::data::pipeline::ForecastOutcome;
use crate::state::AppState;

/// Plain-text summary of one pipeline run, for headless use.
pub fn render(state: &AppState) -> String {
    let mut out = String::new();

    for err in [&state.emissions_error, &state.country_error].into_iter().flatten() {
        let _ = writeln!(out, "Error: {err}");
    }

    let (Some(dataset), Some(output)) = (&state.dataset, &state.output) else {
        return out;
    };

    let years = state.filters.years;
    let scope = state.filters.country.as_deref().unwrap_or("Global");
    let _ = writeln!(
        out,
        "CO2 emissions {}–{} ({scope}): {} of {} records",
        years.lo,
        years.hi,
        output.filtered.len(),
        dataset.len()
    );

    let total: f64 = output
        .filtered
        .iter()
        .map(|&i| dataset.records[i].co2)
        .filter(|v| v.is_finite())
        .sum();
    let _ = writeln!(out, "Total {}: {total:.3}", dataset.mapping.co2.name);

    if let Some(year) = output.latest_year {
        let latest: f64 = output
            .latest
            .iter()
            .map(|&i| dataset.records[i].co2)
            .filter(|v| v.is_finite())
            .sum();
        let _ = writeln!(out, "In {year}: {latest:.3} ({} records)", output.latest.len());
    }

    match &output.forecast {
        ForecastOutcome::Points(points) => {
            let _ = writeln!(out, "Forecast:");
            for p in points {
                let _ = writeln!(out, "  {}  {:.3}", p.year, p.predicted_co2);
            }
        }
        ForecastOutcome::Failed(e) => {
            let _ = writeln!(out, "Forecast unavailable: {e}");
        }
        ForecastOutcome::Skipped => {
            let _ = writeln!(out, "Forecast skipped: no data for the current selection");
        }
    }

    if !state.filters.comparison.is_empty() {
        let _ = writeln!(out, "Comparison:");
        for country in &state.filters.comparison {
            let values: Vec<f64> = output
                .comparison
                .iter()
                .map(|&i| &dataset.records[i])
                .filter(|r| r.country.as_deref() == Some(country.as_str()) && r.co2.is_finite())
                .map(|r| r.co2)
                .collect();
            let mean = if values.is_empty() {
                f64::NAN
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            };
            let _ = writeln!(out, "  {country}: {} records, mean {mean:.3}", values.len());
        }
    }

    if let Some(snapshot) = &state.snapshot {
        let _ = writeln!(out, "Country snapshot ({} rows): {}", snapshot.len(), snapshot.columns.join(", "));
        for row in &snapshot.rows {
            let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            let _ = writeln!(out, "  {}", cells.join(" | "));
        }
    }

    out
}
