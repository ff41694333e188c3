use super::error::{PipelineError, Result};
use super::filter::{comparison_indices, filtered_indices, year_indices, FilterState};
use super::forecast::{forecast, ForecastPoint};
use super::model::{Dataset, RawTable};
use super::reconcile::{reconcile, AliasTable};

/// Result of the forecast stage for one run.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    /// The filtered subset was empty; no fit was attempted.
    Skipped,
    /// The fit was attempted and refused (e.g. a single distinct year).
    Failed(PipelineError),
    Points(Vec<ForecastPoint>),
}

/// Everything the presentation layer draws for one set of selections.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Records inside the year range (and the selected country, if any).
    pub filtered: Vec<usize>,
    /// Latest year of the whole dataset.
    pub latest_year: Option<i64>,
    /// Filtered records from `latest_year`.
    pub latest: Vec<usize>,
    /// Records of the comparison countries inside the year range.
    pub comparison: Vec<usize>,
    pub forecast: ForecastOutcome,
}

/// Reconcile a loaded table and coerce it into canonical records.
pub fn prepare(table: &RawTable, aliases: &AliasTable) -> Result<Dataset> {
    let mapping = reconcile(&table.columns, aliases)?;
    let dataset = Dataset::from_table(table.clone(), mapping);
    if dataset.dropped_rows > 0 {
        log::warn!(
            "Dropped {} row(s) with a non-numeric '{}' value",
            dataset.dropped_rows,
            dataset.mapping.year.name
        );
    }
    Ok(dataset)
}

/// Filter, then forecast over the filtered subset.
pub fn run(dataset: &Dataset, filters: &FilterState, horizon: usize) -> PipelineOutput {
    let filtered = filtered_indices(dataset, filters);
    let latest_year = dataset.year_bounds().map(|(_, max)| max);
    let latest = latest_year
        .map(|year| year_indices(dataset, &filtered, year))
        .unwrap_or_default();
    let comparison = comparison_indices(dataset, filters);

    let outcome = if filtered.is_empty() {
        ForecastOutcome::Skipped
    } else {
        let years: Vec<i64> = filtered.iter().map(|&i| dataset.records[i].year).collect();
        let co2: Vec<f64> = filtered.iter().map(|&i| dataset.records[i].co2).collect();
        match forecast(&years, &co2, horizon) {
            Ok(points) => ForecastOutcome::Points(points),
            Err(e) => {
                log::info!("Forecast skipped: {e}");
                ForecastOutcome::Failed(e)
            }
        }
    };

    log::debug!(
        "Pipeline run: {} filtered, {} latest-year, {} comparison rows",
        filtered.len(),
        latest.len(),
        comparison.len()
    );

    PipelineOutput {
        filtered,
        latest_year,
        latest,
        comparison,
        forecast: outcome,
    }
}

/// First `rows` entries of `table`, one per distinct value of column `key`.
pub fn country_snapshot(table: &RawTable, key: &str, rows: usize) -> Result<RawTable> {
    let index = table
        .column_index(key)
        .ok_or_else(|| PipelineError::SchemaMismatch {
            missing: vec![key.to_string()],
            available: table.columns.clone(),
        })?;
    Ok(table.distinct_by(index, rows))
}
