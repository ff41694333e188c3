use std::collections::BTreeSet;

use super::error::{PipelineError, Result};

/// Number of future years projected when no horizon is given.
pub const DEFAULT_HORIZON: usize = 10;

/// One projected value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub year: i64,
    pub predicted_co2: f64,
}

/// Fitted line `co2 = slope * year + intercept` over raw calendar years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    /// Value of the line at year 0.
    pub intercept: f64,
}

impl LinearTrend {
    pub fn predict(&self, year: i64) -> f64 {
        self.slope * year as f64 + self.intercept
    }
}

/// Ordinary least squares over the `(year, co2)` pairs with a finite `co2`.
///
/// Needs at least two distinct years among those pairs.
pub fn fit(years: &[i64], co2: &[f64]) -> Result<LinearTrend> {
    if years.len() != co2.len() {
        return Err(PipelineError::LengthMismatch {
            years: years.len(),
            values: co2.len(),
        });
    }

    let points: Vec<(f64, f64)> = years
        .iter()
        .zip(co2)
        .filter(|(_, v)| v.is_finite())
        .map(|(&y, &v)| (y as f64, v))
        .collect();

    let distinct_years = points
        .iter()
        .map(|(x, _)| *x as i64)
        .collect::<BTreeSet<_>>()
        .len();
    if distinct_years < 2 {
        return Err(PipelineError::InsufficientData { distinct_years });
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
        let dx = x - mean_x;
        (sxx + dx * dx, sxy + dx * (y - mean_y))
    });

    let slope = sxy / sxx;
    Ok(LinearTrend {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Fit a trend and project `horizon` years past the latest input year.
///
/// The caller is expected to skip empty inputs; they fail here with
/// [`PipelineError::InsufficientData`].
pub fn forecast(years: &[i64], co2: &[f64], horizon: usize) -> Result<Vec<ForecastPoint>> {
    let trend = fit(years, co2)?;
    let last = years.iter().copied().max().unwrap_or_default();

    Ok((1..=horizon as i64)
        .map(|step| {
            let year = last + step;
            ForecastPoint {
                year,
                predicted_co2: trend.predict(year),
            }
        })
        .collect())
}
