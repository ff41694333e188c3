use thiserror::Error;

/// Failures surfaced by the pipeline stages.
///
/// Every variant is recovered where it occurs and shown to the user; none of
/// them terminates the process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Network, disk or parse failure while loading a source.
    #[error("Error loading {source_name}: {reason}")]
    LoadFailure { source_name: String, reason: String },

    /// A required column could not be found.
    #[error("Required columns ({}) not found in dataset. Available columns: {}", .missing.join(", "), .available.join(", "))]
    SchemaMismatch {
        missing: Vec<String>,
        available: Vec<String>,
    },

    /// Fewer than two distinct years to fit a trend on.
    #[error("Not enough data to forecast: {distinct_years} distinct year(s), need at least 2")]
    InsufficientData { distinct_years: usize },

    /// Year and emission sequences of different lengths.
    #[error("Forecast input mismatch: {years} years but {values} emission values")]
    LengthMismatch { years: usize, values: usize },
}

impl PipelineError {
    /// Wrap an `anyhow` error chain as a load failure for `source_name`.
    pub fn load(source_name: impl Into<String>, err: &anyhow::Error) -> Self {
        PipelineError::LoadFailure {
            source_name: source_name.into(),
            reason: format!("{err:#}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn schema_mismatch_lists_available_columns() {
        let err = PipelineError::SchemaMismatch {
            missing: vec!["year".into()],
            available: vec!["country".into(), "co2".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("year"));
        assert!(msg.contains("country, co2"));
    }

    #[test]
    fn load_failure_keeps_context_chain() {
        let inner: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
        let err = inner.context("fetching country data").unwrap_err();
        let msg = PipelineError::load("country data", &err).to_string();
        assert!(msg.contains("fetching country data"));
        assert!(msg.contains("connection refused"));
    }
}
