use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data::cache::SourceId;
use crate::data::filter::YearRange;
use crate::data::forecast::DEFAULT_HORIZON;
use crate::data::loader::DataSource;

/// Dashboard settings. Every field has a default, so a partial (or absent)
/// config file is fine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Kaggle dataset handle (`owner/name`) for the emissions data.
    pub kaggle_dataset: String,
    pub kaggle_api_base: String,
    /// Where downloaded Kaggle archives are extracted.
    pub cache_dir: PathBuf,
    /// Country-level CSV, downloaded once into `country_data_file`.
    pub country_data_url: String,
    pub country_data_file: PathBuf,
    /// Column the country snapshot is deduplicated on.
    pub snapshot_key: String,
    pub snapshot_rows: usize,
    pub forecast_horizon: usize,
    /// Initial year range, clamped to the data once loaded.
    pub default_year_range: (i64, i64),
    pub http_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            kaggle_dataset: "patricklford/global-co-emissions".to_string(),
            kaggle_api_base: "https://www.kaggle.com/api/v1".to_string(),
            cache_dir: PathBuf::from("data/kaggle"),
            country_data_url: "https://ourworldindata.org/grapher/annual-co2-emissions-per-country.csv"
                .to_string(),
            country_data_file: PathBuf::from("annual-co2-emissions-per-country.csv"),
            snapshot_key: "entity".to_string(),
            snapshot_rows: 10,
            forecast_horizon: DEFAULT_HORIZON,
            default_year_range: (2000, 2020),
            http_timeout_secs: 60,
        }
    }
}

impl DashboardConfig {
    /// Read settings from a JSON file. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.snapshot_rows == 0 {
            return Err(ConfigError::Invalid("snapshot_rows must be at least 1".into()));
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid("http_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn year_range(&self) -> YearRange {
        YearRange::new(self.default_year_range.0, self.default_year_range.1)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Default location of each input.
    pub fn source(&self, id: SourceId) -> DataSource {
        match id {
            SourceId::Emissions => DataSource::Kaggle {
                handle: self.kaggle_dataset.clone(),
                api_base: self.kaggle_api_base.clone(),
                cache_dir: self.cache_dir.clone(),
            },
            SourceId::CountryData => DataSource::RemoteCsv {
                url: self.country_data_url.clone(),
                cache_file: self.country_data_file.clone(),
            },
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}
