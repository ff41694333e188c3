use std::path::PathBuf;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::cache::{DatasetCache, SourceId};
use crate::data::error::PipelineError;
use crate::data::filter::{FilterState, YearRange};
use crate::data::loader::{load_file, DataSource, Loader};
use crate::data::model::{Dataset, RawTable};
use crate::data::pipeline::{self, PipelineOutput};
use crate::data::reconcile::DEFAULT_ALIASES;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    loader: Option<Loader>,
    cache: DatasetCache,

    /// Where the emissions data comes from; a local file replaces the
    /// configured Kaggle dataset.
    pub emissions_source: DataSource,

    /// Reconciled emissions data (None until loaded successfully).
    pub dataset: Option<Dataset>,

    /// Deduplicated head of the country-level dataset.
    pub snapshot: Option<RawTable>,

    /// Current selections.
    pub filters: FilterState,

    /// Number of years to project.
    pub horizon: usize,

    /// Result of the last pipeline run (cached until selections change).
    pub output: Option<PipelineOutput>,

    /// Colour per country for the comparison chart.
    pub color_map: Option<ColorMap>,

    /// Last failure per input, shown in the UI.
    pub emissions_error: Option<PipelineError>,
    pub country_error: Option<PipelineError>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let loader = match Loader::new(config.http_timeout()) {
            Ok(loader) => Some(loader),
            Err(e) => {
                log::error!("Failed to set up HTTP client: {e:#}");
                None
            }
        };
        Self {
            emissions_source: config.source(SourceId::Emissions),
            filters: FilterState::new(config.year_range()),
            horizon: config.forecast_horizon,
            config,
            loader,
            cache: DatasetCache::new(),
            dataset: None,
            snapshot: None,
            output: None,
            color_map: None,
            emissions_error: None,
            country_error: None,
        }
    }

    /// Load (or fetch from the cache) both inputs.
    pub fn load_all(&mut self) {
        self.load_emissions();
        self.load_country_data();
    }

    /// Forget cached tables and load everything again.
    pub fn reload(&mut self) {
        self.cache.clear();
        self.load_all();
    }

    /// Use a local file as the emissions source.
    pub fn open_local(&mut self, path: PathBuf) {
        self.emissions_source = DataSource::LocalFile(path);
        self.load_emissions();
    }

    fn fetch(&mut self, id: SourceId, source: &DataSource) -> Result<std::sync::Arc<RawTable>, PipelineError> {
        let loader = &self.loader;
        self.cache.get_or_load(id, source, |s| match (loader, s) {
            (Some(loader), _) => loader.load(s),
            (None, DataSource::LocalFile(path)) => load_file(path),
            (None, _) => Err(anyhow::anyhow!("HTTP client unavailable")),
        })
    }

    pub fn load_emissions(&mut self) {
        let source = self.emissions_source.clone();
        let result = self
            .fetch(SourceId::Emissions, &source)
            .and_then(|table| pipeline::prepare(&table, DEFAULT_ALIASES));

        match result {
            Ok(dataset) => {
                log::info!(
                    "Emissions data ready: {} records, {} countries",
                    dataset.len(),
                    dataset.countries().len()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("{e}");
                self.dataset = None;
                self.output = None;
                self.color_map = None;
                self.emissions_error = Some(e);
            }
        }
    }

    pub fn load_country_data(&mut self) {
        let source = self.config.source(SourceId::CountryData);
        let result = self.fetch(SourceId::CountryData, &source).and_then(|table| {
            pipeline::country_snapshot(&table, &self.config.snapshot_key, self.config.snapshot_rows)
        });

        match result {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.country_error = None;
            }
            Err(e) => {
                log::error!("{e}");
                self.snapshot = None;
                self.country_error = Some(e);
            }
        }
    }

    /// Ingest a newly reconciled dataset, initialise filters and colours.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.filters = FilterState::for_dataset(&dataset, self.config.year_range());
        self.color_map = dataset
            .has_country()
            .then(|| ColorMap::new(&dataset.countries()));
        self.dataset = Some(dataset);
        self.emissions_error = None;
        self.refilter();
    }

    /// Re-run filtering and forecasting after a selection change.
    pub fn refilter(&mut self) {
        self.output = self
            .dataset
            .as_ref()
            .map(|ds| pipeline::run(ds, &self.filters, self.horizon));
    }

    pub fn set_year_range(&mut self, a: i64, b: i64) {
        let years = YearRange::new(a, b);
        if years != self.filters.years {
            self.filters.years = years;
            self.refilter();
        }
    }

    /// Select a single country, or `None` for the global view.
    pub fn select_country(&mut self, country: Option<String>) {
        if country != self.filters.country {
            self.filters.country = country;
            self.refilter();
        }
    }

    /// Add a country to, or remove it from, the comparison.
    pub fn toggle_comparison(&mut self, country: &str) {
        if !self.filters.comparison.remove(country) {
            self.filters.comparison.insert(country.to_string());
        }
        self.refilter();
    }

    /// Replace the comparison with exactly `countries`.
    pub fn set_comparison<I>(&mut self, countries: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.filters.comparison = countries.into_iter().collect();
        self.refilter();
    }

    pub fn clear_comparison(&mut self) {
        self.filters.comparison.clear();
        self.refilter();
    }

    pub fn set_horizon(&mut self, horizon: usize) {
        if horizon != self.horizon {
            self.horizon = horizon;
            self.refilter();
        }
    }
}
