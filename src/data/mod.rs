/// Data layer: loading, reconciliation, filtering and forecasting.
///
/// Architecture:
/// ```text
///  Kaggle archive / cached HTTP CSV / local file
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable      (memoized in cache)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ reconcile  │  source labels → ColumnMapping → Dataset
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year range / country → record indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ forecast  │  OLS trend → ForecastPoint × horizon
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod forecast;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod reconcile;
