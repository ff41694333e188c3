use std::collections::HashMap;
use std::sync::Arc;

use super::error::{PipelineError, Result};
use super::loader::DataSource;
use super::model::RawTable;

/// Which of the dashboard's inputs a cached table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// Emissions dataset driving the charts and the forecast.
    Emissions,
    /// Country-level dataset behind the snapshot table.
    CountryData,
}

impl SourceId {
    pub fn label(self) -> &'static str {
        match self {
            SourceId::Emissions => "emissions data",
            SourceId::CountryData => "country data",
        }
    }
}

/// Memoized loads keyed by source and load parameters.
///
/// One entry per [`SourceId`]. Asking for a source with different
/// parameters replaces its entry; failed loads are never stored.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<SourceId, (DataSource, Arc<RawTable>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `(id, source)` or run `load` and keep
    /// its result on success.
    pub fn get_or_load<F>(&mut self, id: SourceId, source: &DataSource, load: F) -> Result<Arc<RawTable>>
    where
        F: FnOnce(&DataSource) -> anyhow::Result<RawTable>,
    {
        if let Some((cached_source, table)) = self.entries.get(&id) {
            if cached_source == source {
                log::debug!("Cache hit for {}", id.label());
                return Ok(Arc::clone(table));
            }
            log::debug!("Load parameters for {} changed, reloading", id.label());
        }

        let table = load(source).map_err(|e| PipelineError::load(id.label(), &e))?;
        let table = Arc::new(table);
        self.entries.insert(id, (source.clone(), Arc::clone(&table)));
        Ok(table)
    }

    /// Drop every entry so the next request loads again.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;

    fn local(name: &str) -> DataSource {
        DataSource::LocalFile(PathBuf::from(name))
    }

    fn table() -> RawTable {
        RawTable::new(vec!["year".into()], vec![])
    }

    #[test]
    fn loads_once_per_parameter_set() {
        let mut cache = DatasetCache::new();
        let calls = Cell::new(0);
        let load = |_: &DataSource| -> anyhow::Result<RawTable> {
            calls.set(calls.get() + 1);
            Ok(table())
        };

        let a = cache.get_or_load(SourceId::Emissions, &local("a.csv"), load).unwrap();
        let b = cache.get_or_load(SourceId::Emissions, &local("a.csv"), load).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));

        cache.get_or_load(SourceId::Emissions, &local("b.csv"), load).unwrap();
        assert_eq!(calls.get(), 2);

        cache.get_or_load(SourceId::CountryData, &local("b.csv"), load).unwrap();
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache = DatasetCache::new();
        let err = cache
            .get_or_load(SourceId::CountryData, &local("x.csv"), |_| {
                Err(anyhow::anyhow!("connection reset"))
            })
            .unwrap_err();
        assert!(matches!(err, PipelineError::LoadFailure { .. }));

        let calls = Cell::new(0);
        for _ in 0..2 {
            cache
                .get_or_load(SourceId::CountryData, &local("x.csv"), |_| {
                    calls.set(calls.get() + 1);
                    Ok(table())
                })
                .unwrap();
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn clear_forces_reload() {
        let mut cache = DatasetCache::new();
        let calls = Cell::new(0);
        let load = |_: &DataSource| -> anyhow::Result<RawTable> {
            calls.set(calls.get() + 1);
            Ok(table())
        };
        cache.get_or_load(SourceId::Emissions, &local("a.csv"), load).unwrap();
        cache.clear();
        cache.get_or_load(SourceId::Emissions, &local("a.csv"), load).unwrap();
        assert_eq!(calls.get(), 2);
    }
}
