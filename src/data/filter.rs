use std::collections::BTreeSet;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// Closed year interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub lo: i64,
    pub hi: i64,
}

impl YearRange {
    /// Build a range, swapping the bounds if given in reverse.
    pub fn new(a: i64, b: i64) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    pub fn contains(&self, year: i64) -> bool {
        self.lo <= year && year <= self.hi
    }

    /// Intersect with the data bounds; falls back to the bounds themselves
    /// when the two do not overlap.
    pub fn clamp_to(&self, min: i64, max: i64) -> Self {
        let lo = self.lo.clamp(min, max);
        let hi = self.hi.clamp(min, max);
        if self.hi < min || self.lo > max {
            YearRange::new(min, max)
        } else {
            YearRange::new(lo, hi)
        }
    }
}

/// User selections driving one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub years: YearRange,
    /// Single country for the main charts; `None` means global.
    pub country: Option<String>,
    /// Countries shown side by side in the comparison chart.
    pub comparison: BTreeSet<String>,
}

impl FilterState {
    pub fn new(years: YearRange) -> Self {
        Self {
            years,
            country: None,
            comparison: BTreeSet::new(),
        }
    }

    /// Initialise from a freshly loaded dataset: the preferred range clamped
    /// to the data, global view, nothing compared.
    pub fn for_dataset(dataset: &Dataset, preferred: YearRange) -> Self {
        let years = match dataset.year_bounds() {
            Some((min, max)) => preferred.clamp_to(min, max),
            None => preferred,
        };
        Self::new(years)
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return indices of records inside the year range and, if one is selected
/// and the dataset has a country column, matching the country exactly.
pub fn filtered_indices(dataset: &Dataset, filters: &FilterState) -> Vec<usize> {
    let country = filters.country.as_deref().filter(|_| dataset.has_country());
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| filters.years.contains(r.year))
        .filter(|(_, r)| match country {
            Some(c) => r.country.as_deref() == Some(c),
            None => true,
        })
        .map(|(i, _)| i)
        .collect()
}

/// Return indices of records inside the year range whose country is one of
/// the comparison selection. Empty when nothing is selected or the dataset
/// has no country column.
pub fn comparison_indices(dataset: &Dataset, filters: &FilterState) -> Vec<usize> {
    if filters.comparison.is_empty() || !dataset.has_country() {
        return Vec::new();
    }
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| filters.years.contains(r.year))
        .filter(|(_, r)| {
            r.country
                .as_ref()
                .is_some_and(|c| filters.comparison.contains(c))
        })
        .map(|(i, _)| i)
        .collect()
}

/// Of the already filtered `indices`, keep those recorded in `year`.
pub fn year_indices(dataset: &Dataset, indices: &[usize], year: i64) -> Vec<usize> {
    indices
        .iter()
        .copied()
        .filter(|&i| dataset.records[i].year == year)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, RawTable};
    use crate::data::reconcile::{reconcile, DEFAULT_ALIASES};

    fn dataset(rows: &[(&str, i64, f64)]) -> Dataset {
        let table = RawTable::new(
            vec!["country".into(), "year".into(), "co2".into()],
            rows.iter()
                .map(|(c, y, v)| {
                    vec![
                        CellValue::String(c.to_string()),
                        CellValue::Integer(*y),
                        CellValue::Float(*v),
                    ]
                })
                .collect(),
        );
        let mapping = reconcile(&table.columns, DEFAULT_ALIASES).unwrap();
        Dataset::from_table(table, mapping)
    }

    fn sample() -> Dataset {
        dataset(&[
            ("France", 1999, 1.0),
            ("France", 2000, 2.0),
            ("Germany", 2000, 3.0),
            ("France", 2001, 4.0),
            ("Germany", 2002, 5.0),
            ("India", 2003, 6.0),
        ])
    }

    #[test]
    fn year_range_is_inclusive() {
        let ds = sample();
        let f = FilterState::new(YearRange::new(2000, 2002));
        let idx = filtered_indices(&ds, &f);
        assert_eq!(idx, vec![1, 2, 3, 4]);
        assert!(idx.iter().all(|&i| f.years.contains(ds.records[i].year)));
    }

    #[test]
    fn single_year_range() {
        let ds = sample();
        let f = FilterState::new(YearRange::new(2000, 2000));
        assert_eq!(filtered_indices(&ds, &f), vec![1, 2]);
    }

    #[test]
    fn range_outside_data_is_empty_not_an_error() {
        let ds = sample();
        let f = FilterState::new(YearRange::new(1800, 1850));
        assert!(filtered_indices(&ds, &f).is_empty());
    }

    #[test]
    fn country_filter_is_exact_match() {
        let ds = sample();
        let mut f = FilterState::new(YearRange::new(1990, 2010));
        f.country = Some("France".into());
        assert_eq!(filtered_indices(&ds, &f), vec![0, 1, 3]);

        f.country = Some("france".into());
        assert!(filtered_indices(&ds, &f).is_empty());

        f.country = Some("Brazil".into());
        assert!(filtered_indices(&ds, &f).is_empty());
    }

    #[test]
    fn comparison_uses_same_range_independently() {
        let ds = sample();
        let mut f = FilterState::new(YearRange::new(2000, 2002));
        f.country = Some("India".into());
        f.comparison = ["France".to_string(), "Germany".to_string()].into();
        assert_eq!(comparison_indices(&ds, &f), vec![1, 2, 3, 4]);
        // The single-country filter is unaffected by the comparison set.
        assert!(filtered_indices(&ds, &f).is_empty());
    }

    #[test]
    fn comparison_empty_without_selection() {
        let ds = sample();
        let f = FilterState::new(YearRange::new(1990, 2010));
        assert!(comparison_indices(&ds, &f).is_empty());
    }

    #[test]
    fn filtering_does_not_mutate_source() {
        let ds = sample();
        let before = ds.records.clone();
        let mut f = FilterState::new(YearRange::new(2001, 2001));
        f.comparison.insert("Germany".into());
        let _ = filtered_indices(&ds, &f);
        let _ = comparison_indices(&ds, &f);
        assert_eq!(ds.records, before);
    }

    #[test]
    fn latest_year_subset() {
        let ds = sample();
        let f = FilterState::new(YearRange::new(1990, 2010));
        let idx = filtered_indices(&ds, &f);
        assert_eq!(year_indices(&ds, &idx, 2000), vec![1, 2]);
        assert!(year_indices(&ds, &idx, 1850).is_empty());
    }

    #[test]
    fn preferred_range_is_clamped_to_data() {
        let ds = sample();
        let f = FilterState::for_dataset(&ds, YearRange::new(2000, 2020));
        assert_eq!(f.years, YearRange::new(2000, 2003));

        let f = FilterState::for_dataset(&ds, YearRange::new(1700, 1800));
        assert_eq!(f.years, YearRange::new(1999, 2003));
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        assert_eq!(YearRange::new(2010, 2000), YearRange { lo: 2000, hi: 2010 });
    }
}
