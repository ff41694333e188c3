use super::error::{PipelineError, Result};
use super::model::normalize_label;

// ---------------------------------------------------------------------------
// Canonical schema
// ---------------------------------------------------------------------------

/// Logical fields the pipeline works with, independent of source naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalKey {
    Country,
    Year,
    Co2,
}

impl CanonicalKey {
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalKey::Country => "country",
            CanonicalKey::Year => "year",
            CanonicalKey::Co2 => "co2",
        }
    }

    /// Whether reconciliation fails when the key cannot be resolved.
    pub fn is_required(self) -> bool {
        !matches!(self, CanonicalKey::Country)
    }
}

/// Canonical key → accepted source labels, most preferred first.
pub type AliasTable = [(CanonicalKey, &'static [&'static str])];

pub const DEFAULT_ALIASES: &AliasTable = &[
    (CanonicalKey::Country, &["country", "nation"]),
    (CanonicalKey::Year, &["year", "date"]),
    (CanonicalKey::Co2, &["co2", "emissions", "co2_emissions"]),
];

// ---------------------------------------------------------------------------
// ColumnMapping
// ---------------------------------------------------------------------------

/// A resolved source column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    /// Source column label as found in the table.
    pub name: String,
    /// Position of the column in the table.
    pub index: usize,
}

/// Where each canonical field lives in a particular source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub country: Option<ResolvedColumn>,
    pub year: ResolvedColumn,
    pub co2: ResolvedColumn,
}

/// Resolve each canonical key to the first alias present in `columns`.
///
/// Labels are compared trimmed and case-insensitively. `year` and `co2` are
/// required; a missing `country` only disables country features.
pub fn reconcile(columns: &[String], aliases: &AliasTable) -> Result<ColumnMapping> {
    let normalized: Vec<String> = columns.iter().map(|c| normalize_label(c)).collect();

    let resolve = |key: CanonicalKey| -> Option<ResolvedColumn> {
        let (_, options) = aliases.iter().find(|(k, _)| *k == key)?;
        options.iter().find_map(|alias| {
            let alias = normalize_label(alias);
            normalized
                .iter()
                .position(|c| *c == alias)
                .map(|index| ResolvedColumn {
                    name: columns[index].clone(),
                    index,
                })
        })
    };

    let country = resolve(CanonicalKey::Country);
    let year = resolve(CanonicalKey::Year);
    let co2 = resolve(CanonicalKey::Co2);

    match (year, co2) {
        (Some(year), Some(co2)) => {
            log::debug!(
                "Column mapping: country={:?} year={} co2={}",
                country.as_ref().map(|c| &c.name),
                year.name,
                co2.name
            );
            Ok(ColumnMapping { country, year, co2 })
        }
        (year, co2) => {
            let missing = [(CanonicalKey::Year, year.is_none()), (CanonicalKey::Co2, co2.is_none())]
                .into_iter()
                .filter(|(key, absent)| *absent && key.is_required())
                .map(|(key, _)| key.as_str().to_string())
                .collect();
            Err(PipelineError::SchemaMismatch {
                missing,
                available: columns.to_vec(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn picks_first_alias_in_preference_order() {
        // "emissions" appears before "co2" in the table, but "co2" is preferred.
        let columns = cols(&["nation", "emissions", "date", "co2", "year"]);
        let m = reconcile(&columns, DEFAULT_ALIASES).unwrap();
        assert_eq!(m.country.unwrap().name, "nation");
        assert_eq!(m.year, ResolvedColumn { name: "year".into(), index: 4 });
        assert_eq!(m.co2, ResolvedColumn { name: "co2".into(), index: 3 });
    }

    #[test]
    fn matching_ignores_case_and_whitespace() {
        let columns = cols(&[" Country", "YEAR ", "CO2_Emissions"]);
        let m = reconcile(&columns, DEFAULT_ALIASES).unwrap();
        assert_eq!(m.country.unwrap().index, 0);
        assert_eq!(m.year.name, "YEAR ");
        assert_eq!(m.co2.index, 2);
    }

    #[test]
    fn country_is_optional() {
        let m = reconcile(&cols(&["date", "emissions"]), DEFAULT_ALIASES).unwrap();
        assert!(m.country.is_none());
        assert_eq!(m.year.name, "date");
        assert_eq!(m.co2.name, "emissions");
    }

    #[test]
    fn missing_year_is_schema_mismatch() {
        let columns = cols(&["country", "co2", "population"]);
        match reconcile(&columns, DEFAULT_ALIASES) {
            Err(PipelineError::SchemaMismatch { missing, available }) => {
                assert_eq!(missing, vec!["year"]);
                assert_eq!(available, columns);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_both_required_columns() {
        match reconcile(&cols(&["entity"]), DEFAULT_ALIASES) {
            Err(PipelineError::SchemaMismatch { missing, .. }) => {
                assert_eq!(missing, vec!["year", "co2"]);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn custom_alias_table() {
        const OWID: &AliasTable = &[
            (CanonicalKey::Country, &["entity"]),
            (CanonicalKey::Year, &["year"]),
            (CanonicalKey::Co2, &["annual co₂ emissions"]),
        ];
        let columns = cols(&["Entity", "Code", "Year", "Annual CO₂ emissions"]);
        let m = reconcile(&columns, OWID).unwrap();
        assert_eq!(m.country.unwrap().index, 0);
        assert_eq!(m.co2.index, 3);
    }
}
