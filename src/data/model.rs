use std::collections::BTreeSet;
use std::fmt;

use super::reconcile::ColumnMapping;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from CSV, JSON or Parquet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl CellValue {
    /// Guess the type of a raw text cell the way a dataframe reader would.
    pub fn guess(s: &str) -> CellValue {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }

    /// Numeric view of the cell. Text is parsed, anything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Coerce to a calendar year. Fractional values are truncated toward
    /// zero; non-finite and non-numeric values yield `None`.
    pub fn as_year(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            CellValue::String(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .map(|v| v.trunc() as i64)
                })
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – loader output, before reconciliation
// ---------------------------------------------------------------------------

/// A rectangular table with normalized column labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column labels, trimmed and lower-cased.
    pub columns: Vec<String>,
    /// Row-major cells; every row has `columns.len()` entries.
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Build a table, normalizing the labels.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let columns = columns.iter().map(|c| normalize_label(c)).collect();
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by its normalized label.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = normalize_label(name);
        self.columns.iter().position(|c| *c == wanted)
    }

    /// The first `limit` rows whose `key` cell has not been seen before.
    /// Rows are kept in their original order.
    pub fn distinct_by(&self, key: usize, limit: usize) -> RawTable {
        let mut seen: Vec<&CellValue> = Vec::new();
        let mut rows = Vec::new();
        for row in &self.rows {
            if rows.len() == limit {
                break;
            }
            let Some(cell) = row.get(key) else {
                continue;
            };
            if seen.contains(&cell) {
                continue;
            }
            seen.push(cell);
            rows.push(row.clone());
        }
        RawTable {
            columns: self.columns.clone(),
            rows,
        }
    }
}

/// Column labels are compared trimmed and lower-cased.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// EmissionsRecord / Dataset – canonical view after reconciliation
// ---------------------------------------------------------------------------

/// One row in the canonical schema.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionsRecord {
    pub country: Option<String>,
    pub year: i64,
    /// `NaN` when the source cell was missing or not numeric.
    pub co2: f64,
}

/// A loaded dataset: canonical records plus the untouched source cells.
///
/// `records[i]` and `cells[i]` describe the same source row.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<EmissionsRecord>,
    pub cells: Vec<Vec<CellValue>>,
    pub mapping: ColumnMapping,
    /// Number of source rows dropped because the year did not parse.
    pub dropped_rows: usize,
}

impl Dataset {
    /// Coerce a reconciled table into canonical records.
    ///
    /// Rows whose year cell does not parse to an integer are dropped.
    pub fn from_table(table: RawTable, mapping: ColumnMapping) -> Self {
        let mut records = Vec::with_capacity(table.rows.len());
        let mut cells = Vec::with_capacity(table.rows.len());
        let mut dropped_rows = 0;

        for row in table.rows {
            let Some(year) = row.get(mapping.year.index).and_then(CellValue::as_year) else {
                dropped_rows += 1;
                continue;
            };
            let co2 = row
                .get(mapping.co2.index)
                .and_then(CellValue::as_f64)
                .unwrap_or(f64::NAN);
            let country = mapping.country.as_ref().and_then(|c| match row.get(c.index) {
                None | Some(CellValue::Null) => None,
                Some(CellValue::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
            });
            records.push(EmissionsRecord { country, year, co2 });
            cells.push(row);
        }

        Dataset {
            columns: table.columns,
            records,
            cells,
            mapping,
            dropped_rows,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether country filtering and comparison are available.
    pub fn has_country(&self) -> bool {
        self.mapping.country.is_some()
    }

    /// Smallest and largest year present, `None` for an empty dataset.
    pub fn year_bounds(&self) -> Option<(i64, i64)> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    /// Sorted distinct non-null country names.
    pub fn countries(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.country.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reconcile::{reconcile, DEFAULT_ALIASES};

    fn table(columns: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| CellValue::guess(c)).collect())
                .collect(),
        )
    }

    #[test]
    fn labels_are_trimmed_and_lowercased() {
        let t = table(&[" Country ", "YEAR", "Co2"], &[]);
        assert_eq!(t.columns, vec!["country", "year", "co2"]);
        assert_eq!(t.column_index("  Year"), Some(1));
    }

    #[test]
    fn year_coercion_drops_unparseable_rows() {
        let t = table(
            &["country", "year", "co2"],
            &[
                &["France", "2001", "10.5"],
                &["France", "2002.0", "11"],
                &["France", "n/a", "12"],
                &["France", "", "13"],
                &["Spain", "2003", "oops"],
            ],
        );
        let mapping = reconcile(&t.columns, DEFAULT_ALIASES).unwrap();
        let ds = Dataset::from_table(t, mapping);

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.dropped_rows, 2);
        assert_eq!(ds.records[1].year, 2002);
        assert!(ds.records[2].co2.is_nan());
        assert_eq!(ds.cells.len(), ds.records.len());
        assert_eq!(ds.year_bounds(), Some((2001, 2003)));
        assert_eq!(ds.countries(), vec!["France", "Spain"]);
    }

    #[test]
    fn dataset_without_country_column() {
        let t = table(&["year", "emissions"], &[&["1990", "1.0"]]);
        let mapping = reconcile(&t.columns, DEFAULT_ALIASES).unwrap();
        let ds = Dataset::from_table(t, mapping);
        assert!(!ds.has_country());
        assert_eq!(ds.records[0].country, None);
        assert!(ds.countries().is_empty());
    }

    #[test]
    fn distinct_by_keeps_first_occurrences() {
        let t = table(
            &["entity", "year"],
            &[&["A", "1"], &["A", "2"], &["B", "1"], &["C", "1"], &["B", "3"]],
        );
        let snap = t.distinct_by(0, 2);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.rows[0][0], CellValue::String("A".into()));
        assert_eq!(snap.rows[1][0], CellValue::String("B".into()));
        assert_eq!(t.distinct_by(0, 10).len(), 3);
    }
}
