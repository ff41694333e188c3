use std::collections::BTreeSet;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::compute::{can_cast_types, cast};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawTable};

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Where a table comes from, together with the parameters that identify it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// A dataset published on Kaggle, addressed as `owner/name`. The archive
    /// is extracted under `cache_dir/owner/name/` and reused afterwards.
    Kaggle {
        handle: String,
        api_base: String,
        cache_dir: PathBuf,
    },
    /// A comma-separated file served over HTTP, kept in `cache_file` after
    /// the first download.
    RemoteCsv { url: String, cache_file: PathBuf },
    /// A file picked by the user.
    LocalFile(PathBuf),
}

impl DataSource {
    /// Short human-readable description for logs and messages.
    pub fn describe(&self) -> String {
        match self {
            DataSource::Kaggle { handle, .. } => format!("Kaggle dataset {handle}"),
            DataSource::RemoteCsv { url, .. } => url.clone(),
            DataSource::LocalFile(path) => path.display().to_string(),
        }
    }
}

/// How to treat rows that do not fit the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadLines {
    /// Drop the row and keep reading.
    Skip,
    /// Fail the whole load.
    Error,
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Reads tables from disk or the network.
pub struct Loader {
    client: reqwest::blocking::Client,
}

impl Loader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    /// Load a table from `source`. Column labels are normalized.
    pub fn load(&self, source: &DataSource) -> Result<RawTable> {
        let table = match source {
            DataSource::Kaggle {
                handle,
                api_base,
                cache_dir,
            } => self.load_kaggle(handle, api_base, cache_dir)?,
            DataSource::RemoteCsv { url, cache_file } => self.load_remote_csv(url, cache_file)?,
            DataSource::LocalFile(path) => load_file(path)?,
        };
        log::info!(
            "Loaded {} rows with columns {:?} from {}",
            table.len(),
            table.columns,
            source.describe()
        );
        Ok(table)
    }

    fn load_kaggle(&self, handle: &str, api_base: &str, cache_dir: &Path) -> Result<RawTable> {
        let (owner, name) = handle
            .split_once('/')
            .filter(|(o, n)| !o.is_empty() && !n.is_empty() && !n.contains('/'))
            .with_context(|| format!("Invalid dataset handle '{handle}', expected owner/name"))?;
        let dir = cache_dir.join(owner).join(name);

        if first_csv(&dir)?.is_none() {
            let url = format!("{}/datasets/download/{owner}/{name}", api_base.trim_end_matches('/'));
            self.download_archive(&url, name, &dir)?;
        } else {
            log::debug!("Using cached dataset in {}", dir.display());
        }

        let csv_path = first_csv(&dir)?.context("No CSV file found in dataset folder.")?;
        read_delimited(&csv_path)
    }

    fn download_archive(&self, url: &str, name: &str, dir: &Path) -> Result<()> {
        log::info!("Downloading {url}");
        let mut request = self.client.get(url);
        if let (Ok(user), Ok(key)) = (std::env::var("KAGGLE_USERNAME"), std::env::var("KAGGLE_KEY")) {
            request = request.basic_auth(user, Some(key));
        }
        let bytes = request
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())
            .with_context(|| format!("downloading {url}"))?;

        unpack_dataset(&bytes, name, dir)
    }

    fn load_remote_csv(&self, url: &str, cache_file: &Path) -> Result<RawTable> {
        if !cache_file.exists() {
            log::info!("Downloading {url} to {}", cache_file.display());
            let bytes = self
                .client
                .get(url)
                .send()
                .and_then(|r| r.error_for_status())
                .and_then(|r| r.bytes())
                .with_context(|| format!("downloading {url}"))?;
            write_cache_file(&bytes, cache_file)?;
        } else {
            log::debug!("Using cached file {}", cache_file.display());
        }

        let file = std::fs::File::open(cache_file)
            .with_context(|| format!("opening {}", cache_file.display()))?;
        read_table(file, b',', BadLines::Error)
    }
}

/// Sibling path used while `path` is being written.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.part"))
}

/// Write a downloaded file next to `cache_file`, then rename it into place.
/// A failed or interrupted write never leaves a file at `cache_file`.
fn write_cache_file(bytes: &[u8], cache_file: &Path) -> Result<()> {
    if let Some(parent) = cache_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let tmp_path = staging_path(cache_file);
    if let Err(e) = std::fs::write(&tmp_path, bytes) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e).with_context(|| format!("writing {}", tmp_path.display()));
    }
    std::fs::rename(&tmp_path, cache_file).with_context(|| {
        format!("renaming {} -> {}", tmp_path.display(), cache_file.display())
    })
}

/// Unpack a downloaded dataset into `dir`.
///
/// A zip archive is extracted, anything else is stored as `<name>.csv`.
/// Work happens in a staging directory that only becomes `dir` once
/// everything is on disk.
fn unpack_dataset(bytes: &[u8], name: &str, dir: &Path) -> Result<()> {
    let staging = staging_path(dir);
    if staging.exists() {
        std::fs::remove_dir_all(&staging)
            .with_context(|| format!("removing stale {}", staging.display()))?;
    }
    std::fs::create_dir_all(&staging).with_context(|| format!("creating {}", staging.display()))?;

    let result = if bytes.starts_with(b"PK") {
        zip::ZipArchive::new(Cursor::new(bytes))
            .context("opening dataset archive")
            .and_then(|mut archive| {
                archive
                    .extract(&staging)
                    .with_context(|| format!("extracting archive into {}", staging.display()))
            })
    } else {
        let target = staging.join(format!("{name}.csv"));
        std::fs::write(&target, bytes).with_context(|| format!("writing {}", target.display()))
    };
    if let Err(e) = result {
        let _ = std::fs::remove_dir_all(&staging);
        return Err(e);
    }

    // No CSV was found in `dir`, so anything left there is a previous partial attempt.
    if dir.exists() {
        std::fs::remove_dir_all(dir).with_context(|| format!("removing {}", dir.display()))?;
    }
    std::fs::rename(&staging, dir)
        .with_context(|| format!("renaming {} -> {}", staging.display(), dir.display()))
}

/// First `.csv` file in `dir` by name, `None` if there is none or the
/// directory does not exist yet.
fn first_csv(dir: &Path) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let files: BTreeSet<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    Ok(files.into_iter().next())
}

// ---------------------------------------------------------------------------
// Local files
// ---------------------------------------------------------------------------

/// Load a table from a local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` / `.txt` – delimited text, delimiter auto-detected
/// * `.json`    – `[{ "country": ..., "year": ..., ... }, ...]`
/// * `.parquet` – any flat schema of scalar columns
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "tsv" | "txt" => read_delimited(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
const SNIFF_LINES: usize = 20;

/// Read delimited text with a sniffed delimiter, skipping malformed lines.
pub fn read_delimited(path: &Path) -> Result<RawTable> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let head = &bytes[..bytes.len().min(64 * 1024)];
    let delimiter = sniff_delimiter(&String::from_utf8_lossy(head));
    log::debug!(
        "Sniffed delimiter {:?} for {}",
        delimiter as char,
        path.display()
    );
    read_table(bytes.as_slice(), delimiter, BadLines::Skip)
        .with_context(|| format!("parsing {}", path.display()))
}

/// Guess the field delimiter from the first lines of a text sample.
///
/// A candidate scores by how many lines contain it (outside quotes) exactly
/// as often as the header does. Ties go to the candidate with more fields,
/// then to the earlier candidate. Falls back to a comma.
pub fn sniff_delimiter(sample: &str) -> u8 {
    let lines: Vec<&str> = sample
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    let Some(header) = lines.first() else {
        return b',';
    };

    let mut best = (0usize, 0usize, b',');
    for &candidate in &DELIMITER_CANDIDATES {
        let expected = count_unquoted(header, candidate);
        if expected == 0 {
            continue;
        }
        let consistent = lines
            .iter()
            .filter(|l| count_unquoted(l, candidate) == expected)
            .count();
        if (consistent, expected) > (best.0, best.1) {
            best = (consistent, expected, candidate);
        }
    }
    best.2
}

fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    line.bytes()
        .filter(|&b| {
            if b == b'"' {
                in_quotes = !in_quotes;
            }
            !in_quotes && b == delimiter
        })
        .count()
}

/// Parse delimited text with a header row.
///
/// Rows shorter than the header are padded with nulls. Longer rows and rows
/// that fail to decode are skipped or fail the load depending on `bad_lines`.
pub fn read_table<R: Read>(reader: R, delimiter: u8, bad_lines: BadLines) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        bail!("CSV file has no header row");
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) if record.len() <= headers.len() => record,
            Ok(record) => {
                if bad_lines == BadLines::Error {
                    bail!(
                        "CSV row {row_no}: expected {} fields, saw {}",
                        headers.len(),
                        record.len()
                    );
                }
                skipped += 1;
                continue;
            }
            Err(e) => {
                if bad_lines == BadLines::Error {
                    return Err(e).with_context(|| format!("CSV row {row_no}"));
                }
                skipped += 1;
                continue;
            }
        };

        let mut row: Vec<CellValue> = record.iter().map(CellValue::guess).collect();
        row.resize(headers.len(), CellValue::Null);
        rows.push(row);
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} malformed line(s)");
    }
    Ok(RawTable::new(headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "country": "France", "year": 2001, "co2": 401.2 },
///   ...
/// ]
/// ```
///
/// Columns are the union of all keys; absent keys become nulls.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            columns
                .iter()
                .map(|c| obj.get(c).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with scalar columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Integer columns of any width come back
/// as integers, floating and decimal columns as floats; everything else is
/// rendered as text.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let normalized = batch
            .columns()
            .iter()
            .zip(&columns)
            .map(|(col, name)| {
                normalize_column(col).with_context(|| format!("converting column '{name}'"))
            })
            .collect::<Result<Vec<ArrayRef>>>()?;
        for row in 0..batch.num_rows() {
            rows.push(normalized.iter().map(|col| extract_cell(col, row)).collect());
        }
    }

    Ok(RawTable::new(columns, rows))
}

/// Cast a column to one of the types `extract_cell` reads directly:
/// Int64, Float64, Boolean or Utf8.
fn normalize_column(col: &ArrayRef) -> Result<ArrayRef> {
    let target = match col.data_type() {
        DataType::Int64 | DataType::Float64 | DataType::Boolean | DataType::Utf8 => {
            return Ok(Arc::clone(col));
        }
        dt if dt.is_integer() => DataType::Int64,
        dt if dt.is_floating() => DataType::Float64,
        DataType::Decimal128(..) | DataType::Decimal256(..) => DataType::Float64,
        dt if can_cast_types(dt, &DataType::Utf8) => DataType::Utf8,
        // Nested types are rendered cell by cell.
        _ => return Ok(Arc::clone(col)),
    };
    Ok(cast(col, &target)?)
}

/// Extract a single cell from a normalized Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|s| CellValue::String(s.value(row).to_string()))
            .unwrap_or(CellValue::Null),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row)))
            .unwrap_or(CellValue::Null),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row)))
            .unwrap_or(CellValue::Null),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row)))
            .unwrap_or(CellValue::Null),
        _ => array_value_to_string(col, row)
            .map(CellValue::String)
            .unwrap_or(CellValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{Int16Array, UInt8Array};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use crate::data::pipeline::prepare;
    use crate::data::reconcile::DEFAULT_ALIASES;

    #[test]
    fn sniffs_common_delimiters() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3\n"), b',');
        assert_eq!(sniff_delimiter("a;b;c\n1;2,5;3\n4;5;6\n"), b';');
        assert_eq!(sniff_delimiter("a\tb\n1\t2\n"), b'\t');
        assert_eq!(sniff_delimiter("a|b|c\n1|2|3\n"), b'|');
        assert_eq!(sniff_delimiter("\"x,y\";z\n\"1,2\";3\n"), b';');
        assert_eq!(sniff_delimiter("single\n1\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn skips_overlong_rows_and_pads_short_ones() {
        let text = "Country;Year;CO2\nFrance;2001;1.5\nbroken;2002;1;extra\nSpain;2003\n";
        let t = read_table(text.as_bytes(), b';', BadLines::Skip).unwrap();
        assert_eq!(t.columns, vec!["country", "year", "co2"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows[0][2], CellValue::Float(1.5));
        assert_eq!(t.rows[1][2], CellValue::Null);
    }

    #[test]
    fn strict_mode_rejects_overlong_rows() {
        let text = "a,b\n1,2\n1,2,3\n";
        assert!(read_table(text.as_bytes(), b',', BadLines::Error).is_err());
    }

    #[test]
    fn undecodable_rows_follow_bad_line_policy() {
        let bytes: &[u8] = b"country,year,co2\nChad,2000,1\n\xff\xfe,2001,2\nPeru,2002,3\n";
        let t = read_table(bytes, b',', BadLines::Skip).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows[1][0], CellValue::String("Peru".into()));

        assert!(read_table(bytes, b',', BadLines::Error).is_err());
    }

    #[test]
    fn reads_delimited_file_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, " Nation |Date|Emissions\nChad|1990|0.1\nPeru|1991|2.5\n").unwrap();
        let t = load_file(file.path()).unwrap();
        assert_eq!(t.columns, vec!["nation", "date", "emissions"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows[1][0], CellValue::String("Peru".into()));
    }

    #[test]
    fn loads_json_records() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"Country":"France","Year":2001,"CO2":3.5}},{{"Country":"Chad","Year":2002}}]"#
        )
        .unwrap();
        let t = load_file(file.path()).unwrap();
        assert_eq!(t.columns.len(), 3);
        let co2 = t.column_index("co2").unwrap();
        assert_eq!(t.rows[0][co2], CellValue::Float(3.5));
        assert_eq!(t.rows[1][co2], CellValue::Null);
    }

    #[test]
    fn loads_parquet_with_narrow_integer_columns() {
        let batch = RecordBatch::try_from_iter(vec![
            (
                "Country",
                Arc::new(StringArray::from(vec!["Chad", "Chad", "Chad"])) as ArrayRef,
            ),
            ("Year", Arc::new(Int16Array::from(vec![2000i16, 2001, 2002])) as ArrayRef),
            (
                "CO2",
                Arc::new(Float64Array::from(vec![Some(10.0), None, Some(14.0)])) as ArrayRef,
            ),
            ("Rank", Arc::new(UInt8Array::from(vec![3u8, 2, 1])) as ArrayRef),
        ])
        .unwrap();
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let t = load_file(file.path()).unwrap();
        assert_eq!(t.columns, vec!["country", "year", "co2", "rank"]);
        assert_eq!(
            t.rows[0],
            vec![
                CellValue::String("Chad".into()),
                CellValue::Integer(2000),
                CellValue::Float(10.0),
                CellValue::Integer(3),
            ]
        );
        assert_eq!(t.rows[1][2], CellValue::Null);

        let ds = prepare(&t, DEFAULT_ALIASES).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.dropped_rows, 0);
        assert_eq!(ds.year_bounds(), Some((2000, 2002)));
    }

    #[test]
    fn cache_file_is_written_through_a_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache_file = dir.path().join("nested").join("annual.csv");
        write_cache_file(b"year\n2000\n", &cache_file).unwrap();
        assert_eq!(std::fs::read_to_string(&cache_file).unwrap(), "year\n2000\n");
        assert!(!staging_path(&cache_file).exists());

        // A write that cannot complete leaves no cache file behind.
        let blocked = dir.path().join("blocked.csv");
        std::fs::create_dir_all(staging_path(&blocked)).unwrap();
        assert!(write_cache_file(b"year\n", &blocked).is_err());
        assert!(!blocked.exists());
    }

    #[test]
    fn broken_archive_leaves_no_dataset_folder() {
        let cache_dir = tempfile::tempdir().unwrap();
        let dir = cache_dir.path().join("someone").join("emissions");

        let err = unpack_dataset(b"PK\x03\x04truncated", "emissions", &dir).unwrap_err();
        assert!(format!("{err:#}").contains("archive"));
        assert!(!dir.exists());
        assert!(!staging_path(&dir).exists());
        assert_eq!(first_csv(&dir).unwrap(), None);
    }

    #[test]
    fn archive_is_extracted_into_place() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("co2.csv", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"country,year,co2\nChad,2000,1\n").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let cache_dir = tempfile::tempdir().unwrap();
        let dir = cache_dir.path().join("someone").join("emissions");
        // Left over from an interrupted attempt.
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("partial.tmp"), "x").unwrap();

        unpack_dataset(&bytes, "emissions", &dir).unwrap();
        assert_eq!(first_csv(&dir).unwrap(), Some(dir.join("co2.csv")));
        assert!(!dir.join("partial.tmp").exists());
        assert!(!staging_path(&dir).exists());
    }

    #[test]
    fn plain_csv_download_is_stored_under_dataset_name() {
        let cache_dir = tempfile::tempdir().unwrap();
        let dir = cache_dir.path().join("someone").join("emissions");
        unpack_dataset(b"country,year,co2\n", "emissions", &dir).unwrap();
        assert_eq!(first_csv(&dir).unwrap(), Some(dir.join("emissions.csv")));
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        assert!(load_file(file.path()).is_err());
    }

    #[test]
    fn remote_csv_reuses_cached_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache_file = dir.path().join("annual.csv");
        std::fs::write(&cache_file, "Entity,Code,Year,Annual CO2 emissions\nChad,TCD,2000,1.0\n")
            .unwrap();

        let loader = Loader::new(Duration::from_secs(1)).unwrap();
        // The URL is unreachable; a cache hit never touches it.
        let source = DataSource::RemoteCsv {
            url: "http://127.0.0.1:9/never".into(),
            cache_file,
        };
        let t = loader.load(&source).unwrap();
        assert_eq!(t.columns[0], "entity");
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn kaggle_reuses_extracted_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let dataset_dir = dir.path().join("someone").join("emissions");
        std::fs::create_dir_all(&dataset_dir).unwrap();
        std::fs::write(dataset_dir.join("b.csv"), "x\n1\n").unwrap();
        std::fs::write(dataset_dir.join("a.csv"), "country;year;co2\nChad;2000;1\n").unwrap();
        std::fs::write(dataset_dir.join("notes.txt"), "ignored").unwrap();

        let loader = Loader::new(Duration::from_secs(1)).unwrap();
        let source = DataSource::Kaggle {
            handle: "someone/emissions".into(),
            api_base: "http://127.0.0.1:9".into(),
            cache_dir: dir.path().to_path_buf(),
        };
        let t = loader.load(&source).unwrap();
        assert_eq!(t.columns, vec!["country", "year", "co2"]);
    }

    #[test]
    fn kaggle_handle_must_have_owner_and_name() {
        let loader = Loader::new(Duration::from_secs(1)).unwrap();
        let source = DataSource::Kaggle {
            handle: "no-slash".into(),
            api_base: "http://127.0.0.1:9".into(),
            cache_dir: std::env::temp_dir(),
        };
        let err = loader.load(&source).unwrap_err();
        assert!(format!("{err:#}").contains("owner/name"));
    }
}
