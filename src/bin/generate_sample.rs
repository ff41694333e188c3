//! Writes a synthetic emissions dataset for offline use of the dashboard
//! (File → Open local dataset…): `sample_emissions.parquet` and a
//! semicolon-separated `sample_emissions.csv` with the same rows.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (country, ISO code, emissions in 1960 in Mt, yearly growth in Mt)
const COUNTRIES: [(&str, &str, f64, f64); 6] = [
    ("Brazil", "BRA", 45.0, 7.5),
    ("China", "CHN", 780.0, 160.0),
    ("France", "FRA", 270.0, 1.2),
    ("India", "IND", 110.0, 42.0),
    ("Nigeria", "NGA", 3.5, 2.1),
    ("United States", "USA", 2900.0, 48.0),
];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut countries: Vec<&str> = Vec::new();
    let mut codes: Vec<&str> = Vec::new();
    let mut years: Vec<i64> = Vec::new();
    let mut co2: Vec<f64> = Vec::new();

    for &(country, code, base, growth) in &COUNTRIES {
        for year in 1960..=2022i64 {
            let trend = base + growth * (year - 1960) as f64;
            let value = (trend + rng.gauss(0.0, 0.03 * trend)).max(0.0);
            countries.push(country);
            codes.push(code);
            years.push(year);
            co2.push((value * 1000.0).round() / 1000.0);
        }
    }

    // CSV (semicolon-separated, exercises delimiter detection)
    let csv_path = "sample_emissions.csv";
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(csv_path)
        .context("creating CSV output")?;
    writer.write_record(["Country", "Code", "Year", "CO2"])?;
    for i in 0..years.len() {
        writer.write_record([
            countries[i].to_string(),
            codes[i].to_string(),
            years[i].to_string(),
            co2[i].to_string(),
        ])?;
    }
    writer.flush()?;

    // Parquet
    let schema = Arc::new(Schema::new(vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("code", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
        Field::new("co2", DataType::Float64, false),
    ]));

    let n_rows = years.len();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(countries)),
            Arc::new(StringArray::from(codes)),
            Arc::new(Int64Array::from(years)),
            Arc::new(Float64Array::from(co2)),
        ],
    )
    .context("building record batch")?;

    let parquet_path = "sample_emissions.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;

    println!(
        "Wrote {n_rows} rows ({} countries) to {csv_path} and {parquet_path}",
        COUNTRIES.len()
    );
    Ok(())
}
