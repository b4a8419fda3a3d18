use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate, Timelike};
use clap::Parser;
use parquet::arrow::ArrowWriter;

const SITES: [(&str, f64); 2] = [("shunyi", 0.0), ("guanyan", -2.5)];
const METRICS: [&str; 5] = ["PM2.5", "PM10", "TEMP", "DEWP", "WSPM"];

/// Write a synthetic two-site hourly air-quality dataset.
#[derive(Parser, Debug)]
struct Args {
    /// Output file; `.parquet` writes Parquet, anything else CSV
    #[arg(default_value = "main_data.csv")]
    output: PathBuf,

    /// Number of days starting 2013-03-01
    #[arg(long, default_value_t = 60)]
    days: u32,

    /// Fraction of cells left empty
    #[arg(long, default_value_t = 0.02)]
    missing: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

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

/// One hour: calendar fields plus `[site][metric]` values (None = missing).
struct Row {
    time: [i64; 4],
    values: [[Option<f64>; 5]; 2],
}

fn generate(args: &Args) -> Vec<Row> {
    let mut rng = SimpleRng::new(args.seed);
    let start = NaiveDate::from_ymd_opt(2013, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    // slowly drifting pollution episode level, shared by both sites
    let mut episode = 60.0_f64;
    let mut rows = Vec::with_capacity(args.days as usize * 24);

    for h in 0..(args.days as i64 * 24) {
        let t = start + Duration::hours(h);
        let day_of_year = t.ordinal() as f64;
        let hour = t.hour() as f64;

        episode = (episode + rng.gauss(0.0, 6.0)).clamp(5.0, 350.0);
        let seasonal = 12.0 - 14.0 * (2.0 * std::f64::consts::PI * (day_of_year + 10.0) / 365.0).cos();
        let diurnal = 4.0 * (2.0 * std::f64::consts::PI * (hour - 9.0) / 24.0).sin();

        let mut values = [[None; 5]; 2];
        for (site_values, &(_, offset)) in values.iter_mut().zip(&SITES) {
            let temp = seasonal + diurnal + offset + rng.gauss(0.0, 1.2);
            let dewp = temp - 6.0 - rng.gauss(3.0, 2.0).abs();
            let wspm = rng.gauss(2.0, 1.0).abs();
            let pm25 = (episode / (1.0 + 0.3 * wspm) + rng.gauss(0.0, 8.0)).max(2.0).round();
            let pm10 = (pm25 * 1.25 + rng.gauss(15.0, 10.0).abs()).round();

            let one_decimal = |v: f64| (v * 10.0).round() / 10.0;
            let sampled = [pm25, pm10, one_decimal(temp), one_decimal(dewp), one_decimal(wspm)];
            for (slot, v) in site_values.iter_mut().zip(sampled) {
                *slot = (rng.next_f64() >= args.missing).then_some(v);
            }
        }

        rows.push(Row {
            time: [t.year() as i64, t.month() as i64, t.day() as i64, t.hour() as i64],
            values,
        });
    }
    rows
}

fn column_names() -> Vec<String> {
    let mut names: Vec<String> = ["year", "month", "day", "hour"].map(String::from).to_vec();
    for (site, _) in SITES {
        names.extend(METRICS.iter().map(|m| format!("{m}_{site}")));
    }
    names
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    let mut header = vec!["No".to_string()];
    header.extend(column_names());
    writer.write_record(&header)?;

    for (no, row) in rows.iter().enumerate() {
        let mut record = vec![(no + 1).to_string()];
        record.extend(row.time.iter().map(|v| v.to_string()));
        for site_values in &row.values {
            record.extend(site_values.iter().map(|v| match v {
                Some(v) => v.to_string(),
                None => "NA".to_string(),
            }));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let names = column_names();
    let mut fields = Vec::with_capacity(names.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(names.len());

    for (i, name) in names.iter().take(4).enumerate() {
        fields.push(Field::new(name, DataType::Int64, false));
        arrays.push(Arc::new(Int64Array::from(
            rows.iter().map(|r| r.time[i]).collect::<Vec<_>>(),
        )));
    }
    for (k, name) in names.iter().skip(4).enumerate() {
        let (site, metric) = (k / METRICS.len(), k % METRICS.len());
        fields.push(Field::new(name, DataType::Float64, true));
        arrays.push(Arc::new(Float64Array::from(
            rows.iter().map(|r| r.values[site][metric]).collect::<Vec<_>>(),
        )));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let rows = generate(&args);

    let is_parquet = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq"));

    if is_parquet {
        write_parquet(&args.output, &rows)?;
    } else {
        write_csv(&args.output, &rows)?;
    }

    println!(
        "Wrote {} hourly rows ({} days, 2 sites) to {}",
        rows.len(),
        args.days,
        args.output.display()
    );
    Ok(())
}
