use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, RawRow, required_columns};
use crate::error::DataError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an hourly two-site dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row; `year, month, day, hour` plus `{METRIC}_{site}` columns
/// * `.json`    – `[{ "year": 2013, "PM2.5_shunyi": 4.0, ... }, ...]`
/// * `.parquet` – one numeric column per required field
///
/// Extra columns (wind direction, station name, ...) are ignored.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            read_csv(file)?
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            parse_json(&text)?
        }
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    if dataset.is_empty() {
        log::warn!("{} contains no rows", path.display());
    } else {
        log::debug!("parsed {} rows from {}", dataset.len(), path.display());
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read CSV from any byte source. Only the required columns are parsed.
pub fn read_csv<R: Read>(source: R) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(source);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let columns: Vec<(usize, String)> = required_columns()
        .into_iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| *h == name)
                .map(|idx| (idx, name.clone()))
                .ok_or(DataError::MissingColumn { column: name })
        })
        .collect::<Result<_, _>>()?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut raw = RawRow::new();
        for (idx, name) in &columns {
            let Some(cell) = record.get(*idx) else {
                return Err(DataError::MissingField {
                    row: row_no,
                    column: name.clone(),
                }
                .into());
            };
            let value = parse_cell(cell)
                .with_context(|| format!("CSV row {row_no}, {name}: '{cell}' is not a number"))?;
            raw.insert(name.clone(), value);
        }
        rows.push(raw);
    }

    Ok(Dataset::load(rows)?)
}

/// Empty and `NA`-style cells are missing observations, not errors.
fn parse_cell(s: &str) -> Result<f64> {
    let s = s.trim();
    if s.is_empty() || matches!(s, "NA" | "NaN" | "nan" | "null") {
        return Ok(f64::NAN);
    }
    Ok(s.parse::<f64>()?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "year": 2013, "month": 3, "day": 1, "hour": 0, "PM2.5_shunyi": 3.0, ... },
///   ...
/// ]
/// ```
pub fn parse_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let columns = required_columns();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut raw = RawRow::new();
        for name in &columns {
            // absent keys are left out so `Dataset::load` reports them
            if let Some(val) = obj.get(name) {
                let value = json_to_f64(val)
                    .with_context(|| format!("Row {i}, {name}: not a number"))?;
                raw.insert(name.clone(), value);
            }
        }
        rows.push(raw);
    }

    Ok(Dataset::load(rows)?)
}

fn json_to_f64(val: &JsonValue) -> Result<f64> {
    match val {
        JsonValue::Number(n) => n.as_f64().context("number out of range"),
        JsonValue::Null => Ok(f64::NAN),
        JsonValue::String(s) => parse_cell(s),
        other => bail!("unexpected value {other}"),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one numeric column per required field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nulls become NaN.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    // resolved from the file schema so a row-less file is still checked
    let schema = builder.schema().clone();
    let columns: Vec<(usize, String)> = required_columns()
        .into_iter()
        .map(|name| match schema.index_of(&name) {
            Ok(idx) => Ok((idx, name)),
            Err(_) => Err(DataError::MissingColumn { column: name }),
        })
        .collect::<Result<_, _>>()?;

    let reader = builder.build().context("building parquet reader")?;
    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        append_batch(&mut rows, &batch, &columns)?;
    }

    Ok(Dataset::load(rows)?)
}

/// Convert one record batch; row numbers continue from `rows.len()`.
fn append_batch(rows: &mut Vec<RawRow>, batch: &RecordBatch, columns: &[(usize, String)]) -> Result<()> {
    for row in 0..batch.num_rows() {
        let row_no = rows.len();
        let mut raw = RawRow::new();
        for (col_idx, name) in columns {
            let value = extract_f64(batch.column(*col_idx), row)
                .with_context(|| format!("Row {row_no}: failed to read '{name}'"))?;
            raw.insert(name.clone(), value);
        }
        rows.push(raw);
    }
    Ok(())
}

/// Extract one numeric cell from an Arrow column.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        return Ok(f64::NAN);
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Float64 => Ok(any
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .value(row)),
        DataType::Float32 => Ok(any
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .value(row) as f64),
        DataType::Int64 => Ok(any
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row) as f64),
        DataType::Int32 => Ok(any
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .value(row) as f64),
        other => bail!("Expected a numeric column, got {other:?}"),
    }
}
