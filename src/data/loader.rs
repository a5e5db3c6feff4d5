use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dimension, Metric, Observation, Provenance, RecordStore};

const REQUIRED_COLUMNS: [&str; 3] = ["year", "university", "degree"];
const PROVENANCE_COLUMNS: [&str; 2] = ["data_source", "provenance"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a survey table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one survey row per line (the published layout)
/// * `.json`    – `[{ "year": 2019, "university": "...", ... }, ...]`
/// * `.parquet` – one column per field, string or numeric types
pub fn load_file(path: &Path) -> Result<RecordStore> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let observations = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    let store = RecordStore::from_observations(observations);
    info!(
        "loaded {} rows from {} ({} universities, {} degrees)",
        store.len(),
        path.display(),
        store.distinct(Dimension::University).len(),
        store.distinct(Dimension::Degree).len(),
    );
    Ok(store)
}

// ---------------------------------------------------------------------------
// Cell – a loosely typed source value
// ---------------------------------------------------------------------------

/// One raw cell before typing. Sources disagree on whether numbers are
/// stored as text, so every field goes through this.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
    Null,
}

impl Cell {
    fn text(&self) -> String {
        match self {
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Null => String::new(),
        }
    }
}

/// Parse a numeric survey cell. Never fails: `"na"`, `"-"`, blanks and other
/// garbage become missing. A trailing `%` is accepted.
fn parse_metric(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        Cell::Null => None,
    };
    value.filter(|v| v.is_finite())
}

fn parse_year(cell: &Cell, row: usize) -> Result<i32> {
    match cell {
        Cell::Number(n) if n.fract() == 0.0 => i32::try_from(*n as i64)
            .with_context(|| format!("Row {row}: year {n} is out of range")),
        Cell::Text(s) => s
            .trim()
            .parse::<i32>()
            .with_context(|| format!("Row {row}: year '{s}' is not an integer")),
        other => bail!("Row {row}: invalid year {other:?}"),
    }
}

/// Build one observation from a column lookup.
fn build_observation(row: usize, lookup: impl Fn(&str) -> Cell) -> Result<Observation> {
    let year = parse_year(&lookup("year"), row)?;
    let mut obs = Observation::new(
        &lookup("university").text(),
        &lookup("degree").text(),
        &lookup("school").text(),
        year,
    );

    for metric in Metric::ALL {
        obs.values.set(metric, parse_metric(&lookup(metric.column())));
    }

    for col in PROVENANCE_COLUMNS {
        let raw = lookup(col).text();
        if !raw.is_empty() {
            obs.provenance = raw
                .parse::<Provenance>()
                .map_err(|e| anyhow::anyhow!("Row {row}: {e}"))?;
            break;
        }
    }

    Ok(obs)
}

fn check_required<'a>(columns: impl Iterator<Item = &'a str> + Clone) -> Result<()> {
    for required in REQUIRED_COLUMNS {
        if !columns.clone().any(|c| c == required) {
            bail!("missing required column '{required}'");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, any column order.
/// Unknown columns are ignored; absent metric columns load as missing.
fn load_csv(path: &Path) -> Result<Vec<Observation>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    check_required(headers.iter().map(String::as_str))?;

    let index: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();

    let mut observations = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let obs = build_observation(row_no, |col| {
            index
                .get(col)
                .and_then(|&i| record.get(i))
                .map(|s| Cell::Text(s.to_string()))
                .unwrap_or(Cell::Null)
        })?;
        observations.push(obs);
    }

    Ok(observations)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "year": 2019,
///     "university": "Nanyang Technological University",
///     "degree": "Accountancy and Business",
///     "employment_rate_overall": "97.4%",
///     "gross_monthly_median": 3400
///   }
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Observation>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut observations = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        check_required(obj.keys().map(String::as_str)).with_context(|| format!("Row {i}"))?;

        let obs = build_observation(i, |col| obj.get(col).map(json_to_cell).unwrap_or(Cell::Null))?;
        observations.push(obs);
    }

    Ok(observations)
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Null),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing survey rows.
///
/// Every column may be Utf8, integer or float; Pandas and Polars disagree on
/// how the published CSV should be typed so all of them are accepted.
fn load_parquet(path: &Path) -> Result<Vec<Observation>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut observations = Vec::new();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        check_required(schema.fields().iter().map(|f| f.name().as_str()))?;

        let columns: HashMap<&str, &Arc<dyn Array>> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name().as_str(), batch.column(i)))
            .collect();

        for row in 0..batch.num_rows() {
            let obs = build_observation(row_offset + row, |col| {
                columns
                    .get(col)
                    .map(|array| extract_cell(array, row))
                    .unwrap_or(Cell::Null)
            })?;
            observations.push(obs);
        }
        row_offset += batch.num_rows();
    }

    Ok(observations)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| Cell::Text(s.value(row).to_string()))
            .unwrap_or(Cell::Null),
        DataType::LargeUtf8 => Cell::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| Cell::Number(a.value(row) as f64))
            .unwrap_or(Cell::Null),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| Cell::Number(a.value(row) as f64))
            .unwrap_or(Cell::Null),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(|a| Cell::Number(a.value(row) as f64))
            .unwrap_or(Cell::Null),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| Cell::Number(a.value(row)))
            .unwrap_or(Cell::Null),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|a| Cell::Text(a.value(row).to_string()))
            .unwrap_or(Cell::Null),
        _ => Cell::Null,
    }
}
