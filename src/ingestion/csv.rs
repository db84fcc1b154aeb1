//! CSV ingestion implementation.

use std::path::Path;

use crate::error::ItemListResult;
use crate::types::{Record, Value};

/// CSV reading options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Turn cells that look like integers, floats or booleans into those JSON types.
    pub infer_types: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            infer_types: true,
        }
    }
}

/// Load a CSV file as records.
///
/// Rules:
///
/// - CSV must have headers; each row becomes a record keyed by header, in header order.
/// - Empty cells become `null`.
/// - Rows shorter than the header are padded with `null`.
pub fn records_from_csv_path(path: impl AsRef<Path>, options: &CsvOptions) -> ItemListResult<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .flexible(true)
        .from_path(path)?;
    records_from_csv_reader(&mut rdr, options)
}

/// Load records from an existing CSV reader.
pub fn records_from_csv_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    options: &CsvOptions,
) -> ItemListResult<Vec<Record>> {
    let headers = rdr.headers()?.clone();

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let record: Record = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let raw = row.get(idx).unwrap_or("");
                (header.to_string(), cell_value(raw, options.infer_types))
            })
            .collect();
        records.push(record);
    }
    Ok(records)
}

fn cell_value(raw: &str, infer_types: bool) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if !infer_types {
        return Value::String(trimmed.to_owned());
    }

    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::from(n);
    }
    if let Some(n) = trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        return Value::Number(n);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(trimmed.to_owned()),
    }
}
