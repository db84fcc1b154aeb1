//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single object: `{"a":1}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Records are kept as parsed, nested values included; key order follows the input.

use std::fs;
use std::path::Path;

use crate::error::{ItemListError, ItemListResult};
use crate::types::{Record, Value};

/// Load records from a JSON or NDJSON file.
pub fn records_from_json_path(path: impl AsRef<Path>) -> ItemListResult<Vec<Record>> {
    let text = fs::read_to_string(path)?;
    records_from_json_str(&text)
}

/// Load records from an in-memory JSON or NDJSON string.
pub fn records_from_json_str(input: &str) -> ItemListResult<Vec<Record>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ItemListError::InvalidInput {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        return records_from_json_value(v);
    }

    // Fall back to NDJSON.
    let mut records = Vec::new();
    for (i, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let v = serde_json::from_str::<Value>(line).map_err(|e| ItemListError::InvalidInput {
            message: format!("invalid ndjson at line {}: {}", i + 1, e),
        })?;
        records.push(into_record(i + 1, v)?);
    }
    Ok(records)
}

/// Convert a parsed JSON value (an object or an array of objects) into records.
pub fn records_from_json_value(value: Value) -> ItemListResult<Vec<Record>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| into_record(i + 1, v))
            .collect(),
        Value::Object(map) => Ok(vec![map]),
        _ => Err(ItemListError::InvalidInput {
            message: "json must be an object, an array of objects, or NDJSON".to_string(),
        }),
    }
}

fn into_record(row: usize, value: Value) -> ItemListResult<Record> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ItemListError::InvalidInput {
            message: format!("row {row} is not a json object: {other}"),
        }),
    }
}
