//! Loading item lists from files.
//!
//! Most callers should use [`records_from_path`], which:
//!
//! - auto-detects the format by file extension (or you can override via [`IngestionOptions`])
//! - returns the records ready to pass to [`crate::processing`] or a [`crate::node::StaticNodeContext`]
//!
//! Format-specific functions are also available under [`csv`] and [`json`].

pub mod csv;
pub mod json;

use std::path::Path;

use crate::error::{ItemListError, ItemListResult};
use crate::types::Record;

pub use self::csv::CsvOptions;

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// JSON array-of-objects, single object or NDJSON.
    Json,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" | "jsonl" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Options controlling [`records_from_path`].
#[derive(Debug, Clone, Default)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    pub csv: CsvOptions,
}

/// Load records from `path`.
///
/// ```no_run
/// use item_lists::ingestion::{records_from_path, IngestionOptions};
///
/// # fn main() -> Result<(), item_lists::ItemListError> {
/// let items = records_from_path("orders.ndjson", &IngestionOptions::default())?;
/// println!("items={}", items.len());
/// # Ok(())
/// # }
/// ```
pub fn records_from_path(
    path: impl AsRef<Path>,
    options: &IngestionOptions,
) -> ItemListResult<Vec<Record>> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };
    match format {
        IngestionFormat::Csv => csv::records_from_csv_path(path, &options.csv),
        IngestionFormat::Json => json::records_from_json_path(path),
    }
}

fn infer_format_from_path(path: &Path) -> ItemListResult<IngestionFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ItemListError::InvalidInput {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| ItemListError::InvalidInput {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}
