//! Core data model types.
//!
//! Items flowing through the node are JSON records: insertion-ordered maps from field name to
//! [`Value`]. A sequence of records is a plain `Vec<Record>` (or `&[Record]`); its order is
//! meaningful and every operation documents how it preserves or redefines it.

pub use serde_json::Value;

/// A single item: an insertion-ordered mapping from field names to JSON values.
pub type Record = serde_json::Map<String, Value>;

/// How the host is running the node.
///
/// Only used to decide where custom sort code sends its console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Interactive/preview run started by a user.
    Manual,
    /// Unattended run (trigger, webhook, schedule).
    #[default]
    Production,
}

/// Build a [`Record`] from a JSON value, if it is an object.
///
/// Convenient for tests and hosts holding untyped JSON:
///
/// ```rust
/// use item_lists::types::record;
/// use serde_json::json;
///
/// let r = record(json!({"a": 1})).unwrap();
/// assert_eq!(r["a"], json!(1));
/// assert!(record(json!([1, 2])).is_none());
/// ```
pub fn record(value: Value) -> Option<Record> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
