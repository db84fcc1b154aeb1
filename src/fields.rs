//! Field addressing for [`Record`]s.
//!
//! With dot-notation enabled a path such as `user.name` walks into nested records, and a purely
//! numeric segment (`tags.0`) indexes into an array. With dot-notation disabled the path is used
//! as one literal top-level key, dots included.
//!
//! Absence is reported as `None`, never as `Value::Null`: a record holding an explicit `null`
//! resolves to `Some(&Value::Null)`.

use crate::types::{Record, Value};

/// Resolve `path` against `record`.
///
/// Returns `None` when any segment is missing or walks into a scalar.
pub fn resolve<'a>(record: &'a Record, path: &str, dot_notation: bool) -> Option<&'a Value> {
    if !dot_notation || !path.contains('.') {
        return record.get(path);
    }

    let mut segments = path.split('.');
    let mut current = record.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Write `value` at `path` in `record`.
///
/// With dot-notation, intermediate records are created as needed and any non-record value in the
/// way is replaced by an empty record. Without it, `path` is written as a literal key.
pub fn assign(record: &mut Record, path: &str, value: Value, dot_notation: bool) {
    if !dot_notation || !path.contains('.') {
        record.insert(path.to_string(), value);
        return;
    }

    let mut segments = path.split('.').peekable();
    let mut current = record;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }

        let slot = current
            .entry(segment)
            .or_insert_with(|| Value::Object(Record::new()));
        if !slot.is_object() {
            *slot = Value::Object(Record::new());
        }
        let Value::Object(next) = slot else {
            return;
        };
        current = next;
    }
}

/// Remove the value at `path`, returning it if it was present.
///
/// Parents are left in place even when the removal empties them.
pub fn remove(record: &mut Record, path: &str, dot_notation: bool) -> Option<Value> {
    if !dot_notation || !path.contains('.') {
        return record.shift_remove(path);
    }

    let (parent, last) = path.rsplit_once('.')?;
    let mut current = record;
    for segment in parent.split('.') {
        match current.get_mut(segment)? {
            Value::Object(next) => current = next,
            _ => return None,
        }
    }
    current.shift_remove(last)
}
