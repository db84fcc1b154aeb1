//! Duplicate removal over a set of comparison keys.
//!
//! Items are sorted (by index) on the comparison keys with [`equivalence_order`], a total order
//! under which equal items are always adjacent, then the sorted order is scanned once against the
//! last *retained* item. Marked indices are dropped
//! from the original sequence, so survivors keep their input order and the first occurrence of
//! each duplicate group is the one kept.

use std::cmp::Ordering;

use tracing::debug;

use crate::compare::{equals, equivalence_order, sorted_order};
use crate::error::{ItemListError, ItemListResult};
use crate::fields::resolve;
use crate::flatten::flattened_keys;
use crate::types::{Record, Value};

/// Operation name used in errors and host selectors.
pub const OPERATION: &str = "removeDuplicates";

/// Which fields decide whether two items are duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CompareFields {
    /// Every key of the first item (its flattened paths under dot-notation).
    #[default]
    AllFields,
    /// Every key of the first item except the listed ones.
    AllFieldsExcept(Vec<String>),
    /// Only the listed fields.
    SelectedFields(Vec<String>),
}

/// Options for [`remove_duplicates`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveDuplicatesOptions {
    pub compare: CompareFields,
    pub dot_notation: bool,
}

impl Default for RemoveDuplicatesOptions {
    fn default() -> Self {
        Self {
            compare: CompareFields::default(),
            dot_notation: true,
        }
    }
}

impl RemoveDuplicatesOptions {
    pub fn new(compare: CompareFields) -> Self {
        Self {
            compare,
            ..Default::default()
        }
    }
}

/// The keys items are compared on, in comparison order.
pub fn comparison_keys(
    items: &[Record],
    options: &RemoveDuplicatesOptions,
) -> ItemListResult<Vec<String>> {
    let excluded: &[String] = match &options.compare {
        CompareFields::SelectedFields(fields) => {
            let keys: Vec<String> = fields.iter().filter(|f| !f.is_empty()).cloned().collect();
            if keys.is_empty() {
                return Err(ItemListError::configuration(
                    OPERATION,
                    "no fields specified; add a field to compare on",
                ));
            }
            return Ok(keys);
        }
        CompareFields::AllFields => &[],
        CompareFields::AllFieldsExcept(fields) => fields.as_slice(),
    };

    let Some(first) = items.first() else {
        return Ok(Vec::new());
    };
    let keys = if options.dot_notation {
        flattened_keys(first)
    } else {
        first.keys().cloned().collect()
    };
    Ok(keys.into_iter().filter(|k| !excluded.contains(k)).collect())
}

/// Remove items that are equal on every comparison key, keeping the first of each group.
///
/// Fails with [`ItemListError::MissingCompareKey`] when a compared item lacks a key.
pub fn remove_duplicates(
    items: &[Record],
    options: &RemoveDuplicatesOptions,
) -> ItemListResult<Vec<Record>> {
    let keys = comparison_keys(items, options)?;
    if items.is_empty() {
        return Ok(Vec::new());
    }
    let dot = options.dot_notation;

    let order = sorted_order(items.len(), |a, b| {
        compare_on_keys(&items[a], &items[b], &keys, dot)
    })?;

    let mut removed = vec![false; items.len()];
    let mut retained = order[0];
    for &index in &order[1..] {
        if equal_on_keys(&items[index], &items[retained], &keys, dot)? {
            removed[index] = true;
        } else {
            retained = index;
        }
    }

    let out: Vec<Record> = items
        .iter()
        .zip(&removed)
        .filter(|(_, removed)| !**removed)
        .map(|(item, _)| item.clone())
        .collect();

    debug!(
        operation = OPERATION,
        keys = keys.len(),
        input_items = items.len(),
        removed = items.len() - out.len(),
        "removed duplicates"
    );
    Ok(out)
}

fn key_value<'a>(item: &'a Record, key: &str, dot: bool) -> ItemListResult<&'a Value> {
    resolve(item, key, dot).ok_or_else(|| ItemListError::MissingCompareKey {
        key: key.to_string(),
    })
}

fn compare_on_keys(a: &Record, b: &Record, keys: &[String], dot: bool) -> ItemListResult<Ordering> {
    for key in keys {
        let ord = equivalence_order(key_value(a, key, dot)?, key_value(b, key, dot)?);
        if ord != Ordering::Equal {
            return Ok(ord);
        }
    }
    Ok(Ordering::Equal)
}

fn equal_on_keys(a: &Record, b: &Record, keys: &[String], dot: bool) -> ItemListResult<bool> {
    for key in keys {
        if !equals(Some(key_value(a, key, dot)?), Some(key_value(b, key, dot)?)) {
            return Ok(false);
        }
    }
    Ok(true)
}
