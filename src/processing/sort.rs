//! Reorder items by field values or by caller-supplied comparison code.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compare::{compare_values, sorted_order};
use crate::error::{ItemListError, ItemListResult};
use crate::fields::resolve;
use crate::sandbox::{CodeComparator, ConsoleMode, SandboxLimits};
use crate::types::Record;

/// Operation name used in errors and host selectors.
pub const OPERATION: &str = "sort";

/// Direction of one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// One sort key. Keys with an empty `field_name` are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field_name: String,
    pub order: SortOrder,
}

impl SortField {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field_name: field.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field_name: field.into(),
            order: SortOrder::Descending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortMode {
    /// Compare on field values, first key that differs decides.
    Simple(Vec<SortField>),
    /// Compare with a code fragment; see [`crate::sandbox`].
    Code(String),
}

/// Options for [`sort`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOptions {
    pub mode: SortMode,
    pub dot_notation: bool,
    /// Where code-mode console output goes.
    pub console: ConsoleMode,
    pub limits: SandboxLimits,
}

impl SortOptions {
    pub fn simple(fields: Vec<SortField>) -> Self {
        Self::with_mode(SortMode::Simple(fields))
    }

    pub fn code(code: impl Into<String>) -> Self {
        Self::with_mode(SortMode::Code(code.into()))
    }

    fn with_mode(mode: SortMode) -> Self {
        Self {
            mode,
            dot_notation: true,
            console: ConsoleMode::default(),
            limits: SandboxLimits::default(),
        }
    }
}

/// Sort `items`, returning a reordered copy.
///
/// ```rust
/// use item_lists::processing::{sort, SortField, SortOptions};
/// use item_lists::types::record;
/// use serde_json::json;
///
/// let items: Vec<_> = [3, 1, 2].iter().filter_map(|n| record(json!({"n": n}))).collect();
/// let out = sort(&items, &SortOptions::simple(vec![SortField::descending("n")])).unwrap();
/// assert_eq!(out[0]["n"], json!(3));
/// assert_eq!(out[2]["n"], json!(1));
/// ```
pub fn sort(items: &[Record], options: &SortOptions) -> ItemListResult<Vec<Record>> {
    let out = match &options.mode {
        SortMode::Simple(fields) => sort_simple(items, fields, options.dot_notation)?,
        SortMode::Code(code) => {
            CodeComparator::compile(OPERATION, code, &options.limits, options.console)?.sort(items)?
        }
    };
    debug!(operation = OPERATION, items = out.len(), "sorted items");
    Ok(out)
}

fn sort_simple(items: &[Record], fields: &[SortField], dot: bool) -> ItemListResult<Vec<Record>> {
    let keys: Vec<&SortField> = fields.iter().filter(|f| !f.field_name.is_empty()).collect();
    if keys.is_empty() {
        return Err(ItemListError::configuration(
            OPERATION,
            "no sort fields specified; add a field to sort by",
        ));
    }

    let order = sorted_order::<ItemListError, _>(items.len(), |a, b| {
        Ok(compare_on_fields(&items[a], &items[b], &keys, dot))
    })?;
    Ok(order.into_iter().map(|index| items[index].clone()).collect())
}

fn compare_on_fields(a: &Record, b: &Record, keys: &[&SortField], dot: bool) -> Ordering {
    for key in keys {
        let ord = compare_values(
            resolve(a, &key.field_name, dot),
            resolve(b, &key.field_name, dot),
        );
        let ord = match key.order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
