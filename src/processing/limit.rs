//! Keep a slice from the start or end of the item list.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ItemListError, ItemListResult};
use crate::types::Record;

/// Operation name used in errors and host selectors.
pub const OPERATION: &str = "limit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeepItems {
    #[default]
    #[serde(rename = "firstItems")]
    First,
    #[serde(rename = "lastItems")]
    Last,
}

/// Options for [`limit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitOptions {
    pub max_items: usize,
    pub keep: KeepItems,
}

impl LimitOptions {
    pub fn first(max_items: usize) -> Self {
        Self {
            max_items,
            keep: KeepItems::First,
        }
    }

    pub fn last(max_items: usize) -> Self {
        Self {
            max_items,
            keep: KeepItems::Last,
        }
    }
}

/// Keep `max_items` items from the chosen end, in their original order.
///
/// Fails with [`ItemListError::NotEnoughItems`] when `max_items` exceeds the input length.
pub fn limit(items: &[Record], options: &LimitOptions) -> ItemListResult<Vec<Record>> {
    if options.max_items == 0 {
        return Err(ItemListError::configuration(
            OPERATION,
            "max items must be at least 1",
        ));
    }
    if options.max_items > items.len() {
        return Err(ItemListError::NotEnoughItems {
            requested: options.max_items,
            available: items.len(),
        });
    }

    let kept = match options.keep {
        KeepItems::First => &items[..options.max_items],
        KeepItems::Last => &items[items.len() - options.max_items..],
    };
    debug!(
        operation = OPERATION,
        input_items = items.len(),
        kept = kept.len(),
        "limited items"
    );
    Ok(kept.to_vec())
}

#[cfg(test)]
mod tests {
    use super::{limit, KeepItems, LimitOptions};
    use crate::error::{ErrorKind, ItemListError};
    use crate::types::Record;
    use serde_json::json;

    fn numbered(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| serde_json::from_value(json!({ "i": i })).unwrap())
            .collect()
    }

    fn indices(items: &[Record]) -> Vec<u64> {
        items.iter().filter_map(|r| r["i"].as_u64()).collect()
    }

    #[test]
    fn keeps_first_or_last_in_original_order() {
        let items = numbered(5);
        assert_eq!(indices(&limit(&items, &LimitOptions::first(2)).unwrap()), vec![0, 1]);
        assert_eq!(indices(&limit(&items, &LimitOptions::last(2)).unwrap()), vec![3, 4]);
        assert_eq!(limit(&items, &LimitOptions::last(5)).unwrap(), items);
    }

    #[test]
    fn more_than_available_is_a_range_error() {
        let err = limit(&numbered(3), &LimitOptions::first(4)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert!(matches!(
            err,
            ItemListError::NotEnoughItems {
                requested: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn zero_is_a_configuration_error() {
        let err = limit(&numbered(3), &LimitOptions::first(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn keep_uses_host_names() {
        let keep: KeepItems = serde_json::from_value(json!("lastItems")).unwrap();
        assert_eq!(keep, KeepItems::Last);
    }
}
