//! Item-list transformations.
//!
//! Every operation takes the whole input sequence and its options, and returns a new sequence
//! (or, for aggregation, a single record). Inputs are never modified.
//!
//! Currently implemented:
//!
//! - [`split_out()`]: turn one array field into one item per element
//! - [`aggregate()`] / [`aggregate_all_item_data()`]: collect values from all items into one item
//! - [`remove_duplicates()`]: drop items equal on a set of comparison keys
//! - [`sort()`]: order by field values or by custom comparison code
//! - [`limit()`]: keep the first or last N items
//!
//! ## Example: split → dedupe → sort → limit
//!
//! ```rust
//! use item_lists::processing::{
//!     limit, remove_duplicates, sort, split_out, CompareFields, IncludeFields, LimitOptions,
//!     RemoveDuplicatesOptions, SortField, SortOptions, SplitOutOptions,
//! };
//! use item_lists::types::record;
//! use serde_json::json;
//!
//! let orders = vec![
//!     record(json!({"customer": "ada", "skus": ["b", "a", "b"]})).unwrap(),
//!     record(json!({"customer": "bob", "skus": ["c"]})).unwrap(),
//! ];
//!
//! let lines = split_out(
//!     &orders,
//!     &SplitOutOptions::new("skus")
//!         .include(IncludeFields::AllOtherFields)
//!         .destination("sku"),
//! )
//! .unwrap();
//! assert_eq!(lines.len(), 4);
//!
//! let unique = remove_duplicates(&lines, &RemoveDuplicatesOptions::new(CompareFields::AllFields)).unwrap();
//! assert_eq!(unique.len(), 3);
//!
//! let sorted = sort(&unique, &SortOptions::simple(vec![SortField::ascending("sku")])).unwrap();
//! let top = limit(&sorted, &LimitOptions::first(2)).unwrap();
//! assert_eq!(top[0]["sku"], json!("a"));
//! assert_eq!(top[1]["sku"], json!("b"));
//! ```

pub mod aggregate;
pub mod limit;
pub mod remove_duplicates;
pub mod sort;
pub mod split_out;

pub use aggregate::{
    aggregate, aggregate_all_item_data, AggregateAllOptions, AggregateOptions, FieldToAggregate,
    ItemDataFields,
};
pub use limit::{limit, KeepItems, LimitOptions};
pub use remove_duplicates::{comparison_keys, remove_duplicates, CompareFields, RemoveDuplicatesOptions};
pub use sort::{sort, SortField, SortMode, SortOptions, SortOrder};
pub use split_out::{split_out, split_out_item, IncludeFields, SplitOutOptions};
