//! `item-lists` transforms ordered lists of JSON records ("items") the way a workflow node does:
//! split an array field into items, aggregate fields across items, remove duplicates, sort and
//! limit.
//!
//! Items are [`types::Record`]s (insertion-ordered `serde_json` maps). Every operation is a pure
//! function of its input slice and options, returning a new list or an [`ItemListError`].
//!
//! ## Operations
//!
//! - [`processing::split_out()`]: one item per element of an array field
//! - [`processing::aggregate()`]: one item holding the values of chosen fields from every item
//! - [`processing::remove_duplicates()`]: keep the first of each group of equal items
//! - [`processing::sort()`]: by field values, or by custom code run in a [`sandbox`]
//! - [`processing::limit()`]: first or last N items
//!
//! Field names may use dot-notation (`user.address.city`) to address nested values; see
//! [`fields`]. Values of different types are ordered with the coercion rules in [`compare`].
//!
//! ## Quick example
//!
//! ```rust
//! use item_lists::processing::{aggregate, split_out, AggregateOptions, FieldToAggregate, SplitOutOptions};
//! use item_lists::types::record;
//! use serde_json::json;
//!
//! let items = vec![
//!     record(json!({"tags": ["a", "b"]})).unwrap(),
//!     record(json!({"tags": ["c"]})).unwrap(),
//! ];
//! let split = split_out(&items, &SplitOutOptions::new("tags")).unwrap();
//! assert_eq!(split.len(), 3);
//!
//! let joined = aggregate(&split, &AggregateOptions::new(vec![FieldToAggregate::new("tags")])).unwrap();
//! assert_eq!(joined["tags"], json!(["a", "b", "c"]));
//! ```
//!
//! ## Hosting the node
//!
//! A workflow host implements [`node::NodeContext`] (or uses [`node::StaticNodeContext`]) and
//! calls [`node::execute`], which reads the `resource`/`operation` selectors and the operation's
//! parameters, runs it and reports the outcome to an optional [`observability::NodeObserver`].
//!
//! ## Modules
//!
//! - [`processing`]: the five operations and their options
//! - [`node`]: host boundary and parameter mapping
//! - [`sandbox`]: Rhai-backed custom sort code
//! - [`fields`], [`flatten`], [`compare`]: field access, flattening and value ordering
//! - [`ingestion`]: load items from JSON, NDJSON or CSV files
//! - [`observability`]: run outcome observers
//! - [`error`]: error type shared by everything above

pub mod compare;
pub mod error;
pub mod fields;
pub mod flatten;
pub mod ingestion;
pub mod node;
pub mod observability;
pub mod processing;
pub mod sandbox;
pub mod types;

pub use error::{ErrorKind, ItemListError, ItemListResult};
