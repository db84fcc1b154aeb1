//! Split one array field into separate items.

use tracing::debug;

use crate::error::{ItemListError, ItemListResult};
use crate::fields::{assign, resolve};
use crate::flatten::flatten;
use crate::types::{Record, Value};

/// Operation name used in errors and host selectors.
pub const OPERATION: &str = "splitOutItems";

/// Which fields of the original item are copied onto every split-out item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IncludeFields {
    /// Only the split element. Record elements are spread into the new item.
    #[default]
    NoOtherFields,
    /// Every field of the original item whose key does not start with the split field name.
    AllOtherFields,
    /// The listed fields of the original item.
    SelectedOtherFields(Vec<String>),
}

/// Options for [`split_out`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutOptions {
    /// Path of the array field to split.
    pub field_to_split_out: String,
    /// Other fields to carry over.
    pub include: IncludeFields,
    /// Field name for the element in each new item. Defaults to `field_to_split_out`.
    pub destination_field_name: Option<String>,
    /// Treat `.` in paths as nesting.
    pub dot_notation: bool,
}

impl SplitOutOptions {
    /// Split `field` with no other fields and dot-notation enabled.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field_to_split_out: field.into(),
            include: IncludeFields::default(),
            destination_field_name: None,
            dot_notation: true,
        }
    }

    pub fn include(mut self, include: IncludeFields) -> Self {
        self.include = include;
        self
    }

    pub fn destination(mut self, name: impl Into<String>) -> Self {
        self.destination_field_name = Some(name.into());
        self
    }

    pub fn dot_notation(mut self, enabled: bool) -> Self {
        self.dot_notation = enabled;
        self
    }

    fn validate(&self) -> ItemListResult<()> {
        if self.field_to_split_out.is_empty() {
            return Err(ItemListError::configuration(
                OPERATION,
                "no field to split out specified",
            ));
        }
        if matches!(&self.include, IncludeFields::SelectedOtherFields(fields) if fields.is_empty()) {
            return Err(ItemListError::configuration(
                OPERATION,
                "no fields specified; add a field to include",
            ));
        }
        Ok(())
    }
}

/// Split the array at `options.field_to_split_out` of every item into one item per element.
///
/// Output is the concatenation of each item's split, in input order.
///
/// ```rust
/// use item_lists::processing::{split_out, IncludeFields, SplitOutOptions};
/// use item_lists::types::record;
/// use serde_json::json;
///
/// let items = vec![record(json!({"a": [1, 2], "b": "x"})).unwrap()];
/// let out = split_out(&items, &SplitOutOptions::new("a").include(IncludeFields::AllOtherFields)).unwrap();
/// assert_eq!(out[0], record(json!({"a": 1, "b": "x"})).unwrap());
/// assert_eq!(out[1], record(json!({"a": 2, "b": "x"})).unwrap());
/// ```
pub fn split_out(items: &[Record], options: &SplitOutOptions) -> ItemListResult<Vec<Record>> {
    options.validate()?;

    let mut out = Vec::new();
    for (index, item) in items.iter().enumerate() {
        out.extend(split_validated(item, index, options)?);
    }

    debug!(
        operation = OPERATION,
        input_items = items.len(),
        output_items = out.len(),
        "split out items"
    );
    Ok(out)
}

/// Split a single item. `item_index` is only used for error context.
///
/// Hosts that resolve parameters per item build a fresh `options` for every item, so the options
/// are validated on each call. [`split_out`] validates once and skips this.
pub fn split_out_item(
    item: &Record,
    item_index: usize,
    options: &SplitOutOptions,
) -> ItemListResult<Vec<Record>> {
    options.validate()?;
    split_validated(item, item_index, options)
}

fn split_validated(
    item: &Record,
    item_index: usize,
    options: &SplitOutOptions,
) -> ItemListResult<Vec<Record>> {
    let field = options.field_to_split_out.as_str();
    let dot = options.dot_notation;

    let value = resolve(item, field, dot).ok_or_else(|| ItemListError::FieldNotFound {
        field: field.to_string(),
        item_index,
        hint: (!dot && field.contains('.')).then(|| {
            "dot notation is disabled; enable it to address nested fields".to_string()
        }),
    })?;
    let Value::Array(elements) = value else {
        return Err(ItemListError::NotAnArray {
            field: field.to_string(),
            item_index,
        });
    };

    let destination = options
        .destination_field_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(field);

    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        let mut split = match (element, &options.include) {
            (Value::Object(fields), IncludeFields::NoOtherFields) => fields.clone(),
            _ => {
                let mut base = Record::new();
                base.insert(destination.to_string(), element.clone());
                base
            }
        };

        match &options.include {
            IncludeFields::NoOtherFields => {}
            IncludeFields::SelectedOtherFields(selected) => {
                for name in selected.iter().filter(|name| name.as_str() != field) {
                    if let Some(v) = resolve(item, name, dot) {
                        assign(&mut split, name, v.clone(), dot);
                    }
                }
            }
            IncludeFields::AllOtherFields => {
                // Prefix match, not path equality: splitting `a` also drops a sibling `ab`.
                if dot {
                    for (key, v) in flatten(item) {
                        if !key.starts_with(field) {
                            assign(&mut split, &key, v, true);
                        }
                    }
                } else {
                    for (key, v) in item.iter().filter(|(key, _)| !key.starts_with(field)) {
                        split.insert(key.clone(), v.clone());
                    }
                }
            }
        }

        out.push(split);
    }
    Ok(out)
}
