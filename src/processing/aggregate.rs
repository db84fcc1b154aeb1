//! Collect field values from many items into one item.

use tracing::{debug, warn};

use crate::error::{ItemListError, ItemListResult};
use crate::fields::{assign, remove, resolve};
use crate::types::{Record, Value};

/// Operation name used in errors and host selectors.
pub const OPERATION: &str = "aggregateItems";

/// One source field and the output field its values are collected under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldToAggregate {
    /// Path of the field to read from every item. Entries with an empty path are ignored.
    pub field_to_aggregate: String,
    /// Output field name. Defaults to `field_to_aggregate`.
    pub output_field_name: Option<String>,
}

impl FieldToAggregate {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field_to_aggregate: field.into(),
            output_field_name: None,
        }
    }

    pub fn renamed(field: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            field_to_aggregate: field.into(),
            output_field_name: Some(output.into()),
        }
    }

    fn output_name(&self) -> &str {
        self.output_field_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.field_to_aggregate)
    }
}

/// Options for [`aggregate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOptions {
    pub fields: Vec<FieldToAggregate>,
    /// Treat `.` in source and output paths as nesting.
    pub dot_notation: bool,
    /// Spread array values into the output list instead of nesting them.
    pub merge_lists: bool,
    /// Collect `null` for items lacking the field instead of skipping them.
    pub keep_missing: bool,
}

impl AggregateOptions {
    pub fn new(fields: Vec<FieldToAggregate>) -> Self {
        Self {
            fields,
            dot_notation: true,
            merge_lists: false,
            keep_missing: false,
        }
    }
}

/// Aggregate individual fields across all items into exactly one output record.
///
/// Each output field holds the values of its source field in item order. Items where the field is
/// absent are skipped unless `keep_missing` is set.
pub fn aggregate(items: &[Record], options: &AggregateOptions) -> ItemListResult<Record> {
    if options.fields.is_empty() {
        return Err(ItemListError::configuration(
            OPERATION,
            "no fields specified; add a field to aggregate",
        ));
    }

    let dot = options.dot_notation;
    let mut out = Record::new();

    for field in options.fields.iter().filter(|f| !f.field_to_aggregate.is_empty()) {
        let source = field.field_to_aggregate.as_str();
        let mut values = Vec::new();
        let mut found = false;

        for item in items {
            match resolve(item, source, dot) {
                Some(Value::Array(list)) if options.merge_lists => {
                    found = true;
                    values.extend(list.iter().cloned());
                }
                Some(value) => {
                    found = true;
                    values.push(value.clone());
                }
                None if options.keep_missing => values.push(Value::Null),
                None => {}
            }
        }

        if !found && !items.is_empty() {
            warn!(operation = OPERATION, field = source, "field not found in any input item");
        }
        assign(&mut out, field.output_name(), Value::Array(values), dot);
    }

    debug!(
        operation = OPERATION,
        input_items = items.len(),
        fields = out.len(),
        "aggregated items"
    );
    Ok(out)
}

/// Which fields of each item are kept by [`aggregate_all_item_data`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ItemDataFields {
    #[default]
    AllFields,
    SpecifiedFields(Vec<String>),
    AllFieldsExcept(Vec<String>),
}

/// Options for [`aggregate_all_item_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateAllOptions {
    /// Field of the output record holding the list of items.
    pub destination_field_name: String,
    pub include: ItemDataFields,
    pub dot_notation: bool,
}

impl Default for AggregateAllOptions {
    fn default() -> Self {
        Self {
            destination_field_name: "data".to_string(),
            include: ItemDataFields::default(),
            dot_notation: true,
        }
    }
}

/// Collect whole items (optionally restricted to some fields) into a single list field.
pub fn aggregate_all_item_data(
    items: &[Record],
    options: &AggregateAllOptions,
) -> ItemListResult<Record> {
    if options.destination_field_name.is_empty() {
        return Err(ItemListError::configuration(
            OPERATION,
            "destination field name must not be empty",
        ));
    }
    match &options.include {
        ItemDataFields::SpecifiedFields(fields) | ItemDataFields::AllFieldsExcept(fields)
            if fields.is_empty() =>
        {
            return Err(ItemListError::configuration(
                OPERATION,
                "no fields specified; add a field to include or exclude",
            ));
        }
        _ => {}
    }

    let dot = options.dot_notation;
    let data = items
        .iter()
        .map(|item| match &options.include {
            ItemDataFields::AllFields => Value::Object(item.clone()),
            ItemDataFields::SpecifiedFields(fields) => {
                let mut picked = Record::new();
                for field in fields {
                    if let Some(v) = resolve(item, field, dot) {
                        assign(&mut picked, field, v.clone(), dot);
                    }
                }
                Value::Object(picked)
            }
            ItemDataFields::AllFieldsExcept(fields) => {
                let mut kept = item.clone();
                for field in fields {
                    remove(&mut kept, field, dot);
                }
                Value::Object(kept)
            }
        })
        .collect();

    let mut out = Record::new();
    out.insert(options.destination_field_name.clone(), Value::Array(data));
    debug!(operation = OPERATION, input_items = items.len(), "aggregated all item data");
    Ok(out)
}
