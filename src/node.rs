//! Host boundary: parameter retrieval, operation selection and outcome reporting.
//!
//! A workflow host implements [`NodeContext`] and calls [`execute`]. Parameters are read by name
//! (dotted names such as `options.disableDotNotation` address nested settings) and deserialized
//! with `serde`, so a wrong shape surfaces as [`ItemListError::InvalidParameter`].
//!
//! ```rust
//! use item_lists::node::{execute, ExecuteOptions, StaticNodeContext};
//! use serde_json::json;
//!
//! let ctx = StaticNodeContext::from_json(
//!     json!([{"n": 3}, {"n": 1}, {"n": 2}]),
//!     json!({
//!         "resource": "itemList",
//!         "operation": "sort",
//!         "sortFieldsUi": {"sortField": [{"fieldName": "n", "order": "descending"}]}
//!     }),
//! )
//! .unwrap();
//! let out = execute(&ctx, &ExecuteOptions::default()).unwrap();
//! assert_eq!(out[0]["n"], json!(3));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug_span;

use crate::error::{ItemListError, ItemListResult};
use crate::fields::resolve;
use crate::ingestion::json::records_from_json_value;
use crate::observability::{NodeObserver, RunContext, RunStats, Severity};
use crate::processing::{
    aggregate, aggregate_all_item_data, limit, remove_duplicates, sort, split_out_item,
    AggregateAllOptions, AggregateOptions, CompareFields, FieldToAggregate, IncludeFields,
    ItemDataFields, KeepItems, LimitOptions, RemoveDuplicatesOptions, SortField, SortMode,
    SortOptions, SortOrder, SplitOutOptions,
};
use crate::sandbox::{ConsoleMode, SandboxLimits};
use crate::types::{ExecutionMode, Record, Value};

/// The only resource this node exposes.
pub const RESOURCE_ITEM_LIST: &str = "itemList";

/// Capabilities a host provides to [`execute`].
pub trait NodeContext {
    /// The items flowing into the node.
    fn input_items(&self) -> &[Record];

    /// Raw value of parameter `name` as seen by item `item_index`, or `None` if unset.
    fn node_parameter(&self, name: &str, item_index: usize) -> Option<Value>;

    fn execution_mode(&self) -> ExecutionMode;

    /// Wrap the output for downstream consumption.
    fn prepare_output_data(&self, items: Vec<Record>) -> Vec<Record> {
        items
    }
}

/// Read parameter `name` as a `T`, falling back to `default` when it is unset or `null`.
pub fn get_parameter<T, C>(ctx: &C, name: &str, item_index: usize, default: T) -> ItemListResult<T>
where
    T: DeserializeOwned,
    C: NodeContext + ?Sized,
{
    match ctx.node_parameter(name, item_index) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => serde_json::from_value(value).map_err(|e| ItemListError::InvalidParameter {
            name: name.to_string(),
            message: e.to_string(),
        }),
    }
}

/// In-memory [`NodeContext`]: a list of items plus a JSON parameter tree.
///
/// Parameters are shared by every item unless overridden with [`Self::with_item_parameters`].
#[derive(Debug, Clone, Default)]
pub struct StaticNodeContext {
    items: Vec<Record>,
    parameters: Record,
    item_parameters: HashMap<usize, Record>,
    mode: ExecutionMode,
}

impl StaticNodeContext {
    pub fn new(items: Vec<Record>, parameters: Record) -> Self {
        Self {
            items,
            parameters,
            ..Default::default()
        }
    }

    /// Build from JSON: `items` must be an array of objects and `parameters` an object.
    pub fn from_json(items: Value, parameters: Value) -> ItemListResult<Self> {
        let Value::Object(parameters) = parameters else {
            return Err(ItemListError::InvalidInput {
                message: "node parameters must be a json object".to_string(),
            });
        };
        Ok(Self::new(records_from_json_value(items)?, parameters))
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Parameters seen only by item `item_index`, taking precedence over the shared ones.
    pub fn with_item_parameters(mut self, item_index: usize, parameters: Record) -> Self {
        self.item_parameters.insert(item_index, parameters);
        self
    }
}

impl NodeContext for StaticNodeContext {
    fn input_items(&self) -> &[Record] {
        &self.items
    }

    fn node_parameter(&self, name: &str, item_index: usize) -> Option<Value> {
        self.item_parameters
            .get(&item_index)
            .and_then(|params| resolve(params, name, true))
            .or_else(|| resolve(&self.parameters, name, true))
            .cloned()
    }

    fn execution_mode(&self) -> ExecutionMode {
        self.mode
    }
}

/// Operations of the [`RESOURCE_ITEM_LIST`] resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SplitOutItems,
    AggregateItems,
    RemoveDuplicates,
    Sort,
    Limit,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Self::SplitOutItems,
        Self::AggregateItems,
        Self::RemoveDuplicates,
        Self::Sort,
        Self::Limit,
    ];

    /// Host-facing operation name.
    pub fn name(self) -> &'static str {
        match self {
            Self::SplitOutItems => crate::processing::split_out::OPERATION,
            Self::AggregateItems => crate::processing::aggregate::OPERATION,
            Self::RemoveDuplicates => crate::processing::remove_duplicates::OPERATION,
            Self::Sort => crate::processing::sort::OPERATION,
            Self::Limit => crate::processing::limit::OPERATION,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

/// Options controlling [`execute`].
#[derive(Clone)]
pub struct ExecuteOptions {
    /// Optional observer for run outcomes.
    pub observer: Option<Arc<dyn NodeObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
    /// Limits applied to code-mode sorts.
    pub sandbox_limits: SandboxLimits,
}

impl fmt::Debug for ExecuteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecuteOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .field("sandbox_limits", &self.sandbox_limits)
            .finish()
    }
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: Severity::Critical,
            sandbox_limits: SandboxLimits::default(),
        }
    }
}

/// Run the operation selected by the `resource` and `operation` parameters.
///
/// `resource` defaults to [`RESOURCE_ITEM_LIST`]. When an observer is configured, this reports:
///
/// - `on_success` with input and output item counts
/// - `on_failure` with [`Severity::for_error`]
/// - `on_alert` when that severity is >= `options.alert_at_or_above`
pub fn execute<C>(ctx: &C, options: &ExecuteOptions) -> ItemListResult<Vec<Record>>
where
    C: NodeContext + ?Sized,
{
    let run = RunContext {
        resource: selector(ctx, "resource").unwrap_or_else(|| RESOURCE_ITEM_LIST.to_string()),
        operation: selector(ctx, "operation").unwrap_or_default(),
        input_items: ctx.input_items().len(),
    };
    let _span = debug_span!("execute", resource = %run.resource, operation = %run.operation).entered();

    let result = select(&run)
        .and_then(|operation| run_operation(ctx, operation, options))
        .map(|items| ctx.prepare_output_data(items));

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(items) => obs.on_success(
                &run,
                RunStats {
                    input_items: run.input_items,
                    output_items: items.len(),
                },
            ),
            Err(e) => {
                let sev = Severity::for_error(e);
                obs.on_failure(&run, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&run, sev, e);
                }
            }
        }
    }

    result
}

fn selector<C: NodeContext + ?Sized>(ctx: &C, name: &str) -> Option<String> {
    match ctx.node_parameter(name, 0)? {
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn select(run: &RunContext) -> ItemListResult<Operation> {
    if run.resource != RESOURCE_ITEM_LIST {
        return Err(ItemListError::UnknownResource(run.resource.clone()));
    }
    Operation::from_name(&run.operation).ok_or_else(|| ItemListError::UnknownOperation {
        resource: run.resource.clone(),
        operation: run.operation.clone(),
    })
}

fn run_operation<C: NodeContext + ?Sized>(
    ctx: &C,
    operation: Operation,
    options: &ExecuteOptions,
) -> ItemListResult<Vec<Record>> {
    let items = ctx.input_items();
    match operation {
        Operation::SplitOutItems => {
            let mut out = Vec::new();
            for (index, item) in items.iter().enumerate() {
                let opts = split_out_options(ctx, index)?;
                out.extend(split_out_item(item, index, &opts)?);
            }
            Ok(out)
        }
        Operation::AggregateItems => {
            let mode: AggregateMode = get_parameter(ctx, "aggregate", 0, AggregateMode::default())?;
            let record = match mode {
                AggregateMode::AggregateIndividualFields => {
                    aggregate(items, &aggregate_options(ctx)?)?
                }
                AggregateMode::AggregateAllItemData => {
                    aggregate_all_item_data(items, &aggregate_all_options(ctx)?)?
                }
            };
            Ok(vec![record])
        }
        Operation::RemoveDuplicates => remove_duplicates(items, &remove_duplicates_options(ctx)?),
        Operation::Sort => sort(items, &sort_options(ctx, options)?),
        Operation::Limit => limit(items, &limit_options(ctx)?),
    }
}

// Field lists arrive as a fixed collection, a plain list or a comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldList {
    Names(String),
    List(Vec<String>),
    Collection {
        #[serde(default)]
        fields: Vec<FieldName>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldName {
    #[serde(default)]
    field_name: String,
}

impl Default for FieldList {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl FieldList {
    fn into_names(self) -> Vec<String> {
        let names: Vec<String> = match self {
            Self::Names(joined) => joined.split(',').map(str::to_string).collect(),
            Self::List(names) => names,
            Self::Collection { fields } => fields.into_iter().map(|f| f.field_name).collect(),
        };
        names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

fn field_list<C: NodeContext + ?Sized>(
    ctx: &C,
    name: &str,
    item_index: usize,
) -> ItemListResult<Vec<String>> {
    Ok(get_parameter(ctx, name, item_index, FieldList::default())?.into_names())
}

fn dot_notation<C: NodeContext + ?Sized>(ctx: &C, item_index: usize) -> ItemListResult<bool> {
    Ok(!get_parameter(ctx, "options.disableDotNotation", item_index, false)?)
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
enum IncludeMode {
    #[default]
    NoOtherFields,
    AllOtherFields,
    SelectedOtherFields,
}

fn split_out_options<C: NodeContext + ?Sized>(
    ctx: &C,
    index: usize,
) -> ItemListResult<SplitOutOptions> {
    let field: String = get_parameter(ctx, "fieldToSplitOut", index, String::new())?;
    let include = match get_parameter(ctx, "include", index, IncludeMode::default())? {
        IncludeMode::NoOtherFields => IncludeFields::NoOtherFields,
        IncludeMode::AllOtherFields => IncludeFields::AllOtherFields,
        IncludeMode::SelectedOtherFields => {
            IncludeFields::SelectedOtherFields(field_list(ctx, "fieldsToInclude", index)?)
        }
    };
    let mut opts = SplitOutOptions::new(field.trim())
        .include(include)
        .dot_notation(dot_notation(ctx, index)?);
    let destination: String = get_parameter(ctx, "options.destinationFieldName", index, String::new())?;
    if !destination.is_empty() {
        opts = opts.destination(destination);
    }
    Ok(opts)
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
enum AggregateMode {
    #[default]
    AggregateIndividualFields,
    AggregateAllItemData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AggregateFieldParam {
    #[serde(default)]
    field_to_aggregate: String,
    #[serde(default)]
    rename_field: bool,
    #[serde(default)]
    output_field_name: String,
}

fn aggregate_options<C: NodeContext + ?Sized>(ctx: &C) -> ItemListResult<AggregateOptions> {
    let params: Vec<AggregateFieldParam> =
        get_parameter(ctx, "fieldsToAggregate.fieldToAggregate", 0, Vec::new())?;
    let fields = params
        .into_iter()
        .map(|p| {
            let source = p.field_to_aggregate.trim().to_string();
            if p.rename_field && !p.output_field_name.is_empty() {
                FieldToAggregate::renamed(source, p.output_field_name)
            } else {
                FieldToAggregate::new(source)
            }
        })
        .collect();

    let mut opts = AggregateOptions::new(fields);
    opts.dot_notation = dot_notation(ctx, 0)?;
    opts.merge_lists = get_parameter(ctx, "options.mergeLists", 0, false)?;
    opts.keep_missing = get_parameter(ctx, "options.keepMissing", 0, false)?;
    Ok(opts)
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ItemDataMode {
    #[default]
    AllFields,
    SpecifiedFields,
    AllFieldsExcept,
}

fn aggregate_all_options<C: NodeContext + ?Sized>(ctx: &C) -> ItemListResult<AggregateAllOptions> {
    let include = match get_parameter(ctx, "include", 0, ItemDataMode::default())? {
        ItemDataMode::AllFields => ItemDataFields::AllFields,
        ItemDataMode::SpecifiedFields => {
            ItemDataFields::SpecifiedFields(field_list(ctx, "fieldsToInclude", 0)?)
        }
        ItemDataMode::AllFieldsExcept => {
            ItemDataFields::AllFieldsExcept(field_list(ctx, "fieldsToExclude", 0)?)
        }
    };
    let defaults = AggregateAllOptions::default();
    Ok(AggregateAllOptions {
        destination_field_name: get_parameter(
            ctx,
            "destinationFieldName",
            0,
            defaults.destination_field_name,
        )?,
        include,
        dot_notation: dot_notation(ctx, 0)?,
    })
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
enum CompareMode {
    #[default]
    AllFields,
    AllFieldsExcept,
    SelectedFields,
}

fn remove_duplicates_options<C: NodeContext + ?Sized>(
    ctx: &C,
) -> ItemListResult<RemoveDuplicatesOptions> {
    let compare = match get_parameter(ctx, "compare", 0, CompareMode::default())? {
        CompareMode::AllFields => CompareFields::AllFields,
        CompareMode::AllFieldsExcept => {
            CompareFields::AllFieldsExcept(field_list(ctx, "fieldsToExclude", 0)?)
        }
        CompareMode::SelectedFields => {
            CompareFields::SelectedFields(field_list(ctx, "fieldsToCompare", 0)?)
        }
    };
    Ok(RemoveDuplicatesOptions {
        compare,
        dot_notation: dot_notation(ctx, 0)?,
    })
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
enum SortType {
    #[default]
    Simple,
    Code,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SortFieldParam {
    #[serde(default)]
    field_name: String,
    #[serde(default)]
    order: SortOrder,
}

fn sort_options<C: NodeContext + ?Sized>(
    ctx: &C,
    options: &ExecuteOptions,
) -> ItemListResult<SortOptions> {
    let mode = match get_parameter(ctx, "type", 0, SortType::default())? {
        SortType::Simple => {
            let params: Vec<SortFieldParam> =
                get_parameter(ctx, "sortFieldsUi.sortField", 0, Vec::new())?;
            SortMode::Simple(
                params
                    .into_iter()
                    .map(|p| SortField {
                        field_name: p.field_name.trim().to_string(),
                        order: p.order,
                    })
                    .collect(),
            )
        }
        SortType::Code => SortMode::Code(get_parameter(ctx, "code", 0, String::new())?),
    };
    let console = match ctx.execution_mode() {
        ExecutionMode::Manual => ConsoleMode::Redirect,
        ExecutionMode::Production => ConsoleMode::Inherit,
    };
    Ok(SortOptions {
        mode,
        dot_notation: dot_notation(ctx, 0)?,
        console,
        limits: options.sandbox_limits.clone(),
    })
}

fn limit_options<C: NodeContext + ?Sized>(ctx: &C) -> ItemListResult<LimitOptions> {
    let max_items: f64 = get_parameter(ctx, "maxItems", 0, 1.0)?;
    if max_items < 0.0 || max_items.fract() != 0.0 || !max_items.is_finite() {
        return Err(ItemListError::InvalidParameter {
            name: "maxItems".to_string(),
            message: format!("expected a whole number of items, got {max_items}"),
        });
    }
    Ok(LimitOptions {
        max_items: max_items as usize,
        keep: get_parameter(ctx, "keep", 0, KeepItems::default())?,
    })
}

#[cfg(test)]
mod tests {
    use super::{get_parameter, NodeContext, Operation, StaticNodeContext};
    use crate::error::ErrorKind;
    use crate::types::{ExecutionMode, Record};
    use serde_json::json;

    fn params(v: serde_json::Value) -> Record {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        assert_eq!(Operation::from_name("summarize"), None);
    }

    #[test]
    fn dotted_parameter_names_resolve_into_the_tree() {
        let ctx = StaticNodeContext::new(
            vec![],
            params(json!({"options": {"disableDotNotation": true}})),
        );
        assert!(get_parameter(&ctx, "options.disableDotNotation", 0, false).unwrap());
        assert!(!get_parameter(&ctx, "options.mergeLists", 0, false).unwrap());
        assert_eq!(ctx.execution_mode(), ExecutionMode::Production);
    }

    #[test]
    fn item_parameters_override_shared_ones() {
        let ctx = StaticNodeContext::new(vec![], params(json!({"fieldToSplitOut": "a"})))
            .with_item_parameters(1, params(json!({"fieldToSplitOut": "b"})));
        assert_eq!(ctx.node_parameter("fieldToSplitOut", 0), Some(json!("a")));
        assert_eq!(ctx.node_parameter("fieldToSplitOut", 1), Some(json!("b")));
    }

    #[test]
    fn wrong_parameter_shape_is_a_configuration_error() {
        let ctx = StaticNodeContext::new(vec![], params(json!({"maxItems": "many"})));
        let err = get_parameter::<f64, _>(&ctx, "maxItems", 0, 1.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("maxItems"));
    }
}
