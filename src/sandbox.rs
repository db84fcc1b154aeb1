//! Sandboxed evaluation of caller-supplied sort code.
//!
//! The code fragment becomes the body of a [Rhai](https://rhai.rs) function receiving the two
//! records being compared as object maps `a` and `b`:
//!
//! ```text
//! if a.priority == b.priority { return 0; }
//! return if a.priority < b.priority { -1 } else { 1 };
//! ```
//!
//! A negative result orders `a` first, a positive one orders `b` first, zero keeps them tied.
//! Floats are accepted, `true` counts as positive and `()` as zero.
//!
//! The whole sort runs as one script call: a native merge sort registered in the engine drives
//! the comparison function from inside that call, so [`SandboxLimits::max_operations`] bounds the
//! complete sort rather than each comparison. The engine has no module resolver, `eval` is
//! disabled, and script functions cannot see any host state. Records are handed over as copies,
//! so mutations inside the code never reach the output.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use rhai::module_resolvers::DummyModuleResolver;
use rhai::{Array, AST, Dynamic, Engine, EvalAltResult, FnPtr, INT, NativeCallContext, Position, Scope};
use tracing::{debug, info};

use crate::compare::sorted_order;
use crate::error::{ItemListError, ItemListResult};
use crate::types::Record;

const COMPARE_FN: &str = "item_compare";
const SORT_FN: &str = "item_sort_order";
const NATIVE_SORT_FN: &str = "sort_by_comparer";

static RETURN_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\breturn\b").expect("valid return keyword pattern"));

/// Where `print`/`debug` output of sort code goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleMode {
    /// Forward to `tracing` under the `item_lists::sandbox` target.
    Redirect,
    /// Leave the engine's default behavior (write to stdout).
    #[default]
    Inherit,
}

/// Resource ceilings for one code-mode sort.
///
/// For operations, expression depth and sizes, zero disables the limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxLimits {
    /// Operations allowed for the whole sort.
    pub max_operations: u64,
    pub max_call_levels: usize,
    pub max_expr_depth: usize,
    pub max_string_size: usize,
    pub max_array_size: usize,
    pub max_map_size: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            max_operations: 10_000_000,
            max_call_levels: 32,
            max_expr_depth: 64,
            max_string_size: 1 << 20,
            max_array_size: 1_000_000,
            max_map_size: 10_000,
        }
    }
}

/// Whether `code` contains the word `return`.
///
/// This is a textual check only: `return` inside a comment or string satisfies it.
pub fn has_return(code: &str) -> bool {
    RETURN_KEYWORD.is_match(code)
}

/// Compiled sort code, ready to sort item lists.
pub struct CodeComparator {
    engine: Engine,
    ast: AST,
}

impl std::fmt::Debug for CodeComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeComparator")
            .field("functions", &self.ast.iter_functions().count())
            .finish()
    }
}

impl CodeComparator {
    /// Check and compile `code`.
    ///
    /// Fails with a configuration error, before anything runs, if `code` has no `return`, and with
    /// a script error if it does not parse as a standalone block or defines functions.
    pub fn compile(
        operation: &'static str,
        code: &str,
        limits: &SandboxLimits,
        console: ConsoleMode,
    ) -> ItemListResult<Self> {
        if !has_return(code) {
            return Err(ItemListError::configuration(
                operation,
                "sort code doesn't return; add a 'return' statement to your code",
            ));
        }

        let engine = build_engine(limits, console);

        // Parsed alone, the fragment must be a complete block with no function definitions, so
        // once wrapped it cannot close the comparison body early or replace the sort driver.
        let fragment = engine.compile(code).map_err(|e| ItemListError::Script {
            message: e.to_string(),
        })?;
        if fragment.iter_functions().next().is_some() {
            return Err(ItemListError::Script {
                message: "sort code must not define functions".to_string(),
            });
        }

        let script = format!(
            "fn {COMPARE_FN}(a, b) {{\n{code}\n}}\n\nfn {SORT_FN}(items) {{\n    {NATIVE_SORT_FN}(items, Fn(\"{COMPARE_FN}\"))\n}}\n"
        );
        let ast = engine.compile(&script).map_err(|e| ItemListError::Script {
            message: e.to_string(),
        })?;
        Ok(Self { engine, ast })
    }

    /// Sort `items` with the compiled code in one sandboxed call.
    pub fn sort(&self, items: &[Record]) -> ItemListResult<Vec<Record>> {
        let records = items
            .iter()
            .map(rhai::serde::to_dynamic)
            .collect::<Result<Array, _>>()
            .map_err(script_error)?;

        let order: Array = self
            .engine
            .call_fn(&mut Scope::new(), &self.ast, SORT_FN, (records,))
            .map_err(script_error)?;

        let order = permutation(&order, items.len())?;
        debug!(items = items.len(), "sorted items with custom code");
        Ok(order.into_iter().map(|index| items[index].clone()).collect())
    }
}

fn build_engine(limits: &SandboxLimits, console: ConsoleMode) -> Engine {
    let mut engine = Engine::new();
    engine
        .set_module_resolver(DummyModuleResolver::new())
        .set_max_operations(limits.max_operations)
        .set_max_call_levels(limits.max_call_levels)
        .set_max_expr_depths(limits.max_expr_depth, limits.max_expr_depth)
        .set_max_string_size(limits.max_string_size)
        .set_max_array_size(limits.max_array_size)
        .set_max_map_size(limits.max_map_size)
        .disable_symbol("eval");

    if console == ConsoleMode::Redirect {
        engine.on_print(|text| info!(target: "item_lists::sandbox", "{text}"));
        engine.on_debug(|text, source, pos| {
            debug!(
                target: "item_lists::sandbox",
                source = source.unwrap_or_default(),
                position = %pos,
                "{text}"
            );
        });
    }

    engine.register_fn(NATIVE_SORT_FN, sort_by_comparer);
    engine
}

// Returns the sorted order of `items` as indices.
fn sort_by_comparer(
    context: NativeCallContext,
    items: Array,
    comparer: FnPtr,
) -> Result<Array, Box<EvalAltResult>> {
    let order = sorted_order(items.len(), |a, b| {
        let verdict: Dynamic =
            comparer.call_within_context(&context, (items[a].clone(), items[b].clone()))?;
        verdict_ordering(&verdict).ok_or_else(|| {
            runtime_error(format!(
                "sort code must return a number, got {}",
                verdict.type_name()
            ))
        })
    })?;
    Ok(order.into_iter().map(|index| Dynamic::from(index as INT)).collect())
}

fn verdict_ordering(verdict: &Dynamic) -> Option<Ordering> {
    if verdict.is_unit() {
        return Some(Ordering::Equal);
    }
    if let Ok(n) = verdict.as_int() {
        return Some(n.cmp(&0));
    }
    if let Ok(f) = verdict.as_float() {
        return Some(f.partial_cmp(&0.0).unwrap_or(Ordering::Equal));
    }
    if let Ok(b) = verdict.as_bool() {
        return Some(if b { Ordering::Greater } else { Ordering::Equal });
    }
    None
}

fn permutation(order: &Array, len: usize) -> ItemListResult<Vec<usize>> {
    let mut seen = vec![false; len];
    let mut out = Vec::with_capacity(len);
    for entry in order {
        let index = entry
            .as_int()
            .ok()
            .and_then(|i| usize::try_from(i).ok())
            .filter(|&i| i < len && !seen[i])
            .ok_or_else(|| ItemListError::Script {
                message: "sort produced an invalid item order".to_string(),
            })?;
        seen[index] = true;
        out.push(index);
    }
    if out.len() != len {
        return Err(ItemListError::Script {
            message: "sort produced an invalid item order".to_string(),
        });
    }
    Ok(out)
}

fn runtime_error(message: String) -> Box<EvalAltResult> {
    Box::new(EvalAltResult::ErrorRuntime(Dynamic::from(message), Position::NONE))
}

fn script_error(err: Box<EvalAltResult>) -> ItemListError {
    ItemListError::Script {
        message: err.to_string(),
    }
}
