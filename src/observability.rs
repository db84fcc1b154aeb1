//! Outcome reporting for node executions.
//!
//! [`crate::node::execute`] reports every run to an optional [`NodeObserver`]: `on_success` with
//! item counts, `on_failure` with a [`Severity`] derived from the error, and `on_alert` when that
//! severity reaches the configured threshold.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{error, info, warn};

use crate::error::ItemListError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    /// Non-fatal for the workflow, e.g. a limit larger than the input.
    Warning,
    /// The operation failed.
    Error,
    /// I/O or other infrastructure failure.
    Critical,
}

impl Severity {
    /// Severity of a failed run ending in `error`.
    pub fn for_error(error: &ItemListError) -> Self {
        match error {
            ItemListError::Io(_) => Self::Critical,
            ItemListError::Json(err) if err.is_io() => Self::Critical,
            ItemListError::Csv(err) if matches!(err.kind(), ::csv::ErrorKind::Io(_)) => Self::Critical,
            ItemListError::NotEnoughItems { .. } => Self::Warning,
            _ => Self::Error,
        }
    }
}

/// Which node run is being reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub resource: String,
    pub operation: String,
    pub input_items: usize,
}

/// Renders as `resource:operation`, e.g. `itemList:sort`.
impl fmt::Display for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.operation)
    }
}

/// Counts reported on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub input_items: usize,
    pub output_items: usize,
}

/// Observer interface for node run outcomes.
pub trait NodeObserver: Send + Sync {
    fn on_success(&self, _ctx: &RunContext, _stats: RunStats) {}

    fn on_failure(&self, _ctx: &RunContext, _severity: Severity, _error: &ItemListError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &RunContext, severity: Severity, error: &ItemListError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Forwards every node run outcome to each registered observer, in registration order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn NodeObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn NodeObserver>>) -> Self {
        Self { observers }
    }

    /// Register one more observer.
    pub fn with(mut self, observer: Arc<dyn NodeObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    fn each(&self, f: impl Fn(&dyn NodeObserver)) {
        self.observers.iter().for_each(|o| f(o.as_ref()));
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl NodeObserver for CompositeObserver {
    fn on_success(&self, ctx: &RunContext, stats: RunStats) {
        self.each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &RunContext, severity: Severity, error: &ItemListError) {
        self.each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &RunContext, severity: Severity, error: &ItemListError) {
        self.each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Emits run outcomes as `tracing` events.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl NodeObserver for TracingObserver {
    fn on_success(&self, ctx: &RunContext, stats: RunStats) {
        info!(
            resource = %ctx.resource,
            operation = %ctx.operation,
            input_items = stats.input_items,
            output_items = stats.output_items,
            "node run succeeded"
        );
    }

    fn on_failure(&self, ctx: &RunContext, severity: Severity, error: &ItemListError) {
        warn!(
            resource = %ctx.resource,
            operation = %ctx.operation,
            ?severity,
            %error,
            "node run failed"
        );
    }

    fn on_alert(&self, ctx: &RunContext, severity: Severity, error: &ItemListError) {
        error!(
            resource = %ctx.resource,
            operation = %ctx.operation,
            ?severity,
            %error,
            "node run alert"
        );
    }
}

/// Writes one line per node run to a log file, in `key=value` form:
///
/// ```text
/// ts_ms=1760000000000 node=itemList:limit outcome=success items_in=3 items_out=2
/// ts_ms=1760000000001 node=itemList:limit outcome=failure severity=Warning items_in=3 error="..."
/// ```
///
/// The file is opened for append on first use and kept open. Logging never fails a run: open and
/// write errors are dropped.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_run(&self, ctx: &RunContext, outcome: &str, detail: fmt::Arguments<'_>) {
        let Ok(mut slot) = self.file.lock() else {
            return;
        };
        if slot.is_none() {
            *slot = OpenOptions::new().create(true).append(true).open(&self.path).ok();
        }
        if let Some(file) = slot.as_mut() {
            let _ = writeln!(file, "ts_ms={} node={ctx} outcome={outcome} {detail}", now_ms());
        }
    }

    fn write_error(&self, ctx: &RunContext, outcome: &str, severity: Severity, error: &ItemListError) {
        self.write_run(
            ctx,
            outcome,
            format_args!(
                "severity={severity:?} items_in={} error={:?}",
                ctx.input_items,
                error.to_string()
            ),
        );
    }
}

impl NodeObserver for FileObserver {
    fn on_success(&self, ctx: &RunContext, stats: RunStats) {
        self.write_run(
            ctx,
            "success",
            format_args!("items_in={} items_out={}", stats.input_items, stats.output_items),
        );
    }

    fn on_failure(&self, ctx: &RunContext, severity: Severity, error: &ItemListError) {
        self.write_error(ctx, "failure", severity, error);
    }

    fn on_alert(&self, ctx: &RunContext, severity: Severity, error: &ItemListError) {
        self.write_error(ctx, "alert", severity, error);
    }
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{CompositeObserver, FileObserver, NodeObserver, RunContext, RunStats, Severity};
    use crate::error::ItemListError;

    fn sort_run() -> RunContext {
        RunContext {
            resource: "itemList".into(),
            operation: "sort".into(),
            input_items: 4,
        }
    }

    #[test]
    fn severity_ordering_and_classification() {
        assert!(Severity::Critical > Severity::Error);
        assert!(Severity::Error > Severity::Warning);

        let io = ItemListError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(Severity::for_error(&io), Severity::Critical);
        assert_eq!(
            Severity::for_error(&ItemListError::NotEnoughItems {
                requested: 2,
                available: 1
            }),
            Severity::Warning
        );
        assert_eq!(
            Severity::for_error(&ItemListError::configuration("limit", "bad")),
            Severity::Error
        );
    }

    #[test]
    fn file_observer_writes_key_value_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("node.log");
        let observer = Arc::new(FileObserver::new(&log));
        let composite = CompositeObserver::default().with(observer.clone());
        assert_eq!(composite.len(), 1);

        let ctx = sort_run();
        composite.on_success(&ctx, RunStats { input_items: 4, output_items: 4 });
        composite.on_alert(&ctx, Severity::Critical, &ItemListError::configuration("sort", "no fields"));

        let text = std::fs::read_to_string(observer.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ts_ms="));
        assert!(lines[0].ends_with("node=itemList:sort outcome=success items_in=4 items_out=4"));
        assert!(lines[1].contains("node=itemList:sort outcome=alert severity=Critical items_in=4 error=\""));
    }
}
