//! Per-run context shared by the runner and its workers.
//!
//! A [`RunContext`] is created once at the start of every run. It owns the
//! run's identity and log target, the cancellation state and the metrics
//! collector, and is consumed by [`RunContext::finish`], which flushes the
//! logger. Workers only ever see it by shared reference.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::task::FileContext;
use crate::task::config::TaskConfig;
use crate::task::metrics::{TaskMetrics, TaskMetricsCollector, Timer};
use crate::util::cancel::{CancellationToken, Interrupt};

/// Run-scoped logging, cancellation and metrics state.
#[derive(Debug)]
pub struct RunContext {
    run_id: Uuid,
    task_name: String,
    log_target: Arc<str>,
    /// Caller-owned token; outlives the run.
    cancel: CancellationToken,
    /// Tripped by fail-fast; lives only as long as this run.
    abort: CancellationToken,
    metrics: TaskMetricsCollector,
    started_at: DateTime<Utc>,
    timer: Timer,
}

impl RunContext {
    /// Create the context for a new run of `task_name`.
    pub fn new(task_name: &str, cancel: CancellationToken) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            task_name: task_name.to_string(),
            log_target: Arc::from(format!("wordstat::run::{task_name}")),
            cancel,
            abort: CancellationToken::new(),
            metrics: TaskMetricsCollector::new(),
            started_at: Utc::now(),
            timer: Timer::start(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// Log target for every record emitted on behalf of this run.
    pub fn log_target(&self) -> &str {
        &self.log_target
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn metrics(&self) -> &TaskMetricsCollector {
        &self.metrics
    }

    /// Whether the caller cancelled the run.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the run was aborted by a fail-fast failure.
    pub fn is_aborted(&self) -> bool {
        self.abort.is_cancelled()
    }

    /// Whether workers should stop taking new files.
    pub fn should_stop(&self) -> bool {
        self.is_cancelled() || self.is_aborted()
    }

    /// Stop the run after a failure. Does not touch the caller's token.
    pub fn abort(&self) {
        self.abort.cancel();
    }

    /// Build the context handed to `process_file` for one file.
    pub fn file_context(&self, worker_id: usize, config: &TaskConfig) -> FileContext<'_> {
        let mut interrupt = Interrupt::none()
            .with_token(self.cancel.clone())
            .with_token(self.abort.clone());
        if let Some(timeout) = config.file_timeout {
            interrupt = interrupt.with_timeout(timeout);
        }

        FileContext::new(worker_id, config.read_size)
            .with_interrupt(interrupt)
            .with_log_target(self.log_target.clone())
            .with_metrics(&self.metrics)
    }

    /// End the run: flush buffered log records and return the elapsed time and
    /// final metrics.
    pub fn finish(self) -> (Duration, TaskMetrics) {
        let elapsed = self.timer.elapsed();
        let metrics = self.metrics.snapshot();
        log::debug!(
            target: self.log_target(),
            "Run {} finished in {:?}",
            self.run_id,
            elapsed
        );
        log::logger().flush();
        (elapsed, metrics)
    }
}
