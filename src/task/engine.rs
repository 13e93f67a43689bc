//! Worker-pool runner for [`FileTask`]s.

use std::any::Any;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Result, WordstatError};
use crate::task::config::{FailurePolicy, TaskConfig};
use crate::task::context::RunContext;
use crate::task::metrics::{TaskMetrics, Timer};
use crate::task::{FileFailure, FileResult, FileTask};
use crate::util::cancel::CancellationToken;

/// Result of a completed run.
#[derive(Debug, Serialize)]
pub struct TaskReport<S> {
    /// Unique id of the run, also present in its log records.
    pub run_id: Uuid,

    /// Name of the task that ran.
    pub task_name: String,

    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,

    /// Number of input files.
    pub files_total: usize,

    /// Number of files processed successfully.
    pub files_processed: usize,

    /// Number of files that failed.
    pub files_failed: usize,

    /// Every failed file with its error.
    pub failures: Vec<FileFailure>,

    /// Total execution time, aggregation included.
    pub execution_time: Duration,

    /// Run metrics, when enabled in the configuration.
    pub metrics: Option<TaskMetrics>,

    /// Whatever the task's aggregation returned.
    pub summary: S,
}

/// Runs a [`FileTask`] over a set of files with a fixed pool of workers.
#[derive(Debug)]
pub struct TaskRunner {
    config: TaskConfig,
    cancel: CancellationToken,
}

impl TaskRunner {
    /// Create a runner. Invalid configurations are rejected here, before any
    /// thread exists.
    pub fn new(config: TaskConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Handle that cancels runs of this runner.
    ///
    /// Workers stop taking files, in-flight tokenization stops at its next
    /// chunk, and the run returns
    /// [`OperationCancelled`](WordstatError::OperationCancelled).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run `task` over every regular file in `dir`.
    pub fn run_dir<T: FileTask>(&self, task: &T, dir: &Path) -> Result<TaskReport<T::Summary>> {
        let inputs = list_input_files(dir)?;
        self.run(task, inputs)
    }

    /// Run `task` over `inputs`, each path processed exactly once.
    pub fn run<T: FileTask>(
        &self,
        task: &T,
        inputs: Vec<PathBuf>,
    ) -> Result<TaskReport<T::Summary>> {
        let ctx = RunContext::new(task.name(), self.cancel.clone());
        let files_total = inputs.len();
        log::info!(
            target: ctx.log_target(),
            "Run {} started: {} files, {} workers",
            ctx.run_id(),
            files_total,
            self.config.num_workers
        );

        let (work_tx, work_rx) = unbounded();
        for path in inputs {
            work_tx
                .send(path)
                .map_err(|_| WordstatError::other("work queue closed while filling"))?;
        }
        drop(work_tx);

        let (result_tx, result_rx) = unbounded();
        self.run_workers(task, &ctx, &work_rx, &result_tx)?;
        drop(result_tx);

        let results: Vec<FileResult<T::Output>> = result_rx.try_iter().collect();

        if ctx.is_cancelled() {
            ctx.finish();
            return Err(WordstatError::cancelled(format!(
                "{} stopped after {} of {} files",
                task.name(),
                results.len(),
                files_total
            )));
        }

        if ctx.is_aborted() {
            ctx.finish();
            return Err(first_failure(&results));
        }

        let failures: Vec<FileFailure> = results.iter().filter_map(FileResult::failure).collect();
        let files_failed = failures.len();
        let files_processed = results.len() - files_failed;

        let run_id = ctx.run_id();
        let started_at = ctx.started_at();
        for failure in &failures {
            log::warn!(
                target: ctx.log_target(),
                "Skipping {} in aggregation: {}",
                failure.path.display(),
                failure.error
            );
        }
        log::debug!(
            target: ctx.log_target(),
            "Aggregating {} results ({} failed)",
            results.len(),
            files_failed
        );
        let summary = task.aggregate_results(results);
        let (execution_time, metrics) = ctx.finish();
        let summary = summary?;

        Ok(TaskReport {
            run_id,
            task_name: task.name().to_string(),
            started_at,
            files_total,
            files_processed,
            files_failed,
            failures,
            execution_time,
            metrics: self.config.enable_metrics.then_some(metrics),
            summary,
        })
    }

    /// Spawn the pool, wait for every worker to exit (join barrier).
    fn run_workers<T: FileTask>(
        &self,
        task: &T,
        ctx: &RunContext,
        work: &Receiver<PathBuf>,
        results: &Sender<FileResult<T::Output>>,
    ) -> Result<()> {
        let config = &self.config;

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(config.num_workers);
            let mut spawn_error = None;

            for worker_id in 0..config.num_workers {
                let work = work.clone();
                let results = results.clone();
                let spawned = thread::Builder::new()
                    .name(format!("wordstat-worker-{worker_id}"))
                    .spawn_scoped(scope, move || {
                        worker_loop(worker_id, task, ctx, config, work, results)
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        spawn_error = Some(WordstatError::other(format!(
                            "Failed to spawn worker {worker_id}: {e}"
                        )));
                        break;
                    }
                }
            }

            let mut join_error = None;
            for handle in handles {
                if let Err(payload) = handle.join() {
                    join_error = Some(WordstatError::ThreadJoin(panic_message(payload.as_ref())));
                }
            }

            match (spawn_error, join_error) {
                (Some(e), _) | (None, Some(e)) => Err(e),
                (None, None) => Ok(()),
            }
        })
    }
}

/// Pull paths until the queue is drained or the run is stopped.
fn worker_loop<T: FileTask>(
    worker_id: usize,
    task: &T,
    ctx: &RunContext,
    config: &TaskConfig,
    work: Receiver<PathBuf>,
    results: Sender<FileResult<T::Output>>,
) {
    let target = ctx.log_target();

    // recv() fails only once the queue is empty and closed.
    while let Ok(path) = work.recv() {
        if ctx.should_stop() {
            log::debug!(target: target, "Worker {worker_id} stopping, run interrupted");
            break;
        }

        let file_ctx = ctx.file_context(worker_id, config);
        let timer = Timer::start();
        let result = match panic::catch_unwind(AssertUnwindSafe(|| {
            task.process_file(&path, &file_ctx)
        })) {
            Ok(result) => result.map_err(|e| e.with_path(&path)),
            Err(payload) => Err(WordstatError::worker_failure(
                &path,
                panic_message(payload.as_ref()),
            )),
        };
        let processing_time = timer.stop();
        ctx.metrics().record_file(processing_time, result.is_ok());

        match &result {
            Ok(_) => log::info!(target: target, "Processed {}", path.display()),
            Err(e) if e.is_cancelled() => {
                log::debug!(target: target, "Cancelled {}", path.display())
            }
            Err(e) => {
                log::warn!(target: target, "Failed to process {}: {e}", path.display());
                if config.failure_policy == FailurePolicy::FailFast {
                    ctx.abort();
                }
            }
        }

        let published = results.send(FileResult {
            path,
            worker_id,
            processing_time,
            result,
        });
        if published.is_err() {
            break;
        }
    }

    log::debug!(target: target, "Exiting worker: {worker_id}");
}

/// The error a fail-fast run reports: the first failure that was not itself
/// caused by the abort.
fn first_failure<T>(results: &[FileResult<T>]) -> WordstatError {
    let failed = || results.iter().filter_map(|r| r.error().map(|e| (&r.path, e)));
    let (path, error) = match failed().find(|(_, e)| !e.is_cancelled()) {
        Some(found) => found,
        None => match failed().next() {
            Some(found) => found,
            None => return WordstatError::other("run aborted without a recorded failure"),
        },
    };
    WordstatError::worker_failure(path, error.to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}

/// List the regular files directly inside `dir`, sorted by path.
///
/// Symlinks are followed; subdirectories are skipped. An entry whose metadata
/// cannot be read (a dangling symlink, a file removed meanwhile) is still
/// listed, so opening it fails as a per-file error during the run.
pub fn list_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| annotate(e, dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| annotate(e, dir))?.path();
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                log::warn!("Cannot stat {}: {e}", path.display());
                files.push(path);
            }
        }
    }
    files.sort();

    Ok(files)
}

fn annotate(error: io::Error, path: &Path) -> WordstatError {
    WordstatError::Io(io::Error::new(
        error.kind(),
        format!("{}: {error}", path.display()),
    ))
}
