//! Parallel per-file task framework.
//!
//! A [`FileTask`] supplies two operations: `process_file`, run concurrently by
//! a fixed pool of workers (once per input file), and `aggregate_results`,
//! run exactly once on the calling thread after every worker has been joined.
//! [`TaskRunner`](engine::TaskRunner) owns the threads, the work and result
//! queues and the join barrier.
//!
//! Per-file failures never vanish: each file's outcome is wrapped in a
//! [`FileResult`] and handed to aggregation, which decides what to do with it.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//!
//! use wordstat::error::Result;
//! use wordstat::task::engine::TaskRunner;
//! use wordstat::task::config::TaskConfig;
//! use wordstat::task::{FileContext, FileResult, FileTask};
//!
//! struct ByteCount;
//!
//! impl FileTask for ByteCount {
//!     type Output = u64;
//!     type Summary = u64;
//!
//!     fn name(&self) -> &str {
//!         "byte_count"
//!     }
//!
//!     fn process_file(&self, path: &Path, _ctx: &FileContext) -> Result<u64> {
//!         Ok(std::fs::metadata(path)?.len())
//!     }
//!
//!     fn aggregate_results(&self, results: Vec<FileResult<u64>>) -> Result<u64> {
//!         Ok(results.iter().filter_map(FileResult::output).sum())
//!     }
//! }
//!
//! let runner = TaskRunner::new(TaskConfig::default())?;
//! let report = runner.run_dir(&ByteCount, Path::new("input"))?;
//! println!("{} bytes", report.summary);
//! # Ok::<(), wordstat::error::WordstatError>(())
//! ```

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::{DEFAULT_READ_SIZE, TokenStream, WordTokenizer};
use crate::error::{Result, WordstatError};
use crate::task::metrics::TaskMetricsCollector;
use crate::util::cancel::Interrupt;

pub mod config;
pub mod context;
pub mod engine;
pub mod metrics;

pub use config::{FailurePolicy, TaskConfig};
pub use engine::{TaskReport, TaskRunner};

/// A computation over a set of files.
///
/// One instance is shared by reference among all workers, hence `Sync`.
pub trait FileTask: Sync {
    /// Result of processing a single file.
    type Output: Send;

    /// Result of aggregation.
    type Summary;

    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Process one file. Called concurrently from worker threads.
    fn process_file(&self, path: &Path, ctx: &FileContext<'_>) -> Result<Self::Output>;

    /// Combine every file's outcome. Called once, after all workers finished.
    ///
    /// `results` arrive in no particular order.
    fn aggregate_results(&self, results: Vec<FileResult<Self::Output>>) -> Result<Self::Summary>;
}

/// Outcome of processing one file.
#[derive(Debug)]
pub struct FileResult<T> {
    /// Input path.
    pub path: PathBuf,

    /// Worker that processed the file.
    pub worker_id: usize,

    /// Wall time spent in `process_file`.
    pub processing_time: Duration,

    /// Output or the error that prevented it.
    pub result: Result<T>,
}

impl<T> FileResult<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The output, if processing succeeded.
    pub fn output(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    /// The error, if processing failed.
    pub fn error(&self) -> Option<&WordstatError> {
        self.result.as_ref().err()
    }

    /// Describe a failed result for reporting.
    pub fn failure(&self) -> Option<FileFailure> {
        self.error().map(|e| FileFailure {
            path: self.path.clone(),
            error: e.to_string(),
        })
    }
}

/// A failed file, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Per-file context handed to [`FileTask::process_file`].
///
/// Carries what a task needs to tokenize the file the way the run is
/// configured: chunk size, interrupt (cancellation and per-file deadline),
/// log target and metrics sink.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    worker_id: usize,
    read_size: usize,
    interrupt: Interrupt,
    log_target: Option<Arc<str>>,
    metrics: Option<&'a TaskMetricsCollector>,
}

impl<'a> FileContext<'a> {
    /// Create a context with no interrupt, default log target and no metrics.
    pub fn new(worker_id: usize, read_size: usize) -> Self {
        Self {
            worker_id,
            read_size,
            interrupt: Interrupt::none(),
            log_target: None,
            metrics: None,
        }
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn with_log_target(mut self, log_target: Arc<str>) -> Self {
        self.log_target = Some(log_target);
        self
    }

    pub fn with_metrics(mut self, metrics: &'a TaskMetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    pub fn read_size(&self) -> usize {
        self.read_size
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    /// Log target of the run this file belongs to.
    pub fn log_target(&self) -> &str {
        self.log_target.as_deref().unwrap_or(module_path!())
    }

    /// A tokenizer configured with this run's chunk size and log target.
    pub fn tokenizer(&self, fold_newlines: bool) -> Result<WordTokenizer> {
        let tokenizer = WordTokenizer::new(fold_newlines).with_read_size(self.read_size)?;
        Ok(match &self.log_target {
            Some(target) => tokenizer.with_log_target(target.clone()),
            None => tokenizer,
        })
    }

    /// Open `path` and start tokenizing it under this context's interrupt.
    pub fn open_tokens(&self, path: &Path, fold_newlines: bool) -> Result<TokenStream<File>> {
        let file = File::open(path)?;
        Ok(self
            .tokenizer(fold_newlines)?
            .stream_with_interrupt(file, self.interrupt.clone()))
    }

    /// Add a finished stream's volume to the run metrics.
    pub fn record_stream<R: Read>(&self, stream: &TokenStream<R>) {
        if let Some(metrics) = self.metrics {
            metrics.record_stream(stream.bytes_read(), stream.tokens_emitted());
        }
    }
}

impl Default for FileContext<'_> {
    fn default() -> Self {
        Self::new(0, DEFAULT_READ_SIZE)
    }
}
