//! Metrics collection for parallel task runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Snapshot of the metrics collected during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMetrics {
    /// Files whose processing succeeded.
    pub files_processed: u64,

    /// Files whose processing failed.
    pub files_failed: u64,

    /// Bytes read by tokenizers.
    pub bytes_read: u64,

    /// Tokens produced by tokenizers.
    pub tokens_emitted: u64,

    /// Sum of per-file processing times.
    pub total_processing_time: Duration,

    /// Average processing time per file.
    pub avg_processing_time: Duration,

    /// Slowest file.
    pub max_processing_time: Duration,

    /// Fastest file.
    pub min_processing_time: Duration,
}

impl Default for TaskMetrics {
    fn default() -> Self {
        Self {
            files_processed: 0,
            files_failed: 0,
            bytes_read: 0,
            tokens_emitted: 0,
            total_processing_time: Duration::ZERO,
            avg_processing_time: Duration::ZERO,
            max_processing_time: Duration::ZERO,
            min_processing_time: Duration::ZERO,
        }
    }
}

impl TaskMetrics {
    /// Bytes read per second of accumulated processing time.
    pub fn throughput_bytes_per_sec(&self) -> f64 {
        let secs = self.total_processing_time.as_secs_f64();
        if secs > 0.0 {
            self.bytes_read as f64 / secs
        } else {
            0.0
        }
    }
}

/// Thread-safe collector shared by all workers of a run.
#[derive(Debug)]
pub struct TaskMetricsCollector {
    files_processed: AtomicU64,
    files_failed: AtomicU64,
    bytes_read: AtomicU64,
    tokens_emitted: AtomicU64,
    total_processing_nanos: AtomicU64,
    max_processing_nanos: AtomicU64,
    min_processing_nanos: AtomicU64,
}

impl TaskMetricsCollector {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            files_processed: AtomicU64::new(0),
            files_failed: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
            tokens_emitted: AtomicU64::new(0),
            total_processing_nanos: AtomicU64::new(0),
            max_processing_nanos: AtomicU64::new(0),
            min_processing_nanos: AtomicU64::new(u64::MAX),
        }
    }

    /// Record the outcome of one file.
    pub fn record_file(&self, processing_time: Duration, success: bool) {
        if success {
            self.files_processed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.files_failed.fetch_add(1, Ordering::Relaxed);
        }

        let nanos = u64::try_from(processing_time.as_nanos()).unwrap_or(u64::MAX);
        self.total_processing_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.max_processing_nanos.fetch_max(nanos, Ordering::Relaxed);
        self.min_processing_nanos.fetch_min(nanos, Ordering::Relaxed);
    }

    /// Record tokenizer input volume.
    pub fn record_stream(&self, bytes_read: u64, tokens_emitted: u64) {
        self.bytes_read.fetch_add(bytes_read, Ordering::Relaxed);
        self.tokens_emitted.fetch_add(tokens_emitted, Ordering::Relaxed);
    }

    /// Get the current metrics snapshot.
    pub fn snapshot(&self) -> TaskMetrics {
        let files_processed = self.files_processed.load(Ordering::Relaxed);
        let files_failed = self.files_failed.load(Ordering::Relaxed);
        let files = files_processed + files_failed;
        let total_nanos = self.total_processing_nanos.load(Ordering::Relaxed);

        let avg_nanos = if files > 0 { total_nanos / files } else { 0 };

        let min_nanos = self.min_processing_nanos.load(Ordering::Relaxed);
        let min_duration = if min_nanos == u64::MAX {
            Duration::ZERO
        } else {
            Duration::from_nanos(min_nanos)
        };

        TaskMetrics {
            files_processed,
            files_failed,
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            tokens_emitted: self.tokens_emitted.load(Ordering::Relaxed),
            total_processing_time: Duration::from_nanos(total_nanos),
            avg_processing_time: Duration::from_nanos(avg_nanos),
            max_processing_time: Duration::from_nanos(
                self.max_processing_nanos.load(Ordering::Relaxed),
            ),
            min_processing_time: min_duration,
        }
    }
}

impl Default for TaskMetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper for timing operations.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed time.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return elapsed time.
    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let collector = TaskMetricsCollector::new();

        collector.record_file(Duration::from_millis(10), true);
        collector.record_file(Duration::from_millis(30), true);
        collector.record_file(Duration::from_millis(20), false);
        collector.record_stream(1024, 100);
        collector.record_stream(1024, 28);

        let metrics = collector.snapshot();
        assert_eq!(metrics.files_processed, 2);
        assert_eq!(metrics.files_failed, 1);
        assert_eq!(metrics.bytes_read, 2048);
        assert_eq!(metrics.tokens_emitted, 128);
        assert_eq!(metrics.total_processing_time, Duration::from_millis(60));
        assert_eq!(metrics.avg_processing_time, Duration::from_millis(20));
        assert_eq!(metrics.max_processing_time, Duration::from_millis(30));
        assert_eq!(metrics.min_processing_time, Duration::from_millis(10));
        assert!(metrics.throughput_bytes_per_sec() > 0.0);
    }

    #[test]
    fn test_empty_snapshot() {
        let metrics = TaskMetricsCollector::new().snapshot();
        assert_eq!(metrics, TaskMetrics::default());
        assert_eq!(metrics.throughput_bytes_per_sec(), 0.0);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(1));
        assert!(timer.elapsed() >= Duration::from_millis(1));
        assert!(timer.stop() >= Duration::from_millis(1));
    }
}
