//! Configuration for parallel task runs.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::DEFAULT_READ_SIZE;
use crate::error::{Result, WordstatError};

/// Default size of the worker pool.
pub const DEFAULT_NUM_WORKERS: usize = 4;

/// What the runner does when a single file fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep going and hand the failure to aggregation.
    #[default]
    BestEffort,

    /// Stop taking new files and fail the run without aggregating.
    FailFast,
}

/// Configuration for a [`TaskRunner`](crate::task::engine::TaskRunner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Number of worker threads.
    pub num_workers: usize,

    /// Chunk size used by the tokenizer, in bytes.
    pub read_size: usize,

    /// Behaviour on per-file failure.
    pub failure_policy: FailurePolicy,

    /// Upper bound on the time spent in one file.
    /// Checked between chunk reads, so a file may overrun by one read.
    pub file_timeout: Option<Duration>,

    /// Whether to attach metrics to the run report.
    pub enable_metrics: bool,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_NUM_WORKERS,
            read_size: DEFAULT_READ_SIZE,
            failure_policy: FailurePolicy::BestEffort,
            file_timeout: None,
            enable_metrics: true,
        }
    }
}

impl TaskConfig {
    /// Load a configuration from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content).map_err(|e| match e {
            WordstatError::Json(e) => {
                WordstatError::config(format!("{}: {e}", path.display()))
            }
            other => other,
        })
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: TaskConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every option, reporting the first invalid one.
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(WordstatError::config("num_workers must be at least 1"));
        }
        if self.read_size == 0 {
            return Err(WordstatError::config("read_size must be at least 1"));
        }
        if let Some(timeout) = self.file_timeout {
            if timeout.is_zero() {
                return Err(WordstatError::config("file_timeout must be positive"));
            }
            if Instant::now().checked_add(timeout).is_none() {
                return Err(WordstatError::config(format!(
                    "file_timeout of {}s is too large",
                    timeout.as_secs()
                )));
            }
        }
        Ok(())
    }

    /// Set the worker count.
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Set the tokenizer chunk size.
    pub fn with_read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size;
        self
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Set the per-file timeout.
    pub fn with_file_timeout(mut self, timeout: Duration) -> Self {
        self.file_timeout = Some(timeout);
        self
    }

    /// Set whether metrics are reported.
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TaskConfig::default();
        assert_eq!(config.num_workers, 4);
        assert_eq!(config.read_size, 4096);
        assert_eq!(config.failure_policy, FailurePolicy::BestEffort);
        assert_eq!(config.file_timeout, None);
        assert!(config.enable_metrics);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = TaskConfig::default()
            .with_num_workers(8)
            .with_read_size(16)
            .with_failure_policy(FailurePolicy::FailFast)
            .with_file_timeout(Duration::from_secs(2))
            .with_metrics(false);

        assert_eq!(config.num_workers, 8);
        assert_eq!(config.read_size, 16);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.file_timeout, Some(Duration::from_secs(2)));
        assert!(!config.enable_metrics);
    }

    #[test]
    fn test_invalid_config() {
        let config = TaskConfig::default().with_num_workers(0);
        assert!(matches!(config.validate(), Err(WordstatError::Config(_))));

        let config = TaskConfig::default().with_read_size(0);
        assert!(matches!(config.validate(), Err(WordstatError::Config(_))));

        let config = TaskConfig::default().with_file_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(WordstatError::Config(_))));
    }

    #[test]
    fn test_huge_timeout_rejected() {
        let config = TaskConfig::default().with_file_timeout(Duration::from_secs(u64::MAX));
        assert!(matches!(config.validate(), Err(WordstatError::Config(_))));

        let json = format!(r#"{{"file_timeout": {{"secs": {}, "nanos": 0}}}}"#, u64::MAX);
        assert!(matches!(TaskConfig::from_json_str(&json), Err(WordstatError::Config(_))));

        let config = TaskConfig::default().with_file_timeout(Duration::from_secs(3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config =
            TaskConfig::from_json_str(r#"{"num_workers": 2, "failure_policy": "fail_fast"}"#)
                .unwrap();
        assert_eq!(config.num_workers, 2);
        assert_eq!(config.read_size, DEFAULT_READ_SIZE);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);

        assert!(matches!(
            TaskConfig::from_json_str(r#"{"num_workers": 0}"#),
            Err(WordstatError::Config(_))
        ));
        assert!(matches!(
            TaskConfig::from_json_str("not json"),
            Err(WordstatError::Json(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("wordstat.json");
        fs::write(&path, r#"{"read_size": 64, "file_timeout": {"secs": 5, "nanos": 0}}"#).unwrap();

        let config = TaskConfig::from_json_file(&path).unwrap();
        assert_eq!(config.read_size, 64);
        assert_eq!(config.file_timeout, Some(Duration::from_secs(5)));

        fs::write(&path, "{").unwrap();
        assert!(matches!(
            TaskConfig::from_json_file(&path),
            Err(WordstatError::Config(_))
        ));
    }
}
