//! Error types for the wordstat library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`WordstatError`] enum. File-local failures (I/O, decoding, panics inside a
//! task) are carried per file through the task framework instead of aborting
//! the run, so most variants show up inside
//! [`FileResult`](crate::task::FileResult) values as well as at the top level.
//!
//! # Examples
//!
//! ```
//! use wordstat::error::{Result, WordstatError};
//!
//! fn check_workers(n: usize) -> Result<()> {
//!     if n == 0 {
//!         return Err(WordstatError::config("num_workers must be at least 1"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_workers(0).is_err());
//! ```

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The main error type for wordstat operations.
#[derive(Error, Debug)]
pub enum WordstatError {
    /// I/O errors (unreadable input, output write failures, ...)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed input stream
    #[error("Decode error{}: {message}", path_suffix(.path))]
    Decode {
        path: Option<PathBuf>,
        message: String,
    },

    /// A task failed while processing a single file
    #[error("Worker failure on {}: {message}", .path.display())]
    WorkerFailure { path: PathBuf, message: String },

    /// Invalid configuration, reported before any worker starts
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation cancelled
    #[error("Operation cancelled: {0}")]
    OperationCancelled(String),

    /// Operation exceeded its deadline
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Thread join errors
    #[error("Thread join error: {0}")]
    ThreadJoin(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" in {}", path.display()),
        None => String::new(),
    }
}

/// Result type alias for operations that may fail with WordstatError.
pub type Result<T> = std::result::Result<T, WordstatError>;

impl WordstatError {
    /// Create a new decode error without an associated path.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        WordstatError::Decode {
            path: None,
            message: msg.into(),
        }
    }

    /// Create a new worker failure for `path`.
    pub fn worker_failure<P: Into<PathBuf>, S: Into<String>>(path: P, msg: S) -> Self {
        WordstatError::WorkerFailure {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        WordstatError::Config(msg.into())
    }

    /// Create a new cancelled error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        WordstatError::OperationCancelled(msg.into())
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        WordstatError::Timeout(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        WordstatError::Other(msg.into())
    }

    /// Attach the file path to a decode error that does not carry one yet.
    ///
    /// Other variants are returned unchanged.
    pub fn with_path(self, path: &Path) -> Self {
        match self {
            WordstatError::Decode {
                path: None,
                message,
            } => WordstatError::Decode {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        }
    }

    /// Whether this error was caused by cancellation rather than by the input.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WordstatError::OperationCancelled(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = WordstatError::config("num_workers must be at least 1");
        assert_eq!(
            error.to_string(),
            "Configuration error: num_workers must be at least 1"
        );

        let error = WordstatError::worker_failure("/data/a.txt", "boom");
        assert_eq!(error.to_string(), "Worker failure on /data/a.txt: boom");

        let error = WordstatError::timeout("a.txt exceeded 1s");
        assert_eq!(error.to_string(), "Timeout: a.txt exceeded 1s");
    }

    #[test]
    fn test_decode_error_path() {
        let error = WordstatError::decode("invalid utf-8 sequence");
        assert_eq!(error.to_string(), "Decode error: invalid utf-8 sequence");

        let error = error.with_path(Path::new("in/b.txt"));
        assert_eq!(
            error.to_string(),
            "Decode error in in/b.txt: invalid utf-8 sequence"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = WordstatError::from(io_error);

        match error {
            WordstatError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_is_cancelled() {
        assert!(WordstatError::cancelled("stop").is_cancelled());
        assert!(!WordstatError::timeout("slow").is_cancelled());
    }
}
