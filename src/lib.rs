//! # wordstat
//!
//! Word statistics over a directory of text files.
//!
//! ## Features
//!
//! - Streaming tokenizer with bounded memory, independent of chunk size
//! - Fixed pool of worker threads, each file processed exactly once
//! - Per-file failures reported instead of aborting the run
//! - Word frequency and running median of words per line
//! - Atomic output files

pub mod analysis;
pub mod cli;
pub mod error;
pub mod stats;
pub mod task;
pub mod util;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
