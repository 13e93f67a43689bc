//! Statistics computed over a directory of text files.
//!
//! Each statistic is a [`FileTask`](crate::task::FileTask): it tokenizes one
//! file per `process_file` call and writes its output file from
//! `aggregate_results`. Files that failed are skipped during aggregation and
//! counted in the summary.

use std::path::PathBuf;

use crate::task::FileResult;

pub mod median;
pub mod word_count;

pub use median::{MedianRunner, RunningMedian};
pub use word_count::WordCounter;

/// Keep the successful outputs and count the failures. The runner has already
/// logged each failure under the run's target.
pub(crate) fn successful_outputs<T>(results: Vec<FileResult<T>>) -> (Vec<(PathBuf, T)>, usize) {
    let mut outputs = Vec::with_capacity(results.len());
    let mut skipped = 0;

    for FileResult { path, result, .. } in results {
        match result {
            Ok(output) => outputs.push((path, output)),
            Err(_) => skipped += 1,
        }
    }

    (outputs, skipped)
}
