//! Running median of words per line.
//!
//! Every file is reduced to its list of per-line word counts. Aggregation
//! concatenates the lists in file-name order and writes, for each line, the
//! median of all line counts seen so far.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::stats::successful_outputs;
use crate::task::{FileContext, FileResult, FileTask};
use crate::util::atomic_file::write_atomically;

/// Median of a growing multiset, kept sorted on insertion.
#[derive(Debug, Clone, Default)]
pub struct RunningMedian {
    sorted: Vec<u64>,
}

impl RunningMedian {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` and return the new median.
    pub fn insert(&mut self, value: u64) -> f64 {
        let idx = self.sorted.partition_point(|&v| v < value);
        self.sorted.insert(idx, value);
        self.median_of_nonempty()
    }

    /// Current median, `None` before the first insertion.
    pub fn median(&self) -> Option<f64> {
        (!self.sorted.is_empty()).then(|| self.median_of_nonempty())
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    fn median_of_nonempty(&self) -> f64 {
        let n = self.sorted.len();
        if n % 2 == 0 {
            (self.sorted[n / 2 - 1] + self.sorted[n / 2]) as f64 / 2.0
        } else {
            self.sorted[n / 2] as f64
        }
    }
}

/// Round to one decimal place, halves away from zero.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Computes the running median of words per line over all files.
#[derive(Debug, Clone)]
pub struct MedianRunner {
    output_path: PathBuf,
}

/// What [`MedianRunner`] produced.
#[derive(Debug, Clone, Serialize)]
pub struct MedianSummary {
    /// File the medians were written to.
    pub output_path: PathBuf,

    /// Number of lines across all files.
    pub lines: usize,

    /// Median after the last line.
    pub final_median: Option<f64>,

    /// Inputs left out because they failed.
    pub files_skipped: usize,

    /// One rounded median per line.
    #[serde(skip)]
    pub medians: Vec<f64>,
}

impl MedianRunner {
    /// Create a runner writing its medians to `output_path`.
    pub fn new<P: Into<PathBuf>>(output_path: P) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

impl FileTask for MedianRunner {
    /// Word count of every line of the file.
    type Output = Vec<u64>;
    type Summary = MedianSummary;

    fn name(&self) -> &str {
        "median"
    }

    fn process_file(&self, path: &Path, ctx: &FileContext<'_>) -> Result<Self::Output> {
        let mut stream = ctx.open_tokens(path, false)?;
        let mut line_counts = Vec::new();
        let mut words_in_line = 0;

        for token in stream.by_ref() {
            let token = token?;
            if token.is_word() {
                words_in_line += 1;
            } else if token.is_newline() {
                line_counts.push(words_in_line);
                words_in_line = 0;
            }
        }
        // Last line without a trailing newline.
        if words_in_line > 0 {
            line_counts.push(words_in_line);
        }
        ctx.record_stream(&stream);

        Ok(line_counts)
    }

    fn aggregate_results(&self, results: Vec<FileResult<Self::Output>>) -> Result<Self::Summary> {
        let (mut outputs, files_skipped) = successful_outputs(results);
        outputs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut running = RunningMedian::new();
        let medians: Vec<f64> = outputs
            .into_iter()
            .flat_map(|(_, counts)| counts)
            .map(|count| round_to_tenth(running.insert(count)))
            .collect();

        write_atomically(&self.output_path, |w| write_medians(w, &medians))?;

        Ok(MedianSummary {
            output_path: self.output_path.clone(),
            lines: running.len(),
            final_median: running.median().map(round_to_tenth),
            files_skipped,
            medians,
        })
    }
}

/// Write one median per line with a single decimal.
pub fn write_medians(w: &mut dyn Write, medians: &[f64]) -> Result<()> {
    for median in medians {
        writeln!(w, "{median:.1}")?;
    }
    Ok(())
}
