//! Word frequency across all files.
//!
//! Newlines are folded into ordinary separators since line structure does not
//! matter here. Words are lower-cased; punctuation is never counted.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use serde::Serialize;

use crate::error::Result;
use crate::stats::successful_outputs;
use crate::task::{FileContext, FileResult, FileTask};
use crate::util::atomic_file::write_atomically;

/// Counts words per file and merges the counts into one sorted table.
#[derive(Debug, Clone)]
pub struct WordCounter {
    output_path: PathBuf,
}

/// What [`WordCounter`] produced.
#[derive(Debug, Clone, Serialize)]
pub struct WordCountSummary {
    /// File the table was written to.
    pub output_path: PathBuf,

    /// Number of distinct words.
    pub distinct_words: usize,

    /// Number of word occurrences.
    pub total_words: u64,

    /// Inputs left out because they failed.
    pub files_skipped: usize,

    /// Alphabetical word counts.
    #[serde(skip)]
    pub counts: BTreeMap<String, u64>,
}

impl WordCounter {
    /// Create a counter writing its table to `output_path`.
    pub fn new<P: Into<PathBuf>>(output_path: P) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

impl FileTask for WordCounter {
    type Output = AHashMap<String, u64>;
    type Summary = WordCountSummary;

    fn name(&self) -> &str {
        "word_count"
    }

    fn process_file(&self, path: &Path, ctx: &FileContext<'_>) -> Result<Self::Output> {
        let mut stream = ctx.open_tokens(path, true)?;
        let mut counts = AHashMap::new();

        for token in stream.by_ref() {
            let token = token?;
            if token.is_word() {
                *counts.entry(token.text.to_ascii_lowercase()).or_insert(0) += 1;
            }
        }
        ctx.record_stream(&stream);

        Ok(counts)
    }

    fn aggregate_results(&self, results: Vec<FileResult<Self::Output>>) -> Result<Self::Summary> {
        let (outputs, files_skipped) = successful_outputs(results);

        let mut counts = BTreeMap::new();
        for (_, file_counts) in outputs {
            for (word, count) in file_counts {
                *counts.entry(word).or_insert(0) += count;
            }
        }

        write_atomically(&self.output_path, |w| write_word_counts(w, &counts))?;

        Ok(WordCountSummary {
            output_path: self.output_path.clone(),
            distinct_words: counts.len(),
            total_words: counts.values().sum(),
            files_skipped,
            counts,
        })
    }
}

/// Write one `word count` line per entry, the word left-aligned in 20 columns.
pub fn write_word_counts(w: &mut dyn Write, counts: &BTreeMap<String, u64>) -> Result<()> {
    for (word, count) in counts {
        writeln!(w, "{word:<20} {count}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_process_file_counts_lowercased_words() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.txt");
        fs::write(&path, "The cat sat.\nThe dog ran.").unwrap();

        let counter = WordCounter::new(dir.path().join("out.txt"));
        let counts = counter
            .process_file(&path, &FileContext::new(0, 3))
            .unwrap();

        assert_eq!(counts.len(), 5);
        assert_eq!(counts["the"], 2);
        assert_eq!(counts["ran"], 1);
    }

    #[test]
    fn test_aggregate_writes_sorted_table() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out").join("wc_result.txt");
        let counter = WordCounter::new(&output);

        let first: AHashMap<String, u64> = [("the".to_string(), 2), ("cat".to_string(), 1)]
            .into_iter()
            .collect();
        let second: AHashMap<String, u64> = [("the".to_string(), 1)].into_iter().collect();
        let results = vec![
            FileResult {
                path: PathBuf::from("a"),
                worker_id: 0,
                processing_time: Duration::ZERO,
                result: Ok(first),
            },
            FileResult {
                path: PathBuf::from("b"),
                worker_id: 1,
                processing_time: Duration::ZERO,
                result: Ok(second),
            },
        ];

        let summary = counter.aggregate_results(results).unwrap();
        assert_eq!(summary.distinct_words, 2);
        assert_eq!(summary.total_words, 4);
        assert_eq!(summary.files_skipped, 0);

        let content = fs::read_to_string(&output).unwrap();
        assert_eq!(
            content,
            format!("{:<20} 1\n{:<20} 3\n", "cat", "the")
        );
    }

    #[test]
    fn test_long_words_are_not_truncated() {
        let mut counts = BTreeMap::new();
        counts.insert("supercalifragilisticexpialidocious".to_string(), 7);

        let mut out = Vec::new();
        write_word_counts(&mut out, &counts).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "supercalifragilisticexpialidocious 7\n"
        );
    }
}
