//! Command implementations for the wordstat CLI.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::analysis::tokenizer::WordTokenizer;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::Result;
use crate::stats::median::{MedianRunner, MedianSummary};
use crate::stats::word_count::{WordCountSummary, WordCounter};
use crate::task::{TaskReport, TaskRunner};

/// File name of the word count table written by `all`.
pub const WORD_COUNT_FILE: &str = "wc_result.txt";

/// File name of the running medians written by `all`.
pub const MEDIAN_FILE: &str = "med_result.txt";

/// Reports of both statistics, as produced by `all`.
#[derive(Debug, Serialize)]
pub struct CombinedReport {
    pub word_count: TaskReport<WordCountSummary>,
    pub median: TaskReport<MedianSummary>,
}

/// Execute a CLI command.
pub fn execute_command(args: WordstatArgs) -> Result<()> {
    match &args.command {
        Command::Count(count_args) => count_words(count_args, &args),
        Command::Median(median_args) => running_median(median_args, &args),
        Command::All(all_args) => run_all(all_args, &args),
        Command::Tokenize(tokenize_args) => tokenize_file(tokenize_args, &args),
    }
}

/// Count word frequencies across a directory.
fn count_words(args: &StatArgs, cli_args: &WordstatArgs) -> Result<()> {
    let runner = TaskRunner::new(cli_args.task_config()?)?;
    let report = run_word_count(&runner, &args.input_dir, &args.output)?;

    output_report("Word count complete", &report, cli_args)
}

/// Running median of words per line across a directory.
fn running_median(args: &StatArgs, cli_args: &WordstatArgs) -> Result<()> {
    let runner = TaskRunner::new(cli_args.task_config()?)?;
    let report = run_median(&runner, &args.input_dir, &args.output)?;

    output_report("Running median complete", &report, cli_args)
}

/// Run both statistics with the same configuration.
fn run_all(args: &AllArgs, cli_args: &WordstatArgs) -> Result<()> {
    let runner = TaskRunner::new(cli_args.task_config()?)?;

    let word_count = run_word_count(
        &runner,
        &args.input_dir,
        &args.output_dir.join(WORD_COUNT_FILE),
    )?;
    let median = run_median(&runner, &args.input_dir, &args.output_dir.join(MEDIAN_FILE))?;

    match cli_args.output_format {
        OutputFormat::Human => {
            output_report("Word count complete", &word_count, cli_args)?;
            println!();
            output_report("Running median complete", &median, cli_args)
        }
        OutputFormat::Json => output_result(
            "Statistics complete",
            &CombinedReport { word_count, median },
            cli_args,
        ),
    }
}

/// Dump the tokens of a single file.
fn tokenize_file(args: &TokenizeArgs, cli_args: &WordstatArgs) -> Result<()> {
    let config = cli_args.task_config()?;
    let tokenizer = WordTokenizer::new(args.fold_newlines).with_read_size(config.read_size)?;

    let file = File::open(&args.file)?;
    let tokens = tokenizer
        .stream(file)
        .collect::<Result<Vec<_>>>()
        .map_err(|e| e.with_path(&args.file))?;

    log::info!("Tokenized {}: {} tokens", args.file.display(), tokens.len());
    output_tokens(&tokens, cli_args)
}

fn run_word_count(
    runner: &TaskRunner,
    input_dir: &Path,
    output: &Path,
) -> Result<TaskReport<WordCountSummary>> {
    log::info!(
        "Counting words in {} into {}",
        input_dir.display(),
        output.display()
    );
    runner.run_dir(&WordCounter::new(output), input_dir)
}

fn run_median(
    runner: &TaskRunner,
    input_dir: &Path,
    output: &Path,
) -> Result<TaskReport<MedianSummary>> {
    log::info!(
        "Computing running median of {} into {}",
        input_dir.display(),
        output.display()
    );
    runner.run_dir(&MedianRunner::new(output), input_dir)
}
