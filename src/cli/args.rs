//! Command line argument parsing for the wordstat CLI using clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::task::config::{FailurePolicy, TaskConfig};

/// wordstat - word statistics over a directory of text files
#[derive(Parser, Debug, Clone)]
#[command(name = "wordstat")]
#[command(about = "Word frequency and running median of words per line over text files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct WordstatArgs {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Task configuration file (JSON); command line options take precedence
    #[arg(short, long, value_name = "CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl WordstatArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n.saturating_add(1),
            }
        }
    }

    /// Build the task configuration from the config file, if any, and the
    /// command line overrides.
    pub fn task_config(&self) -> Result<TaskConfig> {
        let base = match &self.config {
            Some(path) => TaskConfig::from_json_file(path)?,
            None => TaskConfig::default(),
        };
        let config = self.run.apply(base);
        config.validate()?;
        Ok(config)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Count word frequencies across all files
    Count(StatArgs),

    /// Running median of the number of words per line
    Median(StatArgs),

    /// Run both statistics, writing wc_result.txt and med_result.txt
    All(AllArgs),

    /// Print the tokens of a single file
    Tokenize(TokenizeArgs),
}

/// Options shared by every command that runs the worker pool
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Number of worker threads
    #[arg(short = 'w', long, value_name = "N", global = true)]
    pub workers: Option<usize>,

    /// Tokenizer chunk size in bytes
    #[arg(long, value_name = "BYTES", global = true)]
    pub read_size: Option<usize>,

    /// Abort the run on the first file that fails
    #[arg(long, global = true)]
    pub fail_fast: bool,

    /// Per-file processing timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout_secs: Option<u64>,
}

impl RunArgs {
    /// Override `config` with the options given on the command line.
    pub fn apply(&self, mut config: TaskConfig) -> TaskConfig {
        if let Some(workers) = self.workers {
            config.num_workers = workers;
        }
        if let Some(read_size) = self.read_size {
            config.read_size = read_size;
        }
        if self.fail_fast {
            config.failure_policy = FailurePolicy::FailFast;
        }
        if let Some(secs) = self.timeout_secs {
            config.file_timeout = Some(Duration::from_secs(secs));
        }
        config
    }
}

/// Arguments for a single statistic
#[derive(Args, Debug, Clone)]
pub struct StatArgs {
    /// Directory containing the input files
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Result file to write
    #[arg(value_name = "OUTPUT_FILE")]
    pub output: PathBuf,
}

/// Arguments for running every statistic
#[derive(Args, Debug, Clone)]
pub struct AllArgs {
    /// Directory containing the input files
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Directory the result files are written to
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,
}

/// Arguments for dumping tokens
#[derive(Args, Debug, Clone)]
pub struct TokenizeArgs {
    /// File to tokenize
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Treat newlines as ordinary separators
    #[arg(long)]
    pub fold_newlines: bool,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_command() {
        let args = WordstatArgs::try_parse_from([
            "wordstat",
            "count",
            "wc_input",
            "wc_output/wc_result.txt",
            "--workers",
            "8",
            "--fail-fast",
        ])
        .unwrap();

        assert_eq!(args.run.workers, Some(8));
        assert!(args.run.fail_fast);
        if let Command::Count(count_args) = args.command {
            assert_eq!(count_args.input_dir, PathBuf::from("wc_input"));
            assert_eq!(count_args.output, PathBuf::from("wc_output/wc_result.txt"));
        } else {
            panic!("Expected Count command");
        }
    }

    #[test]
    fn test_tokenize_command() {
        let args =
            WordstatArgs::try_parse_from(["wordstat", "tokenize", "a.txt", "--fold-newlines"])
                .unwrap();

        if let Command::Tokenize(tokenize_args) = args.command {
            assert_eq!(tokenize_args.file, PathBuf::from("a.txt"));
            assert!(tokenize_args.fold_newlines);
        } else {
            panic!("Expected Tokenize command");
        }
    }

    #[test]
    fn test_run_args_override_config() {
        let run = RunArgs {
            workers: Some(2),
            read_size: None,
            fail_fast: true,
            timeout_secs: Some(10),
        };
        let config = run.apply(TaskConfig::default().with_read_size(512));

        assert_eq!(config.num_workers, 2);
        assert_eq!(config.read_size, 512);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.file_timeout, Some(Duration::from_secs(10)));

        assert_eq!(RunArgs::default().apply(TaskConfig::default()), TaskConfig::default());
    }

    #[test]
    fn test_global_options_before_command() {
        let args = WordstatArgs::try_parse_from([
            "wordstat",
            "--workers",
            "2",
            "--read-size",
            "64",
            "--timeout-secs",
            "5",
            "median",
            "in",
            "out.txt",
        ])
        .unwrap();

        let config = args.task_config().unwrap();
        assert_eq!(config.num_workers, 2);
        assert_eq!(config.read_size, 64);
        assert_eq!(config.file_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.failure_policy, FailurePolicy::BestEffort);
    }

    #[test]
    fn test_task_config_rejects_zero_workers() {
        let args =
            WordstatArgs::try_parse_from(["wordstat", "-w", "0", "count", "in", "out"]).unwrap();
        assert!(args.task_config().is_err());
    }

    #[test]
    fn test_task_config_rejects_huge_timeout() {
        let secs = u64::MAX.to_string();
        let args = WordstatArgs::try_parse_from([
            "wordstat",
            "--timeout-secs",
            secs.as_str(),
            "count",
            "in",
            "out",
        ])
        .unwrap();
        assert!(matches!(args.task_config(), Err(crate::error::WordstatError::Config(_))));
    }

    #[test]
    fn test_task_config_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"num_workers": 3, "failure_policy": "fail_fast"}"#).unwrap();

        let args = WordstatArgs::try_parse_from([
            "wordstat",
            "--config",
            path.to_str().unwrap(),
            "--workers",
            "6",
            "count",
            "in",
            "out",
        ])
        .unwrap();

        let config = args.task_config().unwrap();
        assert_eq!(config.num_workers, 6);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
    }

    #[test]
    fn test_verbosity_levels() {
        let args = WordstatArgs::try_parse_from(["wordstat", "all", "in", "out"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = WordstatArgs::try_parse_from(["wordstat", "-v", "all", "in", "out"]).unwrap();
        assert_eq!(args.verbosity(), 2);

        let args = WordstatArgs::try_parse_from(["wordstat", "-vv", "all", "in", "out"]).unwrap();
        assert_eq!(args.verbosity(), 3);

        let args =
            WordstatArgs::try_parse_from(["wordstat", "--quiet", "all", "in", "out"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            WordstatArgs::try_parse_from(["wordstat", "--format", "json", "all", "in", "out"])
                .unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }
}
