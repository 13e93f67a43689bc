//! Output formatting for CLI commands.

use std::io::{self, Write};
use std::time::Duration;

use serde::Serialize;

use crate::analysis::token::Token;
use crate::cli::args::{OutputFormat, WordstatArgs};
use crate::error::Result;
use crate::task::TaskReport;

/// Output a run report in the selected format.
pub fn output_report<S: Serialize>(
    message: &str,
    report: &TaskReport<S>,
    args: &WordstatArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_report_human(message, report, args),
        OutputFormat::Json => output_json(report, args),
    }
}

/// Output any serializable result in the selected format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &WordstatArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{message}");
                println!();
            }
            output_generic_human(&serde_json::to_value(result)?)
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output tokens, one per line in human format or as a JSON array.
pub fn output_tokens(tokens: &[Token], args: &WordstatArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            let stdout = io::stdout();
            let mut out = io::BufWriter::new(stdout.lock());
            for token in tokens {
                writeln!(out, "{}", format_token(token))?;
            }
            out.flush()?;
            Ok(())
        }
        OutputFormat::Json => output_json(&tokens, args),
    }
}

fn output_report_human<S: Serialize>(
    message: &str,
    report: &TaskReport<S>,
    args: &WordstatArgs,
) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!("{}", "─".repeat(message.chars().count()));
    }

    println!("Run ID: {}", report.run_id);
    println!("Task: {}", report.task_name);
    println!(
        "Files: {} processed, {} failed, {} total",
        report.files_processed, report.files_failed, report.files_total
    );
    println!("Execution time: {}", format_duration(report.execution_time));

    if let Some(metrics) = &report.metrics {
        println!("Bytes read: {}", format_bytes(metrics.bytes_read));
        println!("Tokens: {}", metrics.tokens_emitted);
        let throughput = metrics.throughput_bytes_per_sec();
        if throughput > 0.0 {
            println!("Throughput: {}/s", format_bytes(throughput as u64));
        }
    }

    output_generic_human(&serde_json::to_value(&report.summary)?)?;

    if !report.failures.is_empty() {
        println!();
        println!("Failures:");
        for failure in &report.failures {
            println!("  {}: {}", failure.path.display(), failure.error);
        }
    }

    Ok(())
}

/// Output a JSON value as `key: value` lines.
fn output_generic_human(value: &serde_json::Value) -> Result<()> {
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let formatted_val = format_value(val);
                println!("{key}: {formatted_val}");
            }
        }
        _ => {
            let formatted_value = format_value(value);
            println!("{formatted_value}");
        }
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &WordstatArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a token with its text escaped so newlines stay on one line.
pub fn format_token(token: &Token) -> String {
    format!("<{}, {}>", token.token_type, token.text.escape_debug())
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "-".to_string(),
    }
}

/// Format a duration with a unit suited to its size.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs >= 1.0 {
        format!("{secs:.2}s")
    } else {
        format!("{:.2}ms", secs * 1000.0)
    }
}

/// Format a byte count in binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
