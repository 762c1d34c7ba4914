//! Output formatting for evaluation results.

use serde::Serialize;
use usage_grammar_core::ParsedArgs;

use crate::{Error, Evaluation};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

/// Formats parsed arguments in the requested output format.
pub fn format_args(args: &ParsedArgs, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(args).map_err(|e| format!("JSON serialization failed: {e}"))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(args).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Table => Ok(args_to_table(args)),
    }
}

/// Formats an evaluation: parsed arguments per `format`, help and version
/// text verbatim.
pub fn format_evaluation(evaluation: &Evaluation, format: OutputFormat) -> Result<String, String> {
    match evaluation {
        Evaluation::Args(args) => format_args(args, format),
        Evaluation::Help(text) | Evaluation::Version(text) => Ok(text.clone()),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum BatchEntry<'a> {
    Args(&'a ParsedArgs),
    Help(&'a str),
    Version(&'a str),
    Error { kind: &'static str, message: String },
}

/// Formats batch results as a JSON array, one object per input in order.
///
/// Each object has a single key: `args`, `help`, `version` or `error`.
pub fn format_batch(results: &[Result<Evaluation, Error>]) -> Result<String, String> {
    let entries = results
        .iter()
        .map(|result| match result {
            Ok(Evaluation::Args(args)) => BatchEntry::Args(args),
            Ok(Evaluation::Help(text)) => BatchEntry::Help(text),
            Ok(Evaluation::Version(version)) => BatchEntry::Version(version),
            Err(err) => BatchEntry::Error {
                kind: match err {
                    Error::Grammar(_) => "grammar",
                    Error::Usage(_) => "usage",
                },
                message: err.to_string(),
            },
        })
        .collect::<Vec<_>>();
    serde_json::to_string_pretty(&entries).map_err(|e| format!("JSON serialization failed: {e}"))
}

fn args_to_table(args: &ParsedArgs) -> String {
    let width = args.iter().map(|(name, _)| name.len()).max().unwrap_or(4);
    let mut out = String::new();
    for (name, value) in args.iter() {
        out.push_str(&format!("{name:<width$}  {value}\n"));
    }
    out
}
