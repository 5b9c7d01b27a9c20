//! This file defines the command-line interface (CLI) for the fieldscrub application,
//! including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fieldscrub_core::{BackslashPolicy, ConfigOverrides, ControlCharPolicy, Delimiter, InvalidUtf8Policy};

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "fieldscrub",
    author = "Obscura Team (Relay)",
    version = env!("CARGO_PKG_VERSION"),
    about = "Clean delimited text files without ever touching the delimiter",
    long_about = "fieldscrub removes control characters, stray quotes and messy whitespace from the fields of CSV, Ctrl-A or other delimited files. The field delimiter, the number of fields on every line, and the number of lines are always preserved.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress the run summary and all log output.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, conflicts_with = "quiet", help = "Enable debug logging.")]
    pub debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `fieldscrub` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sanitizes an input file or stdin and writes the cleaned records.
    #[command(about = "Sanitizes an input file or stdin and writes the cleaned records.")]
    Sanitize(SanitizeCommand),

    /// Reports what sanitizing would change, without writing any output.
    #[command(about = "Reports how many fields each cleaning rule would change, without writing output.")]
    Scan(ScanCommand),

    /// Lists the built-in configuration presets.
    #[command(about = "Lists the built-in configuration presets.")]
    Presets,
}

/// Input and rule options shared by `sanitize` and `scan`.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Path to a sanitizer configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", conflicts_with = "preset", help = "Path to a sanitizer configuration file (YAML).")]
    pub config: Option<PathBuf>,

    /// Start from a built-in preset (see `fieldscrub presets`).
    #[arg(long = "preset", value_name = "NAME", help = "Start from a built-in preset such as 'csv' or 'ctrl-a'.")]
    pub preset: Option<String>,

    /// Field delimiter.
    #[arg(
        long = "delimiter",
        short = 'D',
        value_name = "DELIM",
        env = "FIELDSCRUB_DELIMITER",
        value_parser = parse_delimiter,
        help = "Field delimiter: a character, or a name such as 'tab', 'ctrl-a', '0x01'."
    )]
    pub delimiter: Option<Delimiter>,

    /// Control bytes that must never be stripped (comma-separated, decimal or 0x hex).
    #[arg(long = "control-exceptions", value_name = "BYTES", value_delimiter = ',', value_parser = parse_byte, help = "Control bytes never stripped, e.g. '0x01,9'.")]
    pub control_exceptions: Option<Vec<u8>>,

    /// What to do with control characters.
    #[arg(long = "control", value_name = "POLICY", help = "Replace control characters with a space, or delete them.")]
    pub control: Option<ControlChoice>,

    /// What to do with backslashes.
    #[arg(long = "backslash", value_name = "POLICY", help = "Replace backslashes with '/', or delete them.")]
    pub backslash: Option<BackslashChoice>,

    /// Characters removed from every field.
    #[arg(long = "quote-chars", value_name = "CHARS", help = "Characters removed from every field (empty string for none).")]
    pub quote_chars: Option<String>,

    /// Keep runs of whitespace as they are.
    #[arg(long = "no-collapse", help = "Do not collapse tabs, CRs and repeated spaces.")]
    pub no_collapse: bool,

    /// Keep leading and trailing spaces.
    #[arg(long = "no-trim", help = "Do not trim leading and trailing spaces from fields.")]
    pub no_trim: bool,

    /// What to do with bytes that are not valid UTF-8.
    #[arg(long = "invalid-utf8", value_name = "POLICY", help = "Replace invalid UTF-8 with U+FFFD, or drop it.")]
    pub invalid_utf8: Option<InvalidUtf8Choice>,

    /// Number of worker threads; above 1 the input is loaded into memory and processed in chunks.
    #[arg(long, short = 'j', value_name = "N", default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..), help = "Worker threads. Values above 1 read the whole input into memory.")]
    pub jobs: u16,
}

impl InputArgs {
    /// Collects the individual rule flags into overrides for the core config.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            delimiter: self.delimiter,
            control_char_exceptions: self.control_exceptions.clone(),
            control_char_policy: self.control.map(Into::into),
            quote_chars: self.quote_chars.as_ref().map(|s| s.chars().collect()),
            backslash_policy: self.backslash.map(Into::into),
            whitespace_collapse: self.no_collapse.then_some(false),
            trim_edges: self.no_trim.then_some(false),
            invalid_utf8: self.invalid_utf8.map(Into::into),
        }
    }
}

/// Arguments for the `sanitize` command.
#[derive(Parser, Debug)]
pub struct SanitizeCommand {
    #[command(flatten)]
    pub input: InputArgs,

    /// Write sanitized output to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write output to a specified file instead of stdout.")]
    pub output: Option<PathBuf>,

    /// Export the run summary to a JSON file.
    #[arg(long = "summary-json", value_name = "FILE", help = "Write the run summary as JSON to a file.")]
    pub summary_json: Option<PathBuf>,

    /// Suppress the run summary.
    #[arg(long = "no-summary", help = "Suppress the run summary on stderr.")]
    pub no_summary: bool,
}

/// Arguments for the `scan` command.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    #[command(flatten)]
    pub input: InputArgs,

    /// Exit with a non-zero code if more than this many fields would change.
    #[arg(long = "fail-over-threshold", value_name = "N", help = "Exit with a non-zero code if more than N fields would change.")]
    pub fail_over_threshold: Option<u64>,

    /// Print the scan summary as JSON to stdout.
    #[arg(long = "json-stdout", help = "Print the scan summary to stdout as JSON.")]
    pub json_stdout: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ControlChoice {
    /// Replace each control character with a space.
    Replace,
    /// Delete control characters.
    Delete,
}

impl From<ControlChoice> for ControlCharPolicy {
    fn from(choice: ControlChoice) -> Self {
        match choice {
            ControlChoice::Replace => ControlCharPolicy::Replace,
            ControlChoice::Delete => ControlCharPolicy::Delete,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum BackslashChoice {
    /// Replace each backslash with '/'.
    Replace,
    /// Delete backslashes.
    Delete,
}

impl From<BackslashChoice> for BackslashPolicy {
    fn from(choice: BackslashChoice) -> Self {
        match choice {
            BackslashChoice::Replace => BackslashPolicy::Replace,
            BackslashChoice::Delete => BackslashPolicy::Delete,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum InvalidUtf8Choice {
    /// Substitute U+FFFD for invalid sequences.
    Replace,
    /// Drop invalid bytes.
    Drop,
}

impl From<InvalidUtf8Choice> for InvalidUtf8Policy {
    fn from(choice: InvalidUtf8Choice) -> Self {
        match choice {
            InvalidUtf8Choice::Replace => InvalidUtf8Policy::Replace,
            InvalidUtf8Choice::Drop => InvalidUtf8Policy::Drop,
        }
    }
}

fn parse_delimiter(raw: &str) -> Result<Delimiter, String> {
    raw.parse::<Delimiter>().map_err(|e| e.to_string())
}

fn parse_byte(raw: &str) -> Result<u8, String> {
    let trimmed = raw.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => trimmed.parse::<u8>(),
    };
    parsed.map_err(|_| format!("'{}' is not a byte value (0-255 or 0x00-0xff)", raw))
}
