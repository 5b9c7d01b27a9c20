// fieldscrub/src/commands/mod.rs
//! Command implementations and the plumbing they share: config resolution and
//! running the core driver over a file or stdin.

pub mod presets;
pub mod sanitize;
pub mod scan;

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use fieldscrub_core::{
    sanitize_parallel, sanitize_stream, RecordSanitizer, RunStats, SanitizerConfig, StreamOptions,
};

use crate::cli::InputArgs;

/// Builds the effective configuration: preset or config file first, then the
/// individual flags (and `FIELDSCRUB_DELIMITER`) on top.
pub fn resolve_config(args: &InputArgs) -> Result<SanitizerConfig> {
    let base = if let Some(path) = &args.config {
        SanitizerConfig::load_from_file(path)?
    } else if let Some(name) = &args.preset {
        SanitizerConfig::load_preset(name).with_context(|| format!("Failed to load preset '{}'", name))?
    } else {
        SanitizerConfig::default()
    };
    Ok(args.overrides().apply(base))
}

/// Compiles `config`, reporting an invalid rule set as a configuration error.
pub fn build_sanitizer(config: &SanitizerConfig) -> Result<RecordSanitizer> {
    RecordSanitizer::new(config).context("Invalid sanitizer configuration")
}

/// Human-readable name of the input, used in summaries.
pub fn source_name(input: Option<&Path>) -> String {
    input.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string())
}

/// Runs the sanitizer over the input named by `args` and writes into `writer`.
///
/// With one job the input is streamed line by line. With more, it is read into
/// memory and processed in parallel chunks.
pub fn run_input<W: Write>(
    sanitizer: &RecordSanitizer,
    config: &SanitizerConfig,
    args: &InputArgs,
    writer: W,
) -> Result<RunStats> {
    let options = StreamOptions {
        invalid_utf8: config.invalid_utf8,
        ..Default::default()
    };
    let jobs = usize::from(args.jobs);

    let mut reader: Box<dyn Read> = match &args.input_file {
        Some(path) => {
            info!("Reading input from file: {}", path.display());
            Box::new(
                File::open(path).with_context(|| format!("Failed to open input file: {}", path.display()))?,
            )
        }
        None => {
            info!("Reading input from stdin");
            Box::new(io::stdin().lock())
        }
    };

    let stats = if jobs > 1 {
        let mut input = Vec::new();
        reader.read_to_end(&mut input).context("Failed to read input")?;
        debug!("Loaded {} bytes for parallel processing", input.len());
        sanitize_parallel(sanitizer, &input, writer, jobs, &options)?
    } else {
        sanitize_stream(sanitizer, BufReader::new(reader), writer, &options)?
    };

    info!(
        "Processed {} line(s), {} changed, {} encoding fallback(s)",
        stats.lines_processed, stats.lines_changed, stats.encoding_fallbacks
    );
    Ok(stats)
}
