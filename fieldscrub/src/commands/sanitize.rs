// fieldscrub/src/commands/sanitize.rs
//! `fieldscrub sanitize`: clean records from a file or stdin into a file or stdout.

use std::fs::{self, File};
use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::Utc;
use is_terminal::IsTerminal;
use log::info;

use fieldscrub_core::RunSummary;

use crate::cli::SanitizeCommand;
use crate::commands::{build_sanitizer, resolve_config, run_input, source_name};
use crate::ui::output_format::{stderr_msg, MessageKind};
use crate::ui::summary;

pub fn run_sanitize(cmd: &SanitizeCommand, quiet: bool) -> Result<()> {
    let started_at = Utc::now();
    let config = resolve_config(&cmd.input)?;
    let sanitizer = build_sanitizer(&config)?;
    info!("Starting sanitize run with delimiter {}", config.delimiter);

    let stats = match &cmd.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let stats = run_input(&sanitizer, &config, &cmd.input, file)?;
            stderr_msg(
                MessageKind::Info,
                format!("Wrote sanitized records to {}", path.display()),
                quiet || cmd.no_summary,
            );
            stats
        }
        None => run_input(&sanitizer, &config, &cmd.input, io::stdout().lock())?,
    };

    let summary = RunSummary::new(&source_name(cmd.input.input_file.as_deref()), &config, &stats, started_at);

    if let Some(path) = &cmd.summary_json {
        let json = summary.to_json().context("Failed to serialize run summary")?;
        fs::write(path, json).with_context(|| format!("Failed to write summary file: {}", path.display()))?;
        info!("Run summary written to {}", path.display());
    }

    if stats.encoding_fallbacks > 0 {
        stderr_msg(
            MessageKind::Warn,
            format!("{} line(s) contained invalid UTF-8", stats.encoding_fallbacks),
            quiet,
        );
    }

    if !quiet && !cmd.no_summary {
        let stderr = io::stderr();
        let supports_color = stderr.is_terminal();
        let mut handle = stderr.lock();
        summary::print_summary(&summary, &mut handle, supports_color)?;
        handle.flush()?;
    }
    Ok(())
}
