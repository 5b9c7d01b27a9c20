// fieldscrub/src/commands/scan.rs
//! `fieldscrub scan`: run the rules without writing output and report what
//! would change, optionally failing when too many fields are dirty.

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::Utc;
use is_terminal::IsTerminal;
use log::info;
use thiserror::Error;

use fieldscrub_core::RunSummary;

use crate::cli::ScanCommand;
use crate::commands::{build_sanitizer, resolve_config, run_input, source_name};
use crate::ui::output_format::{stderr_msg, MessageKind};
use crate::ui::summary;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{changed} field(s) would change, above the threshold of {threshold}")]
    ThresholdExceeded { changed: u64, threshold: u64 },
}

pub fn run_scan(cmd: &ScanCommand, quiet: bool) -> Result<()> {
    let started_at = Utc::now();
    let config = resolve_config(&cmd.input)?;
    let sanitizer = build_sanitizer(&config)?;
    info!("Starting scan with delimiter {}", config.delimiter);

    let stats = run_input(&sanitizer, &config, &cmd.input, io::sink())?;
    let summary = RunSummary::new(&source_name(cmd.input.input_file.as_deref()), &config, &stats, started_at);

    if cmd.json_stdout {
        let json = summary.to_json().context("Failed to serialize scan summary")?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", json)?;
        stdout.flush()?;
    } else if !quiet {
        let stderr = io::stderr();
        let supports_color = stderr.is_terminal();
        summary::print_summary(&summary, &mut stderr.lock(), supports_color)?;
    }

    check_threshold(stats.fields_changed, cmd.fail_over_threshold)?;
    if cmd.fail_over_threshold.is_some() {
        stderr_msg(MessageKind::Success, "Scan is within the threshold", quiet);
    }
    Ok(())
}

fn check_threshold(changed: u64, threshold: Option<u64>) -> Result<(), ScanError> {
    match threshold {
        Some(threshold) if changed > threshold => Err(ScanError::ThresholdExceeded { changed, threshold }),
        _ => Ok(()),
    }
}
