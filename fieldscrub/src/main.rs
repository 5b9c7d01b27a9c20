// fieldscrub/src/main.rs
//! fieldscrub entry point.
//!
//! Loads `.env`, parses arguments, initializes logging and dispatches to the
//! selected command. A failed command is reported as an `[ERROR]` line on
//! stderr with its full context chain, and the process exits with status 1.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use fieldscrub::cli::{Cli, Commands};
use fieldscrub::ui::output_format::{stderr_msg, MessageKind};
use fieldscrub::{commands, logger};

fn main() -> ExitCode {
    // `.env` must be loaded before parsing so `FIELDSCRUB_DELIMITER` reaches clap.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logger::init_logger(logger::level_for_flags(cli.quiet, cli.debug));
    log::debug!("fieldscrub {} starting", env!("CARGO_PKG_VERSION"));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            stderr_msg(MessageKind::Error, format!("{:#}", e), false);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sanitize(cmd) => commands::sanitize::run_sanitize(&cmd, cli.quiet),
        Commands::Scan(cmd) => commands::scan::run_scan(&cmd, cli.quiet),
        Commands::Presets => commands::presets::run_presets(),
    }
}
