// fieldscrub/src/commands/presets.rs
//! `fieldscrub presets`: list the configurations bundled with the library.

use std::io::{self, Write};

use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

use fieldscrub_core::{preset_names, SanitizerConfig};

pub fn run_presets() -> Result<()> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Preset", "Delimiter", "Description"]);
    for (name, description) in preset_names()? {
        let config = SanitizerConfig::load_preset(&name)?;
        table.add_row(vec![name, config.delimiter.to_string(), description]);
    }

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{table}")?;
    Ok(())
}
