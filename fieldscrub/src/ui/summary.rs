// fieldscrub/src/ui/summary.rs
//! Renders a `RunSummary` as a short report with a per-rule table.

use std::io::{self, Write};

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;

use fieldscrub_core::RunSummary;

pub fn print_summary<W: Write + ?Sized>(
    summary: &RunSummary,
    writer: &mut W,
    supports_color: bool,
) -> io::Result<()> {
    let header = "--- Sanitization Summary ---";
    if supports_color {
        writeln!(writer, "\n{}", header.cyan().bold())?;
    } else {
        writeln!(writer, "\n{}", header)?;
    }

    writeln!(writer, "Source: {}", summary.source)?;
    writeln!(writer, "Delimiter: {}", summary.config.delimiter)?;
    writeln!(writer, "Lines processed: {}", summary.lines_processed)?;
    writeln!(writer, "Lines changed: {}", summary.lines_changed)?;
    writeln!(
        writer,
        "Fields changed: {} of {}",
        summary.fields_changed, summary.fields_processed
    )?;
    if summary.encoding_fallbacks > 0 {
        let line = format!("Encoding fallbacks: {}", summary.encoding_fallbacks);
        if supports_color {
            writeln!(writer, "{}", line.yellow())?;
        } else {
            writeln!(writer, "{}", line)?;
        }
    }

    if summary.rules.is_empty() {
        writeln!(writer, "No cleaning rules are enabled.")?;
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Rule", "Fields changed"]);
    for item in &summary.rules {
        table.add_row(vec![Cell::new(&item.rule_name), Cell::new(item.fields_changed)]);
    }
    writeln!(writer, "{table}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fieldscrub_core::{sanitize_stream, RecordSanitizer, SanitizerConfig, StreamOptions};

    fn summary_for(input: &str) -> RunSummary {
        let config = SanitizerConfig::default();
        let sanitizer = RecordSanitizer::new(&config).unwrap();
        let stats = sanitize_stream(&sanitizer, input.as_bytes(), io::sink(), &StreamOptions::default()).unwrap();
        RunSummary::new("test", &config, &stats, Utc::now())
    }

    #[test_log::test]
    fn summary_lists_counts_and_rules() {
        let summary = summary_for("Hello,\"World\",Data\u{1}\nA,,B\n");
        let mut out = Vec::new();
        print_summary(&summary, &mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Lines processed: 2"));
        assert!(text.contains("Lines changed: 1"));
        assert!(text.contains("Fields changed: 2 of 6"));
        assert!(text.contains("quote_chars"));
        assert!(text.contains("control_chars"));
        assert!(!text.contains("Encoding fallbacks"));
    }
}
