//! stream.rs - The line-by-line driver around `RecordSanitizer`.
//!
//! Reads records from any `BufRead`, cleans them, and writes them to any
//! `Write`. Every input line produces exactly one output line, in order.
//! Records end at `\n` only: a CR before it belongs to the last field and is
//! cleaned like any other CR. A final line without a terminator is written
//! without one.
//!
//! Output goes through `RecordWriter`, which only ever hands complete lines to
//! the sink: aborting a run can lose trailing records but never leaves half a
//! record behind.
//!
//! License: MIT OR APACHE 2.0

use std::borrow::Cow;
use std::io::{BufRead, Write};

use log::{debug, warn};

use crate::config::InvalidUtf8Policy;
use crate::engine::RecordSanitizer;
use crate::errors::FieldScrubError;
use crate::report::RunStats;

/// Bytes of complete records buffered before they are written to the sink.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct StreamOptions {
    pub invalid_utf8: InvalidUtf8Policy,
    pub flush_threshold: usize,
    /// Track per-rule change counts (slightly slower).
    pub count_rules: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            invalid_utf8: InvalidUtf8Policy::default(),
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            count_rules: true,
        }
    }
}

/// Buffers whole records and writes them to the sink only at line boundaries.
#[derive(Debug)]
pub struct RecordWriter<W: Write> {
    sink: W,
    buffer: Vec<u8>,
    threshold: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(sink: W, threshold: usize) -> Self {
        Self {
            sink,
            buffer: Vec::with_capacity(threshold.min(DEFAULT_FLUSH_THRESHOLD)),
            threshold,
        }
    }

    /// Queues one complete record, terminator included.
    pub fn write_record(&mut self, record: &[u8]) -> std::io::Result<()> {
        self.buffer.extend_from_slice(record);
        if self.buffer.len() >= self.threshold {
            self.flush_records()?;
        }
        Ok(())
    }

    fn flush_records(&mut self) -> std::io::Result<()> {
        if !self.buffer.is_empty() {
            self.sink.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Writes every queued record, flushes the sink and hands it back.
    pub fn finish(mut self) -> std::io::Result<W> {
        self.flush_records()?;
        self.sink.flush()?;
        Ok(self.sink)
    }
}

/// Decodes one line as UTF-8, applying `policy` to invalid sequences.
///
/// The flag is true when a fallback was needed.
pub fn decode_line(bytes: &[u8], policy: InvalidUtf8Policy) -> (Cow<'_, str>, bool) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (Cow::Borrowed(text), false),
        Err(_) => {
            let text = match policy {
                InvalidUtf8Policy::Replace => String::from_utf8_lossy(bytes),
                InvalidUtf8Policy::Drop => {
                    let mut kept = String::with_capacity(bytes.len());
                    for chunk in bytes.utf8_chunks() {
                        kept.push_str(chunk.valid());
                    }
                    Cow::Owned(kept)
                }
            };
            (text, true)
        }
    }
}

/// Splits a raw line into its content and terminator.
fn split_terminator(raw: &[u8]) -> (&[u8], &'static str) {
    match raw.strip_suffix(b"\n") {
        Some(content) => (content, "\n"),
        None => (raw, ""),
    }
}

/// Sanitizes every line of `reader` into `writer`.
///
/// Only I/O failures abort the run; undecodable bytes are handled per
/// `options.invalid_utf8` and counted in the returned stats.
pub fn sanitize_stream<R: BufRead, W: Write>(
    sanitizer: &RecordSanitizer,
    mut reader: R,
    writer: W,
    options: &StreamOptions,
) -> Result<RunStats, FieldScrubError> {
    let mut stats = RunStats::new(sanitizer.rules());
    let mut writer = RecordWriter::new(writer, options.flush_threshold);
    let mut raw = Vec::new();
    let mut line = String::new();

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        stats.lines_processed += 1;

        let (content, terminator) = split_terminator(&raw);
        let (text, fallback) = decode_line(content, options.invalid_utf8);
        if fallback {
            debug!("Line {}: invalid UTF-8 handled with {:?} policy", stats.lines_processed, options.invalid_utf8);
            stats.encoding_fallbacks += 1;
        }

        line.clear();
        let counters = options.count_rules.then_some(&mut stats.rule_counts);
        let (fields, changed) = sanitizer.sanitize_line_into(&text, &mut line, counters);
        stats.fields_processed += fields as u64;
        stats.fields_changed += changed as u64;
        if changed > 0 || fallback {
            stats.lines_changed += 1;
        }

        line.push_str(terminator);
        writer.write_record(line.as_bytes())?;
    }

    writer.finish()?;
    if stats.encoding_fallbacks > 0 {
        warn!(
            "{} line(s) contained invalid UTF-8 and were cleaned with the {:?} policy",
            stats.encoding_fallbacks, options.invalid_utf8
        );
    }
    debug!("Stream finished: {} lines, {} fields changed", stats.lines_processed, stats.fields_changed);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SanitizerConfig;
    use crate::delimiter::Delimiter;

    fn run(input: &[u8], config: &SanitizerConfig) -> (Vec<u8>, RunStats) {
        let sanitizer = RecordSanitizer::new(config).unwrap();
        let options = StreamOptions {
            invalid_utf8: config.invalid_utf8,
            ..Default::default()
        };
        let mut out = Vec::new();
        let stats = sanitize_stream(&sanitizer, input, &mut out, &options).unwrap();
        (out, stats)
    }

    #[test]
    fn preserves_line_count_and_terminators() {
        let (out, stats) = run(b"a , b\n\n\"x\",y\r\nlast", &SanitizerConfig::default());
        assert_eq!(out, b"a,b\n\nx,y\nlast");
        assert_eq!(stats.lines_processed, 4);
        assert_eq!(stats.lines_changed, 2);
    }

    #[test]
    fn carriage_returns_never_reach_the_output() {
        let config = SanitizerConfig::default();
        let (out, stats) = run(b"x,y\r\nlast, field \r\nend\r", &config);
        assert_eq!(out, b"x,y\nlast,field\nend");
        assert!(!out.contains(&b'\r'));
        assert_eq!(stats.lines_processed, 3);
        assert_eq!(stats.lines_changed, 3);

        // The driver and the line-level API agree on a CRLF record.
        let sanitizer = RecordSanitizer::new(&config).unwrap();
        assert_eq!(sanitizer.sanitize_line("x,y\r"), "x,y");
    }

    #[test]
    fn crlf_with_collapse_disabled_is_still_cleaned() {
        let mut config = SanitizerConfig::default();
        config.whitespace_collapse = false;
        let (out, _) = run(b"a,b\r\n", &config);
        assert_eq!(out, b"a,b\n");
    }

    #[test]
    fn empty_input_produces_empty_output() {
        let (out, stats) = run(b"", &SanitizerConfig::default());
        assert!(out.is_empty());
        assert_eq!(stats.lines_processed, 0);
    }

    #[test]
    fn lines_that_clean_to_nothing_are_kept() {
        let (out, _) = run(b"\x02\x03\n\"\"\n", &SanitizerConfig::default());
        assert_eq!(out, b"\n\n");
    }

    #[test]
    fn ctrl_a_stream() {
        let (out, stats) = run(
            b"A\x01B\x02C\x01D\n1\x01\x01 3 \n",
            &SanitizerConfig::for_delimiter(Delimiter::CTRL_A),
        );
        assert_eq!(out, b"A\x01B C\x01D\n1\x01\x013\n");
        assert_eq!(stats.fields_processed, 6);
        assert_eq!(stats.fields_changed, 2);
    }

    #[test]
    fn invalid_utf8_is_replaced_and_counted() {
        let (out, stats) = run(b"ok,\xff\xfebad\nfine\n", &SanitizerConfig::default());
        assert_eq!(String::from_utf8(out).unwrap(), "ok,\u{fffd}\u{fffd}bad\nfine\n");
        assert_eq!(stats.encoding_fallbacks, 1);
        assert_eq!(stats.lines_processed, 2);
    }

    #[test]
    fn invalid_utf8_can_be_dropped() {
        let mut config = SanitizerConfig::default();
        config.invalid_utf8 = InvalidUtf8Policy::Drop;
        let (out, stats) = run(b"ok,\xffbad\n", &config);
        assert_eq!(out, b"ok,bad\n");
        assert_eq!(stats.encoding_fallbacks, 1);
    }

    #[test]
    fn record_writer_only_emits_whole_records() {
        let mut sink = Vec::new();
        {
            let mut writer = RecordWriter::new(&mut sink, 8);
            writer.write_record(b"abc\n").unwrap();
            writer.write_record(b"defgh\n").unwrap();
            writer.write_record(b"ij\n").unwrap();
            // Dropped without finish: the last record was never handed over.
        }
        assert_eq!(sink, b"abc\ndefgh\n");
    }

    #[test]
    fn rule_counts_can_be_disabled() {
        let sanitizer = RecordSanitizer::new(&SanitizerConfig::default()).unwrap();
        let options = StreamOptions {
            count_rules: false,
            ..Default::default()
        };
        let mut out = Vec::new();
        let stats = sanitize_stream(&sanitizer, &b" a \n"[..], &mut out, &options).unwrap();
        assert_eq!(out, b"a\n");
        assert_eq!(stats.fields_changed, 1);
        assert!(stats.rule_counts.iter().all(|(_, n)| n == 0));
    }
}
