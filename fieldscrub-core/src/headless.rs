// File: fieldscrub-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for one-shot sanitization of in-memory text, for
//! callers that do not want to manage readers, writers or a compiled sanitizer.

use anyhow::{Context, Result};

use crate::config::SanitizerConfig;
use crate::engine::RecordSanitizer;
use crate::stream::{sanitize_stream, StreamOptions};

/// Sanitizes every line of `content` under `config` and returns the result.
///
/// Fails only when `config` itself is invalid.
pub fn headless_sanitize_string(config: &SanitizerConfig, content: &str) -> Result<String> {
    let sanitizer = RecordSanitizer::new(config).context("Invalid sanitizer configuration")?;
    let options = StreamOptions {
        invalid_utf8: config.invalid_utf8,
        count_rules: false,
        ..Default::default()
    };

    let mut out = Vec::with_capacity(content.len());
    sanitize_stream(&sanitizer, content.as_bytes(), &mut out, &options)?;
    String::from_utf8(out).context("Sanitized output was not valid UTF-8")
}
