// fieldscrub-core/src/lib.rs
//! # fieldscrub Core Library
//!
//! `fieldscrub-core` cleans the free-text fields of delimited records (CSV,
//! Ctrl-A separated exports, TSV, ...) without ever altering record structure.
//! Control characters, stray quotes, backslashes and messy whitespace are
//! normalised field by field, while the delimiter between fields and the number
//! of fields on every line are left exactly as they were.
//!
//! The library is pure: it has no terminal concerns and no global state.
//!
//! ## Modules
//!
//! * `delimiter`: The `Delimiter` type and its textual forms (`,`, `ctrl-a`, `0x01`, ...).
//! * `config`: `SanitizerConfig`, YAML loading, built-in presets and CLI overrides.
//! * `sanitizers`: Compiles a config into a validated, ordered `CleaningRuleSet`.
//! * `engine`: `RecordSanitizer`, the per-record cleaning function.
//! * `stream`: The line-by-line driver from a reader to a writer.
//! * `parallel`: Chunked, order-preserving parallel processing of in-memory input.
//! * `report`: Run statistics and the serializable `RunSummary`.
//! * `headless`: One-shot sanitization of a string.
//! * `errors`: The `FieldScrubError` type.
//!
//! ## Usage Example
//!
//! ```rust
//! use fieldscrub_core::{Delimiter, RecordSanitizer, SanitizerConfig};
//!
//! fn main() -> Result<(), fieldscrub_core::FieldScrubError> {
//!     let config = SanitizerConfig::for_delimiter(Delimiter::CTRL_A);
//!     let sanitizer = RecordSanitizer::new(&config)?;
//!
//!     let cleaned = sanitizer.sanitize_line("A\u{1}B\u{2}C\u{1}D");
//!     assert_eq!(cleaned, "A\u{1}B C\u{1}D");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Invalid configuration is the only fatal condition and is reported as a
//! `FieldScrubError` when the rule set is compiled. Loading helpers return
//! `anyhow::Result` with context attached.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod config;
pub mod delimiter;
pub mod engine;
pub mod errors;
pub mod headless;
pub mod parallel;
pub mod report;
pub mod sanitizers;
pub mod stream;

/// Re-exports the configuration types.
pub use config::{
    preset_names,
    BackslashPolicy,
    ConfigOverrides,
    ControlCharPolicy,
    InvalidUtf8Policy,
    SanitizerConfig,
    DEFAULT_QUOTE_CHARS,
};

pub use delimiter::{Delimiter, CTRL_A};

pub use errors::FieldScrubError;

pub use engine::RecordSanitizer;

pub use sanitizers::compiler::{compile_rules, CleaningRuleSet, CompiledRule, RuleKind};

pub use stream::{decode_line, sanitize_stream, RecordWriter, StreamOptions};

pub use parallel::{sanitize_parallel, split_chunks};

pub use report::{RuleCounters, RuleSummaryItem, RunStats, RunSummary};

pub use headless::headless_sanitize_string;
