//! errors.rs - Custom error types for the fieldscrub-core library.
//!
//! Configuration problems are the only fatal class of error: they are raised
//! while a `CleaningRuleSet` is being compiled, before any data is touched.
//! Per-field data problems (stray quotes, odd bytes) are never errors.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `fieldscrub-core` library.
///
/// Marked `#[non_exhaustive]` so new variants can be added without breaking
/// downstream matches.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FieldScrubError {
    #[error("Invalid delimiter '{0}': {1}")]
    InvalidDelimiter(String, String),

    #[error("Rule '{rule}' conflicts with delimiter {delimiter}: {reason}")]
    DelimiterConflict {
        rule: String,
        delimiter: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to compile cleaning rule '{0}': {1}")]
    RuleCompilationError(String, regex::Error),

    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}

impl FieldScrubError {
    /// True for errors raised while validating or compiling configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            FieldScrubError::InvalidDelimiter(..)
                | FieldScrubError::DelimiterConflict { .. }
                | FieldScrubError::InvalidConfig(_)
                | FieldScrubError::RuleCompilationError(..)
                | FieldScrubError::UnknownPreset(_)
                | FieldScrubError::Fatal(_)
        )
    }
}
