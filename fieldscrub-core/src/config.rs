//! Configuration management for `fieldscrub-core`.
//!
//! This module defines `SanitizerConfig`, the user-facing description of how
//! fields are cleaned, along with YAML loading, the embedded preset catalogue
//! and `ConfigOverrides` for layering CLI flags on top of a file or preset.
//!
//! A `SanitizerConfig` is inert data. It only becomes usable once compiled into
//! a `CleaningRuleSet` (see `sanitizers::compiler`), which is where the
//! delimiter-safety checks run.
//!
//! License: MIT OR Apache-2.0

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::delimiter::Delimiter;
use crate::errors::FieldScrubError;

/// Quote characters removed by default: ASCII double quote and the curly pair.
pub const DEFAULT_QUOTE_CHARS: [char; 3] = ['"', '\u{201c}', '\u{201d}'];

/// What happens to a backslash found inside a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackslashPolicy {
    /// Remove the backslash entirely.
    Delete,
    /// Replace with `/`, so adjacent tokens never fuse together.
    #[default]
    #[serde(alias = "replace-with-slash")]
    Replace,
}

/// What happens to a non-printing control character found inside a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlCharPolicy {
    /// Replace with a single space (later collapsed and trimmed).
    #[default]
    Replace,
    Delete,
}

/// How byte sequences that are not valid UTF-8 are handled by the stream driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidUtf8Policy {
    /// Substitute each invalid sequence with U+FFFD.
    #[default]
    Replace,
    /// Drop the offending bytes.
    Drop,
}

/// The complete set of options controlling field cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Character used to split and rejoin fields.
    pub delimiter: Delimiter,
    /// Byte values never stripped by the control-character rule. Must contain
    /// the delimiter whenever the delimiter is itself a control byte.
    pub control_char_exceptions: BTreeSet<u8>,
    pub control_char_policy: ControlCharPolicy,
    /// Characters removed outright from every field.
    pub quote_chars: Vec<char>,
    pub backslash_policy: BackslashPolicy,
    pub whitespace_collapse: bool,
    pub trim_edges: bool,
    pub invalid_utf8: InvalidUtf8Policy,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::default(),
            control_char_exceptions: BTreeSet::new(),
            control_char_policy: ControlCharPolicy::default(),
            quote_chars: DEFAULT_QUOTE_CHARS.to_vec(),
            backslash_policy: BackslashPolicy::default(),
            whitespace_collapse: true,
            trim_edges: true,
            invalid_utf8: InvalidUtf8Policy::default(),
        }
    }
}

impl SanitizerConfig {
    /// Default configuration for the given delimiter. A control-byte delimiter is
    /// added to `control_char_exceptions` so the result compiles as-is.
    pub fn for_delimiter(delimiter: Delimiter) -> Self {
        let mut config = Self::default();
        config.set_delimiter(delimiter);
        config
    }

    /// Switches the delimiter, registering it as a control exception when needed.
    pub fn set_delimiter(&mut self, delimiter: Delimiter) {
        self.delimiter = delimiter;
        if let Some(byte) = delimiter.as_byte().filter(|_| delimiter.is_control()) {
            self.control_char_exceptions.insert(byte);
        }
    }

    /// Loads a configuration from a YAML file. Missing keys take their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading sanitizer configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SanitizerConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        debug!("Loaded configuration with delimiter {}", config.delimiter);
        Ok(config)
    }

    /// Returns a built-in preset by name (`csv`, `ctrl-a`, `tsv`, `pipe`).
    pub fn load_preset(name: &str) -> Result<Self, FieldScrubError> {
        let key = name.to_ascii_lowercase();
        PRESETS
            .as_ref()
            .map_err(|e| FieldScrubError::Fatal(format!("Embedded presets are malformed: {}", e)))?
            .get(key.as_str())
            .map(|preset| preset.config.clone())
            .ok_or_else(|| FieldScrubError::UnknownPreset(name.to_string()))
    }
}

/// A named, documented configuration shipped with the library.
#[derive(Debug, Clone, Deserialize)]
pub struct Preset {
    pub description: String,
    #[serde(flatten)]
    pub config: SanitizerConfig,
}

#[derive(Debug, Deserialize)]
struct PresetFile {
    presets: BTreeMap<String, Preset>,
}

static PRESETS: Lazy<Result<BTreeMap<String, Preset>, String>> = Lazy::new(|| {
    let raw = include_str!("../config/presets.yaml");
    serde_yml::from_str::<PresetFile>(raw)
        .map(|file| file.presets)
        .map_err(|e| e.to_string())
});

/// Lists `(name, description)` for every built-in preset, sorted by name.
pub fn preset_names() -> Result<Vec<(String, String)>, FieldScrubError> {
    let presets = PRESETS
        .as_ref()
        .map_err(|e| FieldScrubError::Fatal(format!("Embedded presets are malformed: {}", e)))?;
    Ok(presets
        .iter()
        .map(|(name, preset)| (name.clone(), preset.description.clone()))
        .collect())
}

/// Individual settings supplied on top of a base configuration, typically from
/// the command line. `None` leaves the base value untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub delimiter: Option<Delimiter>,
    pub control_char_exceptions: Option<Vec<u8>>,
    pub control_char_policy: Option<ControlCharPolicy>,
    pub quote_chars: Option<Vec<char>>,
    pub backslash_policy: Option<BackslashPolicy>,
    pub whitespace_collapse: Option<bool>,
    pub trim_edges: Option<bool>,
    pub invalid_utf8: Option<InvalidUtf8Policy>,
}

impl ConfigOverrides {
    pub fn apply(self, mut config: SanitizerConfig) -> SanitizerConfig {
        if let Some(exceptions) = self.control_char_exceptions {
            debug!("Overriding control character exceptions: {:?}", exceptions);
            config.control_char_exceptions = exceptions.into_iter().collect();
        }
        if let Some(delimiter) = self.delimiter {
            debug!("Overriding delimiter with {}", delimiter);
            config.set_delimiter(delimiter);
        }
        if let Some(policy) = self.control_char_policy {
            config.control_char_policy = policy;
        }
        if let Some(quotes) = self.quote_chars {
            config.quote_chars = quotes;
        }
        if let Some(policy) = self.backslash_policy {
            config.backslash_policy = policy;
        }
        if let Some(collapse) = self.whitespace_collapse {
            config.whitespace_collapse = collapse;
        }
        if let Some(trim) = self.trim_edges {
            config.trim_edges = trim;
        }
        if let Some(policy) = self.invalid_utf8 {
            config.invalid_utf8 = policy;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SanitizerConfig::default();
        assert_eq!(config.delimiter, Delimiter::COMMA);
        assert!(config.control_char_exceptions.is_empty());
        assert_eq!(config.quote_chars, vec!['"', '“', '”']);
        assert_eq!(config.backslash_policy, BackslashPolicy::Replace);
        assert!(config.whitespace_collapse);
        assert!(config.trim_edges);
    }

    #[test]
    fn for_delimiter_registers_control_exception() {
        let config = SanitizerConfig::for_delimiter(Delimiter::CTRL_A);
        assert!(config.control_char_exceptions.contains(&1));

        let config = SanitizerConfig::for_delimiter(Delimiter::PIPE);
        assert!(config.control_char_exceptions.is_empty());
    }

    #[test]
    fn all_presets_load() {
        for (name, _) in preset_names().unwrap() {
            let config = SanitizerConfig::load_preset(&name).unwrap();
            if config.delimiter.is_control() {
                let byte = config.delimiter.as_byte().unwrap();
                assert!(config.control_char_exceptions.contains(&byte), "preset {name}");
            }
        }
        assert_eq!(SanitizerConfig::load_preset("CTRL-A").unwrap().delimiter, Delimiter::CTRL_A);
        assert!(matches!(
            SanitizerConfig::load_preset("nope"),
            Err(FieldScrubError::UnknownPreset(_))
        ));
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let overrides = ConfigOverrides {
            delimiter: Some(Delimiter::CTRL_A),
            trim_edges: Some(false),
            ..Default::default()
        };
        let config = overrides.apply(SanitizerConfig::default());
        assert_eq!(config.delimiter, Delimiter::CTRL_A);
        assert!(config.control_char_exceptions.contains(&1));
        assert!(!config.trim_edges);
        assert!(config.whitespace_collapse);
    }
}
