//! delimiter.rs - The field separator a record is split on and rejoined with.
//!
//! A `Delimiter` wraps a single `char`. It can be parsed from the textual forms
//! people actually type on a command line or in YAML (`,`, `tab`, `ctrl-a`,
//! `\x01`, `0x01`, ...). Newline is rejected: it terminates records.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::FieldScrubError;

/// The Ctrl-A (SOH, byte value 1) field separator used by Hive-style exports.
pub const CTRL_A: char = '\u{1}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Delimiter(char);

impl Delimiter {
    pub const COMMA: Delimiter = Delimiter(',');
    pub const CTRL_A: Delimiter = Delimiter(CTRL_A);
    pub const TAB: Delimiter = Delimiter('\t');
    pub const PIPE: Delimiter = Delimiter('|');

    pub fn new(c: char) -> Result<Self, FieldScrubError> {
        if c == '\n' {
            return Err(FieldScrubError::InvalidDelimiter(
                "\\n".to_string(),
                "newline is the record terminator".to_string(),
            ));
        }
        Ok(Self(c))
    }

    pub fn as_char(self) -> char {
        self.0
    }

    /// True when the delimiter falls in the non-printing range (0x00-0x1F, 0x7F).
    pub fn is_control(self) -> bool {
        is_control_char(self.0)
    }

    /// The byte value, when the delimiter is a single-byte (ASCII) character.
    pub fn as_byte(self) -> Option<u8> {
        u8::try_from(u32::from(self.0)).ok().filter(u8::is_ascii)
    }

    /// Splits one line into its fields. Always yields at least one field.
    pub fn split<'a>(self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        line.split(self.0)
    }

    pub fn count_in(self, line: &str) -> usize {
        line.chars().filter(|&c| c == self.0).count()
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Delimiter::COMMA
    }
}

/// Control characters as far as field cleaning is concerned.
pub fn is_control_char(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{1f}' | '\u{7f}')
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            '\t' => write!(f, "\\t"),
            c if is_control_char(c) => write!(f, "\\x{:02x}", c as u32),
            c => write!(f, "'{}'", c),
        }
    }
}

impl FromStr for Delimiter {
    type Err = FieldScrubError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| FieldScrubError::InvalidDelimiter(raw.to_string(), reason.to_string());

        let named = match raw.to_ascii_lowercase().as_str() {
            "comma" => Some(','),
            "tab" | "\\t" => Some('\t'),
            "pipe" => Some('|'),
            "semicolon" => Some(';'),
            "ctrl-a" | "ctrla" | "soh" | "^a" => Some(CTRL_A),
            _ => None,
        };
        if let Some(c) = named {
            return Delimiter::new(c);
        }

        let hex = raw
            .strip_prefix("\\x")
            .or_else(|| raw.strip_prefix("0x"))
            .or_else(|| raw.strip_prefix("0X"))
            .or_else(|| raw.strip_prefix("\\u{").and_then(|s| s.strip_suffix('}')));
        if let Some(digits) = hex {
            let value = u32::from_str_radix(digits, 16).map_err(|_| invalid("not a hexadecimal code point"))?;
            let c = char::from_u32(value).ok_or_else(|| invalid("not a valid character"))?;
            return Delimiter::new(c);
        }

        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Delimiter::new(c),
            (None, _) => Err(invalid("delimiter cannot be empty")),
            _ => Err(invalid("expected a single character or a known name")),
        }
    }
}

impl Serialize for Delimiter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            c if is_control_char(c) => serializer.serialize_str(&format!("0x{:02x}", c as u32)),
            c => serializer.serialize_str(&c.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Delimiter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
