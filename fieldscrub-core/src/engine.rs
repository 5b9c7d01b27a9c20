// fieldscrub-core/src/engine.rs
//! Defines `RecordSanitizer`, the pure per-record cleaning engine.
//!
//! A `RecordSanitizer` owns a shared, immutable `CleaningRuleSet`. It cleans
//! each field of an already-split record independently and never touches the
//! structure: the number of fields, their order, and the delimiter between
//! them are preserved exactly. Cloning a sanitizer is cheap, so worker threads
//! can each hold one.
//!
//! License: MIT OR APACHE 2.0

use std::borrow::Cow;
use std::sync::Arc;

use crate::config::SanitizerConfig;
use crate::delimiter::Delimiter;
use crate::errors::FieldScrubError;
use crate::report::RuleCounters;
use crate::sanitizers::compiler::{compile_rules, CleaningRuleSet};

#[derive(Debug, Clone)]
pub struct RecordSanitizer {
    rules: Arc<CleaningRuleSet>,
}

impl RecordSanitizer {
    /// Compiles `config` and builds a sanitizer, failing on any delimiter conflict.
    pub fn new(config: &SanitizerConfig) -> Result<Self, FieldScrubError> {
        Ok(Self::from_rules(Arc::new(compile_rules(config)?)))
    }

    pub fn from_rules(rules: Arc<CleaningRuleSet>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &CleaningRuleSet {
        &self.rules
    }

    pub fn delimiter(&self) -> Delimiter {
        self.rules.delimiter()
    }

    /// Cleans one field, running every rule in order.
    pub fn sanitize_field<'a>(&self, field: &'a str) -> Cow<'a, str> {
        self.clean(field, None)
    }

    fn clean<'a>(&self, field: &'a str, mut counters: Option<&mut RuleCounters>) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(field);
        for (index, rule) in self.rules.rules().iter().enumerate() {
            if let Some(changed) = rule.apply(&current) {
                current = Cow::Owned(changed);
                if let Some(counters) = counters.as_deref_mut() {
                    counters.hit(index);
                }
            }
        }
        current
    }

    /// Cleans every field of an already-split record. The output always has
    /// exactly as many fields as the input, in the same order.
    pub fn sanitize_record<S: AsRef<str>>(&self, record: &[S]) -> Vec<String> {
        record
            .iter()
            .map(|field| self.sanitize_field(field.as_ref()).into_owned())
            .collect()
    }

    /// Splits `line` on the delimiter, cleans each field and rejoins them.
    pub fn sanitize_line(&self, line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        self.sanitize_line_into(line, &mut out, None);
        out
    }

    /// Appends the cleaned form of `line` to `out`, returning how many fields
    /// it held and how many of them changed.
    pub fn sanitize_line_into(
        &self,
        line: &str,
        out: &mut String,
        mut counters: Option<&mut RuleCounters>,
    ) -> (usize, usize) {
        let delimiter = self.delimiter();
        let mut fields = 0;
        let mut changed = 0;
        for (index, field) in delimiter.split(line).enumerate() {
            if index > 0 {
                out.push(delimiter.as_char());
            }
            let cleaned = self.clean(field, counters.as_deref_mut());
            if matches!(cleaned, Cow::Owned(_)) {
                changed += 1;
            }
            out.push_str(&cleaned);
            fields += 1;
        }
        (fields, changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackslashPolicy, ControlCharPolicy};
    use crate::sanitizers::compiler::RuleKind;

    fn csv() -> RecordSanitizer {
        RecordSanitizer::new(&SanitizerConfig::default()).unwrap()
    }

    fn ctrl_a() -> RecordSanitizer {
        RecordSanitizer::new(&SanitizerConfig::for_delimiter(Delimiter::CTRL_A)).unwrap()
    }

    #[test]
    fn strips_quotes_and_trailing_control_byte() {
        assert_eq!(csv().sanitize_line("Hello,\"World\",Data\u{1}"), "Hello,World,Data");
    }

    #[test]
    fn ctrl_a_delimiter_survives_embedded_control() {
        assert_eq!(ctrl_a().sanitize_line("A\u{1}B\u{2}C\u{1}D"), "A\u{1}B C\u{1}D");
    }

    #[test]
    fn collapses_and_trims() {
        assert_eq!(csv().sanitize_field("  multiple   spaces  "), "multiple spaces");
        assert_eq!(csv().sanitize_field("a\t\tb\r"), "a b");
        assert_eq!(csv().sanitize_field("a \u{0} b"), "a b");
    }

    #[test]
    fn backslash_policies() {
        assert_eq!(csv().sanitize_field("C:\\data"), "C:/data");

        let mut config = SanitizerConfig::default();
        config.backslash_policy = BackslashPolicy::Delete;
        let sanitizer = RecordSanitizer::new(&config).unwrap();
        assert_eq!(sanitizer.sanitize_field("C:\\data"), "C:data");
    }

    #[test]
    fn control_delete_policy_removes_without_space() {
        let mut config = SanitizerConfig::default();
        config.control_char_policy = ControlCharPolicy::Delete;
        let sanitizer = RecordSanitizer::new(&config).unwrap();
        assert_eq!(sanitizer.sanitize_field("ab\u{7f}c"), "abc");
        // Tabs are still whitespace, not deleted.
        assert_eq!(sanitizer.sanitize_field("a\tb"), "a b");
    }

    #[test]
    fn empty_fields_are_preserved() {
        assert_eq!(csv().sanitize_line("A,,B"), "A,,B");
        assert_eq!(csv().sanitize_line(""), "");
        assert_eq!(csv().sanitize_line(",,"), ",,");
        assert_eq!(csv().sanitize_line(" \" , \u{3} "), ",");
    }

    #[test]
    fn record_keeps_field_count_and_order() {
        let record = ["  x ", "\"y\"", "", "z\\w"];
        assert_eq!(csv().sanitize_record(&record), vec!["x", "y", "", "z/w"]);
    }

    #[test]
    fn smart_quotes_are_removed() {
        assert_eq!(csv().sanitize_field("\u{201c}quoted\u{201d}"), "quoted");
    }

    #[test]
    fn unchanged_fields_stay_borrowed() {
        assert!(matches!(csv().sanitize_field("clean value"), Cow::Borrowed(_)));
    }

    #[test]
    fn counters_attribute_changes_to_rules() {
        let sanitizer = csv();
        let mut counters = RuleCounters::for_rules(sanitizer.rules());
        let mut out = String::new();
        let (fields, changed) = sanitizer.sanitize_line_into(" a ,\"b\",c", &mut out, Some(&mut counters));
        assert_eq!(out, "a,b,c");
        assert_eq!((fields, changed), (3, 2));
        assert_eq!(counters.get(RuleKind::TrimEdges), 1);
        assert_eq!(counters.get(RuleKind::QuoteChars), 1);
        assert_eq!(counters.get(RuleKind::ControlChars), 0);
    }

    #[test]
    fn sanitizing_twice_changes_nothing() {
        let sanitizer = csv();
        for line in ["Hello,\"World\",Data\u{1}", "  a \t b ,\\\\x,\u{201c} \u{201d}", "\u{7f}\r"] {
            let once = sanitizer.sanitize_line(line);
            assert_eq!(sanitizer.sanitize_line(&once), once);
        }
    }
}
