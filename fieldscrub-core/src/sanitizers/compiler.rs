//! compiler.rs - Turns a `SanitizerConfig` into an immutable `CleaningRuleSet`.
//!
//! Compilation is where every delimiter-safety check happens. Each rule records
//! the set of characters it targets and the text it emits; a rule that targets
//! or emits the delimiter is rejected before any record is processed.
//!
//! License: MIT OR APACHE 2.0

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use log::debug;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::config::{BackslashPolicy, ControlCharPolicy, SanitizerConfig};
use crate::delimiter::Delimiter;
use crate::errors::FieldScrubError;

/// The cleaning steps, in the only order they are ever applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    ControlChars,
    QuoteChars,
    Backslash,
    WhitespaceCollapse,
    TrimEdges,
}

impl RuleKind {
    pub fn name(self) -> &'static str {
        match self {
            RuleKind::ControlChars => "control_chars",
            RuleKind::QuoteChars => "quote_chars",
            RuleKind::Backslash => "backslash",
            RuleKind::WhitespaceCollapse => "whitespace_collapse",
            RuleKind::TrimEdges => "trim_edges",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
enum Matcher {
    Pattern(Regex),
    /// Strips the target characters from both ends only.
    Edges,
}

/// A single compiled cleaning rule.
#[derive(Debug)]
pub struct CompiledRule {
    pub kind: RuleKind,
    /// Every character this rule may remove or rewrite.
    pub targets: BTreeSet<char>,
    /// The text substituted for each match.
    pub replace_with: String,
    matcher: Matcher,
}

impl CompiledRule {
    /// Applies the rule, returning `None` when the field is left unchanged.
    pub fn apply(&self, field: &str) -> Option<String> {
        match &self.matcher {
            Matcher::Pattern(regex) => match regex.replace_all(field, self.replace_with.as_str()) {
                Cow::Borrowed(_) => None,
                Cow::Owned(changed) => Some(changed),
            },
            Matcher::Edges => {
                let trimmed = field.trim_matches(|c| self.targets.contains(&c));
                (trimmed.len() != field.len()).then(|| trimmed.to_string())
            }
        }
    }
}

/// The ordered, validated rule pipeline for one delimiter.
#[derive(Debug)]
pub struct CleaningRuleSet {
    delimiter: Delimiter,
    rules: Vec<CompiledRule>,
}

impl CleaningRuleSet {
    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Characters guaranteed absent from every cleaned field.
    ///
    /// Trimming is excluded: it only guarantees absence at the field edges.
    pub fn forbidden_chars(&self) -> BTreeSet<char> {
        let mut forbidden: BTreeSet<char> = self
            .rules
            .iter()
            .filter(|rule| !matches!(rule.matcher, Matcher::Edges))
            .flat_map(|rule| rule.targets.iter().copied())
            .collect();
        // Whitespace collapsing targets the space itself but emits one back.
        for rule in &self.rules {
            for c in rule.replace_with.chars() {
                forbidden.remove(&c);
            }
        }
        forbidden
    }
}

/// Builds a regex character class matching exactly `chars`.
fn char_class(chars: &BTreeSet<char>) -> String {
    let body: String = chars
        .iter()
        .map(|c| format!("\\x{{{:x}}}", *c as u32))
        .collect();
    format!("[{}]", body)
}

fn build_regex(kind: RuleKind, pattern: &str) -> Result<Regex, FieldScrubError> {
    debug!("Compiling rule '{}' with pattern '{}'", kind, pattern.escape_debug());
    RegexBuilder::new(pattern)
        .size_limit(1 << 20)
        .build()
        .map_err(|e| FieldScrubError::RuleCompilationError(kind.name().to_string(), e))
}

fn class_rule(kind: RuleKind, targets: BTreeSet<char>, replace_with: &str) -> Result<Option<CompiledRule>, FieldScrubError> {
    if targets.is_empty() {
        debug!("Rule '{}' has no target characters; skipping.", kind);
        return Ok(None);
    }
    let regex = build_regex(kind, &char_class(&targets))?;
    Ok(Some(CompiledRule {
        kind,
        targets,
        replace_with: replace_with.to_string(),
        matcher: Matcher::Pattern(regex),
    }))
}

/// Control characters eligible for stripping under `config`.
///
/// Newline, the delimiter and every listed exception are left out of the class.
/// With whitespace collapsing enabled, tab and CR are left to that rule.
fn control_targets(config: &SanitizerConfig) -> BTreeSet<char> {
    (0u8..=0x1f)
        .chain(std::iter::once(0x7f))
        .map(char::from)
        .filter(|c| *c != '\n' && *c != config.delimiter.as_char())
        .filter(|c| !config.control_char_exceptions.contains(&(*c as u8)))
        .filter(|c| !(config.whitespace_collapse && matches!(c, '\t' | '\r')))
        .collect()
}

fn validate_config(config: &SanitizerConfig) -> Vec<FieldScrubError> {
    let mut errors = Vec::new();
    let delimiter = config.delimiter;

    if delimiter.is_control() {
        let listed = delimiter
            .as_byte()
            .is_some_and(|b| config.control_char_exceptions.contains(&b));
        if !listed {
            errors.push(FieldScrubError::DelimiterConflict {
                rule: RuleKind::ControlChars.name().to_string(),
                delimiter: delimiter.to_string(),
                reason: "the delimiter is a control byte and must be listed in control_char_exceptions".to_string(),
            });
        }
    }

    if config.quote_chars.contains(&'\n') {
        errors.push(FieldScrubError::InvalidConfig(
            "quote_chars cannot contain a newline".to_string(),
        ));
    }

    // Removing a character another rule emits would make a second pass change the output.
    if config.quote_chars.contains(&' ') {
        errors.push(FieldScrubError::InvalidConfig(
            "quote_chars cannot contain a space".to_string(),
        ));
    }
    if config.backslash_policy == BackslashPolicy::Replace && config.quote_chars.contains(&'/') {
        errors.push(FieldScrubError::InvalidConfig(
            "quote_chars cannot contain '/' while backslash_policy is 'replace'".to_string(),
        ));
    }

    errors
}

/// Checks a compiled rule against the delimiter: it may neither target nor emit it.
fn check_rule(rule: &CompiledRule, delimiter: Delimiter) -> Option<FieldScrubError> {
    let d = delimiter.as_char();
    let reason = if rule.targets.contains(&d) {
        "the rule would remove or rewrite the delimiter"
    } else if rule.replace_with.contains(d) {
        "the rule's replacement would introduce the delimiter"
    } else {
        return None;
    };
    Some(FieldScrubError::DelimiterConflict {
        rule: rule.kind.name().to_string(),
        delimiter: delimiter.to_string(),
        reason: reason.to_string(),
    })
}

/// Compiles `config` into a `CleaningRuleSet`, failing fast on any rule that
/// could corrupt record structure.
pub fn compile_rules(config: &SanitizerConfig) -> Result<CleaningRuleSet, FieldScrubError> {
    debug!("Compiling cleaning rules for delimiter {}", config.delimiter);
    let mut errors = validate_config(config);
    let mut rules = Vec::new();

    let control_replacement = match config.control_char_policy {
        ControlCharPolicy::Replace => " ",
        ControlCharPolicy::Delete => "",
    };
    let mut candidates = vec![class_rule(RuleKind::ControlChars, control_targets(config), control_replacement)];

    let quotes: BTreeSet<char> = config.quote_chars.iter().copied().collect();
    candidates.push(class_rule(RuleKind::QuoteChars, quotes, ""));

    let backslash_replacement = match config.backslash_policy {
        BackslashPolicy::Replace => "/",
        BackslashPolicy::Delete => "",
    };
    candidates.push(class_rule(RuleKind::Backslash, BTreeSet::from(['\\']), backslash_replacement));

    if config.whitespace_collapse {
        let breaks: BTreeSet<char> = ['\t', '\r']
            .into_iter()
            .filter(|c| *c != config.delimiter.as_char())
            .collect();
        let mut targets = breaks.clone();
        targets.insert(' ');
        let pattern = format!("{}{{2,}}|{}", char_class(&targets), char_class(&breaks));
        match build_regex(RuleKind::WhitespaceCollapse, &pattern) {
            Ok(regex) => candidates.push(Ok(Some(CompiledRule {
                kind: RuleKind::WhitespaceCollapse,
                targets,
                replace_with: " ".to_string(),
                matcher: Matcher::Pattern(regex),
            }))),
            Err(e) => candidates.push(Err(e)),
        }
    }

    if config.trim_edges {
        candidates.push(Ok(Some(CompiledRule {
            kind: RuleKind::TrimEdges,
            targets: BTreeSet::from([' ']),
            replace_with: String::new(),
            matcher: Matcher::Edges,
        })));
    }

    for candidate in candidates {
        match candidate {
            Ok(Some(rule)) => {
                if let Some(conflict) = check_rule(&rule, config.delimiter) {
                    errors.push(conflict);
                } else {
                    debug!("Rule '{}' compiled successfully.", rule.kind);
                    rules.push(rule);
                }
            }
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    match errors.len() {
        0 => {
            debug!("Finished compiling rules. Total compiled: {}.", rules.len());
            Ok(CleaningRuleSet {
                delimiter: config.delimiter,
                rules,
            })
        }
        1 => Err(errors.remove(0)),
        n => {
            let message = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<String>>()
                .join("\n");
            Err(FieldScrubError::Fatal(format!("Failed to compile {} rule(s):\n{}", n, message)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOverrides;

    fn kinds(set: &CleaningRuleSet) -> Vec<RuleKind> {
        set.rules().iter().map(|r| r.kind).collect()
    }

    #[test]
    fn default_rules_are_ordered() {
        let set = compile_rules(&SanitizerConfig::default()).unwrap();
        assert_eq!(
            kinds(&set),
            vec![
                RuleKind::ControlChars,
                RuleKind::QuoteChars,
                RuleKind::Backslash,
                RuleKind::WhitespaceCollapse,
                RuleKind::TrimEdges,
            ]
        );
    }

    #[test]
    fn control_class_excludes_delimiter_and_newline() {
        let set = compile_rules(&SanitizerConfig::for_delimiter(Delimiter::CTRL_A)).unwrap();
        let control = &set.rules()[0];
        assert_eq!(control.kind, RuleKind::ControlChars);
        assert!(!control.targets.contains(&'\u{1}'));
        assert!(!control.targets.contains(&'\n'));
        assert!(control.targets.contains(&'\u{2}'));
        assert!(control.targets.contains(&'\u{7f}'));
        assert!(!control.targets.contains(&'\t'));
    }

    #[test]
    fn tabs_are_control_targets_without_collapse() {
        let config = ConfigOverrides {
            whitespace_collapse: Some(false),
            ..Default::default()
        }
        .apply(SanitizerConfig::default());
        let set = compile_rules(&config).unwrap();
        assert!(set.rules()[0].targets.contains(&'\t'));
        assert!(set.forbidden_chars().contains(&'\t'));
    }

    #[test]
    fn control_delimiter_missing_from_exceptions_is_rejected() {
        let mut config = SanitizerConfig::default();
        config.delimiter = Delimiter::CTRL_A;
        let err = compile_rules(&config).unwrap_err();
        assert!(matches!(err, FieldScrubError::DelimiterConflict { ref rule, .. } if rule == "control_chars"));
        assert!(err.is_config_error());
    }

    #[test]
    fn delimiter_in_quote_chars_is_rejected() {
        let mut config = SanitizerConfig::for_delimiter(Delimiter::PIPE);
        config.quote_chars.push('|');
        let err = compile_rules(&config).unwrap_err();
        assert!(matches!(err, FieldScrubError::DelimiterConflict { ref rule, .. } if rule == "quote_chars"));
    }

    #[test]
    fn slash_delimiter_conflicts_with_backslash_replacement() {
        let config = SanitizerConfig::for_delimiter("/".parse().unwrap());
        let err = compile_rules(&config).unwrap_err();
        assert!(err.to_string().contains("introduce the delimiter"));

        let mut config = SanitizerConfig::for_delimiter("/".parse().unwrap());
        config.backslash_policy = BackslashPolicy::Delete;
        assert!(compile_rules(&config).is_ok());
    }

    #[test]
    fn backslash_delimiter_is_rejected() {
        let config = SanitizerConfig::for_delimiter("\\".parse().unwrap());
        assert!(compile_rules(&config).is_err());
    }

    #[test]
    fn space_delimiter_reports_every_conflict() {
        let config = SanitizerConfig::for_delimiter(" ".parse().unwrap());
        let err = compile_rules(&config).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, FieldScrubError::Fatal(_)));
        assert!(message.contains("control_chars"));
        assert!(message.contains("whitespace_collapse"));
        assert!(message.contains("trim_edges"));
    }

    fn with_quotes(quotes: &[char]) -> SanitizerConfig {
        let mut config = SanitizerConfig::default();
        config.quote_chars = quotes.to_vec();
        config
    }

    #[test]
    fn newline_quote_char_is_rejected() {
        let err = compile_rules(&with_quotes(&['"', '\n'])).unwrap_err();
        assert!(matches!(err, FieldScrubError::InvalidConfig(ref m) if m.contains("newline")));
        assert!(err.is_config_error());
    }

    #[test]
    fn space_quote_char_is_rejected() {
        // Tabs and CRs collapse to a space, so removing spaces would keep changing output.
        let err = compile_rules(&with_quotes(&[' '])).unwrap_err();
        assert!(matches!(err, FieldScrubError::InvalidConfig(ref m) if m.contains("space")));
    }

    #[test]
    fn slash_quote_char_needs_backslash_deletion() {
        let err = compile_rules(&with_quotes(&['/'])).unwrap_err();
        assert!(matches!(err, FieldScrubError::InvalidConfig(ref m) if m.contains("'/'")));

        let mut config = with_quotes(&['/']);
        config.backslash_policy = BackslashPolicy::Delete;
        let set = compile_rules(&config).unwrap();
        assert!(set.forbidden_chars().contains(&'/'));
    }

    #[test]
    fn quote_char_errors_are_aggregated() {
        let err = compile_rules(&with_quotes(&[' ', '/'])).unwrap_err();
        let FieldScrubError::Fatal(message) = &err else {
            panic!("expected an aggregated error, got {:?}", err);
        };
        assert!(message.contains("Failed to compile 2 rule(s)"));
        assert!(message.contains("quote_chars cannot contain a space"));
        assert!(message.contains("quote_chars cannot contain '/'"));
    }

    #[test]
    fn tab_delimiter_keeps_tab_out_of_whitespace_class() {
        let set = compile_rules(&SanitizerConfig::for_delimiter(Delimiter::TAB)).unwrap();
        let ws = set
            .rules()
            .iter()
            .find(|r| r.kind == RuleKind::WhitespaceCollapse)
            .unwrap();
        assert!(!ws.targets.contains(&'\t'));
        assert!(ws.targets.contains(&'\r'));
    }

    #[test]
    fn empty_quote_set_skips_rule() {
        let mut config = SanitizerConfig::default();
        config.quote_chars.clear();
        let set = compile_rules(&config).unwrap();
        assert!(!kinds(&set).contains(&RuleKind::QuoteChars));
    }

    #[test]
    fn forbidden_chars_cover_controls_and_quotes() {
        let set = compile_rules(&SanitizerConfig::default()).unwrap();
        let forbidden = set.forbidden_chars();
        assert!(forbidden.contains(&'"'));
        assert!(forbidden.contains(&'\\'));
        assert!(forbidden.contains(&'\u{0}'));
        assert!(forbidden.contains(&'\t'));
        assert!(!forbidden.contains(&' '));
        assert!(!forbidden.contains(&','));
    }
}
