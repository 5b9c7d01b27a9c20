//! report.rs - Counters and the end-of-run summary.
//!
//! `RuleCounters` is the per-worker tally of how many fields each rule changed.
//! `RunStats` accumulates line-level counts in the stream driver, and
//! `RunSummary` is the serializable record handed to the CLI at the end of a run.
//!
//! License: MIT OR APACHE 2.0

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::SanitizerConfig;
use crate::sanitizers::compiler::{CleaningRuleSet, RuleKind};

/// Number of fields changed by each rule, indexed in rule-set order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleCounters {
    counts: Vec<(RuleKind, usize)>,
}

impl RuleCounters {
    pub fn for_rules(rules: &CleaningRuleSet) -> Self {
        Self {
            counts: rules.rules().iter().map(|r| (r.kind, 0)).collect(),
        }
    }

    pub(crate) fn hit(&mut self, index: usize) {
        if let Some((_, count)) = self.counts.get_mut(index) {
            *count += 1;
        }
    }

    pub fn get(&self, kind: RuleKind) -> usize {
        self.counts
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleKind, usize)> + '_ {
        self.counts.iter().copied()
    }

    pub fn merge(&mut self, other: &RuleCounters) {
        for (kind, count) in other.iter() {
            match self.counts.iter_mut().find(|(k, _)| *k == kind) {
                Some((_, existing)) => *existing += count,
                None => self.counts.push((kind, count)),
            }
        }
    }
}

/// Line-level counters gathered by the stream driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub lines_processed: u64,
    pub fields_processed: u64,
    pub fields_changed: u64,
    pub lines_changed: u64,
    /// Lines on which invalid UTF-8 was replaced or dropped.
    pub encoding_fallbacks: u64,
    pub rule_counts: RuleCounters,
}

impl RunStats {
    pub fn new(rules: &CleaningRuleSet) -> Self {
        Self {
            rule_counts: RuleCounters::for_rules(rules),
            ..Default::default()
        }
    }

    pub fn merge(&mut self, other: &RunStats) {
        self.lines_processed += other.lines_processed;
        self.fields_processed += other.fields_processed;
        self.fields_changed += other.fields_changed;
        self.lines_changed += other.lines_changed;
        self.encoding_fallbacks += other.encoding_fallbacks;
        self.rule_counts.merge(&other.rule_counts);
    }
}

/// Changes attributed to one rule, as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummaryItem {
    pub rule_name: String,
    pub fields_changed: usize,
}

/// The serializable report of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config: SanitizerConfig,
    pub lines_processed: u64,
    pub lines_changed: u64,
    pub fields_processed: u64,
    pub fields_changed: u64,
    pub encoding_fallbacks: u64,
    pub rules: Vec<RuleSummaryItem>,
}

impl RunSummary {
    pub fn new(
        source: &str,
        config: &SanitizerConfig,
        stats: &RunStats,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            source: source.to_string(),
            started_at,
            finished_at: Utc::now(),
            config: config.clone(),
            lines_processed: stats.lines_processed,
            lines_changed: stats.lines_changed,
            fields_processed: stats.fields_processed,
            fields_changed: stats.fields_changed,
            encoding_fallbacks: stats.encoding_fallbacks,
            rules: stats
                .rule_counts
                .iter()
                .map(|(kind, count)| RuleSummaryItem {
                    rule_name: kind.name().to_string(),
                    fields_changed: count,
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
