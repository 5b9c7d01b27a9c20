//! Rule compilation for the record sanitizer.
//!
//! `compiler` turns a `SanitizerConfig` into the ordered `CleaningRuleSet`
//! that `RecordSanitizer` applies to every field. All delimiter-safety checks
//! live there, so a rule set that exists is a rule set that is safe to run.

pub mod compiler;
