//! Rule-pattern policy: which findings block, which warn, which vanish.
//!
//! Patterns match a rule by exact name, by hierarchy (`a` matches `a/b`),
//! or by digit-suffix prefix (`SA` matches `SA1000`). Classification is
//! first-match in the order ignore, block, warn; unmatched rules default
//! to warning severity.

use fathom_core::config::PolicyRules;

use crate::types::{LintIssue, Severity};

#[derive(Debug, Clone, Default)]
pub struct LintPolicy {
    block_on: Vec<String>,
    warn_on: Vec<String>,
    ignore: Vec<String>,
}

/// Outcome of classifying one rule name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    Ignore,
    Block,
    Warn,
    Default,
}

impl LintPolicy {
    pub fn new(block_on: Vec<String>, warn_on: Vec<String>, ignore: Vec<String>) -> Self {
        Self {
            block_on,
            warn_on,
            ignore,
        }
    }

    pub fn from_rules(rules: &PolicyRules) -> Self {
        Self::new(
            rules.block_on.clone(),
            rules.warn_on.clone(),
            rules.ignore.clone(),
        )
    }

    pub fn should_ignore(&self, rule: &str) -> bool {
        self.classify(rule) == Classification::Ignore
    }

    pub fn should_block(&self, rule: &str) -> bool {
        self.classify(rule) == Classification::Block
    }

    pub fn should_warn(&self, rule: &str) -> bool {
        self.classify(rule) == Classification::Warn
    }

    fn classify(&self, rule: &str) -> Classification {
        if self.ignore.iter().any(|p| pattern_matches(rule, p)) {
            return Classification::Ignore;
        }
        if self.block_on.iter().any(|p| pattern_matches(rule, p)) {
            return Classification::Block;
        }
        if self.warn_on.iter().any(|p| pattern_matches(rule, p)) {
            return Classification::Warn;
        }
        Classification::Default
    }

    /// Apply the policy to raw linter issues, bucketing by final severity.
    /// Ignored issues are not emitted at all; unmatched rules default to
    /// warning regardless of the severity the linter reported.
    pub fn apply(&self, issues: Vec<LintIssue>) -> (Vec<LintIssue>, Vec<LintIssue>, Vec<LintIssue>) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let infos = Vec::new();
        for mut issue in issues {
            match self.classify(&issue.rule) {
                Classification::Ignore => continue,
                Classification::Block => {
                    issue.severity = Severity::Error;
                    errors.push(issue);
                }
                Classification::Warn | Classification::Default => {
                    issue.severity = Severity::Warning;
                    warnings.push(issue);
                }
            }
        }
        (errors, warnings, infos)
    }
}

/// Exact, hierarchy (`a/b` matches `a`), or digit-suffix (`SA1000`
/// matches `SA`).
fn pattern_matches(rule: &str, pattern: &str) -> bool {
    if pattern.is_empty() || rule.is_empty() {
        return false;
    }
    if rule == pattern {
        return true;
    }
    if let Some(rest) = rule.strip_prefix(pattern) {
        if rest.starts_with('/') {
            return true;
        }
        if rest.bytes().all(|b| b.is_ascii_digit()) {
            return true;
        }
    }
    false
}
