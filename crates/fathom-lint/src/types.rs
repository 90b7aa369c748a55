use serde::{Deserialize, Serialize};

use fathom_core::types::Language;

/// Path sentinel used for results produced by `lint_content`.
pub const CONTENT_SENTINEL: &str = "<content>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// One finding from a linter, normalized across tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LintIssue {
    pub file: String,
    pub line: u32,
    pub column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
    pub rule: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rule_url: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub suggestion: String,
    pub can_auto_fix: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub replacement: String,
    pub linter: String,
}

/// Structured verdict for one lint invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintResult {
    /// True when no blocking errors remain after policy application.
    pub valid: bool,
    pub errors: Vec<LintIssue>,
    pub warnings: Vec<LintIssue>,
    pub infos: Vec<LintIssue>,
    pub duration_ms: u64,
    pub linter: String,
    pub language: Language,
    pub file_path: String,
    pub linter_available: bool,
}

impl LintResult {
    /// The result returned when the configured linter is not installed:
    /// valid, empty, and flagged unavailable.
    pub fn unavailable(linter: &str, language: Language, file_path: &str) -> Self {
        Self {
            valid: true,
            errors: vec![],
            warnings: vec![],
            infos: vec![],
            duration_ms: 0,
            linter: linter.to_string(),
            language,
            file_path: file_path.to_string(),
            linter_available: false,
        }
    }

    pub fn issue_count(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.infos.len()
    }
}
