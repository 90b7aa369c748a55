//! Per-linter stdout parsers.
//!
//! Each parser deserializes the linter's documented JSON shape
//! byte-for-byte and normalizes into [`LintIssue`]s. Anything that does
//! not deserialize is a [`LintError::ParseOutput`].

use serde::Deserialize;

use fathom_core::error::LintError;

use crate::types::{LintIssue, Severity};

/// Dispatch on the linter name.
pub fn parse_linter_output(linter: &str, stdout: &str) -> Result<Vec<LintIssue>, LintError> {
    match linter {
        "golangci-lint" => parse_golangci(stdout),
        "ruff" => parse_ruff(stdout),
        "eslint" => parse_eslint(stdout),
        other => Err(LintError::ParseOutput {
            linter: other.to_string(),
            message: "no output parser registered".to_string(),
        }),
    }
}

// --- golangci-lint ---------------------------------------------------------

#[derive(Deserialize)]
struct GolangciReport {
    #[serde(rename = "Issues", default)]
    issues: Vec<GolangciIssue>,
}

#[derive(Deserialize)]
struct GolangciIssue {
    #[serde(rename = "FromLinter")]
    from_linter: String,
    #[serde(rename = "Text")]
    text: String,
    #[serde(rename = "Severity", default)]
    severity: String,
    #[serde(rename = "Pos")]
    pos: GolangciPos,
    #[serde(rename = "LineRange", default)]
    line_range: Option<GolangciLineRange>,
    #[serde(rename = "Replacement", default)]
    replacement: Option<GolangciReplacement>,
}

#[derive(Deserialize)]
struct GolangciPos {
    #[serde(rename = "Filename")]
    filename: String,
    #[serde(rename = "Line")]
    line: u32,
    #[serde(rename = "Column", default)]
    column: u32,
}

#[derive(Deserialize)]
struct GolangciLineRange {
    #[serde(rename = "From")]
    _from: u32,
    #[serde(rename = "To")]
    to: u32,
}

#[derive(Deserialize)]
struct GolangciReplacement {
    #[serde(rename = "NewLines", default)]
    new_lines: Vec<String>,
}

fn parse_golangci(stdout: &str) -> Result<Vec<LintIssue>, LintError> {
    let report: GolangciReport =
        serde_json::from_str(stdout).map_err(|e| LintError::ParseOutput {
            linter: "golangci-lint".to_string(),
            message: e.to_string(),
        })?;
    Ok(report
        .issues
        .into_iter()
        .map(|issue| {
            let severity = match issue.severity.as_str() {
                "error" => Severity::Error,
                "info" => Severity::Info,
                _ => Severity::Warning,
            };
            let replacement = issue
                .replacement
                .as_ref()
                .map(|r| r.new_lines.join("\n"))
                .unwrap_or_default();
            LintIssue {
                file: issue.pos.filename,
                line: issue.pos.line,
                column: issue.pos.column,
                end_line: issue.line_range.as_ref().map(|r| r.to),
                end_column: None,
                rule: issue.from_linter,
                rule_url: String::new(),
                severity,
                message: issue.text,
                suggestion: String::new(),
                can_auto_fix: !replacement.is_empty(),
                replacement,
                linter: "golangci-lint".to_string(),
            }
        })
        .collect())
}

// --- ruff ------------------------------------------------------------------

#[derive(Deserialize)]
struct RuffIssue {
    #[serde(default)]
    code: Option<String>,
    filename: String,
    message: String,
    location: RuffLocation,
    #[serde(default)]
    end_location: Option<RuffLocation>,
    #[serde(default)]
    fix: Option<RuffFix>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize)]
struct RuffLocation {
    row: u32,
    column: u32,
}

#[derive(Deserialize)]
struct RuffFix {
    #[serde(default)]
    applicability: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn parse_ruff(stdout: &str) -> Result<Vec<LintIssue>, LintError> {
    let issues: Vec<RuffIssue> =
        serde_json::from_str(stdout).map_err(|e| LintError::ParseOutput {
            linter: "ruff".to_string(),
            message: e.to_string(),
        })?;
    Ok(issues
        .into_iter()
        .map(|issue| {
            let can_auto_fix = issue
                .fix
                .as_ref()
                .is_some_and(|f| f.applicability.as_deref() != Some("unsafe"));
            LintIssue {
                file: issue.filename,
                line: issue.location.row,
                column: issue.location.column,
                end_line: issue.end_location.as_ref().map(|l| l.row),
                end_column: issue.end_location.as_ref().map(|l| l.column),
                rule: issue.code.unwrap_or_default(),
                rule_url: issue.url.unwrap_or_default(),
                severity: Severity::Warning,
                message: issue.message,
                suggestion: issue
                    .fix
                    .as_ref()
                    .and_then(|f| f.message.clone())
                    .unwrap_or_default(),
                can_auto_fix,
                replacement: String::new(),
                linter: "ruff".to_string(),
            }
        })
        .collect())
}

// --- eslint ----------------------------------------------------------------

#[derive(Deserialize)]
struct EslintFile {
    #[serde(rename = "filePath")]
    file_path: String,
    #[serde(default)]
    messages: Vec<EslintMessage>,
}

#[derive(Deserialize)]
struct EslintMessage {
    #[serde(rename = "ruleId", default)]
    rule_id: Option<String>,
    severity: u8,
    message: String,
    #[serde(default)]
    line: u32,
    #[serde(default)]
    column: u32,
    #[serde(rename = "endLine", default)]
    end_line: Option<u32>,
    #[serde(rename = "endColumn", default)]
    end_column: Option<u32>,
    #[serde(default)]
    fix: Option<EslintFix>,
}

#[derive(Deserialize)]
struct EslintFix {
    #[serde(default)]
    text: String,
}

fn parse_eslint(stdout: &str) -> Result<Vec<LintIssue>, LintError> {
    let files: Vec<EslintFile> =
        serde_json::from_str(stdout).map_err(|e| LintError::ParseOutput {
            linter: "eslint".to_string(),
            message: e.to_string(),
        })?;
    let mut issues = Vec::new();
    for file in files {
        for message in file.messages {
            let severity = match message.severity {
                2 => Severity::Error,
                1 => Severity::Warning,
                _ => Severity::Info,
            };
            let replacement = message.fix.as_ref().map(|f| f.text.clone()).unwrap_or_default();
            issues.push(LintIssue {
                file: file.file_path.clone(),
                line: message.line,
                column: message.column,
                end_line: message.end_line,
                end_column: message.end_column,
                rule: message.rule_id.unwrap_or_default(),
                rule_url: String::new(),
                severity,
                message: message.message,
                suggestion: String::new(),
                can_auto_fix: message.fix.is_some(),
                replacement,
                linter: "eslint".to_string(),
            });
        }
    }
    Ok(issues)
}
