use std::fs;
use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use fathom_core::config::{FathomConfig, PolicyRules};
use fathom_core::error::LintError;
use fathom_core::metrics::Metrics;
use fathom_core::types::Language;
use fathom_lint::{LintPolicy, LintRunner, Severity};

fn runner() -> LintRunner {
    LintRunner::new(&FathomConfig::default(), Arc::new(Metrics::new()))
}

#[test]
fn test_absent_linter_returns_valid_unavailable() {
    let runner = runner();
    let available = runner.detect_available_linters();
    if available.get("golangci-lint") == Some(&true) {
        // Environment has the real linter; the absence contract cannot be
        // observed here.
        return;
    }
    let result = runner
        .lint(&CancellationToken::new(), Path::new("x.go"))
        .unwrap();
    assert!(result.valid);
    assert!(!result.linter_available);
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
    assert_eq!(result.linter, "golangci-lint");
    assert_eq!(result.language, Language::Go);
}

#[test]
fn test_lint_content_uses_sentinel_when_unavailable() {
    let runner = runner();
    let available = runner.detect_available_linters();
    if available.get("ruff") == Some(&true) {
        return;
    }
    let result = runner
        .lint_content(&CancellationToken::new(), b"import os\n", Language::Python)
        .unwrap();
    assert_eq!(result.file_path, "<content>");
    assert!(result.valid);
    assert!(!result.linter_available);
}

#[test]
fn test_unsupported_language_is_error() {
    let runner = runner();
    let err = runner.lint(&CancellationToken::new(), Path::new("README.md"));
    assert!(matches!(err, Err(LintError::UnsupportedLanguage(_))));
}

#[test]
fn test_lint_directory_skips_vendored_trees() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("node_modules/dep")).unwrap();
    fs::create_dir_all(dir.path().join("vendor/lib")).unwrap();
    fs::create_dir_all(dir.path().join(".hidden")).unwrap();
    fs::write(dir.path().join("node_modules/dep/index.js"), "x").unwrap();
    fs::write(dir.path().join("vendor/lib/lib.go"), "package lib").unwrap();
    fs::write(dir.path().join(".hidden/h.py"), "x = 1").unwrap();
    fs::write(dir.path().join("app.js"), "var x = 1;").unwrap();
    fs::write(dir.path().join("notes.md"), "# notes").unwrap();

    let runner = runner();
    let results = runner.lint_directory(&CancellationToken::new(), dir.path());
    assert_eq!(results.len(), 1);
    assert!(results[0].0.ends_with("app.js"));
}

#[test]
fn test_policy_severity_contract() {
    // ShouldIgnore => not emitted; ShouldBlock => error;
    // ShouldWarn => warning; default => warning.
    let policy = LintPolicy::new(
        vec!["E".to_string()],
        vec!["W".to_string()],
        vec!["I".to_string()],
    );
    assert!(policy.should_ignore("I100"));
    assert!(policy.should_block("E501"));
    assert!(policy.should_warn("W291"));
    assert!(!policy.should_block("I100"));
    assert!(!policy.should_warn("unrelated"));
}

#[test]
fn test_policy_from_config() {
    let mut config = FathomConfig::default();
    config.lint.policies.insert(
        "go".to_string(),
        PolicyRules {
            block_on: vec!["errcheck".to_string()],
            warn_on: vec![],
            ignore: vec!["godox".to_string()],
        },
    );
    // Construction must accept configured policies without complaint;
    // severity mapping itself is covered by the policy unit tests.
    let runner = LintRunner::new(&config, Arc::new(Metrics::new()));
    let available = runner.detect_available_linters();
    assert!(available.contains_key("golangci-lint"));
}

#[test]
fn test_severity_levels_ordered() {
    assert!(Severity::Error > Severity::Warning);
    assert!(Severity::Warning > Severity::Info);
}
