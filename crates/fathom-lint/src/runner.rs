//! The lint runner: detection, execution, parsing, policy, batching.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

use fathom_core::config::FathomConfig;
use fathom_core::error::LintError;
use fathom_core::metrics::{self, Metrics};
use fathom_core::types::Language;

use crate::config::{default_configs, LinterConfig};
use crate::detect::LinterDetector;
use crate::exec::run_with_deadline;
use crate::output::parse_linter_output;
use crate::policy::LintPolicy;
use crate::types::{LintResult, CONTENT_SENTINEL};

pub struct LintRunner {
    configs: HashMap<Language, LinterConfig>,
    policies: HashMap<Language, LintPolicy>,
    detector: LinterDetector,
    metrics: Arc<Metrics>,
}

impl LintRunner {
    pub fn new(config: &FathomConfig, metrics: Arc<Metrics>) -> Self {
        let policies = config
            .lint
            .policies
            .iter()
            .filter_map(|(tag, rules)| {
                Language::parse(tag).map(|lang| (lang, LintPolicy::from_rules(rules)))
            })
            .collect();
        Self {
            configs: default_configs(&config.lint),
            policies,
            detector: LinterDetector::new(),
            metrics,
        }
    }

    /// Probe PATH for every configured linter, returning name -> bit.
    pub fn detect_available_linters(&self) -> HashMap<String, bool> {
        self.detector.detect(self.configs.values())
    }

    /// Lint one file on disk.
    ///
    /// A recognized language with no installed linter returns a valid
    /// result flagged `linter_available = false`; only unrecognized
    /// languages and subprocess problems error.
    pub fn lint(&self, ctx: &CancellationToken, path: &Path) -> Result<LintResult, LintError> {
        let language = Language::from_path(path)
            .ok_or_else(|| LintError::UnsupportedLanguage(path.display().to_string()))?;
        let config = self
            .configs
            .get(&language)
            .ok_or_else(|| LintError::UnsupportedLanguage(language.to_string()))?;
        let file_path = path.to_string_lossy().to_string();

        if !self.detector.detected() {
            self.detect_available_linters();
        }
        if self.detector.is_available(&config.binary) != Some(true) {
            return Ok(LintResult::unavailable(&config.linter, language, &file_path));
        }

        self.run_linter(ctx, config, language, &file_path, &config.args)
    }

    /// Lint raw bytes by writing them to a scratch file with the
    /// language's canonical extension. Paths in the result are rewritten
    /// to the `<content>` sentinel; the scratch file is removed on every
    /// path, including errors.
    pub fn lint_content(
        &self,
        ctx: &CancellationToken,
        content: &[u8],
        language: Language,
    ) -> Result<LintResult, LintError> {
        let config = self
            .configs
            .get(&language)
            .ok_or_else(|| LintError::UnsupportedLanguage(language.to_string()))?;

        if !self.detector.detected() {
            self.detect_available_linters();
        }
        if self.detector.is_available(&config.binary) != Some(true) {
            return Ok(LintResult::unavailable(
                &config.linter,
                language,
                CONTENT_SENTINEL,
            ));
        }

        // NamedTempFile removes the scratch file on drop, error or not.
        let mut scratch = tempfile::Builder::new()
            .prefix("fathom-lint-")
            .suffix(&format!(".{}", language.canonical_extension()))
            .tempfile()?;
        scratch.write_all(content)?;
        scratch.flush()?;
        let scratch_path = scratch.path().to_string_lossy().to_string();

        let mut result = self.run_linter(ctx, config, language, &scratch_path, &config.args)?;

        result.file_path = CONTENT_SENTINEL.to_string();
        for issue in result
            .errors
            .iter_mut()
            .chain(result.warnings.iter_mut())
            .chain(result.infos.iter_mut())
        {
            issue.file = CONTENT_SENTINEL.to_string();
        }
        Ok(result)
    }

    /// Lint many files concurrently. Result order matches input order.
    pub fn lint_files(
        &self,
        ctx: &CancellationToken,
        paths: &[PathBuf],
    ) -> Vec<(PathBuf, Result<LintResult, LintError>)> {
        paths
            .par_iter()
            .map(|path| (path.clone(), self.lint(ctx, path)))
            .collect()
    }

    /// Walk a directory and lint every recognized file, skipping hidden
    /// entries and vendored trees.
    pub fn lint_directory(
        &self,
        ctx: &CancellationToken,
        root: &Path,
    ) -> Vec<(PathBuf, Result<LintResult, LintError>)> {
        let mut paths: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e.file_name().to_str()))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                Language::from_path(p).is_some_and(|lang| self.configs.contains_key(&lang))
            })
            .collect();
        paths.sort();
        self.lint_files(ctx, &paths)
    }

    /// Run the linter in fix mode, then re-lint to report what remains.
    pub fn auto_fix(&self, ctx: &CancellationToken, path: &Path) -> Result<LintResult, LintError> {
        let language = Language::from_path(path)
            .ok_or_else(|| LintError::UnsupportedLanguage(path.display().to_string()))?;
        let config = self
            .configs
            .get(&language)
            .ok_or_else(|| LintError::UnsupportedLanguage(language.to_string()))?;
        let file_path = path.to_string_lossy().to_string();

        if !self.detector.detected() {
            self.detect_available_linters();
        }
        if self.detector.is_available(&config.binary) != Some(true) {
            return Ok(LintResult::unavailable(&config.linter, language, &file_path));
        }

        // Findings from the fix pass are discarded; the follow-up lint is
        // the verdict on what the fixer could not repair.
        let _ = self.run_linter(ctx, config, language, &file_path, &config.fix_args)?;
        self.run_linter(ctx, config, language, &file_path, &config.args)
    }

    fn run_linter(
        &self,
        ctx: &CancellationToken,
        config: &LinterConfig,
        language: Language,
        file_path: &str,
        base_args: &[String],
    ) -> Result<LintResult, LintError> {
        let mut args: Vec<String> = base_args.to_vec();
        args.push(file_path.to_string());

        let span = tracing::debug_span!("lint", linter = config.linter.as_str(), file = file_path);
        let _guard = span.enter();
        let started = Instant::now();
        let output = run_with_deadline(ctx, &config.binary, &args, None, config.timeout)?;
        let duration_ms = started.elapsed().as_millis() as u64;

        if output.timed_out {
            return Err(LintError::Timeout {
                linter: config.linter.clone(),
                timeout_ms: config.timeout.as_millis() as u64,
                stderr: output.stderr,
            });
        }
        // Linters exit non-zero on findings; that is only a failure when
        // there is nothing on stdout to parse.
        if output.exit_code != Some(0) && output.stdout.trim().is_empty() {
            return Err(LintError::ExecFailed {
                linter: config.linter.clone(),
                message: format!(
                    "exit code {:?}: {}",
                    output.exit_code,
                    output.stderr.trim()
                ),
            });
        }

        let issues = parse_linter_output(&config.linter, &output.stdout)?;
        let policy = self.policies.get(&language).cloned().unwrap_or_default();
        let (errors, warnings, infos) = policy.apply(issues);

        self.metrics
            .record(metrics::LINT_DURATION_MS, duration_ms as f64);
        self.metrics.record(
            metrics::ISSUES_PER_LINT,
            (errors.len() + warnings.len() + infos.len()) as f64,
        );

        Ok(LintResult {
            valid: errors.is_empty(),
            errors,
            warnings,
            infos,
            duration_ms,
            linter: config.linter.clone(),
            language,
            file_path: file_path.to_string(),
            linter_available: true,
        })
    }
}

fn is_skipped_dir(name: Option<&str>) -> bool {
    match name {
        Some(name) => {
            (name.starts_with('.') && name != "." && name != "..")
                || name == "vendor"
                || name == "node_modules"
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> LintRunner {
        LintRunner::new(&FathomConfig::default(), Arc::new(Metrics::new()))
    }

    #[test]
    fn test_unsupported_language_errors() {
        let runner = runner();
        let err = runner.lint(&CancellationToken::new(), Path::new("notes.txt"));
        assert!(matches!(err, Err(LintError::UnsupportedLanguage(_))));
    }

    #[test]
    fn test_no_linter_configured_for_language() {
        let runner = runner();
        let err = runner.lint(&CancellationToken::new(), Path::new("README.md"));
        assert!(matches!(err, Err(LintError::UnsupportedLanguage(_))));
    }

    #[test]
    fn test_skipped_dirs() {
        assert!(is_skipped_dir(Some(".git")));
        assert!(is_skipped_dir(Some("vendor")));
        assert!(is_skipped_dir(Some("node_modules")));
        assert!(!is_skipped_dir(Some("src")));
    }

    #[test]
    fn test_detect_reports_all_binaries() {
        let runner = runner();
        let map = runner.detect_available_linters();
        assert!(map.contains_key("golangci-lint"));
        assert!(map.contains_key("ruff"));
        assert!(map.contains_key("eslint"));
    }

    #[test]
    fn test_missing_linter_yields_valid_unavailable_result() {
        // The probe for these binaries is expected to fail in CI
        // sandboxes; when one happens to be installed the test still
        // passes because it only asserts on the unavailable branch.
        let runner = runner();
        let map = runner.detect_available_linters();
        if map.get("golangci-lint") == Some(&false) {
            let result = runner
                .lint(&CancellationToken::new(), Path::new("x.go"))
                .unwrap();
            assert!(result.valid);
            assert!(!result.linter_available);
            assert_eq!(result.linter, "golangci-lint");
            assert_eq!(result.language, Language::Go);
            assert!(result.errors.is_empty() && result.warnings.is_empty());
        }
    }
}
