//! Per-language linter configuration.

use std::collections::HashMap;
use std::time::Duration;

use fathom_core::config::LintSettings;
use fathom_core::types::Language;

/// How to invoke one linter binary.
#[derive(Debug, Clone)]
pub struct LinterConfig {
    /// Display name, also the key for output parsing and policy lookup.
    pub linter: String,
    pub binary: String,
    pub args: Vec<String>,
    pub fix_args: Vec<String>,
    pub timeout: Duration,
    pub supports_stdin: bool,
}

/// Built-in configurations for the supported linters, with timeout
/// overrides applied from settings.
pub fn default_configs(settings: &LintSettings) -> HashMap<Language, LinterConfig> {
    let mut configs = HashMap::new();
    configs.insert(
        Language::Go,
        LinterConfig {
            linter: "golangci-lint".to_string(),
            binary: "golangci-lint".to_string(),
            args: vec!["run".into(), "--out-format".into(), "json".into()],
            fix_args: vec![
                "run".into(),
                "--fix".into(),
                "--out-format".into(),
                "json".into(),
            ],
            timeout: Duration::from_secs(30),
            supports_stdin: false,
        },
    );
    configs.insert(
        Language::Python,
        LinterConfig {
            linter: "ruff".to_string(),
            binary: "ruff".to_string(),
            args: vec!["check".into(), "--output-format".into(), "json".into()],
            fix_args: vec![
                "check".into(),
                "--fix".into(),
                "--output-format".into(),
                "json".into(),
            ],
            timeout: Duration::from_secs(10),
            supports_stdin: true,
        },
    );
    let eslint = LinterConfig {
        linter: "eslint".to_string(),
        binary: "eslint".to_string(),
        args: vec!["--format".into(), "json".into()],
        fix_args: vec!["--fix".into(), "--format".into(), "json".into()],
        timeout: Duration::from_secs(20),
        supports_stdin: false,
    };
    configs.insert(Language::TypeScript, eslint.clone());
    configs.insert(Language::JavaScript, eslint);

    for config in configs.values_mut() {
        if let Some(ms) = settings.timeouts_ms.get(&config.linter) {
            config.timeout = Duration::from_millis(*ms);
        }
    }
    configs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs_cover_lintable_languages() {
        let configs = default_configs(&LintSettings::default());
        assert_eq!(configs[&Language::Go].linter, "golangci-lint");
        assert_eq!(configs[&Language::Python].linter, "ruff");
        assert_eq!(configs[&Language::TypeScript].linter, "eslint");
        assert_eq!(configs[&Language::JavaScript].linter, "eslint");
        assert!(!configs.contains_key(&Language::Markdown));
    }

    #[test]
    fn test_timeout_override() {
        let mut settings = LintSettings::default();
        settings.timeouts_ms.insert("ruff".to_string(), 1234);
        let configs = default_configs(&settings);
        assert_eq!(configs[&Language::Python].timeout, Duration::from_millis(1234));
        assert_eq!(configs[&Language::Go].timeout, Duration::from_secs(30));
    }
}
