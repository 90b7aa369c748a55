//! Configuration file loading for fathom.
//!
//! Reads `.fathom/fathom.json` and provides typed access to all settings.
//! Falls back to sensible defaults when the config file is missing or
//! incomplete.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level fathom configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FathomConfig {
    pub version: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub parser: ParserLimits,
    #[serde(default)]
    pub graph: TraversalLimits,
    #[serde(default)]
    pub lint: LintSettings,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

impl Default for FathomConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            languages: Vec::new(),
            parser: ParserLimits::default(),
            graph: TraversalLimits::default(),
            lint: LintSettings::default(),
            ignore_patterns: Vec::new(),
        }
    }
}

/// Resource caps enforced by every parser front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserLimits {
    /// Inputs above this are rejected with `TooLarge`.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
    /// Inputs above this parse normally but log a warning.
    #[serde(default = "default_warn_file_size")]
    pub warn_file_size: usize,
    /// Call sites extracted per symbol before capping.
    #[serde(default = "default_max_call_sites")]
    pub max_call_sites: usize,
    /// Traversal depth during call-site extraction.
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
    /// Mapping depth extracted by the YAML front-end.
    #[serde(default = "default_yaml_max_depth")]
    pub yaml_max_depth: usize,
    /// Whether the CSS front-end descends into `@media` blocks.
    #[serde(default = "default_true")]
    pub css_nested_rules: bool,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            warn_file_size: default_warn_file_size(),
            max_call_sites: default_max_call_sites(),
            max_call_depth: default_max_call_depth(),
            yaml_max_depth: default_yaml_max_depth(),
            css_nested_rules: true,
        }
    }
}

/// Bounds applied to every graph traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalLimits {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_max_traversal_depth")]
    pub max_depth: usize,
    /// Total nodes a single query may visit before truncating.
    #[serde(default = "default_node_budget")]
    pub node_budget: usize,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            max_depth: default_max_traversal_depth(),
            node_budget: default_node_budget(),
        }
    }
}

/// Per-language lint policy patterns, keyed by language tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LintSettings {
    #[serde(default)]
    pub policies: HashMap<String, PolicyRules>,
    /// Per-linter timeout overrides in milliseconds, keyed by linter name.
    #[serde(default)]
    pub timeouts_ms: HashMap<String, u64>,
}

/// Rule-pattern lists controlling issue severity for one language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyRules {
    #[serde(default)]
    pub block_on: Vec<String>,
    #[serde(default)]
    pub warn_on: Vec<String>,
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_max_file_size() -> usize {
    10 * 1024 * 1024
}

fn default_warn_file_size() -> usize {
    1024 * 1024
}

fn default_max_call_sites() -> usize {
    1000
}

fn default_max_call_depth() -> usize {
    50
}

fn default_yaml_max_depth() -> usize {
    3
}

fn default_max_results() -> usize {
    50
}

fn default_max_traversal_depth() -> usize {
    8
}

fn default_node_budget() -> usize {
    10_000
}

fn default_true() -> bool {
    true
}

impl FathomConfig {
    /// Load configuration from `<root>/.fathom/fathom.json`, falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load(root: &Path) -> Self {
        let path = root.join(".fathom").join("fathom.json");
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FathomConfig::default();
        assert_eq!(config.parser.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.parser.max_call_sites, 1000);
        assert_eq!(config.parser.max_call_depth, 50);
        assert_eq!(config.graph.max_results, 50);
        assert_eq!(config.graph.max_depth, 8);
        assert!(config.parser.css_nested_rules);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: FathomConfig =
            serde_json::from_str(r#"{"version":"1","parser":{"max_file_size":1024}}"#).unwrap();
        assert_eq!(config.parser.max_file_size, 1024);
        assert_eq!(config.parser.max_call_depth, 50);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FathomConfig::load(dir.path());
        assert_eq!(config, FathomConfig::default());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".fathom")).unwrap();
        std::fs::write(
            dir.path().join(".fathom/fathom.json"),
            r#"{"version":"1","languages":["go"],"graph":{"max_depth":4}}"#,
        )
        .unwrap();
        let config = FathomConfig::load(dir.path());
        assert_eq!(config.languages, vec!["go".to_string()]);
        assert_eq!(config.graph.max_depth, 4);
    }
}
