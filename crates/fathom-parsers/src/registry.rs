//! Process-wide parser registry.
//!
//! Maps language tags and file extensions to front-ends. Registration
//! happens on startup; afterwards the registry only sees concurrent
//! readers, which the `RwLock`s make safe.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use fathom_core::config::ParserLimits;
use fathom_core::types::Language;

use crate::bash::BashParser;
use crate::css::CssParser;
use crate::dockerfile::DockerfileParser;
use crate::go::GoParser;
use crate::html::HtmlParser;
use crate::javascript::JavaScriptParser;
use crate::markdown::MarkdownParser;
use crate::parser::Parser;
use crate::python::PythonParser;
use crate::typescript::TypeScriptParser;
use crate::yaml::YamlParser;

#[derive(Default)]
pub struct ParserRegistry {
    by_language: RwLock<HashMap<Language, Arc<dyn Parser>>>,
    by_extension: RwLock<HashMap<String, Arc<dyn Parser>>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a front-end under its language tag and every extension it
    /// claims. Later registrations win, which lets tests swap a parser.
    pub fn register(&self, parser: Arc<dyn Parser>) {
        let mut by_language = self.by_language.write().unwrap();
        let mut by_extension = self.by_extension.write().unwrap();
        for ext in parser.extensions() {
            by_extension.insert((*ext).to_string(), Arc::clone(&parser));
        }
        by_language.insert(parser.language(), parser);
    }

    pub fn get_by_language(&self, language: Language) -> Option<Arc<dyn Parser>> {
        self.by_language.read().unwrap().get(&language).cloned()
    }

    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn Parser>> {
        self.by_extension.read().unwrap().get(ext).cloned()
    }

    /// Resolve the front-end for a path: extensionless `Dockerfile` first,
    /// then the extension table.
    pub fn get_for_path(&self, path: &Path) -> Option<Arc<dyn Parser>> {
        let language = Language::from_path(path)?;
        self.get_by_language(language)
    }

    /// Registered language tags, sorted.
    pub fn languages(&self) -> Vec<Language> {
        let mut langs: Vec<_> = self.by_language.read().unwrap().keys().copied().collect();
        langs.sort();
        langs
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<String> {
        let mut exts: Vec<_> = self.by_extension.read().unwrap().keys().cloned().collect();
        exts.sort();
        exts
    }
}

/// Build a registry with all ten front-ends under the given limits.
pub fn default_registry(limits: ParserLimits) -> ParserRegistry {
    let registry = ParserRegistry::new();
    registry.register(Arc::new(GoParser::new(limits.clone())));
    registry.register(Arc::new(PythonParser::new(limits.clone())));
    registry.register(Arc::new(TypeScriptParser::new(limits.clone())));
    registry.register(Arc::new(JavaScriptParser::new(limits.clone())));
    registry.register(Arc::new(CssParser::new(limits.clone())));
    registry.register(Arc::new(HtmlParser::new(limits.clone())));
    registry.register(Arc::new(YamlParser::new(limits.clone())));
    registry.register(Arc::new(MarkdownParser::new(limits.clone())));
    registry.register(Arc::new(DockerfileParser::new(limits.clone())));
    registry.register(Arc::new(BashParser::new(limits)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_all_languages() {
        let registry = default_registry(ParserLimits::default());
        assert_eq!(registry.languages().len(), 10);
        for language in [
            Language::Go,
            Language::Python,
            Language::TypeScript,
            Language::JavaScript,
            Language::Css,
            Language::Html,
            Language::Yaml,
            Language::Markdown,
            Language::Dockerfile,
            Language::Bash,
        ] {
            assert!(registry.get_by_language(language).is_some(), "{language}");
        }
    }

    #[test]
    fn test_extension_lookup() {
        let registry = default_registry(ParserLimits::default());
        assert_eq!(
            registry.get_by_extension("go").unwrap().language(),
            Language::Go
        );
        assert_eq!(
            registry.get_by_extension("tsx").unwrap().language(),
            Language::TypeScript
        );
        assert!(registry.get_by_extension("zig").is_none());
    }

    #[test]
    fn test_dockerfile_path_lookup() {
        let registry = default_registry(ParserLimits::default());
        let parser = registry.get_for_path(Path::new("deploy/Dockerfile")).unwrap();
        assert_eq!(parser.language(), Language::Dockerfile);
    }
}
