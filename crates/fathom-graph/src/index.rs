//! Process-local symbol index.
//!
//! Flat lookup maps over a batch of parse results: id, name,
//! (package, name), kind, and file. Nested symbols are indexed too; the
//! graph remains the authority on structure, this is the authority on
//! lookup.

use std::collections::HashMap;

use fathom_core::error::ParseError;
use fathom_core::types::{ParseResult, Symbol, SymbolKind};

#[derive(Default)]
pub struct SymbolIndex {
    by_id: HashMap<String, Symbol>,
    by_name: HashMap<String, Vec<String>>,
    by_package_name: HashMap<(String, String), Vec<String>>,
    by_kind: HashMap<SymbolKind, Vec<String>>,
    by_file: HashMap<String, Vec<String>>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every symbol (recursively) of a batch of parse results.
    /// A duplicate id within the batch is a builder bug upstream and
    /// fails validation here.
    pub fn from_results(results: &[ParseResult]) -> Result<Self, ParseError> {
        let mut index = Self::new();
        for result in results {
            for symbol in &result.symbols {
                index.add(symbol)?;
            }
        }
        Ok(index)
    }

    /// Add one symbol and its children.
    pub fn add(&mut self, symbol: &Symbol) -> Result<(), ParseError> {
        if self.by_id.contains_key(&symbol.id) {
            return Err(ParseError::validation(
                "id",
                format!("duplicate symbol id {}", symbol.id),
            ));
        }
        self.by_id.insert(symbol.id.clone(), symbol.clone());
        self.by_name
            .entry(symbol.name.clone())
            .or_default()
            .push(symbol.id.clone());
        self.by_package_name
            .entry((symbol.package.clone(), symbol.name.clone()))
            .or_default()
            .push(symbol.id.clone());
        self.by_kind
            .entry(symbol.kind)
            .or_default()
            .push(symbol.id.clone());
        self.by_file
            .entry(symbol.file_path.clone())
            .or_default()
            .push(symbol.id.clone());
        for child in &symbol.children {
            self.add(child)?;
        }
        Ok(())
    }

    pub fn lookup_by_id(&self, id: &str) -> Option<&Symbol> {
        self.by_id.get(id)
    }

    pub fn lookup_by_name(&self, name: &str) -> Vec<&Symbol> {
        self.resolve(self.by_name.get(name))
    }

    pub fn lookup_by_package_name(&self, package: &str, name: &str) -> Vec<&Symbol> {
        self.resolve(
            self.by_package_name
                .get(&(package.to_string(), name.to_string())),
        )
    }

    pub fn lookup_by_kind(&self, kind: SymbolKind) -> Vec<&Symbol> {
        self.resolve(self.by_kind.get(&kind))
    }

    pub fn lookup_by_file(&self, file_path: &str) -> Vec<&Symbol> {
        self.resolve(self.by_file.get(file_path))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    fn resolve(&self, ids: Option<&Vec<String>>) -> Vec<&Symbol> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
            .collect()
    }
}
