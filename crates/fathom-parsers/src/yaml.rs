//! YAML front-end.
//!
//! Extracts block and flow mapping keys down to a configurable depth,
//! anchors, and multi-document streams. Each document after the first
//! becomes a `document` symbol owning its keys.

use tokio_util::sync::CancellationToken;
use tree_sitter::Node;

use fathom_core::config::ParserLimits;
use fathom_core::error::ParseError;
use fathom_core::types::{Language, ParseResult, Symbol, SymbolKind};

use crate::parser::{check_input, finish, Parser};
use crate::treesitter::{
    collect_syntax_errors, end_line, named_children, node_text, one_line, parse_source,
    start_line,
};

const DOCUMENT: &str = "document";
const BLOCK_MAPPING_PAIR: &str = "block_mapping_pair";
const FLOW_PAIR: &str = "flow_pair";
const ANCHOR: &str = "anchor";

pub struct YamlParser {
    limits: ParserLimits,
}

impl YamlParser {
    pub fn new(limits: ParserLimits) -> Self {
        Self { limits }
    }
}

impl Parser for YamlParser {
    fn language(&self) -> Language {
        Language::Yaml
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["yaml", "yml"]
    }

    fn parse(
        &self,
        ctx: &CancellationToken,
        content: &[u8],
        file_path: &str,
    ) -> Result<ParseResult, ParseError> {
        let input = check_input(ctx, content, file_path, &self.limits)?;
        let tree = parse_source(&tree_sitter_yaml::LANGUAGE.into(), input.source)?;
        let root = tree.root_node();
        let bytes = input.source.as_bytes();

        let errors = collect_syntax_errors(root, bytes);
        let mut symbols: Vec<Symbol> = Vec::new();

        let documents: Vec<Node<'_>> = named_children(root)
            .into_iter()
            .filter(|c| c.kind() == DOCUMENT)
            .collect();

        for (index, document) in documents.iter().enumerate() {
            let mut keys = Vec::new();
            self.collect_keys(*document, bytes, file_path, 0, &mut keys);
            collect_anchors(*document, bytes, file_path, &mut keys);

            if index == 0 {
                symbols.extend(keys);
            } else {
                let name = format!("doc{}", index + 1);
                let mut doc_sym = Symbol::new(
                    &name,
                    SymbolKind::Document,
                    file_path,
                    Language::Yaml,
                    start_line(*document),
                    end_line(*document),
                    document.start_position().column as u32,
                    document.end_position().column as u32,
                );
                doc_sym.exported = true;
                doc_sym.children = keys;
                symbols.push(doc_sym);
            }
        }

        finish(ctx, file_path, Language::Yaml, input.hash, symbols, vec![], errors)
    }
}

impl YamlParser {
    fn collect_keys(
        &self,
        node: Node<'_>,
        source: &[u8],
        file_path: &str,
        depth: usize,
        out: &mut Vec<Symbol>,
    ) {
        if depth >= self.limits.yaml_max_depth {
            return;
        }
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if current.kind() == BLOCK_MAPPING_PAIR || current.kind() == FLOW_PAIR {
                if let Some(sym) = self.pair_symbol(current, source, file_path, depth) {
                    out.push(sym);
                }
                continue;
            }
            for child in named_children(current).into_iter().rev() {
                stack.push(child);
            }
        }
    }

    fn pair_symbol(
        &self,
        pair: Node<'_>,
        source: &[u8],
        file_path: &str,
        depth: usize,
    ) -> Option<Symbol> {
        let key = pair.child_by_field_name("key")?;
        let name = node_text(key, source)
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string();
        if name.is_empty() {
            return None;
        }
        let mut sym = Symbol::new(
            &name,
            SymbolKind::Key,
            file_path,
            Language::Yaml,
            start_line(pair),
            end_line(pair),
            pair.start_position().column as u32,
            pair.end_position().column as u32,
        );
        sym.signature = one_line(node_text(key, source));
        sym.exported = true;
        if let Some(value) = pair.child_by_field_name("value") {
            self.collect_keys(value, source, file_path, depth + 1, &mut sym.children);
        }
        Some(sym)
    }
}

fn collect_anchors(node: Node<'_>, source: &[u8], file_path: &str, out: &mut Vec<Symbol>) {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.kind() == ANCHOR {
            let name = node_text(current, source).trim_start_matches('&').to_string();
            if !name.is_empty() {
                let mut sym = Symbol::new(
                    &name,
                    SymbolKind::Anchor,
                    file_path,
                    Language::Yaml,
                    start_line(current),
                    end_line(current),
                    current.start_position().column as u32,
                    current.end_position().column as u32,
                );
                sym.signature = format!("&{name}");
                sym.exported = true;
                out.push(sym);
            }
            continue;
        }
        for child in named_children(current).into_iter().rev() {
            stack.push(child);
        }
    }
}
