//! CSS front-end.
//!
//! Extracts `@import` references (with their media queries), class and id
//! selectors, custom properties, `@keyframes` animations, and `@media`
//! blocks. Rule sets nested inside `@media` are extracted as children of
//! the media-query symbol when the config toggle allows it.

use tokio_util::sync::CancellationToken;
use tree_sitter::Node;

use fathom_core::config::ParserLimits;
use fathom_core::error::ParseError;
use fathom_core::types::{Import, Language, ParseResult, Symbol, SymbolKind};

use crate::parser::{check_input, finish, Parser};
use crate::treesitter::{
    collect_syntax_errors, end_line, location_of, named_children, node_text, one_line,
    parse_source, start_line,
};

const IMPORT_STATEMENT: &str = "import_statement";
const RULE_SET: &str = "rule_set";
const KEYFRAMES_STATEMENT: &str = "keyframes_statement";
const MEDIA_STATEMENT: &str = "media_statement";
const CLASS_NAME: &str = "class_name";
const ID_NAME: &str = "id_name";
const DECLARATION: &str = "declaration";
const PROPERTY_NAME: &str = "property_name";
const KEYFRAMES_NAME: &str = "keyframes_name";
const BLOCK: &str = "block";
const STRING_VALUE: &str = "string_value";
const CALL_EXPRESSION: &str = "call_expression";

pub struct CssParser {
    limits: ParserLimits,
}

impl CssParser {
    pub fn new(limits: ParserLimits) -> Self {
        Self { limits }
    }
}

impl Parser for CssParser {
    fn language(&self) -> Language {
        Language::Css
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["css"]
    }

    fn parse(
        &self,
        ctx: &CancellationToken,
        content: &[u8],
        file_path: &str,
    ) -> Result<ParseResult, ParseError> {
        let input = check_input(ctx, content, file_path, &self.limits)?;
        let tree = parse_source(&tree_sitter_css::LANGUAGE.into(), input.source)?;
        let root = tree.root_node();
        let bytes = input.source.as_bytes();

        let errors = collect_syntax_errors(root, bytes);
        let mut symbols: Vec<Symbol> = Vec::new();
        let mut imports: Vec<Import> = Vec::new();

        for node in named_children(root) {
            match node.kind() {
                IMPORT_STATEMENT => {
                    if let Some(import) = import_of(node, bytes, file_path) {
                        imports.push(import);
                    }
                }
                RULE_SET => rule_set_symbols(node, bytes, file_path, &mut symbols),
                KEYFRAMES_STATEMENT => {
                    if let Some(sym) = keyframes_symbol(node, bytes, file_path) {
                        symbols.push(sym);
                    }
                }
                MEDIA_STATEMENT => {
                    symbols.push(self.media_symbol(node, bytes, file_path));
                }
                _ => {}
            }
        }

        finish(ctx, file_path, Language::Css, input.hash, symbols, imports, errors)
    }
}

impl CssParser {
    fn media_symbol(&self, node: Node<'_>, source: &[u8], file_path: &str) -> Symbol {
        let query: String = named_children(node)
            .into_iter()
            .filter(|c| c.kind() != BLOCK)
            .map(|c| node_text(c, source).to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let name = if query.is_empty() { "media".to_string() } else { query.clone() };

        let mut sym = css_symbol(node, &name, SymbolKind::MediaQuery, source, file_path);
        sym.signature = one_line(&format!("@media {query}"));

        if self.limits.css_nested_rules {
            if let Some(block) = named_children(node).into_iter().find(|c| c.kind() == BLOCK) {
                for inner in named_children(block) {
                    if inner.kind() == RULE_SET {
                        rule_set_symbols(inner, source, file_path, &mut sym.children);
                    }
                }
            }
        }
        sym
    }
}

fn import_of(node: Node<'_>, source: &[u8], file_path: &str) -> Option<Import> {
    let children = named_children(node);
    let path_node = children
        .iter()
        .find(|c| matches!(c.kind(), STRING_VALUE | CALL_EXPRESSION))?;
    let raw = node_text(*path_node, source);
    let path = raw
        .trim_start_matches("url(")
        .trim_end_matches(')')
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    let media_query: String = children
        .iter()
        .skip_while(|c| c.id() != path_node.id())
        .skip(1)
        .map(|c| node_text(*c, source).to_string())
        .collect::<Vec<_>>()
        .join(" ");

    Some(Import {
        path,
        is_stylesheet: true,
        is_relative: true,
        media_query,
        location: location_of(node, file_path),
        ..Import::default()
    })
}

/// Selectors and custom properties of one rule set.
fn rule_set_symbols(node: Node<'_>, source: &[u8], file_path: &str, out: &mut Vec<Symbol>) {
    let mut seen: Vec<String> = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        match current.kind() {
            CLASS_NAME | ID_NAME => {
                let name = node_text(current, source);
                let selector = if current.kind() == CLASS_NAME {
                    format!(".{name}")
                } else {
                    format!("#{name}")
                };
                if name.is_empty() || seen.contains(&selector) {
                    continue;
                }
                seen.push(selector.clone());
                let kind = if current.kind() == CLASS_NAME {
                    SymbolKind::CssClass
                } else {
                    SymbolKind::CssId
                };
                // The symbol spans the whole rule set, not just the selector.
                let mut sym = css_symbol(node, name, kind, source, file_path);
                sym.signature = selector.clone();
                sym.metadata_mut().css_selector = selector;
                out.push(sym);
            }
            DECLARATION => {
                if let Some(prop) = named_children(current)
                    .into_iter()
                    .find(|c| c.kind() == PROPERTY_NAME)
                {
                    let prop_name = node_text(prop, source);
                    if prop_name.starts_with("--") {
                        let mut sym = css_symbol(
                            current,
                            prop_name,
                            SymbolKind::CssVariable,
                            source,
                            file_path,
                        );
                        sym.signature = one_line(node_text(current, source));
                        out.push(sym);
                    }
                }
                continue;
            }
            _ => {}
        }
        for child in named_children(current).into_iter().rev() {
            stack.push(child);
        }
    }
}

fn keyframes_symbol(node: Node<'_>, source: &[u8], file_path: &str) -> Option<Symbol> {
    let name_node = named_children(node)
        .into_iter()
        .find(|c| c.kind() == KEYFRAMES_NAME)?;
    let name = node_text(name_node, source);
    let mut sym = css_symbol(node, name, SymbolKind::Animation, source, file_path);
    sym.signature = format!("@keyframes {name}");
    Some(sym)
}

fn css_symbol(
    node: Node<'_>,
    name: &str,
    kind: SymbolKind,
    _source: &[u8],
    file_path: &str,
) -> Symbol {
    let mut sym = Symbol::new(
        name,
        kind,
        file_path,
        Language::Css,
        start_line(node),
        end_line(node),
        node.start_position().column as u32,
        node.end_position().column as u32,
    );
    sym.exported = true;
    sym
}
