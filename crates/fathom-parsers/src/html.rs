//! HTML front-end.
//!
//! Extracts elements carrying an `id`, named forms, custom (hyphenated)
//! elements as components, and external script/stylesheet references.
//! Inline `<script>` and `<style>` bodies are handed to the JavaScript
//! and CSS front-ends; their symbols come back under synthetic file paths
//! suffixed with `<script>` / `<style>` so downstream consumers can tell
//! them apart from standalone files.

use tokio_util::sync::CancellationToken;
use tree_sitter::Node;

use fathom_core::config::ParserLimits;
use fathom_core::error::ParseError;
use fathom_core::types::{Import, Language, ParseResult, Symbol, SymbolKind};

use crate::css::CssParser;
use crate::javascript::JavaScriptParser;
use crate::parser::{check_input, finish, Parser};
use crate::treesitter::{
    collect_syntax_errors, end_line, location_of, named_children, node_text, one_line,
    parse_source, start_line,
};

const ELEMENT: &str = "element";
const SCRIPT_ELEMENT: &str = "script_element";
const STYLE_ELEMENT: &str = "style_element";
const START_TAG: &str = "start_tag";
const SELF_CLOSING_TAG: &str = "self_closing_tag";
const TAG_NAME: &str = "tag_name";
const ATTRIBUTE: &str = "attribute";
const ATTRIBUTE_NAME: &str = "attribute_name";
const ATTRIBUTE_VALUE: &str = "attribute_value";
const RAW_TEXT: &str = "raw_text";

pub struct HtmlParser {
    limits: ParserLimits,
    javascript: JavaScriptParser,
    css: CssParser,
}

impl HtmlParser {
    pub fn new(limits: ParserLimits) -> Self {
        Self {
            javascript: JavaScriptParser::new(limits.clone()),
            css: CssParser::new(limits.clone()),
            limits,
        }
    }
}

impl Parser for HtmlParser {
    fn language(&self) -> Language {
        Language::Html
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["html", "htm"]
    }

    fn parse(
        &self,
        ctx: &CancellationToken,
        content: &[u8],
        file_path: &str,
    ) -> Result<ParseResult, ParseError> {
        let input = check_input(ctx, content, file_path, &self.limits)?;
        let tree = parse_source(&tree_sitter_html::LANGUAGE.into(), input.source)?;
        let root = tree.root_node();
        let bytes = input.source.as_bytes();

        let mut errors = collect_syntax_errors(root, bytes);
        let mut symbols: Vec<Symbol> = Vec::new();
        let mut imports: Vec<Import> = Vec::new();

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node.kind() {
                ELEMENT => {
                    self.element_symbols(node, bytes, file_path, &mut symbols, &mut imports);
                }
                SCRIPT_ELEMENT => {
                    self.script_element(
                        ctx, node, bytes, file_path, &mut symbols, &mut imports, &mut errors,
                    )?;
                }
                STYLE_ELEMENT => {
                    self.style_element(ctx, node, bytes, file_path, &mut symbols, &mut errors)?;
                }
                _ => {}
            }
            for child in named_children(node).into_iter().rev() {
                stack.push(child);
            }
        }

        finish(ctx, file_path, Language::Html, input.hash, symbols, imports, errors)
    }
}

impl HtmlParser {
    fn element_symbols(
        &self,
        node: Node<'_>,
        source: &[u8],
        file_path: &str,
        symbols: &mut Vec<Symbol>,
        imports: &mut Vec<Import>,
    ) {
        let Some(tag) = named_children(node)
            .into_iter()
            .find(|c| matches!(c.kind(), START_TAG | SELF_CLOSING_TAG))
        else {
            return;
        };
        let Some(tag_name) = named_children(tag).into_iter().find(|c| c.kind() == TAG_NAME)
        else {
            return;
        };
        let name = node_text(tag_name, source).to_ascii_lowercase();
        let attrs = attributes(tag, source);
        let tag_text = one_line(node_text(tag, source));

        if name.contains('-') {
            let mut sym = html_symbol(node, &name, SymbolKind::Component, file_path);
            sym.signature = tag_text.clone();
            symbols.push(sym);
        }

        if let Some(id) = attr(&attrs, "id") {
            let mut sym = html_symbol(node, id, SymbolKind::Element, file_path);
            sym.signature = tag_text.clone();
            sym.metadata_mut().parent_name = name.clone();
            symbols.push(sym);
        }

        if name == "form" {
            if let Some(form_name) = attr(&attrs, "name") {
                let mut sym = html_symbol(node, form_name, SymbolKind::Form, file_path);
                sym.signature = tag_text.clone();
                symbols.push(sym);
            }
        }

        if name == "link" {
            let rel = attr(&attrs, "rel").unwrap_or("");
            if rel.eq_ignore_ascii_case("stylesheet") {
                if let Some(href) = attr(&attrs, "href") {
                    imports.push(Import {
                        path: href.to_string(),
                        is_stylesheet: true,
                        is_relative: !href.contains("://"),
                        location: location_of(node, file_path),
                        ..Import::default()
                    });
                }
            }
        }
    }

    fn script_element(
        &self,
        ctx: &CancellationToken,
        node: Node<'_>,
        source: &[u8],
        file_path: &str,
        symbols: &mut Vec<Symbol>,
        imports: &mut Vec<Import>,
        errors: &mut Vec<String>,
    ) -> Result<(), ParseError> {
        let Some(tag) = named_children(node).into_iter().find(|c| c.kind() == START_TAG)
        else {
            return Ok(());
        };
        let attrs = attributes(tag, source);
        let is_module = attr(&attrs, "type").is_some_and(|t| t.eq_ignore_ascii_case("module"));

        if let Some(src) = attr(&attrs, "src") {
            imports.push(Import {
                path: src.to_string(),
                is_script: true,
                is_module,
                is_relative: !src.contains("://"),
                location: location_of(node, file_path),
                ..Import::default()
            });
            return Ok(());
        }

        let Some(raw) = named_children(node).into_iter().find(|c| c.kind() == RAW_TEXT)
        else {
            return Ok(());
        };
        let body = node_text(raw, source);
        if body.trim().is_empty() {
            return Ok(());
        }
        let synthetic = format!("{file_path}<script>");
        match self.javascript.parse(ctx, body.as_bytes(), &synthetic) {
            Ok(inner) => {
                symbols.extend(inner.symbols);
                imports.extend(inner.imports);
                errors.extend(inner.errors);
            }
            Err(ParseError::Canceled) => return Err(ParseError::Canceled),
            Err(e) => errors.push(format!("inline script: {e}")),
        }
        Ok(())
    }

    fn style_element(
        &self,
        ctx: &CancellationToken,
        node: Node<'_>,
        source: &[u8],
        file_path: &str,
        symbols: &mut Vec<Symbol>,
        errors: &mut Vec<String>,
    ) -> Result<(), ParseError> {
        let Some(raw) = named_children(node).into_iter().find(|c| c.kind() == RAW_TEXT)
        else {
            return Ok(());
        };
        let body = node_text(raw, source);
        if body.trim().is_empty() {
            return Ok(());
        }
        let synthetic = format!("{file_path}<style>");
        match self.css.parse(ctx, body.as_bytes(), &synthetic) {
            Ok(inner) => symbols.extend(inner.symbols),
            Err(ParseError::Canceled) => return Err(ParseError::Canceled),
            Err(e) => errors.push(format!("inline style: {e}")),
        }
        Ok(())
    }
}

fn html_symbol(node: Node<'_>, name: &str, kind: SymbolKind, file_path: &str) -> Symbol {
    let mut sym = Symbol::new(
        name,
        kind,
        file_path,
        Language::Html,
        start_line(node),
        end_line(node),
        node.start_position().column as u32,
        node.end_position().column as u32,
    );
    sym.exported = true;
    sym
}

fn attributes<'a>(tag: Node<'_>, source: &'a [u8]) -> Vec<(String, &'a str)> {
    let mut attrs = Vec::new();
    for child in named_children(tag) {
        if child.kind() != ATTRIBUTE {
            continue;
        }
        let Some(name) = named_children(child)
            .into_iter()
            .find(|c| c.kind() == ATTRIBUTE_NAME)
        else {
            continue;
        };
        let value = find_attribute_value(child, source).unwrap_or("");
        attrs.push((node_text(name, source).to_ascii_lowercase(), value));
    }
    attrs
}

fn find_attribute_value<'a>(attribute: Node<'_>, source: &'a [u8]) -> Option<&'a str> {
    let mut stack = vec![attribute];
    while let Some(node) = stack.pop() {
        if node.kind() == ATTRIBUTE_VALUE {
            return Some(node_text(node, source));
        }
        for child in named_children(node).into_iter().rev() {
            stack.push(child);
        }
    }
    None
}

fn attr<'a>(attrs: &'a [(String, &'a str)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| *v)
        .filter(|v| !v.is_empty())
}
