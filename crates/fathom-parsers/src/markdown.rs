//! Markdown front-end.
//!
//! Extracts ATX and Setext headings, fenced code blocks (with their info
//! language), lists, and link reference definitions from the block
//! grammar. Inline content is never parsed separately; heading text comes
//! from the block tree's `inline` nodes.

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

const ATX_HEADING: &str = "atx_heading";
const SETEXT_HEADING: &str = "setext_heading";
const FENCED_CODE_BLOCK: &str = "fenced_code_block";
const LIST: &str = "list";
const LINK_REFERENCE_DEFINITION: &str = "link_reference_definition";
const INLINE: &str = "inline";
const INFO_STRING: &str = "info_string";
const LINK_LABEL: &str = "link_label";
const LINK_DESTINATION: &str = "link_destination";
const PARAGRAPH: &str = "paragraph";

pub struct MarkdownParser {
    limits: ParserLimits,
}

impl MarkdownParser {
    pub fn new(limits: ParserLimits) -> Self {
        Self { limits }
    }
}

impl Parser for MarkdownParser {
    fn language(&self) -> Language {
        Language::Markdown
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["md", "markdown"]
    }

    fn parse(
        &self,
        ctx: &CancellationToken,
        content: &[u8],
        file_path: &str,
    ) -> Result<ParseResult, ParseError> {
        let input = check_input(ctx, content, file_path, &self.limits)?;
        let tree = parse_source(&tree_sitter_md::LANGUAGE.into(), input.source)?;
        let root = tree.root_node();
        let bytes = input.source.as_bytes();

        let errors = collect_syntax_errors(root, bytes);
        let mut symbols: Vec<Symbol> = Vec::new();

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node.kind() {
                ATX_HEADING | SETEXT_HEADING => {
                    if let Some(sym) = heading_symbol(node, bytes, file_path) {
                        symbols.push(sym);
                    }
                }
                FENCED_CODE_BLOCK => {
                    symbols.push(code_block_symbol(node, bytes, file_path));
                    continue;
                }
                LIST => {
                    symbols.push(md_symbol(node, "list", SymbolKind::List, file_path));
                    continue;
                }
                LINK_REFERENCE_DEFINITION => {
                    if let Some(sym) = link_symbol(node, bytes, file_path) {
                        symbols.push(sym);
                    }
                    continue;
                }
                _ => {}
            }
            for child in named_children(node).into_iter().rev() {
                stack.push(child);
            }
        }

        finish(ctx, file_path, Language::Markdown, input.hash, symbols, vec![], errors)
    }
}

fn heading_symbol(node: Node<'_>, source: &[u8], file_path: &str) -> Option<Symbol> {
    let text_node = if node.kind() == ATX_HEADING {
        named_children(node).into_iter().find(|c| c.kind() == INLINE)
    } else {
        named_children(node)
            .into_iter()
            .find(|c| c.kind() == PARAGRAPH)
    };
    let name = text_node
        .map(|t| one_line(node_text(t, source)))
        .unwrap_or_default();
    if name.is_empty() {
        return None;
    }
    let mut sym = md_symbol(node, &name, SymbolKind::Heading, file_path);
    sym.signature = one_line(node_text(node, source));
    Some(sym)
}

fn code_block_symbol(node: Node<'_>, source: &[u8], file_path: &str) -> Symbol {
    let language = named_children(node)
        .into_iter()
        .find(|c| c.kind() == INFO_STRING)
        .map(|i| one_line(node_text(i, source)))
        .unwrap_or_default();
    let name = if language.is_empty() { "code" } else { &language };
    let mut sym = md_symbol(node, name, SymbolKind::CodeBlock, file_path);
    sym.signature = format!("```{language}");
    sym
}

fn link_symbol(node: Node<'_>, source: &[u8], file_path: &str) -> Option<Symbol> {
    let label = named_children(node)
        .into_iter()
        .find(|c| c.kind() == LINK_LABEL)?;
    let name = node_text(label, source)
        .trim_matches(|c| c == '[' || c == ']')
        .to_string();
    if name.is_empty() {
        return None;
    }
    let destination = named_children(node)
        .into_iter()
        .find(|c| c.kind() == LINK_DESTINATION)
        .map(|d| node_text(d, source).to_string())
        .unwrap_or_default();
    let mut sym = md_symbol(node, &name, SymbolKind::Link, file_path);
    sym.signature = format!("[{name}]: {destination}");
    Some(sym)
}

fn md_symbol(node: Node<'_>, name: &str, kind: SymbolKind, file_path: &str) -> Symbol {
    let mut sym = Symbol::new(
        name,
        kind,
        file_path,
        Language::Markdown,
        start_line(node),
        end_line(node),
        node.start_position().column as u32,
        node.end_position().column as u32,
    );
    sym.exported = true;
    sym
}
