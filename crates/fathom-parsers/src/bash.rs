//! Bash front-end.
//!
//! Extracts function definitions (both `name() {}` and `function name {}`
//! forms), top-level variable assignments (plain, `readonly`, `export`,
//! `declare`), and `alias` commands.

use tokio_util::sync::CancellationToken;
use tree_sitter::Node;

use fathom_core::config::ParserLimits;
use fathom_core::error::ParseError;
use fathom_core::types::{Language, ParseResult, Symbol, SymbolKind};

use crate::parser::{check_input, finish, Parser};
use crate::treesitter::{
    collect_syntax_errors, doc_comment_above, end_line, named_children, node_text, one_line,
    parse_source, start_line,
};

const FUNCTION_DEFINITION: &str = "function_definition";
const VARIABLE_ASSIGNMENT: &str = "variable_assignment";
const DECLARATION_COMMAND: &str = "declaration_command";
const COMMAND: &str = "command";
const VARIABLE_NAME: &str = "variable_name";

pub struct BashParser {
    limits: ParserLimits,
}

impl BashParser {
    pub fn new(limits: ParserLimits) -> Self {
        Self { limits }
    }
}

impl Parser for BashParser {
    fn language(&self) -> Language {
        Language::Bash
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["sh", "bash"]
    }

    fn parse(
        &self,
        ctx: &CancellationToken,
        content: &[u8],
        file_path: &str,
    ) -> Result<ParseResult, ParseError> {
        let input = check_input(ctx, content, file_path, &self.limits)?;
        let tree = parse_source(&tree_sitter_bash::LANGUAGE.into(), input.source)?;
        let root = tree.root_node();
        let bytes = input.source.as_bytes();

        let errors = collect_syntax_errors(root, bytes);
        let mut symbols: Vec<Symbol> = Vec::new();

        for node in named_children(root) {
            match node.kind() {
                FUNCTION_DEFINITION => {
                    if let Some(sym) = function_symbol(node, bytes, file_path) {
                        symbols.push(sym);
                    }
                }
                VARIABLE_ASSIGNMENT => {
                    if let Some(sym) =
                        assignment_symbol(node, SymbolKind::Variable, false, &[], bytes, file_path)
                    {
                        symbols.push(sym);
                    }
                }
                DECLARATION_COMMAND => {
                    declaration_symbols(node, bytes, file_path, &mut symbols);
                }
                COMMAND => {
                    alias_symbols(node, bytes, file_path, &mut symbols);
                }
                _ => {}
            }
        }

        finish(ctx, file_path, Language::Bash, input.hash, symbols, vec![], errors)
    }
}

fn function_symbol(node: Node<'_>, source: &[u8], file_path: &str) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, source);
    if name.is_empty() {
        return None;
    }
    let mut sym = Symbol::new(
        name,
        SymbolKind::Function,
        file_path,
        Language::Bash,
        start_line(node),
        end_line(node),
        node.start_position().column as u32,
        node.end_position().column as u32,
    );
    sym.signature = format!("{name}()");
    sym.doc_comment = doc_comment_above(node, source);
    Some(sym)
}

fn assignment_symbol(
    node: Node<'_>,
    kind: SymbolKind,
    exported: bool,
    flags: &[String],
    source: &[u8],
    file_path: &str,
) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, source);
    if name.is_empty() {
        return None;
    }
    let mut sym = Symbol::new(
        name,
        kind,
        file_path,
        Language::Bash,
        start_line(node),
        end_line(node),
        node.start_position().column as u32,
        node.end_position().column as u32,
    );
    sym.signature = one_line(node_text(node, source));
    sym.exported = exported;
    if !flags.is_empty() {
        sym.metadata_mut().decorators = flags.to_vec();
    }
    Some(sym)
}

/// `declare`/`readonly`/`export`/`local` statements. The keyword decides
/// the symbol kind and visibility; option flags ride along as metadata.
fn declaration_symbols(
    node: Node<'_>,
    source: &[u8],
    file_path: &str,
    symbols: &mut Vec<Symbol>,
) {
    let keyword = node
        .child(0)
        .map(|c| node_text(c, source))
        .unwrap_or("");
    let (kind, exported) = match keyword {
        "readonly" => (SymbolKind::Constant, false),
        "export" => (SymbolKind::Variable, true),
        _ => (SymbolKind::Variable, false),
    };
    let flags: Vec<String> = named_children(node)
        .into_iter()
        .filter(|c| c.kind() == "word" && node_text(*c, source).starts_with('-'))
        .map(|c| node_text(c, source).to_string())
        .collect();

    for child in named_children(node) {
        match child.kind() {
            VARIABLE_ASSIGNMENT => {
                if let Some(sym) =
                    assignment_symbol(child, kind, exported, &flags, source, file_path)
                {
                    symbols.push(sym);
                }
            }
            VARIABLE_NAME => {
                let name = node_text(child, source);
                if name.is_empty() {
                    continue;
                }
                let mut sym = Symbol::new(
                    name,
                    kind,
                    file_path,
                    Language::Bash,
                    start_line(node),
                    end_line(node),
                    node.start_position().column as u32,
                    node.end_position().column as u32,
                );
                sym.signature = one_line(node_text(node, source));
                sym.exported = exported;
                if !flags.is_empty() {
                    sym.metadata_mut().decorators = flags.clone();
                }
                symbols.push(sym);
            }
            _ => {}
        }
    }
}

fn alias_symbols(node: Node<'_>, source: &[u8], file_path: &str, symbols: &mut Vec<Symbol>) {
    let is_alias = node
        .child_by_field_name("name")
        .is_some_and(|n| node_text(n, source) == "alias");
    if !is_alias {
        return;
    }
    let name_id = node.child_by_field_name("name").map(|n| n.id()).unwrap_or(0);
    for arg in named_children(node) {
        if arg.id() == name_id {
            continue;
        }
        let text = node_text(arg, source);
        let Some(alias_name) = text.split('=').next() else {
            continue;
        };
        if alias_name.is_empty() || !text.contains('=') {
            continue;
        }
        let mut sym = Symbol::new(
            alias_name,
            SymbolKind::Alias,
            file_path,
            Language::Bash,
            start_line(node),
            end_line(node),
            node.start_position().column as u32,
            node.end_position().column as u32,
        );
        sym.signature = one_line(node_text(node, source));
        symbols.push(sym);
    }
}
