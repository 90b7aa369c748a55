//! Python front-end.
//!
//! Extracts the module docstring as a synthetic package symbol, every
//! import form, functions (sync and async, nested functions as children),
//! decorated definitions, classes with their methods, and module-level
//! assignments. Classes whose bases include `Protocol` or `ABC` are
//! reclassified as interfaces and carry their method set in
//! `metadata.methods` for structural matching against implementors.

mod helpers;
#[cfg(test)]
mod tests;

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tree_sitter::Node;

use fathom_core::config::ParserLimits;
use fathom_core::error::ParseError;
use fathom_core::types::{
    Import, Language, MethodSignature, ParseResult, Symbol, SymbolKind,
};

use crate::calls::{extract_calls, PYTHON_CALLS};
use crate::parser::{check_input, finish, Parser};
use crate::treesitter::{
    collect_syntax_errors, end_line, location_of, named_children, node_text, one_line,
    parse_source, start_line,
};

use helpers::{
    decorator_name, is_all_caps, is_protocol_base, is_public_python, module_docstring,
    param_count_of, strip_trailing_colon,
};

const IMPORT_STATEMENT: &str = "import_statement";
const IMPORT_FROM_STATEMENT: &str = "import_from_statement";
const FUNCTION_DEFINITION: &str = "function_definition";
const CLASS_DEFINITION: &str = "class_definition";
const DECORATED_DEFINITION: &str = "decorated_definition";
const EXPRESSION_STATEMENT: &str = "expression_statement";
const ASSIGNMENT: &str = "assignment";
const ALIASED_IMPORT: &str = "aliased_import";
const WILDCARD_IMPORT: &str = "wildcard_import";

pub struct PythonParser {
    limits: ParserLimits,
}

impl PythonParser {
    pub fn new(limits: ParserLimits) -> Self {
        Self { limits }
    }
}

impl Parser for PythonParser {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py", "pyi"]
    }

    fn parse(
        &self,
        ctx: &CancellationToken,
        content: &[u8],
        file_path: &str,
    ) -> Result<ParseResult, ParseError> {
        let input = check_input(ctx, content, file_path, &self.limits)?;
        let source = input.source;
        let tree = parse_source(&tree_sitter_python::LANGUAGE.into(), source)?;
        let root = tree.root_node();
        let bytes = source.as_bytes();

        let mut errors = collect_syntax_errors(root, bytes);
        let mut symbols: Vec<Symbol> = Vec::new();
        let mut imports: Vec<Import> = Vec::new();

        if let Some(docstring) = module_docstring(root, bytes) {
            let module_name = Path::new(file_path)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("module");
            let mut sym = Symbol::new(
                module_name,
                SymbolKind::Package,
                file_path,
                Language::Python,
                1,
                end_line(root).max(1),
                0,
                0,
            );
            sym.doc_comment = docstring;
            sym.exported = true;
            symbols.push(sym);
        }

        for node in named_children(root) {
            match node.kind() {
                IMPORT_STATEMENT => collect_plain_imports(node, bytes, file_path, &mut imports),
                IMPORT_FROM_STATEMENT => {
                    collect_from_import(node, bytes, file_path, &mut imports, &mut errors)
                }
                FUNCTION_DEFINITION => {
                    if let Some(sym) =
                        self.function_symbol(ctx, node, bytes, file_path, &[], false)?
                    {
                        symbols.push(sym);
                    } else {
                        errors.push(format!("function without name at line {}", start_line(node)));
                    }
                }
                DECORATED_DEFINITION => {
                    if let Some(sym) =
                        self.decorated_symbol(ctx, node, bytes, file_path, &mut errors)?
                    {
                        symbols.push(sym);
                    }
                }
                CLASS_DEFINITION => {
                    if let Some(sym) = self.class_symbol(ctx, node, bytes, file_path, &[])? {
                        symbols.push(sym);
                    } else {
                        errors.push(format!("class without name at line {}", start_line(node)));
                    }
                }
                EXPRESSION_STATEMENT => {
                    collect_module_assignment(node, bytes, file_path, &mut symbols);
                }
                _ => {}
            }
        }

        finish(ctx, file_path, Language::Python, input.hash, symbols, imports, errors)
    }
}

impl PythonParser {
    fn decorated_symbol(
        &self,
        ctx: &CancellationToken,
        node: Node<'_>,
        source: &[u8],
        file_path: &str,
        errors: &mut Vec<String>,
    ) -> Result<Option<Symbol>, ParseError> {
        let decorators: Vec<String> = named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "decorator")
            .map(|d| decorator_name(node_text(d, source)))
            .collect();
        let Some(definition) = node.child_by_field_name("definition") else {
            errors.push(format!(
                "decorated definition without body at line {}",
                start_line(node)
            ));
            return Ok(None);
        };
        match definition.kind() {
            FUNCTION_DEFINITION => {
                self.function_symbol(ctx, definition, source, file_path, &decorators, false)
            }
            CLASS_DEFINITION => {
                self.class_symbol(ctx, definition, source, file_path, &decorators)
            }
            other => {
                errors.push(format!(
                    "unrecognized decorated node {other} at line {}",
                    start_line(node)
                ));
                Ok(None)
            }
        }
    }

    fn function_symbol(
        &self,
        ctx: &CancellationToken,
        node: Node<'_>,
        source: &[u8],
        file_path: &str,
        decorators: &[String],
        in_class: bool,
    ) -> Result<Option<Symbol>, ParseError> {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .unwrap_or("");
        if name.is_empty() {
            return Ok(None);
        }
        let is_async = node
            .child(0)
            .is_some_and(|c| node_text(c, source) == "async");

        let kind = if in_class {
            if decorators.iter().any(|d| d == "property") {
                SymbolKind::Property
            } else {
                SymbolKind::Method
            }
        } else {
            SymbolKind::Function
        };

        let mut sym = Symbol::new(
            name,
            kind,
            file_path,
            Language::Python,
            start_line(node),
            end_line(node),
            node.start_position().column as u32,
            node.end_position().column as u32,
        );
        sym.exported = is_public_python(name);
        sym.signature = signature_of(node, source);
        sym.doc_comment = body_docstring(node, source).unwrap_or_default();

        let is_static = decorators
            .iter()
            .any(|d| d == "staticmethod" || d == "classmethod");
        if is_async || is_static || !decorators.is_empty() {
            let meta = sym.metadata_mut();
            meta.is_async = is_async;
            meta.is_static = is_static;
            meta.decorators = decorators.to_vec();
        }

        if let Some(body) = node.child_by_field_name("body") {
            sym.calls = extract_calls(ctx, body, source, file_path, &PYTHON_CALLS, &self.limits)?;
            // Nested functions become children of the enclosing function.
            for stmt in named_children(body) {
                match stmt.kind() {
                    FUNCTION_DEFINITION => {
                        if let Some(nested) =
                            self.function_symbol(ctx, stmt, source, file_path, &[], false)?
                        {
                            sym.children.push(nested);
                        }
                    }
                    DECORATED_DEFINITION => {
                        if let Some(def) = stmt.child_by_field_name("definition") {
                            if def.kind() == FUNCTION_DEFINITION {
                                let nested_decorators: Vec<String> = named_children(stmt)
                                    .into_iter()
                                    .filter(|c| c.kind() == "decorator")
                                    .map(|d| decorator_name(node_text(d, source)))
                                    .collect();
                                if let Some(nested) = self.function_symbol(
                                    ctx,
                                    def,
                                    source,
                                    file_path,
                                    &nested_decorators,
                                    false,
                                )? {
                                    sym.children.push(nested);
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(Some(sym))
    }

    fn class_symbol(
        &self,
        ctx: &CancellationToken,
        node: Node<'_>,
        source: &[u8],
        file_path: &str,
        decorators: &[String],
    ) -> Result<Option<Symbol>, ParseError> {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .unwrap_or("");
        if name.is_empty() {
            return Ok(None);
        }

        let bases: Vec<String> = node
            .child_by_field_name("superclasses")
            .map(|args| {
                named_children(args)
                    .into_iter()
                    .map(|a| node_text(a, source).to_string())
                    .collect()
            })
            .unwrap_or_default();
        let is_interface = bases.iter().any(|b| is_protocol_base(b));

        let kind = if is_interface {
            SymbolKind::Interface
        } else {
            SymbolKind::Class
        };
        let mut sym = Symbol::new(
            name,
            kind,
            file_path,
            Language::Python,
            start_line(node),
            end_line(node),
            node.start_position().column as u32,
            node.end_position().column as u32,
        );
        sym.exported = is_public_python(name);
        sym.signature = signature_of(node, source);
        sym.doc_comment = body_docstring(node, source).unwrap_or_default();
        if !decorators.is_empty() || !bases.is_empty() {
            let meta = sym.metadata_mut();
            meta.decorators = decorators.to_vec();
            if let Some(first) = bases.first() {
                meta.extends = first.clone();
            }
        }

        let mut method_signatures: Vec<MethodSignature> = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for stmt in named_children(body) {
                let (def, method_decorators) = match stmt.kind() {
                    FUNCTION_DEFINITION => (Some(stmt), Vec::new()),
                    DECORATED_DEFINITION => {
                        let decs: Vec<String> = named_children(stmt)
                            .into_iter()
                            .filter(|c| c.kind() == "decorator")
                            .map(|d| decorator_name(node_text(d, source)))
                            .collect();
                        (
                            stmt.child_by_field_name("definition")
                                .filter(|d| d.kind() == FUNCTION_DEFINITION),
                            decs,
                        )
                    }
                    _ => (None, Vec::new()),
                };
                let Some(def) = def else { continue };
                let Some(mut method) =
                    self.function_symbol(ctx, def, source, file_path, &method_decorators, true)?
                else {
                    continue;
                };
                method.receiver = name.to_string();
                method.metadata_mut().parent_name = name.to_string();

                let is_static = method
                    .metadata
                    .as_ref()
                    .is_some_and(|m| m.is_static);
                let param_count = param_count_of(def, source, !is_static);
                let return_count = u32::from(def.child_by_field_name("return_type").is_some());
                if method.kind == SymbolKind::Method {
                    method_signatures.push(MethodSignature {
                        name: method.name.clone(),
                        params: String::new(),
                        returns: def
                            .child_by_field_name("return_type")
                            .map(|r| one_line(node_text(r, source)))
                            .unwrap_or_default(),
                        param_count,
                        return_count,
                        receiver_type: name.to_string(),
                    });
                }
                sym.children.push(method);
            }
        }
        if !method_signatures.is_empty() {
            sym.metadata_mut().methods = method_signatures;
        }
        Ok(Some(sym))
    }
}

/// `def`/`class` header text without the body or trailing colon.
fn signature_of(node: Node<'_>, source: &[u8]) -> String {
    let end = node
        .child_by_field_name("body")
        .map(|b| b.start_byte())
        .unwrap_or_else(|| node.end_byte());
    let slice = &source[node.start_byte()..end];
    strip_trailing_colon(&one_line(std::str::from_utf8(slice).unwrap_or("")))
}

/// First statement of a body when it is a bare string literal.
fn body_docstring(node: Node<'_>, source: &[u8]) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    let first = body.named_child(0)?;
    if first.kind() != EXPRESSION_STATEMENT {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    Some(node_text(expr, source).to_string())
}

fn collect_plain_imports(
    node: Node<'_>,
    source: &[u8],
    file_path: &str,
    imports: &mut Vec<Import>,
) {
    for child in named_children(node) {
        match child.kind() {
            "dotted_name" => imports.push(Import {
                path: node_text(child, source).to_string(),
                location: location_of(node, file_path),
                ..Import::default()
            }),
            ALIASED_IMPORT => {
                let path = child
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source))
                    .unwrap_or("");
                let alias = child
                    .child_by_field_name("alias")
                    .map(|a| node_text(a, source))
                    .unwrap_or("");
                imports.push(Import {
                    path: path.to_string(),
                    alias: alias.to_string(),
                    location: location_of(node, file_path),
                    ..Import::default()
                });
            }
            _ => {}
        }
    }
}

fn collect_from_import(
    node: Node<'_>,
    source: &[u8],
    file_path: &str,
    imports: &mut Vec<Import>,
    errors: &mut Vec<String>,
) {
    let Some(module) = node.child_by_field_name("module_name") else {
        errors.push(format!(
            "from-import without module at line {}",
            start_line(node)
        ));
        return;
    };
    let path = node_text(module, source).to_string();
    let is_relative = path.starts_with('.');

    let mut names: Vec<String> = Vec::new();
    let mut alias = String::new();
    let mut is_wildcard = false;

    for child in named_children(node) {
        if child.id() == module.id() {
            continue;
        }
        match child.kind() {
            "dotted_name" => names.push(node_text(child, source).to_string()),
            ALIASED_IMPORT => {
                if let Some(n) = child.child_by_field_name("name") {
                    names.push(node_text(n, source).to_string());
                }
                if let Some(a) = child.child_by_field_name("alias") {
                    alias = node_text(a, source).to_string();
                }
            }
            WILDCARD_IMPORT => is_wildcard = true,
            _ => {}
        }
    }

    imports.push(Import {
        path,
        alias,
        names,
        is_wildcard,
        is_relative,
        location: location_of(node, file_path),
        ..Import::default()
    });
}

fn collect_module_assignment(
    node: Node<'_>,
    source: &[u8],
    file_path: &str,
    symbols: &mut Vec<Symbol>,
) {
    let Some(assignment) = named_children(node)
        .into_iter()
        .find(|c| c.kind() == ASSIGNMENT)
    else {
        return;
    };
    let Some(left) = assignment.child_by_field_name("left") else {
        return;
    };
    if left.kind() != "identifier" {
        return;
    }
    let name = node_text(left, source);
    if name.is_empty() {
        return;
    }
    let kind = if is_all_caps(name) {
        SymbolKind::Constant
    } else {
        SymbolKind::Variable
    };
    let mut sym = Symbol::new(
        name,
        kind,
        file_path,
        Language::Python,
        start_line(node),
        end_line(node),
        node.start_position().column as u32,
        node.end_position().column as u32,
    );
    sym.signature = one_line(node_text(assignment, source));
    sym.exported = is_public_python(name);
    symbols.push(sym);
}
