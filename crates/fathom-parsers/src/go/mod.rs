//! Go front-end.
//!
//! Extracts the package clause, imports (named, blank, and dot aliases),
//! functions, methods with normalized receivers, type declarations
//! (structs with fields, interfaces with method signatures, aliases and
//! named types), and top-level vars/consts. After collection, methods are
//! associated back onto their receiver types so structural interface
//! matching downstream can compare method sets.

#[cfg(test)]
mod tests;

use tokio_util::sync::CancellationToken;
use tree_sitter::Node;

use fathom_core::config::ParserLimits;
use fathom_core::error::ParseError;
use fathom_core::types::{
    Import, Language, MethodSignature, ParseResult, Symbol, SymbolKind,
};

use crate::calls::{extract_calls, GO_CALLS};
use crate::parser::{check_input, finish, Parser};
use crate::treesitter::{
    collect_syntax_errors, doc_comment_above, end_line, location_of, named_children, node_text,
    one_line, parse_source, start_line,
};

// Grammar node kinds. Private to this module; the public boundary speaks
// Symbol/Import/CallSite only.
const PACKAGE_CLAUSE: &str = "package_clause";
const IMPORT_DECLARATION: &str = "import_declaration";
const IMPORT_SPEC: &str = "import_spec";
const FUNCTION_DECLARATION: &str = "function_declaration";
const METHOD_DECLARATION: &str = "method_declaration";
const TYPE_DECLARATION: &str = "type_declaration";
const TYPE_SPEC: &str = "type_spec";
const TYPE_ALIAS: &str = "type_alias";
const STRUCT_TYPE: &str = "struct_type";
const INTERFACE_TYPE: &str = "interface_type";
const FIELD_DECLARATION: &str = "field_declaration";
const FIELD_IDENTIFIER: &str = "field_identifier";
const METHOD_ELEM: &str = "method_elem";
const METHOD_SPEC: &str = "method_spec";
const VAR_DECLARATION: &str = "var_declaration";
const VAR_SPEC: &str = "var_spec";
const CONST_DECLARATION: &str = "const_declaration";
const CONST_SPEC: &str = "const_spec";
const PARAMETER_LIST: &str = "parameter_list";
const PARAMETER_DECLARATION: &str = "parameter_declaration";
const VARIADIC_PARAMETER_DECLARATION: &str = "variadic_parameter_declaration";
const POINTER_TYPE: &str = "pointer_type";
const BLANK_IDENTIFIER: &str = "blank_identifier";
const DOT: &str = "dot";

pub struct GoParser {
    limits: ParserLimits,
}

impl GoParser {
    pub fn new(limits: ParserLimits) -> Self {
        Self { limits }
    }
}

impl Parser for GoParser {
    fn language(&self) -> Language {
        Language::Go
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn parse(
        &self,
        ctx: &CancellationToken,
        content: &[u8],
        file_path: &str,
    ) -> Result<ParseResult, ParseError> {
        let input = check_input(ctx, content, file_path, &self.limits)?;
        let source = input.source;
        let tree = parse_source(&tree_sitter_go::LANGUAGE.into(), source)?;
        let root = tree.root_node();
        let bytes = source.as_bytes();

        let mut errors = collect_syntax_errors(root, bytes);
        let mut symbols: Vec<Symbol> = Vec::new();
        let mut imports: Vec<Import> = Vec::new();
        let mut package = String::new();

        for node in named_children(root) {
            match node.kind() {
                PACKAGE_CLAUSE => {
                    if let Some(sym) = self.package_symbol(node, bytes, file_path) {
                        package = sym.name.clone();
                        symbols.push(sym);
                    } else {
                        errors.push(format!(
                            "package clause without identifier at line {}",
                            start_line(node)
                        ));
                    }
                }
                IMPORT_DECLARATION => {
                    collect_imports(node, bytes, file_path, &mut imports);
                }
                FUNCTION_DECLARATION => {
                    match self.function_symbol(ctx, node, bytes, file_path, &package, &mut errors) {
                        Ok(Some(sym)) => symbols.push(sym),
                        Ok(None) => {}
                        Err(e) => return Err(e),
                    }
                }
                METHOD_DECLARATION => {
                    match self.method_symbol(ctx, node, bytes, file_path, &package, &mut errors) {
                        Ok(Some(sym)) => symbols.push(sym),
                        Ok(None) => {}
                        Err(e) => return Err(e),
                    }
                }
                TYPE_DECLARATION => {
                    for spec in named_children(node) {
                        if spec.kind() == TYPE_SPEC || spec.kind() == TYPE_ALIAS {
                            if let Some(sym) =
                                self.type_symbol(node, spec, bytes, file_path, &package, &mut errors)
                            {
                                symbols.push(sym);
                            }
                        }
                    }
                }
                VAR_DECLARATION => {
                    collect_value_specs(
                        node, VAR_SPEC, SymbolKind::Variable, bytes, file_path, &package,
                        &mut symbols,
                    );
                }
                CONST_DECLARATION => {
                    collect_value_specs(
                        node, CONST_SPEC, SymbolKind::Constant, bytes, file_path, &package,
                        &mut symbols,
                    );
                }
                _ => {}
            }
        }

        associate_receiver_methods(&mut symbols);

        finish(ctx, file_path, Language::Go, input.hash, symbols, imports, errors)
    }
}

impl GoParser {
    fn package_symbol(&self, node: Node<'_>, source: &[u8], file_path: &str) -> Option<Symbol> {
        let ident = named_children(node)
            .into_iter()
            .find(|c| c.kind() == "package_identifier")?;
        let name = node_text(ident, source);
        if name.is_empty() {
            return None;
        }
        let mut sym = Symbol::new(
            name,
            SymbolKind::Package,
            file_path,
            Language::Go,
            start_line(node),
            end_line(node),
            node.start_position().column as u32,
            node.end_position().column as u32,
        );
        sym.signature = format!("package {name}");
        sym.exported = true;
        sym.package = name.to_string();
        sym.doc_comment = doc_comment_above(node, source);
        Some(sym)
    }

    fn function_symbol(
        &self,
        ctx: &CancellationToken,
        node: Node<'_>,
        source: &[u8],
        file_path: &str,
        package: &str,
        errors: &mut Vec<String>,
    ) -> Result<Option<Symbol>, ParseError> {
        let Some(name_node) = node.child_by_field_name("name") else {
            errors.push(format!("function without name at line {}", start_line(node)));
            return Ok(None);
        };
        let name = node_text(name_node, source);
        if name.is_empty() {
            errors.push(format!("function without name at line {}", start_line(node)));
            return Ok(None);
        }
        let mut sym = symbol_for_decl(node, name, SymbolKind::Function, source, file_path);
        sym.package = package.to_string();
        if let Some(body) = node.child_by_field_name("body") {
            sym.calls = extract_calls(ctx, body, source, file_path, &GO_CALLS, &self.limits)?;
        }
        Ok(Some(sym))
    }

    fn method_symbol(
        &self,
        ctx: &CancellationToken,
        node: Node<'_>,
        source: &[u8],
        file_path: &str,
        package: &str,
        errors: &mut Vec<String>,
    ) -> Result<Option<Symbol>, ParseError> {
        let Some(name_node) = node.child_by_field_name("name") else {
            errors.push(format!("method without name at line {}", start_line(node)));
            return Ok(None);
        };
        let name = node_text(name_node, source);
        if name.is_empty() {
            errors.push(format!("method without name at line {}", start_line(node)));
            return Ok(None);
        }
        let mut sym = symbol_for_decl(node, name, SymbolKind::Method, source, file_path);
        sym.package = package.to_string();
        match node
            .child_by_field_name("receiver")
            .and_then(|r| receiver_type_name(r, source))
        {
            Some(receiver) => sym.receiver = receiver,
            None => {
                errors.push(format!(
                    "method {name} without resolvable receiver at line {}",
                    start_line(node)
                ));
                return Ok(None);
            }
        }
        if let Some(body) = node.child_by_field_name("body") {
            sym.calls = extract_calls(ctx, body, source, file_path, &GO_CALLS, &self.limits)?;
        }
        Ok(Some(sym))
    }

    fn type_symbol(
        &self,
        decl: Node<'_>,
        spec: Node<'_>,
        source: &[u8],
        file_path: &str,
        package: &str,
        errors: &mut Vec<String>,
    ) -> Option<Symbol> {
        let Some(name_node) = spec.child_by_field_name("name") else {
            errors.push(format!("type spec without name at line {}", start_line(spec)));
            return None;
        };
        let name = node_text(name_node, source);
        if name.is_empty() {
            errors.push(format!("type spec without name at line {}", start_line(spec)));
            return None;
        }
        let type_node = spec.child_by_field_name("type");
        let kind = match type_node.map(|t| t.kind()) {
            Some(STRUCT_TYPE) => SymbolKind::Struct,
            Some(INTERFACE_TYPE) => SymbolKind::Interface,
            _ => SymbolKind::Type,
        };

        let mut sym = Symbol::new(
            name,
            kind,
            file_path,
            Language::Go,
            start_line(spec),
            end_line(spec),
            spec.start_position().column as u32,
            spec.end_position().column as u32,
        );
        sym.exported = is_exported_go(name);
        sym.package = package.to_string();
        sym.signature = one_line(&format!("type {}", node_text(spec, source)));
        // Doc comments attach to the enclosing `type` declaration.
        sym.doc_comment = doc_comment_above(decl, source);

        if let Some(type_node) = type_node {
            match kind {
                SymbolKind::Struct => {
                    sym.children = struct_fields(type_node, source, file_path, package);
                }
                SymbolKind::Interface => {
                    let (children, signatures) =
                        interface_methods(type_node, name, source, file_path, package);
                    sym.children = children;
                    if !signatures.is_empty() {
                        sym.metadata_mut().methods = signatures;
                    }
                }
                _ => {}
            }
        }
        Some(sym)
    }
}

/// Shared shaping for function-like declarations: range, signature up to
/// the body, visibility, and doc comment.
fn symbol_for_decl(
    node: Node<'_>,
    name: &str,
    kind: SymbolKind,
    source: &[u8],
    file_path: &str,
) -> Symbol {
    let mut sym = Symbol::new(
        name,
        kind,
        file_path,
        Language::Go,
        start_line(node),
        end_line(node),
        node.start_position().column as u32,
        node.end_position().column as u32,
    );
    sym.signature = declaration_signature(node, source);
    sym.exported = is_exported_go(name);
    sym.doc_comment = doc_comment_above(node, source);
    sym
}

/// The declaration text up to (not including) the body, one-lined.
fn declaration_signature(node: Node<'_>, source: &[u8]) -> String {
    let end = node
        .child_by_field_name("body")
        .map(|b| b.start_byte())
        .unwrap_or_else(|| node.end_byte());
    let slice = &source[node.start_byte()..end];
    one_line(std::str::from_utf8(slice).unwrap_or(""))
}

fn is_exported_go(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

fn collect_imports(node: Node<'_>, source: &[u8], file_path: &str, imports: &mut Vec<Import>) {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.kind() == IMPORT_SPEC {
            let Some(path_node) = current.child_by_field_name("path") else {
                continue;
            };
            let path = node_text(path_node, source).trim_matches('"').to_string();
            let alias = current
                .child_by_field_name("name")
                .map(|n| match n.kind() {
                    BLANK_IDENTIFIER => "_".to_string(),
                    DOT => ".".to_string(),
                    _ => node_text(n, source).to_string(),
                })
                .unwrap_or_default();
            imports.push(Import {
                path,
                alias,
                location: location_of(current, file_path),
                ..Import::default()
            });
            continue;
        }
        for child in named_children(current).into_iter().rev() {
            stack.push(child);
        }
    }
}

/// `(v *Type)` → `Type`: strip the variable, the pointer, and any type
/// parameter list.
fn receiver_type_name(receiver: Node<'_>, source: &[u8]) -> Option<String> {
    let decl = named_children(receiver)
        .into_iter()
        .find(|c| c.kind() == PARAMETER_DECLARATION)?;
    let mut type_node = decl.child_by_field_name("type")?;
    if type_node.kind() == POINTER_TYPE {
        type_node = type_node.named_child(0)?;
    }
    let text = node_text(type_node, source);
    let bare = text.trim_start_matches('*');
    let bare = bare.split('[').next().unwrap_or(bare);
    if bare.is_empty() {
        None
    } else {
        Some(bare.to_string())
    }
}

fn struct_fields(
    struct_type: Node<'_>,
    source: &[u8],
    file_path: &str,
    package: &str,
) -> Vec<Symbol> {
    let mut fields = Vec::new();
    let Some(list) = named_children(struct_type)
        .into_iter()
        .find(|c| c.kind() == "field_declaration_list")
    else {
        return fields;
    };
    for decl in named_children(list) {
        if decl.kind() != FIELD_DECLARATION {
            continue;
        }
        let names: Vec<&str> = named_children(decl)
            .into_iter()
            .filter(|c| c.kind() == FIELD_IDENTIFIER)
            .map(|c| node_text(c, source))
            .collect();
        if names.is_empty() {
            // Embedded field: the type stands in for the name.
            if let Some(type_node) = decl.child_by_field_name("type") {
                let text = node_text(type_node, source);
                let bare = text.trim_start_matches('*');
                let bare = bare.rsplit('.').next().unwrap_or(bare);
                if !bare.is_empty() {
                    fields.push(field_symbol(decl, bare, source, file_path, package));
                }
            }
            continue;
        }
        for name in names {
            fields.push(field_symbol(decl, name, source, file_path, package));
        }
    }
    fields
}

fn field_symbol(
    decl: Node<'_>,
    name: &str,
    source: &[u8],
    file_path: &str,
    package: &str,
) -> Symbol {
    let mut sym = Symbol::new(
        name,
        SymbolKind::Field,
        file_path,
        Language::Go,
        start_line(decl),
        end_line(decl),
        decl.start_position().column as u32,
        decl.end_position().column as u32,
    );
    sym.signature = one_line(node_text(decl, source));
    sym.exported = is_exported_go(name);
    sym.package = package.to_string();
    sym
}

fn interface_methods(
    interface_type: Node<'_>,
    interface_name: &str,
    source: &[u8],
    file_path: &str,
    package: &str,
) -> (Vec<Symbol>, Vec<MethodSignature>) {
    let mut children = Vec::new();
    let mut signatures = Vec::new();
    for elem in named_children(interface_type) {
        if elem.kind() != METHOD_ELEM && elem.kind() != METHOD_SPEC {
            continue;
        }
        let Some(name_node) = elem.child_by_field_name("name") else {
            continue;
        };
        let name = node_text(name_node, source);
        if name.is_empty() {
            continue;
        }
        let param_count = elem
            .child_by_field_name("parameters")
            .map(|p| count_parameters(p))
            .unwrap_or(0);
        let return_count = elem
            .child_by_field_name("result")
            .map(|r| count_results(r))
            .unwrap_or(0);

        let mut sym = Symbol::new(
            name,
            SymbolKind::Method,
            file_path,
            Language::Go,
            start_line(elem),
            end_line(elem),
            elem.start_position().column as u32,
            elem.end_position().column as u32,
        );
        sym.signature = one_line(node_text(elem, source));
        sym.exported = is_exported_go(name);
        sym.receiver = interface_name.to_string();
        sym.package = package.to_string();
        children.push(sym);

        signatures.push(MethodSignature {
            name: name.to_string(),
            params: elem
                .child_by_field_name("parameters")
                .map(|p| one_line(node_text(p, source)))
                .unwrap_or_default(),
            returns: elem
                .child_by_field_name("result")
                .map(|r| one_line(node_text(r, source)))
                .unwrap_or_default(),
            param_count,
            return_count,
            receiver_type: interface_name.to_string(),
        });
    }
    (children, signatures)
}

fn count_parameters(list: Node<'_>) -> u32 {
    let mut count = 0u32;
    for decl in named_children(list) {
        if decl.kind() != PARAMETER_DECLARATION && decl.kind() != VARIADIC_PARAMETER_DECLARATION {
            continue;
        }
        let names = named_children(decl)
            .into_iter()
            .filter(|c| c.kind() == "identifier")
            .count() as u32;
        count += names.max(1);
    }
    count
}

fn count_results(result: Node<'_>) -> u32 {
    if result.kind() == PARAMETER_LIST {
        count_parameters(result)
    } else {
        1
    }
}

/// Populate each receiver type's `metadata.methods` from the method
/// symbols collected in the same file.
fn associate_receiver_methods(symbols: &mut [Symbol]) {
    let mut method_sigs: Vec<(String, MethodSignature)> = Vec::new();
    for sym in symbols.iter() {
        if sym.kind != SymbolKind::Method || sym.receiver.is_empty() {
            continue;
        }
        let (param_count, return_count) = counts_from_signature(&sym.signature);
        method_sigs.push((
            sym.receiver.clone(),
            MethodSignature {
                name: sym.name.clone(),
                params: String::new(),
                returns: String::new(),
                param_count,
                return_count,
                receiver_type: sym.receiver.clone(),
            },
        ));
    }
    for sym in symbols.iter_mut() {
        if !matches!(sym.kind, SymbolKind::Struct | SymbolKind::Type) {
            continue;
        }
        let mine: Vec<MethodSignature> = method_sigs
            .iter()
            .filter(|(receiver, _)| *receiver == sym.name)
            .map(|(_, sig)| sig.clone())
            .collect();
        if !mine.is_empty() {
            sym.metadata_mut().methods = mine;
        }
    }
}

/// Parse param/return counts back out of a rendered Go signature. The
/// receiver's parenthesized group is skipped.
fn counts_from_signature(signature: &str) -> (u32, u32) {
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = signature;
    while let Some(open) = rest.find('(') {
        let Some(close) = matching_paren(&rest[open..]) else {
            break;
        };
        groups.push(&rest[open + 1..open + close]);
        rest = &rest[open + close + 1..];
    }
    // method signature shape: (receiver) name(params) [results]
    let (params, tail_start) = if groups.len() >= 2 {
        (groups[1], 2)
    } else if groups.len() == 1 {
        (groups[0], 1)
    } else {
        return (0, 0);
    };
    let param_count = count_go_param_group(params);
    let return_count = if groups.len() > tail_start {
        count_go_param_group(groups[tail_start]).max(1)
    } else {
        // A bare (non-parenthesized) single result after the params.
        let after = rest.trim();
        if after.is_empty() {
            0
        } else {
            1
        }
    };
    (param_count, return_count)
}

fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn count_go_param_group(group: &str) -> u32 {
    let trimmed = group.trim();
    if trimmed.is_empty() {
        return 0;
    }
    let mut count = 0u32;
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, ch) in trimmed.char_indices() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                count += names_in_segment(&trimmed[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    count += names_in_segment(&trimmed[start..]);
    count
}

/// `a, b int` style grouped names each count once; a bare type counts once.
fn names_in_segment(segment: &str) -> u32 {
    if segment.trim().is_empty() {
        0
    } else {
        1
    }
}

fn collect_value_specs(
    decl: Node<'_>,
    spec_kind: &str,
    kind: SymbolKind,
    source: &[u8],
    file_path: &str,
    package: &str,
    symbols: &mut Vec<Symbol>,
) {
    let mut stack = vec![decl];
    while let Some(node) = stack.pop() {
        if node.kind() == spec_kind {
            for name_node in named_children(node)
                .into_iter()
                .filter(|c| c.kind() == "identifier")
            {
                let name = node_text(name_node, source);
                if name.is_empty() {
                    continue;
                }
                let mut sym = Symbol::new(
                    name,
                    kind,
                    file_path,
                    Language::Go,
                    start_line(node),
                    end_line(node),
                    node.start_position().column as u32,
                    node.end_position().column as u32,
                );
                sym.signature = one_line(node_text(node, source));
                sym.exported = is_exported_go(name);
                sym.package = package.to_string();
                sym.doc_comment = doc_comment_above(decl, source);
                symbols.push(sym);
            }
            continue;
        }
        for child in named_children(node).into_iter().rev() {
            stack.push(child);
        }
    }
}
