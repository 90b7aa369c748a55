//! Shared ECMAScript extraction for the TypeScript and JavaScript
//! front-ends.
//!
//! The two grammars use the same node names for everything JavaScript can
//! express; TypeScript adds interfaces, type aliases, enums, return types,
//! and accessibility modifiers on top. One walker covers both, with the
//! TS-only shapes simply never matching under the JS grammar.

use tokio_util::sync::CancellationToken;
use tree_sitter::Node;

use fathom_core::config::ParserLimits;
use fathom_core::error::ParseError;
use fathom_core::types::{
    Import, Language, MethodSignature, Symbol, SymbolKind,
};

use crate::calls::{extract_calls, ECMA_CALLS};
use crate::treesitter::{
    doc_comment_above, end_line, location_of, named_children, node_text, one_line, start_line,
};

const IMPORT_STATEMENT: &str = "import_statement";
const EXPORT_STATEMENT: &str = "export_statement";
const FUNCTION_DECLARATION: &str = "function_declaration";
const GENERATOR_FUNCTION_DECLARATION: &str = "generator_function_declaration";
const LEXICAL_DECLARATION: &str = "lexical_declaration";
const VARIABLE_DECLARATION: &str = "variable_declaration";
const VARIABLE_DECLARATOR: &str = "variable_declarator";
const CLASS_DECLARATION: &str = "class_declaration";
const ABSTRACT_CLASS_DECLARATION: &str = "abstract_class_declaration";
const INTERFACE_DECLARATION: &str = "interface_declaration";
const TYPE_ALIAS_DECLARATION: &str = "type_alias_declaration";
const ENUM_DECLARATION: &str = "enum_declaration";
const METHOD_DEFINITION: &str = "method_definition";
const PUBLIC_FIELD_DEFINITION: &str = "public_field_definition";
const FIELD_DEFINITION: &str = "field_definition";
const METHOD_SIGNATURE: &str = "method_signature";
const PROPERTY_SIGNATURE: &str = "property_signature";
const PRIVATE_PROPERTY_IDENTIFIER: &str = "private_property_identifier";
const DECORATOR: &str = "decorator";
const ARROW_FUNCTION: &str = "arrow_function";
const FUNCTION_EXPRESSION: &str = "function_expression";
const GENERATOR_FUNCTION: &str = "generator_function";
const CALL_EXPRESSION: &str = "call_expression";
const NAMED_IMPORTS: &str = "named_imports";
const NAMESPACE_IMPORT: &str = "namespace_import";
const IMPORT_SPECIFIER: &str = "import_specifier";
const EXPORT_SPECIFIER: &str = "export_specifier";
const EXPORT_CLAUSE: &str = "export_clause";

/// Extraction output for one ECMAScript source file.
pub struct EcmaExtraction {
    pub symbols: Vec<Symbol>,
    pub imports: Vec<Import>,
    pub errors: Vec<String>,
}

pub struct EcmaWalker<'a> {
    ctx: &'a CancellationToken,
    source: &'a [u8],
    file_path: &'a str,
    language: Language,
    limits: &'a ParserLimits,
}

impl<'a> EcmaWalker<'a> {
    pub fn new(
        ctx: &'a CancellationToken,
        source: &'a [u8],
        file_path: &'a str,
        language: Language,
        limits: &'a ParserLimits,
    ) -> Self {
        Self {
            ctx,
            source,
            file_path,
            language,
            limits,
        }
    }

    pub fn extract(&self, root: Node<'_>) -> Result<EcmaExtraction, ParseError> {
        let mut out = EcmaExtraction {
            symbols: Vec::new(),
            imports: Vec::new(),
            errors: Vec::new(),
        };
        for node in named_children(root) {
            self.statement(node, false, &[], &mut out)?;
        }
        Ok(out)
    }

    fn statement(
        &self,
        node: Node<'_>,
        exported: bool,
        decorators: &[String],
        out: &mut EcmaExtraction,
    ) -> Result<(), ParseError> {
        match node.kind() {
            IMPORT_STATEMENT => self.import_statement(node, out),
            EXPORT_STATEMENT => self.export_statement(node, out)?,
            FUNCTION_DECLARATION | GENERATOR_FUNCTION_DECLARATION => {
                if let Some(sym) = self.function_symbol(node, exported, decorators)? {
                    out.symbols.push(sym);
                }
            }
            LEXICAL_DECLARATION | VARIABLE_DECLARATION => {
                self.declarators(node, exported, out)?;
            }
            CLASS_DECLARATION | ABSTRACT_CLASS_DECLARATION => {
                if let Some(sym) = self.class_symbol(node, exported, decorators)? {
                    out.symbols.push(sym);
                }
            }
            INTERFACE_DECLARATION => {
                if let Some(sym) = self.interface_symbol(node, exported) {
                    out.symbols.push(sym);
                }
            }
            TYPE_ALIAS_DECLARATION => {
                if let Some(sym) = self.simple_named_symbol(node, SymbolKind::Type, exported) {
                    out.symbols.push(sym);
                }
            }
            ENUM_DECLARATION => {
                if let Some(sym) = self.enum_symbol(node, exported) {
                    out.symbols.push(sym);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn export_statement(
        &self,
        node: Node<'_>,
        out: &mut EcmaExtraction,
    ) -> Result<(), ParseError> {
        let decorators: Vec<String> = named_children(node)
            .into_iter()
            .filter(|c| c.kind() == DECORATOR)
            .map(|d| decorator_name(node_text(d, self.source)))
            .collect();

        if let Some(declaration) = node.child_by_field_name("declaration") {
            return self.statement(declaration, true, &decorators, out);
        }

        // Re-export: `export { a, b } from "./mod"` or `export * from "./mod"`.
        if let Some(source_node) = node.child_by_field_name("source") {
            let path = strip_quotes(node_text(source_node, self.source));
            let mut names = Vec::new();
            let mut is_wildcard = false;
            for child in named_children(node) {
                match child.kind() {
                    EXPORT_CLAUSE => {
                        for spec in named_children(child) {
                            if spec.kind() == EXPORT_SPECIFIER {
                                if let Some(name) = spec.child_by_field_name("name") {
                                    names.push(node_text(name, self.source).to_string());
                                }
                            }
                        }
                    }
                    "namespace_export" => is_wildcard = true,
                    _ => {}
                }
            }
            if node
                .children(&mut node.walk())
                .any(|c| c.kind() == "*")
            {
                is_wildcard = true;
            }
            out.imports.push(Import {
                path: path.clone(),
                names,
                is_wildcard,
                is_relative: path.starts_with('.'),
                location: location_of(node, self.file_path),
                ..Import::default()
            });
            return Ok(());
        }

        // `export default <expr>`: only named function/class expressions
        // produce a symbol.
        if let Some(value) = node.child_by_field_name("value") {
            if matches!(
                value.kind(),
                FUNCTION_EXPRESSION | GENERATOR_FUNCTION | ARROW_FUNCTION
            ) {
                // Anonymous default exports carry no name to index.
                return Ok(());
            }
        }
        Ok(())
    }

    fn import_statement(&self, node: Node<'_>, out: &mut EcmaExtraction) {
        let Some(source_node) = node.child_by_field_name("source") else {
            return;
        };
        let path = strip_quotes(node_text(source_node, self.source));
        let mut import = Import {
            path: path.clone(),
            is_relative: path.starts_with('.'),
            location: location_of(node, self.file_path),
            ..Import::default()
        };
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "type" {
                import.is_type_only = true;
            }
            if child.kind() != "import_clause" {
                continue;
            }
            for clause_child in named_children(child) {
                match clause_child.kind() {
                    "identifier" => {
                        import.is_default = true;
                        import.names.push(node_text(clause_child, self.source).to_string());
                    }
                    NAMESPACE_IMPORT => {
                        import.is_namespace = true;
                        if let Some(alias) = named_children(clause_child)
                            .into_iter()
                            .find(|c| c.kind() == "identifier")
                        {
                            import.alias = node_text(alias, self.source).to_string();
                        }
                    }
                    NAMED_IMPORTS => {
                        for spec in named_children(clause_child) {
                            if spec.kind() != IMPORT_SPECIFIER {
                                continue;
                            }
                            if let Some(name) = spec.child_by_field_name("name") {
                                import.names.push(node_text(name, self.source).to_string());
                            }
                            if let Some(alias) = spec.child_by_field_name("alias") {
                                import.alias = node_text(alias, self.source).to_string();
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        out.imports.push(import);
    }

    fn declarators(
        &self,
        node: Node<'_>,
        exported: bool,
        out: &mut EcmaExtraction,
    ) -> Result<(), ParseError> {
        let is_const = node
            .child(0)
            .is_some_and(|c| node_text(c, self.source) == "const");
        for declarator in named_children(node) {
            if declarator.kind() != VARIABLE_DECLARATOR {
                continue;
            }
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            if name_node.kind() != "identifier" {
                continue;
            }
            let name = node_text(name_node, self.source);
            if name.is_empty() {
                continue;
            }
            let value = declarator.child_by_field_name("value");

            match value {
                Some(func)
                    if matches!(
                        func.kind(),
                        ARROW_FUNCTION | FUNCTION_EXPRESSION | GENERATOR_FUNCTION
                    ) =>
                {
                    let mut sym = self.base_symbol(node, name, SymbolKind::Function, exported);
                    let is_async = has_token(func, "async", self.source);
                    let is_generator = func.kind() == GENERATOR_FUNCTION;
                    if is_async || is_generator {
                        let meta = sym.metadata_mut();
                        meta.is_async = is_async;
                        meta.is_generator = is_generator;
                    }
                    if let Some(body) = func.child_by_field_name("body") {
                        sym.calls = extract_calls(
                            self.ctx,
                            body,
                            self.source,
                            self.file_path,
                            &ECMA_CALLS,
                            self.limits,
                        )?;
                    }
                    out.symbols.push(sym);
                }
                Some(call)
                    if call.kind() == CALL_EXPRESSION
                        && call
                            .child_by_field_name("function")
                            .is_some_and(|f| node_text(f, self.source) == "require") =>
                {
                    if let Some(path) = require_path(call, self.source) {
                        out.imports.push(Import {
                            path: path.clone(),
                            names: vec![name.to_string()],
                            is_common_js: true,
                            is_relative: path.starts_with('.'),
                            location: location_of(node, self.file_path),
                            ..Import::default()
                        });
                    }
                }
                _ => {
                    let kind = if is_const {
                        SymbolKind::Constant
                    } else {
                        SymbolKind::Variable
                    };
                    out.symbols.push(self.base_symbol(node, name, kind, exported));
                }
            }
        }
        Ok(())
    }

    fn function_symbol(
        &self,
        node: Node<'_>,
        exported: bool,
        decorators: &[String],
    ) -> Result<Option<Symbol>, ParseError> {
        let Some(name_node) = node.child_by_field_name("name") else {
            return Ok(None);
        };
        let name = node_text(name_node, self.source);
        if name.is_empty() {
            return Ok(None);
        }
        let mut sym = self.base_symbol(node, name, SymbolKind::Function, exported);
        let is_async = has_token(node, "async", self.source);
        let is_generator = node.kind() == GENERATOR_FUNCTION_DECLARATION;
        if is_async || is_generator || !decorators.is_empty() {
            let meta = sym.metadata_mut();
            meta.is_async = is_async;
            meta.is_generator = is_generator;
            meta.decorators = decorators.to_vec();
        }
        self.record_type_info(node, &mut sym);
        if let Some(body) = node.child_by_field_name("body") {
            sym.calls = extract_calls(
                self.ctx,
                body,
                self.source,
                self.file_path,
                &ECMA_CALLS,
                self.limits,
            )?;
        }
        Ok(Some(sym))
    }

    fn class_symbol(
        &self,
        node: Node<'_>,
        exported: bool,
        decorators: &[String],
    ) -> Result<Option<Symbol>, ParseError> {
        let Some(name_node) = node.child_by_field_name("name") else {
            return Ok(None);
        };
        let name = node_text(name_node, self.source);
        if name.is_empty() {
            return Ok(None);
        }
        let mut sym = self.base_symbol(node, name, SymbolKind::Class, exported);

        let mut all_decorators: Vec<String> = decorators.to_vec();
        all_decorators.extend(
            named_children(node)
                .into_iter()
                .filter(|c| c.kind() == DECORATOR)
                .map(|d| decorator_name(node_text(d, self.source))),
        );

        let is_abstract = node.kind() == ABSTRACT_CLASS_DECLARATION;
        let (extends, implements) = self.heritage(node);
        if is_abstract || !all_decorators.is_empty() || !extends.is_empty() || !implements.is_empty()
        {
            let meta = sym.metadata_mut();
            meta.is_abstract = is_abstract;
            meta.decorators = all_decorators;
            meta.extends = extends;
            meta.implements = implements;
        }
        self.record_type_info(node, &mut sym);

        let mut signatures: Vec<MethodSignature> = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for member in named_children(body) {
                match member.kind() {
                    METHOD_DEFINITION => {
                        if let Some(method) = self.method_symbol(member, name)? {
                            signatures.push(MethodSignature {
                                name: method.name.clone(),
                                params: String::new(),
                                returns: method
                                    .metadata
                                    .as_ref()
                                    .map(|m| m.return_type.clone())
                                    .unwrap_or_default(),
                                param_count: self.param_count(member),
                                return_count: u32::from(
                                    member.child_by_field_name("return_type").is_some(),
                                ),
                                receiver_type: name.to_string(),
                            });
                            sym.children.push(method);
                        }
                    }
                    PUBLIC_FIELD_DEFINITION | FIELD_DEFINITION => {
                        if let Some(field) = self.field_symbol(member, name) {
                            sym.children.push(field);
                        }
                    }
                    _ => {}
                }
            }
        }
        if !signatures.is_empty() {
            sym.metadata_mut().methods = signatures;
        }
        Ok(Some(sym))
    }

    fn heritage(&self, class_node: Node<'_>) -> (String, Vec<String>) {
        let mut extends = String::new();
        let mut implements = Vec::new();
        for child in named_children(class_node) {
            if child.kind() != "class_heritage" {
                continue;
            }
            for clause in named_children(child) {
                match clause.kind() {
                    "extends_clause" => {
                        if let Some(value) = clause
                            .child_by_field_name("value")
                            .or_else(|| clause.named_child(0))
                        {
                            extends = node_text(value, self.source).to_string();
                        }
                    }
                    "implements_clause" => {
                        implements.extend(
                            named_children(clause)
                                .into_iter()
                                .map(|t| node_text(t, self.source).to_string()),
                        );
                    }
                    // JS grammar: class_heritage wraps the expression directly.
                    _ => {
                        if extends.is_empty() {
                            extends = node_text(clause, self.source).to_string();
                        }
                    }
                }
            }
        }
        (extends, implements)
    }

    fn method_symbol(
        &self,
        node: Node<'_>,
        class_name: &str,
    ) -> Result<Option<Symbol>, ParseError> {
        let Some(name_node) = node.child_by_field_name("name") else {
            return Ok(None);
        };
        if name_node.kind() == "computed_property_name" {
            return Ok(None);
        }
        let name = node_text(name_node, self.source);
        if name.is_empty() {
            return Ok(None);
        }
        let is_private_hash = name_node.kind() == PRIVATE_PROPERTY_IDENTIFIER;
        let access = self.accessibility(node);
        let exported = !is_private_hash && access != "private" && access != "protected";

        let mut sym = self.base_symbol(node, name, SymbolKind::Method, exported);
        sym.receiver = class_name.to_string();
        let meta = sym.metadata_mut();
        meta.is_async = has_token(node, "async", self.source);
        meta.is_static = has_token(node, "static", self.source);
        meta.is_generator = has_token(node, "*", self.source);
        meta.is_abstract = has_token(node, "abstract", self.source);
        meta.parent_name = class_name.to_string();
        meta.access_modifier = if is_private_hash {
            "private".to_string()
        } else {
            access
        };
        if let Some(ret) = node.child_by_field_name("return_type") {
            meta.return_type = clean_type_annotation(node_text(ret, self.source));
        }
        if let Some(body) = node.child_by_field_name("body") {
            sym.calls = extract_calls(
                self.ctx,
                body,
                self.source,
                self.file_path,
                &ECMA_CALLS,
                self.limits,
            )?;
        }
        Ok(Some(sym))
    }

    fn field_symbol(&self, node: Node<'_>, class_name: &str) -> Option<Symbol> {
        let name_node = node.child_by_field_name("name")?;
        if name_node.kind() == "computed_property_name" {
            return None;
        }
        let name = node_text(name_node, self.source);
        if name.is_empty() {
            return None;
        }
        let is_private_hash = name_node.kind() == PRIVATE_PROPERTY_IDENTIFIER;
        let access = self.accessibility(node);
        let exported = !is_private_hash && access != "private" && access != "protected";

        let mut sym = self.base_symbol(node, name, SymbolKind::Field, exported);
        let meta = sym.metadata_mut();
        meta.is_static = has_token(node, "static", self.source);
        meta.parent_name = class_name.to_string();
        meta.access_modifier = if is_private_hash {
            "private".to_string()
        } else {
            access
        };
        Some(sym)
    }

    fn interface_symbol(&self, node: Node<'_>, exported: bool) -> Option<Symbol> {
        let name_node = node.child_by_field_name("name")?;
        let name = node_text(name_node, self.source);
        if name.is_empty() {
            return None;
        }
        let mut sym = self.base_symbol(node, name, SymbolKind::Interface, exported);
        self.record_type_info(node, &mut sym);

        let mut signatures = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for member in named_children(body) {
                match member.kind() {
                    METHOD_SIGNATURE => {
                        let Some(member_name) = member.child_by_field_name("name") else {
                            continue;
                        };
                        let member_name = node_text(member_name, self.source);
                        if member_name.is_empty() {
                            continue;
                        }
                        let mut child =
                            self.base_symbol(member, member_name, SymbolKind::Method, true);
                        child.receiver = name.to_string();
                        sym.children.push(child);
                        signatures.push(MethodSignature {
                            name: member_name.to_string(),
                            params: String::new(),
                            returns: String::new(),
                            param_count: self.param_count(member),
                            return_count: u32::from(
                                member.child_by_field_name("return_type").is_some(),
                            ),
                            receiver_type: name.to_string(),
                        });
                    }
                    PROPERTY_SIGNATURE => {
                        if let Some(member_name) = member.child_by_field_name("name") {
                            let member_name = node_text(member_name, self.source);
                            sym.children.push(self.base_symbol(
                                member,
                                member_name,
                                SymbolKind::Property,
                                true,
                            ));
                        }
                    }
                    _ => {}
                }
            }
        }
        if !signatures.is_empty() {
            sym.metadata_mut().methods = signatures;
        }
        Some(sym)
    }

    fn enum_symbol(&self, node: Node<'_>, exported: bool) -> Option<Symbol> {
        let name_node = node.child_by_field_name("name")?;
        let name = node_text(name_node, self.source);
        if name.is_empty() {
            return None;
        }
        let mut sym = self.base_symbol(node, name, SymbolKind::Enum, exported);
        if let Some(body) = node.child_by_field_name("body") {
            for member in named_children(body) {
                let member_name = match member.kind() {
                    "property_identifier" => Some(node_text(member, self.source)),
                    "enum_assignment" => member
                        .child_by_field_name("name")
                        .map(|n| node_text(n, self.source)),
                    _ => None,
                };
                if let Some(member_name) = member_name {
                    sym.children.push(self.base_symbol(
                        member,
                        member_name,
                        SymbolKind::EnumMember,
                        exported,
                    ));
                }
            }
        }
        Some(sym)
    }

    fn simple_named_symbol(
        &self,
        node: Node<'_>,
        kind: SymbolKind,
        exported: bool,
    ) -> Option<Symbol> {
        let name_node = node.child_by_field_name("name")?;
        let name = node_text(name_node, self.source);
        if name.is_empty() {
            return None;
        }
        let mut sym = self.base_symbol(node, name, kind, exported);
        self.record_type_info(node, &mut sym);
        Some(sym)
    }

    fn base_symbol(&self, node: Node<'_>, name: &str, kind: SymbolKind, exported: bool) -> Symbol {
        let mut sym = Symbol::new(
            name,
            kind,
            self.file_path,
            self.language,
            start_line(node),
            end_line(node),
            node.start_position().column as u32,
            node.end_position().column as u32,
        );
        sym.exported = exported;
        sym.signature = self.signature_of(node);
        let doc = doc_comment_above(doc_anchor(node), self.source);
        if doc.starts_with("/**") {
            sym.doc_comment = doc;
        }
        sym
    }

    /// TS-only detail: type parameters and the declared return type.
    fn record_type_info(&self, node: Node<'_>, sym: &mut Symbol) {
        let type_params: Vec<String> = node
            .child_by_field_name("type_parameters")
            .map(|tp| {
                named_children(tp)
                    .into_iter()
                    .map(|p| node_text(p, self.source).to_string())
                    .collect()
            })
            .unwrap_or_default();
        let return_type = node
            .child_by_field_name("return_type")
            .map(|r| clean_type_annotation(node_text(r, self.source)))
            .unwrap_or_default();
        if !type_params.is_empty() || !return_type.is_empty() {
            let meta = sym.metadata_mut();
            meta.type_parameters = type_params;
            meta.return_type = return_type;
        }
    }

    fn accessibility(&self, node: Node<'_>) -> String {
        named_children(node)
            .into_iter()
            .find(|c| c.kind() == "accessibility_modifier")
            .map(|c| node_text(c, self.source).to_string())
            .unwrap_or_default()
    }

    fn param_count(&self, callable: Node<'_>) -> u32 {
        callable
            .child_by_field_name("parameters")
            .map(|params| {
                named_children(params)
                    .into_iter()
                    .filter(|p| p.kind() != "this_parameter")
                    .count() as u32
            })
            .unwrap_or(0)
    }

    fn signature_of(&self, node: Node<'_>) -> String {
        let end = node
            .child_by_field_name("body")
            .map(|b| b.start_byte())
            .unwrap_or_else(|| node.end_byte());
        let slice = &self.source[node.start_byte()..end];
        let text = one_line(std::str::from_utf8(slice).unwrap_or(""));
        // Keep long initializers out of variable signatures.
        match text.split_once('=') {
            Some((head, _)) if node.kind() == LEXICAL_DECLARATION => head.trim_end().to_string(),
            _ => text,
        }
    }
}

/// Where the doc comment physically sits: above the export statement when
/// the declaration is wrapped in one.
fn doc_anchor(node: Node<'_>) -> Node<'_> {
    match node.parent() {
        Some(parent) if parent.kind() == EXPORT_STATEMENT => parent,
        _ => node,
    }
}

fn has_token(node: Node<'_>, token: &str, _source: &[u8]) -> bool {
    // Keyword tokens are anonymous children whose kind equals their text.
    let mut cursor = node.walk();
    let result = node.children(&mut cursor).any(|c| !c.is_named() && c.kind() == token);
    result
}

fn strip_quotes(text: &str) -> String {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string()
}

/// `@Injectable()` → `Injectable`, `@mod.memo` → `memo`.
fn decorator_name(text: &str) -> String {
    let stripped = text.trim().trim_start_matches('@');
    let without_args = stripped.split('(').next().unwrap_or(stripped);
    without_args
        .rsplit('.')
        .next()
        .unwrap_or(without_args)
        .trim()
        .to_string()
}

/// `: Promise<any>` → `Promise<any>`.
fn clean_type_annotation(text: &str) -> String {
    text.trim().trim_start_matches(':').trim().to_string()
}

fn require_path(call: Node<'_>, source: &[u8]) -> Option<String> {
    let args = call.child_by_field_name("arguments")?;
    let first = named_children(args).into_iter().next()?;
    if first.kind() != "string" {
        return None;
    }
    Some(strip_quotes(node_text(first, source)))
}
