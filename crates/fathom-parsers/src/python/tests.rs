use tokio_util::sync::CancellationToken;

use super::*;
use crate::parser::Parser as _;
use fathom_core::config::ParserLimits;

fn parse(source: &str) -> ParseResult {
    let parser = PythonParser::new(ParserLimits::default());
    parser
        .parse(&CancellationToken::new(), source.as_bytes(), "app.py")
        .unwrap()
}

fn find<'a>(result: &'a ParseResult, name: &str) -> &'a Symbol {
    result
        .symbols
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("missing symbol {name}"))
}

#[test]
fn test_module_docstring_becomes_package() {
    let result = parse("\"\"\"Request handling.\"\"\"\n\nx = 1\n");
    let pkg = &result.symbols[0];
    assert_eq!(pkg.kind, SymbolKind::Package);
    assert_eq!(pkg.name, "app");
    assert!(pkg.doc_comment.contains("Request handling."));
}

#[test]
fn test_import_forms() {
    let result = parse(
        "import os\nimport numpy as np\nfrom collections import OrderedDict, defaultdict\nfrom . import sibling\nfrom ..pkg import util\nfrom typing import *\n",
    );
    assert_eq!(result.imports.len(), 6);
    assert_eq!(result.imports[0].path, "os");
    assert_eq!(result.imports[1].path, "numpy");
    assert_eq!(result.imports[1].alias, "np");
    assert_eq!(
        result.imports[2].names,
        vec!["OrderedDict".to_string(), "defaultdict".to_string()]
    );
    assert!(result.imports[3].is_relative);
    assert_eq!(result.imports[3].path, ".");
    assert!(result.imports[4].is_relative);
    assert_eq!(result.imports[4].path, "..pkg");
    assert!(result.imports[5].is_wildcard);
}

#[test]
fn test_async_function() {
    let result = parse("async def fetch(url):\n    return url\n");
    let fetch = find(&result, "fetch");
    assert_eq!(fetch.kind, SymbolKind::Function);
    assert!(fetch.metadata.as_ref().unwrap().is_async);
    assert!(fetch.signature.starts_with("async def fetch"));
}

#[test]
fn test_visibility() {
    let result = parse("def public():\n    pass\n\ndef _private():\n    pass\n\ndef __dunder__():\n    pass\n");
    assert!(find(&result, "public").exported);
    assert!(!find(&result, "_private").exported);
    assert!(find(&result, "__dunder__").exported);
}

#[test]
fn test_class_methods_and_properties() {
    let result = parse(
        r#"class Account:
    def __init__(self, balance):
        self.balance = balance

    @property
    def value(self):
        return self.balance

    @staticmethod
    def zero():
        return Account(0)

    @classmethod
    def default(cls):
        return cls.zero()
"#,
    );
    let account = find(&result, "Account");
    assert_eq!(account.kind, SymbolKind::Class);
    assert_eq!(account.children.len(), 4);

    let init = &account.children[0];
    assert_eq!(init.kind, SymbolKind::Method);
    assert_eq!(init.receiver, "Account");

    let value = &account.children[1];
    assert_eq!(value.kind, SymbolKind::Property);

    let zero = &account.children[2];
    assert!(zero.metadata.as_ref().unwrap().is_static);
    let default = &account.children[3];
    assert!(default.metadata.as_ref().unwrap().is_static);
}

#[test]
fn test_protocol_reclassified_as_interface() {
    let result = parse(
        r#"from typing import Protocol

class Handler(Protocol):
    def handle(self, r) -> None: ...

class Impl:
    def handle(self, r) -> None: pass
"#,
    );
    let handler = find(&result, "Handler");
    assert_eq!(handler.kind, SymbolKind::Interface);
    let methods = &handler.metadata.as_ref().unwrap().methods;
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].name, "handle");
    assert_eq!(methods[0].param_count, 1);
    assert_eq!(methods[0].return_count, 1);

    let imp = find(&result, "Impl");
    assert_eq!(imp.kind, SymbolKind::Class);
    let imp_methods = &imp.metadata.as_ref().unwrap().methods;
    assert_eq!(imp_methods[0].param_count, 1);
}

#[test]
fn test_abc_reclassified_as_interface() {
    let result = parse(
        "from abc import ABC\n\nclass Repo(ABC):\n    def save(self, item): ...\n",
    );
    assert_eq!(find(&result, "Repo").kind, SymbolKind::Interface);
}

#[test]
fn test_module_assignments() {
    let result = parse("MAX_RETRIES = 3\ntimeout = 30\n_hidden = 1\n");
    assert_eq!(find(&result, "MAX_RETRIES").kind, SymbolKind::Constant);
    let timeout = find(&result, "timeout");
    assert_eq!(timeout.kind, SymbolKind::Variable);
    assert!(timeout.exported);
    assert!(!find(&result, "_hidden").exported);
}

#[test]
fn test_nested_function_is_child() {
    let result = parse(
        "def outer():\n    def inner():\n        pass\n    return inner\n",
    );
    let outer = find(&result, "outer");
    assert_eq!(outer.children.len(), 1);
    assert_eq!(outer.children[0].name, "inner");
    assert_eq!(outer.children[0].kind, SymbolKind::Function);
}

#[test]
fn test_decorated_function_records_decorators() {
    let result = parse("@app.route(\"/users\")\ndef list_users():\n    pass\n");
    let handler = find(&result, "list_users");
    assert_eq!(
        handler.metadata.as_ref().unwrap().decorators,
        vec!["route".to_string()]
    );
}

#[test]
fn test_calls_extracted() {
    let result = parse(
        "def helper():\n    pass\n\ndef main():\n    helper()\n    os.getcwd()\n",
    );
    let main_fn = find(&result, "main");
    assert_eq!(main_fn.calls.len(), 2);
    assert_eq!(main_fn.calls[0].target, "helper");
    assert!(!main_fn.calls[0].is_method);
    assert_eq!(main_fn.calls[1].target, "getcwd");
    assert_eq!(main_fn.calls[1].receiver, "os");
}

#[test]
fn test_broken_source_keeps_extracting() {
    let result = parse("def good():\n    pass\n\ndef bad(:\n    pass\n");
    assert!(result.symbols.iter().any(|s| s.name == "good"));
    assert!(!result.errors.is_empty());
}
