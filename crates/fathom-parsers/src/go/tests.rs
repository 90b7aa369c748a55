use tokio_util::sync::CancellationToken;

use super::*;
use crate::parser::Parser as _;
use fathom_core::config::ParserLimits;

fn parse(source: &str) -> ParseResult {
    let parser = GoParser::new(ParserLimits::default());
    parser
        .parse(&CancellationToken::new(), source.as_bytes(), "test.go")
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
fn test_package_and_functions() {
    let result = parse(
        r#"package main

import "fmt"

func main() { fmt.Println("hi"); helper() }
func helper() {}
"#,
    );
    let pkg = find(&result, "main");
    assert_eq!(pkg.kind, SymbolKind::Package);

    let main_fn = result
        .symbols
        .iter()
        .find(|s| s.name == "main" && s.kind == SymbolKind::Function)
        .unwrap();
    assert_eq!(main_fn.package, "main");
    assert!(!main_fn.exported);
    assert_eq!(main_fn.calls.len(), 2);
    assert_eq!(main_fn.calls[0].target, "Println");
    assert_eq!(main_fn.calls[0].receiver, "fmt");
    assert!(main_fn.calls[0].is_method);
    assert_eq!(main_fn.calls[1].target, "helper");
    assert!(!main_fn.calls[1].is_method);

    let helper = find(&result, "helper");
    assert_eq!(helper.kind, SymbolKind::Function);
    assert!(!helper.exported);
    assert_eq!(helper.package, "main");

    assert_eq!(result.imports.len(), 1);
    assert_eq!(result.imports[0].path, "fmt");
}

#[test]
fn test_visibility_by_case() {
    let result = parse("package p\nfunc Public() {}\nfunc private() {}\n");
    assert!(find(&result, "Public").exported);
    assert!(!find(&result, "private").exported);
}

#[test]
fn test_import_aliases() {
    let result = parse(
        r#"package p

import (
    "fmt"
    x "net/http"
    _ "embed"
    . "strings"
)
"#,
    );
    assert_eq!(result.imports.len(), 4);
    assert_eq!(result.imports[0].alias, "");
    assert_eq!(result.imports[1].path, "net/http");
    assert_eq!(result.imports[1].alias, "x");
    assert_eq!(result.imports[2].alias, "_");
    assert_eq!(result.imports[3].alias, ".");
}

#[test]
fn test_method_receiver_normalized() {
    let result = parse(
        r#"package p

type Server struct {
    addr string
}

func (s *Server) Start() error { return nil }
func (s Server) Addr() string { return s.addr }
"#,
    );
    let start = find(&result, "Start");
    assert_eq!(start.kind, SymbolKind::Method);
    assert_eq!(start.receiver, "Server");
    let addr = find(&result, "Addr");
    assert_eq!(addr.receiver, "Server");
}

#[test]
fn test_struct_fields_become_children() {
    let result = parse(
        r#"package p

type Config struct {
    Host string
    Port int
    limit int
}
"#,
    );
    let config = find(&result, "Config");
    assert_eq!(config.kind, SymbolKind::Struct);
    let names: Vec<_> = config.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Host", "Port", "limit"]);
    assert!(config.children[0].exported);
    assert!(!config.children[2].exported);
}

#[test]
fn test_embedded_field_uses_type_name() {
    let result = parse(
        r#"package p

import "sync"

type Pool struct {
    sync.Mutex
    size int
}
"#,
    );
    let pool = find(&result, "Pool");
    let names: Vec<_> = pool.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Mutex", "size"]);
}

#[test]
fn test_interface_method_signatures() {
    let result = parse(
        r#"package p

type Store interface {
    Get(key string) (string, error)
    Put(key, value string) error
    Close()
}
"#,
    );
    let store = find(&result, "Store");
    assert_eq!(store.kind, SymbolKind::Interface);
    assert_eq!(store.children.len(), 3);
    let methods = &store.metadata.as_ref().unwrap().methods;
    assert_eq!(methods.len(), 3);
    assert_eq!(methods[0].name, "Get");
    assert_eq!(methods[0].param_count, 1);
    assert_eq!(methods[0].return_count, 2);
    assert_eq!(methods[1].name, "Put");
    assert_eq!(methods[1].param_count, 2);
    assert_eq!(methods[1].return_count, 1);
    assert_eq!(methods[2].name, "Close");
    assert_eq!(methods[2].param_count, 0);
    assert_eq!(methods[2].return_count, 0);
}

#[test]
fn test_receiver_methods_populate_struct_metadata() {
    let result = parse(
        r#"package p

type Cache struct {
    data map[string]string
}

func (c *Cache) Get(key string) (string, error) { return c.data[key], nil }
func (c *Cache) Put(key, value string) error { return nil }
"#,
    );
    let cache = find(&result, "Cache");
    let methods = &cache.metadata.as_ref().unwrap().methods;
    assert_eq!(methods.len(), 2);
    assert_eq!(methods[0].name, "Get");
    assert_eq!(methods[0].param_count, 1);
    assert_eq!(methods[0].return_count, 2);
    assert_eq!(methods[1].name, "Put");
    assert_eq!(methods[1].param_count, 2);
    assert_eq!(methods[1].return_count, 1);
}

#[test]
fn test_type_alias_and_named_type() {
    let result = parse("package p\ntype ID = string\ntype Count int\n");
    assert_eq!(find(&result, "ID").kind, SymbolKind::Type);
    assert_eq!(find(&result, "Count").kind, SymbolKind::Type);
}

#[test]
fn test_vars_and_consts() {
    let result = parse(
        r#"package p

var DefaultTimeout = 30

const (
    MaxRetries = 3
    minDelay   = 1
)
"#,
    );
    let timeout = find(&result, "DefaultTimeout");
    assert_eq!(timeout.kind, SymbolKind::Variable);
    assert!(timeout.exported);
    assert_eq!(find(&result, "MaxRetries").kind, SymbolKind::Constant);
    assert!(!find(&result, "minDelay").exported);
}

#[test]
fn test_doc_comment_verbatim() {
    let result = parse(
        r#"package p

// Run starts the loop.
// It blocks until shutdown.
func Run() {}
"#,
    );
    let run = find(&result, "Run");
    assert_eq!(
        run.doc_comment,
        "// Run starts the loop.\n// It blocks until shutdown."
    );
}

#[test]
fn test_error_nodes_keep_extraction_going() {
    let result = parse("package p\nfunc ok() {}\nfunc broken( {}\n");
    assert!(!result.errors.is_empty());
    assert!(result.symbols.iter().any(|s| s.name == "ok"));
}

#[test]
fn test_hash_and_determinism() {
    let source = "package p\nfunc a() {}\n";
    let r1 = parse(source);
    let r2 = parse(source);
    assert_eq!(r1.content_hash, r2.content_hash);
    assert_eq!(r1.content_hash.len(), 64);
    let ids1: Vec<_> = r1.symbols.iter().map(|s| s.id.clone()).collect();
    let ids2: Vec<_> = r2.symbols.iter().map(|s| s.id.clone()).collect();
    assert_eq!(ids1, ids2);
}

#[test]
fn test_too_large_rejected() {
    let limits = ParserLimits {
        max_file_size: 10,
        ..ParserLimits::default()
    };
    let parser = GoParser::new(limits);
    let err = parser.parse(
        &CancellationToken::new(),
        b"package something",
        "big.go",
    );
    assert!(matches!(err, Err(ParseError::TooLarge { .. })));
}

#[test]
fn test_signature_rendering() {
    let result = parse("package p\nfunc Sum(a, b int) int {\n    return a + b\n}\n");
    let sum = find(&result, "Sum");
    assert_eq!(sum.signature, "func Sum(a, b int) int");
}
