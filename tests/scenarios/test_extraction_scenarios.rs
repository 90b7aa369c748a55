use crate::common::{build_graph_from, edge_pairs, parse_file};
use fathom_core::types::SymbolKind;
use fathom_graph::EdgeKind;

#[test]
fn test_go_function_with_method_call_and_import() {
    let source = r#"package main
import "fmt"
func main() { fmt.Println("hi"); helper() }
func helper() {}
"#;
    let result = parse_file("main.go", source);

    let pkg = result
        .symbols
        .iter()
        .find(|s| s.kind == SymbolKind::Package)
        .unwrap();
    assert_eq!(pkg.name, "main");

    let functions: Vec<_> = result
        .symbols
        .iter()
        .filter(|s| s.kind == SymbolKind::Function)
        .collect();
    assert_eq!(functions.len(), 2);
    assert!(functions.iter().all(|f| f.package == "main"));
    assert!(functions.iter().all(|f| !f.exported));

    let main_fn = functions.iter().find(|f| f.name == "main").unwrap();
    assert_eq!(main_fn.calls.len(), 2);
    assert_eq!(main_fn.calls[0].target, "Println");
    assert_eq!(main_fn.calls[0].receiver, "fmt");
    assert!(main_fn.calls[0].is_method);
    assert_eq!(main_fn.calls[1].target, "helper");
    assert!(!main_fn.calls[1].is_method);

    let graph = build_graph_from(&[("main.go", source)]);
    let calls = edge_pairs(&graph, EdgeKind::Calls);
    assert!(calls.contains(&("main.go:3:main".to_string(), "main.go:4:helper".to_string())));
    let imports = edge_pairs(&graph, EdgeKind::Imports);
    assert!(imports
        .iter()
        .any(|(src, dst)| src == "main.go:1:main.go" && dst == "external:fmt"));
}

#[test]
fn test_python_protocol_structural_implementation() {
    let source = r#"from typing import Protocol

class Handler(Protocol):
    def handle(self, r) -> None: ...

class Impl:
    def handle(self, r) -> None: pass
"#;
    let result = parse_file("app.py", source);

    let handler = result.symbols.iter().find(|s| s.name == "Handler").unwrap();
    assert_eq!(handler.kind, SymbolKind::Interface);
    let methods = &handler.metadata.as_ref().unwrap().methods;
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].name, "handle");
    assert_eq!(methods[0].param_count, 1);
    assert_eq!(methods[0].return_count, 1);

    let imp = result.symbols.iter().find(|s| s.name == "Impl").unwrap();
    assert_eq!(imp.kind, SymbolKind::Class);

    let graph = build_graph_from(&[("app.py", source)]);
    let implements = edge_pairs(&graph, EdgeKind::Implements);
    assert!(implements.contains(&("app.py:6:Impl".to_string(), "app.py:3:Handler".to_string())));
}

#[test]
fn test_typescript_decorated_class_with_private_field() {
    let source = "@Injectable()\nexport class S { #cache = new Map(); async get(id: string): Promise<any> { return null; } }\n";
    let result = parse_file("service.ts", source);

    let class = result.symbols.iter().find(|s| s.name == "S").unwrap();
    assert!(class.exported);
    assert_eq!(
        class.metadata.as_ref().unwrap().decorators,
        vec!["Injectable".to_string()]
    );

    let cache = class.children.iter().find(|c| c.name == "#cache").unwrap();
    assert_eq!(cache.metadata.as_ref().unwrap().access_modifier, "private");
    assert!(!cache.exported);

    let get = class.children.iter().find(|c| c.name == "get").unwrap();
    assert!(get.metadata.as_ref().unwrap().is_async);
}

#[test]
fn test_css_import_variable_keyframes() {
    let source = "@import 'print.css' print;\n:root { --c: red; }\n@keyframes fadeIn { from {opacity:0;} to {opacity:1;} }\n";
    let result = parse_file("styles.css", source);

    assert_eq!(result.imports.len(), 1);
    assert_eq!(result.imports[0].path, "print.css");
    assert!(result.imports[0].is_stylesheet);
    assert_eq!(result.imports[0].media_query, "print");

    let var = result
        .symbols
        .iter()
        .find(|s| s.kind == SymbolKind::CssVariable)
        .unwrap();
    assert_eq!(var.name, "--c");

    let animation = result
        .symbols
        .iter()
        .find(|s| s.kind == SymbolKind::Animation)
        .unwrap();
    assert_eq!(animation.name, "fadeIn");
    assert_eq!(animation.signature, "@keyframes fadeIn");
}

#[test]
fn test_dockerfile_multi_stage() {
    let source = "FROM golang:1.22 AS build\nENV FOO=bar\nEXPOSE 8080/tcp\n";
    let result = parse_file("Dockerfile", source);

    let stage = result
        .symbols
        .iter()
        .find(|s| s.kind == SymbolKind::Stage)
        .unwrap();
    assert_eq!(stage.name, "build");
    assert_eq!(stage.signature, "FROM golang:1.22 AS build");

    let env = result
        .symbols
        .iter()
        .find(|s| s.kind == SymbolKind::EnvVar)
        .unwrap();
    assert_eq!(env.name, "FOO");
    assert_eq!(env.signature, "ENV FOO=bar");

    let port = result
        .symbols
        .iter()
        .find(|s| s.kind == SymbolKind::Port)
        .unwrap();
    assert_eq!(port.name, "8080/tcp");

    assert_eq!(result.imports.len(), 1);
    assert_eq!(result.imports[0].path, "golang:1.22");
}

#[test]
fn test_html_inline_blocks_get_synthetic_paths() {
    let source = "<html><body><script>function boot() {}</script><style>.hero { color: red; }</style></body></html>";
    let result = parse_file("index.html", source);

    let boot = result.symbols.iter().find(|s| s.name == "boot").unwrap();
    assert_eq!(boot.file_path, "index.html<script>");

    let hero = result.symbols.iter().find(|s| s.name == "hero").unwrap();
    assert_eq!(hero.file_path, "index.html<style>");
    assert_eq!(hero.kind, SymbolKind::CssClass);
}
