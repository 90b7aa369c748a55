use crate::common::{build_graph_from, edge_pairs};
use fathom_core::types::SymbolKind;
use fathom_graph::EdgeKind;

#[test]
fn test_contains_edges_from_file_and_parent() {
    let graph = build_graph_from(&[(
        "config.go",
        "package p\n\ntype Config struct {\n    Host string\n}\n",
    )]);
    let contains = edge_pairs(&graph, EdgeKind::Contains);
    // file -> package, file -> struct, struct -> field
    assert!(contains.contains(&("config.go:1:config.go".to_string(), "config.go:1:p".to_string())));
    assert!(contains
        .contains(&("config.go:1:config.go".to_string(), "config.go:3:Config".to_string())));
    assert!(contains.contains(&("config.go:3:Config".to_string(), "config.go:4:Host".to_string())));
}

#[test]
fn test_overrides_edge_links_method_to_receiver_type() {
    let graph = build_graph_from(&[(
        "server.go",
        "package p\n\ntype Server struct{}\n\nfunc (s *Server) Start() {}\n",
    )]);
    let overrides = edge_pairs(&graph, EdgeKind::Overrides);
    assert!(overrides
        .contains(&("server.go:5:Start".to_string(), "server.go:3:Server".to_string())));
}

#[test]
fn test_go_interface_satisfaction() {
    let graph = build_graph_from(&[(
        "store.go",
        r#"package p

type Store interface {
    Get(key string) (string, error)
    Put(key, value string) error
}

type Cache struct{}

func (c *Cache) Get(key string) (string, error) { return "", nil }
func (c *Cache) Put(key, value string) error { return nil }

type Partial struct{}

func (p *Partial) Get(key string) (string, error) { return "", nil }
"#,
    )]);
    let implements = edge_pairs(&graph, EdgeKind::Implements);
    assert!(implements.contains(&("store.go:8:Cache".to_string(), "store.go:3:Store".to_string())));
    // Partial lacks Put and must not satisfy the interface.
    assert!(!implements
        .iter()
        .any(|(src, _)| src == "store.go:13:Partial"));
}

#[test]
fn test_receiver_method_call_resolution() {
    let graph = build_graph_from(&[(
        "use.go",
        r#"package p

type Cache struct{}

func (c *Cache) Get(key string) string { return "" }

func Lookup(c *Cache) string { return c.Get("x") }
"#,
    )]);
    // The call site receiver is the variable `c`; resolution falls back
    // to the (receiver type, method) map only for type-named receivers,
    // so this resolves through the unqualified/global tier instead.
    let calls = edge_pairs(&graph, EdgeKind::Calls);
    assert!(calls
        .iter()
        .any(|(src, dst)| src == "use.go:7:Lookup" && dst == "use.go:5:Get"));
}

#[test]
fn test_package_qualified_call_across_files() {
    let graph = build_graph_from(&[
        (
            "util/strings.go",
            "package util\n\nfunc Reverse(s string) string { return s }\n",
        ),
        (
            "main.go",
            "package main\n\nimport \"myapp/util\"\n\nfunc main() { util.Reverse(\"abc\") }\n",
        ),
    ]);
    let calls = edge_pairs(&graph, EdgeKind::Calls);
    assert!(calls
        .contains(&("main.go:5:main".to_string(), "util/strings.go:3:Reverse".to_string())));
    // The import resolves to the parsed util package rather than an
    // external node.
    let imports = edge_pairs(&graph, EdgeKind::Imports);
    assert!(imports
        .iter()
        .any(|(src, dst)| src == "main.go:1:main.go" && dst == "util/strings.go:1:util"));
}

#[test]
fn test_relative_import_resolves_to_file_node() {
    let graph = build_graph_from(&[
        (
            "util.ts",
            "export function helper(): number { return 1; }\n",
        ),
        (
            "app.ts",
            "import { helper } from \"./util\";\n\nexport function main() { helper(); }\n",
        ),
    ]);
    let imports = edge_pairs(&graph, EdgeKind::Imports);
    assert!(imports.contains(&("app.ts:1:app.ts".to_string(), "util.ts:1:util.ts".to_string())));
    // Named imports produce references edges into the target file.
    let references = edge_pairs(&graph, EdgeKind::References);
    assert!(references
        .contains(&("app.ts:1:app.ts".to_string(), "util.ts:1:helper".to_string())));
}

#[test]
fn test_unresolved_import_becomes_external_node() {
    let graph = build_graph_from(&[(
        "app.py",
        "import requests\n\ndef fetch():\n    pass\n",
    )]);
    let node = graph.node_id("external:requests").unwrap();
    assert_eq!(graph.node(node).unwrap().kind, SymbolKind::Module);
    let imports = edge_pairs(&graph, EdgeKind::Imports);
    assert!(imports
        .contains(&("app.py:1:app.py".to_string(), "external:requests".to_string())));
}

#[test]
fn test_typescript_extends_edge() {
    let graph = build_graph_from(&[(
        "models.ts",
        "export class Base {}\nexport class Derived extends Base {}\n",
    )]);
    let extends = edge_pairs(&graph, EdgeKind::Extends);
    assert!(extends
        .contains(&("models.ts:2:Derived".to_string(), "models.ts:1:Base".to_string())));
}

#[test]
fn test_failed_files_are_skipped() {
    let results = vec![
        (
            "good.go".to_string(),
            Ok(crate::common::parse_file("good.go", "package p\nfunc A() {}\n")),
        ),
        (
            "bad.bin".to_string(),
            Err(fathom_core::error::ParseError::InvalidContent(
                "not utf-8".to_string(),
            )),
        ),
    ];
    let graph = fathom_graph::builder::build_graph_skipping_failures(&results).unwrap();
    assert!(graph.node_id("good.go:2:A").is_some());
    assert!(graph.is_frozen());
}
