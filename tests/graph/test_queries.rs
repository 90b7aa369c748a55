use crate::common::build_graph_from;
use fathom_core::config::TraversalLimits;
use fathom_graph::query;
use fathom_graph::{CodeGraph, GraphError};

const CHAIN: &str = r#"package main

func main() { a() }
func a() { b() }
func b() { c() }
func c() {}
func orphan() {}
func Exported() {}
"#;

fn limits() -> TraversalLimits {
    TraversalLimits::default()
}

#[test]
fn test_callers_direct_and_transitive() {
    let graph = build_graph_from(&[("main.go", CHAIN)]);
    let direct = query::callers(&graph, "main.go:5:b", Some(1), &limits()).unwrap();
    assert_eq!(direct.symbol_ids, vec!["main.go:4:a".to_string()]);
    assert!(!direct.truncated);

    let transitive = query::callers(&graph, "main.go:6:c", Some(8), &limits()).unwrap();
    assert_eq!(
        transitive.symbol_ids,
        vec![
            "main.go:5:b".to_string(),
            "main.go:4:a".to_string(),
            "main.go:3:main".to_string(),
        ]
    );
}

#[test]
fn test_callees_depth_capped() {
    let graph = build_graph_from(&[("main.go", CHAIN)]);
    let shallow = query::callees(&graph, "main.go:3:main", Some(1), &limits()).unwrap();
    assert_eq!(shallow.symbol_ids, vec!["main.go:4:a".to_string()]);
}

#[test]
fn test_result_limit_sets_truncated() {
    let graph = build_graph_from(&[("main.go", CHAIN)]);
    let tight = TraversalLimits {
        max_results: 1,
        ..TraversalLimits::default()
    };
    let result = query::callers(&graph, "main.go:6:c", Some(8), &tight).unwrap();
    assert_eq!(result.symbol_ids.len(), 1);
    assert!(result.truncated);
}

#[test]
fn test_entry_points_finds_main() {
    let graph = build_graph_from(&[("main.go", CHAIN)]);
    let entries = query::entry_points(&graph, None, None, &limits()).unwrap();
    assert!(entries.symbol_ids.contains(&"main.go:3:main".to_string()));
    assert!(!entries.symbol_ids.contains(&"main.go:4:a".to_string()));
}

#[test]
fn test_impact_is_reverse_closure() {
    let graph = build_graph_from(&[("main.go", CHAIN)]);
    let impact = query::impact(&graph, "main.go:6:c", &limits()).unwrap();
    assert!(impact.symbol_ids.contains(&"main.go:3:main".to_string()));
    assert!(impact.symbol_ids.contains(&"main.go:4:a".to_string()));
}

#[test]
fn test_dead_code_excludes_exported_and_reachable() {
    let graph = build_graph_from(&[("main.go", CHAIN)]);
    let dead = query::dead_code(&graph, None, &limits()).unwrap();
    assert!(dead.symbol_ids.contains(&"main.go:7:orphan".to_string()));
    // Reachable from main.
    assert!(!dead.symbol_ids.contains(&"main.go:5:b".to_string()));
    // Unreachable but exported.
    assert!(!dead.symbol_ids.contains(&"main.go:8:Exported".to_string()));
}

#[test]
fn test_queries_require_frozen_graph() {
    let graph = CodeGraph::new();
    let err = query::callers(&graph, "x", None, &limits());
    assert!(matches!(err, Err(GraphError::NotFrozen)));
}

#[test]
fn test_unknown_symbol_id() {
    let graph = build_graph_from(&[("main.go", CHAIN)]);
    let err = query::callers(&graph, "main.go:99:nope", None, &limits());
    assert!(matches!(err, Err(GraphError::NodeNotFound(_))));
}

#[test]
fn test_method_forms_match_free_functions() {
    let graph = build_graph_from(&[("main.go", CHAIN)]);
    let via_method = graph.callers("main.go:5:b", Some(1), &limits()).unwrap();
    let via_fn = query::callers(&graph, "main.go:5:b", Some(1), &limits()).unwrap();
    assert_eq!(via_method.symbol_ids, via_fn.symbol_ids);
}

#[test]
fn test_python_test_functions_are_entry_points() {
    let graph = build_graph_from(&[(
        "test_app.py",
        "def test_flow():\n    run()\n\ndef run():\n    pass\n",
    )]);
    let entries = query::entry_points(&graph, None, None, &limits()).unwrap();
    assert!(entries
        .symbol_ids
        .contains(&"test_app.py:1:test_flow".to_string()));
}
