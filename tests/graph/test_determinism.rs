use crate::common::{build_graph_from, parse_file};

const GO_A: &str = r#"package p

type Worker interface {
    Run() error
}

type Pool struct{}

func (p *Pool) Run() error { return nil }

func Drive() { helper(); helper() }
func helper() {}
"#;

const PY_B: &str = r#"import os

def task():
    helper()

def helper():
    pass
"#;

#[test]
fn test_two_builds_produce_identical_adjacency() {
    let first = build_graph_from(&[("a.go", GO_A), ("b.py", PY_B)]);
    let second = build_graph_from(&[("a.go", GO_A), ("b.py", PY_B)]);
    assert_eq!(first.adjacency_fingerprint(), second.adjacency_fingerprint());
    assert_eq!(first.node_count(), second.node_count());
}

#[test]
fn test_repeated_parse_is_identical() {
    let r1 = parse_file("a.go", GO_A);
    let r2 = parse_file("a.go", GO_A);
    assert_eq!(r1.content_hash, r2.content_hash);

    let shape = |result: &fathom_core::types::ParseResult| {
        result
            .symbols
            .iter()
            .map(|s| (s.id.clone(), s.kind, s.name.clone(), s.start_line, s.end_line))
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&r1), shape(&r2));
}

#[test]
fn test_edges_sorted_by_total_order() {
    let graph = build_graph_from(&[("a.go", GO_A), ("b.py", PY_B)]);
    let edges = graph.edges();
    for window in edges.windows(2) {
        let left = (
            window[0].kind,
            &graph.node(window[0].dst).unwrap().id,
            &window[0].location,
        );
        let right = (
            window[1].kind,
            &graph.node(window[1].dst).unwrap().id,
            &window[1].location,
        );
        assert!(left <= right, "adjacency out of order: {left:?} > {right:?}");
    }
}
