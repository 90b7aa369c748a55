//! Shared helpers for the fathom integration tests.
//!
//! Import from any integration test file with:
//!   `#[path = "common/mod.rs"] mod common;`

use std::path::Path;

use tokio_util::sync::CancellationToken;

use fathom_core::config::ParserLimits;
use fathom_core::types::ParseResult;
use fathom_graph::CodeGraph;
use fathom_parsers::registry::default_registry;

/// Parse one in-memory source through the default registry.
#[allow(dead_code)]
pub fn parse_file(path: &str, source: &str) -> ParseResult {
    let registry = default_registry(ParserLimits::default());
    let parser = registry
        .get_for_path(Path::new(path))
        .unwrap_or_else(|| panic!("no parser for {path}"));
    parser
        .parse(&CancellationToken::new(), source.as_bytes(), path)
        .unwrap_or_else(|e| panic!("parse failed for {path}: {e}"))
}

/// Parse several sources and build the frozen graph.
#[allow(dead_code)]
pub fn build_graph_from(sources: &[(&str, &str)]) -> CodeGraph {
    let results: Vec<ParseResult> = sources
        .iter()
        .map(|(path, source)| parse_file(path, source))
        .collect();
    fathom_graph::build_graph(&results)
}

/// All edges of a kind as (src symbol id, dst symbol id) pairs.
#[allow(dead_code)]
pub fn edge_pairs(graph: &CodeGraph, kind: fathom_graph::EdgeKind) -> Vec<(String, String)> {
    graph
        .edges()
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| {
            (
                graph.node(e.src).unwrap().id.clone(),
                graph.node(e.dst).unwrap().id.clone(),
            )
        })
        .collect()
}
