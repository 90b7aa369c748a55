//! Bounded read-only traversals over a frozen graph.
//!
//! Every query checks the freeze flag first, walks within a result limit,
//! a depth limit, and a global node budget, and reports truncation
//! instead of failing when a bound is hit.

use std::collections::HashSet;

use serde::Serialize;

use fathom_core::config::TraversalLimits;
use fathom_core::types::SymbolKind;

use crate::graph::{CodeGraph, EdgeKind, GraphError, NodeId};

/// Result of a traversal: matched symbol ids in traversal order, plus a
/// flag set when any bound cut the walk short.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Traversal {
    pub symbol_ids: Vec<String>,
    pub truncated: bool,
}

/// Direct and transitive callers of a symbol, breadth-first, nearest
/// first.
pub fn callers(
    graph: &CodeGraph,
    symbol_id: &str,
    depth: Option<usize>,
    limits: &TraversalLimits,
) -> Result<Traversal, GraphError> {
    walk_calls(graph, symbol_id, depth, limits, Direction::Incoming, &[EdgeKind::Calls])
}

/// Direct and transitive callees of a symbol.
pub fn callees(
    graph: &CodeGraph,
    symbol_id: &str,
    depth: Option<usize>,
    limits: &TraversalLimits,
) -> Result<Traversal, GraphError> {
    walk_calls(graph, symbol_id, depth, limits, Direction::Outgoing, &[EdgeKind::Calls])
}

/// Types with an `implements` edge into the given interface.
pub fn implementers(
    graph: &CodeGraph,
    interface_id: &str,
    limits: &TraversalLimits,
) -> Result<Traversal, GraphError> {
    require_frozen(graph)?;
    let node = resolve(graph, interface_id)?;
    let mut out = Traversal::default();
    for edge in graph.in_edges(node) {
        if edge.kind != EdgeKind::Implements {
            continue;
        }
        if out.symbol_ids.len() >= limits.max_results {
            out.truncated = true;
            break;
        }
        if let Some(symbol) = graph.node(edge.src) {
            out.symbol_ids.push(symbol.id.clone());
        }
    }
    Ok(out)
}

/// Reverse transitive closure over `calls` and `references`: everything
/// that could be affected by a change to the given symbol.
pub fn impact(
    graph: &CodeGraph,
    symbol_id: &str,
    limits: &TraversalLimits,
) -> Result<Traversal, GraphError> {
    walk_calls(
        graph,
        symbol_id,
        None,
        limits,
        Direction::Incoming,
        &[EdgeKind::Calls, EdgeKind::References],
    )
}

/// Roots of the call forest that also look like entry points for their
/// language: `main` functions, test functions, decorated or exported
/// handlers.
pub fn entry_points(
    graph: &CodeGraph,
    package: Option<&str>,
    kind: Option<SymbolKind>,
    limits: &TraversalLimits,
) -> Result<Traversal, GraphError> {
    require_frozen(graph)?;
    let mut out = Traversal::default();
    for &node in graph.call_sources() {
        let Some(symbol) = graph.node(node) else { continue };
        if !is_entry_point(symbol) {
            continue;
        }
        if let Some(package) = package {
            if symbol.package != package {
                continue;
            }
        }
        if let Some(kind) = kind {
            if symbol.kind != kind {
                continue;
            }
        }
        if out.symbol_ids.len() >= limits.max_results {
            out.truncated = true;
            break;
        }
        out.symbol_ids.push(symbol.id.clone());
    }
    Ok(out)
}

/// Functions and methods unreachable from every entry point and not
/// exported. `scope` narrows the report to a file-path prefix.
pub fn dead_code(
    graph: &CodeGraph,
    scope: Option<&str>,
    limits: &TraversalLimits,
) -> Result<Traversal, GraphError> {
    require_frozen(graph)?;

    let mut reachable: HashSet<NodeId> = HashSet::new();
    let mut frontier: Vec<NodeId> = Vec::new();
    for &node in graph.call_sources() {
        let Some(symbol) = graph.node(node) else { continue };
        if is_entry_point(symbol) {
            reachable.insert(node);
            frontier.push(node);
        }
    }
    let mut budget = limits.node_budget;
    let mut truncated = false;
    while let Some(node) = frontier.pop() {
        if budget == 0 {
            truncated = true;
            break;
        }
        budget -= 1;
        for edge in graph.out_edges(node) {
            if !matches!(edge.kind, EdgeKind::Calls | EdgeKind::References) {
                continue;
            }
            if reachable.insert(edge.dst) {
                frontier.push(edge.dst);
            }
        }
    }

    let mut out = Traversal {
        truncated,
        ..Traversal::default()
    };
    for (node, symbol) in graph.nodes() {
        if !matches!(symbol.kind, SymbolKind::Function | SymbolKind::Method) {
            continue;
        }
        if symbol.exported || reachable.contains(&node) || is_entry_point(symbol) {
            continue;
        }
        if let Some(scope) = scope {
            if !symbol.file_path.starts_with(scope) && symbol.package != scope {
                continue;
            }
        }
        if out.symbol_ids.len() >= limits.max_results {
            out.truncated = true;
            break;
        }
        out.symbol_ids.push(symbol.id.clone());
    }
    Ok(out)
}

/// Method forms of the query surface, for callers that hold a graph.
impl CodeGraph {
    pub fn callers(
        &self,
        symbol_id: &str,
        depth: Option<usize>,
        limits: &TraversalLimits,
    ) -> Result<Traversal, GraphError> {
        callers(self, symbol_id, depth, limits)
    }

    pub fn callees(
        &self,
        symbol_id: &str,
        depth: Option<usize>,
        limits: &TraversalLimits,
    ) -> Result<Traversal, GraphError> {
        callees(self, symbol_id, depth, limits)
    }

    pub fn implementers(
        &self,
        interface_id: &str,
        limits: &TraversalLimits,
    ) -> Result<Traversal, GraphError> {
        implementers(self, interface_id, limits)
    }

    pub fn entry_points(
        &self,
        package: Option<&str>,
        kind: Option<SymbolKind>,
        limits: &TraversalLimits,
    ) -> Result<Traversal, GraphError> {
        entry_points(self, package, kind, limits)
    }

    pub fn impact(
        &self,
        symbol_id: &str,
        limits: &TraversalLimits,
    ) -> Result<Traversal, GraphError> {
        impact(self, symbol_id, limits)
    }

    pub fn dead_code(
        &self,
        scope: Option<&str>,
        limits: &TraversalLimits,
    ) -> Result<Traversal, GraphError> {
        dead_code(self, scope, limits)
    }
}

enum Direction {
    Incoming,
    Outgoing,
}

fn walk_calls(
    graph: &CodeGraph,
    symbol_id: &str,
    depth: Option<usize>,
    limits: &TraversalLimits,
    direction: Direction,
    kinds: &[EdgeKind],
) -> Result<Traversal, GraphError> {
    require_frozen(graph)?;
    let start = resolve(graph, symbol_id)?;
    let max_depth = depth.unwrap_or(limits.max_depth).min(limits.max_depth);

    let mut out = Traversal::default();
    let mut visited: HashSet<NodeId> = HashSet::from([start]);
    let mut frontier: Vec<NodeId> = vec![start];
    let mut budget = limits.node_budget;

    for _ in 0..max_depth {
        let mut next: Vec<NodeId> = Vec::new();
        for &node in &frontier {
            if budget == 0 {
                out.truncated = true;
                break;
            }
            budget -= 1;
            let edges: Vec<NodeId> = match direction {
                Direction::Incoming => graph
                    .in_edges(node)
                    .filter(|e| kinds.contains(&e.kind))
                    .map(|e| e.src)
                    .collect(),
                Direction::Outgoing => graph
                    .out_edges(node)
                    .filter(|e| kinds.contains(&e.kind))
                    .map(|e| e.dst)
                    .collect(),
            };
            for neighbor in edges {
                if !visited.insert(neighbor) {
                    continue;
                }
                if out.symbol_ids.len() >= limits.max_results {
                    out.truncated = true;
                    continue;
                }
                if let Some(symbol) = graph.node(neighbor) {
                    out.symbol_ids.push(symbol.id.clone());
                }
                next.push(neighbor);
            }
        }
        if next.is_empty() || out.truncated {
            if !next.is_empty() {
                // Bounds were hit with work remaining.
                out.truncated = true;
            }
            break;
        }
        frontier = next;
    }
    Ok(out)
}

fn is_entry_point(symbol: &fathom_core::types::Symbol) -> bool {
    if !matches!(symbol.kind, SymbolKind::Function | SymbolKind::Method) {
        return false;
    }
    // main in a main package or top-level script.
    if symbol.name == "main" || symbol.name == "__main__" {
        return true;
    }
    // Test functions.
    if symbol.name.starts_with("Test") && symbol.exported && symbol.file_path.ends_with("_test.go")
    {
        return true;
    }
    if symbol.name.starts_with("test_") {
        return true;
    }
    // Decorated HTTP handlers (flask/fastapi style routes).
    if let Some(meta) = symbol.metadata.as_ref() {
        let route_like = ["route", "get", "post", "put", "delete", "patch", "websocket"];
        if meta
            .decorators
            .iter()
            .any(|d| route_like.contains(&d.to_ascii_lowercase().as_str()))
        {
            return true;
        }
    }
    // Exported conventional handlers.
    if symbol.exported && (symbol.name.contains("Handler") || symbol.name.starts_with("Handle")) {
        return true;
    }
    false
}

fn require_frozen(graph: &CodeGraph) -> Result<(), GraphError> {
    if graph.is_frozen() {
        Ok(())
    } else {
        Err(GraphError::NotFrozen)
    }
}

fn resolve(graph: &CodeGraph, symbol_id: &str) -> Result<NodeId, GraphError> {
    graph
        .node_id(symbol_id)
        .ok_or_else(|| GraphError::NodeNotFound(symbol_id.to_string()))
}
