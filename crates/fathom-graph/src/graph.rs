//! The directed multigraph of symbols.
//!
//! Symbols live in an arena indexed by integer handles; the string id is
//! an external identifier, not an ownership pointer. Cycles (mutually
//! recursive functions) are just edges. The graph is mutable during
//! build, then frozen: adjacency is sorted into its total order, the
//! inverted index and terminal sets are materialized, and every mutator
//! errors from then on.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use fathom_core::types::{Location, Symbol};

pub type NodeId = usize;

/// Edge types between graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Calls,
    Implements,
    Contains,
    Imports,
    References,
    Overrides,
    Extends,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Calls => "calls",
            EdgeKind::Implements => "implements",
            EdgeKind::Contains => "contains",
            EdgeKind::Imports => "imports",
            EdgeKind::References => "references",
            EdgeKind::Overrides => "overrides",
            EdgeKind::Extends => "extends",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed, located edge between two arena handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub src: NodeId,
    pub dst: NodeId,
    pub kind: EdgeKind,
    pub location: Location,
}

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("graph is frozen; mutation rejected")]
    Frozen,

    #[error("graph is not frozen; queries require freeze() first")]
    NotFrozen,

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("duplicate node id: {0}")]
    DuplicateNode(String),
}

#[derive(Default)]
pub struct CodeGraph {
    nodes: Vec<Symbol>,
    ids: HashMap<String, NodeId>,
    edges: Vec<Edge>,
    /// Per-node edge indexes into `edges`; materialized at freeze.
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    /// Nodes with no incoming `calls` edges.
    sources: Vec<NodeId>,
    /// Nodes with no outgoing `calls` edges.
    sinks: Vec<NodeId>,
    frozen: bool,
}

impl CodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol as a node. The symbol's string id must be unique.
    pub fn add_node(&mut self, symbol: Symbol) -> Result<NodeId, GraphError> {
        if self.frozen {
            return Err(GraphError::Frozen);
        }
        if self.ids.contains_key(&symbol.id) {
            return Err(GraphError::DuplicateNode(symbol.id));
        }
        let node_id = self.nodes.len();
        self.ids.insert(symbol.id.clone(), node_id);
        self.nodes.push(symbol);
        Ok(node_id)
    }

    pub fn add_edge(
        &mut self,
        src: NodeId,
        dst: NodeId,
        kind: EdgeKind,
        location: Location,
    ) -> Result<(), GraphError> {
        if self.frozen {
            return Err(GraphError::Frozen);
        }
        if src >= self.nodes.len() {
            return Err(GraphError::NodeNotFound(format!("#{src}")));
        }
        if dst >= self.nodes.len() {
            return Err(GraphError::NodeNotFound(format!("#{dst}")));
        }
        self.edges.push(Edge {
            src,
            dst,
            kind,
            location,
        });
        Ok(())
    }

    /// Sort adjacency into its total order, build the inverted index,
    /// compute terminal sets, and mark the graph immutable. Idempotent.
    pub fn freeze(&mut self) {
        if self.frozen {
            return;
        }
        // Total order: (edge_type, dst_id, location), with src id as the
        // final tie-breaker so duplicate call sites stay stable.
        self.edges.sort_by(|a, b| {
            (a.kind, &self.nodes[a.dst].id, &a.location, &self.nodes[a.src].id).cmp(&(
                b.kind,
                &self.nodes[b.dst].id,
                &b.location,
                &self.nodes[b.src].id,
            ))
        });
        self.outgoing = vec![Vec::new(); self.nodes.len()];
        self.incoming = vec![Vec::new(); self.nodes.len()];
        for (index, edge) in self.edges.iter().enumerate() {
            self.outgoing[edge.src].push(index);
            self.incoming[edge.dst].push(index);
        }
        self.sources = (0..self.nodes.len())
            .filter(|n| !self.incoming[*n].iter().any(|e| self.edges[*e].kind == EdgeKind::Calls))
            .collect();
        self.sinks = (0..self.nodes.len())
            .filter(|n| !self.outgoing[*n].iter().any(|e| self.edges[*e].kind == EdgeKind::Calls))
            .collect();
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Symbol> {
        self.nodes.get(id)
    }

    /// Resolve a string symbol id to its arena handle.
    pub fn node_id(&self, symbol_id: &str) -> Option<NodeId> {
        self.ids.get(symbol_id).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Symbol)> {
        self.nodes.iter().enumerate()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Outgoing edges of a node in the frozen total order.
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.outgoing
            .get(node)
            .into_iter()
            .flatten()
            .map(|i| &self.edges[*i])
    }

    /// Incoming edges of a node in the frozen total order.
    pub fn in_edges(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.incoming
            .get(node)
            .into_iter()
            .flatten()
            .map(|i| &self.edges[*i])
    }

    /// Nodes with no incoming `calls` edges (frozen graphs only).
    pub fn call_sources(&self) -> &[NodeId] {
        &self.sources
    }

    /// Nodes with no outgoing `calls` edges (frozen graphs only).
    pub fn call_sinks(&self) -> &[NodeId] {
        &self.sinks
    }

    /// Rendered adjacency, usable for determinism comparisons.
    pub fn adjacency_fingerprint(&self) -> Vec<String> {
        self.edges
            .iter()
            .map(|e| {
                format!(
                    "{} {} -> {} @{}:{}",
                    e.kind,
                    self.nodes[e.src].id,
                    self.nodes[e.dst].id,
                    e.location.start_line,
                    e.location.start_col
                )
            })
            .collect()
    }
}
