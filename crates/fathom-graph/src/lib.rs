//! Code-graph construction and queries for fathom.
//!
//! - [`index`] — [`SymbolIndex`](index::SymbolIndex): id / name / package /
//!   kind / file lookups over a batch of parse results
//! - [`graph`] — the arena-backed directed multigraph and its freeze step
//! - [`builder`] — materializes a graph from parse results (contains,
//!   imports, calls, implements, overrides, extends, references)
//! - [`query`] — bounded read-only traversals over a frozen graph

pub mod builder;
pub mod graph;
pub mod index;
pub mod query;

pub use builder::build_graph;
pub use graph::{CodeGraph, Edge, EdgeKind, GraphError, NodeId};
pub use index::SymbolIndex;
