pub mod lint;
pub mod parse;
pub mod query;
pub mod scan;

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use fathom_core::config::FathomConfig;
use fathom_core::metrics::Metrics;
use fathom_graph::{CodeGraph, SymbolIndex};
use fathom_parsers::batch::{parse_paths, FileOutcome};
use fathom_parsers::cache::ParseCache;
use fathom_parsers::registry::default_registry;
use fathom_parsers::walker::FileWalker;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FINDINGS: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Walk, parse in parallel, and hand back per-file outcomes.
pub fn parse_tree(root: &Path, config: &FathomConfig) -> Vec<FileOutcome> {
    let registry = default_registry(config.parser.clone());
    let cache = ParseCache::new();
    let metrics = Arc::new(Metrics::new());
    let paths: Vec<_> = FileWalker::new(root).walk().into_iter().map(|e| e.path).collect();
    parse_paths(&registry, &cache, &metrics, &CancellationToken::new(), &paths)
}

/// Parse a tree and build the frozen graph, skipping failed files.
pub fn build_tree_graph(root: &Path, config: &FathomConfig) -> CodeGraph {
    let outcomes = parse_tree(root, config);
    let pairs: Vec<_> = outcomes
        .into_iter()
        .map(|o| (o.path.display().to_string(), o.result))
        .collect();
    match fathom_graph::builder::build_graph_skipping_failures(&pairs) {
        Ok(graph) => graph,
        Err(_) => CodeGraph::new(),
    }
}

/// Graph plus the symbol index over the same parse results, for commands
/// that accept bare names as well as full symbol ids.
pub struct TreeAnalysis {
    pub graph: CodeGraph,
    pub index: SymbolIndex,
}

pub fn analyze_tree(root: &Path, config: &FathomConfig) -> TreeAnalysis {
    let outcomes = parse_tree(root, config);
    let mut results = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(result) => results.push(result),
            Err(e) => {
                tracing::warn!(file = %outcome.path.display(), error = %e, "skipping file");
            }
        }
    }
    let index = match SymbolIndex::from_results(&results) {
        Ok(index) => index,
        Err(e) => {
            tracing::warn!(error = %e, "symbol index incomplete");
            SymbolIndex::new()
        }
    };
    let graph = fathom_graph::build_graph(&results);
    TreeAnalysis { graph, index }
}
