use std::path::Path;

use fathom_core::config::FathomConfig;

use super::{build_tree_graph, EXIT_ERROR, EXIT_OK};

pub fn run(path: &Path, json: bool) -> i32 {
    if !path.exists() {
        eprintln!("fathom: path does not exist: {}", path.display());
        return EXIT_ERROR;
    }
    let config = FathomConfig::load(path);
    let graph = build_tree_graph(path, &config);

    if json {
        let summary = serde_json::json!({
            "nodes": graph.node_count(),
            "edges": graph.edge_count(),
            "call_sources": graph.call_sources().len(),
            "call_sinks": graph.call_sinks().len(),
        });
        println!("{summary}");
    } else {
        println!(
            "scanned {}: {} nodes, {} edges ({} call roots, {} call leaves)",
            path.display(),
            graph.node_count(),
            graph.edge_count(),
            graph.call_sources().len(),
            graph.call_sinks().len(),
        );
    }
    EXIT_OK
}
