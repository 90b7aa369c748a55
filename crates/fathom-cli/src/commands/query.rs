use fathom_core::config::FathomConfig;
use fathom_graph::query::{self, Traversal};
use fathom_graph::{CodeGraph, GraphError};

use crate::cli_args::QueryCommand;

use super::{analyze_tree, TreeAnalysis, EXIT_ERROR, EXIT_OK};

pub fn run(command: &QueryCommand, json: bool) -> i32 {
    let root = match command {
        QueryCommand::Callers { root, .. }
        | QueryCommand::Callees { root, .. }
        | QueryCommand::Implementers { root, .. }
        | QueryCommand::EntryPoints { root, .. }
        | QueryCommand::Impact { root, .. }
        | QueryCommand::DeadCode { root, .. } => root,
    };
    if !root.exists() {
        eprintln!("fathom: path does not exist: {}", root.display());
        return EXIT_ERROR;
    }
    let config = FathomConfig::load(root);
    let analysis = analyze_tree(root, &config);
    let limits = &config.graph;

    let traversal: Result<Traversal, GraphError> = match command {
        QueryCommand::Callers { id, depth, .. } => match resolve_symbol_arg(&analysis, id) {
            Ok(id) => query::callers(&analysis.graph, &id, *depth, limits),
            Err(message) => return fail(&message),
        },
        QueryCommand::Callees { id, depth, .. } => match resolve_symbol_arg(&analysis, id) {
            Ok(id) => query::callees(&analysis.graph, &id, *depth, limits),
            Err(message) => return fail(&message),
        },
        QueryCommand::Implementers { id, .. } => match resolve_symbol_arg(&analysis, id) {
            Ok(id) => query::implementers(&analysis.graph, &id, limits),
            Err(message) => return fail(&message),
        },
        QueryCommand::EntryPoints { package, .. } => {
            query::entry_points(&analysis.graph, package.as_deref(), None, limits)
        }
        QueryCommand::Impact { id, .. } => match resolve_symbol_arg(&analysis, id) {
            Ok(id) => query::impact(&analysis.graph, &id, limits),
            Err(message) => return fail(&message),
        },
        QueryCommand::DeadCode { scope, .. } => {
            query::dead_code(&analysis.graph, scope.as_deref(), limits)
        }
    };

    match traversal {
        Ok(traversal) => {
            render(&analysis.graph, &traversal, json);
            EXIT_OK
        }
        Err(e) => fail(&format!("query failed: {e}")),
    }
}

/// Accept either a full `path:line:name` id or a bare symbol name. Bare
/// names resolve through the symbol index and must be unambiguous.
fn resolve_symbol_arg(analysis: &TreeAnalysis, arg: &str) -> Result<String, String> {
    if analysis.graph.node_id(arg).is_some() {
        return Ok(arg.to_string());
    }
    let matches = analysis.index.lookup_by_name(arg);
    match matches.len() {
        0 => Err(format!("no symbol named {arg:?}")),
        1 => Ok(matches[0].id.clone()),
        _ => {
            let mut ids: Vec<&str> = matches.iter().map(|s| s.id.as_str()).collect();
            ids.sort_unstable();
            Err(format!("ambiguous name {arg:?}: {}", ids.join(", ")))
        }
    }
}

fn fail(message: &str) -> i32 {
    eprintln!("fathom: {message}");
    EXIT_ERROR
}

fn render(graph: &CodeGraph, traversal: &Traversal, json: bool) {
    if json {
        match serde_json::to_string_pretty(traversal) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => eprintln!("fathom: failed to render traversal: {e}"),
        }
        return;
    }
    for id in &traversal.symbol_ids {
        match graph.node_id(id).and_then(|n| graph.node(n)) {
            Some(symbol) => println!("{} {} ({})", symbol.kind, id, symbol.signature),
            None => println!("{id}"),
        }
    }
    if traversal.truncated {
        println!("... truncated");
    }
    if traversal.symbol_ids.is_empty() {
        println!("(no matches)");
    }
}
