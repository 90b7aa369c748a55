//! Materializes a [`CodeGraph`] from a batch of parse results.
//!
//! Construction is deterministic for a given input order: nodes are
//! inserted in input order, candidate sets are resolved against maps
//! whose value vectors preserve insertion order, ambiguous matches fan
//! out into multiple edges sorted by target id, and the freeze step
//! imposes the final total order on adjacency.

use std::collections::HashMap;
use std::path::Path;

use fathom_core::error::ParseError;
use fathom_core::types::{
    symbol_id, CallSite, Language, Location, ParseResult, Symbol, SymbolKind,
};

use crate::graph::{CodeGraph, EdgeKind, GraphError, NodeId};

/// Extensions tried when resolving an extensionless import specifier to a
/// parsed file.
const IMPORT_RESOLUTION_SUFFIXES: &[&str] = &[
    "", ".ts", ".tsx", ".js", ".jsx", ".py", "/index.ts", "/index.js", "/__init__.py",
];

#[derive(Default)]
struct BuildState {
    file_nodes: HashMap<String, NodeId>,
    external_nodes: HashMap<String, NodeId>,
    /// Type-like symbols (struct, class, interface, type) by bare name.
    type_by_name: HashMap<String, Vec<NodeId>>,
    /// Methods by (receiver type, method name).
    method_by_recv: HashMap<(String, String), Vec<NodeId>>,
    callable_by_name: HashMap<String, Vec<NodeId>>,
    callable_by_file_name: HashMap<(String, String), Vec<NodeId>>,
    callable_by_pkg_name: HashMap<(String, String), Vec<NodeId>>,
    package_nodes: HashMap<String, Vec<NodeId>>,
    /// Import alias -> package name, per importing file.
    file_aliases: HashMap<(String, String), String>,
    callers: Vec<CallerRecord>,
    top_methods: Vec<NodeId>,
    interfaces: Vec<NodeId>,
    method_carriers: Vec<NodeId>,
    extenders: Vec<NodeId>,
}

struct CallerRecord {
    node: NodeId,
    file: String,
    package: String,
    calls: Vec<CallSite>,
}

struct PendingEdge {
    src: NodeId,
    dst: NodeId,
    kind: EdgeKind,
    location: Location,
}

/// Build and freeze a graph over successfully parsed files.
pub fn build_graph<'a, I>(results: I) -> CodeGraph
where
    I: IntoIterator<Item = &'a ParseResult>,
{
    let mut graph = CodeGraph::new();
    let mut state = BuildState::default();
    let results: Vec<&ParseResult> = results.into_iter().collect();
    let span = tracing::debug_span!("graph_build", files = results.len());
    let _guard = span.enter();

    for result in &results {
        insert_file(&mut graph, &mut state, result);
    }
    link_imports(&mut graph, &mut state, &results);
    link_methods_to_types(&mut graph, &state);
    link_calls(&mut graph, &state);
    link_implements(&mut graph, &state);
    link_extends(&mut graph, &state);

    graph.freeze();
    graph
}

/// Build a graph from mixed per-file outcomes, skipping failures with a
/// build-level warning. Cancellation is the one error that still aborts.
pub fn build_graph_skipping_failures(
    outcomes: &[(String, Result<ParseResult, ParseError>)],
) -> Result<CodeGraph, ParseError> {
    let mut ok: Vec<&ParseResult> = Vec::new();
    for (file, outcome) in outcomes {
        match outcome {
            Ok(result) => ok.push(result),
            Err(ParseError::Canceled) => return Err(ParseError::Canceled),
            Err(e) => {
                tracing::warn!(file = file.as_str(), error = %e, "skipping file in graph build");
            }
        }
    }
    Ok(build_graph(ok))
}

fn insert_file(graph: &mut CodeGraph, state: &mut BuildState, result: &ParseResult) {
    let file_node = match graph.add_node(file_symbol(result)) {
        Ok(node) => node,
        Err(GraphError::DuplicateNode(id)) => {
            tracing::warn!(id, "duplicate file node, reusing existing");
            match graph.node_id(&id) {
                Some(existing) => existing,
                None => return,
            }
        }
        Err(_) => return,
    };
    state.file_nodes.insert(result.file_path.clone(), file_node);

    for import in &result.imports {
        let alias = if import.alias.is_empty() {
            import.path.rsplit('/').next().unwrap_or(&import.path)
        } else {
            &import.alias
        };
        if !alias.is_empty() && alias != "_" && alias != "." {
            state.file_aliases.insert(
                (result.file_path.clone(), alias.to_string()),
                package_name_of(&import.path),
            );
        }
    }

    for symbol in &result.symbols {
        insert_symbol(graph, state, symbol, file_node, true);
    }
}

fn insert_symbol(
    graph: &mut CodeGraph,
    state: &mut BuildState,
    symbol: &Symbol,
    parent: NodeId,
    top_level: bool,
) {
    let node = match graph.add_node(symbol.clone()) {
        Ok(node) => node,
        Err(GraphError::DuplicateNode(id)) => {
            tracing::warn!(id, "duplicate symbol id, skipping node");
            return;
        }
        Err(_) => return,
    };
    let _ = graph.add_edge(parent, node, EdgeKind::Contains, symbol.location());

    register_symbol(state, symbol, node, top_level);

    for child in &symbol.children {
        insert_symbol(graph, state, child, node, false);
    }
}

fn register_symbol(state: &mut BuildState, symbol: &Symbol, node: NodeId, top_level: bool) {
    match symbol.kind {
        SymbolKind::Package => {
            state.package_nodes.entry(symbol.name.clone()).or_default().push(node);
        }
        SymbolKind::Struct | SymbolKind::Class | SymbolKind::Interface | SymbolKind::Type => {
            state.type_by_name.entry(symbol.name.clone()).or_default().push(node);
        }
        _ => {}
    }

    let callable = matches!(
        symbol.kind,
        SymbolKind::Function | SymbolKind::Method | SymbolKind::Class
    );
    if callable {
        state
            .callable_by_name
            .entry(symbol.name.clone())
            .or_default()
            .push(node);
        state
            .callable_by_file_name
            .entry((symbol.file_path.clone(), symbol.name.clone()))
            .or_default()
            .push(node);
        if !symbol.package.is_empty() {
            state
                .callable_by_pkg_name
                .entry((symbol.package.clone(), symbol.name.clone()))
                .or_default()
                .push(node);
        }
    }

    if symbol.kind == SymbolKind::Method && !symbol.receiver.is_empty() {
        state
            .method_by_recv
            .entry((symbol.receiver.clone(), symbol.name.clone()))
            .or_default()
            .push(node);
        if top_level {
            state.top_methods.push(node);
        }
    }

    let has_method_set = symbol
        .metadata
        .as_ref()
        .is_some_and(|m| !m.methods.is_empty());
    if symbol.kind == SymbolKind::Interface && has_method_set {
        state.interfaces.push(node);
    }
    if has_method_set
        && matches!(symbol.kind, SymbolKind::Struct | SymbolKind::Class | SymbolKind::Type)
    {
        state.method_carriers.push(node);
    }
    if symbol
        .metadata
        .as_ref()
        .is_some_and(|m| !m.extends.is_empty() || !m.implements.is_empty())
    {
        state.extenders.push(node);
    }

    if !symbol.calls.is_empty() {
        state.callers.push(CallerRecord {
            node,
            file: symbol.file_path.clone(),
            package: symbol.package.clone(),
            calls: symbol.calls.clone(),
        });
    }
}

fn file_symbol(result: &ParseResult) -> Symbol {
    let basename = Path::new(&result.file_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(&result.file_path);
    let end_line = result
        .symbols
        .iter()
        .map(|s| s.end_line)
        .max()
        .unwrap_or(1);
    let mut sym = Symbol::new(
        basename,
        SymbolKind::File,
        &result.file_path,
        result.language,
        1,
        end_line.max(1),
        0,
        0,
    );
    sym.exported = true;
    sym.package = result
        .symbols
        .iter()
        .find(|s| s.kind == SymbolKind::Package)
        .map(|s| s.name.clone())
        .unwrap_or_default();
    sym
}

fn package_name_of(import_path: &str) -> String {
    import_path
        .rsplit('/')
        .next()
        .unwrap_or(import_path)
        .to_string()
}

fn link_imports(graph: &mut CodeGraph, state: &mut BuildState, results: &[&ParseResult]) {
    // Normalized path -> file node, so "./util" matches "util.ts".
    let normalized: HashMap<String, NodeId> = state
        .file_nodes
        .iter()
        .map(|(path, node)| (normalize_path(path), *node))
        .collect();

    let mut pending: Vec<PendingEdge> = Vec::new();
    let mut externals: Vec<(String, Language)> = Vec::new();

    for result in results {
        let Some(&file_node) = state.file_nodes.get(&result.file_path) else {
            continue;
        };
        for import in &result.imports {
            let target = resolve_import_target(graph, state, &normalized, import.path.as_str());
            match target {
                Some(dst) => pending.push(PendingEdge {
                    src: file_node,
                    dst,
                    kind: EdgeKind::Imports,
                    location: import.location.clone(),
                }),
                None => externals.push((import.path.clone(), result.language)),
            }
        }
    }

    // Create external nodes in deterministic first-seen order.
    for (path, language) in &externals {
        if state.external_nodes.contains_key(path) {
            continue;
        }
        let node = match graph.add_node(external_symbol(path, *language)) {
            Ok(node) => node,
            Err(_) => continue,
        };
        state.external_nodes.insert(path.clone(), node);
    }

    for result in results {
        let Some(&file_node) = state.file_nodes.get(&result.file_path) else {
            continue;
        };
        for import in &result.imports {
            if let Some(&dst) = state.external_nodes.get(&import.path) {
                pending.push(PendingEdge {
                    src: file_node,
                    dst,
                    kind: EdgeKind::Imports,
                    location: import.location.clone(),
                });
            }
            // Named imports that resolve into a parsed file become
            // `references` edges from the importing file.
            if !import.names.is_empty() {
                if let Some(dst_file) =
                    resolve_import_target(graph, state, &normalized, import.path.as_str())
                {
                    if let Some(target_path) = graph.node(dst_file).map(|s| s.file_path.clone()) {
                        for name in &import.names {
                            let mut targets: Vec<NodeId> = state
                                .callable_by_file_name
                                .get(&(target_path.clone(), name.clone()))
                                .cloned()
                                .unwrap_or_default();
                            sort_by_symbol_id(graph, &mut targets);
                            for dst in targets {
                                pending.push(PendingEdge {
                                    src: file_node,
                                    dst,
                                    kind: EdgeKind::References,
                                    location: import.location.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }
    }

    apply(graph, pending);
}

fn resolve_import_target(
    graph: &CodeGraph,
    state: &BuildState,
    normalized: &HashMap<String, NodeId>,
    import_path: &str,
) -> Option<NodeId> {
    let base = normalize_path(import_path);
    for suffix in IMPORT_RESOLUTION_SUFFIXES {
        if let Some(&node) = normalized.get(&format!("{base}{suffix}")) {
            return Some(node);
        }
    }
    // Go-style package import: the last segment names a parsed package.
    let last = package_name_of(import_path);
    let candidates = state.package_nodes.get(&last)?;
    candidates
        .iter()
        .min_by_key(|n| graph.node(**n).map(|s| s.id.clone()))
        .copied()
}

fn normalize_path(path: &str) -> String {
    path.trim_start_matches("./").to_string()
}

fn external_symbol(path: &str, language: Language) -> Symbol {
    Symbol {
        id: format!("external:{path}"),
        name: path.to_string(),
        kind: SymbolKind::Module,
        file_path: String::new(),
        start_line: 1,
        end_line: 1,
        start_col: 0,
        end_col: 0,
        language,
        signature: format!("import {path}"),
        doc_comment: String::new(),
        exported: true,
        package: String::new(),
        receiver: String::new(),
        metadata: None,
        children: Vec::new(),
        calls: Vec::new(),
    }
}

/// `overrides` edges: each top-level method points at its receiver type.
fn link_methods_to_types(graph: &mut CodeGraph, state: &BuildState) {
    let mut pending: Vec<PendingEdge> = Vec::new();
    for &method in &state.top_methods {
        let Some(symbol) = graph.node(method) else { continue };
        let candidates = state.type_by_name.get(&symbol.receiver);
        let Some(candidates) = candidates else { continue };
        let best = best_candidate(graph, candidates, &symbol.file_path, &symbol.package);
        if let Some(dst) = best {
            pending.push(PendingEdge {
                src: method,
                dst,
                kind: EdgeKind::Overrides,
                location: symbol.location(),
            });
        }
    }
    apply(graph, pending);
}

/// Same-file, then same-package, then global; ties broken by symbol id.
fn best_candidate(
    graph: &CodeGraph,
    candidates: &[NodeId],
    file: &str,
    package: &str,
) -> Option<NodeId> {
    let pick = |filtered: Vec<NodeId>| -> Option<NodeId> {
        filtered
            .into_iter()
            .min_by_key(|n| graph.node(*n).map(|s| s.id.clone()))
    };
    let same_file: Vec<NodeId> = candidates
        .iter()
        .copied()
        .filter(|n| graph.node(*n).is_some_and(|s| s.file_path == file))
        .collect();
    if !same_file.is_empty() {
        return pick(same_file);
    }
    if !package.is_empty() {
        let same_pkg: Vec<NodeId> = candidates
            .iter()
            .copied()
            .filter(|n| graph.node(*n).is_some_and(|s| s.package == package))
            .collect();
        if !same_pkg.is_empty() {
            return pick(same_pkg);
        }
    }
    pick(candidates.to_vec())
}

fn link_calls(graph: &mut CodeGraph, state: &BuildState) {
    let mut pending: Vec<PendingEdge> = Vec::new();
    for caller in &state.callers {
        for call in &caller.calls {
            let mut targets = resolve_call(graph, state, caller, call);
            sort_by_symbol_id(graph, &mut targets);
            targets.dedup();
            for dst in targets {
                pending.push(PendingEdge {
                    src: caller.node,
                    dst,
                    kind: EdgeKind::Calls,
                    location: call.location.clone(),
                });
            }
        }
    }
    apply(graph, pending);
}

/// Matching order: receiver-type method, package-qualified name, then
/// unqualified lookup narrowed same-file -> same-package -> global.
/// Ambiguity returns every match; the caller fans out one edge each.
fn resolve_call(
    graph: &CodeGraph,
    state: &BuildState,
    caller: &CallerRecord,
    call: &CallSite,
) -> Vec<NodeId> {
    if call.is_method && !call.receiver.is_empty() {
        if let Some(matches) = state
            .method_by_recv
            .get(&(call.receiver.clone(), call.target.clone()))
        {
            return matches.clone();
        }
        // The receiver may be a package identifier or an import alias.
        let package = state
            .file_aliases
            .get(&(caller.file.clone(), call.receiver.clone()))
            .cloned()
            .unwrap_or_else(|| call.receiver.clone());
        if let Some(matches) = state
            .callable_by_pkg_name
            .get(&(package, call.target.clone()))
        {
            return matches.clone();
        }
        // Variable receivers (`c.Get()`, `self.run()`) carry no type
        // information here; fall through to the unqualified tiers.
    }

    if let Some(matches) = state
        .callable_by_file_name
        .get(&(caller.file.clone(), call.target.clone()))
    {
        return matches.clone();
    }
    if !caller.package.is_empty() {
        if let Some(matches) = state
            .callable_by_pkg_name
            .get(&(caller.package.clone(), call.target.clone()))
        {
            return matches.clone();
        }
    }
    state
        .callable_by_name
        .get(&call.target)
        .cloned()
        .unwrap_or_default()
}

/// Structural satisfaction: every interface method is matched by name,
/// param count, and return count on the candidate's method set.
fn link_implements(graph: &mut CodeGraph, state: &BuildState) {
    let mut pending: Vec<PendingEdge> = Vec::new();
    for &interface in &state.interfaces {
        let Some(iface_sym) = graph.node(interface) else { continue };
        let Some(iface_methods) = iface_sym.metadata.as_ref().map(|m| &m.methods) else {
            continue;
        };
        for &candidate in &state.method_carriers {
            if candidate == interface {
                continue;
            }
            let Some(cand_sym) = graph.node(candidate) else { continue };
            let Some(cand_methods) = cand_sym.metadata.as_ref().map(|m| &m.methods) else {
                continue;
            };
            let satisfied = iface_methods.iter().all(|im| {
                cand_methods.iter().any(|cm| {
                    cm.name == im.name
                        && cm.param_count == im.param_count
                        && cm.return_count == im.return_count
                })
            });
            if satisfied {
                pending.push(PendingEdge {
                    src: candidate,
                    dst: interface,
                    kind: EdgeKind::Implements,
                    location: cand_sym.location(),
                });
            }
        }
    }
    apply(graph, pending);
}

/// Declared inheritance from class metadata: `extends` and (TS) declared
/// `implements` clauses.
fn link_extends(graph: &mut CodeGraph, state: &BuildState) {
    let mut pending: Vec<PendingEdge> = Vec::new();
    for &node in &state.extenders {
        let Some(symbol) = graph.node(node) else { continue };
        let Some(meta) = symbol.metadata.as_ref() else { continue };

        if !meta.extends.is_empty() {
            let base = bare_type_name(&meta.extends);
            if let Some(candidates) = state.type_by_name.get(base) {
                if let Some(dst) =
                    best_candidate(graph, candidates, &symbol.file_path, &symbol.package)
                {
                    if dst != node {
                        pending.push(PendingEdge {
                            src: node,
                            dst,
                            kind: EdgeKind::Extends,
                            location: symbol.location(),
                        });
                    }
                }
            }
        }
        for implemented in &meta.implements {
            let name = bare_type_name(implemented);
            if let Some(candidates) = state.type_by_name.get(name) {
                if let Some(dst) =
                    best_candidate(graph, candidates, &symbol.file_path, &symbol.package)
                {
                    if dst != node {
                        pending.push(PendingEdge {
                            src: node,
                            dst,
                            kind: EdgeKind::Implements,
                            location: symbol.location(),
                        });
                    }
                }
            }
        }
    }
    apply(graph, pending);
}

fn bare_type_name(text: &str) -> &str {
    let no_generics = text.split('<').next().unwrap_or(text);
    no_generics.rsplit('.').next().unwrap_or(no_generics).trim()
}

fn sort_by_symbol_id(graph: &CodeGraph, nodes: &mut [NodeId]) {
    nodes.sort_by_key(|n| graph.node(*n).map(|s| s.id.clone()));
}

fn apply(graph: &mut CodeGraph, pending: Vec<PendingEdge>) {
    for edge in pending {
        let _ = graph.add_edge(edge.src, edge.dst, edge.kind, edge.location);
    }
}

/// Canonical id of a graph-built file node.
pub fn file_node_id(file_path: &str) -> String {
    let basename = Path::new(file_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_path);
    symbol_id(file_path, 1, basename)
}
