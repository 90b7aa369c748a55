//! Dockerfile front-end.
//!
//! Dockerfiles are line-oriented `INSTRUCTION args...` records, which the
//! bash grammar models as commands; the dockerfile grammar crate is
//! pinned to an old tree-sitter ABI, so the bash grammar does the lexing
//! here. Extracts stages (aliased `FROM`), base-image imports, `ARG`,
//! `ENV`, `LABEL`, `EXPOSE`, and `VOLUME` (JSON-array form included);
//! remaining recognized instructions become plain instruction symbols.

use tokio_util::sync::CancellationToken;
use tree_sitter::Node;

use fathom_core::config::ParserLimits;
use fathom_core::error::ParseError;
use fathom_core::types::{Import, Language, ParseResult, Symbol, SymbolKind};

use crate::parser::{check_input, finish, Parser};
use crate::treesitter::{
    collect_syntax_errors, end_line, location_of, named_children, node_text, one_line,
    parse_source, start_line,
};

const COMMAND: &str = "command";

const OTHER_INSTRUCTIONS: &[&str] = &[
    "RUN",
    "CMD",
    "COPY",
    "ADD",
    "WORKDIR",
    "ENTRYPOINT",
    "USER",
    "SHELL",
    "HEALTHCHECK",
    "ONBUILD",
    "STOPSIGNAL",
    "MAINTAINER",
];

pub struct DockerfileParser {
    limits: ParserLimits,
}

impl DockerfileParser {
    pub fn new(limits: ParserLimits) -> Self {
        Self { limits }
    }
}

impl Parser for DockerfileParser {
    fn language(&self) -> Language {
        Language::Dockerfile
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["dockerfile"]
    }

    fn parse(
        &self,
        ctx: &CancellationToken,
        content: &[u8],
        file_path: &str,
    ) -> Result<ParseResult, ParseError> {
        let input = check_input(ctx, content, file_path, &self.limits)?;
        let tree = parse_source(&tree_sitter_bash::LANGUAGE.into(), input.source)?;
        let root = tree.root_node();
        let bytes = input.source.as_bytes();

        let errors = collect_syntax_errors(root, bytes);
        let mut symbols: Vec<Symbol> = Vec::new();
        let mut imports: Vec<Import> = Vec::new();

        for node in named_children(root) {
            let Some(command) = first_command(node) else {
                continue;
            };
            let Some(name_node) = command.child_by_field_name("name") else {
                continue;
            };
            let instruction = node_text(name_node, bytes).to_ascii_uppercase();
            let args = command_arguments(command, bytes);
            let line = one_line(node_text(command, bytes));

            match instruction.as_str() {
                "FROM" => from_instruction(command, &args, &line, bytes, file_path, &mut symbols, &mut imports),
                "ARG" => {
                    for arg in &args {
                        let name = arg.split('=').next().unwrap_or(arg);
                        push_symbol(&mut symbols, command, name, SymbolKind::Arg, &line, file_path);
                    }
                }
                "ENV" => env_like(&mut symbols, command, &args, SymbolKind::EnvVar, &line, file_path),
                "LABEL" => env_like(&mut symbols, command, &args, SymbolKind::Label, &line, file_path),
                "EXPOSE" => {
                    for arg in &args {
                        push_symbol(&mut symbols, command, arg, SymbolKind::Port, &line, file_path);
                    }
                }
                "VOLUME" => {
                    for volume in volume_paths(&args) {
                        push_symbol(&mut symbols, command, &volume, SymbolKind::Volume, &line, file_path);
                    }
                }
                other if OTHER_INSTRUCTIONS.contains(&other) => {
                    push_symbol(&mut symbols, command, other, SymbolKind::Instruction, &line, file_path);
                }
                _ => {}
            }
        }

        finish(ctx, file_path, Language::Dockerfile, input.hash, symbols, imports, errors)
    }
}

/// `RUN a && b` parses as a connective list; the instruction keyword is
/// the first command's name.
fn first_command(node: Node<'_>) -> Option<Node<'_>> {
    if node.kind() == COMMAND {
        return Some(node);
    }
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.kind() == COMMAND {
            return Some(current);
        }
        for child in named_children(current).into_iter().rev() {
            stack.push(child);
        }
    }
    None
}

fn command_arguments(command: Node<'_>, source: &[u8]) -> Vec<String> {
    let name_id = command
        .child_by_field_name("name")
        .map(|n| n.id())
        .unwrap_or(0);
    named_children(command)
        .into_iter()
        .filter(|c| c.id() != name_id)
        .map(|c| node_text(c, source).to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn from_instruction(
    command: Node<'_>,
    args: &[String],
    line: &str,
    _source: &[u8],
    file_path: &str,
    symbols: &mut Vec<Symbol>,
    imports: &mut Vec<Import>,
) {
    let image = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_default();
    if !image.is_empty() {
        imports.push(Import {
            path: image,
            location: location_of(command, file_path),
            ..Import::default()
        });
    }
    // A stage symbol exists only for the aliased form `FROM image AS name`.
    let stage = args
        .iter()
        .position(|a| a.eq_ignore_ascii_case("as"))
        .and_then(|i| args.get(i + 1));
    if let Some(stage) = stage {
        push_symbol(symbols, command, stage, SymbolKind::Stage, line, file_path);
    }
}

/// `KEY=value` pairs (or the legacy `KEY value` form) shared by ENV and
/// LABEL.
fn env_like(
    symbols: &mut Vec<Symbol>,
    command: Node<'_>,
    args: &[String],
    kind: SymbolKind,
    line: &str,
    file_path: &str,
) {
    let pairs: Vec<&String> = args.iter().filter(|a| a.contains('=')).collect();
    if pairs.is_empty() {
        if let Some(first) = args.first() {
            push_symbol(symbols, command, first, kind, line, file_path);
        }
        return;
    }
    for pair in pairs {
        let key = pair.split('=').next().unwrap_or(pair);
        let key = key.trim_matches('"');
        if !key.is_empty() {
            push_symbol(symbols, command, key, kind, line, file_path);
        }
    }
}

/// Accepts both `VOLUME /data /logs` and `VOLUME ["/data", "/logs"]`.
/// The JSON-array form may arrive re-tokenized, so the args are rejoined
/// before splitting.
fn volume_paths(args: &[String]) -> Vec<String> {
    let joined = args.join(" ");
    let items: Vec<&str> = if joined.trim_start().starts_with('[') {
        joined
            .trim()
            .trim_matches(|c| c == '[' || c == ']')
            .split(',')
            .collect()
    } else {
        joined.split_whitespace().collect()
    };
    items
        .into_iter()
        .map(|p| p.trim().trim_matches('"').to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

fn push_symbol(
    symbols: &mut Vec<Symbol>,
    node: Node<'_>,
    name: &str,
    kind: SymbolKind,
    signature: &str,
    file_path: &str,
) {
    let mut sym = Symbol::new(
        name,
        kind,
        file_path,
        Language::Dockerfile,
        start_line(node),
        end_line(node),
        node.start_position().column as u32,
        node.end_position().column as u32,
    );
    sym.signature = signature.to_string();
    sym.exported = true;
    symbols.push(sym);
}
