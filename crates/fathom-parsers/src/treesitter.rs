//! Shared tree-sitter plumbing.
//!
//! Node-type strings are private constants inside each language module;
//! nothing tree-sitter-specific leaks past the parser boundary. This
//! module holds the pieces every front-end shares: running a grammar,
//! slicing node text, 1-indexed location conversion, doc-comment harvest,
//! and collecting human-readable messages for error subtrees.

use tree_sitter::{Node, Tree};

use fathom_core::error::ParseError;
use fathom_core::types::Location;

/// Messages harvested per tree are capped to keep `errors[]` readable on
/// badly broken inputs.
const MAX_SYNTAX_ERRORS: usize = 50;

/// Run a grammar over source. A `None` from the library is a hard
/// [`ParseError::ParseFailed`]; a tree containing error nodes is not.
pub fn parse_source(language: &tree_sitter::Language, source: &str) -> Result<Tree, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(language)
        .map_err(|_| ParseError::ParseFailed)?;
    parser
        .parse(source.as_bytes(), None)
        .ok_or(ParseError::ParseFailed)
}

/// Node text as a borrowed slice; empty on any UTF-8 slicing issue.
pub fn node_text<'a>(node: Node<'_>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// 1-indexed start line.
pub fn start_line(node: Node<'_>) -> u32 {
    node.start_position().row as u32 + 1
}

/// 1-indexed end line.
pub fn end_line(node: Node<'_>) -> u32 {
    node.end_position().row as u32 + 1
}

/// A node's source range with 1-indexed lines and 0-indexed columns.
pub fn location_of(node: Node<'_>, file_path: &str) -> Location {
    Location {
        file_path: file_path.to_string(),
        start_line: start_line(node),
        end_line: end_line(node),
        start_col: node.start_position().column as u32,
        end_col: node.end_position().column as u32,
    }
}

/// Collapse a multi-line declaration slice into a one-line signature.
pub fn one_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_was_space && !out.is_empty() {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.trim_end().to_string()
}

/// Harvest the contiguous comment block ending on the line directly above
/// `node`, verbatim. Returns an empty string when there is none.
pub fn doc_comment_above(node: Node<'_>, source: &[u8]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut expected_row = node.start_position().row;
    let mut prev = node.prev_sibling();
    while let Some(sibling) = prev {
        if sibling.kind() != "comment" {
            break;
        }
        let end_row = sibling.end_position().row;
        if end_row + 1 != expected_row && end_row != expected_row {
            break;
        }
        lines.push(node_text(sibling, source).to_string());
        expected_row = sibling.start_position().row;
        prev = sibling.prev_sibling();
    }
    lines.reverse();
    lines.join("\n")
}

/// Walk the tree and render human-readable messages for error and missing
/// nodes. Extraction continues past these; the messages land in
/// `ParseResult.errors`.
pub fn collect_syntax_errors(root: Node<'_>, source: &[u8]) -> Vec<String> {
    let mut errors = Vec::new();
    if !root.has_error() {
        return errors;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if errors.len() >= MAX_SYNTAX_ERRORS {
            errors.push("further syntax errors omitted".to_string());
            break;
        }
        if node.is_error() {
            let snippet: String = node_text(node, source).chars().take(40).collect();
            errors.push(format!(
                "syntax error at line {}, column {}: {:?}",
                node.start_position().row + 1,
                node.start_position().column,
                snippet
            ));
            continue;
        }
        if node.is_missing() {
            errors.push(format!(
                "missing {} at line {}, column {}",
                node.kind(),
                node.start_position().row + 1,
                node.start_position().column
            ));
            continue;
        }
        if node.has_error() {
            for i in (0..node.child_count()).rev() {
                if let Some(child) = node.child(i) {
                    stack.push(child);
                }
            }
        }
    }
    errors
}

/// Iterate the named children of a node into a Vec (cursor-free helper).
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    (0..node.named_child_count())
        .filter_map(|i| node.named_child(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_line_collapses_whitespace() {
        assert_eq!(
            one_line("func main(\n    a int,\n    b int,\n)"),
            "func main( a int, b int, )"
        );
    }

    #[test]
    fn test_parse_source_go() {
        let tree = parse_source(&tree_sitter_go::LANGUAGE.into(), "package main").unwrap();
        assert_eq!(tree.root_node().kind(), "source_file");
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_collect_syntax_errors_on_broken_input() {
        let tree = parse_source(
            &tree_sitter_go::LANGUAGE.into(),
            "package main\nfunc {{{ nonsense",
        )
        .unwrap();
        let errors = collect_syntax_errors(tree.root_node(), b"package main\nfunc {{{ nonsense");
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_collect_syntax_errors_clean_tree() {
        let source = "package main\nfunc main() {}\n";
        let tree = parse_source(&tree_sitter_go::LANGUAGE.into(), source).unwrap();
        assert!(collect_syntax_errors(tree.root_node(), source.as_bytes()).is_empty());
    }
}
