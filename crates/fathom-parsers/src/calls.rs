//! Call-site extraction shared by the code-language front-ends.
//!
//! One iterative engine, parameterized by the grammar's node-type names
//! for a call and a member access. Uses an explicit depth-tagged stack:
//! depth is capped at the configured limit, the site count is capped, and
//! cancellation is checked every 100 pops so a pathological body cannot
//! pin a worker.

use tokio_util::sync::CancellationToken;
use tree_sitter::Node;

use fathom_core::config::ParserLimits;
use fathom_core::error::ParseError;
use fathom_core::types::CallSite;

use crate::treesitter::{location_of, node_text};

const CANCEL_CHECK_INTERVAL: usize = 100;

/// Grammar-specific node names for the call shapes of one language.
pub struct CallSyntax {
    /// Node kind of a call expression.
    pub call_node: &'static str,
    /// Field holding the callee inside a call node.
    pub callee_field: &'static str,
    /// Node kind of a member/selector/attribute access.
    pub member_node: &'static str,
    /// Field holding the receiver expression inside a member access.
    pub object_field: &'static str,
    /// Field holding the member name inside a member access.
    pub name_field: &'static str,
}

pub const GO_CALLS: CallSyntax = CallSyntax {
    call_node: "call_expression",
    callee_field: "function",
    member_node: "selector_expression",
    object_field: "operand",
    name_field: "field",
};

pub const PYTHON_CALLS: CallSyntax = CallSyntax {
    call_node: "call",
    callee_field: "function",
    member_node: "attribute",
    object_field: "object",
    name_field: "attribute",
};

pub const ECMA_CALLS: CallSyntax = CallSyntax {
    call_node: "call_expression",
    callee_field: "function",
    member_node: "member_expression",
    object_field: "object",
    name_field: "property",
};

/// Extract call sites from a symbol body by iterative traversal.
///
/// Returns `Canceled` if the context fires mid-walk; caps are enforced
/// silently apart from a debug log so oversized bodies still produce a
/// usable (partial) call list.
pub fn extract_calls(
    ctx: &CancellationToken,
    body: Node<'_>,
    source: &[u8],
    file_path: &str,
    syntax: &CallSyntax,
    limits: &ParserLimits,
) -> Result<Vec<CallSite>, ParseError> {
    let mut sites = Vec::new();
    let mut stack: Vec<(Node<'_>, usize)> = vec![(body, 0)];
    let mut pops = 0usize;
    let mut capped = false;

    while let Some((node, depth)) = stack.pop() {
        pops += 1;
        if pops % CANCEL_CHECK_INTERVAL == 0 && ctx.is_cancelled() {
            return Err(ParseError::Canceled);
        }

        if node.kind() == syntax.call_node {
            if sites.len() >= limits.max_call_sites {
                capped = true;
            } else if let Some(site) = call_site_of(node, source, file_path, syntax) {
                sites.push(site);
            }
        }

        if depth < limits.max_call_depth {
            // Reverse push keeps extraction in source order.
            for i in (0..node.named_child_count()).rev() {
                if let Some(child) = node.named_child(i) {
                    stack.push((child, depth + 1));
                }
            }
        } else {
            capped = true;
        }
    }

    if capped {
        tracing::debug!(
            file = file_path,
            sites = sites.len(),
            max_sites = limits.max_call_sites,
            max_depth = limits.max_call_depth,
            "call-site extraction capped"
        );
    }
    Ok(sites)
}

fn call_site_of(
    call: Node<'_>,
    source: &[u8],
    file_path: &str,
    syntax: &CallSyntax,
) -> Option<CallSite> {
    let callee = call.child_by_field_name(syntax.callee_field)?;
    let location = location_of(call, file_path);
    if callee.kind() == syntax.member_node {
        let object = callee.child_by_field_name(syntax.object_field)?;
        let name = callee.child_by_field_name(syntax.name_field)?;
        let target = node_text(name, source);
        if target.is_empty() {
            return None;
        }
        return Some(CallSite {
            target: target.to_string(),
            receiver: node_text(object, source).to_string(),
            is_method: true,
            location,
        });
    }
    if callee.kind() == "identifier" {
        let target = node_text(callee, source);
        if target.is_empty() {
            return None;
        }
        return Some(CallSite {
            target: target.to_string(),
            receiver: String::new(),
            is_method: false,
            location,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treesitter::parse_source;

    fn go_body_calls(source: &str) -> Vec<CallSite> {
        let tree = parse_source(&tree_sitter_go::LANGUAGE.into(), source).unwrap();
        extract_calls(
            &CancellationToken::new(),
            tree.root_node(),
            source.as_bytes(),
            "test.go",
            &GO_CALLS,
            &ParserLimits::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_plain_and_method_calls() {
        let calls = go_body_calls(
            "package main\nfunc main() { fmt.Println(\"hi\"); helper() }\n",
        );
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].target, "Println");
        assert_eq!(calls[0].receiver, "fmt");
        assert!(calls[0].is_method);
        assert_eq!(calls[1].target, "helper");
        assert!(!calls[1].is_method);
        assert!(calls[1].receiver.is_empty());
    }

    #[test]
    fn test_calls_in_source_order() {
        let calls = go_body_calls("package main\nfunc f() { a(); b(); c() }\n");
        let names: Vec<_> = calls.iter().map(|c| c.target.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_site_cap_enforced() {
        let mut body = String::from("package main\nfunc f() {\n");
        for i in 0..40 {
            body.push_str(&format!("x{i}()\n"));
        }
        body.push_str("}\n");
        let tree = parse_source(&tree_sitter_go::LANGUAGE.into(), &body).unwrap();
        let limits = ParserLimits {
            max_call_sites: 10,
            ..ParserLimits::default()
        };
        let calls = extract_calls(
            &CancellationToken::new(),
            tree.root_node(),
            body.as_bytes(),
            "test.go",
            &GO_CALLS,
            &limits,
        )
        .unwrap();
        assert_eq!(calls.len(), 10);
    }

    #[test]
    fn test_cancellation_mid_walk() {
        let mut body = String::from("package main\nfunc f() {\n");
        for i in 0..200 {
            body.push_str(&format!("x{i}()\n"));
        }
        body.push_str("}\n");
        let tree = parse_source(&tree_sitter_go::LANGUAGE.into(), &body).unwrap();
        let ctx = CancellationToken::new();
        ctx.cancel();
        let err = extract_calls(
            &ctx,
            tree.root_node(),
            body.as_bytes(),
            "test.go",
            &GO_CALLS,
            &ParserLimits::default(),
        );
        assert!(matches!(err, Err(ParseError::Canceled)));
    }
}
