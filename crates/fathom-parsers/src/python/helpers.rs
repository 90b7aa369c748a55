use tree_sitter::Node;

use crate::treesitter::{named_children, node_text};

/// Public = no leading underscore, OR a dunder (`__init__`). Single and
/// double leading underscores (name mangling) are private.
pub fn is_public_python(name: &str) -> bool {
    if !name.starts_with('_') {
        return true;
    }
    name.starts_with("__") && name.ends_with("__") && name.len() > 4
}

/// ALL_CAPS module-level names are constants.
pub fn is_all_caps(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Whether a base-class expression marks the class as interface-like.
pub fn is_protocol_base(base: &str) -> bool {
    let bare = base.rsplit('.').next().unwrap_or(base);
    let bare = bare.split('[').next().unwrap_or(bare);
    bare == "Protocol" || bare == "ABC"
}

/// `@decorator_name` / `@module.decorator_name(args)` → `decorator_name`.
pub fn decorator_name(text: &str) -> String {
    let stripped = text.trim().trim_start_matches('@');
    let without_args = stripped.split('(').next().unwrap_or(stripped);
    without_args
        .rsplit('.')
        .next()
        .unwrap_or(without_args)
        .trim()
        .to_string()
}

/// Parameter count of a function definition. When `skip_receiver` is set,
/// a leading `self`/`cls` does not count.
pub fn param_count_of(def: Node<'_>, source: &[u8], skip_receiver: bool) -> u32 {
    let Some(params) = def.child_by_field_name("parameters") else {
        return 0;
    };
    let mut count = 0u32;
    let mut first = true;
    for param in named_children(params) {
        let counted = matches!(
            param.kind(),
            "identifier"
                | "typed_parameter"
                | "default_parameter"
                | "typed_default_parameter"
                | "list_splat_pattern"
                | "dictionary_splat_pattern"
        );
        if !counted {
            continue;
        }
        if first && skip_receiver {
            first = false;
            let name = leading_identifier(param, source);
            if name == "self" || name == "cls" {
                continue;
            }
        }
        first = false;
        count += 1;
    }
    count
}

fn leading_identifier<'a>(param: Node<'_>, source: &'a [u8]) -> &'a str {
    if param.kind() == "identifier" {
        return node_text(param, source);
    }
    param
        .named_child(0)
        .filter(|c| c.kind() == "identifier")
        .map(|c| node_text(c, source))
        .unwrap_or("")
}

/// A module docstring: the first statement when it is a bare string.
pub fn module_docstring(root: Node<'_>, source: &[u8]) -> Option<String> {
    let first = root.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    Some(node_text(expr, source).to_string())
}

/// Drop the trailing `:` from a rendered def/class header.
pub fn strip_trailing_colon(signature: &str) -> String {
    signature.trim_end().trim_end_matches(':').trim_end().to_string()
}
