//! Source text and syntax tree utilities
//!
//! Offset/position conversion for diagnostics and a preorder walk over
//! tree-sitter nodes, shared by the markup parser and the host locators.

use tree_sitter::Node;

/// Convert a byte offset to a 1-based (line, column) pair.
///
/// Columns count characters, not bytes. Offsets past the end clamp to the
/// end of the text.
pub fn offset_to_position(source: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut column = 1u32;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}

/// Byte slice of `source` covered by `node`
pub fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Collect `root` and its descendants that satisfy `keep`, in document order
pub fn descendants<'t>(root: Node<'t>, mut keep: impl FnMut(&Node<'t>) -> bool) -> Vec<Node<'t>> {
    let mut found = Vec::new();
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();
        if keep(&node) {
            found.push(node);
        }

        if cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return found;
            }
        }
    }
}

/// First ERROR or MISSING node below `root`, if the tree has any
pub fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    if !root.has_error() {
        return None;
    }
    descendants(root, |n| n.is_error() || n.is_missing())
        .into_iter()
        .next()
}
