use crate::node::Node;

/// Indented, line-per-node rendering of the structural part of a tree.
///
/// Leaves are omitted. Output stops after `max_lines` lines and ends with a
/// marker saying how many lines were cut.
#[must_use]
pub fn render_outline(root: &Node, max_lines: usize) -> String {
    let mut lines = Vec::new();
    let mut stack = vec![(root, 0usize)];

    while let Some((node, depth)) = stack.pop() {
        let children = node.child_nodes();
        if children.is_empty() && depth > 0 {
            continue;
        }
        lines.push(format!("{}{}", "  ".repeat(depth), label(node)));
        stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
    }

    if lines.len() > max_lines {
        let cut = lines.len() - max_lines;
        lines.truncate(max_lines);
        lines.push(format!("… ({cut} more lines)"));
    }
    lines.join("\n")
}

fn label(node: &Node) -> String {
    let mut out = node.kind.clone();
    if let Some(name) = node.child("name").and_then(Node::text) {
        out.push_str(": ");
        out.push_str(name);
    }
    if let Some(span) = node.span {
        if span.start_line == span.end_line {
            out.push_str(&format!(" (line {})", span.start_line));
        } else {
            out.push_str(&format!(" (lines {}-{})", span.start_line, span.end_line));
        }
    }
    out
}
