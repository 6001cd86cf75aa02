//! Tree-sitter → [`Node`] conversion.
//!
//! Named children bound to a grammar field are stored under that field; a
//! field bound more than once becomes a list. Named children without a field
//! go to [`CHILDREN_FIELD`] in source order. Anonymous tokens bound to a
//! field (operators) become string primitives; unbound modifier keywords
//! such as `async` become `true` flags named after the keyword; all other
//! anonymous tokens are dropped. Leaf nodes keep their source text.
//!
//! Trees nested deeper than [`MAX_TREE_DEPTH`] are rejected before any
//! conversion, so later recursive passes over the tree stay within a
//! worker's stack.

use crate::error::{ParseError, Result};
use crate::node::{Node, Span, Value, CHILDREN_FIELD, TEXT_FIELD, VALUE_FIELD};
use indexmap::IndexMap;
use tree_sitter::{Node as TsNode, Tree};

/// Deepest tree accepted, counted in grammar nodes from the root.
pub const MAX_TREE_DEPTH: usize = 256;

/// Normalize a parsed tree. Pure: the same tree and source always produce the
/// same [`Node`].
///
/// Fails with [`ParseError::TooDeep`] when the tree nests deeper than
/// [`MAX_TREE_DEPTH`].
pub fn normalize_tree(tree: &Tree, source: &[u8]) -> Result<Node> {
    if let Some(err) = depth_error(tree, MAX_TREE_DEPTH) {
        return Err(err);
    }
    Ok(normalize_node(tree.root_node(), source))
}

fn normalize_node(node: TsNode<'_>, source: &[u8]) -> Node {
    let mut out = Node::new(node.kind()).with_span(span_of(node));

    if node.named_child_count() == 0 {
        let text = text_of(node, source);
        let value = literal_value(node.kind(), &text);
        out.fields.insert(TEXT_FIELD.to_string(), Value::Str(text));
        if let Some(value) = value {
            out.fields.insert(VALUE_FIELD.to_string(), value);
        }
    }

    let mut grouped: IndexMap<&'static str, Vec<Value>> = IndexMap::new();
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            match (cursor.field_name(), child.is_named()) {
                (Some(field), true) => grouped
                    .entry(field)
                    .or_default()
                    .push(normalize_node(child, source).into()),
                (Some(field), false) => grouped
                    .entry(field)
                    .or_default()
                    .push(Value::Str(text_of(child, source))),
                (None, true) => grouped
                    .entry(CHILDREN_FIELD)
                    .or_default()
                    .push(normalize_node(child, source).into()),
                (None, false) if is_modifier(node.kind(), child.kind()) => grouped
                    .entry(child.kind())
                    .or_default()
                    .push(Value::Bool(true)),
                (None, false) => {}
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    for (field, mut values) in grouped {
        let value = if field != CHILDREN_FIELD && values.len() == 1 {
            values.remove(0)
        } else {
            Value::List(values)
        };
        out.fields.insert(field.to_string(), value);
    }

    out
}

/// Unbound keywords that change what their parent means, as in `async def`
/// or `yield from`.
fn is_modifier(parent: &str, token: &str) -> bool {
    match token {
        "async" => true,
        "from" => parent == "yield",
        _ => false,
    }
}

/// Iterative depth check; reports the first node found past `limit`.
fn depth_error(tree: &Tree, limit: usize) -> Option<ParseError> {
    let mut cursor = tree.walk();
    let mut depth = 1;
    loop {
        if depth > limit {
            let pos = cursor.node().start_position();
            return Some(ParseError::TooDeep {
                line: pos.row + 1,
                column: pos.column,
                limit,
            });
        }
        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
            depth -= 1;
        }
    }
}

fn span_of(node: TsNode<'_>) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(start.row + 1, start.column, end.row + 1, end.column)
}

fn text_of(node: TsNode<'_>, source: &[u8]) -> String {
    match node.utf8_text(source) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let end = node.end_byte().min(source.len());
            let start = node.start_byte().min(end);
            String::from_utf8_lossy(&source[start..end]).into_owned()
        }
    }
}

/// Primitive value for literal leaves. `None` means "keep only the text".
fn literal_value(kind: &str, text: &str) -> Option<Value> {
    match kind {
        "integer" => text.parse::<i64>().ok().map(Value::Int),
        "float" => text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Value::Float),
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        "none" => Some(Value::Null),
        _ => None,
    }
}

/// First error or missing node in pre-order, as a syntax error.
pub(crate) fn first_syntax_error(tree: &Tree) -> Option<ParseError> {
    let root = tree.root_node();
    if !root.has_error() {
        return None;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_missing() {
            let pos = node.start_position();
            return Some(ParseError::syntax(
                pos.row + 1,
                pos.column,
                format!("missing `{}`", node.kind()),
            ));
        }
        if node.is_error() {
            let pos = node.start_position();
            return Some(ParseError::syntax(pos.row + 1, pos.column, "invalid syntax"));
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<TsNode<'_>> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    // has_error() was set but no concrete node was found; report the root.
    Some(ParseError::syntax(1, 0, "invalid syntax"))
}
