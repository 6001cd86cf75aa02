//! Normalization behaviour on real Python sources

use pretty_assertions::assert_eq;
use repograph_syntax::{Language, Node, ParseError, SourceParser, Value, MAX_TREE_DEPTH, VALUE_FIELD};

const SAMPLE: &str = r#"
import os
from b import foo as f

class User(Base):
    def greet(self, name="x"):
        print(f"Hello, {name}!")
        return 42
"#;

fn parse(source: &str) -> Node {
    let mut parser = SourceParser::new(Language::Python).expect("python parser");
    parser.parse(source).expect("valid python")
}

fn first<'a>(root: &'a Node, kind: &str) -> &'a Node {
    root.preorder()
        .find(|n| n.kind == kind)
        .unwrap_or_else(|| panic!("no {kind} node"))
}

#[test]
fn normalizing_twice_yields_identical_trees() {
    let a = parse(SAMPLE);
    let b = parse(SAMPLE);
    assert_eq!(a, b);

    let mut fresh = SourceParser::new(Language::Python).expect("python parser");
    assert_eq!(fresh.parse(SAMPLE).expect("valid python"), a);
}

#[test]
fn grammar_fields_become_named_fields() {
    let root = parse(SAMPLE);
    assert_eq!(root.kind, "module");

    let class = first(&root, "class_definition");
    assert_eq!(class.child("name").and_then(Node::text), Some("User"));
    assert_eq!(class.child("superclasses").map(|n| n.kind.as_str()), Some("argument_list"));
    assert_eq!(class.span.map(|s| s.start_line), Some(5));

    let func = first(&root, "function_definition");
    assert_eq!(func.child("name").and_then(Node::text), Some("greet"));
    assert!(func.child("parameters").is_some());
    assert!(func.child("body").is_some());

    let import_from = first(&root, "import_from_statement");
    let module = import_from.child("module_name").expect("module_name");
    assert_eq!(module.kind, "dotted_name");
    let aliased = import_from.child("name").expect("name");
    assert_eq!(aliased.kind, "aliased_import");
    assert_eq!(aliased.child("alias").and_then(Node::text), Some("f"));
}

#[test]
fn literals_carry_primitive_values() {
    let root = parse(SAMPLE);
    let int = first(&root, "integer");
    assert_eq!(int.text(), Some("42"));
    assert_eq!(int.field(VALUE_FIELD), Some(&Value::Int(42)));

    let root = parse("flag = True\nnothing = None\nratio = 0.5\nmask = 0xFF\n");
    assert_eq!(first(&root, "true").field(VALUE_FIELD), Some(&Value::Bool(true)));
    assert_eq!(first(&root, "none").field(VALUE_FIELD), Some(&Value::Null));
    assert_eq!(first(&root, "float").field(VALUE_FIELD), Some(&Value::Float(0.5)));

    let hex = root
        .preorder()
        .filter(|n| n.kind == "integer")
        .last()
        .expect("hex literal");
    assert_eq!(hex.text(), Some("0xFF"));
    assert!(hex.field(VALUE_FIELD).is_none());
}

#[test]
fn trees_survive_json_round_trip() {
    let root = parse(SAMPLE);
    let json = serde_json::to_vec(&root).expect("serialize");

    let mut de = serde_json::Deserializer::from_slice(&json);
    de.disable_recursion_limit();
    let back: Node = serde::Deserialize::deserialize(&mut de).expect("deserialize");
    assert_eq!(back, root);
    assert_eq!(back.count_nodes(), root.count_nodes());
}

#[test]
fn broken_files_fail_without_a_tree() {
    let mut parser = SourceParser::new(Language::Python).expect("python parser");
    let file = parser.parse_file("pkg/broken.py", "def nope(:\n");
    assert!(!file.is_ok());
    assert_eq!(file.path(), "pkg/broken.py");
    assert!(file.error().is_some_and(|e| e.starts_with("SyntaxError")));

    let ok = parser.parse_file("pkg/fine.py", "x = 1\n");
    assert!(ok.is_ok());
    assert!(ok.node_count().is_some_and(|n| n >= 1));
}

fn without_spans(node: &Node) -> Node {
    let mut out = Node::new(node.kind.clone());
    for (name, value) in &node.fields {
        out.fields.insert(name.clone(), strip(value));
    }
    out
}

fn strip(value: &Value) -> Value {
    match value {
        Value::Node(node) => without_spans(node).into(),
        Value::List(items) => Value::List(items.iter().map(strip).collect()),
        other => other.clone(),
    }
}

#[test]
fn async_keyword_is_kept_as_a_flag() {
    let sync_def = parse("def f():\n    pass\n");
    let async_def = parse("async def f():\n    pass\n");
    assert_ne!(without_spans(&sync_def), without_spans(&async_def));
    let func = first(&async_def, "function_definition");
    assert_eq!(func.field("async"), Some(&Value::Bool(true)));
    assert!(first(&sync_def, "function_definition").field("async").is_none());

    let plain = parse("async def g(xs):\n    for x in xs:\n        pass\n");
    let awaited = parse("async def g(xs):\n    async for x in xs:\n        pass\n");
    assert_ne!(without_spans(&plain), without_spans(&awaited));
    assert_eq!(first(&awaited, "for_statement").field("async"), Some(&Value::Bool(true)));
}

#[test]
fn yield_from_differs_from_yield() {
    let plain = parse("def g():\n    yield xs\n");
    let delegated = parse("def g():\n    yield from xs\n");
    assert_ne!(without_spans(&plain), without_spans(&delegated));
    assert_eq!(first(&delegated, "yield").field("from"), Some(&Value::Bool(true)));
}

#[test]
fn deeply_nested_sources_fail_instead_of_overflowing() {
    let depth = 20_000;
    let source = format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));
    let mut parser = SourceParser::new(Language::Python).expect("python parser");
    match parser.parse(&source) {
        Err(ParseError::TooDeep { line, limit, .. }) => {
            assert_eq!(line, 1);
            assert_eq!(limit, MAX_TREE_DEPTH);
        }
        other => panic!("expected a depth error, got {other:?}"),
    }

    let file = parser.parse_file("deep.py", &source);
    assert!(file.error().is_some_and(|e| e.starts_with("RecursionError")));

    let chain = vec!["a"; 5_000].join(" + ");
    assert!(matches!(
        parser.parse(&format!("total = {chain}\n")),
        Err(ParseError::TooDeep { .. })
    ));

    let nested = format!("x = {}1{}\n", "(".repeat(50), ")".repeat(50));
    assert!(parser.parse(&nested).is_ok());
}
