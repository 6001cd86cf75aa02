use crate::error::Result;
use crate::symbols::{
    Abstraction, AbstractionKind, CallSite, FileSymbols, ImportKind, ImportRecord, COMPLEX_EXPR,
    UNKNOWN_NAME,
};
use repograph_syntax::{Language, Node, NodeKinds, SourceFile};

/// Pulls abstractions, imports and call sites out of normalized trees.
///
/// Only grammar tags come from the language; everything else is read
/// through field names on [`Node`].
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    kinds: NodeKinds,
}

impl Extractor {
    pub fn new(language: Language) -> Result<Self> {
        Ok(Self {
            kinds: language.node_kinds()?,
        })
    }

    #[must_use]
    pub const fn kinds(&self) -> NodeKinds {
        self.kinds
    }

    /// Extract one file. Failed files yield status only.
    #[must_use]
    pub fn extract_file(&self, file: &SourceFile) -> FileSymbols {
        let Some(root) = file.root() else {
            return FileSymbols::failed(file.path(), file.error().map(str::to_string));
        };
        let mut symbols = self.extract(root);
        symbols.path = file.path().to_string();
        symbols
    }

    /// Walk `root` once in pre-order, collecting each list in source order.
    #[must_use]
    pub fn extract(&self, root: &Node) -> FileSymbols {
        let mut symbols = FileSymbols {
            path: String::new(),
            ok: true,
            error: None,
            abstractions: Vec::new(),
            imports: Vec::new(),
            calls: Vec::new(),
        };

        for node in root.preorder() {
            let kind = node.kind.as_str();
            if kind == self.kinds.class {
                symbols.abstractions.extend(self.class(node));
            } else if kind == self.kinds.function {
                symbols.abstractions.extend(function(node));
            } else if kind == self.kinds.import {
                symbols.imports.extend(import(node));
            } else if kind == self.kinds.import_from {
                symbols.imports.extend(import_from(node));
            } else if kind == self.kinds.future_import {
                symbols
                    .imports
                    .extend(imported_names(node, FUTURE_MODULE.to_string()));
            } else if kind == self.kinds.call {
                symbols.calls.extend(call(node));
            }
        }

        symbols
    }

    fn class(&self, node: &Node) -> Option<Abstraction> {
        let name = node.child("name").and_then(Node::text)?;

        let base_names = node
            .child("superclasses")
            .map(|args| {
                args.unlabelled()
                    .into_iter()
                    .filter(|arg| arg.is("identifier") || arg.is("attribute"))
                    .filter_map(dotted_text)
                    .collect()
            })
            .unwrap_or_default();

        let method_names = node
            .child("body")
            .map(|body| {
                body.unlabelled()
                    .into_iter()
                    .filter_map(|stmt| self.method_name(stmt))
                    .collect()
            })
            .unwrap_or_default();

        Some(Abstraction {
            kind: AbstractionKind::Class,
            name: name.to_string(),
            span: node.span,
            base_names,
            method_names,
            parameters: Vec::new(),
        })
    }

    fn method_name(&self, stmt: &Node) -> Option<String> {
        let def = if stmt.is(self.kinds.decorated) {
            stmt.child("definition")?
        } else {
            stmt
        };
        if !def.is(self.kinds.function) {
            return None;
        }
        def.child("name").and_then(Node::text).map(str::to_string)
    }
}

fn function(node: &Node) -> Option<Abstraction> {
    let name = node.child("name").and_then(Node::text)?;
    let parameters = node
        .child("parameters")
        .map(|params| {
            params
                .unlabelled()
                .into_iter()
                .filter_map(parameter_name)
                .collect()
        })
        .unwrap_or_default();

    Some(Abstraction {
        kind: AbstractionKind::Function,
        name: name.to_string(),
        span: node.span,
        base_names: Vec::new(),
        method_names: Vec::new(),
        parameters,
    })
}

fn parameter_name(param: &Node) -> Option<String> {
    match param.kind.as_str() {
        "identifier" => param.text().map(str::to_string),
        "default_parameter" | "typed_default_parameter" => {
            param.child("name").and_then(parameter_name)
        }
        "typed_parameter" => param.unlabelled().first().and_then(|p| parameter_name(p)),
        "list_splat_pattern" => splat_name(param).map(|n| format!("*{n}")),
        "dictionary_splat_pattern" => splat_name(param).map(|n| format!("**{n}")),
        _ => None,
    }
}

fn splat_name(pattern: &Node) -> Option<&str> {
    pattern
        .unlabelled()
        .into_iter()
        .find(|n| n.is("identifier"))
        .and_then(Node::text)
}

fn import(node: &Node) -> Vec<ImportRecord> {
    node.children_in("name")
        .into_iter()
        .filter_map(|name| {
            let (module, alias) = name_and_alias(name)?;
            Some(ImportRecord {
                kind: ImportKind::Import,
                module,
                imported_name: None,
                alias,
                relative: false,
                span: node.span,
            })
        })
        .collect()
}

const FUTURE_MODULE: &str = "__future__";

fn import_from(node: &Node) -> Vec<ImportRecord> {
    match node.child("module_name").and_then(dotted_text) {
        Some(module) => imported_names(node, module),
        None => Vec::new(),
    }
}

/// One record per name imported from `module` by `node`.
fn imported_names(node: &Node, module: String) -> Vec<ImportRecord> {
    let relative = module.starts_with('.');
    let record = |imported_name: String, alias: Option<String>| ImportRecord {
        kind: ImportKind::ImportFrom,
        module: module.clone(),
        imported_name: Some(imported_name),
        alias,
        relative,
        span: node.span,
    };

    if node.unlabelled().iter().any(|n| n.is("wildcard_import")) {
        return vec![record("*".to_string(), None)];
    }

    node.children_in("name")
        .into_iter()
        .filter_map(name_and_alias)
        .map(|(name, alias)| record(name, alias))
        .collect()
}

/// `a.b` or `a.b as c` as (dotted name, alias)
fn name_and_alias(node: &Node) -> Option<(String, Option<String>)> {
    if node.is("aliased_import") {
        let name = node.child("name").and_then(dotted_text)?;
        let alias = node.child("alias").and_then(Node::text).map(str::to_string);
        Some((name, alias))
    } else {
        dotted_text(node).map(|name| (name, None))
    }
}

fn call(node: &Node) -> Option<CallSite> {
    let callee = node.child("function")?;
    let site = if callee.is("identifier") {
        CallSite::direct(callee.text().unwrap_or(UNKNOWN_NAME), node.span)
    } else if callee.is("attribute") {
        let object_name = match callee.child("object") {
            Some(object) if object.is("identifier") => object.text().unwrap_or(UNKNOWN_NAME),
            Some(_) => COMPLEX_EXPR,
            None => UNKNOWN_NAME,
        };
        let method_name = callee
            .child("attribute")
            .and_then(Node::text)
            .unwrap_or(UNKNOWN_NAME);
        CallSite::method(object_name, method_name, node.span)
    } else {
        CallSite::direct(COMPLEX_EXPR, node.span)
    };
    Some(site)
}

/// Source text of a name-like expression: `a`, `a.b.c`, `..pkg`.
fn dotted_text(node: &Node) -> Option<String> {
    match node.kind.as_str() {
        "dotted_name" => {
            let parts: Vec<&str> = node
                .unlabelled()
                .into_iter()
                .filter_map(Node::text)
                .collect();
            (!parts.is_empty()).then(|| parts.join("."))
        }
        "attribute" => {
            let object = dotted_text(node.child("object")?)?;
            let attribute = node.child("attribute").and_then(Node::text)?;
            Some(format!("{object}.{attribute}"))
        }
        "relative_import" => Some(
            node.unlabelled()
                .into_iter()
                .filter_map(dotted_text)
                .collect::<String>(),
        ),
        _ => node.text().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use repograph_syntax::SourceParser;

    fn extract(source: &str) -> FileSymbols {
        let mut parser = SourceParser::new(Language::Python).unwrap();
        let file = parser.parse_file("sample.py", source);
        Extractor::new(Language::Python).unwrap().extract_file(&file)
    }

    #[test]
    fn classes_record_bases_and_methods() {
        let symbols = extract(
            "class User(Base, models.Model, metaclass=Meta):\n    @property\n    def name(self):\n        return 1\n\n    def save(self, *args, force=False, **kw):\n        pass\n",
        );
        let user = &symbols.abstractions[0];
        assert_eq!(user.kind, AbstractionKind::Class);
        assert_eq!(user.name, "User");
        assert_eq!(user.base_names, vec!["Base", "models.Model"]);
        assert_eq!(user.method_names, vec!["name", "save"]);

        let names: Vec<&str> = symbols.abstractions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["User", "name", "save"]);
        assert_eq!(
            symbols.abstractions[2].parameters,
            vec!["self", "*args", "force", "**kw"]
        );
    }

    #[test]
    fn nested_definitions_are_found() {
        let symbols = extract("def outer():\n    def inner(x: int = 1):\n        pass\n");
        let names: Vec<&str> = symbols.abstractions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["outer", "inner"]);
        assert_eq!(symbols.abstractions[1].parameters, vec!["x"]);
        assert_eq!(symbols.abstractions[1].line(), Some(2));
    }

    #[test]
    fn imports_record_modules_names_and_aliases() {
        let symbols = extract(
            "import os.path, json as j\nfrom b import foo, bar as baz\nfrom ..pkg.mod import thing\nfrom . import sibling\nfrom star import *\n",
        );
        let rows: Vec<(ImportKind, &str, Option<&str>, Option<&str>, bool)> = symbols
            .imports
            .iter()
            .map(|i| {
                (
                    i.kind,
                    i.module.as_str(),
                    i.imported_name.as_deref(),
                    i.alias.as_deref(),
                    i.relative,
                )
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                (ImportKind::Import, "os.path", None, None, false),
                (ImportKind::Import, "json", None, Some("j"), false),
                (ImportKind::ImportFrom, "b", Some("foo"), None, false),
                (ImportKind::ImportFrom, "b", Some("bar"), Some("baz"), false),
                (ImportKind::ImportFrom, "..pkg.mod", Some("thing"), None, true),
                (ImportKind::ImportFrom, ".", Some("sibling"), None, true),
                (ImportKind::ImportFrom, "star", Some("*"), None, false),
            ]
        );
    }

    #[test]
    fn future_imports_are_recorded() {
        let symbols = extract("from __future__ import annotations, division as d\nimport os\n");
        let rows: Vec<(ImportKind, &str, Option<&str>, Option<&str>)> = symbols
            .imports
            .iter()
            .map(|i| (i.kind, i.module.as_str(), i.imported_name.as_deref(), i.alias.as_deref()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (ImportKind::ImportFrom, "__future__", Some("annotations"), None),
                (ImportKind::ImportFrom, "__future__", Some("division"), Some("d")),
                (ImportKind::Import, "os", None, None),
            ]
        );
        assert!(!symbols.imports[0].relative);
    }

    #[test]
    fn calls_take_three_shapes() {
        let symbols = extract("foo()\nobj.run()\nget().run()\nhandlers[0]()\n");
        let names: Vec<String> = symbols.calls.iter().map(CallSite::display_name).collect();
        assert_eq!(
            names,
            vec!["foo", "obj.run", "complex_expr.run", "get", "complex_expr"]
        );
        assert!(symbols.calls[1].is_method());
        assert_eq!(symbols.calls[1].line(), 2);
    }

    #[test]
    fn failed_files_yield_status_only() {
        let symbols = extract("def broken(:\n");
        assert!(!symbols.ok);
        assert!(symbols.error.is_some());
        assert!(symbols.abstractions.is_empty());
        assert!(symbols.imports.is_empty());
        assert!(symbols.calls.is_empty());
    }
}
