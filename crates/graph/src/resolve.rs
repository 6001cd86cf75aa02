//! Name resolution shared by the graph passes. Nothing here touches the graph
//! itself, so the rules can be tested on plain data.

use crate::symbols::{AbstractionKind, ImportKind, ImportRecord};
use petgraph::graph::NodeIndex;
use repograph_syntax::Language;

/// Maps module names from import statements to repository files.
pub struct ModuleResolver<'a> {
    paths: Vec<&'a str>,
    extension: &'static str,
    package_marker: Option<&'static str>,
}

impl<'a> ModuleResolver<'a> {
    /// `paths` must already be in enumeration order; ties go to the first match.
    pub fn new(paths: impl IntoIterator<Item = &'a str>, language: Language) -> Self {
        Self {
            paths: paths.into_iter().collect(),
            extension: language.module_extension().unwrap_or("py"),
            package_marker: language.package_marker(),
        }
    }

    /// File that `module` refers to, as seen from `from`.
    ///
    /// Leading dots are ignored. A file matches when its stem equals the
    /// module, when its path ends with the module written as a path, or when
    /// it is the package marker of that path. A file never resolves to itself.
    #[must_use]
    pub fn resolve(&self, module: &str, from: &str) -> Option<&'a str> {
        let module = module.trim_start_matches('.');
        if module.is_empty() {
            return None;
        }

        let as_path = module.replace('.', "/");
        let module_file = format!("{as_path}.{}", self.extension);
        let package_file = self
            .package_marker
            .map(|marker| format!("{as_path}/{marker}"));

        self.paths.iter().copied().find(|&path| {
            path != from
                && (self.stem(path) == Some(module)
                    || ends_with_segment(path, &module_file)
                    || package_file
                        .as_deref()
                        .is_some_and(|pkg| ends_with_segment(path, pkg)))
        })
    }

    fn stem<'p>(&self, path: &'p str) -> Option<&'p str> {
        let name = path.rsplit('/').next()?;
        name.strip_suffix(self.extension)?.strip_suffix('.')
    }
}

fn ends_with_segment(path: &str, suffix: &str) -> bool {
    path == suffix
        || path
            .strip_suffix(suffix)
            .is_some_and(|head| head.ends_with('/'))
}

/// An abstraction node known to the builder, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: String,
    pub kind: AbstractionKind,
    pub node: NodeIndex,
}

/// First entry named `name` across `scopes`, searched in order.
pub fn lookup<'s>(
    name: &str,
    kind: Option<AbstractionKind>,
    scopes: impl IntoIterator<Item = &'s [SymbolEntry]>,
) -> Option<&'s SymbolEntry> {
    scopes
        .into_iter()
        .flat_map(|scope| scope.iter())
        .find(|entry| entry.name == name && kind.map_or(true, |k| entry.kind == k))
}

/// Names a direct call to `callee` may refer to: the callee itself, then the
/// original names of any `from m import x as callee` aliases.
pub fn call_candidates<'r>(callee: &'r str, imports: &'r [ImportRecord]) -> Vec<&'r str> {
    let mut names = vec![callee];
    for record in imports {
        if record.kind != ImportKind::ImportFrom || record.alias.as_deref() != Some(callee) {
            continue;
        }
        if let Some(original) = record.imported_name.as_deref() {
            if !names.contains(&original) {
                names.push(original);
            }
        }
    }
    names
}

/// Final segment of a dotted name: `models.Model` -> `Model`.
#[must_use]
pub fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
