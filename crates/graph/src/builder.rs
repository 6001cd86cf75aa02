use crate::error::{GraphError, Result};
use crate::extract::Extractor;
use crate::resolve::{call_candidates, last_segment, lookup, ModuleResolver, SymbolEntry};
use crate::symbols::{AbstractionKind, CallTarget, FileSymbols, ImportKind, COMPLEX_EXPR};
use crate::types::{DependencyGraph, GraphNode, GraphStats, NodeData, NodeKind, RelationshipType};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use repograph_syntax::{Language, SourceFile};
use std::collections::HashMap;

/// Id of the node for a file
#[must_use]
pub fn file_node_id(path: &str) -> String {
    format!("{}:{path}", NodeKind::File.as_str())
}

/// Id of the node for a class or function
#[must_use]
pub fn abstraction_node_id(kind: AbstractionKind, path: &str, name: &str) -> String {
    format!("{}:{path}:{name}", kind.id_prefix())
}

/// Id of the node for a resolved imported name
#[must_use]
pub fn import_node_id(path: &str, imported_name: &str) -> String {
    format!("{}:{path}:{imported_name}", NodeKind::Import.as_str())
}

/// Id of the node for a call site
#[must_use]
pub fn call_node_id(path: &str, callee: &str, line: usize) -> String {
    format!("{}:{path}:{callee}:{line}", NodeKind::Call.as_str())
}

/// Builds a [`DependencyGraph`] from parsed files
pub struct GraphBuilder {
    language: Language,
    extractor: Extractor,
}

impl GraphBuilder {
    pub fn new(language: Language) -> Result<Self> {
        Ok(Self {
            language,
            extractor: Extractor::new(language)?,
        })
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Extract every file, ordered by path.
    #[must_use]
    pub fn extract_all(&self, files: &[SourceFile]) -> Vec<FileSymbols> {
        let mut symbols: Vec<FileSymbols> = files
            .iter()
            .map(|file| self.extractor.extract_file(file))
            .collect();
        symbols.sort_by(|a, b| a.path.cmp(&b.path));
        symbols
    }

    /// Extract and build in one go.
    pub fn build(&self, files: &[SourceFile]) -> Result<DependencyGraph> {
        self.build_from_symbols(&self.extract_all(files))
    }

    /// Build the graph in four passes over already extracted files.
    ///
    /// 1. FILE nodes and the abstractions each file contains
    /// 2. `from m import n` resolved to files and, where possible, abstractions
    /// 3. call sites and base classes resolved against local then imported names
    /// 4. counters
    ///
    /// The result depends only on the set of files, not the order given.
    pub fn build_from_symbols(&self, files: &[FileSymbols]) -> Result<DependencyGraph> {
        let mut ordered: Vec<&FileSymbols> = files.iter().collect();
        ordered.sort_by(|a, b| a.path.cmp(&b.path));
        if let Some(pair) = ordered.windows(2).find(|w| w[0].path == w[1].path) {
            return Err(GraphError::BuildError(format!(
                "file listed twice: {}",
                pair[0].path
            )));
        }

        let mut passes = Passes {
            language: self.language,
            files: ordered,
            graph: DependencyGraph::new(),
            file_nodes: HashMap::new(),
            symbols: HashMap::new(),
            import_targets: HashMap::new(),
        };
        passes.add_files();
        passes.resolve_imports();
        passes.resolve_calls();
        passes.link_bases();
        let graph = passes.finish();

        log::info!(
            "Built dependency graph: {} nodes, {} edges ({} of {} calls resolved)",
            graph.node_count(),
            graph.edge_count(),
            graph.stats().resolved_calls,
            graph.stats().calls
        );

        Ok(graph)
    }
}

struct Passes<'a> {
    language: Language,
    files: Vec<&'a FileSymbols>,
    graph: DependencyGraph,
    file_nodes: HashMap<&'a str, NodeIndex>,
    /// Canonical abstraction nodes per file, in definition order
    symbols: HashMap<&'a str, Vec<SymbolEntry>>,
    /// Files each file imports from, in import order
    import_targets: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> Passes<'a> {
    fn add_files(&mut self) {
        for file in self.files.clone() {
            let (file_idx, _) = self.graph.add_node(GraphNode {
                id: file_node_id(&file.path),
                file: file.path.clone(),
                data: NodeData::File {
                    ok: file.ok,
                    error: file.error.clone(),
                },
            });
            self.file_nodes.insert(&file.path, file_idx);

            let mut entries = Vec::with_capacity(file.abstractions.len());
            for abstraction in &file.abstractions {
                let (idx, created) = self.graph.add_node(GraphNode {
                    id: abstraction_node_id(abstraction.kind, &file.path, &abstraction.name),
                    file: file.path.clone(),
                    data: NodeData::Abstraction(abstraction.clone()),
                });
                if !created {
                    log::debug!(
                        "{}: {} {} defined again; keeping the first",
                        file.path,
                        abstraction.kind.label(),
                        abstraction.name
                    );
                    continue;
                }
                self.graph.add_edge(file_idx, idx, RelationshipType::Contains);
                entries.push(SymbolEntry {
                    name: abstraction.name.clone(),
                    kind: abstraction.kind,
                    node: idx,
                });
            }
            self.symbols.insert(&file.path, entries);
        }
    }

    fn resolve_imports(&mut self) {
        let files = self.files.clone();
        let resolver = ModuleResolver::new(files.iter().map(|&f| f.path.as_str()), self.language);

        for file in files.iter().copied() {
            let Some(&from) = self.file_nodes.get(file.path.as_str()) else {
                continue;
            };
            let mut targets: Vec<&'a str> = Vec::new();

            for record in file.imports.iter().filter(|r| r.kind == ImportKind::ImportFrom) {
                let Some(target) = resolver.resolve(&record.module, &file.path) else {
                    log::trace!("{}: module {} is not in the repository", file.path, record.module);
                    continue;
                };
                let Some(&target_idx) = self.file_nodes.get(target) else {
                    continue;
                };
                if !targets.contains(&target) {
                    targets.push(target);
                }
                self.graph.add_edge(from, target_idx, RelationshipType::ImportsFrom);

                let Some(name) = record.imported_name.as_deref() else {
                    continue;
                };
                let Some(referenced) = lookup(name, None, [self.symbols_of(target)]).map(|e| e.node)
                else {
                    continue;
                };
                let (import_idx, created) = self.graph.add_node(GraphNode {
                    id: import_node_id(&file.path, name),
                    file: file.path.clone(),
                    data: NodeData::Import(record.clone()),
                });
                if created {
                    self.graph.add_edge(from, import_idx, RelationshipType::DirectlyImports);
                    self.graph.add_edge(import_idx, referenced, RelationshipType::References);
                }
            }

            self.import_targets.insert(&file.path, targets);
        }
    }

    fn resolve_calls(&mut self) {
        for file in self.files.clone() {
            let Some(&from) = self.file_nodes.get(file.path.as_str()) else {
                continue;
            };

            for call in &file.calls {
                let (call_idx, created) = self.graph.add_node(GraphNode {
                    id: call_node_id(&file.path, &call.display_name(), call.line()),
                    file: file.path.clone(),
                    data: NodeData::Call(call.clone()),
                });
                if !created {
                    continue;
                }
                self.graph.add_edge(from, call_idx, RelationshipType::ContainsCall);

                // Method calls stay unresolved: the receiver's type is unknown.
                let CallTarget::Direct { callee_name } = &call.target else {
                    continue;
                };
                if let Some(target) = self.resolve_callee(file, callee_name) {
                    self.graph.add_edge(call_idx, target, RelationshipType::Calls);
                }
            }
        }
    }

    fn resolve_callee(&self, file: &FileSymbols, callee: &str) -> Option<NodeIndex> {
        if callee == COMPLEX_EXPR {
            return None;
        }
        let scopes = self.scopes_for(&file.path);
        call_candidates(callee, &file.imports)
            .into_iter()
            .find_map(|name| lookup(name, None, scopes.iter().copied()).map(|e| e.node))
    }

    fn link_bases(&mut self) {
        let mut inherits = Vec::new();
        for file in &self.files {
            let scopes = self.scopes_for(&file.path);
            for entry in self.symbols_of(&file.path) {
                let Some(GraphNode {
                    data: NodeData::Abstraction(class),
                    ..
                }) = self.graph.node(entry.node)
                else {
                    continue;
                };
                for base in &class.base_names {
                    let base = lookup(
                        last_segment(base),
                        Some(AbstractionKind::Class),
                        scopes.iter().copied(),
                    );
                    if let Some(base) = base.filter(|b| b.node != entry.node) {
                        inherits.push((entry.node, base.node));
                    }
                }
            }
        }
        for (class, base) in inherits {
            self.graph.add_edge(class, base, RelationshipType::Inherits);
        }
    }

    fn finish(self) -> DependencyGraph {
        let mut graph = self.graph;
        let mut stats = GraphStats {
            files: self.files.len(),
            failed_files: self.files.iter().filter(|f| !f.ok).count(),
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            ..GraphStats::default()
        };

        for (idx, node) in graph.nodes() {
            match node.kind() {
                NodeKind::Class | NodeKind::Function => stats.abstractions += 1,
                NodeKind::Import => stats.imports += 1,
                NodeKind::Call => {
                    stats.calls += 1;
                    let resolved = graph
                        .inner()
                        .edges(idx)
                        .any(|e| e.weight().relationship == RelationshipType::Calls);
                    if resolved {
                        stats.resolved_calls += 1;
                    } else {
                        stats.unresolved_calls += 1;
                    }
                }
                NodeKind::File => {}
            }
        }
        stats.resolved_imports = graph
            .edges()
            .filter(|(_, _, rel)| *rel == RelationshipType::ImportsFrom)
            .count();

        graph.stats = stats;
        graph
    }

    fn symbols_of(&self, path: &str) -> &[SymbolEntry] {
        self.symbols.get(path).map(Vec::as_slice).unwrap_or_default()
    }

    /// Local abstractions first, then each imported file in import order.
    fn scopes_for(&self, path: &str) -> Vec<&[SymbolEntry]> {
        let mut scopes = vec![self.symbols_of(path)];
        if let Some(targets) = self.import_targets.get(path) {
            scopes.extend(targets.iter().map(|target| self.symbols_of(target)));
        }
        scopes
    }
}
