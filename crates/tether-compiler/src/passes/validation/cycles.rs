//! Record composition cycles.
//!
//! A record that contains itself through a chain of fields cannot be
//! serialized unless some field on the chain can be left out. The search
//! walks field types through aliases but never into `List`/`Map`, since
//! collections may be empty.
//!
//! For a root record the search runs over `(record, saw_required_field)`
//! states, so a cycle with at least one required field is preferred over an
//! optional-only one and each state is visited once.

use rustc_hash::FxHashSet;
use tether_core::{Field, NodeRef, Type, TypeEntry, TypeId, TypeReference};
use tether_registry::TypeGraph;

/// One field on a cycle path.
#[derive(Debug, Clone)]
pub struct CycleEdge {
    pub record: TypeId,
    pub field: String,
    pub node: NodeRef,
    pub optional: bool,
}

/// A cycle back to the record it starts from.
#[derive(Debug, Clone)]
pub struct Cycle {
    pub edges: Vec<CycleEdge>,
}

impl Cycle {
    /// Whether some field on the cycle is required.
    pub fn is_required(&self) -> bool {
        self.edges.iter().any(|edge| !edge.optional)
    }

    /// `A.b -> B.a -> A`
    pub fn describe(&self, graph: &TypeGraph) -> String {
        let name = |id: TypeId| graph.get(id).map_or("<invalid>", TypeEntry::name).to_string();
        let mut parts: Vec<String> = self
            .edges
            .iter()
            .map(|edge| format!("{}.{}", name(edge.record), edge.field))
            .collect();
        if let Some(first) = self.edges.first() {
            parts.push(name(first.record));
        }
        parts.join(" -> ")
    }
}

/// Find a cycle from `root` back to itself, preferring one with a required
/// field.
pub fn find_cycle(graph: &TypeGraph, root: TypeId) -> Option<Cycle> {
    let mut search = CycleSearch {
        graph,
        root,
        visited: FxHashSet::default(),
        path: Vec::new(),
    };
    search
        .visit(root, false, true)
        .or_else(|| {
            search.visited.clear();
            search.visit(root, false, false)
        })
        .map(|edges| Cycle { edges })
}

struct CycleSearch<'g> {
    graph: &'g TypeGraph,
    root: TypeId,
    visited: FxHashSet<(TypeId, bool)>,
    path: Vec<CycleEdge>,
}

impl CycleSearch<'_> {
    /// Depth-first from `record`; `want_required` only accepts cycles with a
    /// required field.
    fn visit(
        &mut self,
        record: TypeId,
        saw_required: bool,
        want_required: bool,
    ) -> Option<Vec<CycleEdge>> {
        if !self.visited.insert((record, saw_required)) {
            return None;
        }
        let graph = self.graph;
        let entry = graph.get(record).and_then(TypeEntry::as_record)?;

        for field in &entry.fields {
            let Some((target, optional)) = record_target(graph, field) else {
                continue;
            };
            let required = saw_required || !optional;
            self.path.push(CycleEdge {
                record,
                field: field.name.clone(),
                node: field.node,
                optional,
            });

            if target == self.root {
                if required || !want_required {
                    return Some(self.path.clone());
                }
            } else if let Some(found) = self.visit(target, required, want_required) {
                return Some(found);
            }
            self.path.pop();
        }
        None
    }
}

/// The record a field holds directly (or through aliases), and whether the
/// field is optional.
fn record_target(graph: &TypeGraph, field: &Field) -> Option<(TypeId, bool)> {
    let TypeReference::Resolved(reference) = &field.ty else {
        return None;
    };
    let mut optional = reference.is_optional;
    let mut ty = &reference.ty;
    if let Some(target) = graph.alias_target(ty) {
        optional |= target.is_optional;
        ty = &target.ty;
    }

    let Type::Named(id) = ty else {
        return None;
    };
    graph.get(*id).and_then(TypeEntry::as_record).map(|_| (*id, optional))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuildOptions;
    use crate::context::CompilationContext;
    use crate::passes::{AliasPass, RegistrationPass, ResolutionPass};
    use tether_ast::{File, FileBuilder};
    use tether_core::{Diagnostics, FileId};

    fn graph(files: &[File]) -> TypeGraph {
        let mut diagnostics = Diagnostics::new();
        let mut ctx = CompilationContext::new(BuildOptions::default(), &mut diagnostics);
        RegistrationPass::new(&mut ctx).run(files);
        ResolutionPass::new(&mut ctx).run(files);
        AliasPass::new(&mut ctx).run();
        ctx.finish().0
    }

    fn cycle_of(graph: &TypeGraph, name: &str) -> Option<Cycle> {
        let id = graph.lookup(graph.root(), name)?;
        find_cycle(graph, id)
    }

    #[test]
    fn direct_self_reference() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(&[], vec![], vec![b.record("R", vec![b.field("next", b.ident("R"))])]);
        let graph = graph(&[file]);

        let cycle = cycle_of(&graph, "R").unwrap();
        assert!(cycle.is_required());
        assert_eq!(cycle.describe(&graph), "R.next -> R");
    }

    #[test]
    fn optional_only_cycle() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &[],
            vec![],
            vec![b.record("R", vec![b.field("next", b.optional(b.ident("R")))])],
        );
        let graph = graph(&[file]);

        assert!(!cycle_of(&graph, "R").unwrap().is_required());
    }

    #[test]
    fn collections_break_cycles() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &[],
            vec![],
            vec![b.record(
                "Tree",
                vec![
                    b.field("children", b.list(b.ident("Tree"))),
                    b.field("index", b.map(b.ident("String"), b.ident("Tree"))),
                ],
            )],
        );
        let graph = graph(&[file]);

        assert!(cycle_of(&graph, "Tree").is_none());
    }

    #[test]
    fn one_required_field_makes_the_cycle_required() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &[],
            vec![],
            vec![
                b.record(
                    "A",
                    vec![
                        b.field("maybe", b.optional(b.ident("B"))),
                        b.field("always", b.ident("B")),
                    ],
                ),
                b.record("B", vec![b.field("back", b.ident("A"))]),
            ],
        );
        let graph = graph(&[file]);

        let cycle = cycle_of(&graph, "A").unwrap();
        assert!(cycle.is_required());
        assert_eq!(cycle.describe(&graph), "A.maybe -> B.back -> A");
    }

    #[test]
    fn cycle_through_alias() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &[],
            vec![],
            vec![
                b.alias("Link", b.optional(b.ident("Node"))),
                b.record("Node", vec![b.field("next", b.ident("Link"))]),
            ],
        );
        let graph = graph(&[file]);

        let cycle = cycle_of(&graph, "Node").unwrap();
        assert!(!cycle.is_required());
        assert_eq!(cycle.describe(&graph), "Node.next -> Node");
    }
}
