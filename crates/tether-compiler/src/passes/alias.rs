//! Alias Pass - collapse alias chains into their underlying types.
//!
//! Every alias starts with `fully_resolved == None`. Each round tries to
//! expand the pending aliases; an alias expands once every alias its target
//! mentions (directly or inside `List`/`Map`) has expanded. Expansion merges
//! optional markers and constraints of the outer and inner reference (see
//! [`merge_through_alias`]).
//!
//! The loop stops when a round makes no progress. Whatever is still pending
//! then can never resolve: each such alias is on, or depends on, a cycle and
//! is reported individually.

use tether_core::{Diagnostic, ResolvedTypeReference, SemanticError, Type, TypeEntry, TypeId};
use tether_registry::TypeGraph;
use tracing::{debug, instrument, trace};

use crate::constraints::merge_through_alias;
use crate::context::{CompilationContext, diagnostic_at};

/// Output of the alias pass.
#[derive(Debug, Default)]
pub struct AliasOutput {
    pub resolved: usize,
    pub unresolvable: usize,
    pub rounds: usize,
}

/// Runs the alias fixpoint.
pub struct AliasPass<'a, 'd> {
    ctx: &'a mut CompilationContext<'d>,
}

impl<'a, 'd> AliasPass<'a, 'd> {
    pub fn new(ctx: &'a mut CompilationContext<'d>) -> Self {
        Self { ctx }
    }

    #[instrument(skip_all, name = "alias")]
    pub fn run(self) -> AliasOutput {
        let graph = &self.ctx.graph;
        let mut pending: Vec<TypeId> = graph
            .types()
            .filter(|(_, entry)| entry.as_alias().is_some_and(|alias| !alias.is_fully_resolved()))
            .map(|(id, _)| id)
            .collect();
        let mut output = AliasOutput::default();

        loop {
            output.rounds += 1;
            let before = pending.len();
            pending.retain(|&id| match expand_alias(&self.ctx.graph, id) {
                Some((resolved, diagnostics)) => {
                    trace!(alias = %self.ctx.graph.qualified_name(id), "alias resolved");
                    self.ctx.extend(diagnostics);
                    if let Some(TypeEntry::Alias(alias)) = self.ctx.graph.get_mut(id) {
                        alias.fully_resolved = Some(resolved);
                    }
                    output.resolved += 1;
                    false
                }
                None => true,
            });
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }

        for id in pending {
            let Some(entry) = self.ctx.graph.get(id) else {
                continue;
            };
            let error = SemanticError::UnresolvableAlias {
                name: entry.name().to_string(),
            };
            let node = entry.source().name;
            self.ctx.report_at(error, node);
            output.unresolvable += 1;
        }

        debug!(
            resolved = output.resolved,
            unresolvable = output.unresolvable,
            rounds = output.rounds,
            "alias fixpoint finished"
        );
        output
    }
}

/// Try to expand one alias.
///
/// Diagnostics are only returned together with a result, so nothing is
/// reported twice while an alias waits across rounds.
fn expand_alias(graph: &TypeGraph, id: TypeId) -> Option<(ResolvedTypeReference, Vec<Diagnostic>)> {
    let alias = graph.get(id)?.as_alias()?;
    let target = alias.aliased.as_resolved()?;
    let mut diagnostics = Vec::new();
    let resolved = expand(graph, target, &mut diagnostics)?;
    Some((resolved, diagnostics))
}

/// Replace every alias in `reference` by its expansion; `None` while any
/// of them is still pending.
fn expand(
    graph: &TypeGraph,
    reference: &ResolvedTypeReference,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ResolvedTypeReference> {
    match &reference.ty {
        Type::Named(id) => match graph.get(*id) {
            Some(TypeEntry::Alias(inner)) => {
                let inner = inner.fully_resolved.as_ref()?;
                Some(merge_through_alias(graph, reference, inner, diagnostics))
            }
            _ => Some(reference.clone()),
        },
        Type::List { element } => {
            let element = expand(graph, element, diagnostics)?;
            Some(ResolvedTypeReference {
                ty: Type::List {
                    element: Box::new(element),
                },
                ..reference.clone()
            })
        }
        Type::Map { key, value } => {
            let key = expand(graph, key, diagnostics)?;
            let value = expand(graph, value, diagnostics)?;
            Some(ResolvedTypeReference {
                ty: Type::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                },
                ..reference.clone()
            })
        }
        Type::Package(package) => {
            let error = SemanticError::PackageAliasTarget {
                name: graph.packages().dotted_name(*package),
            };
            diagnostics.push(diagnostic_at(error, reference.type_node));
            Some(ResolvedTypeReference {
                ty: Type::Unknown,
                ..reference.clone()
            })
        }
        Type::Unknown | Type::Literal(_) => Some(reference.clone()),
    }
}
