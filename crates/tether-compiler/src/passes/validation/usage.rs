//! Data-position checks for type references.
//!
//! A reference in a field, parameter or return type must describe data:
//! services, providers, consumers and packages are rejected, also when
//! reached through an alias or inside `List`/`Map`. Map keys must be
//! `String`, looking through aliases. Constraints written on an alias are
//! merged with the alias's own to check them against the underlying type.

use tether_core::{
    Diagnostic, LiteralType, NodeRef, ResolvedTypeReference, SemanticError, Type, TypeEntry,
};
use tether_registry::TypeGraph;

use crate::constraints::merge_through_alias;
use crate::context::diagnostic_at;

pub struct UsageChecker<'g> {
    graph: &'g TypeGraph,
    diagnostics: Vec<Diagnostic>,
}

impl<'g> UsageChecker<'g> {
    pub fn new(graph: &'g TypeGraph) -> Self {
        Self {
            graph,
            diagnostics: Vec::new(),
        }
    }

    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Check a reference in a data position.
    pub fn check_data(&mut self, reference: &ResolvedTypeReference) {
        self.check_kind(reference, reference.full_node, true);
        self.check_alias_constraints(reference);
    }

    /// Check the target of an alias; only map keys matter there, the rest is
    /// checked where the alias is used.
    pub fn check_alias_target(&mut self, reference: &ResolvedTypeReference) {
        self.check_map_keys(reference);
    }

    /// `site` is where problems are reported: the reference itself, or the
    /// outermost reference when looking through an alias.
    fn check_kind(&mut self, reference: &ResolvedTypeReference, site: NodeRef, direct: bool) {
        let graph = self.graph;
        match &reference.ty {
            Type::Package(package) => self.report(
                SemanticError::DisallowedDataType {
                    kind: "package",
                    name: graph.packages().dotted_name(*package),
                },
                site,
            ),
            Type::List { element } => {
                let site = if direct { element.full_node } else { site };
                self.check_kind(element, site, direct);
            }
            Type::Map { key, value } => {
                if direct {
                    self.check_map_key(key);
                    self.check_kind(key, key.full_node, true);
                    self.check_kind(value, value.full_node, true);
                } else {
                    self.check_kind(key, site, false);
                    self.check_kind(value, site, false);
                }
            }
            Type::Named(id) => match graph.get(*id) {
                Some(TypeEntry::Alias(alias)) => {
                    if let Some(target) = &alias.fully_resolved {
                        self.check_kind(target, site, false);
                    }
                }
                Some(entry) if is_endpoint(entry) => {
                    self.report(
                        SemanticError::DisallowedDataType {
                            kind: entry.kind_name(),
                            name: entry.name().to_string(),
                        },
                        site,
                    );
                }
                _ => {}
            },
            Type::Unknown | Type::Literal(_) => {}
        }
    }

    fn check_map_keys(&mut self, reference: &ResolvedTypeReference) {
        match &reference.ty {
            Type::List { element } => self.check_map_keys(element),
            Type::Map { key, value } => {
                self.check_map_key(key);
                self.check_map_keys(key);
                self.check_map_keys(value);
            }
            _ => {}
        }
    }

    fn check_map_key(&mut self, key: &ResolvedTypeReference) {
        let graph = self.graph;
        match graph.underlying(&key.ty) {
            Type::Unknown | Type::Literal(LiteralType::String) => {}
            other => {
                let found = graph.type_name(other);
                self.report(SemanticError::MapKeyNotString { found }, key.full_node);
            }
        }
    }

    /// Optional markers and constraints written on an alias reference.
    fn check_alias_constraints(&mut self, reference: &ResolvedTypeReference) {
        match &reference.ty {
            Type::List { element } => self.check_alias_constraints(element),
            Type::Map { key, value } => {
                self.check_alias_constraints(key);
                self.check_alias_constraints(value);
            }
            ty => {
                let graph = self.graph;
                if let Some(inner) = graph.alias_target(ty) {
                    merge_through_alias(graph, reference, inner, &mut self.diagnostics);
                }
            }
        }
    }

    fn report(&mut self, error: SemanticError, node: NodeRef) {
        self.diagnostics.push(diagnostic_at(error, node));
    }
}

/// Services, providers and consumers describe behaviour, not data.
fn is_endpoint(entry: &TypeEntry) -> bool {
    matches!(
        entry,
        TypeEntry::Service(_) | TypeEntry::Provider(_) | TypeEntry::Consumer(_)
    )
}
