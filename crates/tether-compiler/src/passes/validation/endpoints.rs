//! Provider and consumer consistency.
//!
//! Providers are checked first: each `implements` clause is bound to its
//! service and its operation subset is settled. Consumers then check their
//! `uses` clauses against what their provider actually implements.

use rustc_hash::{FxHashMap, FxHashSet};
use tether_core::{
    Diagnostic, Highlight, NodeRef, RequestedOperation, SemanticError, ServiceEntry, Type,
    TypeEntry, TypeId, TypeReference,
};
use tether_registry::TypeGraph;

use crate::context::diagnostic_at;

/// Settled service binding of one `implements` or `uses` clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseBinding {
    pub service: Option<TypeId>,
    pub operations: Vec<String>,
}

/// Settled bindings of a provider.
#[derive(Debug, Default)]
pub struct ProviderCheck {
    pub implements: Vec<ClauseBinding>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Settled bindings of a consumer.
#[derive(Debug, Default)]
pub struct ConsumerCheck {
    pub provider: Option<TypeId>,
    pub uses: Vec<ClauseBinding>,
    pub diagnostics: Vec<Diagnostic>,
}

// ============================================================================
// Providers
// ============================================================================

pub fn check_provider(graph: &TypeGraph, id: TypeId) -> ProviderCheck {
    let mut check = ProviderCheck::default();
    let Some(provider) = graph.get(id).and_then(TypeEntry::as_provider) else {
        return check;
    };

    let mut first_clause: FxHashMap<TypeId, NodeRef> = FxHashMap::default();
    for clause in &provider.implements {
        let mut binding = ClauseBinding::default();
        let service = service_of(graph, &clause.service, &mut check.diagnostics);
        let Some((service_id, service)) = service else {
            check.implements.push(binding);
            continue;
        };

        if let Some(first) = first_clause.get(&service_id) {
            check.diagnostics.push(
                diagnostic_at(
                    SemanticError::DuplicateImplements {
                        provider: provider.name.clone(),
                        service: service.name.clone(),
                    },
                    clause.node,
                )
                .with_highlight(
                    Highlight::new(first.location()).with_message("first implemented here"),
                ),
            );
            check.implements.push(binding);
            continue;
        }
        first_clause.insert(service_id, clause.node);

        binding.service = Some(service_id);
        binding.operations = match &clause.requested {
            None => service.operation_names(),
            Some(requested) => {
                let mut operations = Vec::new();
                for op in distinct(requested, &mut check.diagnostics) {
                    if service.operation(&op.name).is_some() {
                        operations.push(op.name.clone());
                    } else {
                        check.diagnostics.push(unknown_operation(op, service));
                    }
                }
                operations
            }
        };
        check.implements.push(binding);
    }

    check
}

// ============================================================================
// Consumers
// ============================================================================

pub fn check_consumer(graph: &TypeGraph, id: TypeId) -> ConsumerCheck {
    let mut check = ConsumerCheck::default();
    let Some(consumer) = graph.get(id).and_then(TypeEntry::as_consumer) else {
        return check;
    };

    let provider_id = endpoint_of(graph, &consumer.provider, "provider", &mut check.diagnostics);
    let provider = provider_id.and_then(|id| match graph.get(id) {
        Some(TypeEntry::Provider(provider)) => Some((id, provider)),
        Some(other) => {
            check.diagnostics.push(diagnostic_at(
                SemanticError::NotAProvider {
                    name: other.name().to_string(),
                },
                consumer.provider.node(),
            ));
            None
        }
        None => None,
    });
    check.provider = provider.map(|(id, _)| id);

    let mut first_clause: FxHashMap<TypeId, NodeRef> = FxHashMap::default();
    for clause in &consumer.uses {
        let mut binding = ClauseBinding::default();
        let service = service_of(graph, &clause.service, &mut check.diagnostics);
        let Some((service_id, service)) = service else {
            check.uses.push(binding);
            continue;
        };

        if let Some(first) = first_clause.get(&service_id) {
            check.diagnostics.push(
                diagnostic_at(
                    SemanticError::DuplicateUses {
                        consumer: consumer.name.clone(),
                        service: service.name.clone(),
                    },
                    clause.node,
                )
                .with_highlight(Highlight::new(first.location()).with_message("first used here")),
            );
            check.uses.push(binding);
            continue;
        }
        first_clause.insert(service_id, clause.node);
        binding.service = Some(service_id);

        // Without a valid provider only the service itself can be checked.
        let implemented = match provider {
            Some((_, provider)) => match provider.implementation_of(service_id) {
                Some(implements) => Some((provider, &implements.operations)),
                None => {
                    check.diagnostics.push(diagnostic_at(
                        SemanticError::ServiceNotImplemented {
                            provider: provider.name.clone(),
                            service: service.name.clone(),
                        },
                        clause.service.node(),
                    ));
                    check.uses.push(binding);
                    continue;
                }
            },
            None => None,
        };

        binding.operations = match &clause.requested {
            None => match implemented {
                Some((_, operations)) => operations.clone(),
                None => service.operation_names(),
            },
            Some(requested) => {
                let mut operations = Vec::new();
                for op in distinct(requested, &mut check.diagnostics) {
                    if service.operation(&op.name).is_none() {
                        check.diagnostics.push(unknown_operation(op, service));
                        continue;
                    }
                    if let Some((provider, implemented)) = implemented {
                        if !implemented.contains(&op.name) {
                            check.diagnostics.push(diagnostic_at(
                                SemanticError::OperationNotImplemented {
                                    operation: op.name.clone(),
                                    service: service.name.clone(),
                                    provider: provider.name.clone(),
                                },
                                op.node,
                            ));
                            continue;
                        }
                    }
                    operations.push(op.name.clone());
                }
                operations
            }
        };
        check.uses.push(binding);
    }

    check
}

// ============================================================================
// Helpers
// ============================================================================

/// The service a clause refers to.
fn service_of<'g>(
    graph: &'g TypeGraph,
    reference: &TypeReference,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<(TypeId, &'g ServiceEntry)> {
    let id = endpoint_of(graph, reference, "service", diagnostics)?;
    match graph.get(id)? {
        TypeEntry::Service(service) => Some((id, service)),
        other => {
            diagnostics.push(diagnostic_at(
                SemanticError::NotAService {
                    name: other.name().to_string(),
                },
                reference.node(),
            ));
            None
        }
    }
}

/// Follow a service or provider reference through aliases.
///
/// Optional markers and constraints are rejected, on the reference itself
/// and on any alias it goes through. Unresolved and `Unknown` references
/// were reported already and yield `None` quietly; anything that is not a
/// declared type is reported under `kind`.
fn endpoint_of(
    graph: &TypeGraph,
    reference: &TypeReference,
    kind: &'static str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<TypeId> {
    let reference = reference.as_resolved()?;
    let mut decorated = reference.is_optional || reference.is_constrained();
    let mut ty = &reference.ty;
    if let Some(target) = graph.alias_target(ty) {
        decorated |= target.is_optional || target.is_constrained();
        ty = &target.ty;
    }

    if decorated {
        diagnostics.push(diagnostic_at(
            SemanticError::ConstrainedServiceReference { kind },
            reference.full_node,
        ));
        return None;
    }

    match ty {
        Type::Named(id) if !graph.get(*id).is_some_and(TypeEntry::is_alias) => Some(*id),
        Type::Unknown | Type::Named(_) => None,
        other => {
            let name = graph.type_name(other);
            let error = match kind {
                "provider" => SemanticError::NotAProvider { name },
                _ => SemanticError::NotAService { name },
            };
            diagnostics.push(diagnostic_at(error, reference.full_node));
            None
        }
    }
}

/// Requested operations with repeats reported and dropped.
fn distinct<'r>(
    requested: &'r [RequestedOperation],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<&'r RequestedOperation> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut unique = Vec::new();
    for op in requested {
        if seen.insert(&op.name) {
            unique.push(op);
        } else {
            diagnostics.push(diagnostic_at(
                SemanticError::DuplicateRequestedOperation {
                    operation: op.name.clone(),
                },
                op.node,
            ));
        }
    }
    unique
}

fn unknown_operation(op: &RequestedOperation, service: &ServiceEntry) -> Diagnostic {
    diagnostic_at(
        SemanticError::UnknownOperation {
            operation: op.name.clone(),
            service: service.name.clone(),
        },
        op.node,
    )
}
