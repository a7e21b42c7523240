//! Type resolution for converting AST type expressions to resolved references.
//!
//! This module provides [`TypeResolver`], which converts a type expression
//! into a [`ResolvedTypeReference`] against a file's [`FileScope`].
//!
//! ## Features
//!
//! - Named types via scope lookup, dotted paths via package walks
//! - `List<T>` and `Map<K, V>`
//! - Optional marker (`T?`)
//! - Constraint calls (`String(size(1..10))`), built by the
//!   [`ConstraintBuilder`] and checked for applicability when the base type
//!   is known
//!
//! Every failure is reported and replaced with `Unknown`, so a single
//! resolution always produces a reference.
//!
//! ## Deferral
//!
//! Shorthand constraints (`MyAlias(1..3)`) mean `size` or `range` depending
//! on what the alias stands for. When that alias has not been resolved yet
//! the resolver still answers, but flags the result as
//! [`deferred`](Resolution::deferred) so the caller can retry later.

use rustc_hash::FxHashSet;
use tether_ast::{Expr, ExprKind};
use tether_core::{
    ConstraintType, Diagnostic, Highlight, NodeId, NodeRef, ResolvedTypeReference, SemanticError,
    Type, TypeEntry, TypeFamily, TypeId, TypeReference,
};
use tether_registry::TypeGraph;

use crate::constraints::{ConstraintBuilder, check_applicable};
use crate::context::diagnostic_at;
use crate::scope::{FileScope, GENERIC_NAMES};

/// Findings of one resolver run.
#[derive(Debug, Default)]
pub struct Resolution {
    pub diagnostics: Vec<Diagnostic>,
    /// Resolved type per type-expression node.
    pub resolved_nodes: Vec<(NodeId, Type)>,
    /// A shorthand constraint was built without knowing its base type.
    pub deferred: bool,
}

/// Resolves AST type expressions to resolved references.
pub struct TypeResolver<'a> {
    graph: &'a TypeGraph,
    scope: &'a FileScope,
    resolution: Resolution,
}

impl<'a> TypeResolver<'a> {
    /// Create a new type resolver for one file.
    pub fn new(graph: &'a TypeGraph, scope: &'a FileScope) -> Self {
        Self {
            graph,
            scope,
            resolution: Resolution::default(),
        }
    }

    /// Everything reported and recorded so far.
    pub fn finish(self) -> Resolution {
        self.resolution
    }

    /// Resolve `reference` in place if it is still unresolved, looking its
    /// expression up with `expr_of`.
    pub fn resolve_in_place<'e>(
        &mut self,
        reference: &mut TypeReference,
        expr_of: impl Fn(NodeId) -> Option<&'e Expr>,
    ) {
        if let TypeReference::Unresolved(unresolved) = reference {
            let resolved = match expr_of(unresolved.node.id) {
                Some(expr) => self.resolve(expr),
                None => ResolvedTypeReference::unknown(unresolved.node),
            };
            *reference = TypeReference::Resolved(resolved);
        }
    }

    /// Resolve a type expression.
    pub fn resolve(&mut self, expr: &Expr) -> ResolvedTypeReference {
        match &expr.kind {
            ExprKind::Identifier(_) | ExprKind::Member { .. } => {
                let ty = self.resolve_path(expr);
                self.plain(expr, ty)
            }
            ExprKind::Generic { base, args } => {
                let ty = self.resolve_generic(expr, base, args);
                self.plain(expr, ty)
            }
            ExprKind::Optional(inner) => {
                let mut reference = self.resolve(inner);
                if reference.is_optional {
                    self.report(SemanticError::RedundantOptional, expr.node());
                }
                reference.is_optional = true;
                reference.full_node = expr.node();
                reference
            }
            ExprKind::Call { callee, args } => self.resolve_constrained(expr, callee, args),
            ExprKind::Literal(_)
            | ExprKind::Range { .. }
            | ExprKind::Wildcard
            | ExprKind::Object(_)
            | ExprKind::Array(_) => {
                self.report(SemanticError::InvalidTypeExpression, expr.node());
                self.plain(expr, Type::Unknown)
            }
        }
    }

    fn plain(&mut self, expr: &Expr, ty: Type) -> ResolvedTypeReference {
        self.resolution.resolved_nodes.push((expr.id, ty.clone()));
        ResolvedTypeReference::new(ty, expr.node())
    }

    fn report(&mut self, error: SemanticError, node: NodeRef) {
        self.resolution.diagnostics.push(diagnostic_at(error, node));
    }

    // ========================================================================
    // Names and Paths
    // ========================================================================

    fn resolve_path(&mut self, expr: &Expr) -> Type {
        let Some(segments) = expr.path_segments() else {
            self.report(SemanticError::InvalidTypeExpression, expr.node());
            return Type::Unknown;
        };
        let Some((first, rest)) = segments.split_first() else {
            return Type::Unknown;
        };

        let Some(mut current) = self.scope.get(first.name).cloned() else {
            let error = match GENERIC_NAMES.iter().find(|name| **name == first.name) {
                Some(generic) if rest.is_empty() => SemanticError::MissingTypeArguments { generic },
                _ => SemanticError::UnresolvedType {
                    name: first.name.to_string(),
                },
            };
            self.report(error, first.node);
            return Type::Unknown;
        };
        self.record_segment(expr, first.node, &current);

        for (i, segment) in rest.iter().enumerate() {
            let Type::Package(package) = current else {
                let previous = if i == 0 { first } else { &rest[i - 1] };
                self.report(
                    SemanticError::NotAPackage {
                        name: previous.name.to_string(),
                    },
                    previous.node,
                );
                return Type::Unknown;
            };

            let is_last = i + 1 == rest.len();
            let child = self.graph.packages().find_child(package, segment.name);
            let member = self.graph.lookup(package, segment.name);
            current = match (is_last, member, child) {
                (true, Some(id), _) => Type::Named(id),
                (_, _, Some(child)) => Type::Package(child),
                (false, Some(id), None) => Type::Named(id),
                (_, None, None) => {
                    self.report(
                        SemanticError::UnresolvedType {
                            name: expr.to_string(),
                        },
                        segment.node,
                    );
                    return Type::Unknown;
                }
            };
            self.record_segment(expr, segment.node, &current);
        }

        current
    }

    /// The whole expression is recorded by the caller.
    fn record_segment(&mut self, expr: &Expr, node: NodeRef, ty: &Type) {
        if node.id != expr.id {
            self.resolution.resolved_nodes.push((node.id, ty.clone()));
        }
    }

    // ========================================================================
    // Generics
    // ========================================================================

    fn resolve_generic(&mut self, expr: &Expr, base: &Expr, args: &[Expr]) -> Type {
        match base.as_identifier() {
            Some("List") => match args {
                [element] => Type::List {
                    element: Box::new(self.resolve(element)),
                },
                _ => {
                    let mut highlight = Highlight::new(expr.node().location());
                    if args.len() == 2 {
                        let hint = format!("Did you mean Map<{}, {}>?", args[0], args[1]);
                        highlight = highlight.with_annotation(hint);
                    }
                    self.arity_error("List", "one type argument", args.len(), highlight);
                    Type::Unknown
                }
            },
            Some("Map") => match args {
                [key, value] => Type::Map {
                    key: Box::new(self.resolve(key)),
                    value: Box::new(self.resolve(value)),
                },
                _ => {
                    let mut highlight = Highlight::new(expr.node().location());
                    if let [element] = args {
                        let hint = format!("Did you mean List<{element}>?");
                        highlight = highlight.with_annotation(hint);
                    }
                    self.arity_error("Map", "two type arguments", args.len(), highlight);
                    Type::Unknown
                }
            },
            _ => {
                self.report(
                    SemanticError::NotGeneric {
                        name: base.to_string(),
                    },
                    base.node(),
                );
                Type::Unknown
            }
        }
    }

    fn arity_error(
        &mut self,
        generic: &'static str,
        expected: &'static str,
        found: usize,
        highlight: Highlight,
    ) {
        let diagnostic = Diagnostic::from_error(SemanticError::GenericArity {
            generic,
            expected,
            found,
        })
        .with_highlight(highlight);
        self.resolution.diagnostics.push(diagnostic);
    }

    // ========================================================================
    // Constraints
    // ========================================================================

    fn resolve_constrained(
        &mut self,
        expr: &Expr,
        callee: &Expr,
        args: &[Expr],
    ) -> ResolvedTypeReference {
        let mut reference = self.resolve(callee);
        reference.full_node = expr.node();

        if reference.is_constrained() {
            self.report(SemanticError::NestedConstraints, expr.node());
            return reference;
        }

        let family = self.family_of(&reference.ty);
        let builder = ConstraintBuilder::new(family);
        let checked_here = !self.is_alias(&reference.ty) && !reference.ty.is_unknown();
        let type_name = self.graph.type_name(&reference.ty);

        for arg in args {
            let constraint = match builder.build(arg) {
                Ok(constraint) => constraint,
                Err(err) => {
                    self.resolution.diagnostics.push(err.into());
                    continue;
                }
            };

            let kind = constraint.constraint_type();
            if let Some(first) = reference.constraint(kind) {
                let first = first.node;
                self.duplicate_constraint(kind, constraint.node, first);
                continue;
            }

            if checked_here {
                if let Err(error) = check_applicable(&constraint, family, &type_name) {
                    self.report(error, constraint.node);
                    continue;
                }
            }

            reference.constraints.push(constraint);
        }

        reference
    }

    fn duplicate_constraint(&mut self, kind: ConstraintType, node: NodeRef, first: NodeRef) {
        let first = Highlight::new(first.location()).with_message("first declared here");
        let diagnostic =
            diagnostic_at(SemanticError::DuplicateConstraint { constraint: kind }, node)
                .with_highlight(first);
        self.resolution.diagnostics.push(diagnostic);
    }

    fn is_alias(&self, ty: &Type) -> bool {
        ty.as_named()
            .and_then(|id| self.graph.get(id))
            .is_some_and(TypeEntry::is_alias)
    }

    /// Constraint family of a base type, looking through aliases.
    ///
    /// Follows already resolved alias targets; an alias whose target is still
    /// unresolved marks the resolution deferred and reads as `Other`.
    fn family_of(&mut self, ty: &Type) -> TypeFamily {
        let mut current = ty.clone();
        let mut visited: FxHashSet<TypeId> = FxHashSet::default();

        loop {
            let Some(alias) = current
                .as_named()
                .and_then(|id| self.graph.get(id))
                .and_then(TypeEntry::as_alias)
            else {
                return current.family();
            };
            if let Some(resolved) = &alias.fully_resolved {
                return resolved.ty.family();
            }
            let Some(next) = alias.aliased.resolved_type() else {
                self.resolution.deferred = true;
                return TypeFamily::Other;
            };
            if let Some(id) = current.as_named() {
                if !visited.insert(id) {
                    // Cyclic; the alias fixpoint reports it.
                    return TypeFamily::Other;
                }
            }
            current = next.clone();
        }
    }
}
