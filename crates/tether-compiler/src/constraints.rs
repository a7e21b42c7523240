//! Constraint Builder - turns constraint expressions into [`Constraint`]s.
//!
//! Accepted forms, per argument of a constrained type like
//! `String(size(1..10), pattern("[a-z]+"))`:
//!
//! | form | meaning |
//! |---|---|
//! | `range(a..b)`, `range(n)` | numeric range, `*` for an open side |
//! | `size(a..b)`, `size(n)` | whole-number size range, `*` for an open side |
//! | `pattern("re")` | regular expression |
//! | `value(lit)` | single admitted literal |
//! | `a..b`, `n` | `size` on String/List/Map, `range` otherwise |
//! | `1.5` | `range` |
//! | `"re"` | `pattern` |
//!
//! Applicability against the base type is a separate step
//! ([`check_applicable`]) because a base that is an alias is only known
//! once the alias fixpoint has run.

use tether_ast::{Expr, ExprKind};
use tether_core::{
    Constraint, ConstraintKind, ConstraintType, Diagnostic, Highlight, Literal, NodeRef, Number,
    ResolvedTypeReference, SemanticError, Type, TypeFamily,
};
use tether_registry::TypeGraph;

use crate::context::diagnostic_at;

/// A rejected constraint expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintError {
    pub error: SemanticError,
    pub node: NodeRef,
}

impl ConstraintError {
    fn new(error: SemanticError, node: NodeRef) -> Self {
        Self { error, node }
    }
}

impl From<ConstraintError> for Diagnostic {
    fn from(err: ConstraintError) -> Self {
        diagnostic_at(err.error, err.node)
    }
}

/// Builds constraints for a base type of a given family.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintBuilder {
    family: TypeFamily,
}

impl ConstraintBuilder {
    /// `family` decides what shorthand ranges and integers mean.
    pub fn new(family: TypeFamily) -> Self {
        Self { family }
    }

    /// Build one constraint from a call or shorthand expression.
    pub fn build(&self, expr: &Expr) -> Result<Constraint, ConstraintError> {
        let kind = match &expr.kind {
            ExprKind::Call { callee, args } => self.build_call(callee, args, expr.node())?,
            ExprKind::Range { lower, upper } => {
                if self.family.is_sized() {
                    size_bounds(lower, upper)?
                } else {
                    range_bounds(lower, upper)?
                }
            }
            ExprKind::Literal(Literal::Number(number)) => self.exact(*number, expr.node())?,
            ExprKind::Literal(Literal::String(regex)) => pattern(regex, expr.node())?,
            _ => {
                return Err(ConstraintError::new(
                    SemanticError::InvalidConstraintExpression,
                    expr.node(),
                ));
            }
        };
        Ok(Constraint::new(kind, expr.node()))
    }

    /// A bare number: exact size for sized types with whole numbers, exact
    /// range otherwise.
    fn exact(&self, number: Number, node: NodeRef) -> Result<ConstraintKind, ConstraintError> {
        if self.family.is_sized() && number.is_integer() {
            let size = number
                .as_whole()
                .ok_or_else(|| ConstraintError::new(SemanticError::InvalidSizeBound, node))?;
            Ok(ConstraintKind::Size {
                lower: Some(size),
                upper: Some(size),
            })
        } else {
            Ok(ConstraintKind::Range {
                lower: Some(number),
                upper: Some(number),
            })
        }
    }

    fn build_call(
        &self,
        callee: &Expr,
        args: &[Expr],
        node: NodeRef,
    ) -> Result<ConstraintKind, ConstraintError> {
        let Some(name) = callee.as_identifier() else {
            return Err(ConstraintError::new(
                SemanticError::InvalidConstraintExpression,
                node,
            ));
        };
        let Some(constraint) = ConstraintType::from_name(name) else {
            return Err(ConstraintError::new(
                SemanticError::UnknownConstraint {
                    name: name.to_string(),
                },
                callee.node(),
            ));
        };

        let argument_error = |expected: &'static str| {
            ConstraintError::new(
                SemanticError::ConstraintArgument {
                    constraint,
                    expected,
                },
                node,
            )
        };

        let [arg] = args else {
            return Err(argument_error(expected_argument(constraint)));
        };

        match (constraint, &arg.kind) {
            (ConstraintType::Range, ExprKind::Range { lower, upper }) => range_bounds(lower, upper),
            (ConstraintType::Range, ExprKind::Literal(Literal::Number(n))) => {
                Ok(ConstraintKind::Range {
                    lower: Some(*n),
                    upper: Some(*n),
                })
            }
            (ConstraintType::Size, ExprKind::Range { lower, upper }) => size_bounds(lower, upper),
            (ConstraintType::Size, ExprKind::Literal(Literal::Number(n))) => {
                let size = n.as_whole().ok_or_else(|| {
                    ConstraintError::new(SemanticError::InvalidSizeBound, arg.node())
                })?;
                Ok(ConstraintKind::Size {
                    lower: Some(size),
                    upper: Some(size),
                })
            }
            (ConstraintType::Pattern, ExprKind::Literal(Literal::String(regex))) => {
                pattern(regex, arg.node())
            }
            (ConstraintType::Value, ExprKind::Literal(literal)) => Ok(ConstraintKind::Value {
                literal: literal.clone(),
            }),
            _ => Err(argument_error(expected_argument(constraint))),
        }
    }
}

fn expected_argument(constraint: ConstraintType) -> &'static str {
    match constraint {
        ConstraintType::Range => "a range of numbers such as 0..100",
        ConstraintType::Size => "a range of whole numbers such as 1..10",
        ConstraintType::Pattern => "a single string literal",
        ConstraintType::Value => "a single literal value",
    }
}

// === Bounds ===

fn range_side(side: &Expr) -> Result<Option<Number>, ConstraintError> {
    match &side.kind {
        ExprKind::Wildcard => Ok(None),
        ExprKind::Literal(Literal::Number(n)) => Ok(Some(*n)),
        _ => Err(ConstraintError::new(SemanticError::InvalidRangeBound, side.node())),
    }
}

fn size_side(side: &Expr) -> Result<Option<u64>, ConstraintError> {
    match &side.kind {
        ExprKind::Wildcard => Ok(None),
        ExprKind::Literal(Literal::Number(n)) => n
            .as_whole()
            .map(Some)
            .ok_or_else(|| ConstraintError::new(SemanticError::InvalidSizeBound, side.node())),
        _ => Err(ConstraintError::new(SemanticError::InvalidSizeBound, side.node())),
    }
}

fn range_bounds(lower: &Expr, upper: &Expr) -> Result<ConstraintKind, ConstraintError> {
    let (lo, hi) = (range_side(lower)?, range_side(upper)?);
    check_bounds(ConstraintType::Range, lo, hi, lower, |n: Number| n.as_f64())?;
    Ok(ConstraintKind::Range { lower: lo, upper: hi })
}

fn size_bounds(lower: &Expr, upper: &Expr) -> Result<ConstraintKind, ConstraintError> {
    let (lo, hi) = (size_side(lower)?, size_side(upper)?);
    check_bounds(ConstraintType::Size, lo, hi, lower, |n: u64| n as f64)?;
    Ok(ConstraintKind::Size { lower: lo, upper: hi })
}

/// At least one side bounded, and lower not above upper.
fn check_bounds<T: Copy + std::fmt::Display>(
    constraint: ConstraintType,
    lower: Option<T>,
    upper: Option<T>,
    at: &Expr,
    value: impl Fn(T) -> f64,
) -> Result<(), ConstraintError> {
    match (lower, upper) {
        (None, None) => Err(ConstraintError::new(
            SemanticError::EmptyBounds { constraint },
            at.node(),
        )),
        (Some(lo), Some(hi)) if value(lo) > value(hi) => Err(ConstraintError::new(
            SemanticError::InvertedBounds {
                constraint,
                lower: lo.to_string(),
                upper: hi.to_string(),
            },
            at.node(),
        )),
        _ => Ok(()),
    }
}

fn pattern(regex: &str, node: NodeRef) -> Result<ConstraintKind, ConstraintError> {
    match regex::Regex::new(regex) {
        Ok(_) => Ok(ConstraintKind::Pattern {
            regex: regex.to_string(),
        }),
        Err(err) => Err(ConstraintError::new(
            SemanticError::InvalidPattern {
                message: err.to_string(),
            },
            node,
        )),
    }
}

// ============================================================================
// Applicability
// ============================================================================

/// Text listing what a family admits, used in inapplicability messages.
pub fn alternatives(family: TypeFamily) -> String {
    let names = family.applicable().names();
    if names.is_empty() {
        "no constraints are allowed".to_string()
    } else {
        format!("valid constraints are: {}", names.join(", "))
    }
}

/// Check a constraint against the family of its (non-alias) base type.
pub fn check_applicable(
    constraint: &Constraint,
    family: TypeFamily,
    type_name: &str,
) -> Result<(), SemanticError> {
    let ty = constraint.constraint_type();
    if !family.applicable().allows(ty) {
        return Err(SemanticError::InapplicableConstraint {
            constraint: ty,
            ty: type_name.to_string(),
            alternatives: alternatives(family),
        });
    }

    if let ConstraintKind::Value { literal } = &constraint.kind {
        if let Some(expected) = family.literal_kind() {
            if !family.accepts_literal(literal) {
                return Err(SemanticError::ValueKindMismatch {
                    ty: type_name.to_string(),
                    expected,
                    found: literal.kind_name(),
                });
            }
        }
    }

    Ok(())
}

// ============================================================================
// Alias Merge
// ============================================================================

/// Merge a reference whose base is an alias with the alias's fully resolved
/// reference.
///
/// The result has the alias's underlying type, the outer reference's nodes,
/// optional if either side is, and the union of both constraint lists.
/// Outer constraints are checked against the underlying type; a kind
/// present on both sides is an error and the alias's constraint wins. An
/// optional marker on an already optional alias is a warning.
pub fn merge_through_alias(
    graph: &TypeGraph,
    outer: &ResolvedTypeReference,
    inner: &ResolvedTypeReference,
    diagnostics: &mut Vec<Diagnostic>,
) -> ResolvedTypeReference {
    if outer.is_optional && inner.is_optional {
        diagnostics.push(
            Diagnostic::from_error(SemanticError::RedundantOptional)
                .with_highlight(outer.full_node.location())
                .with_highlight(
                    Highlight::new(inner.full_node.location())
                        .with_message("already optional here"),
                ),
        );
    }

    let mut merged = ResolvedTypeReference {
        ty: inner.ty.clone(),
        type_node: outer.type_node,
        full_node: outer.full_node,
        is_optional: outer.is_optional || inner.is_optional,
        constraints: inner.constraints.clone(),
    };

    let family = inner.ty.family();
    let type_name = graph.type_name(&inner.ty);
    for constraint in &outer.constraints {
        if let Some(existing) = inner.constraint(constraint.constraint_type()) {
            diagnostics.push(
                diagnostic_at(
                    SemanticError::DuplicateConstraint {
                        constraint: constraint.constraint_type(),
                    },
                    constraint.node,
                )
                .with_highlight(
                    Highlight::new(existing.node.location())
                        .with_message("inherited from alias here"),
                ),
            );
            continue;
        }
        if !matches!(inner.ty, Type::Unknown) {
            if let Err(error) = check_applicable(constraint, family, &type_name) {
                diagnostics.push(diagnostic_at(error, constraint.node));
                continue;
            }
        }
        merged.constraints.push(constraint.clone());
    }

    merged
}
