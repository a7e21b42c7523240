//! Constraints attached to type references.
//!
//! A constraint restricts the values a reference admits: numeric ranges,
//! collection/string sizes, string patterns, or a single fixed value. Each
//! constraint remembers the expression it was built from so diagnostics can
//! point at it.

use std::fmt;

use bitflags::bitflags;

use crate::{Literal, NodeRef, Number};

/// A validated constraint plus the node it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    /// What the constraint restricts.
    pub kind: ConstraintKind,
    /// The expression the constraint was built from.
    pub node: NodeRef,
}

impl Constraint {
    pub fn new(kind: ConstraintKind, node: NodeRef) -> Self {
        Self { kind, node }
    }

    /// The discriminant of this constraint.
    pub fn constraint_type(&self) -> ConstraintType {
        self.kind.constraint_type()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// The restriction carried by a [`Constraint`].
///
/// Missing bounds are unbounded on that side; at least one bound is always
/// present once the constraint builder has accepted the expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Inclusive numeric range.
    Range {
        lower: Option<Number>,
        upper: Option<Number>,
    },
    /// Inclusive size range for strings, lists and maps.
    Size {
        lower: Option<u64>,
        upper: Option<u64>,
    },
    /// Regular expression a string must match.
    Pattern { regex: String },
    /// The single value a reference admits.
    Value { literal: Literal },
}

impl ConstraintKind {
    pub fn constraint_type(&self) -> ConstraintType {
        match self {
            ConstraintKind::Range { .. } => ConstraintType::Range,
            ConstraintKind::Size { .. } => ConstraintType::Size,
            ConstraintKind::Pattern { .. } => ConstraintType::Pattern,
            ConstraintKind::Value { .. } => ConstraintType::Value,
        }
    }
}

fn fmt_bound<T: fmt::Display>(bound: &Option<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match bound {
        Some(value) => write!(f, "{value}"),
        None => write!(f, "*"),
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Range { lower, upper } => {
                write!(f, "range(")?;
                fmt_bound(lower, f)?;
                write!(f, "..")?;
                fmt_bound(upper, f)?;
                write!(f, ")")
            }
            ConstraintKind::Size { lower, upper } => {
                write!(f, "size(")?;
                fmt_bound(lower, f)?;
                write!(f, "..")?;
                fmt_bound(upper, f)?;
                write!(f, ")")
            }
            ConstraintKind::Pattern { regex } => write!(f, "pattern(\"{regex}\")"),
            ConstraintKind::Value { literal } => write!(f, "value({literal})"),
        }
    }
}

/// Constraint discriminant, one per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintType {
    Range,
    Size,
    Pattern,
    Value,
}

impl ConstraintType {
    /// All constraint types, in the order they are listed in diagnostics.
    pub const ALL: [ConstraintType; 4] = [
        ConstraintType::Pattern,
        ConstraintType::Range,
        ConstraintType::Size,
        ConstraintType::Value,
    ];

    /// The call name used in source (`range`, `size`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            ConstraintType::Range => "range",
            ConstraintType::Size => "size",
            ConstraintType::Pattern => "pattern",
            ConstraintType::Value => "value",
        }
    }

    /// Parse a call name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "range" => Some(ConstraintType::Range),
            "size" => Some(ConstraintType::Size),
            "pattern" => Some(ConstraintType::Pattern),
            "value" => Some(ConstraintType::Value),
            _ => None,
        }
    }

    /// The single-member set for this type.
    pub const fn as_set(self) -> ConstraintSet {
        match self {
            ConstraintType::Range => ConstraintSet::RANGE,
            ConstraintType::Size => ConstraintSet::SIZE,
            ConstraintType::Pattern => ConstraintSet::PATTERN,
            ConstraintType::Value => ConstraintSet::VALUE,
        }
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// A set of constraint types, used for applicability checks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConstraintSet: u8 {
        const RANGE = 1 << 0;
        const SIZE = 1 << 1;
        const PATTERN = 1 << 2;
        const VALUE = 1 << 3;
    }
}

impl ConstraintSet {
    /// Whether the set admits the given constraint type.
    pub fn allows(self, constraint: ConstraintType) -> bool {
        self.contains(constraint.as_set())
    }

    /// Names of the members, in diagnostic order.
    pub fn names(self) -> Vec<&'static str> {
        ConstraintType::ALL
            .into_iter()
            .filter(|ty| self.allows(*ty))
            .map(ConstraintType::name)
            .collect()
    }
}

/// Coarse classification of a base type for constraint purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    String,
    Numeric,
    Boolean,
    List,
    Map,
    /// Anything that admits no constraints (enums, records, dates, ...).
    Other,
}

impl TypeFamily {
    /// The constraint types applicable to this family.
    pub fn applicable(self) -> ConstraintSet {
        match self {
            TypeFamily::String => {
                ConstraintSet::PATTERN | ConstraintSet::SIZE | ConstraintSet::VALUE
            }
            TypeFamily::Numeric => ConstraintSet::RANGE | ConstraintSet::VALUE,
            TypeFamily::Boolean => ConstraintSet::VALUE,
            TypeFamily::List | TypeFamily::Map => ConstraintSet::SIZE,
            TypeFamily::Other => ConstraintSet::empty(),
        }
    }

    /// Whether bare ranges and integers mean `size` for this family.
    pub fn is_sized(self) -> bool {
        matches!(self, TypeFamily::String | TypeFamily::List | TypeFamily::Map)
    }

    /// Whether a `value(...)` literal has the right kind for this family.
    pub fn accepts_literal(self, literal: &Literal) -> bool {
        matches!(
            (self, literal),
            (TypeFamily::String, Literal::String(_))
                | (TypeFamily::Numeric, Literal::Number(_))
                | (TypeFamily::Boolean, Literal::Boolean(_))
        )
    }

    /// The literal kind `value(...)` expects, if any.
    pub fn literal_kind(self) -> Option<&'static str> {
        match self {
            TypeFamily::String => Some("string"),
            TypeFamily::Numeric => Some("number"),
            TypeFamily::Boolean => Some("boolean"),
            _ => None,
        }
    }
}
