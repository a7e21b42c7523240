//! The type model of the resolved graph.
//!
//! - [`Type`]: what a reference points at (a literal, a collection, a
//!   declared entry, a package, or the `Unknown` error sentinel)
//! - [`TypeReference`]: a use of a type, unresolved until the resolver runs
//! - [`Constraint`]: restrictions attached to a resolved reference

mod constraint;
mod reference;

pub use constraint::{Constraint, ConstraintKind, ConstraintSet, ConstraintType, TypeFamily};
pub use reference::{ResolvedTypeReference, TypeReference, UnresolvedType};

use std::fmt;

use crate::{PackageId, TypeId};

/// A type as seen by a reference.
///
/// Named compound types (records, enums, services, providers, consumers and
/// aliases) live in the graph arena and are referred to by [`TypeId`].
/// Lists and maps are structural and carry their element references inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// A package, reachable in scope by name. Never valid as data.
    Package(PackageId),
    /// Error sentinel substituted for anything that failed to resolve.
    Unknown,
    /// A built-in value type.
    Literal(LiteralType),
    /// `List<T>`.
    List { element: Box<ResolvedTypeReference> },
    /// `Map<K, V>`.
    Map {
        key: Box<ResolvedTypeReference>,
        value: Box<ResolvedTypeReference>,
    },
    /// A declared type in the graph arena.
    Named(TypeId),
}

impl Type {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn is_package(&self) -> bool {
        matches!(self, Type::Package(_))
    }

    /// The declared entry this type points at, if any.
    pub fn as_named(&self) -> Option<TypeId> {
        match self {
            Type::Named(id) => Some(*id),
            _ => None,
        }
    }

    /// Constraint family of a structural type.
    ///
    /// Named types report [`TypeFamily::Other`]; callers see through aliases
    /// before asking.
    pub fn family(&self) -> TypeFamily {
        match self {
            Type::Literal(literal) => literal.family(),
            Type::List { .. } => TypeFamily::List,
            Type::Map { .. } => TypeFamily::Map,
            Type::Package(_) | Type::Unknown | Type::Named(_) => TypeFamily::Other,
        }
    }
}

/// Built-in literal value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LiteralType {
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Boolean,
    String,
    Bytes,
    Date,
    DateTime,
    Duration,
}

impl LiteralType {
    /// All literal types, in the order they are inserted into scopes.
    pub const ALL: [LiteralType; 11] = [
        LiteralType::Int,
        LiteralType::Long,
        LiteralType::Float,
        LiteralType::Double,
        LiteralType::Decimal,
        LiteralType::Boolean,
        LiteralType::String,
        LiteralType::Bytes,
        LiteralType::Date,
        LiteralType::DateTime,
        LiteralType::Duration,
    ];

    /// The name the type is spelled with in source.
    pub const fn name(self) -> &'static str {
        match self {
            LiteralType::Int => "Int",
            LiteralType::Long => "Long",
            LiteralType::Float => "Float",
            LiteralType::Double => "Double",
            LiteralType::Decimal => "Decimal",
            LiteralType::Boolean => "Boolean",
            LiteralType::String => "String",
            LiteralType::Bytes => "Bytes",
            LiteralType::Date => "Date",
            LiteralType::DateTime => "DateTime",
            LiteralType::Duration => "Duration",
        }
    }

    /// Look up a built-in by its source name (case-sensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.name() == name)
    }

    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            LiteralType::Int
                | LiteralType::Long
                | LiteralType::Float
                | LiteralType::Double
                | LiteralType::Decimal
        )
    }

    pub fn family(self) -> TypeFamily {
        match self {
            LiteralType::String => TypeFamily::String,
            LiteralType::Boolean => TypeFamily::Boolean,
            ty if ty.is_numeric() => TypeFamily::Numeric,
            _ => TypeFamily::Other,
        }
    }
}

impl fmt::Display for LiteralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_names_round_trip() {
        for ty in LiteralType::ALL {
            assert_eq!(LiteralType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(LiteralType::from_name("string"), None);
    }

    #[test]
    fn literal_families() {
        assert_eq!(LiteralType::Decimal.family(), TypeFamily::Numeric);
        assert_eq!(LiteralType::String.family(), TypeFamily::String);
        assert_eq!(LiteralType::Boolean.family(), TypeFamily::Boolean);
        assert_eq!(LiteralType::DateTime.family(), TypeFamily::Other);
        assert_eq!(LiteralType::Bytes.family(), TypeFamily::Other);
    }

    #[test]
    fn named_types_have_no_family() {
        assert_eq!(Type::Named(TypeId::new(0)).family(), TypeFamily::Other);
        assert_eq!(Type::Unknown.family(), TypeFamily::Other);
    }
}
