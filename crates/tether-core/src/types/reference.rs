use crate::{Constraint, ConstraintType, NodeRef, Type};

/// Unresolved type reference, stored during registration.
///
/// Captures where the type expression was written and how it reads, so a
/// reference left unresolved can still be reported. The resolver replaces
/// it with a [`ResolvedTypeReference`] in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnresolvedType {
    /// The full type expression node.
    pub node: NodeRef,
    /// The expression as written (e.g. `foo.Bar`, `List<Int>?`).
    pub written: String,
}

impl UnresolvedType {
    pub fn new(node: NodeRef, written: impl Into<String>) -> Self {
        Self {
            node,
            written: written.into(),
        }
    }
}

/// A resolved use of a type.
///
/// `type_node` is the node naming the base type (`Foo` in `Foo(size(1..2))?`),
/// `full_node` the whole expression including optional marker and
/// constraints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedTypeReference {
    /// The referenced type.
    pub ty: Type,
    /// Node naming the base type.
    pub type_node: NodeRef,
    /// Node of the complete type expression.
    pub full_node: NodeRef,
    /// Whether the reference carries an optional marker.
    pub is_optional: bool,
    /// Constraints, at most one per [`ConstraintType`].
    pub constraints: Vec<Constraint>,
}

impl ResolvedTypeReference {
    /// A plain reference whose type and full node coincide.
    pub fn new(ty: Type, node: NodeRef) -> Self {
        Self {
            ty,
            type_node: node,
            full_node: node,
            is_optional: false,
            constraints: Vec::new(),
        }
    }

    /// The `Unknown` placeholder for a reference that failed to resolve.
    pub fn unknown(node: NodeRef) -> Self {
        Self::new(Type::Unknown, node)
    }

    pub fn is_constrained(&self) -> bool {
        !self.constraints.is_empty()
    }

    /// The constraint of the given type, if present.
    pub fn constraint(&self, ty: ConstraintType) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.constraint_type() == ty)
    }
}

/// A type reference before or after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeReference {
    Unresolved(UnresolvedType),
    Resolved(ResolvedTypeReference),
}

impl TypeReference {
    pub fn is_resolved(&self) -> bool {
        matches!(self, TypeReference::Resolved(_))
    }

    pub fn as_resolved(&self) -> Option<&ResolvedTypeReference> {
        match self {
            TypeReference::Resolved(resolved) => Some(resolved),
            TypeReference::Unresolved(_) => None,
        }
    }

    /// The resolved type, if resolution has happened.
    pub fn resolved_type(&self) -> Option<&Type> {
        self.as_resolved().map(|r| &r.ty)
    }

    /// Node of the complete type expression.
    pub fn node(&self) -> NodeRef {
        match self {
            TypeReference::Unresolved(unresolved) => unresolved.node,
            TypeReference::Resolved(resolved) => resolved.full_node,
        }
    }
}

impl From<ResolvedTypeReference> for TypeReference {
    fn from(resolved: ResolvedTypeReference) -> Self {
        TypeReference::Resolved(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstraintKind, FileId, LiteralType, NodeId, Span};

    fn node(index: u32) -> NodeRef {
        NodeRef::new(NodeId::new(FileId::new(0), index), Span::new(1, index, 1))
    }

    #[test]
    fn unresolved_reference_keeps_node() {
        let reference = TypeReference::Unresolved(UnresolvedType::new(node(3), "Foo"));
        assert!(!reference.is_resolved());
        assert_eq!(reference.node(), node(3));
        assert!(reference.resolved_type().is_none());
    }

    #[test]
    fn constraint_lookup_by_type() {
        let mut resolved = ResolvedTypeReference::new(Type::Literal(LiteralType::String), node(1));
        resolved.constraints.push(Constraint::new(
            ConstraintKind::Pattern {
                regex: "[a-z]+".into(),
            },
            node(2),
        ));

        assert!(resolved.is_constrained());
        assert!(resolved.constraint(ConstraintType::Pattern).is_some());
        assert!(resolved.constraint(ConstraintType::Size).is_none());
    }
}
