//! File, import and declaration nodes.

use tether_core::{FileId, Metadata, NodeId, NodeRef, OperationKind, Span};

use crate::{Expr, Ident};

// ============================================================================
// Files
// ============================================================================

/// A parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub id: FileId,
    /// Path the file was read from; builds sort files by it.
    pub path: String,
    pub package: PackageDecl,
    pub imports: Vec<Import>,
    pub statements: Vec<Statement>,
}

impl File {
    /// Whether a provider or consumer shares this file with other statements.
    pub fn mixes_endpoints(&self) -> bool {
        self.statements.len() > 1 && self.statements.iter().any(Statement::is_endpoint)
    }
}

/// `package foo.bar`
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDecl {
    pub id: NodeId,
    pub span: Span,
    pub path: Vec<Ident>,
}

impl PackageDecl {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.path.iter().map(|ident| ident.name.as_str())
    }

    /// Dotted form of the path.
    pub fn dotted(&self) -> String {
        self.names().collect::<Vec<_>>().join(".")
    }
}

/// `import foo.Bar`, `import foo.Bar as Baz` or `import foo.*`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub id: NodeId,
    pub span: Span,
    pub path: Vec<Ident>,
    pub wildcard: bool,
    pub alias: Option<Ident>,
}

impl Import {
    pub fn node(&self) -> NodeRef {
        NodeRef::new(self.id, self.span)
    }

    /// Dotted form of the imported path, including a trailing `.*`.
    pub fn dotted(&self) -> String {
        let mut path = self
            .path
            .iter()
            .map(|ident| ident.name.as_str())
            .collect::<Vec<_>>()
            .join(".");
        if self.wildcard {
            path.push_str(".*");
        }
        path
    }

    /// The name a non-wildcard import binds in scope.
    pub fn bound_name(&self) -> Option<&Ident> {
        self.alias.as_ref().or_else(|| self.path.last())
    }
}

// ============================================================================
// Statements
// ============================================================================

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub metadata: Metadata,
    pub kind: StatementKind,
}

impl Statement {
    pub fn node(&self) -> NodeRef {
        NodeRef::new(self.id, self.span)
    }

    /// Providers and consumers.
    pub fn is_endpoint(&self) -> bool {
        matches!(
            self.kind,
            StatementKind::Provider(_) | StatementKind::Consumer(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Record(RecordDecl),
    Enum(EnumDecl),
    Service(ServiceDecl),
    Provider(ProviderDecl),
    Consumer(ConsumerDecl),
    Alias(AliasDecl),
}

// === Records ===

#[derive(Debug, Clone, PartialEq)]
pub struct RecordDecl {
    pub fields: Vec<FieldDecl>,
    /// `extends` clauses. Parsed, but not supported by the analysis.
    pub extends: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub ty: Expr,
    pub metadata: Metadata,
}

impl FieldDecl {
    pub fn node(&self) -> NodeRef {
        NodeRef::new(self.id, self.span)
    }
}

// === Enums ===

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub values: Vec<EnumValueDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub metadata: Metadata,
}

impl EnumValueDecl {
    pub fn node(&self) -> NodeRef {
        NodeRef::new(self.id, self.span)
    }
}

// === Services ===

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDecl {
    pub operations: Vec<OperationDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub kind: OperationKind,
    pub parameters: Vec<ParameterDecl>,
    /// Return type of a request/response operation.
    pub returns: Option<Expr>,
    pub metadata: Metadata,
}

impl OperationDecl {
    pub fn node(&self) -> NodeRef {
        NodeRef::new(self.id, self.span)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub ty: Expr,
}

impl ParameterDecl {
    pub fn node(&self) -> NodeRef {
        NodeRef::new(self.id, self.span)
    }
}

// === Providers ===

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDecl {
    pub implements: Vec<ImplementsClause>,
    pub transports: Vec<TransportDecl>,
}

/// `implements S` or `implements S { a, b }`
#[derive(Debug, Clone, PartialEq)]
pub struct ImplementsClause {
    pub id: NodeId,
    pub span: Span,
    pub service: Expr,
    /// Explicit operation subset; `None` means every operation.
    pub operations: Option<Vec<Ident>>,
}

impl ImplementsClause {
    pub fn node(&self) -> NodeRef {
        NodeRef::new(self.id, self.span)
    }
}

/// `transport HTTP { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct TransportDecl {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub config: Option<Expr>,
}

impl TransportDecl {
    pub fn node(&self) -> NodeRef {
        NodeRef::new(self.id, self.span)
    }
}

// === Consumers ===

#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerDecl {
    pub provider: Expr,
    pub uses: Vec<UsesClause>,
}

/// `uses S` or `uses S { a, b }`
#[derive(Debug, Clone, PartialEq)]
pub struct UsesClause {
    pub id: NodeId,
    pub span: Span,
    pub service: Expr,
    pub operations: Option<Vec<Ident>>,
}

impl UsesClause {
    pub fn node(&self) -> NodeRef {
        NodeRef::new(self.id, self.span)
    }
}

// === Aliases ===

#[derive(Debug, Clone, PartialEq)]
pub struct AliasDecl {
    pub target: Expr,
}
