//! Input AST for the tether IDL semantic analysis.
//!
//! Parsing happens upstream; this crate only defines the node shapes the
//! analysis consumes. Every node carries a [`NodeId`](tether_core::NodeId)
//! unique within a build, and a [`Span`](tether_core::Span).

mod builder;
mod decl;
mod expr;

pub use builder::FileBuilder;
pub use decl::{
    AliasDecl, ConsumerDecl, EnumDecl, EnumValueDecl, FieldDecl, File, ImplementsClause, Import,
    OperationDecl, PackageDecl, ParameterDecl, ProviderDecl, RecordDecl, ServiceDecl, Statement,
    StatementKind, TransportDecl, UsesClause,
};
pub use expr::{Expr, ExprKind, Ident, ObjectEntry, PathSegment};
