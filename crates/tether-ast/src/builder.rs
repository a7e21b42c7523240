//! Programmatic construction of AST files.
//!
//! [`FileBuilder`] allocates node ids and synthetic spans for one file, so
//! hosts without a parser (and tests) can assemble well-formed input:
//!
//! ```
//! use tether_ast::FileBuilder;
//! use tether_core::FileId;
//!
//! let b = FileBuilder::new(FileId::new(0), "shop/model.tether");
//! let file = b.file(
//!     &["shop"],
//!     vec![],
//!     vec![b.record("Item", vec![b.field("tags", b.list(b.ident("String")))])],
//! );
//! assert_eq!(file.statements.len(), 1);
//! ```
//!
//! Every method takes `&self`, so nested calls like
//! `b.optional(b.list(b.ident("Int")))` need no temporaries.

use std::cell::Cell;

use tether_core::{FileId, Literal, Metadata, NodeId, Number, OperationKind, Span};

use crate::{
    AliasDecl, ConsumerDecl, EnumDecl, EnumValueDecl, Expr, ExprKind, FieldDecl, File,
    ImplementsClause, Import, Ident, ObjectEntry, OperationDecl, PackageDecl, ParameterDecl,
    ProviderDecl, RecordDecl, ServiceDecl, Statement, StatementKind, TransportDecl, UsesClause,
};

/// Builds the nodes of a single file.
#[derive(Debug)]
pub struct FileBuilder {
    file: FileId,
    path: String,
    next: Cell<u32>,
}

impl FileBuilder {
    pub fn new(file: FileId, path: impl Into<String>) -> Self {
        Self {
            file,
            path: path.into(),
            next: Cell::new(0),
        }
    }

    pub fn file_id(&self) -> FileId {
        self.file
    }

    /// Allocate the next node id with a span on its own line.
    fn alloc(&self, len: usize) -> (NodeId, Span) {
        let index = self.next.get();
        self.next.set(index + 1);
        let len = u32::try_from(len).unwrap_or(u32::MAX);
        (NodeId::new(self.file, index), Span::new(index + 1, 1, len))
    }

    fn expr(&self, kind: ExprKind) -> Expr {
        let (id, span) = self.alloc(1);
        Expr { id, span, kind }
    }

    fn idents(&self, names: &[&str]) -> Vec<Ident> {
        names.iter().map(|name| self.name(name)).collect()
    }

    // === Files ===

    /// Assemble the file.
    pub fn file(&self, package: &[&str], imports: Vec<Import>, statements: Vec<Statement>) -> File {
        let (id, span) = self.alloc(package.len());
        File {
            id: self.file,
            path: self.path.clone(),
            package: PackageDecl {
                id,
                span,
                path: self.idents(package),
            },
            imports,
            statements,
        }
    }

    pub fn import(&self, path: &[&str]) -> Import {
        let (id, span) = self.alloc(path.len());
        Import {
            id,
            span,
            path: self.idents(path),
            wildcard: false,
            alias: None,
        }
    }

    pub fn import_as(&self, path: &[&str], alias: &str) -> Import {
        let mut import = self.import(path);
        import.alias = Some(self.name(alias));
        import
    }

    /// `import path.*`
    pub fn import_all(&self, path: &[&str]) -> Import {
        let mut import = self.import(path);
        import.wildcard = true;
        import
    }

    // === Expressions ===

    /// A bare identifier node (declaration names, member names).
    pub fn name(&self, name: &str) -> Ident {
        let (id, span) = self.alloc(name.len());
        Ident {
            id,
            name: name.to_string(),
            span,
        }
    }

    pub fn ident(&self, name: &str) -> Expr {
        let (id, span) = self.alloc(name.len());
        Expr {
            id,
            span,
            kind: ExprKind::Identifier(name.to_string()),
        }
    }

    /// A dotted path; a single component yields a plain identifier.
    pub fn path(&self, components: &[&str]) -> Expr {
        let mut iter = components.iter();
        let mut expr = match iter.next() {
            Some(first) => self.ident(first),
            None => return self.expr(ExprKind::Identifier(String::new())),
        };
        for component in iter {
            let name = self.name(component);
            expr = self.expr(ExprKind::Member {
                base: Box::new(expr),
                name,
            });
        }
        expr
    }

    pub fn generic(&self, base: Expr, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Generic {
            base: Box::new(base),
            args,
        })
    }

    pub fn list(&self, element: Expr) -> Expr {
        self.generic(self.ident("List"), vec![element])
    }

    pub fn map(&self, key: Expr, value: Expr) -> Expr {
        self.generic(self.ident("Map"), vec![key, value])
    }

    pub fn optional(&self, inner: Expr) -> Expr {
        self.expr(ExprKind::Optional(Box::new(inner)))
    }

    pub fn call(&self, callee: Expr, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Call {
            callee: Box::new(callee),
            args,
        })
    }

    /// A named constraint call such as `size(1..10)`.
    pub fn constraint(&self, name: &str, args: Vec<Expr>) -> Expr {
        self.call(self.ident(name), args)
    }

    pub fn range(&self, lower: Expr, upper: Expr) -> Expr {
        self.expr(ExprKind::Range {
            lower: Box::new(lower),
            upper: Box::new(upper),
        })
    }

    pub fn int(&self, value: i64) -> Expr {
        self.expr(ExprKind::Literal(Literal::Number(Number::Integer(value))))
    }

    pub fn float(&self, value: f64) -> Expr {
        self.expr(ExprKind::Literal(Literal::Number(Number::float(value))))
    }

    pub fn string(&self, value: &str) -> Expr {
        self.expr(ExprKind::Literal(Literal::String(value.to_string())))
    }

    pub fn boolean(&self, value: bool) -> Expr {
        self.expr(ExprKind::Literal(Literal::Boolean(value)))
    }

    pub fn wildcard(&self) -> Expr {
        self.expr(ExprKind::Wildcard)
    }

    pub fn object(&self, entries: Vec<(&str, Expr)>) -> Expr {
        let entries = entries
            .into_iter()
            .map(|(key, value)| ObjectEntry {
                key: self.name(key),
                value,
            })
            .collect();
        self.expr(ExprKind::Object(entries))
    }

    pub fn array(&self, items: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Array(items))
    }

    // === Declarations ===

    fn statement(&self, name: &str, kind: StatementKind) -> Statement {
        let (id, span) = self.alloc(name.len());
        Statement {
            id,
            span,
            name: self.name(name),
            metadata: Metadata::default(),
            kind,
        }
    }

    pub fn record(&self, name: &str, fields: Vec<FieldDecl>) -> Statement {
        self.record_extending(name, fields, Vec::new())
    }

    pub fn record_extending(
        &self,
        name: &str,
        fields: Vec<FieldDecl>,
        extends: Vec<Expr>,
    ) -> Statement {
        self.statement(name, StatementKind::Record(RecordDecl { fields, extends }))
    }

    pub fn field(&self, name: &str, ty: Expr) -> FieldDecl {
        let (id, span) = self.alloc(name.len());
        FieldDecl {
            id,
            span,
            name: self.name(name),
            ty,
            metadata: Metadata::default(),
        }
    }

    pub fn enumeration(&self, name: &str, values: &[&str]) -> Statement {
        let values = values
            .iter()
            .map(|value| {
                let (id, span) = self.alloc(value.len());
                EnumValueDecl {
                    id,
                    span,
                    name: self.name(value),
                    metadata: Metadata::default(),
                }
            })
            .collect();
        self.statement(name, StatementKind::Enum(EnumDecl { values }))
    }

    pub fn service(&self, name: &str, operations: Vec<OperationDecl>) -> Statement {
        self.statement(name, StatementKind::Service(ServiceDecl { operations }))
    }

    /// A request/response operation.
    pub fn operation(
        &self,
        name: &str,
        parameters: Vec<ParameterDecl>,
        returns: Option<Expr>,
    ) -> OperationDecl {
        let (id, span) = self.alloc(name.len());
        OperationDecl {
            id,
            span,
            name: self.name(name),
            kind: OperationKind::RequestResponse,
            parameters,
            returns,
            metadata: Metadata::default(),
        }
    }

    pub fn oneway(&self, name: &str, parameters: Vec<ParameterDecl>) -> OperationDecl {
        let mut operation = self.operation(name, parameters, None);
        operation.kind = OperationKind::Oneway;
        operation
    }

    pub fn param(&self, name: &str, ty: Expr) -> ParameterDecl {
        let (id, span) = self.alloc(name.len());
        ParameterDecl {
            id,
            span,
            name: self.name(name),
            ty,
        }
    }

    /// A provider with a single transport.
    pub fn provider(
        &self,
        name: &str,
        implements: Vec<ImplementsClause>,
        transport: TransportDecl,
    ) -> Statement {
        self.provider_with_transports(name, implements, vec![transport])
    }

    pub fn provider_with_transports(
        &self,
        name: &str,
        implements: Vec<ImplementsClause>,
        transports: Vec<TransportDecl>,
    ) -> Statement {
        self.statement(
            name,
            StatementKind::Provider(ProviderDecl {
                implements,
                transports,
            }),
        )
    }

    /// `implements service` with an optional explicit operation subset.
    pub fn implements(&self, service: Expr, operations: Option<&[&str]>) -> ImplementsClause {
        let (id, span) = self.alloc(1);
        ImplementsClause {
            id,
            span,
            service,
            operations: operations.map(|names| self.idents(names)),
        }
    }

    pub fn transport(&self, name: &str, config: Option<Expr>) -> TransportDecl {
        let (id, span) = self.alloc(name.len());
        TransportDecl {
            id,
            span,
            name: self.name(name),
            config,
        }
    }

    pub fn consumer(&self, name: &str, provider: Expr, uses: Vec<UsesClause>) -> Statement {
        self.statement(name, StatementKind::Consumer(ConsumerDecl { provider, uses }))
    }

    pub fn uses(&self, service: Expr, operations: Option<&[&str]>) -> UsesClause {
        let (id, span) = self.alloc(1);
        UsesClause {
            id,
            span,
            service,
            operations: operations.map(|names| self.idents(names)),
        }
    }

    pub fn alias(&self, name: &str, target: Expr) -> Statement {
        self.statement(name, StatementKind::Alias(AliasDecl { target }))
    }
}

// === Metadata Setters ===

impl Statement {
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self, note: impl Into<String>) -> Self {
        self.metadata.deprecation = Some(note.into());
        self
    }
}

impl FieldDecl {
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self, note: impl Into<String>) -> Self {
        self.metadata.deprecation = Some(note.into());
        self
    }
}

impl OperationDecl {
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_are_unique() {
        let b = FileBuilder::new(FileId::new(3), "a.tether");
        let first = b.ident("A");
        let second = b.ident("A");
        assert_ne!(first.id, second.id);
        assert_eq!(first.id.file, FileId::new(3));
        assert_ne!(first.span, second.span);
    }

    #[test]
    fn file_carries_package_and_path() {
        let b = FileBuilder::new(FileId::new(0), "shop/a.tether");
        let file = b.file(&["shop", "orders"], vec![b.import_all(&["common"])], vec![]);
        assert_eq!(file.path, "shop/a.tether");
        assert_eq!(file.package.dotted(), "shop.orders");
        assert_eq!(file.imports.len(), 1);
    }

    #[test]
    fn metadata_setters() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let statement = b
            .record("R", vec![])
            .with_description("A record")
            .deprecated("use S");
        assert_eq!(statement.metadata.description.as_deref(), Some("A record"));
        assert!(statement.metadata.is_deprecated());
    }

    #[test]
    fn oneway_has_no_return() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let op = b.oneway("ping", vec![b.param("at", b.ident("DateTime"))]);
        assert_eq!(op.kind, OperationKind::Oneway);
        assert!(op.returns.is_none());
    }
}
