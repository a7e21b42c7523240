//! Registration Pass - register every declaration as a type stub.
//!
//! This pass walks the files and registers all top-level declarations into
//! the [`TypeGraph`](tether_registry::TypeGraph). Every type expression is
//! stored as an [`UnresolvedType`] so that declarations can reference each
//! other in any order, across files and packages.
//!
//! ## Responsibilities
//!
//! - Create the package tree from `package` declarations
//! - Register records, enums, services, providers, consumers and aliases
//! - Report duplicate declarations and duplicate members
//! - Reject `extends` clauses and malformed transports
//! - Record descriptions and deprecations in the metadata table
//!
//! A duplicate declaration is still stored (its members are resolved and
//! reported on) but only the first one is bound by name.

use rustc_hash::FxHashMap;
use tether_ast::{
    ConsumerDecl, EnumDecl, Expr, ExprKind, File, Ident, ObjectEntry, ProviderDecl, RecordDecl,
    ServiceDecl, Statement, StatementKind, TransportDecl,
};
use tether_core::{
    AliasEntry, ConfigValue, ConsumerEntry, EnumEntry, EnumValue, Field, Highlight, Implements,
    NodeRef, Operation, PackageId, Parameter, ProviderEntry, RecordEntry, RegistrationError,
    RequestedOperation, SemanticError, ServiceEntry, Transport, Type, TypeEntry, TypeReference,
    TypeSource, UnresolvedType, Uses,
};
use tracing::{debug, instrument, trace};

use crate::context::CompilationContext;

/// Output of the registration pass.
#[derive(Debug, Default)]
pub struct RegistrationOutput {
    /// Number of files walked.
    pub files: usize,
    /// Number of types bound by name.
    pub types_registered: usize,
    /// Number of declarations rejected as duplicates.
    pub duplicates: usize,
}

/// Registers declarations, leaving every type reference unresolved.
pub struct RegistrationPass<'a, 'd> {
    ctx: &'a mut CompilationContext<'d>,
    output: RegistrationOutput,
}

impl<'a, 'd> RegistrationPass<'a, 'd> {
    pub fn new(ctx: &'a mut CompilationContext<'d>) -> Self {
        Self {
            ctx,
            output: RegistrationOutput::default(),
        }
    }

    /// Run the registration pass over every file.
    #[instrument(skip_all, name = "registration")]
    pub fn run(mut self, files: &[File]) -> RegistrationOutput {
        for file in files {
            self.visit_file(file);
        }

        debug!(
            files = self.output.files,
            packages = self.ctx.graph.packages().len(),
            types = self.output.types_registered,
            duplicates = self.output.duplicates,
            "registration finished"
        );
        self.output
    }

    fn visit_file(&mut self, file: &File) {
        self.output.files += 1;
        let path: Vec<&str> = file.package.names().collect();
        let package = self.ctx.graph.packages_mut().get_or_create_path(path.as_slice());
        trace!(file = %file.path, package = %file.package.dotted(), "registering file");

        if self.ctx.options.style_warnings && file.mixes_endpoints() {
            let highlights: Vec<Highlight> = file
                .statements
                .iter()
                .filter(|statement| statement.is_endpoint())
                .map(|statement| Highlight::new(statement.name.node().location()))
                .collect();
            self.ctx.report(SemanticError::OneDeclarationPerFile, highlights);
        }

        for statement in &file.statements {
            self.visit_statement(statement, package);
        }
    }

    fn visit_statement(&mut self, statement: &Statement, package: PackageId) {
        let name = statement.name.name.as_str();
        let source = TypeSource::new(statement.node(), statement.name.node());
        self.ctx.metadata.insert(statement.id, statement.metadata.clone());

        let entry: TypeEntry = match &statement.kind {
            StatementKind::Record(decl) => self.visit_record(name, package, source, decl).into(),
            StatementKind::Enum(decl) => self.visit_enum(name, package, source, decl).into(),
            StatementKind::Service(decl) => self.visit_service(name, package, source, decl).into(),
            StatementKind::Provider(decl) => {
                self.visit_provider(name, package, source, decl).into()
            }
            StatementKind::Consumer(decl) => {
                self.visit_consumer(name, package, source, decl).into()
            }
            StatementKind::Alias(decl) => {
                AliasEntry::new(name, package, source, unresolved(&decl.target)).into()
            }
        };

        let id = self.ctx.graph.add_type(entry);
        match self.ctx.graph.register_type(id) {
            Ok(()) => {
                self.output.types_registered += 1;
                self.ctx
                    .graph
                    .set_resolved_node(package, statement.name.id, Type::Named(id));
            }
            Err(RegistrationError::DuplicateType { existing, .. }) => {
                self.output.duplicates += 1;
                let first = self.ctx.graph.get(existing).map(|entry| entry.source().name);
                let here = Highlight::new(statement.name.node().location())
                    .with_message("duplicate declared here");
                let mut highlights = vec![here];
                if let Some(first) = first {
                    highlights.push(
                        Highlight::new(first.location()).with_message("first declared here"),
                    );
                }
                let error = SemanticError::DuplicateDeclaration {
                    name: name.to_string(),
                    package: self.ctx.graph.packages().dotted_name(package),
                };
                self.ctx.report(error, highlights);
            }
            Err(RegistrationError::InvalidPackage) => {
                trace!(name, "declaration in unknown package dropped");
            }
        }
    }

    // ==========================================================================
    // Records and Enums
    // ==========================================================================

    fn visit_record(
        &mut self,
        name: &str,
        package: PackageId,
        source: TypeSource,
        decl: &RecordDecl,
    ) -> RecordEntry {
        let mut record = RecordEntry::new(name, package, source);

        for extends in &decl.extends {
            self.ctx.report_at(
                SemanticError::ExtendsNotSupported {
                    record: name.to_string(),
                },
                extends.node(),
            );
        }

        let mut seen = MemberNames::default();
        for field in &decl.fields {
            if seen.check(&field.name) {
                record
                    .fields
                    .push(Field::new(&field.name.name, field.node(), unresolved(&field.ty)));
                self.ctx.metadata.insert(field.id, field.metadata.clone());
            }
        }
        self.report_duplicates(seen, |field| SemanticError::DuplicateField {
            record: name.to_string(),
            field,
        });

        record
    }

    fn visit_enum(
        &mut self,
        name: &str,
        package: PackageId,
        source: TypeSource,
        decl: &EnumDecl,
    ) -> EnumEntry {
        let mut entry = EnumEntry::new(name, package, source);

        let mut seen = MemberNames::default();
        for value in &decl.values {
            if seen.check(&value.name) {
                entry.values.push(EnumValue::new(&value.name.name, value.node()));
                self.ctx.metadata.insert(value.id, value.metadata.clone());
            }
        }
        self.report_duplicates(seen, |value| SemanticError::DuplicateEnumValue {
            enum_name: name.to_string(),
            value,
        });

        entry
    }

    // ==========================================================================
    // Services
    // ==========================================================================

    fn visit_service(
        &mut self,
        name: &str,
        package: PackageId,
        source: TypeSource,
        decl: &ServiceDecl,
    ) -> ServiceEntry {
        let mut service = ServiceEntry::new(name, package, source);

        let mut seen = MemberNames::default();
        for op in &decl.operations {
            let mut operation = Operation::new(&op.name.name, op.node(), op.kind);

            let mut params = MemberNames::default();
            for param in &op.parameters {
                if params.check(&param.name) {
                    let ty = unresolved(&param.ty);
                    operation
                        .parameters
                        .push(Parameter::new(&param.name.name, param.node(), ty));
                }
            }
            self.report_duplicates(params, |parameter| SemanticError::DuplicateParameter {
                operation: op.name.name.clone(),
                parameter,
            });
            operation.returns = op.returns.as_ref().map(unresolved);

            if seen.check(&op.name) {
                self.ctx.metadata.insert(op.id, op.metadata.clone());
                service.operations.push(operation);
            }
        }
        self.report_duplicates(seen, |operation| SemanticError::DuplicateOperation {
            service: name.to_string(),
            operation,
        });

        service
    }

    // ==========================================================================
    // Providers and Consumers
    // ==========================================================================

    fn visit_provider(
        &mut self,
        name: &str,
        package: PackageId,
        source: TypeSource,
        decl: &ProviderDecl,
    ) -> ProviderEntry {
        let mut provider = ProviderEntry::new(name, package, source);

        provider.implements = decl
            .implements
            .iter()
            .map(|clause| {
                Implements::new(
                    clause.node(),
                    unresolved(&clause.service),
                    clause.operations.as_deref().map(requested),
                )
            })
            .collect();

        match decl.transports.as_slice() {
            [] => self.ctx.report_at(
                SemanticError::MissingTransport {
                    provider: name.to_string(),
                },
                source.name,
            ),
            [first, rest @ ..] => {
                for extra in rest {
                    let error = SemanticError::MultipleTransports {
                        provider: name.to_string(),
                    };
                    let first_here = Highlight::new(first.node().location())
                        .with_message("first transport declared here");
                    self.ctx.report(error, [Highlight::new(extra.node().location()), first_here]);
                }
                provider.transport = Some(self.visit_transport(first));
            }
        }

        provider
    }

    fn visit_transport(&mut self, decl: &TransportDecl) -> Transport {
        let mut transport = Transport::new(&decl.name.name, decl.node());
        let Some(config) = &decl.config else {
            return transport;
        };

        let converted = match &config.kind {
            ExprKind::Object(entries) => config_entries(entries),
            _ => Err(config.node()),
        };
        match converted {
            Ok(entries) => transport.config = entries,
            Err(node) => self.ctx.report_at(SemanticError::InvalidTransportConfig, node),
        }

        transport
    }

    fn visit_consumer(
        &mut self,
        name: &str,
        package: PackageId,
        source: TypeSource,
        decl: &ConsumerDecl,
    ) -> ConsumerEntry {
        let mut consumer = ConsumerEntry::new(name, package, source, unresolved(&decl.provider));
        consumer.uses = decl
            .uses
            .iter()
            .map(|clause| {
                Uses::new(
                    clause.node(),
                    unresolved(&clause.service),
                    clause.operations.as_deref().map(requested),
                )
            })
            .collect();
        consumer
    }

    // ==========================================================================
    // Helpers
    // ==========================================================================

    fn report_duplicates(&mut self, seen: MemberNames, error: impl Fn(String) -> SemanticError) {
        for (duplicate, first) in seen.duplicates {
            let highlights = [
                Highlight::new(duplicate.node().location()),
                Highlight::new(first.location()).with_message("first declared here"),
            ];
            self.ctx.report(error(duplicate.name), highlights);
        }
    }
}

/// Member names seen so far in one declaration.
#[derive(Default)]
struct MemberNames {
    first: FxHashMap<String, NodeRef>,
    duplicates: Vec<(Ident, NodeRef)>,
}

impl MemberNames {
    /// Whether `name` is new; repeats are remembered for reporting.
    fn check(&mut self, name: &Ident) -> bool {
        match self.first.get(&name.name) {
            Some(first) => {
                self.duplicates.push((name.clone(), *first));
                false
            }
            None => {
                self.first.insert(name.name.clone(), name.node());
                true
            }
        }
    }
}

fn unresolved(expr: &Expr) -> TypeReference {
    TypeReference::Unresolved(UnresolvedType::new(expr.node(), expr.to_string()))
}

fn requested(operations: &[Ident]) -> Vec<RequestedOperation> {
    operations
        .iter()
        .map(|op| RequestedOperation::new(&op.name, op.node()))
        .collect()
}

/// Convert a transport configuration value, failing at the first node that
/// is not a literal, array or object.
fn config_value(expr: &Expr) -> Result<ConfigValue, NodeRef> {
    match &expr.kind {
        ExprKind::Literal(literal) => Ok(ConfigValue::Literal(literal.clone())),
        ExprKind::Array(items) => items
            .iter()
            .map(config_value)
            .collect::<Result<Vec<_>, _>>()
            .map(ConfigValue::List),
        ExprKind::Object(entries) => config_entries(entries).map(ConfigValue::Object),
        _ => Err(expr.node()),
    }
}

fn config_entries(entries: &[ObjectEntry]) -> Result<Vec<(String, ConfigValue)>, NodeRef> {
    entries
        .iter()
        .map(|entry| config_value(&entry.value).map(|value| (entry.key.name.clone(), value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuildOptions;
    use tether_ast::FileBuilder;
    use tether_core::{Diagnostics, FileId, Literal, Number};

    fn register(
        files: &[File],
        options: BuildOptions,
    ) -> (tether_registry::TypeGraph, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let mut ctx = CompilationContext::new(options, &mut diagnostics);
        RegistrationPass::new(&mut ctx).run(files);
        let (graph, _) = ctx.finish();
        (graph, diagnostics)
    }

    fn errors(diagnostics: &Diagnostics) -> Vec<SemanticError> {
        diagnostics.iter().filter_map(|d| d.error.clone()).collect()
    }

    #[test]
    fn registers_types_in_packages() {
        let b = FileBuilder::new(FileId::new(0), "shop.tether");
        let file = b.file(
            &["shop", "orders"],
            vec![],
            vec![
                b.record("Order", vec![b.field("id", b.ident("String"))]),
                b.enumeration("Status", &["Open", "Closed"]),
            ],
        );
        let (graph, diagnostics) = register(&[file], BuildOptions::default());

        assert!(diagnostics.is_empty());
        let orders = graph.packages().get_path(&["shop", "orders"]).unwrap();
        let order = graph.lookup(orders, "Order").unwrap();
        assert_eq!(graph.qualified_name(order), "shop.orders.Order");

        let record = graph.get(order).and_then(TypeEntry::as_record).unwrap();
        assert!(!record.fields[0].ty.is_resolved());
        let status = graph.lookup(orders, "Status").unwrap();
        assert_eq!(graph.get(status).unwrap().kind_name(), "enum");
    }

    #[test]
    fn duplicate_declaration_keeps_first() {
        let a = FileBuilder::new(FileId::new(0), "a.tether");
        let first = a.file(&["shop"], vec![], vec![a.record("Item", vec![])]);
        let b = FileBuilder::new(FileId::new(1), "b.tether");
        let second = b.file(&["shop"], vec![], vec![b.enumeration("Item", &["A"])]);
        let (graph, diagnostics) = register(&[first, second], BuildOptions::default());

        assert_eq!(
            errors(&diagnostics),
            vec![SemanticError::DuplicateDeclaration {
                name: "Item".into(),
                package: "shop".into()
            }]
        );
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.highlights.len(), 2);
        assert_eq!(diagnostic.highlights[0].location.file, FileId::new(1));
        assert_eq!(diagnostic.highlights[1].location.file, FileId::new(0));

        let shop = graph.packages().get_path(&["shop"]).unwrap();
        let item = graph.lookup(shop, "Item").unwrap();
        assert!(graph.get(item).unwrap().is_record());
        assert_eq!(graph.type_count(), 2);
    }

    #[test]
    fn duplicate_members() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &[],
            vec![],
            vec![
                b.record(
                    "R",
                    vec![b.field("a", b.ident("Int")), b.field("a", b.ident("String"))],
                ),
                b.enumeration("E", &["X", "X"]),
                b.service(
                    "S",
                    vec![
                        b.operation(
                            "get",
                            vec![b.param("p", b.ident("Int")), b.param("p", b.ident("Int"))],
                            None,
                        ),
                        b.oneway("get", vec![]),
                    ],
                ),
            ],
        );
        let (graph, diagnostics) = register(&[file], BuildOptions::default());

        assert_eq!(
            errors(&diagnostics),
            vec![
                SemanticError::DuplicateField {
                    record: "R".into(),
                    field: "a".into()
                },
                SemanticError::DuplicateEnumValue {
                    enum_name: "E".into(),
                    value: "X".into()
                },
                SemanticError::DuplicateParameter {
                    operation: "get".into(),
                    parameter: "p".into()
                },
                SemanticError::DuplicateOperation {
                    service: "S".into(),
                    operation: "get".into()
                },
            ]
        );
        let r = graph.lookup(graph.root(), "R").unwrap();
        assert_eq!(graph.get(r).and_then(TypeEntry::as_record).unwrap().fields.len(), 1);
    }

    #[test]
    fn extends_is_rejected() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let record = b.record_extending("R", vec![], vec![b.ident("Base")]);
        let file = b.file(&[], vec![], vec![record]);
        let (_, diagnostics) = register(&[file], BuildOptions::default());

        assert_eq!(
            errors(&diagnostics),
            vec![SemanticError::ExtendsNotSupported { record: "R".into() }]
        );
    }

    #[test]
    fn provider_transport_rules() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let config = b.object(vec![
            ("port", b.int(8080)),
            ("paths", b.array(vec![b.string("/a"), b.string("/b")])),
        ]);
        let file = b.file(
            &[],
            vec![],
            vec![
                b.provider("Http", vec![], b.transport("HTTP", Some(config))),
                b.provider_with_transports("None", vec![], vec![]),
                b.provider_with_transports(
                    "Two",
                    vec![],
                    vec![b.transport("http", None), b.transport("grpc", None)],
                ),
                b.provider("Bad", vec![], b.transport("http", Some(b.int(3)))),
            ],
        );
        let options = BuildOptions::default().with_style_warnings(false);
        let (graph, diagnostics) = register(&[file], options);

        assert_eq!(
            errors(&diagnostics),
            vec![
                SemanticError::MissingTransport {
                    provider: "None".into()
                },
                SemanticError::MultipleTransports {
                    provider: "Two".into()
                },
                SemanticError::InvalidTransportConfig,
            ]
        );

        let http = graph.lookup(graph.root(), "Http").unwrap();
        let transport = graph
            .get(http)
            .and_then(TypeEntry::as_provider)
            .and_then(|p| p.transport.as_ref())
            .unwrap();
        assert_eq!(transport.name, "http");
        assert_eq!(
            transport.config_value("port"),
            Some(&ConfigValue::Literal(Literal::Number(Number::Integer(8080))))
        );

        let two = graph.lookup(graph.root(), "Two").unwrap();
        let provider = graph.get(two).and_then(TypeEntry::as_provider).unwrap();
        let kept = provider.transport.as_ref();
        assert_eq!(kept.map(|t| t.name.as_str()), Some("http"));
    }

    #[test]
    fn endpoints_sharing_a_file_warn() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &[],
            vec![],
            vec![
                b.service("S", vec![]),
                b.provider("P", vec![b.implements(b.ident("S"), None)], b.transport("http", None)),
            ],
        );

        let (_, diagnostics) = register(&[file.clone()], BuildOptions::default());
        assert_eq!(errors(&diagnostics), vec![SemanticError::OneDeclarationPerFile]);
        assert!(!diagnostics.has_errors());

        let (_, quiet) = register(&[file], BuildOptions::default().with_style_warnings(false));
        assert!(quiet.is_empty());
    }

    #[test]
    fn metadata_is_recorded() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let statement = b
            .record("R", vec![b.field("a", b.ident("Int")).with_description("the a")])
            .deprecated("use S");
        let field_id = match &statement.kind {
            StatementKind::Record(decl) => decl.fields[0].id,
            _ => unreachable!(),
        };
        let statement_id = statement.id;
        let file = b.file(&[], vec![], vec![statement]);

        let mut diagnostics = Diagnostics::new();
        let mut ctx = CompilationContext::new(BuildOptions::default(), &mut diagnostics);
        RegistrationPass::new(&mut ctx).run(&[file]);
        let (_, metadata) = ctx.finish();

        let deprecation = metadata.get(statement_id).and_then(|m| m.deprecation.as_deref());
        assert_eq!(deprecation, Some("use S"));
        let description = metadata.get(field_id).and_then(|m| m.description.as_deref());
        assert_eq!(description, Some("the a"));
    }
}
