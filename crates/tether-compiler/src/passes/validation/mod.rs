//! Validation Pass - model checks over the fully resolved graph.
//!
//! Runs after resolution and the alias fixpoint, walking the package tree in
//! order. Duplicate declarations are not bound by name but are checked like
//! any other entry of their package:
//!
//! 1. Records, services and aliases: data-position usage ([`usage`]) and
//!    record cycles ([`cycles`])
//! 2. Providers: `implements` clauses ([`endpoints`])
//! 3. Consumers: `uses` clauses against their provider ([`endpoints`])

pub mod cycles;
pub mod endpoints;
pub mod usage;

use rustc_hash::FxHashMap;
use tether_core::{Highlight, PackageId, SemanticError, TypeEntry, TypeId};
use tracing::{debug, instrument, trace};

use crate::context::CompilationContext;

use self::cycles::find_cycle;
use self::endpoints::{check_consumer, check_provider};
use self::usage::UsageChecker;

/// Output of the validation pass.
#[derive(Debug, Default)]
pub struct ValidationOutput {
    pub records_checked: usize,
    pub cycles: usize,
    pub providers_checked: usize,
    pub consumers_checked: usize,
}

pub struct ValidationPass<'a, 'd> {
    ctx: &'a mut CompilationContext<'d>,
    output: ValidationOutput,
}

impl<'a, 'd> ValidationPass<'a, 'd> {
    pub fn new(ctx: &'a mut CompilationContext<'d>) -> Self {
        Self {
            ctx,
            output: ValidationOutput::default(),
        }
    }

    #[instrument(skip_all, name = "validation")]
    pub fn run(mut self) -> ValidationOutput {
        let types = self.types_in_package_order();

        for &id in &types {
            self.check_usage(id);
            self.check_cycles(id);
        }
        for &id in &types {
            self.check_provider(id);
        }
        for &id in &types {
            self.check_consumer(id);
        }

        debug!(
            records = self.output.records_checked,
            cycles = self.output.cycles,
            providers = self.output.providers_checked,
            consumers = self.output.consumers_checked,
            "validation finished"
        );
        self.output
    }

    /// Every declared type, duplicates included, in package-tree order and
    /// declaration order within a package.
    fn types_in_package_order(&self) -> Vec<TypeId> {
        let graph = &self.ctx.graph;
        let rank: FxHashMap<PackageId, usize> = graph
            .packages()
            .all()
            .into_iter()
            .enumerate()
            .map(|(i, package)| (package, i))
            .collect();

        let mut types: Vec<(usize, TypeId)> = graph
            .types()
            .map(|(id, entry)| (rank.get(&entry.package()).copied().unwrap_or(usize::MAX), id))
            .collect();
        types.sort_by_key(|&(rank, _)| rank);
        types.into_iter().map(|(_, id)| id).collect()
    }

    fn check_usage(&mut self, id: TypeId) {
        let graph = &self.ctx.graph;
        let mut checker = UsageChecker::new(graph);
        match graph.get(id) {
            Some(TypeEntry::Record(record)) => {
                self.output.records_checked += 1;
                for field in &record.fields {
                    if let Some(reference) = field.ty.as_resolved() {
                        checker.check_data(reference);
                    }
                }
            }
            Some(TypeEntry::Service(service)) => {
                let references = service.operations.iter().flat_map(|op| op.references());
                for reference in references.filter_map(|r| r.as_resolved()) {
                    checker.check_data(reference);
                }
            }
            Some(TypeEntry::Alias(alias)) => {
                if let Some(reference) = alias.aliased.as_resolved() {
                    checker.check_alias_target(reference);
                }
            }
            _ => {}
        }
        let diagnostics = checker.finish();
        self.ctx.extend(diagnostics);
    }

    fn check_cycles(&mut self, id: TypeId) {
        let graph = &self.ctx.graph;
        let Some(record) = graph.get(id).and_then(TypeEntry::as_record) else {
            return;
        };
        let Some(cycle) = find_cycle(graph, id) else {
            return;
        };

        let required = cycle.is_required();
        if !required && !self.ctx.options.optional_cycle_warnings {
            trace!(record = %record.name, "optional-only cycle ignored");
            return;
        }

        let path = cycle.describe(graph);
        let record = record.name.clone();
        let error = if required {
            SemanticError::RecordCycle { record, path }
        } else {
            SemanticError::OptionalRecordCycle { record, path }
        };
        let highlights: Vec<Highlight> = cycle
            .edges
            .iter()
            .enumerate()
            .map(|(i, edge)| {
                let highlight = Highlight::new(edge.node.location());
                if i == 0 {
                    highlight
                } else {
                    highlight.with_message("continues here")
                }
            })
            .collect();

        self.output.cycles += 1;
        self.ctx.report(error, highlights);
    }

    fn check_provider(&mut self, id: TypeId) {
        if !self.ctx.graph.get(id).is_some_and(TypeEntry::is_provider) {
            return;
        }
        self.output.providers_checked += 1;

        let check = check_provider(&self.ctx.graph, id);
        self.ctx.extend(check.diagnostics);
        if let Some(TypeEntry::Provider(provider)) = self.ctx.graph.get_mut(id) {
            for (clause, binding) in provider.implements.iter_mut().zip(check.implements) {
                clause.service_id = binding.service;
                clause.operations = binding.operations;
            }
        }
    }

    fn check_consumer(&mut self, id: TypeId) {
        if !matches!(self.ctx.graph.get(id), Some(TypeEntry::Consumer(_))) {
            return;
        }
        self.output.consumers_checked += 1;

        let check = check_consumer(&self.ctx.graph, id);
        self.ctx.extend(check.diagnostics);
        if let Some(TypeEntry::Consumer(consumer)) = self.ctx.graph.get_mut(id) {
            consumer.provider_id = check.provider;
            for (clause, binding) in consumer.uses.iter_mut().zip(check.uses) {
                clause.service_id = binding.service;
                clause.operations = binding.operations;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuildOptions;
    use crate::passes::{AliasPass, RegistrationPass, ResolutionPass};
    use tether_ast::{File, FileBuilder};
    use tether_core::{Diagnostics, FileId};
    use tether_registry::TypeGraph;

    fn validate(files: &[File], options: BuildOptions) -> (TypeGraph, Vec<SemanticError>) {
        let mut diagnostics = Diagnostics::new();
        let mut ctx = CompilationContext::new(options, &mut diagnostics);
        RegistrationPass::new(&mut ctx).run(files);
        ResolutionPass::new(&mut ctx).run(files);
        AliasPass::new(&mut ctx).run();
        ValidationPass::new(&mut ctx).run();
        let (graph, _) = ctx.finish();
        let errors = diagnostics.iter().filter_map(|d| d.error.clone()).collect();
        (graph, errors)
    }

    fn quiet() -> BuildOptions {
        BuildOptions::default().with_style_warnings(false)
    }

    #[test]
    fn service_in_data_position() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &[],
            vec![],
            vec![
                b.service("S", vec![]),
                b.alias("Svc", b.ident("S")),
                b.record(
                    "R",
                    vec![
                        b.field("direct", b.ident("S")),
                        b.field("nested", b.list(b.ident("Svc"))),
                    ],
                ),
            ],
        );
        let (_, errors) = validate(&[file], quiet());

        assert_eq!(
            errors,
            vec![
                SemanticError::DisallowedDataType {
                    kind: "service",
                    name: "S".into()
                },
                SemanticError::DisallowedDataType {
                    kind: "service",
                    name: "S".into()
                },
            ]
        );
    }

    #[test]
    fn map_key_through_alias() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &[],
            vec![],
            vec![
                b.alias("MyInt", b.ident("Int")),
                b.record("R", vec![b.field("m", b.map(b.ident("MyInt"), b.ident("String")))]),
            ],
        );
        let (_, errors) = validate(&[file], quiet());

        assert_eq!(errors, vec![SemanticError::MapKeyNotString { found: "Int".into() }]);
    }

    #[test]
    fn optional_cycle_warning_can_be_disabled() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &[],
            vec![],
            vec![b.record("R", vec![b.field("next", b.optional(b.ident("R")))])],
        );

        let (_, errors) = validate(&[file.clone()], quiet());
        assert!(matches!(errors.as_slice(), [SemanticError::OptionalRecordCycle { .. }]));

        let (_, errors) = validate(&[file], quiet().with_optional_cycle_warnings(false));
        assert!(errors.is_empty());
    }

    #[test]
    fn provider_binds_operations() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &[],
            vec![],
            vec![
                b.service("S", vec![b.oneway("get", vec![]), b.oneway("put", vec![])]),
                b.provider(
                    "P",
                    vec![b.implements(b.ident("S"), Some(&["get", "post", "get"]))],
                    b.transport("http", None),
                ),
            ],
        );
        let (graph, errors) = validate(&[file], quiet());

        assert_eq!(
            errors,
            vec![
                SemanticError::DuplicateRequestedOperation {
                    operation: "get".into()
                },
                SemanticError::UnknownOperation {
                    operation: "post".into(),
                    service: "S".into()
                },
            ]
        );
        let p = graph.lookup(graph.root(), "P").unwrap();
        let clause = &graph.get(p).and_then(TypeEntry::as_provider).unwrap().implements[0];
        assert_eq!(clause.operations, vec!["get".to_string()]);
        assert_eq!(clause.service_id, graph.lookup(graph.root(), "S"));
    }

    #[test]
    fn constrained_service_reference() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &[],
            vec![],
            vec![
                b.service("S", vec![]),
                b.alias("MaybeS", b.optional(b.ident("S"))),
                b.provider(
                    "P",
                    vec![b.implements(b.ident("MaybeS"), None)],
                    b.transport("http", None),
                ),
                b.provider(
                    "Q",
                    vec![b.implements(b.ident("Int"), None)],
                    b.transport("http", None),
                ),
            ],
        );
        let (_, errors) = validate(&[file], quiet());

        assert_eq!(
            errors,
            vec![
                SemanticError::ConstrainedServiceReference { kind: "service" },
                SemanticError::NotAService { name: "Int".into() },
            ]
        );
    }

    #[test]
    fn consumer_distinguishes_unknown_and_unimplemented() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &[],
            vec![],
            vec![
                b.service("S", vec![b.oneway("x", vec![]), b.oneway("y", vec![])]),
                b.service("T", vec![]),
                b.provider(
                    "P",
                    vec![b.implements(b.ident("S"), Some(&["y"]))],
                    b.transport("http", None),
                ),
                b.consumer(
                    "C",
                    b.ident("P"),
                    vec![b.uses(b.ident("S"), Some(&["x", "z"])), b.uses(b.ident("T"), None)],
                ),
            ],
        );
        let (graph, errors) = validate(&[file], quiet());

        assert_eq!(
            errors,
            vec![
                SemanticError::OperationNotImplemented {
                    operation: "x".into(),
                    service: "S".into(),
                    provider: "P".into()
                },
                SemanticError::UnknownOperation {
                    operation: "z".into(),
                    service: "S".into()
                },
                SemanticError::ServiceNotImplemented {
                    provider: "P".into(),
                    service: "T".into()
                },
            ]
        );
        let c = graph.lookup(graph.root(), "C").unwrap();
        let consumer = graph.get(c).and_then(TypeEntry::as_consumer).unwrap();
        assert_eq!(consumer.provider_id, graph.lookup(graph.root(), "P"));
    }

    #[test]
    fn duplicate_declarations_are_still_checked() {
        let a = FileBuilder::new(FileId::new(0), "a.tether");
        let first = a.file(
            &["p"],
            vec![],
            vec![a.record("R", vec![]), a.service("S", vec![])],
        );
        let b = FileBuilder::new(FileId::new(1), "b.tether");
        let second = b.file(
            &["p"],
            vec![],
            vec![b.record("R", vec![b.field("s", b.ident("S")), b.field("me", b.ident("R"))])],
        );
        let (graph, errors) = validate(&[first, second], quiet());

        assert_eq!(
            errors,
            vec![
                SemanticError::DuplicateDeclaration {
                    name: "R".into(),
                    package: "p".into()
                },
                SemanticError::DisallowedDataType {
                    kind: "service",
                    name: "S".into()
                },
            ]
        );
        // `me` names the bound `R`, which has no fields, so there is no cycle.
        let p = graph.packages().get_path(&["p"]).unwrap();
        assert_eq!(graph.type_count(), 3);
        assert!(graph.lookup(p, "R").is_some());
    }

    #[test]
    fn consumer_of_non_provider() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &[],
            vec![],
            vec![b.service("S", vec![]), b.consumer("C", b.ident("S"), vec![])],
        );
        let (_, errors) = validate(&[file], quiet());

        assert_eq!(errors, vec![SemanticError::NotAProvider { name: "S".into() }]);
    }
}
