//! Resolution Pass - resolve every registered type reference.
//!
//! Builds the lexical scope of each file, then replaces every
//! [`TypeReference::Unresolved`] in the graph with a resolved reference:
//!
//! 1. Alias targets, in rounds. A shorthand constraint on an alias
//!    (`alias Short = Name(1..3)`) means `size` or `range` depending on what
//!    `Name` stands for, so an alias whose shorthand depends on a
//!    not-yet-resolved alias waits for a later round. Whatever is still
//!    waiting when a round makes no progress is resolved as-is; those are
//!    the cyclic aliases the fixpoint reports.
//! 2. Everything else: record fields, operation signatures, `implements`,
//!    consumer providers and `uses`.
//!
//! Entries are resolved in place by cloning them out of the graph, resolving
//! the clone against the (unchanged) graph and writing it back.

use rustc_hash::FxHashMap;
use tether_ast::{Expr, File, StatementKind};
use tether_core::{FileId, NodeId, TypeEntry, TypeId};
use tracing::{debug, instrument, trace};

use crate::context::CompilationContext;
use crate::scope::{FileScope, ScopeBuilder};
use crate::type_resolver::{Resolution, TypeResolver};

/// Output of the resolution pass.
#[derive(Debug, Default)]
pub struct ResolutionOutput {
    /// Number of references resolved.
    pub references_resolved: usize,
    /// Rounds spent on alias targets.
    pub alias_rounds: usize,
}

/// Resolves the type references of every registered entry.
pub struct ResolutionPass<'a, 'd> {
    ctx: &'a mut CompilationContext<'d>,
    output: ResolutionOutput,
}

impl<'a, 'd> ResolutionPass<'a, 'd> {
    pub fn new(ctx: &'a mut CompilationContext<'d>) -> Self {
        Self {
            ctx,
            output: ResolutionOutput::default(),
        }
    }

    #[instrument(skip_all, name = "resolution")]
    pub fn run(mut self, files: &[File]) -> ResolutionOutput {
        let mut scopes: FxHashMap<FileId, FileScope> = FxHashMap::default();
        for file in files {
            let (scope, diagnostics) = ScopeBuilder::new(&self.ctx.graph).build(file);
            trace!(file = %file.path, names = scope.len(), "scope built");
            self.ctx.extend(diagnostics);
            scopes.insert(file.id, scope);
        }

        let index = ExprIndex::new(files);
        let (aliases, others): (Vec<TypeId>, Vec<TypeId>) = self
            .ctx
            .graph
            .type_ids()
            .partition(|&id| self.ctx.graph.get(id).is_some_and(TypeEntry::is_alias));

        self.resolve_aliases(aliases, &scopes, &index);
        for id in others {
            if let Some(resolution) = self.attempt(id, &scopes, &index, false) {
                self.commit(id, resolution);
            }
        }

        debug!(
            references = self.output.references_resolved,
            alias_rounds = self.output.alias_rounds,
            "resolution finished"
        );
        self.output
    }

    fn resolve_aliases(
        &mut self,
        mut pending: Vec<TypeId>,
        scopes: &FxHashMap<FileId, FileScope>,
        index: &ExprIndex<'_>,
    ) {
        loop {
            self.output.alias_rounds += 1;
            let before = pending.len();
            pending.retain(|&id| match self.attempt(id, scopes, index, false) {
                Some(resolution) => {
                    self.commit(id, resolution);
                    false
                }
                None => true,
            });
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }

        for id in pending {
            let alias = self.ctx.graph.qualified_name(id);
            trace!(%alias, "alias resolved without its shorthand base");
            if let Some(resolution) = self.attempt(id, scopes, index, true) {
                self.commit(id, resolution);
            }
        }
    }

    /// Resolve a copy of an entry.
    ///
    /// Returns `None` if the entry's file has no scope, or if the result was
    /// deferred and `force` is not set.
    fn attempt(
        &self,
        id: TypeId,
        scopes: &FxHashMap<FileId, FileScope>,
        index: &ExprIndex<'_>,
        force: bool,
    ) -> Option<(TypeEntry, Resolution)> {
        let mut entry = self.ctx.graph.get(id)?.clone();
        let scope = scopes.get(&entry.source().declaration.id.file)?;

        let mut resolver = TypeResolver::new(&self.ctx.graph, scope);
        let expr_of = |node: NodeId| index.get(node);
        match &mut entry {
            TypeEntry::Record(record) => {
                for field in &mut record.fields {
                    resolver.resolve_in_place(&mut field.ty, expr_of);
                }
            }
            TypeEntry::Enum(_) => {}
            TypeEntry::Service(service) => {
                for operation in &mut service.operations {
                    for param in &mut operation.parameters {
                        resolver.resolve_in_place(&mut param.ty, expr_of);
                    }
                    if let Some(returns) = &mut operation.returns {
                        resolver.resolve_in_place(returns, expr_of);
                    }
                }
            }
            TypeEntry::Provider(provider) => {
                for clause in &mut provider.implements {
                    resolver.resolve_in_place(&mut clause.service, expr_of);
                }
            }
            TypeEntry::Consumer(consumer) => {
                resolver.resolve_in_place(&mut consumer.provider, expr_of);
                for clause in &mut consumer.uses {
                    resolver.resolve_in_place(&mut clause.service, expr_of);
                }
            }
            TypeEntry::Alias(alias) => resolver.resolve_in_place(&mut alias.aliased, expr_of),
        }

        let resolution = resolver.finish();
        if resolution.deferred && !force {
            return None;
        }
        Some((entry, resolution))
    }

    fn commit(&mut self, id: TypeId, (entry, resolution): (TypeEntry, Resolution)) {
        let package = entry.package();
        self.output.references_resolved += count_references(&entry);

        self.ctx.extend(resolution.diagnostics);
        for (node, ty) in resolution.resolved_nodes {
            self.ctx.graph.set_resolved_node(package, node, ty);
        }
        if let Some(slot) = self.ctx.graph.get_mut(id) {
            *slot = entry;
        }
    }
}

fn count_references(entry: &TypeEntry) -> usize {
    match entry {
        TypeEntry::Record(record) => record.fields.len(),
        TypeEntry::Enum(_) => 0,
        TypeEntry::Service(service) => service
            .operations
            .iter()
            .map(|op| op.references().count())
            .sum(),
        TypeEntry::Provider(provider) => provider.implements.len(),
        TypeEntry::Consumer(consumer) => 1 + consumer.uses.len(),
        TypeEntry::Alias(_) => 1,
    }
}

/// Type expressions of every file, keyed by their root node.
struct ExprIndex<'f> {
    exprs: FxHashMap<NodeId, &'f Expr>,
}

impl<'f> ExprIndex<'f> {
    fn new(files: &'f [File]) -> Self {
        let mut exprs = FxHashMap::default();
        let mut add = |expr: &'f Expr| {
            exprs.insert(expr.id, expr);
        };

        for statement in files.iter().flat_map(|file| &file.statements) {
            match &statement.kind {
                StatementKind::Record(decl) => decl.fields.iter().for_each(|field| add(&field.ty)),
                StatementKind::Enum(_) => {}
                StatementKind::Service(decl) => {
                    for op in &decl.operations {
                        op.parameters.iter().for_each(|param| add(&param.ty));
                        if let Some(returns) = &op.returns {
                            add(returns);
                        }
                    }
                }
                StatementKind::Provider(decl) => {
                    decl.implements.iter().for_each(|clause| add(&clause.service));
                }
                StatementKind::Consumer(decl) => {
                    add(&decl.provider);
                    decl.uses.iter().for_each(|clause| add(&clause.service));
                }
                StatementKind::Alias(decl) => add(&decl.target),
            }
        }

        Self { exprs }
    }

    fn get(&self, node: NodeId) -> Option<&'f Expr> {
        self.exprs.get(&node).copied()
    }
}
