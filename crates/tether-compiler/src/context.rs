//! CompilationContext - state shared by every pass of a build.

use tether_core::{Diagnostic, Diagnostics, Highlight, MetadataTable, NodeRef, SemanticError};
use tether_registry::TypeGraph;

use crate::BuildOptions;

/// The graph under construction, its metadata table, the build options and
/// the diagnostic sink.
///
/// Passes borrow the context mutably one after another; nothing else can
/// observe the graph until [`CompilationContext::finish`].
pub struct CompilationContext<'d> {
    pub graph: TypeGraph,
    pub metadata: MetadataTable,
    pub options: BuildOptions,
    diagnostics: &'d mut Diagnostics,
}

impl<'d> CompilationContext<'d> {
    pub fn new(options: BuildOptions, diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            graph: TypeGraph::new(),
            metadata: MetadataTable::new(),
            options,
            diagnostics,
        }
    }

    /// Report an error at a single node.
    pub fn report_at(&mut self, error: SemanticError, node: NodeRef) {
        self.diagnostics.report_at(error, node.location());
    }

    /// Report an error with explicit highlights.
    pub fn report<I>(&mut self, error: SemanticError, highlights: I)
    where
        I: IntoIterator<Item = Highlight>,
    {
        self.diagnostics.report(error, highlights);
    }

    /// Forward diagnostics collected off to the side.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.diagnostics.push(diagnostic);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Hand the finished graph and metadata to the caller.
    pub fn finish(self) -> (TypeGraph, MetadataTable) {
        (self.graph, self.metadata)
    }
}

/// A diagnostic for `error` highlighting `node`.
pub(crate) fn diagnostic_at(error: SemanticError, node: NodeRef) -> Diagnostic {
    Diagnostic::from_error(error).with_highlight(node.location())
}
