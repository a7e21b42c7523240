//! Tether Compiler
//!
//! Semantic analysis for the tether IDL: turns parsed files into a resolved,
//! validated [`TypeGraph`] plus diagnostics.
//!
//! ## Architecture
//!
//! - **Registration**: register every declaration as a stub with unresolved references
//! - **Resolution**: build per-file scopes and resolve every type expression
//! - **Alias fixpoint**: collapse alias chains into their underlying types
//! - **Validation**: data-position usage, record cycles, provider/consumer consistency
//!
//! Every pass keeps going after an error, substituting `Unknown` where a type
//! could not be determined, so one build reports as much as possible.
//!
//! ## Modules
//!
//! - [`context`]: state shared by the passes
//! - [`scope`]: per-file name lookup
//! - [`type_resolver`]: type expressions to resolved references
//! - [`constraints`]: constraint construction and applicability
//! - [`passes`]: the passes themselves

pub mod constraints;
pub mod context;
mod options;
pub mod passes;
pub mod scope;
pub mod type_resolver;

pub use constraints::ConstraintBuilder;
pub use context::CompilationContext;
pub use options::BuildOptions;
pub use scope::{FileScope, ScopeBuilder};
pub use type_resolver::TypeResolver;

use tether_ast::File;
use tether_core::{Diagnostics, MetadataTable};
use tether_registry::TypeGraph;
use tracing::{debug, instrument};

use passes::{AliasPass, RegistrationPass, ResolutionPass, ValidationPass};

/// The resolved model of a build.
#[derive(Debug)]
pub struct BuildOutput {
    pub graph: TypeGraph,
    pub metadata: MetadataTable,
}

/// Runs the passes in order over a complete set of files.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: BuildOptions,
}

impl Compiler {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Analyse `files` in the order given.
    ///
    /// Diagnostics go to `diagnostics`; the graph is returned even when
    /// there are errors, with `Unknown` wherever a type could not be
    /// determined.
    #[instrument(skip_all, fields(files = files.len()))]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(&self, files: &[File], diagnostics: &mut Diagnostics) -> BuildOutput {
        let mut ctx = CompilationContext::new(self.options.clone(), diagnostics);

        let registration = {
            #[cfg(feature = "profiling")]
            profiling::scope!("registration");
            RegistrationPass::new(&mut ctx).run(files)
        };
        let resolution = {
            #[cfg(feature = "profiling")]
            profiling::scope!("resolution");
            ResolutionPass::new(&mut ctx).run(files)
        };
        let alias = {
            #[cfg(feature = "profiling")]
            profiling::scope!("alias");
            AliasPass::new(&mut ctx).run()
        };
        let validation = {
            #[cfg(feature = "profiling")]
            profiling::scope!("validation");
            ValidationPass::new(&mut ctx).run()
        };

        debug!(
            types = registration.types_registered,
            references = resolution.references_resolved,
            alias_rounds = alias.rounds,
            cycles = validation.cycles,
            "build finished"
        );

        let (graph, metadata) = ctx.finish();
        BuildOutput { graph, metadata }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A graph with every declaration registered and nothing resolved.
    pub fn register(files: &[File]) -> TypeGraph {
        let mut diagnostics = Diagnostics::new();
        let mut ctx = CompilationContext::new(BuildOptions::default(), &mut diagnostics);
        RegistrationPass::new(&mut ctx).run(files);
        ctx.finish().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_ast::FileBuilder;
    use tether_core::{FileId, LiteralType, Type, TypeEntry};

    #[test]
    fn build_runs_every_pass() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &["shop"],
            vec![],
            vec![
                b.alias("Id", b.ident("String")),
                b.record("Order", vec![b.field("id", b.ident("Id"))]),
            ],
        );
        let mut diagnostics = Diagnostics::new();
        let output = Compiler::default().build(&[file], &mut diagnostics);

        assert!(diagnostics.is_empty());
        let shop = output.graph.packages().get_path(&["shop"]).unwrap();
        let id = output.graph.lookup(shop, "Id").unwrap();
        let alias = output.graph.get(id).and_then(TypeEntry::as_alias).unwrap();
        assert_eq!(
            alias.fully_resolved.as_ref().map(|r| &r.ty),
            Some(&Type::Literal(LiteralType::String))
        );
    }

    #[test]
    fn errors_do_not_stop_the_build() {
        let b = FileBuilder::new(FileId::new(0), "a.tether");
        let file = b.file(
            &[],
            vec![],
            vec![
                b.record("R", vec![b.field("a", b.ident("Missing")), b.field("b", b.ident("S"))]),
                b.service("S", vec![]),
            ],
        );
        let mut diagnostics = Diagnostics::new();
        Compiler::default().build(&[file], &mut diagnostics);

        assert_eq!(diagnostics.error_count(), 2);
    }
}
