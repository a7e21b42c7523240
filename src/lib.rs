//! Tether: semantic analysis for the tether IDL.
//!
//! Hosts hand parsed files to a [`Unit`], build it, and read back the
//! resolved [`TypeGraph`] together with every diagnostic the build produced.
//!
//! ```
//! use tether::{FileBuilder, FileId, Unit};
//!
//! let b = FileBuilder::new(FileId::new(0), "shop/model.tether");
//! let file = b.file(
//!     &["shop"],
//!     vec![],
//!     vec![b.record("Item", vec![b.field("name", b.ident("String"))])],
//! );
//!
//! let mut unit = Unit::new();
//! unit.add_file(file).unwrap();
//! let result = unit.build();
//! assert!(result.is_success());
//! ```

mod unit;

pub use unit::{BuildResult, Unit, UnitError};

pub use tether_ast::{self as ast, File, FileBuilder};
pub use tether_compiler::{BuildOptions, Compiler};
pub use tether_core::{
    Diagnostic, Diagnostics, ErrorKind, FileId, Highlight, Location, MetadataTable, SemanticError,
    Severity, Span, Type, TypeEntry, TypeId, TypeReference,
};
pub use tether_registry::TypeGraph;

/// Everything a host usually needs.
pub mod prelude {
    pub use crate::unit::{BuildResult, Unit, UnitError};
    pub use tether_compiler::BuildOptions;
    pub use tether_core::{Diagnostic, Diagnostics, Severity, Type, TypeEntry};
    pub use tether_registry::TypeGraph;
}
