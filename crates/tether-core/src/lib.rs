//! Core types for the tether IDL semantic model.
//!
//! This crate holds everything the analysis passes and downstream consumers
//! share:
//!
//! - [`span`]/[`ids`]: source locations and arena handles
//! - [`types`]: [`Type`], [`TypeReference`] and [`Constraint`]
//! - [`entries`]: declared types stored in the graph arena
//! - [`diagnostics`]/[`error`]: the diagnostic sink and error taxonomy
//! - [`metadata`]: description/deprecation side-table

pub mod diagnostics;
pub mod entries;
pub mod error;
pub mod ids;
pub mod literal;
pub mod metadata;
pub mod span;
pub mod types;

pub use diagnostics::{Diagnostic, Diagnostics, Highlight, Severity};
pub use entries::{
    AliasEntry, ConfigValue, ConsumerEntry, EnumEntry, EnumValue, Field, Implements, Operation,
    OperationKind, Parameter, ProviderEntry, RecordEntry, RequestedOperation, ServiceEntry,
    Transport, TypeEntry, TypeSource, Uses,
};
pub use error::{ErrorKind, RegistrationError, SemanticError};
pub use ids::{FileId, NodeId, NodeRef, PackageId, TypeId};
pub use literal::{Literal, Number};
pub use metadata::{Metadata, MetadataTable, UserDeclared};
pub use span::{Location, Span};
pub use types::{
    Constraint, ConstraintKind, ConstraintSet, ConstraintType, LiteralType, ResolvedTypeReference,
    Type, TypeFamily, TypeReference, UnresolvedType,
};
