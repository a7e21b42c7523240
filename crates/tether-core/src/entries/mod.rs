//! Registry entries for declared types.
//!
//! Each declaration kind has its own entry struct; [`TypeEntry`] wraps them
//! for storage in the graph arena.

mod alias;
mod common;
mod consumer;
mod enum_entry;
mod provider;
mod record;
mod service;
mod type_entry;

pub use alias::AliasEntry;
pub use common::{
    ConfigValue, EnumValue, Field, Implements, Operation, OperationKind, Parameter,
    RequestedOperation, Transport, TypeSource, Uses,
};
pub use consumer::ConsumerEntry;
pub use enum_entry::EnumEntry;
pub use provider::ProviderEntry;
pub use record::RecordEntry;
pub use service::ServiceEntry;
pub use type_entry::TypeEntry;
