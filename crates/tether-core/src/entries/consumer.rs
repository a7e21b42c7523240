//! Consumer type entry.

use crate::{PackageId, TypeId, TypeReference};

use super::{TypeSource, Uses};

/// Registry entry for a consumer: a client of a subset of a provider's operations.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerEntry {
    pub name: String,
    pub package: PackageId,
    pub source: TypeSource,
    /// The consumed provider.
    pub provider: TypeReference,
    /// The validated provider, set during consumer validation.
    pub provider_id: Option<TypeId>,
    /// One clause per `uses` in source order.
    pub uses: Vec<Uses>,
}

impl ConsumerEntry {
    pub fn new(
        name: impl Into<String>,
        package: PackageId,
        source: TypeSource,
        provider: TypeReference,
    ) -> Self {
        Self {
            name: name.into(),
            package,
            source,
            provider,
            provider_id: None,
            uses: Vec::new(),
        }
    }
}
