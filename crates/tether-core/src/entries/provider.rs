//! Provider type entry.

use crate::{PackageId, TypeId};

use super::{Implements, Transport, TypeSource};

/// Registry entry for a provider: an implementation of services over a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEntry {
    pub name: String,
    pub package: PackageId,
    pub source: TypeSource,
    /// One clause per `implements` in source order.
    pub implements: Vec<Implements>,
    /// The transport descriptor. `None` only when the declaration omitted it,
    /// which is reported during registration.
    pub transport: Option<Transport>,
}

impl ProviderEntry {
    pub fn new(name: impl Into<String>, package: PackageId, source: TypeSource) -> Self {
        Self {
            name: name.into(),
            package,
            source,
            implements: Vec::new(),
            transport: None,
        }
    }

    /// The validated clause implementing `service`, if any.
    pub fn implementation_of(&self, service: TypeId) -> Option<&Implements> {
        self.implements
            .iter()
            .find(|clause| clause.service_id == Some(service))
    }
}
