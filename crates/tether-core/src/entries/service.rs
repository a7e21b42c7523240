//! Service type entry.

use crate::PackageId;

use super::{Operation, TypeSource};

/// Registry entry for a service, a named set of operations.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEntry {
    pub name: String,
    pub package: PackageId,
    pub source: TypeSource,
    /// Operations in declaration order, unique by name.
    pub operations: Vec<Operation>,
}

impl ServiceEntry {
    pub fn new(name: impl Into<String>, package: PackageId, source: TypeSource) -> Self {
        Self {
            name: name.into(),
            package,
            source,
            operations: Vec::new(),
        }
    }

    /// Look up an operation by name.
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.name == name)
    }

    /// Names of all operations, in declaration order.
    pub fn operation_names(&self) -> Vec<String> {
        self.operations.iter().map(|op| op.name.clone()).collect()
    }
}
