//! Enum type entry.

use crate::PackageId;

use super::{EnumValue, TypeSource};

/// Registry entry for an enumeration of named values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumEntry {
    pub name: String,
    pub package: PackageId,
    pub source: TypeSource,
    /// Values in declaration order, unique by name.
    pub values: Vec<EnumValue>,
}

impl EnumEntry {
    pub fn new(name: impl Into<String>, package: PackageId, source: TypeSource) -> Self {
        Self {
            name: name.into(),
            package,
            source,
            values: Vec::new(),
        }
    }

    pub fn has_value(&self, name: &str) -> bool {
        self.values.iter().any(|v| v.name == name)
    }
}
