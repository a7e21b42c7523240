//! Record type entry.

use crate::PackageId;

use super::{Field, TypeSource};

/// Registry entry for a record (a struct-like data type).
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEntry {
    /// Unqualified name.
    pub name: String,
    /// Declaring package.
    pub package: PackageId,
    /// Declaration in source.
    pub source: TypeSource,
    /// Fields in declaration order, unique by name.
    pub fields: Vec<Field>,
}

impl RecordEntry {
    pub fn new(name: impl Into<String>, package: PackageId, source: TypeSource) -> Self {
        Self {
            name: name.into(),
            package,
            source,
            fields: Vec::new(),
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
