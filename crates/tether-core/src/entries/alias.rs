//! Type alias entry.

use crate::{PackageId, ResolvedTypeReference, TypeReference};

use super::TypeSource;

/// Registry entry for `typealias Name = <type>`.
///
/// `aliased` is resolved by the reference resolver; `fully_resolved` is set
/// once by the alias fixpoint and holds the chain collapsed to a non-alias
/// type with merged constraints and optional flag.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasEntry {
    pub name: String,
    pub package: PackageId,
    pub source: TypeSource,
    pub aliased: TypeReference,
    pub fully_resolved: Option<ResolvedTypeReference>,
}

impl AliasEntry {
    pub fn new(
        name: impl Into<String>,
        package: PackageId,
        source: TypeSource,
        aliased: TypeReference,
    ) -> Self {
        Self {
            name: name.into(),
            package,
            source,
            aliased,
            fully_resolved: None,
        }
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.fully_resolved.is_some()
    }
}
