//! User-provided descriptions and deprecation notes.
//!
//! Metadata lives in a side-table keyed by declaration node instead of on
//! the entries themselves, so code generators and editor tooling can look
//! it up for anything that implements [`UserDeclared`].

use rustc_hash::FxHashMap;

use crate::entries::{
    AliasEntry, ConsumerEntry, EnumEntry, EnumValue, Field, Implements, Operation, Parameter,
    ProviderEntry, RecordEntry, ServiceEntry, TypeEntry, Uses,
};
use crate::{NodeId, NodeRef};

/// Description and deprecation text attached to a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub description: Option<String>,
    /// Deprecation note; present when the declaration is deprecated.
    pub deprecation: Option<String>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.deprecation.is_none()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation.is_some()
    }
}

/// Anything in the graph that originates from a source declaration.
pub trait UserDeclared {
    /// The declaring node.
    fn declaration(&self) -> NodeRef;
}

macro_rules! user_declared_by_source {
    ($($entry:ty),* $(,)?) => {
        $(
            impl UserDeclared for $entry {
                fn declaration(&self) -> NodeRef {
                    self.source.declaration
                }
            }
        )*
    };
}

macro_rules! user_declared_by_node {
    ($($member:ty),* $(,)?) => {
        $(
            impl UserDeclared for $member {
                fn declaration(&self) -> NodeRef {
                    self.node
                }
            }
        )*
    };
}

user_declared_by_source!(
    RecordEntry,
    EnumEntry,
    ServiceEntry,
    ProviderEntry,
    ConsumerEntry,
    AliasEntry,
);

user_declared_by_node!(Field, EnumValue, Operation, Parameter, Implements, Uses);

impl UserDeclared for TypeEntry {
    fn declaration(&self) -> NodeRef {
        self.source().declaration
    }
}

/// Side-table mapping declaration nodes to their metadata.
#[derive(Debug, Default)]
pub struct MetadataTable {
    entries: FxHashMap<NodeId, Metadata>,
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record metadata for a declaration. Empty metadata is not stored.
    pub fn insert(&mut self, node: NodeId, metadata: Metadata) {
        if !metadata.is_empty() {
            self.entries.insert(node, metadata);
        }
    }

    pub fn get(&self, node: NodeId) -> Option<&Metadata> {
        self.entries.get(&node)
    }

    /// Metadata of a graph entity, looked up through its declaration.
    pub fn for_entity<T: UserDeclared + ?Sized>(&self, entity: &T) -> Option<&Metadata> {
        self.get(entity.declaration().id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::TypeSource;
    use crate::{FileId, PackageId, Span};

    fn node(index: u32) -> NodeRef {
        NodeRef::new(NodeId::new(FileId::new(0), index), Span::new(index, 1, 1))
    }

    #[test]
    fn empty_metadata_is_skipped() {
        let mut table = MetadataTable::new();
        table.insert(node(1).id, Metadata::default());
        assert!(table.is_empty());
    }

    #[test]
    fn lookup_through_entity() {
        let mut table = MetadataTable::new();
        let record = RecordEntry::new("User", PackageId::new(0), TypeSource::new(node(1), node(2)));
        table.insert(
            node(1).id,
            Metadata {
                description: Some("A user".into()),
                deprecation: None,
            },
        );

        let metadata = table.for_entity(&record).map(|m| m.description.clone());
        assert_eq!(metadata, Some(Some("A user".into())));
        assert!(!table.for_entity(&record).is_some_and(Metadata::is_deprecated));
    }
}
