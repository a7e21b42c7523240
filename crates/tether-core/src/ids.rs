//! Identifier types for files, AST nodes and graph entries.
//!
//! The type graph is an arena: entries refer to each other through the
//! stable handles defined here instead of through references, so a record
//! field can point back at its own record without ownership conflicts.

use std::fmt;

use crate::{Location, Span};

/// Identifies a source file within a build.
///
/// # Example
///
/// ```
/// use tether_core::FileId;
///
/// let file = FileId::new(0);
/// assert_eq!(file.index(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    /// Create a new file ID with the given index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file_{}", self.0)
    }
}

impl From<u32> for FileId {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}

/// Identity of an AST node.
///
/// Node indices are allocated per file, so the pair is unique across a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    /// The file the node was parsed from.
    pub file: FileId,
    /// Index of the node within its file.
    pub index: u32,
}

impl NodeId {
    #[inline]
    pub const fn new(file: FileId, index: u32) -> Self {
        Self { file, index }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.file, self.index)
    }
}

/// A node identity together with its source span.
///
/// This is what the graph keeps for every user declaration so diagnostics
/// can point back at the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    /// The node identity.
    pub id: NodeId,
    /// Where the node appears in its file.
    pub span: Span,
}

impl NodeRef {
    #[inline]
    pub const fn new(id: NodeId, span: Span) -> Self {
        Self { id, span }
    }

    /// Location of the node, for highlights.
    #[inline]
    pub fn location(&self) -> Location {
        Location::new(self.id.file, self.span)
    }
}

/// Handle to a named type entry in the type graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type_{}", self.0)
    }
}

/// Handle to a package node in the package tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(u32);

impl PackageId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "package_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_id_display() {
        assert_eq!(FileId::new(5).to_string(), "file_5");
    }

    #[test]
    fn node_ids_in_different_files_differ() {
        let a = NodeId::new(FileId::new(0), 3);
        let b = NodeId::new(FileId::new(1), 3);
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "file_0#3");
    }

    #[test]
    fn node_ref_location() {
        let node = NodeRef::new(NodeId::new(FileId::new(2), 9), Span::new(4, 1, 6));
        let location = node.location();
        assert_eq!(location.file, FileId::new(2));
        assert_eq!(location.span, Span::new(4, 1, 6));
    }

    #[test]
    fn arena_handles_expose_index() {
        assert_eq!(TypeId::new(4).index(), 4);
        assert_eq!(PackageId::new(1).index(), 1);
    }
}
