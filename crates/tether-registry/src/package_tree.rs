//! Package Tree - hierarchical storage for declared types.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: `PackageData` (types registered at that level, resolved nodes)
//! - Edges: `Contains(name)` from parent to child package
//!
//! Node indices are never removed, so a [`PackageId`] is a stable handle
//! onto a node for the lifetime of the tree.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use tether_core::{NodeId, PackageId, Type, TypeId};

/// Edge types in the package graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageEdge {
    /// Parent package contains child package.
    /// The String is the child's simple name.
    Contains(String),
}

/// Data stored in each package node.
#[derive(Debug, Default)]
pub struct PackageData {
    /// Types in this package by simple name. The first registration wins.
    types: FxHashMap<String, TypeId>,

    /// Registered types in declaration order.
    order: Vec<TypeId>,

    /// Resolved type of every type-expression and declaration-name node
    /// in files of this package, for editor tooling.
    pub resolved_nodes: FxHashMap<NodeId, Type>,
}

impl PackageData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a type by simple name.
    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.types.get(name).copied()
    }

    /// Registered types, in declaration order.
    pub fn types(&self) -> &[TypeId] {
        &self.order
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }
}

/// The package graph.
///
/// The root package has no name and is never addressable from a reference;
/// its children are the top-level packages.
#[derive(Debug)]
pub struct PackageTree {
    /// The directed graph storing all packages.
    graph: DiGraph<PackageData, PackageEdge>,

    /// The root package node.
    root: NodeIndex,
}

impl Default for PackageTree {
    fn default() -> Self {
        Self::new()
    }
}

fn node(package: PackageId) -> NodeIndex {
    NodeIndex::new(package.index())
}

fn package(node: NodeIndex) -> PackageId {
    // DiGraph uses u32 indices, so this never truncates.
    PackageId::new(node.index() as u32)
}

impl PackageTree {
    /// Create a new package tree with an empty root.
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(PackageData::new());
        Self { graph, root }
    }

    /// Get the root package.
    pub fn root(&self) -> PackageId {
        package(self.root)
    }

    pub fn is_root(&self, id: PackageId) -> bool {
        node(id) == self.root
    }

    /// Number of packages, including the root.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Get a package's data.
    pub fn get(&self, id: PackageId) -> Option<&PackageData> {
        self.graph.node_weight(node(id))
    }

    /// Get a mutable reference to a package's data.
    pub fn get_mut(&mut self, id: PackageId) -> Option<&mut PackageData> {
        self.graph.node_weight_mut(node(id))
    }

    /// Find a child package by name (case-sensitive).
    pub fn find_child(&self, parent: PackageId, name: &str) -> Option<PackageId> {
        self.graph.edges(node(parent)).find_map(|edge| match edge.weight() {
            PackageEdge::Contains(child) if child == name => Some(package(edge.target())),
            _ => None,
        })
    }

    /// Get or create a child package.
    pub fn get_or_create_child(&mut self, parent: PackageId, name: &str) -> PackageId {
        if let Some(child) = self.find_child(parent, name) {
            return child;
        }

        let child = self.graph.add_node(PackageData::new());
        self.graph
            .add_edge(node(parent), child, PackageEdge::Contains(name.to_string()));
        package(child)
    }

    /// Get or create a package path from root.
    pub fn get_or_create_path<S: AsRef<str>>(&mut self, path: &[S]) -> PackageId {
        let mut current = self.root();
        for segment in path {
            current = self.get_or_create_child(current, segment.as_ref());
        }
        current
    }

    /// Get an existing package by path, or None if it doesn't exist.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<PackageId> {
        let mut current = self.root();
        for segment in path {
            current = self.find_child(current, segment.as_ref())?;
        }
        Some(current)
    }

    /// Find the parent package of a node.
    pub fn find_parent(&self, id: PackageId) -> Option<PackageId> {
        self.graph
            .edges_directed(node(id), Direction::Incoming)
            .next()
            .map(|edge| package(edge.source()))
    }

    /// Get the simple name of a package. The root has none.
    pub fn name(&self, id: PackageId) -> Option<&str> {
        let PackageEdge::Contains(name) = self
            .graph
            .edges_directed(node(id), Direction::Incoming)
            .next()?
            .weight();
        Some(name.as_str())
    }

    /// Get the full package path for a node.
    pub fn path(&self, id: PackageId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = id;

        while !self.is_root(current) {
            if let Some(name) = self.name(current) {
                path.push(name);
            }
            match self.find_parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }

        path.reverse();
        path
    }

    /// Dotted name of a package; `(root)` for the root package.
    pub fn dotted_name(&self, id: PackageId) -> String {
        if self.is_root(id) {
            return "(root)".to_string();
        }
        self.path(id).join(".")
    }

    /// Get the qualified name string for a symbol in a package.
    pub fn qualified_name(&self, id: PackageId, simple_name: &str) -> String {
        let path = self.path(id);
        if path.is_empty() {
            simple_name.to_string()
        } else {
            format!("{}.{}", path.join("."), simple_name)
        }
    }

    /// Child packages sorted by name.
    pub fn children(&self, parent: PackageId) -> Vec<(&str, PackageId)> {
        let mut children: Vec<_> = self
            .graph
            .edges(node(parent))
            .map(|edge| {
                let PackageEdge::Contains(name) = edge.weight();
                (name.as_str(), package(edge.target()))
            })
            .collect();
        children.sort_by(|a, b| a.0.cmp(b.0));
        children
    }

    /// Every package in depth-first order, root first, children by name.
    pub fn all(&self) -> Vec<PackageId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = vec![self.root()];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).into_iter().rev().map(|(_, id)| id));
        }
        out
    }

    // ========================================================================
    // Type Binding
    // ========================================================================

    /// Bind a type name in a package.
    ///
    /// Returns the already bound type if the name is taken; the package is
    /// left unchanged in that case.
    pub fn bind_type(
        &mut self,
        id: PackageId,
        name: &str,
        ty: TypeId,
    ) -> Result<(), Option<TypeId>> {
        let data = self.get_mut(id).ok_or(None)?;
        if let Some(existing) = data.get(name) {
            return Err(Some(existing));
        }
        data.types.insert(name.to_string(), ty);
        data.order.push(ty);
        Ok(())
    }

    /// Look up a type by simple name in a package.
    pub fn lookup_type(&self, id: PackageId, name: &str) -> Option<TypeId> {
        self.get(id)?.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Package Tree Tests
    // ========================================================================

    #[test]
    fn create_package_path() {
        let mut tree = PackageTree::new();
        let orders = tree.get_or_create_path(&["shop", "orders"]);

        assert_eq!(tree.path(orders), vec!["shop", "orders"]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn find_existing_path() {
        let mut tree = PackageTree::new();
        let created = tree.get_or_create_path(&["a", "b"]);

        assert_eq!(tree.get_path(&["a", "b"]), Some(created));
        assert_eq!(tree.get_path(&["a", "c"]), None);
    }

    #[test]
    fn empty_path_returns_root() {
        let mut tree = PackageTree::new();
        assert_eq!(tree.get_or_create_path::<&str>(&[]), tree.root());
        assert_eq!(tree.get_path::<&str>(&[]), Some(tree.root()));
    }

    #[test]
    fn get_or_create_child_returns_same_node_if_exists() {
        let mut tree = PackageTree::new();
        let root = tree.root();
        let first = tree.get_or_create_child(root, "shop");
        let second = tree.get_or_create_child(root, "shop");
        assert_eq!(first, second);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let mut tree = PackageTree::new();
        let root = tree.root();
        tree.get_or_create_child(root, "shop");
        assert!(tree.find_child(root, "Shop").is_none());
    }

    #[test]
    fn root_has_no_name_or_parent() {
        let tree = PackageTree::new();
        assert_eq!(tree.name(tree.root()), None);
        assert_eq!(tree.find_parent(tree.root()), None);
        assert_eq!(tree.dotted_name(tree.root()), "(root)");
    }

    #[test]
    fn qualified_name() {
        let mut tree = PackageTree::new();
        let pkg = tree.get_or_create_path(&["shop", "orders"]);
        assert_eq!(tree.qualified_name(pkg, "Order"), "shop.orders.Order");
        assert_eq!(tree.qualified_name(tree.root(), "Order"), "Order");
    }

    #[test]
    fn children_are_sorted_by_name() {
        let mut tree = PackageTree::new();
        tree.get_or_create_path(&["zeta"]);
        tree.get_or_create_path(&["alpha"]);
        tree.get_or_create_path(&["mid", "inner"]);

        let names: Vec<&str> = tree.children(tree.root()).iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);

        let all: Vec<String> = tree.all().into_iter().map(|p| tree.dotted_name(p)).collect();
        assert_eq!(all, vec!["(root)", "alpha", "mid", "mid.inner", "zeta"]);
    }

    #[test]
    fn bind_type_first_wins() {
        let mut tree = PackageTree::new();
        let pkg = tree.get_or_create_path(&["shop"]);

        assert!(tree.bind_type(pkg, "Item", TypeId::new(0)).is_ok());
        assert_eq!(
            tree.bind_type(pkg, "Item", TypeId::new(1)),
            Err(Some(TypeId::new(0)))
        );
        assert_eq!(tree.lookup_type(pkg, "Item"), Some(TypeId::new(0)));
        assert_eq!(tree.get(pkg).map(|p| p.types().len()), Some(1));
    }
}
