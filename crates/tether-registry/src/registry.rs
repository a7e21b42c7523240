//! TypeGraph - the resolved model of a build.
//!
//! This module provides [`TypeGraph`], the single owning store for every
//! package and declared type. Passes hold [`TypeId`]/[`PackageId`] handles
//! and mutate entries in place through them, which lets a record field
//! refer back to its own record without any ownership cycle.
//!
//! # Storage Model
//!
//! - **Types**: every declared entry lives in one arena indexed by `TypeId`.
//!   Entries whose name was already taken in their package are still stored
//!   (their members get resolved and checked) but are not bound by name.
//! - **Packages**: a [`PackageTree`] binds names to `TypeId`s per package
//!   and carries the per-package resolved-node table.
//! - **Declarations**: statement node -> `TypeId`, for editor tooling.
//!
//! # Lifecycle
//!
//! The graph is mutated by the compiler passes in sequence and is
//! read-only once the build returns.
//!
//! # Example
//!
//! ```
//! use tether_core::{NodeId, NodeRef, FileId, RecordEntry, Span, TypeSource};
//! use tether_registry::TypeGraph;
//!
//! let mut graph = TypeGraph::new();
//! let shop = graph.packages_mut().get_or_create_path(&["shop"]);
//!
//! let node = NodeRef::new(NodeId::new(FileId::new(0), 0), Span::new(1, 1, 4));
//! let id = graph.add_type(RecordEntry::new("Item", shop, TypeSource::new(node, node)).into());
//! graph.register_type(id).unwrap();
//!
//! assert_eq!(graph.lookup(shop, "Item"), Some(id));
//! assert_eq!(graph.qualified_name(id), "shop.Item");
//! ```

use rustc_hash::FxHashMap;

use tether_core::{
    AliasEntry, ConsumerEntry, NodeId, PackageId, ProviderEntry, RecordEntry,
    RegistrationError, ResolvedTypeReference, ServiceEntry, Type, TypeEntry, TypeId,
};

use crate::PackageTree;

static UNKNOWN: Type = Type::Unknown;

/// The type graph: package tree plus type arena.
#[derive(Debug, Default)]
pub struct TypeGraph {
    /// Package hierarchy and name bindings.
    packages: PackageTree,

    /// Arena of declared types, indexed by `TypeId`.
    types: Vec<TypeEntry>,

    /// Statement node -> declared entry.
    declarations: FxHashMap<NodeId, TypeId>,
}

impl TypeGraph {
    /// Create an empty graph with just the root package.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packages(&self) -> &PackageTree {
        &self.packages
    }

    pub fn packages_mut(&mut self) -> &mut PackageTree {
        &mut self.packages
    }

    pub fn root(&self) -> PackageId {
        self.packages.root()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Store an entry in the arena without binding its name.
    pub fn add_type(&mut self, entry: TypeEntry) -> TypeId {
        // The arena never approaches u32::MAX entries for a single build.
        let id = TypeId::new(self.types.len() as u32);
        self.declarations.insert(entry.source().declaration.id, id);
        self.types.push(entry);
        id
    }

    /// Bind an arena entry's name in its package.
    ///
    /// Fails with [`RegistrationError::DuplicateType`] if the package already
    /// binds the name; later lookups keep seeing the first registration.
    pub fn register_type(&mut self, id: TypeId) -> Result<(), RegistrationError> {
        let entry = self.types.get(id.index()).ok_or(RegistrationError::InvalidPackage)?;
        let package = entry.package();
        let name = entry.name().to_string();

        match self.packages.bind_type(package, &name, id) {
            Ok(()) => Ok(()),
            Err(Some(existing)) => Err(RegistrationError::DuplicateType {
                name: self.packages.qualified_name(package, &name),
                existing,
            }),
            Err(None) => Err(RegistrationError::InvalidPackage),
        }
    }

    // ==========================================================================
    // Type Lookup
    // ==========================================================================

    pub fn get(&self, id: TypeId) -> Option<&TypeEntry> {
        self.types.get(id.index())
    }

    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut TypeEntry> {
        self.types.get_mut(id.index())
    }

    /// Look up a type bound by name in a package.
    pub fn lookup(&self, package: PackageId, name: &str) -> Option<TypeId> {
        self.packages.lookup_type(package, name)
    }

    /// The entry declared by a statement node.
    pub fn declaration(&self, node: NodeId) -> Option<TypeId> {
        self.declarations.get(&node).copied()
    }

    /// Every arena entry, duplicates included, in registration order.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &TypeEntry)> {
        self.types
            .iter()
            .enumerate()
            .map(|(index, entry)| (TypeId::new(index as u32), entry))
    }

    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + use<> {
        (0..self.types.len() as u32).map(TypeId::new)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn records(&self) -> impl Iterator<Item = &RecordEntry> {
        self.types.iter().filter_map(TypeEntry::as_record)
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceEntry> {
        self.types.iter().filter_map(TypeEntry::as_service)
    }

    pub fn providers(&self) -> impl Iterator<Item = &ProviderEntry> {
        self.types.iter().filter_map(TypeEntry::as_provider)
    }

    pub fn consumers(&self) -> impl Iterator<Item = &ConsumerEntry> {
        self.types.iter().filter_map(TypeEntry::as_consumer)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &AliasEntry> {
        self.types.iter().filter_map(TypeEntry::as_alias)
    }

    // ==========================================================================
    // Alias Indirection
    // ==========================================================================

    /// The fully resolved reference behind an alias type, if `ty` is one and
    /// the alias fixpoint has resolved it.
    pub fn alias_target(&self, ty: &Type) -> Option<&ResolvedTypeReference> {
        self.get(ty.as_named()?)?.as_alias()?.fully_resolved.as_ref()
    }

    /// `ty` with any alias replaced by its fully resolved type.
    ///
    /// An alias that never resolved reads as `Unknown`.
    pub fn underlying<'a>(&'a self, ty: &'a Type) -> &'a Type {
        match ty.as_named().and_then(|id| self.get(id)) {
            Some(TypeEntry::Alias(alias)) => match &alias.fully_resolved {
                Some(resolved) => &resolved.ty,
                None => &UNKNOWN,
            },
            _ => ty,
        }
    }

    // ==========================================================================
    // Tooling Tables
    // ==========================================================================

    /// Record the resolved type of a node in a package's tooling table.
    pub fn set_resolved_node(&mut self, package: PackageId, node: NodeId, ty: Type) {
        if let Some(data) = self.packages.get_mut(package) {
            data.resolved_nodes.insert(node, ty);
        }
    }

    /// Resolved type of a node, searching every package.
    pub fn resolved_node(&self, node: NodeId) -> Option<&Type> {
        self.packages
            .all()
            .into_iter()
            .filter_map(|package| self.packages.get(package))
            .find_map(|data| data.resolved_nodes.get(&node))
    }

    // ==========================================================================
    // Naming
    // ==========================================================================

    /// Canonical dotted name of a declared type (`shop.orders.Order`).
    pub fn qualified_name(&self, id: TypeId) -> String {
        match self.get(id) {
            Some(entry) => self.packages.qualified_name(entry.package(), entry.name()),
            None => "<invalid>".to_string(),
        }
    }

    /// Simple name of a type as users write it, for messages.
    pub fn type_name(&self, ty: &Type) -> String {
        match ty {
            Type::Named(id) => self
                .get(*id)
                .map_or_else(|| "<invalid>".to_string(), |entry| entry.name().to_string()),
            Type::Package(package) => self.packages.dotted_name(*package),
            _ => self.display(ty),
        }
    }

    /// Render a type with qualified names (`List<shop.Item>`, `Map<String, Int>`).
    pub fn display(&self, ty: &Type) -> String {
        match ty {
            Type::Package(package) => self.packages.dotted_name(*package),
            Type::Unknown => "Unknown".to_string(),
            Type::Literal(literal) => literal.name().to_string(),
            Type::List { element } => format!("List<{}>", self.display_reference(element)),
            Type::Map { key, value } => format!(
                "Map<{}, {}>",
                self.display_reference(key),
                self.display_reference(value)
            ),
            Type::Named(id) => self.qualified_name(*id),
        }
    }

    fn display_reference(&self, reference: &ResolvedTypeReference) -> String {
        let mut out = self.display(&reference.ty);
        if reference.is_optional {
            out.push('?');
        }
        out
    }
}
