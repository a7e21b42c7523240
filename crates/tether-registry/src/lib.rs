//! Tether Registry crate.
//!
//! Owns the [`TypeGraph`]: the arena of declared types and the
//! [`PackageTree`] that binds their names.

mod package_tree;
mod registry;

pub use package_tree::{PackageData, PackageEdge, PackageTree};
pub use registry::TypeGraph;
