//! Lexical scope of a source file.
//!
//! A [`FileScope`] maps the names usable in one file to their types. It is
//! filled in precedence order, first insertion wins:
//!
//! 1. Types declared in the file's own package
//! 2. Imports, explicit (`import a.B`, `import a.B as C`) or wildcard (`import a.*`)
//! 3. Top-level packages, by their own name
//! 4. Built-in literal types
//!
//! Import collisions are errors at the import. A declaration or import
//! claiming a built-in name is an error too; the user's binding stays.

use rustc_hash::FxHashMap;
use tether_ast::{File, Import};
use tether_core::{
    Diagnostic, FileId, Highlight, LiteralType, NodeRef, PackageId, SemanticError, Type, TypeId,
};
use tether_registry::TypeGraph;

use crate::context::diagnostic_at;

/// Generic type names, reserved alongside the literal types.
pub const GENERIC_NAMES: [&str; 2] = ["List", "Map"];

fn is_builtin_name(name: &str) -> bool {
    LiteralType::from_name(name).is_some() || GENERIC_NAMES.contains(&name)
}

/// Where a scope binding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOrigin {
    /// Declared in the file's package; the node is the declaration's name.
    Declared(NodeRef),
    /// Brought in by an import.
    Imported(NodeRef),
    /// A top-level package.
    Package,
    /// A built-in type.
    Builtin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeEntry {
    pub ty: Type,
    pub origin: ScopeOrigin,
}

/// Name -> type lookup for one file.
#[derive(Debug)]
pub struct FileScope {
    file: FileId,
    package: PackageId,
    names: FxHashMap<String, ScopeEntry>,
}

impl FileScope {
    pub fn new(file: FileId, package: PackageId) -> Self {
        Self {
            file,
            package,
            names: FxHashMap::default(),
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    /// The package the file declares.
    pub fn package(&self) -> PackageId {
        self.package
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.names.get(name).map(|entry| &entry.ty)
    }

    pub fn entry(&self, name: &str) -> Option<&ScopeEntry> {
        self.names.get(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Insert unless the name is bound; returns the existing binding.
    fn insert(&mut self, name: &str, ty: Type, origin: ScopeOrigin) -> Result<(), ScopeEntry> {
        if let Some(existing) = self.names.get(name) {
            return Err(existing.clone());
        }
        self.names.insert(name.to_string(), ScopeEntry { ty, origin });
        Ok(())
    }
}

/// What an import path names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImportTarget {
    Type(TypeId),
    Package(PackageId),
}

/// Builds the scope of a file against a registered graph.
pub struct ScopeBuilder<'a> {
    graph: &'a TypeGraph,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ScopeBuilder<'a> {
    pub fn new(graph: &'a TypeGraph) -> Self {
        Self {
            graph,
            diagnostics: Vec::new(),
        }
    }

    /// Build the scope of `file`, returning it with any conflicts found.
    pub fn build(mut self, file: &File) -> (FileScope, Vec<Diagnostic>) {
        let names: Vec<&str> = file.package.names().collect();
        let package = self
            .graph
            .packages()
            .get_path(names.as_slice())
            .unwrap_or_else(|| self.graph.root());
        let mut scope = FileScope::new(file.id, package);

        self.add_package_types(&mut scope);
        for import in &file.imports {
            self.add_import(&mut scope, import);
        }
        self.add_top_level_packages(&mut scope);
        self.add_builtins(&mut scope);

        (scope, self.diagnostics)
    }

    // === Same-package types ===

    fn add_package_types(&mut self, scope: &mut FileScope) {
        let graph = self.graph;
        let Some(data) = graph.packages().get(scope.package()) else {
            return;
        };
        for &id in data.types() {
            if let Some(entry) = graph.get(id) {
                // Names are unique per package, so this never collides.
                let _ = scope.insert(
                    entry.name(),
                    Type::Named(id),
                    ScopeOrigin::Declared(entry.source().name),
                );
            }
        }
    }

    // === Imports ===

    fn add_import(&mut self, scope: &mut FileScope, import: &Import) {
        let graph = self.graph;
        let target = match self.resolve_import(import) {
            Ok(target) => target,
            Err(diagnostic) => {
                self.diagnostics.push(diagnostic);
                return;
            }
        };

        match target {
            ImportTarget::Package(package) if import.wildcard => {
                let Some(data) = graph.packages().get(package) else {
                    return;
                };
                for &id in data.types() {
                    if let Some(entry) = graph.get(id) {
                        self.bind_import(scope, entry.name(), Type::Named(id), import.node());
                    }
                }
            }
            ImportTarget::Package(package) => {
                if let Some(name) = import.bound_name() {
                    self.bind_import(scope, &name.name, Type::Package(package), name.node());
                }
            }
            ImportTarget::Type(id) => {
                if let Some(name) = import.bound_name() {
                    self.bind_import(scope, &name.name, Type::Named(id), name.node());
                }
            }
        }
    }

    fn bind_import(&mut self, scope: &mut FileScope, name: &str, ty: Type, node: NodeRef) {
        if let Err(existing) = scope.insert(name, ty, ScopeOrigin::Imported(node)) {
            let mut diagnostic = diagnostic_at(
                SemanticError::ImportConflict {
                    name: name.to_string(),
                },
                node,
            );
            if let ScopeOrigin::Declared(other) | ScopeOrigin::Imported(other) = existing.origin {
                let bound = Highlight::new(other.location()).with_message("already bound here");
                diagnostic = diagnostic.with_highlight(bound);
            }
            self.diagnostics.push(diagnostic);
        }
    }

    /// Walk an absolute import path from the root package.
    fn resolve_import(&self, import: &Import) -> Result<ImportTarget, Diagnostic> {
        let packages = self.graph.packages();
        let unresolved = || {
            diagnostic_at(
                SemanticError::UnresolvedImport {
                    path: import.dotted(),
                },
                import.node(),
            )
        };

        let Some((last, init)) = import.path.split_last() else {
            return Err(unresolved());
        };

        let mut current = packages.root();
        for ident in init {
            current = match packages.find_child(current, &ident.name) {
                Some(child) => child,
                None if self.graph.lookup(current, &ident.name).is_some() => {
                    return Err(not_a_package(&ident.name, ident.node()));
                }
                None => return Err(unresolved()),
            };
        }

        if import.wildcard {
            return match packages.find_child(current, &last.name) {
                Some(package) => Ok(ImportTarget::Package(package)),
                None if self.graph.lookup(current, &last.name).is_some() => {
                    Err(not_a_package(&last.name, last.node()))
                }
                None => Err(unresolved()),
            };
        }

        if let Some(id) = self.graph.lookup(current, &last.name) {
            return Ok(ImportTarget::Type(id));
        }
        packages
            .find_child(current, &last.name)
            .map(ImportTarget::Package)
            .ok_or_else(unresolved)
    }

    // === Top-level packages ===

    fn add_top_level_packages(&mut self, scope: &mut FileScope) {
        let packages = self.graph.packages();
        for (name, package) in packages.children(packages.root()) {
            if is_builtin_name(name) {
                continue;
            }
            // Packages never shadow anything already bound.
            let _ = scope.insert(name, Type::Package(package), ScopeOrigin::Package);
        }
    }

    // === Built-ins ===

    fn add_builtins(&mut self, scope: &mut FileScope) {
        for literal in LiteralType::ALL {
            let name = literal.name();
            let inserted = scope.insert(name, Type::Literal(literal), ScopeOrigin::Builtin);
            if let Err(existing) = inserted {
                self.report_shadow(scope.file(), name, existing.origin);
            }
        }
        for name in GENERIC_NAMES {
            if let Some(existing) = scope.entry(name) {
                let origin = existing.origin;
                self.report_shadow(scope.file(), name, origin);
            }
        }
    }

    /// Declarations are reported by their own file only, imports where they
    /// are written.
    fn report_shadow(&mut self, file: FileId, name: &str, origin: ScopeOrigin) {
        let node = match origin {
            ScopeOrigin::Declared(node) if node.id.file == file => node,
            ScopeOrigin::Imported(node) => node,
            _ => return,
        };
        self.diagnostics.push(diagnostic_at(
            SemanticError::ShadowsBuiltin {
                name: name.to_string(),
            },
            node,
        ));
    }
}

fn not_a_package(name: &str, node: NodeRef) -> Diagnostic {
    diagnostic_at(
        SemanticError::NotAPackage {
            name: name.to_string(),
        },
        node,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::register;
    use tether_ast::FileBuilder;

    fn errors(diagnostics: &[Diagnostic]) -> Vec<SemanticError> {
        diagnostics.iter().filter_map(|d| d.error.clone()).collect()
    }

    #[test]
    fn same_package_types_and_builtins() {
        let b = FileBuilder::new(FileId::new(0), "shop.tether");
        let file = b.file(&["shop"], vec![], vec![b.record("Item", vec![])]);
        let graph = register(&[file.clone()]);

        let (scope, diagnostics) = ScopeBuilder::new(&graph).build(&file);
        assert!(diagnostics.is_empty());
        assert!(matches!(scope.get("Item"), Some(Type::Named(_))));
        assert_eq!(scope.get("Int"), Some(&Type::Literal(LiteralType::Int)));
        assert!(matches!(scope.get("shop"), Some(Type::Package(_))));
    }

    #[test]
    fn explicit_and_aliased_imports() {
        let a = FileBuilder::new(FileId::new(0), "a.tether");
        let lib = a.file(&["lib"], vec![], vec![a.record("Thing", vec![])]);
        let b = FileBuilder::new(FileId::new(1), "b.tether");
        let app = b.file(
            &["app"],
            vec![b.import(&["lib", "Thing"]), b.import_as(&["lib", "Thing"], "Other")],
            vec![],
        );
        let graph = register(&[lib, app.clone()]);

        let (scope, diagnostics) = ScopeBuilder::new(&graph).build(&app);
        assert!(diagnostics.is_empty());
        assert_eq!(scope.get("Thing"), scope.get("Other"));
    }

    #[test]
    fn duplicate_import_conflicts() {
        let a = FileBuilder::new(FileId::new(0), "a.tether");
        let foo = a.file(&["foo"], vec![], vec![a.record("A", vec![])]);
        let b = FileBuilder::new(FileId::new(1), "b.tether");
        let second = b.import(&["foo", "A"]);
        let second_node = second.path[1].node();
        let app = b.file(&["app"], vec![b.import(&["foo", "A"]), second], vec![]);
        let graph = register(&[foo, app.clone()]);

        let (_, diagnostics) = ScopeBuilder::new(&graph).build(&app);
        assert_eq!(
            errors(&diagnostics),
            vec![SemanticError::ImportConflict { name: "A".into() }]
        );
        assert_eq!(diagnostics[0].highlights[0].location, second_node.location());
    }

    #[test]
    fn import_conflicting_with_local_declaration() {
        let a = FileBuilder::new(FileId::new(0), "a.tether");
        let foo = a.file(&["foo"], vec![], vec![a.record("A", vec![])]);
        let b = FileBuilder::new(FileId::new(1), "b.tether");
        let app = b.file(&["app"], vec![b.import(&["foo", "A"])], vec![b.record("A", vec![])]);
        let graph = register(&[foo, app.clone()]);

        let (scope, diagnostics) = ScopeBuilder::new(&graph).build(&app);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].highlights.len(), 2);
        // The local declaration keeps the name.
        let local = graph.packages().get_path(&["app"]).and_then(|p| graph.lookup(p, "A"));
        assert_eq!(scope.get("A"), local.map(Type::Named).as_ref());
    }

    #[test]
    fn wildcard_import() {
        let a = FileBuilder::new(FileId::new(0), "a.tether");
        let lib = a.file(
            &["lib"],
            vec![],
            vec![a.record("One", vec![]), a.enumeration("Two", &["X"])],
        );
        let b = FileBuilder::new(FileId::new(1), "b.tether");
        let app = b.file(&["app"], vec![b.import_all(&["lib"])], vec![]);
        let graph = register(&[lib, app.clone()]);

        let (scope, diagnostics) = ScopeBuilder::new(&graph).build(&app);
        assert!(diagnostics.is_empty());
        assert!(scope.get("One").is_some());
        assert!(scope.get("Two").is_some());
    }

    #[test]
    fn wildcard_of_type_is_not_a_package() {
        let a = FileBuilder::new(FileId::new(0), "a.tether");
        let lib = a.file(&["lib"], vec![], vec![a.record("One", vec![])]);
        let b = FileBuilder::new(FileId::new(1), "b.tether");
        let app = b.file(&["app"], vec![b.import_all(&["lib", "One"])], vec![]);
        let graph = register(&[lib, app.clone()]);

        let (_, diagnostics) = ScopeBuilder::new(&graph).build(&app);
        assert_eq!(
            errors(&diagnostics),
            vec![SemanticError::NotAPackage { name: "One".into() }]
        );
    }

    #[test]
    fn missing_import() {
        let b = FileBuilder::new(FileId::new(0), "b.tether");
        let app = b.file(&["app"], vec![b.import(&["nowhere", "Thing"])], vec![]);
        let graph = register(&[app.clone()]);

        let (_, diagnostics) = ScopeBuilder::new(&graph).build(&app);
        assert_eq!(
            errors(&diagnostics),
            vec![SemanticError::UnresolvedImport {
                path: "nowhere.Thing".into()
            }]
        );
    }

    #[test]
    fn shadowing_builtin_reported_in_declaring_file_only() {
        let a = FileBuilder::new(FileId::new(0), "a.tether");
        let first = a.file(&["shop"], vec![], vec![a.record("String", vec![])]);
        let b = FileBuilder::new(FileId::new(1), "b.tether");
        let second = b.file(&["shop"], vec![], vec![b.record("Other", vec![])]);
        let graph = register(&[first.clone(), second.clone()]);

        let (scope, in_first) = ScopeBuilder::new(&graph).build(&first);
        let (_, in_second) = ScopeBuilder::new(&graph).build(&second);
        assert_eq!(
            errors(&in_first),
            vec![SemanticError::ShadowsBuiltin {
                name: "String".into()
            }]
        );
        assert!(in_second.is_empty());
        assert!(matches!(scope.get("String"), Some(Type::Named(_))));
    }

    #[test]
    fn packages_do_not_shadow_types() {
        let a = FileBuilder::new(FileId::new(0), "a.tether");
        let pkg = a.file(&["Item"], vec![], vec![]);
        let b = FileBuilder::new(FileId::new(1), "b.tether");
        let app = b.file(&[], vec![], vec![b.record("Item", vec![])]);
        let graph = register(&[pkg, app.clone()]);

        let (scope, diagnostics) = ScopeBuilder::new(&graph).build(&app);
        assert!(diagnostics.is_empty());
        assert!(matches!(scope.get("Item"), Some(Type::Named(_))));
    }
}
