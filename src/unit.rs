//! Compilation unit API.
//!
//! A [`Unit`] collects the parsed files of one model and builds them in a
//! single batch. Files are kept sorted by path so diagnostics come out in
//! the same order no matter how the host discovered the files.

use rustc_hash::FxHashMap;
use tether_ast::File;
use tether_compiler::{BuildOptions, Compiler};
use tether_core::{Diagnostics, FileId, MetadataTable};
use tether_registry::TypeGraph;
use tracing::info;

/// A set of files to analyse together.
#[derive(Debug, Default)]
pub struct Unit {
    /// Files sorted by path.
    files: Vec<File>,
    options: BuildOptions,
}

impl Unit {
    /// Create an empty unit with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty unit with the given options.
    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            files: Vec::new(),
            options,
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Add a parsed file.
    ///
    /// # Errors
    ///
    /// Returns an error if a file with the same path or the same id was
    /// already added; node ids would no longer be unique within the build.
    pub fn add_file(&mut self, file: File) -> Result<(), UnitError> {
        if self.files.iter().any(|f| f.id == file.id) {
            return Err(UnitError::DuplicateFileId(file.id));
        }
        match self.files.binary_search_by(|f| f.path.as_str().cmp(&file.path)) {
            Ok(_) => Err(UnitError::DuplicatePath(file.path)),
            Err(index) => {
                self.files.insert(index, file);
                Ok(())
            }
        }
    }

    /// Files in build order.
    pub fn files(&self) -> &[File] {
        &self.files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Remove every file.
    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Build every file from scratch.
    ///
    /// The build always completes; check [`BuildResult::is_success`] or the
    /// diagnostics to see whether the model is usable.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(&self) -> BuildResult {
        let mut diagnostics = Diagnostics::new();
        let output = Compiler::new(self.options.clone()).build(&self.files, &mut diagnostics);

        info!(
            files = self.files.len(),
            types = output.graph.type_count(),
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            "unit built"
        );

        BuildResult {
            graph: output.graph,
            metadata: output.metadata,
            diagnostics,
            files: self.files.iter().map(|f| (f.id, f.path.clone())).collect(),
        }
    }
}

/// Everything a build produced.
#[derive(Debug)]
pub struct BuildResult {
    pub graph: TypeGraph,
    pub metadata: MetadataTable,
    pub diagnostics: Diagnostics,
    /// Path of every file in the build.
    pub files: FxHashMap<FileId, String>,
}

impl BuildResult {
    /// Whether the build produced no errors. Warnings do not count.
    pub fn is_success(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    /// Path of a file in the build, for rendering diagnostic locations.
    pub fn file_path(&self, file: FileId) -> Option<&str> {
        self.files.get(&file).map(String::as_str)
    }
}

/// Errors that can occur when adding files to a unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    /// A file with this path was already added
    #[error("File '{0}' was already added to the unit")]
    DuplicatePath(String),

    /// A file with this id was already added
    #[error("File id {0} is already used by another file in the unit")]
    DuplicateFileId(FileId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_ast::FileBuilder;

    fn empty_file(id: u32, path: &str) -> File {
        FileBuilder::new(FileId::new(id), path).file(&[], vec![], vec![])
    }

    #[test]
    fn create_empty_unit() {
        let unit = Unit::new();
        assert_eq!(unit.file_count(), 0);
        assert!(unit.build().is_success());
    }

    #[test]
    fn files_are_sorted_by_path() {
        let mut unit = Unit::new();
        unit.add_file(empty_file(0, "b.tether")).unwrap();
        unit.add_file(empty_file(1, "a.tether")).unwrap();
        unit.add_file(empty_file(2, "c.tether")).unwrap();

        let paths: Vec<_> = unit.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["a.tether", "b.tether", "c.tether"]);
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let mut unit = Unit::new();
        unit.add_file(empty_file(0, "a.tether")).unwrap();

        let result = unit.add_file(empty_file(1, "a.tether"));
        assert_eq!(result, Err(UnitError::DuplicatePath("a.tether".into())));
        assert_eq!(unit.file_count(), 1);
    }

    #[test]
    fn duplicate_file_id_is_rejected() {
        let mut unit = Unit::new();
        unit.add_file(empty_file(0, "a.tether")).unwrap();

        let result = unit.add_file(empty_file(0, "b.tether"));
        assert_eq!(result, Err(UnitError::DuplicateFileId(FileId::new(0))));
    }

    #[test]
    fn build_result_knows_file_paths() {
        let mut unit = Unit::new();
        unit.add_file(empty_file(3, "model.tether")).unwrap();

        let result = unit.build();
        assert_eq!(result.file_path(FileId::new(3)), Some("model.tether"));
        assert_eq!(result.file_path(FileId::new(4)), None);
    }

    #[test]
    fn can_rebuild_after_clear() {
        let mut unit = Unit::new();
        unit.add_file(empty_file(0, "a.tether")).unwrap();
        unit.build();
        unit.clear();

        unit.add_file(empty_file(0, "a.tether")).unwrap();
        assert!(unit.build().is_success());
    }
}
