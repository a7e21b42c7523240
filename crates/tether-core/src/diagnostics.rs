//! Diagnostic messages and the sink that collects them.
//!
//! A [`Diagnostic`] is a severity, a message, and any number of source
//! highlights. The analysis never formats for a terminal; consumers such as
//! a terminal formatter or an editor protocol render diagnostics themselves,
//! typically per file via [`Diagnostics::by_file`].

use std::collections::BTreeMap;
use std::fmt;

use crate::{ErrorKind, FileId, Location, SemanticError};

/// The severity level of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// The model is invalid.
    Error,
    /// Advisory only; never gates success.
    Warning,
    /// Informational.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
            Severity::Info => f.write_str("info"),
        }
    }
}

/// A source location attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub location: Location,
    /// Label shown at the location.
    pub message: Option<String>,
    /// Extra notes, such as "did you mean" hints.
    pub annotations: Vec<String>,
}

impl Highlight {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            message: None,
            annotations: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }
}

impl From<Location> for Highlight {
    fn from(location: Location) -> Self {
        Highlight::new(location)
    }
}

/// A single diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Highlights; the first one is the primary location.
    pub highlights: Vec<Highlight>,
    /// The semantic error this diagnostic was built from, if any.
    pub error: Option<SemanticError>,
}

impl Diagnostic {
    /// A free-form diagnostic not tied to a [`SemanticError`].
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            highlights: Vec::new(),
            error: None,
        }
    }

    /// A diagnostic carrying the message and severity of `error`.
    pub fn from_error(error: SemanticError) -> Self {
        Self {
            severity: error.severity(),
            message: error.to_string(),
            highlights: Vec::new(),
            error: Some(error),
        }
    }

    pub fn with_highlight(mut self, highlight: impl Into<Highlight>) -> Self {
        self.highlights.push(highlight.into());
        self
    }

    /// Taxonomy bucket, when built from a [`SemanticError`].
    pub fn kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(SemanticError::kind)
    }

    /// The file of the primary highlight.
    pub fn file(&self) -> Option<FileId> {
        self.highlights.first().map(|h| h.location.file)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.highlights.first() {
            Some(primary) => write!(f, "{}: {}: {}", primary.location, self.severity, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// The diagnostic sink.
///
/// Accumulates errors, warnings and info messages across every pass of a
/// build in emission order.
#[derive(Debug, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic to the collection.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Report a semantic error with the given highlights.
    pub fn report<I, H>(&mut self, error: SemanticError, highlights: I)
    where
        I: IntoIterator<Item = H>,
        H: Into<Highlight>,
    {
        let mut diagnostic = Diagnostic::from_error(error);
        diagnostic
            .highlights
            .extend(highlights.into_iter().map(Into::into));
        self.push(diagnostic);
    }

    /// Report a semantic error at a single location.
    pub fn report_at(&mut self, error: SemanticError, location: Location) {
        self.report(error, [location]);
    }

    /// Returns `true` if the collection contains any error diagnostics.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Group diagnostics by the file of their primary highlight.
    ///
    /// Contextless diagnostics are grouped under `None`. Order within a
    /// group is emission order.
    pub fn by_file(&self) -> BTreeMap<Option<FileId>, Vec<&Diagnostic>> {
        let mut grouped: BTreeMap<Option<FileId>, Vec<&Diagnostic>> = BTreeMap::new();
        for diagnostic in &self.diagnostics {
            grouped.entry(diagnostic.file()).or_default().push(diagnostic);
        }
        grouped
    }

    /// Consume the sink, yielding the diagnostics in emission order.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
