//! Build configuration.

/// Options controlling advisory diagnostics.
///
/// Errors are never configurable; only warnings that are purely stylistic
/// or that flag a legal-but-suspicious model can be switched off.
///
/// ```
/// use tether_compiler::BuildOptions;
///
/// let options = BuildOptions::default().with_style_warnings(false);
/// assert!(!options.style_warnings);
/// assert!(options.optional_cycle_warnings);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Warn when a provider or consumer shares its file with other
    /// declarations.
    pub style_warnings: bool,
    /// Warn about record cycles that are broken only by optional fields.
    pub optional_cycle_warnings: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            style_warnings: true,
            optional_cycle_warnings: true,
        }
    }
}

impl BuildOptions {
    pub fn with_style_warnings(mut self, enabled: bool) -> Self {
        self.style_warnings = enabled;
        self
    }

    pub fn with_optional_cycle_warnings(mut self, enabled: bool) -> Self {
        self.optional_cycle_warnings = enabled;
        self
    }
}
