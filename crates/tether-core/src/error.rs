//! Error types for semantic analysis.
//!
//! ## Error Hierarchy
//!
//! ```text
//! SemanticError       - every diagnostic the analysis can emit
//!   ├─ kind()         -> ErrorKind (taxonomy bucket)
//!   └─ severity()     -> Severity (advisory variants are warnings)
//! RegistrationError   - fallible graph mutations (converted to diagnostics)
//! ```
//!
//! The `Display` text of a [`SemanticError`] is the user-facing message; the
//! source locations travel separately as diagnostic highlights.

use thiserror::Error;

use crate::{ConstraintType, Severity, TypeId};

/// Taxonomy bucket of a semantic diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unresolved names, non-packages in path positions.
    Resolution,
    /// Duplicate declarations, members, imports.
    Uniqueness,
    /// Malformed or inapplicable constraints.
    Constraint,
    /// Alias cycles and invalid alias targets.
    Alias,
    /// Invalid data types, map keys, record cycles.
    ModelValidity,
    /// Provider/consumer consistency with services.
    Consistency,
    /// Advisory style guidance.
    Style,
}

// ============================================================================
// Semantic Errors
// ============================================================================

/// Every problem the semantic analysis can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    // === Uniqueness ===
    /// A type name is declared twice in one package.
    #[error("Duplicate declaration of '{name}' in package '{package}'")]
    DuplicateDeclaration { name: String, package: String },

    #[error("Duplicate field '{field}' in record '{record}'")]
    DuplicateField { record: String, field: String },

    #[error("Duplicate value '{value}' in enum '{enum_name}'")]
    DuplicateEnumValue { enum_name: String, value: String },

    #[error("Duplicate operation '{operation}' in service '{service}'")]
    DuplicateOperation { service: String, operation: String },

    #[error("Duplicate parameter '{parameter}' in operation '{operation}'")]
    DuplicateParameter { operation: String, parameter: String },

    #[error("Service '{service}' is implemented more than once in provider '{provider}'")]
    DuplicateImplements { provider: String, service: String },

    #[error("Service '{service}' is used more than once in consumer '{consumer}'")]
    DuplicateUses { consumer: String, service: String },

    #[error("Operation '{operation}' is listed more than once")]
    DuplicateRequestedOperation { operation: String },

    /// An imported name collides with a name already in scope.
    #[error("Import '{name}' conflicts with locally defined type with same name")]
    ImportConflict { name: String },

    #[error("Type '{name}' shadows built-in type")]
    ShadowsBuiltin { name: String },

    #[error("Provider '{provider}' declares more than one transport")]
    MultipleTransports { provider: String },

    // === Resolution ===
    #[error("Could not resolve type '{name}'")]
    UnresolvedType { name: String },

    #[error("Could not resolve import '{path}'")]
    UnresolvedImport { path: String },

    #[error("'{name}' is not a package")]
    NotAPackage { name: String },

    /// Literals, object/array/range literals or wildcards in type position.
    #[error("Not a valid type expression")]
    InvalidTypeExpression,

    #[error("{generic} expects exactly {expected}, found {found}")]
    GenericArity {
        generic: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("{generic} requires type arguments")]
    MissingTypeArguments { generic: &'static str },

    #[error("Type '{name}' does not take type arguments")]
    NotGeneric { name: String },

    #[error("'{name}' is not a service")]
    NotAService { name: String },

    #[error("'{name}' is not a provider")]
    NotAProvider { name: String },

    // === Constraint ===
    #[error("Unknown constraint '{name}', expected one of: pattern, range, size, value")]
    UnknownConstraint { name: String },

    #[error("Not a valid constraint expression")]
    InvalidConstraintExpression,

    #[error("'{constraint}' expects {expected}")]
    ConstraintArgument {
        constraint: ConstraintType,
        expected: &'static str,
    },

    #[error("'{constraint}' must have at least one bound")]
    EmptyBounds { constraint: ConstraintType },

    #[error("Range bounds must be numbers or '*'")]
    InvalidRangeBound,

    #[error("Size bounds must be non-negative whole numbers or '*'")]
    InvalidSizeBound,

    #[error("'{constraint}' lower bound {lower} is greater than upper bound {upper}")]
    InvertedBounds {
        constraint: ConstraintType,
        lower: String,
        upper: String,
    },

    #[error("Invalid regular expression: {message}")]
    InvalidPattern { message: String },

    #[error("Constraints cannot be applied to an already constrained type")]
    NestedConstraints,

    #[error("Duplicate '{constraint}' constraint")]
    DuplicateConstraint { constraint: ConstraintType },

    #[error("Constraint '{constraint}' cannot be applied to type '{ty}', {alternatives}")]
    InapplicableConstraint {
        constraint: ConstraintType,
        ty: String,
        /// Either the list of valid constraints or a note that none apply.
        alternatives: String,
    },

    #[error("Value constraint for type '{ty}' must be a {expected} literal, found {found}")]
    ValueKindMismatch {
        ty: String,
        expected: &'static str,
        found: &'static str,
    },

    // === Alias ===
    #[error("Could not resolve type alias '{name}', are there circular references?")]
    UnresolvableAlias { name: String },

    #[error("Package '{name}' is not a valid type alias target")]
    PackageAliasTarget { name: String },

    // === Model validity ===
    /// A service, provider, consumer or package in a data position.
    #[error("{kind} '{name}' cannot be used as a data type")]
    DisallowedDataType { kind: &'static str, name: String },

    #[error("Map keys must be of type String, found '{found}'")]
    MapKeyNotString { found: String },

    #[error("Record '{record}' must not be cyclical, cannot be serialized ({path})")]
    RecordCycle { record: String, path: String },

    #[error("Record '{record}' is cyclical through optional fields only ({path})")]
    OptionalRecordCycle { record: String, path: String },

    #[error("Record '{record}' cannot extend other types, 'extends' is not supported yet")]
    ExtendsNotSupported { record: String },

    #[error("Provider '{provider}' must declare a transport")]
    MissingTransport { provider: String },

    #[error("Transport configuration must be an object of literal values")]
    InvalidTransportConfig,

    // === Consistency ===
    #[error("Operation '{operation}' not found in service '{service}'")]
    UnknownOperation { operation: String, service: String },

    #[error("Provider '{provider}' does not implement service '{service}'")]
    ServiceNotImplemented { provider: String, service: String },

    #[error("Operation '{operation}' of service '{service}' is not implemented by provider '{provider}'")]
    OperationNotImplemented {
        operation: String,
        service: String,
        provider: String,
    },

    #[error("References to a {kind} cannot be optional or constrained")]
    ConstrainedServiceReference { kind: &'static str },

    // === Style ===
    #[error("Type is already optional")]
    RedundantOptional,

    #[error("Providers and consumers should be declared in a file of their own")]
    OneDeclarationPerFile,
}

impl SemanticError {
    /// The taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        use SemanticError::*;
        match self {
            DuplicateDeclaration { .. }
            | DuplicateField { .. }
            | DuplicateEnumValue { .. }
            | DuplicateOperation { .. }
            | DuplicateParameter { .. }
            | DuplicateImplements { .. }
            | DuplicateUses { .. }
            | DuplicateRequestedOperation { .. }
            | ImportConflict { .. }
            | ShadowsBuiltin { .. }
            | MultipleTransports { .. } => ErrorKind::Uniqueness,

            UnresolvedType { .. }
            | UnresolvedImport { .. }
            | NotAPackage { .. }
            | InvalidTypeExpression
            | GenericArity { .. }
            | MissingTypeArguments { .. }
            | NotGeneric { .. }
            | NotAService { .. }
            | NotAProvider { .. } => ErrorKind::Resolution,

            UnknownConstraint { .. }
            | InvalidConstraintExpression
            | ConstraintArgument { .. }
            | EmptyBounds { .. }
            | InvalidRangeBound
            | InvalidSizeBound
            | InvertedBounds { .. }
            | InvalidPattern { .. }
            | NestedConstraints
            | DuplicateConstraint { .. }
            | InapplicableConstraint { .. }
            | ValueKindMismatch { .. } => ErrorKind::Constraint,

            UnresolvableAlias { .. } | PackageAliasTarget { .. } => ErrorKind::Alias,

            DisallowedDataType { .. }
            | MapKeyNotString { .. }
            | RecordCycle { .. }
            | OptionalRecordCycle { .. }
            | ExtendsNotSupported { .. }
            | MissingTransport { .. }
            | InvalidTransportConfig => ErrorKind::ModelValidity,

            UnknownOperation { .. }
            | ServiceNotImplemented { .. }
            | OperationNotImplemented { .. }
            | ConstrainedServiceReference { .. } => ErrorKind::Consistency,

            RedundantOptional | OneDeclarationPerFile => ErrorKind::Style,
        }
    }

    /// Advisory variants are warnings; everything else is an error.
    pub fn severity(&self) -> Severity {
        match self {
            SemanticError::RedundantOptional
            | SemanticError::OneDeclarationPerFile
            | SemanticError::OptionalRecordCycle { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors from mutating the type graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A type with this name already exists in the package.
    #[error("duplicate type: {name}")]
    DuplicateType {
        /// The qualified name that was duplicated.
        name: String,
        /// The entry registered first.
        existing: TypeId,
    },

    /// The package handle does not belong to this graph.
    #[error("invalid package")]
    InvalidPackage,
}
