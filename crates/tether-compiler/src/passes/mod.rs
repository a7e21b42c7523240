//! Compiler passes, run in this order:
//!
//! - [`registration`]: register every declaration with unresolved type references
//! - [`resolution`]: build file scopes and resolve every type reference
//! - [`alias`]: collapse alias chains to their underlying types
//! - [`validation`]: usage, cycle and provider/consumer checks

pub mod alias;
pub mod registration;
pub mod resolution;
pub mod validation;

pub use alias::{AliasOutput, AliasPass};
pub use registration::{RegistrationOutput, RegistrationPass};
pub use resolution::{ResolutionOutput, ResolutionPass};
pub use validation::{ValidationOutput, ValidationPass};
