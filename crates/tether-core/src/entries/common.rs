//! Member structures shared across type entries.
//!
//! Fields, parameters, operations and the `implements`/`uses` clauses all
//! carry the node they were declared at so diagnostics and metadata lookups
//! can find their source.

use crate::{Literal, NodeRef, TypeId, TypeReference};

/// Where a declared type comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeSource {
    /// The whole declaration statement.
    pub declaration: NodeRef,
    /// The declared name.
    pub name: NodeRef,
}

impl TypeSource {
    pub fn new(declaration: NodeRef, name: NodeRef) -> Self {
        Self { declaration, name }
    }
}

/// A record field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub node: NodeRef,
    pub ty: TypeReference,
}

impl Field {
    pub fn new(name: impl Into<String>, node: NodeRef, ty: TypeReference) -> Self {
        Self {
            name: name.into(),
            node,
            ty,
        }
    }
}

/// A single enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub node: NodeRef,
}

impl EnumValue {
    pub fn new(name: impl Into<String>, node: NodeRef) -> Self {
        Self {
            name: name.into(),
            node,
        }
    }
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub node: NodeRef,
    pub ty: TypeReference,
}

impl Parameter {
    pub fn new(name: impl Into<String>, node: NodeRef, ty: TypeReference) -> Self {
        Self {
            name: name.into(),
            node,
            ty,
        }
    }
}

/// Whether an operation expects a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Fire-and-forget; never has a return type.
    Oneway,
    /// Request/response; may return a value.
    RequestResponse,
}

/// A service operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: String,
    pub node: NodeRef,
    pub kind: OperationKind,
    pub parameters: Vec<Parameter>,
    /// Return type of a request/response operation, if it returns anything.
    pub returns: Option<TypeReference>,
}

impl Operation {
    pub fn new(name: impl Into<String>, node: NodeRef, kind: OperationKind) -> Self {
        Self {
            name: name.into(),
            node,
            kind,
            parameters: Vec::new(),
            returns: None,
        }
    }

    /// Every type reference the operation uses, parameters first.
    pub fn references(&self) -> impl Iterator<Item = &TypeReference> {
        self.parameters
            .iter()
            .map(|p| &p.ty)
            .chain(self.returns.as_ref())
    }
}

/// An operation name written in an `implements` or `uses` subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedOperation {
    pub name: String,
    pub node: NodeRef,
}

impl RequestedOperation {
    pub fn new(name: impl Into<String>, node: NodeRef) -> Self {
        Self {
            name: name.into(),
            node,
        }
    }
}

/// A provider's `implements` clause.
///
/// `service_id` and `operations` stay empty until provider validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Implements {
    pub node: NodeRef,
    pub service: TypeReference,
    /// Explicit operation subset, `None` for all operations.
    pub requested: Option<Vec<RequestedOperation>>,
    /// The validated service.
    pub service_id: Option<TypeId>,
    /// Names of the operations the provider implements.
    pub operations: Vec<String>,
}

impl Implements {
    pub fn new(
        node: NodeRef,
        service: TypeReference,
        requested: Option<Vec<RequestedOperation>>,
    ) -> Self {
        Self {
            node,
            service,
            requested,
            service_id: None,
            operations: Vec::new(),
        }
    }
}

/// A consumer's `uses` clause.
///
/// `service_id` and `operations` stay empty until consumer validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Uses {
    pub node: NodeRef,
    pub service: TypeReference,
    pub requested: Option<Vec<RequestedOperation>>,
    pub service_id: Option<TypeId>,
    /// Names of the operations the consumer uses.
    pub operations: Vec<String>,
}

impl Uses {
    pub fn new(
        node: NodeRef,
        service: TypeReference,
        requested: Option<Vec<RequestedOperation>>,
    ) -> Self {
        Self {
            node,
            service,
            requested,
            service_id: None,
            operations: Vec::new(),
        }
    }
}

/// A value in a transport configuration object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Literal(Literal),
    List(Vec<ConfigValue>),
    Object(Vec<(String, ConfigValue)>),
}

/// A provider's transport descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    /// Transport name, lower-cased for case-insensitive matching.
    pub name: String,
    pub node: NodeRef,
    /// Configuration entries in declaration order.
    pub config: Vec<(String, ConfigValue)>,
}

impl Transport {
    pub fn new(name: &str, node: NodeRef) -> Self {
        Self {
            name: name.to_lowercase(),
            node,
            config: Vec::new(),
        }
    }

    /// Look up a top-level configuration entry.
    pub fn config_value(&self, key: &str) -> Option<&ConfigValue> {
        self.config.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}
