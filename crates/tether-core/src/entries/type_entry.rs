//! TypeEntry enum for unified type storage.
//!
//! Wraps every declared type kind so the graph arena can store, iterate and
//! look them up uniformly.

use crate::PackageId;

use super::{
    AliasEntry, ConsumerEntry, EnumEntry, ProviderEntry, RecordEntry, ServiceEntry, TypeSource,
};

/// Unified type entry for arena storage.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeEntry {
    Record(RecordEntry),
    Enum(EnumEntry),
    Service(ServiceEntry),
    Provider(ProviderEntry),
    Consumer(ConsumerEntry),
    Alias(AliasEntry),
}

impl TypeEntry {
    /// Get the unqualified name.
    pub fn name(&self) -> &str {
        match self {
            TypeEntry::Record(e) => &e.name,
            TypeEntry::Enum(e) => &e.name,
            TypeEntry::Service(e) => &e.name,
            TypeEntry::Provider(e) => &e.name,
            TypeEntry::Consumer(e) => &e.name,
            TypeEntry::Alias(e) => &e.name,
        }
    }

    /// Get the declaring package.
    pub fn package(&self) -> PackageId {
        match self {
            TypeEntry::Record(e) => e.package,
            TypeEntry::Enum(e) => e.package,
            TypeEntry::Service(e) => e.package,
            TypeEntry::Provider(e) => e.package,
            TypeEntry::Consumer(e) => e.package,
            TypeEntry::Alias(e) => e.package,
        }
    }

    /// Get the declaration this entry came from.
    pub fn source(&self) -> &TypeSource {
        match self {
            TypeEntry::Record(e) => &e.source,
            TypeEntry::Enum(e) => &e.source,
            TypeEntry::Service(e) => &e.source,
            TypeEntry::Provider(e) => &e.source,
            TypeEntry::Consumer(e) => &e.source,
            TypeEntry::Alias(e) => &e.source,
        }
    }

    /// Keyword-style name of the kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeEntry::Record(_) => "record",
            TypeEntry::Enum(_) => "enum",
            TypeEntry::Service(_) => "service",
            TypeEntry::Provider(_) => "provider",
            TypeEntry::Consumer(_) => "consumer",
            TypeEntry::Alias(_) => "type alias",
        }
    }

    // === Type Checks ===

    pub fn is_record(&self) -> bool {
        matches!(self, TypeEntry::Record(_))
    }

    pub fn is_service(&self) -> bool {
        matches!(self, TypeEntry::Service(_))
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, TypeEntry::Provider(_))
    }

    pub fn is_alias(&self) -> bool {
        matches!(self, TypeEntry::Alias(_))
    }

    /// Whether values of this type can appear in data positions.
    pub fn is_data(&self) -> bool {
        matches!(
            self,
            TypeEntry::Record(_) | TypeEntry::Enum(_) | TypeEntry::Alias(_)
        )
    }

    // === Downcasting ===

    pub fn as_record(&self) -> Option<&RecordEntry> {
        match self {
            TypeEntry::Record(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumEntry> {
        match self {
            TypeEntry::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceEntry> {
        match self {
            TypeEntry::Service(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_provider(&self) -> Option<&ProviderEntry> {
        match self {
            TypeEntry::Provider(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_consumer(&self) -> Option<&ConsumerEntry> {
        match self {
            TypeEntry::Consumer(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&AliasEntry> {
        match self {
            TypeEntry::Alias(e) => Some(e),
            _ => None,
        }
    }

    // === Mutable Downcasting ===

    pub fn as_record_mut(&mut self) -> Option<&mut RecordEntry> {
        match self {
            TypeEntry::Record(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_service_mut(&mut self) -> Option<&mut ServiceEntry> {
        match self {
            TypeEntry::Service(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_provider_mut(&mut self) -> Option<&mut ProviderEntry> {
        match self {
            TypeEntry::Provider(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_consumer_mut(&mut self) -> Option<&mut ConsumerEntry> {
        match self {
            TypeEntry::Consumer(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_alias_mut(&mut self) -> Option<&mut AliasEntry> {
        match self {
            TypeEntry::Alias(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RecordEntry> for TypeEntry {
    fn from(entry: RecordEntry) -> Self {
        TypeEntry::Record(entry)
    }
}

impl From<EnumEntry> for TypeEntry {
    fn from(entry: EnumEntry) -> Self {
        TypeEntry::Enum(entry)
    }
}

impl From<ServiceEntry> for TypeEntry {
    fn from(entry: ServiceEntry) -> Self {
        TypeEntry::Service(entry)
    }
}

impl From<ProviderEntry> for TypeEntry {
    fn from(entry: ProviderEntry) -> Self {
        TypeEntry::Provider(entry)
    }
}

impl From<ConsumerEntry> for TypeEntry {
    fn from(entry: ConsumerEntry) -> Self {
        TypeEntry::Consumer(entry)
    }
}

impl From<AliasEntry> for TypeEntry {
    fn from(entry: AliasEntry) -> Self {
        TypeEntry::Alias(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileId, NodeId, NodeRef, Span};

    fn source() -> TypeSource {
        let node = NodeRef::new(NodeId::new(FileId::new(0), 0), Span::new(1, 1, 6));
        TypeSource::new(node, node)
    }

    #[test]
    fn common_accessors() {
        let entry: TypeEntry = RecordEntry::new("User", PackageId::new(1), source()).into();
        assert_eq!(entry.name(), "User");
        assert_eq!(entry.package(), PackageId::new(1));
        assert_eq!(entry.kind_name(), "record");
        assert!(entry.is_record());
        assert!(entry.as_service().is_none());
    }

    #[test]
    fn services_are_not_data() {
        let service: TypeEntry = ServiceEntry::new("Api", PackageId::new(0), source()).into();
        let record: TypeEntry = RecordEntry::new("User", PackageId::new(0), source()).into();
        assert!(!service.is_data());
        assert!(record.is_data());
    }

    #[test]
    fn mutable_downcast() {
        let mut entry: TypeEntry = EnumEntry::new("Color", PackageId::new(0), source()).into();
        assert!(entry.as_record_mut().is_none());
        assert!(entry.as_enum().is_some());
    }
}
