//! Versioned schema definitions.

use chronicle_core::{ActorId, RecordedAt, TenantId};
use serde::{Deserialize, Serialize};

use crate::node::SchemaNode;

/// One version of a payload schema for a (tenant, event_type)
///
/// Immutable once registered: evolution happens through new versions with
/// incremented version numbers, never by editing an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Event type this schema validates
    pub event_type: String,
    /// Monotonically increasing per (tenant, event_type), starting at 1
    pub version: u32,
    /// The validation tree
    pub root: SchemaNode,
    /// Whether new writes validate against this version
    pub is_active: bool,
    /// When the version was registered
    pub created_at: RecordedAt,
    /// Who registered it
    pub created_by: Option<ActorId>,
}

impl SchemaDefinition {
    /// Create a new definition
    #[must_use]
    pub fn new(
        tenant_id: TenantId,
        event_type: impl Into<String>,
        version: u32,
        root: SchemaNode,
        is_active: bool,
    ) -> Self {
        Self {
            tenant_id,
            event_type: event_type.into(),
            version,
            root,
            is_active,
            created_at: RecordedAt::now(),
            created_by: None,
        }
    }

    /// Attach the registering actor
    #[must_use]
    pub fn with_created_by(mut self, actor: ActorId) -> Self {
        self.created_by = Some(actor);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_construction() {
        let def = SchemaDefinition::new(
            TenantId::new("acme"),
            "payment_received",
            1,
            SchemaNode::object(),
            true,
        )
        .with_created_by(ActorId::new("ops"));

        assert_eq!(def.version, 1);
        assert!(def.is_active);
        assert_eq!(def.created_by.as_ref().map(|a| a.as_str()), Some("ops"));
    }
}
