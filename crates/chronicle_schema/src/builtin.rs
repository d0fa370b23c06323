//! Built-in schemas.
//!
//! The reserved `system.audit` event type records internal CRUD activity
//! (entity created/updated/deleted and by whom) on a per-tenant audit
//! subject. Tenants install it once during onboarding.

use indexmap::IndexMap;

use crate::node::SchemaNode;

/// Reserved event type for system audit events
pub const SYSTEM_AUDIT_EVENT_TYPE: &str = "system.audit";

/// Reserved subject id carrying a tenant's audit trail
pub const SYSTEM_AUDIT_SUBJECT: &str = "_system_audit_trail";

const AUDITABLE_ENTITIES: &[&str] = &[
    "subject",
    "event_schema",
    "workflow",
    "user",
    "role",
    "permission",
    "document",
    "tenant",
];

const AUDIT_ACTIONS: &[&str] = &[
    "created",
    "updated",
    "deleted",
    "activated",
    "deactivated",
    "assigned",
    "unassigned",
    "status_changed",
];

const ACTOR_TYPES: &[&str] = &["user", "system", "external", "api_key", "webhook"];

fn enum_of(values: &[&str]) -> SchemaNode {
    SchemaNode::String {
        min_length: None,
        max_length: None,
        allowed: Some(values.iter().map(ToString::to_string).collect()),
    }
}

/// The strict schema for `system.audit` events
///
/// Required context for every audited action, enumerated entity/action/
/// actor kinds, and no additional top-level properties.
#[must_use]
pub fn system_audit_schema() -> SchemaNode {
    let actor = SchemaNode::Object {
        properties: IndexMap::from([
            ("type".to_string(), enum_of(ACTOR_TYPES)),
            (
                "id".to_string(),
                SchemaNode::String {
                    min_length: None,
                    max_length: Some(128),
                    allowed: None,
                },
            ),
        ]),
        required: vec!["type".to_string()],
        additional_properties: false,
    };

    SchemaNode::Object {
        properties: IndexMap::from([
            ("entity_type".to_string(), enum_of(AUDITABLE_ENTITIES)),
            (
                "entity_id".to_string(),
                SchemaNode::String {
                    min_length: Some(1),
                    max_length: Some(128),
                    allowed: None,
                },
            ),
            ("action".to_string(), enum_of(AUDIT_ACTIONS)),
            ("actor".to_string(), actor),
            ("metadata".to_string(), SchemaNode::object()),
        ]),
        required: vec![
            "entity_type".to_string(),
            "entity_id".to_string(),
            "action".to_string(),
            "actor".to_string(),
        ],
        additional_properties: false,
    }
}
