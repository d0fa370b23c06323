//! The schema registry - versioned validation policy per tenant.
//!
//! Versions auto-increment per (tenant, event_type); at most one version is
//! active for new writes; every version stays resolvable so historical
//! events validate against the version recorded at write time.

use std::collections::HashMap;
use std::sync::RwLock;

use chronicle_core::{ActorId, LedgerError, TenantId};
use serde_json::Value;

use crate::definition::SchemaDefinition;
use crate::node::{FieldError, SchemaNode};

/// Which schema version to validate against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector {
    /// The currently active version (new writes)
    Active,
    /// A pinned version (historical replay)
    Pinned(u32),
}

/// Registry errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// No active schema for the event type - writes fail closed
    #[error("no active schema for event type '{event_type}'")]
    NotConfigured {
        /// The event type with no active schema
        event_type: String,
    },
    /// An identical definition is already the active version
    #[error("schema for '{event_type}' is identical to active version {version}")]
    Conflict {
        /// The event type being registered
        event_type: String,
        /// The already-active identical version
        version: u32,
    },
    /// The pinned version does not exist
    #[error("schema version {version} not found for event type '{event_type}'")]
    VersionNotFound {
        /// The event type that was looked up
        event_type: String,
        /// The version that does not exist
        version: u32,
    },
    /// Payload rejected by the schema
    #[error("payload validation failed ({n} error(s))", n = .errors.len())]
    ValidationFailed {
        /// Every field error found, with its path
        errors: Vec<FieldError>,
    },
}

impl From<SchemaError> for LedgerError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::NotConfigured { event_type } => Self::NotConfigured { event_type },
            SchemaError::Conflict { event_type, version } => {
                Self::SchemaConflict { event_type, version }
            }
            SchemaError::VersionNotFound { event_type, version } => Self::NotFound {
                kind: "SchemaVersion".to_string(),
                id: format!("{}@{}", event_type, version),
            },
            SchemaError::ValidationFailed { errors } => Self::SchemaValidationFailed {
                errors: errors.iter().map(ToString::to_string).collect(),
            },
        }
    }
}

type TypeKey = (TenantId, String);

/// Tenant-scoped registry of versioned schema definitions
///
/// Reads and registrations for different event types proceed in parallel;
/// the registry never participates in chain-tail serialization.
pub struct SchemaRegistry {
    // version lists are kept sorted ascending by version
    schemas: RwLock<HashMap<TypeKey, Vec<SchemaDefinition>>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            schemas: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new schema version
    ///
    /// The version number is assigned by the registry (max existing + 1).
    /// When `make_active` is set, the previously active version is
    /// deactivated in the same step.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if `root` is identical to the currently active
    /// definition for this event type.
    pub fn register(
        &self,
        tenant_id: &TenantId,
        event_type: &str,
        root: SchemaNode,
        make_active: bool,
        created_by: Option<ActorId>,
    ) -> Result<u32, SchemaError> {
        let key = (tenant_id.clone(), event_type.to_string());
        let mut schemas = self.schemas.write().unwrap();
        let versions = schemas.entry(key).or_default();

        if let Some(active) = versions.iter().find(|d| d.is_active) {
            if active.root == root {
                return Err(SchemaError::Conflict {
                    event_type: event_type.to_string(),
                    version: active.version,
                });
            }
        }

        let version = versions.iter().map(|d| d.version).max().unwrap_or(0) + 1;
        if make_active {
            for def in versions.iter_mut() {
                def.is_active = false;
            }
        }
        let mut def =
            SchemaDefinition::new(tenant_id.clone(), event_type, version, root, make_active);
        def.created_by = created_by;
        versions.push(def);
        Ok(version)
    }

    /// Validate a payload against a schema version
    ///
    /// `Active` resolves the currently active version and fails closed with
    /// `NotConfigured` when there is none. `Pinned` resolves the stored
    /// version regardless of its active flag - deactivating a version never
    /// invalidates events already written under it.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` with the accumulated field errors
    pub fn validate(
        &self,
        tenant_id: &TenantId,
        event_type: &str,
        selector: VersionSelector,
        payload: &Value,
    ) -> Result<u32, SchemaError> {
        let schemas = self.schemas.read().unwrap();
        let key = (tenant_id.clone(), event_type.to_string());
        let versions = schemas.get(&key);

        let def = match selector {
            VersionSelector::Active => versions
                .and_then(|v| v.iter().find(|d| d.is_active))
                .ok_or_else(|| SchemaError::NotConfigured {
                    event_type: event_type.to_string(),
                })?,
            VersionSelector::Pinned(version) => versions
                .and_then(|v| v.iter().find(|d| d.version == version))
                .ok_or(SchemaError::VersionNotFound {
                    event_type: event_type.to_string(),
                    version,
                })?,
        };

        let errors = def.root.validate(payload);
        if errors.is_empty() {
            Ok(def.version)
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// Get the active version number for an event type
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` when no version is active
    pub fn active_version(
        &self,
        tenant_id: &TenantId,
        event_type: &str,
    ) -> Result<u32, SchemaError> {
        let schemas = self.schemas.read().unwrap();
        schemas
            .get(&(tenant_id.clone(), event_type.to_string()))
            .and_then(|v| v.iter().find(|d| d.is_active))
            .map(|d| d.version)
            .ok_or_else(|| SchemaError::NotConfigured {
                event_type: event_type.to_string(),
            })
    }

    /// Activate a version, deactivating the previously active one
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if the version does not exist
    pub fn activate(
        &self,
        tenant_id: &TenantId,
        event_type: &str,
        version: u32,
    ) -> Result<(), SchemaError> {
        let mut schemas = self.schemas.write().unwrap();
        let versions = schemas
            .get_mut(&(tenant_id.clone(), event_type.to_string()))
            .ok_or(SchemaError::VersionNotFound {
                event_type: event_type.to_string(),
                version,
            })?;
        if !versions.iter().any(|d| d.version == version) {
            return Err(SchemaError::VersionNotFound {
                event_type: event_type.to_string(),
                version,
            });
        }
        for def in versions.iter_mut() {
            def.is_active = def.version == version;
        }
        Ok(())
    }

    /// Deactivate a version
    ///
    /// Leaves the event type with no active version (writes fail closed
    /// until another version is activated); stored events keep validating
    /// against their pinned versions.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if the version does not exist
    pub fn deactivate(
        &self,
        tenant_id: &TenantId,
        event_type: &str,
        version: u32,
    ) -> Result<(), SchemaError> {
        let mut schemas = self.schemas.write().unwrap();
        let def = schemas
            .get_mut(&(tenant_id.clone(), event_type.to_string()))
            .and_then(|v| v.iter_mut().find(|d| d.version == version))
            .ok_or(SchemaError::VersionNotFound {
                event_type: event_type.to_string(),
                version,
            })?;
        def.is_active = false;
        Ok(())
    }

    /// List all versions for an event type, oldest first
    #[must_use]
    pub fn versions(&self, tenant_id: &TenantId, event_type: &str) -> Vec<SchemaDefinition> {
        let schemas = self.schemas.read().unwrap();
        schemas
            .get(&(tenant_id.clone(), event_type.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Fetch a specific version
    #[must_use]
    pub fn definition(
        &self,
        tenant_id: &TenantId,
        event_type: &str,
        version: u32,
    ) -> Option<SchemaDefinition> {
        let schemas = self.schemas.read().unwrap();
        schemas
            .get(&(tenant_id.clone(), event_type.to_string()))
            .and_then(|v| v.iter().find(|d| d.version == version))
            .cloned()
    }

    /// List event types with at least one registered version for a tenant
    #[must_use]
    pub fn event_types(&self, tenant_id: &TenantId) -> Vec<String> {
        let schemas = self.schemas.read().unwrap();
        let mut types: Vec<String> = schemas
            .keys()
            .filter(|(t, _)| t == tenant_id)
            .map(|(_, ty)| ty.clone())
            .collect();
        types.sort();
        types
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn amount_schema() -> SchemaNode {
        SchemaNode::Object {
            properties: IndexMap::from([(
                "amount".to_string(),
                SchemaNode::Number {
                    minimum: Some(0.0),
                    maximum: None,
                    integer: false,
                },
            )]),
            required: vec!["amount".to_string()],
            additional_properties: true,
        }
    }

    fn tenant() -> TenantId {
        TenantId::new("acme")
    }

    #[test]
    fn test_register_assigns_versions() {
        let registry = SchemaRegistry::new();
        let v1 = registry
            .register(&tenant(), "payment", amount_schema(), true, None)
            .unwrap();
        assert_eq!(v1, 1);

        let stricter = SchemaNode::Object {
            properties: IndexMap::from([(
                "amount".to_string(),
                SchemaNode::Number {
                    minimum: Some(1.0),
                    maximum: None,
                    integer: false,
                },
            )]),
            required: vec!["amount".to_string()],
            additional_properties: false,
        };
        let v2 = registry
            .register(&tenant(), "payment", stricter, true, None)
            .unwrap();
        assert_eq!(v2, 2);
        assert_eq!(registry.active_version(&tenant(), "payment").unwrap(), 2);
    }

    #[test]
    fn test_identical_active_conflicts() {
        let registry = SchemaRegistry::new();
        registry
            .register(&tenant(), "payment", amount_schema(), true, None)
            .unwrap();
        let err = registry
            .register(&tenant(), "payment", amount_schema(), true, None)
            .unwrap_err();
        assert!(matches!(err, SchemaError::Conflict { version: 1, .. }));
    }

    #[test]
    fn test_unconfigured_fails_closed() {
        let registry = SchemaRegistry::new();
        let err = registry
            .validate(&tenant(), "payment", VersionSelector::Active, &json!({}))
            .unwrap_err();
        assert!(matches!(err, SchemaError::NotConfigured { .. }));
        assert!(registry.active_version(&tenant(), "payment").is_err());
    }

    #[test]
    fn test_validate_active() {
        let registry = SchemaRegistry::new();
        registry
            .register(&tenant(), "payment", amount_schema(), true, None)
            .unwrap();

        let version = registry
            .validate(
                &tenant(),
                "payment",
                VersionSelector::Active,
                &json!({"amount": 100, "currency": "USD"}),
            )
            .unwrap();
        assert_eq!(version, 1);

        let err = registry
            .validate(
                &tenant(),
                "payment",
                VersionSelector::Active,
                &json!({"amount": -5}),
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::ValidationFailed { .. }));
    }

    #[test]
    fn test_pinned_survives_deactivation() {
        let registry = SchemaRegistry::new();
        registry
            .register(&tenant(), "payment", amount_schema(), true, None)
            .unwrap();
        registry.deactivate(&tenant(), "payment", 1).unwrap();

        // New writes fail closed
        assert!(matches!(
            registry
                .validate(&tenant(), "payment", VersionSelector::Active, &json!({"amount": 1}))
                .unwrap_err(),
            SchemaError::NotConfigured { .. }
        ));

        // Historical replay still resolves the pinned version
        let version = registry
            .validate(
                &tenant(),
                "payment",
                VersionSelector::Pinned(1),
                &json!({"amount": 1}),
            )
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_activate_switches_single_active() {
        let registry = SchemaRegistry::new();
        registry
            .register(&tenant(), "payment", amount_schema(), true, None)
            .unwrap();
        registry
            .register(&tenant(), "payment", SchemaNode::object(), false, None)
            .unwrap();

        registry.activate(&tenant(), "payment", 2).unwrap();
        assert_eq!(registry.active_version(&tenant(), "payment").unwrap(), 2);
        let actives: Vec<u32> = registry
            .versions(&tenant(), "payment")
            .into_iter()
            .filter(|d| d.is_active)
            .map(|d| d.version)
            .collect();
        assert_eq!(actives, vec![2]);
    }

    #[test]
    fn test_activate_missing_version() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.activate(&tenant(), "payment", 3).unwrap_err(),
            SchemaError::VersionNotFound { version: 3, .. }
        ));
    }

    #[test]
    fn test_tenant_isolation() {
        let registry = SchemaRegistry::new();
        registry
            .register(&tenant(), "payment", amount_schema(), true, None)
            .unwrap();

        let other = TenantId::new("globex");
        assert!(registry.active_version(&other, "payment").is_err());
        assert!(registry.versions(&other, "payment").is_empty());
        assert_eq!(registry.event_types(&other), Vec::<String>::new());
    }

    #[test]
    fn test_error_conversion() {
        let err: LedgerError = SchemaError::NotConfigured {
            event_type: "x".to_string(),
        }
        .into();
        assert!(matches!(err, LedgerError::NotConfigured { .. }));

        let err: LedgerError = SchemaError::ValidationFailed {
            errors: vec![FieldError {
                path: "$.a".to_string(),
                message: "expected number".to_string(),
            }],
        }
        .into();
        match err {
            LedgerError::SchemaValidationFailed { errors } => {
                assert_eq!(errors, vec!["$.a: expected number".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
