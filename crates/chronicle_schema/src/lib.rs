//! Chronicle Schema Registry
//!
//! Versioned, tenant-scoped payload schemas. Writes fail closed: an event
//! type with no active schema cannot be appended. Old versions are kept
//! forever so historical events validate against the version they were
//! written under.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builtin;
pub mod definition;
pub mod node;
pub mod registry;

pub use builtin::{system_audit_schema, SYSTEM_AUDIT_EVENT_TYPE, SYSTEM_AUDIT_SUBJECT};
pub use definition::SchemaDefinition;
pub use node::{FieldError, SchemaNode};
pub use registry::{SchemaError, SchemaRegistry, VersionSelector};
