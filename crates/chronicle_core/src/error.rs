//! Core error types for Chronicle.

use std::fmt;

/// Core result type
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Core error type
///
/// Every crate in the workspace converts its own error enum into this one,
/// so the engine facade surfaces a single taxonomy to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Payload is not a canonicalizable JSON object
    InvalidPayloadShape {
        /// What was wrong with the payload
        reason: String,
    },

    /// Hash is not 64 lowercase hex chars (or the GENESIS sentinel)
    InvalidHash {
        /// What was wrong with the hash
        reason: String,
    },

    /// Timestamp could not be parsed or formatted
    InvalidTimestamp {
        /// What was wrong with the timestamp
        reason: String,
    },

    /// Identifier is empty or malformed
    InvalidId {
        /// What was wrong with the identifier
        reason: String,
    },

    /// No active schema is registered for the event type - writes fail closed
    NotConfigured {
        /// The event type with no active schema
        event_type: String,
    },

    /// An identical definition is already the active version for the type
    SchemaConflict {
        /// The event type being registered
        event_type: String,
        /// The already-active identical version
        version: u32,
    },

    /// Payload was rejected by the active schema; nothing was written
    SchemaValidationFailed {
        /// Rendered field errors, one per offending path
        errors: Vec<String>,
    },

    /// An append observed a stale chain tail; retried internally
    ChainRaceLost {
        /// The contended subject
        subject: String,
    },

    /// Bounded append retries were exhausted under contention
    RetriesExhausted {
        /// The contended subject
        subject: String,
        /// How many races were lost before giving up
        attempts: u32,
    },

    /// An update or delete was attempted on a stored event
    ImmutabilityViolation {
        /// The rejected operation
        operation: String,
    },

    /// Read operation on a subject that has never been appended to
    SubjectUnknown {
        /// The unknown subject
        subject: String,
    },

    /// Requested sequence or version does not exist
    NotFound {
        /// What kind of thing was looked up
        kind: String,
        /// The identifier that did not resolve
        id: String,
    },

    /// Internal error (for unexpected conditions)
    Internal {
        /// What went wrong
        message: String,
    },
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPayloadShape { reason } => {
                write!(f, "Invalid payload shape: {}", reason)
            }
            Self::InvalidHash { reason } => write!(f, "Invalid hash: {}", reason),
            Self::InvalidTimestamp { reason } => write!(f, "Invalid timestamp: {}", reason),
            Self::InvalidId { reason } => write!(f, "Invalid identifier: {}", reason),
            Self::NotConfigured { event_type } => {
                write!(f, "No active schema for event type '{}'", event_type)
            }
            Self::SchemaConflict { event_type, version } => {
                write!(
                    f,
                    "Schema for '{}' is identical to active version {}",
                    event_type, version
                )
            }
            Self::SchemaValidationFailed { errors } => {
                write!(f, "Schema validation failed: {}", errors.join("; "))
            }
            Self::ChainRaceLost { subject } => {
                write!(f, "Chain tail moved during append for subject {}", subject)
            }
            Self::RetriesExhausted { subject, attempts } => {
                write!(
                    f,
                    "Append for subject {} lost the chain race {} times",
                    subject, attempts
                )
            }
            Self::ImmutabilityViolation { operation } => {
                write!(f, "Immutability violation: {}", operation)
            }
            Self::SubjectUnknown { subject } => write!(f, "Unknown subject: {}", subject),
            Self::NotFound { kind, id } => write!(f, "{} not found: {}", kind, id),
            Self::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayloadShape {
            reason: err.to_string(),
        }
    }
}
