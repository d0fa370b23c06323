//! Event hashing and chain links.
//!
//! Every event hash is SHA-256 over a pipe-joined preimage of the event's
//! identity fields, its canonical payload, and the previous link. A
//! subject's first event links to the explicit `GENESIS` sentinel rather
//! than an absent value, so the genesis state is a testable constant.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::id::{SubjectId, TenantId};
use crate::time::EventTime;

/// The sentinel previous-link of a subject's first event
pub const GENESIS: &str = "GENESIS";

/// A SHA-256 event hash (256 bits / 32 bytes), hex form is 64 lowercase chars
///
/// Serialized as the 64-char hex string wherever it is persisted or
/// transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventHash([u8; 32]);

impl EventHash {
    /// The number of hex characters in the encoded form
    pub const HEX_LEN: usize = 64;

    /// Compute the hash of an event from its preimage fields
    ///
    /// Stateless and side-effect-free: same six inputs, same hash, on any
    /// platform.
    #[must_use]
    pub fn compute(
        tenant_id: &TenantId,
        subject_id: &SubjectId,
        event_type: &str,
        event_time: &EventTime,
        canonical_payload: &str,
        previous: &ChainLink,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(tenant_id.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(subject_id.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(event_type.as_bytes());
        hasher.update(b"|");
        hasher.update(event_time.to_iso8601().as_bytes());
        hasher.update(b"|");
        hasher.update(canonical_payload.as_bytes());
        hasher.update(b"|");
        hasher.update(previous.preimage().as_bytes());
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get as bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex (64 chars)
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    ///
    /// # Errors
    ///
    /// Returns error if hex is invalid or not 32 bytes
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let bytes = hex::decode(s).map_err(|_| HashError::InvalidHex)?;
        if bytes.len() != 32 {
            return Err(HashError::InvalidLength(bytes.len()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for EventHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<EventHash> for String {
    fn from(hash: EventHash) -> Self {
        hash.to_hex()
    }
}

impl TryFrom<String> for EventHash {
    type Error = HashError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

/// Hash-related errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// Invalid hex encoding
    InvalidHex,
    /// Invalid length (not 32 bytes)
    InvalidLength(usize),
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHex => write!(f, "Invalid hex encoding"),
            Self::InvalidLength(len) => {
                write!(f, "Invalid hash length: {} (expected 32)", len)
            }
        }
    }
}

impl std::error::Error for HashError {}

impl From<HashError> for crate::error::LedgerError {
    fn from(err: HashError) -> Self {
        Self::InvalidHash {
            reason: err.to_string(),
        }
    }
}

/// The previous-hash link of an event
///
/// Sequence 1 links to the literal `GENESIS` sentinel; every later event
/// links to its predecessor's hash. Serialized as the sentinel string or
/// 64 hex chars, matching the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChainLink {
    /// First event of a subject
    Genesis,
    /// Link to the previous event's hash
    Hash(EventHash),
}

impl ChainLink {
    /// The bytes this link contributes to a hash preimage
    #[must_use]
    pub fn preimage(&self) -> String {
        match self {
            Self::Genesis => GENESIS.to_string(),
            Self::Hash(h) => h.to_hex(),
        }
    }

    /// Whether this is the genesis sentinel
    #[must_use]
    pub const fn is_genesis(&self) -> bool {
        matches!(self, Self::Genesis)
    }
}

impl fmt::Display for ChainLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.preimage())
    }
}

impl From<EventHash> for ChainLink {
    fn from(hash: EventHash) -> Self {
        Self::Hash(hash)
    }
}

impl From<ChainLink> for String {
    fn from(link: ChainLink) -> Self {
        link.preimage()
    }
}

impl TryFrom<String> for ChainLink {
    type Error = HashError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s == GENESIS {
            Ok(Self::Genesis)
        } else {
            EventHash::from_hex(&s).map(Self::Hash)
        }
    }
}
