//! Event records - the atomic facts of the ledger.

use chronicle_core::{
    canonicalize, ActorId, ChainLink, EventHash, EventId, EventTime, LedgerResult, RecordedAt,
    SubjectId, TenantId,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored ledger event
///
/// Sequence number, hash, previous link and `recorded_at` are assigned by
/// the store at commit; no other component constructs a record with these
/// fields filled. Once stored, a record is never mutated - corrections are
/// new compensating events referencing the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Engine-assigned record id
    pub event_id: EventId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Subject whose chain this event extends
    pub subject_id: SubjectId,
    /// Event type, resolved against the schema registry
    pub event_type: String,
    /// Schema version the payload validated against, pinned forever
    pub schema_version: u32,
    /// Business timestamp (may be historical)
    pub event_time: EventTime,
    /// Ledger insertion time
    pub recorded_at: RecordedAt,
    /// Strictly increasing per subject, starting at 1
    pub sequence_number: u64,
    /// Schema-validated payload
    pub payload: Value,
    /// SHA-256 over the event's preimage
    pub hash: EventHash,
    /// Link to the predecessor (GENESIS for sequence 1)
    pub previous_hash: ChainLink,
    /// Who appended the event
    pub actor: Option<ActorId>,
}

impl EventRecord {
    /// Canonical form of the payload, as hashed
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayloadShape` if the stored payload is not an object
    /// (possible only if storage was tampered with)
    pub fn canonical_payload(&self) -> LedgerResult<String> {
        canonicalize(&self.payload)
    }

    /// Recompute this record's hash from its own stored fields
    ///
    /// Used by verification: a mismatch with the stored `hash` proves the
    /// record was altered after commit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayloadShape` if the stored payload cannot be
    /// canonicalized
    pub fn recompute_hash(&self) -> LedgerResult<EventHash> {
        let canonical = self.canonical_payload()?;
        Ok(EventHash::compute(
            &self.tenant_id,
            &self.subject_id,
            &self.event_type,
            &self.event_time,
            &canonical,
            &self.previous_hash,
        ))
    }

    /// Whether this is the subject's genesis event
    #[must_use]
    pub const fn is_genesis(&self) -> bool {
        self.previous_hash.is_genesis()
    }
}
