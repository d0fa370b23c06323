//! Projection snapshots.
//!
//! A snapshot caches the state of a replay prefix so later projections can
//! start from its cut-off instead of genesis. It carries a hash of its own
//! state; a snapshot whose state no longer matches that hash is corrupt
//! and must be discarded, never repaired.

use std::collections::HashMap;
use std::sync::RwLock;

use chronicle_core::{canonicalize, LedgerResult, SnapshotId, SubjectId, TenantId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Hex digest of a canonical state document
fn state_digest(state: &Value) -> LedgerResult<String> {
    let canonical = canonicalize(state)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Cached projection state as of one point in a subject's chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot identifier
    pub snapshot_id: SnapshotId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Projected subject
    pub subject_id: SubjectId,
    /// Highest sequence number folded into `state`
    pub as_of_sequence: u64,
    /// How many events were folded (equals `as_of_sequence` on an intact chain)
    pub event_count: u64,
    /// The projected state document
    pub state: Value,
    /// SHA-256 of the canonical state, hex encoded
    pub state_hash: String,
}

impl Snapshot {
    /// Capture a snapshot of a projected state
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayloadShape` if the state is not a JSON object
    pub fn capture(
        tenant_id: TenantId,
        subject_id: SubjectId,
        as_of_sequence: u64,
        event_count: u64,
        state: Value,
    ) -> LedgerResult<Self> {
        let state_hash = state_digest(&state)?;
        Ok(Self {
            snapshot_id: SnapshotId::new(),
            tenant_id,
            subject_id,
            as_of_sequence,
            event_count,
            state,
            state_hash,
        })
    }

    /// Whether the state still matches its recorded hash
    #[must_use]
    pub fn is_intact(&self) -> bool {
        state_digest(&self.state)
            .map(|digest| digest == self.state_hash)
            .unwrap_or(false)
    }
}

/// Holds the latest snapshot per subject
///
/// Snapshots are caches: losing one costs a longer replay, nothing more,
/// so the store keeps only the most recent per subject.
pub struct SnapshotStore {
    snapshots: RwLock<HashMap<(TenantId, SubjectId), Snapshot>>,
}

impl SnapshotStore {
    /// Create an empty snapshot store
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    /// Store a snapshot, replacing any earlier one for the subject
    pub fn put(&self, snapshot: Snapshot) {
        let key = (snapshot.tenant_id.clone(), snapshot.subject_id.clone());
        let mut snapshots = self.snapshots.write().unwrap();
        snapshots.insert(key, snapshot);
    }

    /// The latest snapshot for a subject, if one exists
    #[must_use]
    pub fn latest(&self, tenant_id: &TenantId, subject_id: &SubjectId) -> Option<Snapshot> {
        let snapshots = self.snapshots.read().unwrap();
        snapshots
            .get(&(tenant_id.clone(), subject_id.clone()))
            .cloned()
    }

    /// The latest snapshot whose cut-off does not exceed `max_sequence`
    #[must_use]
    pub fn latest_at(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
        max_sequence: u64,
    ) -> Option<Snapshot> {
        self.latest(tenant_id, subject_id)
            .filter(|s| s.as_of_sequence <= max_sequence)
    }

    /// Drop a subject's snapshot
    pub fn invalidate(&self, tenant_id: &TenantId, subject_id: &SubjectId) {
        let mut snapshots = self.snapshots.write().unwrap();
        snapshots.remove(&(tenant_id.clone(), subject_id.clone()));
    }

    /// How many subjects have a snapshot
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.read().unwrap().len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
