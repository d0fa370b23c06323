//! State projection over event chains.

use std::sync::Arc;

use chronicle_core::{EventTime, LedgerResult, SubjectId, TenantId};
use chronicle_store::{EventRecord, EventStore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::reducer::ReducerRegistry;
use crate::snapshot::{Snapshot, SnapshotStore};

/// Point in a subject's history to project up to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsOf {
    /// Up to and including this sequence number
    Sequence(u64),
    /// Events whose business timestamp is at or before this instant
    Time(EventTime),
}

/// The outcome of a projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedState {
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Projected subject
    pub subject_id: SubjectId,
    /// Highest sequence number folded in
    pub as_of_sequence: u64,
    /// How many events were folded
    pub event_count: u64,
    /// The projected state document, always a JSON object
    pub state: Value,
}

/// Projects subject state by folding chains through registered reducers
pub struct StateProjector {
    store: Arc<EventStore>,
    reducers: ReducerRegistry,
    snapshots: SnapshotStore,
}

impl StateProjector {
    /// Create a projector over a store
    #[must_use]
    pub fn new(store: Arc<EventStore>, reducers: ReducerRegistry) -> Self {
        Self {
            store,
            reducers,
            snapshots: SnapshotStore::new(),
        }
    }

    /// The reducer registry, for registering more reducers
    #[must_use]
    pub fn reducers_mut(&mut self) -> &mut ReducerRegistry {
        &mut self.reducers
    }

    /// The snapshot cache
    #[must_use]
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Project a subject's state
    ///
    /// With no cut-off, the whole chain is folded. A sequence cut-off may
    /// start from a cached snapshot; a time cut-off always replays from
    /// genesis, because business timestamps need not be monotonic in
    /// sequence order.
    ///
    /// # Errors
    ///
    /// Returns `SubjectUnknown` for a subject never appended to
    pub fn project(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
        as_of: Option<AsOf>,
    ) -> LedgerResult<ProjectedState> {
        match as_of {
            Some(AsOf::Time(at)) => {
                let chain = self.store.chain(tenant_id, subject_id, None, None)?;
                let filtered: Vec<&EventRecord> =
                    chain.iter().filter(|r| r.event_time <= at).collect();
                Ok(self.fold(tenant_id, subject_id, Map::new(), 0, &filtered))
            }
            Some(AsOf::Sequence(cutoff)) => self.project_to_sequence(tenant_id, subject_id, cutoff),
            None => self.project_to_sequence(tenant_id, subject_id, u64::MAX),
        }
    }

    fn project_to_sequence(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
        cutoff: u64,
    ) -> LedgerResult<ProjectedState> {
        let (seed_state, seed_sequence, seed_count) =
            match self.usable_snapshot(tenant_id, subject_id, cutoff) {
                Some(snapshot) => {
                    let state = match snapshot.state {
                        Value::Object(map) => map,
                        _ => Map::new(),
                    };
                    (state, snapshot.as_of_sequence, snapshot.event_count)
                }
                None => (Map::new(), 0, 0),
            };

        let from = if seed_sequence == 0 {
            None
        } else {
            Some(seed_sequence + 1)
        };
        let tail = self.store.chain(tenant_id, subject_id, from, Some(cutoff))?;
        let tail_refs: Vec<&EventRecord> = tail.iter().collect();
        Ok(self.fold(tenant_id, subject_id, seed_state, seed_count, &tail_refs)
            .with_floor(seed_sequence))
    }

    /// A cached snapshot safe to start from, if any
    ///
    /// A snapshot that fails its own state hash is corrupt: it is dropped
    /// and the projection falls back to genesis. The log always wins.
    fn usable_snapshot(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
        cutoff: u64,
    ) -> Option<Snapshot> {
        let snapshot = self.snapshots.latest_at(tenant_id, subject_id, cutoff)?;
        if snapshot.is_intact() {
            Some(snapshot)
        } else {
            tracing::warn!(
                tenant = %tenant_id,
                subject = %subject_id,
                as_of = snapshot.as_of_sequence,
                "discarding corrupt snapshot, replaying from genesis"
            );
            self.snapshots.invalidate(tenant_id, subject_id);
            None
        }
    }

    fn fold(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
        mut state: Map<String, Value>,
        mut event_count: u64,
        events: &[&EventRecord],
    ) -> ProjectedState {
        let mut as_of_sequence = 0;
        for record in events {
            self.reducers
                .reducer_for(&record.event_type)
                .apply(&mut state, record);
            as_of_sequence = record.sequence_number;
            event_count += 1;
        }
        ProjectedState {
            tenant_id: tenant_id.clone(),
            subject_id: subject_id.clone(),
            as_of_sequence,
            event_count,
            state: Value::Object(state),
        }
    }

    /// Project the full chain from genesis and cache the result
    ///
    /// Always replays from scratch rather than extending a cached
    /// snapshot, so a refreshed snapshot is grounded directly in the log.
    ///
    /// # Errors
    ///
    /// Returns `SubjectUnknown` for a subject never appended to
    pub fn snapshot(&self, tenant_id: &TenantId, subject_id: &SubjectId) -> LedgerResult<Snapshot> {
        let chain = self.store.chain(tenant_id, subject_id, None, None)?;
        let refs: Vec<&EventRecord> = chain.iter().collect();
        let projected = self.fold(tenant_id, subject_id, Map::new(), 0, &refs);
        let snapshot = Snapshot::capture(
            tenant_id.clone(),
            subject_id.clone(),
            projected.as_of_sequence,
            projected.event_count,
            projected.state,
        )?;
        self.snapshots.put(snapshot.clone());
        tracing::debug!(
            tenant = %tenant_id,
            subject = %subject_id,
            as_of = snapshot.as_of_sequence,
            "snapshot refreshed"
        );
        Ok(snapshot)
    }
}

impl ProjectedState {
    /// Keep the seed cut-off when the tail past it was empty
    fn with_floor(mut self, floor: u64) -> Self {
        if self.as_of_sequence < floor {
            self.as_of_sequence = floor;
        }
        self
    }
}
