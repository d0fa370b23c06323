//! The append-only event store.
//!
//! Chain extension is optimistic: an append observes the subject's tail,
//! hashes against it outside any lock, then commits through a conditional
//! extend whose tail re-check and insert share one critical section. A
//! loser of that race retries against the new tail up to a bounded count.
//! There is no update and no delete; both are rejected unconditionally.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chronicle_core::{
    canonicalize, ActorId, ChainLink, EventHash, EventId, EventTime, LedgerError, RecordedAt,
    SubjectId, TenantId,
};
use chronicle_schema::{SchemaError, SchemaRegistry, VersionSelector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::EventRecord;
use crate::tail::ChainTail;

/// Store configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How many times an append may lose the chain race before giving up
    pub max_append_retries: u32,
    /// Maximum canonical payload size in bytes (0 = unlimited)
    pub max_payload_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_append_retries: 16,
            max_payload_bytes: 1024 * 1024, // 1 MiB
        }
    }
}

/// Store statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total committed events
    pub event_count: u64,
    /// Successful appends
    pub append_count: u64,
    /// Chain races lost (each one retried)
    pub race_count: u64,
    /// Appends rejected before any write
    pub rejected_count: u64,
}

/// Store errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Another append extended the chain first; retried internally
    #[error("chain tail moved for subject {subject}")]
    RaceLost {
        /// The contended subject
        subject: String,
    },
    /// Bounded retries exhausted under contention
    #[error("append for subject {subject} lost the chain race {attempts} times")]
    RetriesExhausted {
        /// The contended subject
        subject: String,
        /// How many races were lost before giving up
        attempts: u32,
    },
    /// Update or delete attempted on a stored event
    #[error("events are immutable: {operation} rejected")]
    ImmutabilityViolation {
        /// The rejected operation
        operation: String,
    },
    /// Read of a subject that has never been appended to
    #[error("unknown subject: {subject}")]
    SubjectUnknown {
        /// The unknown subject
        subject: String,
    },
    /// Canonical payload exceeds the configured limit
    #[error("payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge {
        /// Canonical payload size in bytes
        size: usize,
        /// The configured limit in bytes
        limit: usize,
    },
    /// Payload rejected by the schema registry
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Core error (payload shape, hashing)
    #[error(transparent)]
    Core(#[from] LedgerError),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RaceLost { subject } => Self::ChainRaceLost { subject },
            StoreError::RetriesExhausted { subject, attempts } => {
                Self::RetriesExhausted { subject, attempts }
            }
            StoreError::ImmutabilityViolation { operation } => {
                Self::ImmutabilityViolation { operation }
            }
            StoreError::SubjectUnknown { subject } => Self::SubjectUnknown { subject },
            StoreError::PayloadTooLarge { size, limit } => Self::InvalidPayloadShape {
                reason: format!("payload too large: {} bytes (limit {})", size, limit),
            },
            StoreError::Schema(e) => e.into(),
            StoreError::Core(e) => e,
        }
    }
}

type SubjectKey = (TenantId, SubjectId);

/// The append-only event repository
///
/// In-memory reference implementation; a durable backend plugs in behind
/// the same conditional-extend contract.
pub struct EventStore {
    config: StoreConfig,
    registry: Arc<SchemaRegistry>,
    chains: RwLock<HashMap<SubjectKey, Vec<EventRecord>>>,
    stats: RwLock<StoreStats>,
}

impl EventStore {
    /// Create a store with default configuration
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_config(registry, StoreConfig::default())
    }

    /// Create with custom configuration
    #[must_use]
    pub fn with_config(registry: Arc<SchemaRegistry>, config: StoreConfig) -> Self {
        Self {
            config,
            registry,
            chains: RwLock::new(HashMap::new()),
            stats: RwLock::new(StoreStats::default()),
        }
    }

    /// The schema registry this store validates against
    #[must_use]
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Append an event to a subject's chain
    ///
    /// Validates the payload against the active schema, hashes against the
    /// observed tail, and commits atomically. The subject is created on
    /// first reference. On a lost race the append retries transparently
    /// against the new tail, up to `max_append_retries`.
    ///
    /// # Errors
    ///
    /// `Schema` (validation / not configured), `Core` (payload shape),
    /// `PayloadTooLarge`, or `RetriesExhausted`; nothing is written on any
    /// of them.
    pub fn append(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
        event_type: &str,
        event_time: EventTime,
        payload: Value,
        actor: Option<ActorId>,
    ) -> Result<EventRecord, StoreError> {
        // Reject malformed payloads before anything touches the hasher
        let canonical = canonicalize(&payload).map_err(|e| {
            self.bump_rejected();
            e
        })?;
        if self.config.max_payload_bytes > 0 && canonical.len() > self.config.max_payload_bytes {
            self.bump_rejected();
            return Err(StoreError::PayloadTooLarge {
                size: canonical.len(),
                limit: self.config.max_payload_bytes,
            });
        }

        // Fail closed: no active schema, no write
        let schema_version = self
            .registry
            .validate(tenant_id, event_type, VersionSelector::Active, &payload)
            .map_err(|e| {
                self.bump_rejected();
                e
            })?;

        let key = (tenant_id.clone(), subject_id.clone());
        let mut attempts: u32 = 0;
        loop {
            let observed = self.tail_of(&key);
            let hash = EventHash::compute(
                tenant_id,
                subject_id,
                event_type,
                &event_time,
                &canonical,
                &observed.link,
            );
            let record = EventRecord {
                event_id: EventId::new(),
                tenant_id: tenant_id.clone(),
                subject_id: subject_id.clone(),
                event_type: event_type.to_string(),
                schema_version,
                event_time,
                recorded_at: RecordedAt::now(),
                sequence_number: observed.next_sequence(),
                payload: payload.clone(),
                hash,
                previous_hash: observed.link,
                actor: actor.clone(),
            };

            match self.try_extend(&key, observed, record) {
                Ok(committed) => {
                    let mut stats = self.stats.write().unwrap();
                    stats.event_count += 1;
                    stats.append_count += 1;
                    tracing::debug!(
                        tenant = %tenant_id,
                        subject = %subject_id,
                        sequence = committed.sequence_number,
                        event_type,
                        "event appended"
                    );
                    return Ok(committed);
                }
                Err(StoreError::RaceLost { .. }) => {
                    attempts += 1;
                    self.stats.write().unwrap().race_count += 1;
                    if attempts >= self.config.max_append_retries {
                        return Err(StoreError::RetriesExhausted {
                            subject: subject_id.to_string(),
                            attempts,
                        });
                    }
                    tracing::trace!(
                        subject = %subject_id,
                        attempt = attempts,
                        "chain race lost, retrying against new tail"
                    );
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Conditional chain extension
    ///
    /// The tail re-check and the insert share one critical section, so a
    /// reserved sequence number is never observable without its committed
    /// event, and no two events can carry the same `previous_hash`.
    fn try_extend(
        &self,
        key: &SubjectKey,
        expected: ChainTail,
        record: EventRecord,
    ) -> Result<EventRecord, StoreError> {
        let mut chains = self.chains.write().unwrap();
        let chain = chains.entry(key.clone()).or_default();
        let actual = Self::tail_of_chain(chain);
        if actual != expected {
            return Err(StoreError::RaceLost {
                subject: key.1.to_string(),
            });
        }
        chain.push(record.clone());
        Ok(record)
    }

    fn tail_of_chain(chain: &[EventRecord]) -> ChainTail {
        match chain.last() {
            None => ChainTail::empty(),
            Some(last) => ChainTail {
                sequence: last.sequence_number,
                link: ChainLink::Hash(last.hash),
            },
        }
    }

    fn tail_of(&self, key: &SubjectKey) -> ChainTail {
        let chains = self.chains.read().unwrap();
        chains
            .get(key)
            .map(|c| Self::tail_of_chain(c))
            .unwrap_or_default()
    }

    fn bump_rejected(&self) {
        self.stats.write().unwrap().rejected_count += 1;
    }

    /// Current chain tail for a subject (empty tail for unknown subjects)
    #[must_use]
    pub fn tail(&self, tenant_id: &TenantId, subject_id: &SubjectId) -> ChainTail {
        self.tail_of(&(tenant_id.clone(), subject_id.clone()))
    }

    /// A subject's events ordered by sequence number, optionally windowed
    ///
    /// `from_seq`/`to_seq` are inclusive sequence bounds.
    ///
    /// # Errors
    ///
    /// Returns `SubjectUnknown` for a subject never appended to
    pub fn chain(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
        from_seq: Option<u64>,
        to_seq: Option<u64>,
    ) -> Result<Vec<EventRecord>, StoreError> {
        let chains = self.chains.read().unwrap();
        let chain = chains
            .get(&(tenant_id.clone(), subject_id.clone()))
            .ok_or_else(|| StoreError::SubjectUnknown {
                subject: subject_id.to_string(),
            })?;
        let lo = from_seq.unwrap_or(1);
        let hi = to_seq.unwrap_or(u64::MAX);
        Ok(chain
            .iter()
            .filter(|r| r.sequence_number >= lo && r.sequence_number <= hi)
            .cloned()
            .collect())
    }

    /// All events of one type for a tenant, in recorded order per subject
    #[must_use]
    pub fn events_by_type(&self, tenant_id: &TenantId, event_type: &str) -> Vec<EventRecord> {
        let chains = self.chains.read().unwrap();
        let mut events: Vec<EventRecord> = chains
            .iter()
            .filter(|((t, _), _)| t == tenant_id)
            .flat_map(|(_, chain)| chain.iter())
            .filter(|r| r.event_type == event_type)
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.recorded_at
                .cmp(&b.recorded_at)
                .then(a.sequence_number.cmp(&b.sequence_number))
        });
        events
    }

    /// How many stored events were written under a given schema version
    #[must_use]
    pub fn count_by_schema_version(
        &self,
        tenant_id: &TenantId,
        event_type: &str,
        schema_version: u32,
    ) -> u64 {
        let chains = self.chains.read().unwrap();
        chains
            .iter()
            .filter(|((t, _), _)| t == tenant_id)
            .flat_map(|(_, chain)| chain.iter())
            .filter(|r| r.event_type == event_type && r.schema_version == schema_version)
            .count() as u64
    }

    /// Subjects with at least one event, for one tenant, sorted
    #[must_use]
    pub fn subjects(&self, tenant_id: &TenantId) -> Vec<SubjectId> {
        let chains = self.chains.read().unwrap();
        let mut subjects: Vec<SubjectId> = chains
            .keys()
            .filter(|(t, _)| t == tenant_id)
            .map(|(_, s)| s.clone())
            .collect();
        subjects.sort();
        subjects
    }

    /// Reject any event update - events are immutable
    ///
    /// Always fails; exists so a buggy integration hits a hard wall at the
    /// storage layer instead of silently rewriting history.
    ///
    /// # Errors
    ///
    /// Always returns `ImmutabilityViolation`
    pub fn update_event(&self, event_id: &EventId) -> Result<(), StoreError> {
        tracing::error!(
            event = %event_id,
            "update attempted on immutable event - possible integrity tooling bug"
        );
        Err(StoreError::ImmutabilityViolation {
            operation: format!("update {}", event_id),
        })
    }

    /// Reject any event delete - events are immutable
    ///
    /// # Errors
    ///
    /// Always returns `ImmutabilityViolation`
    pub fn delete_event(&self, event_id: &EventId) -> Result<(), StoreError> {
        tracing::error!(
            event = %event_id,
            "delete attempted on immutable event - possible integrity tooling bug"
        );
        Err(StoreError::ImmutabilityViolation {
            operation: format!("delete {}", event_id),
        })
    }

    /// Store statistics snapshot
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        *self.stats.read().unwrap()
    }

    /// Total committed events across all tenants
    #[must_use]
    pub fn len(&self) -> usize {
        let chains = self.chains.read().unwrap();
        chains.values().map(Vec::len).sum()
    }

    /// Whether the ledger holds no events
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_schema::SchemaNode;
    use indexmap::IndexMap;
    use proptest::prelude::*;
    use serde_json::json;

    fn payment_schema() -> SchemaNode {
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

    fn store_with_schema() -> EventStore {
        let registry = Arc::new(SchemaRegistry::new());
        registry
            .register(
                &TenantId::new("acme"),
                "payment_received",
                payment_schema(),
                true,
                None,
            )
            .unwrap();
        EventStore::new(registry)
    }

    fn t(s: &str) -> EventTime {
        EventTime::parse(s).unwrap()
    }

    #[test]
    fn test_genesis_append() {
        let store = store_with_schema();
        let record = store
            .append(
                &TenantId::new("acme"),
                &SubjectId::new("s1"),
                "payment_received",
                t("2023-01-01T00:00:00Z"),
                json!({"amount": 100, "currency": "USD"}),
                Some(ActorId::new("api")),
            )
            .unwrap();
        assert_eq!(record.sequence_number, 1);
        assert!(record.previous_hash.is_genesis());
        assert_eq!(record.schema_version, 1);
        assert_eq!(record.recompute_hash().unwrap(), record.hash);
    }

    #[test]
    fn test_chain_links() {
        let store = store_with_schema();
        let tenant = TenantId::new("acme");
        let subject = SubjectId::new("s1");
        let first = store
            .append(
                &tenant,
                &subject,
                "payment_received",
                t("2023-01-01T00:00:00Z"),
                json!({"amount": 1}),
                None,
            )
            .unwrap();
        let second = store
            .append(
                &tenant,
                &subject,
                "payment_received",
                t("2023-01-02T00:00:00Z"),
                json!({"amount": 2}),
                None,
            )
            .unwrap();
        assert_eq!(second.sequence_number, 2);
        assert_eq!(second.previous_hash, ChainLink::Hash(first.hash));
        assert_eq!(store.tail(&tenant, &subject).sequence, 2);
    }

    #[test]
    fn test_unregistered_type_fails_closed() {
        let store = store_with_schema();
        let err = store
            .append(
                &TenantId::new("acme"),
                &SubjectId::new("s1"),
                "mystery_event",
                t("2023-01-01T00:00:00Z"),
                json!({"x": 1}),
                None,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Schema(SchemaError::NotConfigured { .. })
        ));
        assert!(store.is_empty());
        assert_eq!(store.stats().rejected_count, 1);
    }

    #[test]
    fn test_invalid_payload_writes_nothing() {
        let store = store_with_schema();
        let err = store
            .append(
                &TenantId::new("acme"),
                &SubjectId::new("s1"),
                "payment_received",
                t("2023-01-01T00:00:00Z"),
                json!({"amount": -5}),
                None,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Schema(SchemaError::ValidationFailed { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let store = store_with_schema();
        let err = store
            .append(
                &TenantId::new("acme"),
                &SubjectId::new("s1"),
                "payment_received",
                t("2023-01-01T00:00:00Z"),
                json!([1, 2, 3]),
                None,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(LedgerError::InvalidPayloadShape { .. })
        ));
    }

    #[test]
    fn test_payload_size_limit() {
        let registry = Arc::new(SchemaRegistry::new());
        registry
            .register(
                &TenantId::new("acme"),
                "payment_received",
                SchemaNode::object(),
                true,
                None,
            )
            .unwrap();
        let store = EventStore::with_config(
            registry,
            StoreConfig {
                max_payload_bytes: 32,
                ..StoreConfig::default()
            },
        );
        let err = store
            .append(
                &TenantId::new("acme"),
                &SubjectId::new("s1"),
                "payment_received",
                t("2023-01-01T00:00:00Z"),
                json!({"note": "a".repeat(64)}),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::PayloadTooLarge { .. }));
    }

    #[test]
    fn test_chain_window() {
        let store = store_with_schema();
        let tenant = TenantId::new("acme");
        let subject = SubjectId::new("s1");
        for i in 1..=5 {
            store
                .append(
                    &tenant,
                    &subject,
                    "payment_received",
                    t("2023-01-01T00:00:00Z"),
                    json!({"amount": i}),
                    None,
                )
                .unwrap();
        }
        let window = store.chain(&tenant, &subject, Some(2), Some(4)).unwrap();
        let seqs: Vec<u64> = window.iter().map(|r| r.sequence_number).collect();
        assert_eq!(seqs, vec![2, 3, 4]);

        let full = store.chain(&tenant, &subject, None, None).unwrap();
        assert_eq!(full.len(), 5);
    }

    #[test]
    fn test_unknown_subject_read() {
        let store = store_with_schema();
        let err = store
            .chain(&TenantId::new("acme"), &SubjectId::new("ghost"), None, None)
            .unwrap_err();
        assert!(matches!(err, StoreError::SubjectUnknown { .. }));
    }

    #[test]
    fn test_immutability_rejected() {
        let store = store_with_schema();
        let tenant = TenantId::new("acme");
        let subject = SubjectId::new("s1");
        let record = store
            .append(
                &tenant,
                &subject,
                "payment_received",
                t("2023-01-01T00:00:00Z"),
                json!({"amount": 1}),
                None,
            )
            .unwrap();

        assert!(matches!(
            store.update_event(&record.event_id).unwrap_err(),
            StoreError::ImmutabilityViolation { .. }
        ));
        assert!(matches!(
            store.delete_event(&record.event_id).unwrap_err(),
            StoreError::ImmutabilityViolation { .. }
        ));

        // Record is untouched
        let stored = store.chain(&tenant, &subject, None, None).unwrap();
        assert_eq!(stored, vec![record]);
    }

    #[test]
    fn test_tenant_isolation() {
        let registry = Arc::new(SchemaRegistry::new());
        for tenant in ["acme", "globex"] {
            registry
                .register(
                    &TenantId::new(tenant),
                    "payment_received",
                    payment_schema(),
                    true,
                    None,
                )
                .unwrap();
        }
        let store = EventStore::new(registry);
        // Same subject id in two tenants: independent chains and counters
        for tenant in ["acme", "globex"] {
            let record = store
                .append(
                    &TenantId::new(tenant),
                    &SubjectId::new("s1"),
                    "payment_received",
                    t("2023-01-01T00:00:00Z"),
                    json!({"amount": 1}),
                    None,
                )
                .unwrap();
            assert_eq!(record.sequence_number, 1);
            assert!(record.previous_hash.is_genesis());
        }
        assert_eq!(store.subjects(&TenantId::new("acme")).len(), 1);
    }

    #[test]
    fn test_events_by_type_and_version_counts() {
        let store = store_with_schema();
        let tenant = TenantId::new("acme");
        for subject in ["s1", "s2"] {
            store
                .append(
                    &tenant,
                    &SubjectId::new(subject),
                    "payment_received",
                    t("2023-01-01T00:00:00Z"),
                    json!({"amount": 5}),
                    None,
                )
                .unwrap();
        }
        assert_eq!(store.events_by_type(&tenant, "payment_received").len(), 2);
        assert_eq!(
            store.count_by_schema_version(&tenant, "payment_received", 1),
            2
        );
        assert_eq!(
            store.count_by_schema_version(&tenant, "payment_received", 2),
            0
        );
    }

    #[test]
    fn test_stale_tail_extend_is_race_lost() {
        let store = store_with_schema();
        let tenant = TenantId::new("acme");
        let subject = SubjectId::new("s1");
        let committed = store
            .append(
                &tenant,
                &subject,
                "payment_received",
                t("2023-01-01T00:00:00Z"),
                json!({"amount": 1}),
                None,
            )
            .unwrap();

        // A writer that hashed against the pre-append tail must lose
        let stale = ChainTail::empty();
        let mut rival = committed.clone();
        rival.event_id = EventId::new();
        rival.sequence_number = stale.next_sequence();
        rival.previous_hash = stale.link;
        let err = store
            .try_extend(&(tenant.clone(), subject.clone()), stale, rival)
            .unwrap_err();
        assert!(matches!(err, StoreError::RaceLost { .. }));
        assert!(matches!(
            LedgerError::from(err),
            LedgerError::ChainRaceLost { .. }
        ));

        // Nothing was written by the losing extend
        assert_eq!(store.chain(&tenant, &subject, None, None).unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_appends_no_forks() {
        use std::thread;

        let store = Arc::new(store_with_schema());
        let tenant = TenantId::new("acme");
        let subject = SubjectId::new("hot");

        const WRITERS: usize = 50;
        let mut handles = Vec::with_capacity(WRITERS);
        for i in 0..WRITERS {
            let store = Arc::clone(&store);
            let tenant = tenant.clone();
            let subject = subject.clone();
            handles.push(thread::spawn(move || {
                store
                    .append(
                        &tenant,
                        &subject,
                        "payment_received",
                        t("2023-01-01T00:00:00Z"),
                        json!({"amount": i}),
                        None,
                    )
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let chain = store.chain(&tenant, &subject, None, None).unwrap();
        assert_eq!(chain.len(), WRITERS);

        // Gap-free sequences and one unbroken hash path
        let mut expected_previous = ChainLink::Genesis;
        for (i, record) in chain.iter().enumerate() {
            assert_eq!(record.sequence_number, (i + 1) as u64);
            assert_eq!(record.previous_hash, expected_previous);
            assert_eq!(record.recompute_hash().unwrap(), record.hash);
            expected_previous = ChainLink::Hash(record.hash);
        }

        // No two events share a previous link
        let mut links: Vec<String> = chain.iter().map(|r| r.previous_hash.preimage()).collect();
        links.sort();
        links.dedup();
        assert_eq!(links.len(), WRITERS);
    }

    // Whatever gets appended, the chain stays linear: dense sequences and
    // every link equal to the predecessor's recomputable hash.
    proptest::proptest! {
        #[test]
        fn prop_chain_linear_for_any_payloads(
            amounts in proptest::collection::vec(0u32..1_000_000, 1..20)
        ) {
            let store = store_with_schema();
            let tenant = TenantId::new("acme");
            let subject = SubjectId::new("s1");
            for amount in &amounts {
                store
                    .append(
                        &tenant,
                        &subject,
                        "payment_received",
                        t("2023-01-01T00:00:00Z"),
                        json!({"amount": amount}),
                        None,
                    )
                    .unwrap();
            }
            let chain = store.chain(&tenant, &subject, None, None).unwrap();
            prop_assert_eq!(chain.len(), amounts.len());
            let mut expected_previous = ChainLink::Genesis;
            for (i, record) in chain.iter().enumerate() {
                prop_assert_eq!(record.sequence_number, (i + 1) as u64);
                prop_assert_eq!(&record.previous_hash, &expected_previous);
                prop_assert_eq!(record.recompute_hash().unwrap(), record.hash);
                expected_previous = ChainLink::Hash(record.hash);
            }
        }
    }

    #[test]
    fn test_stats_track_appends() {
        let store = store_with_schema();
        store
            .append(
                &TenantId::new("acme"),
                &SubjectId::new("s1"),
                "payment_received",
                t("2023-01-01T00:00:00Z"),
                json!({"amount": 1}),
                None,
            )
            .unwrap();
        let stats = store.stats();
        assert_eq!(stats.append_count, 1);
        assert_eq!(stats.event_count, 1);
    }
}
