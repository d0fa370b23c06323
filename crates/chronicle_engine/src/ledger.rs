//! The ledger facade.

use std::sync::Arc;

use chronicle_core::{ActorId, EventTime, LedgerError, LedgerResult, SubjectId, TenantId};
use chronicle_replay::{AsOf, ProjectedState, Reducer, ReducerRegistry, Snapshot, StateProjector};
use chronicle_schema::{
    system_audit_schema, SchemaDefinition, SchemaNode, SchemaRegistry, VersionSelector,
    SYSTEM_AUDIT_EVENT_TYPE, SYSTEM_AUDIT_SUBJECT,
};
use chronicle_store::{ChainTail, EventRecord, EventStore, StoreConfig, StoreStats};
use chronicle_verify::{ChainVerifier, TenantReport, VerificationReport};
use serde_json::Value;

use crate::config::EngineConfig;

/// Builds a [`Ledger`] with reducers registered up front
///
/// Reducers are fixed at build time so every projection over the ledger's
/// lifetime folds events the same way.
pub struct LedgerBuilder {
    config: EngineConfig,
    reducers: ReducerRegistry,
}

impl LedgerBuilder {
    /// Start from default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            reducers: ReducerRegistry::new(),
        }
    }

    /// Set the engine configuration
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a reducer for an event type
    #[must_use]
    pub fn with_reducer(mut self, event_type: impl Into<String>, reducer: Arc<dyn Reducer>) -> Self {
        self.reducers.register(event_type, reducer);
        self
    }

    /// Replace the fallback reducer for unregistered event types
    #[must_use]
    pub fn with_default_reducer(mut self, reducer: Arc<dyn Reducer>) -> Self {
        self.reducers = self.reducers.with_default(reducer);
        self
    }

    /// Wire everything together
    #[must_use]
    pub fn build(self) -> Ledger {
        let registry = Arc::new(SchemaRegistry::new());
        let store = Arc::new(EventStore::with_config(
            Arc::clone(&registry),
            StoreConfig {
                max_append_retries: self.config.max_append_retries,
                max_payload_bytes: self.config.max_payload_bytes,
            },
        ));
        let projector = StateProjector::new(Arc::clone(&store), self.reducers);
        Ledger {
            config: self.config,
            registry,
            store,
            verifier: ChainVerifier::new(),
            projector,
        }
    }
}

impl Default for LedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The engine facade
///
/// Owns the schema registry, the event store, the verifier and the
/// projector; everything an API layer calls goes through here and comes
/// back in the core error taxonomy. Shared-reference safe: all operations
/// take `&self`.
pub struct Ledger {
    config: EngineConfig,
    registry: Arc<SchemaRegistry>,
    store: Arc<EventStore>,
    verifier: ChainVerifier,
    projector: StateProjector,
}

impl Ledger {
    /// A ledger with default configuration and no reducers
    #[must_use]
    pub fn new() -> Self {
        LedgerBuilder::new().build()
    }

    /// Start building a ledger
    #[must_use]
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::new()
    }

    /// The engine configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Append an event to a subject's chain
    ///
    /// The subject is created on first reference. When `snapshot_every` is
    /// configured, crossing a multiple of it refreshes the subject's
    /// projection snapshot; a snapshot failure never fails the append.
    ///
    /// # Errors
    ///
    /// `NotConfigured`, `SchemaValidationFailed`, `InvalidPayloadShape`,
    /// or `RetriesExhausted`; nothing is written on any of them.
    pub fn append_event(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
        event_type: &str,
        event_time: EventTime,
        payload: Value,
        actor: Option<ActorId>,
    ) -> LedgerResult<EventRecord> {
        let span = tracing::info_span!(
            "append_event",
            tenant = %tenant_id,
            subject = %subject_id,
            event_type
        );
        let _guard = span.enter();

        let record = self
            .store
            .append(tenant_id, subject_id, event_type, event_time, payload, actor)?;

        if let Some(every) = self.config.snapshot_every {
            if every > 0 && record.sequence_number % every == 0 {
                if let Err(e) = self.projector.snapshot(tenant_id, subject_id) {
                    tracing::warn!(error = %e, "automatic snapshot refresh failed");
                }
            }
        }
        Ok(record)
    }

    /// Read a subject's chain in sequence order
    ///
    /// `from_seq`/`to_seq` are inclusive bounds; at most
    /// `default_page_limit` events come back per call, so callers page by
    /// advancing `from_seq` past the last sequence they received.
    ///
    /// # Errors
    ///
    /// Returns `SubjectUnknown` for a subject never appended to
    pub fn get_chain(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
        from_seq: Option<u64>,
        to_seq: Option<u64>,
    ) -> LedgerResult<Vec<EventRecord>> {
        let mut events = self.store.chain(tenant_id, subject_id, from_seq, to_seq)?;
        events.truncate(self.config.default_page_limit);
        Ok(events)
    }

    /// Current chain tail for a subject (empty tail for unknown subjects)
    #[must_use]
    pub fn tail(&self, tenant_id: &TenantId, subject_id: &SubjectId) -> ChainTail {
        self.store.tail(tenant_id, subject_id)
    }

    /// Re-walk a subject's chain and report its integrity
    ///
    /// # Errors
    ///
    /// Returns `SubjectUnknown` for a subject never appended to
    pub fn verify_chain(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
    ) -> LedgerResult<VerificationReport> {
        let span = tracing::info_span!("verify_chain", tenant = %tenant_id, subject = %subject_id);
        let _guard = span.enter();
        Ok(self.verifier.verify(&self.store, tenant_id, subject_id)?)
    }

    /// Verify every subject of a tenant
    #[must_use]
    pub fn verify_tenant(&self, tenant_id: &TenantId) -> TenantReport {
        let span = tracing::info_span!("verify_tenant", tenant = %tenant_id);
        let _guard = span.enter();
        self.verifier.verify_tenant(&self.store, tenant_id)
    }

    /// Project a subject's state, optionally as of a point in its history
    ///
    /// # Errors
    ///
    /// Returns `SubjectUnknown` for a subject never appended to
    pub fn project_state(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
        as_of: Option<AsOf>,
    ) -> LedgerResult<ProjectedState> {
        let span = tracing::info_span!("project_state", tenant = %tenant_id, subject = %subject_id);
        let _guard = span.enter();
        self.projector.project(tenant_id, subject_id, as_of)
    }

    /// Take or refresh a subject's projection snapshot
    ///
    /// # Errors
    ///
    /// Returns `SubjectUnknown` for a subject never appended to
    pub fn take_snapshot(
        &self,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
    ) -> LedgerResult<Snapshot> {
        self.projector.snapshot(tenant_id, subject_id)
    }

    // ---- schema administration ----

    /// Register a schema version for an event type
    ///
    /// # Errors
    ///
    /// Returns `SchemaConflict` when the definition is already active
    pub fn register_schema(
        &self,
        tenant_id: &TenantId,
        event_type: &str,
        root: SchemaNode,
        make_active: bool,
        created_by: Option<ActorId>,
    ) -> LedgerResult<u32> {
        Ok(self
            .registry
            .register(tenant_id, event_type, root, make_active, created_by)?)
    }

    /// Activate a schema version, deactivating the previously active one
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the version does not exist
    pub fn activate_schema(
        &self,
        tenant_id: &TenantId,
        event_type: &str,
        version: u32,
    ) -> LedgerResult<()> {
        Ok(self.registry.activate(tenant_id, event_type, version)?)
    }

    /// Deactivate a schema version; new writes fail closed until another
    /// version is activated, stored events are unaffected
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the version does not exist
    pub fn deactivate_schema(
        &self,
        tenant_id: &TenantId,
        event_type: &str,
        version: u32,
    ) -> LedgerResult<()> {
        Ok(self.registry.deactivate(tenant_id, event_type, version)?)
    }

    /// Active schema version for an event type
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` when no version is active
    pub fn active_schema_version(&self, tenant_id: &TenantId, event_type: &str) -> LedgerResult<u32> {
        Ok(self.registry.active_version(tenant_id, event_type)?)
    }

    /// Every schema version registered for an event type, oldest first
    #[must_use]
    pub fn schema_versions(&self, tenant_id: &TenantId, event_type: &str) -> Vec<SchemaDefinition> {
        self.registry.versions(tenant_id, event_type)
    }

    /// Re-validate a stored event against the schema version it was
    /// written under, regardless of what is active now
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationFailed` or `NotFound`
    pub fn revalidate_event(&self, record: &EventRecord) -> LedgerResult<()> {
        self.registry
            .validate(
                &record.tenant_id,
                &record.event_type,
                VersionSelector::Pinned(record.schema_version),
                &record.payload,
            )
            .map(|_| ())
            .map_err(LedgerError::from)
    }

    // ---- system audit trail ----

    /// Install the built-in `system.audit` schema for a tenant
    ///
    /// Idempotent in effect: re-installing the identical schema is a
    /// `SchemaConflict`, which callers may treat as already-installed.
    ///
    /// # Errors
    ///
    /// Returns `SchemaConflict` when already installed
    pub fn install_system_audit_schema(&self, tenant_id: &TenantId) -> LedgerResult<u32> {
        Ok(self.registry.register(
            tenant_id,
            SYSTEM_AUDIT_EVENT_TYPE,
            system_audit_schema(),
            true,
            Some(ActorId::system()),
        )?)
    }

    /// Append an audit event to the tenant's reserved audit subject
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` until the audit schema is installed, or
    /// `SchemaValidationFailed` for a malformed audit payload
    pub fn record_audit(
        &self,
        tenant_id: &TenantId,
        payload: Value,
        actor: Option<ActorId>,
    ) -> LedgerResult<EventRecord> {
        self.append_event(
            tenant_id,
            &SubjectId::new(SYSTEM_AUDIT_SUBJECT),
            SYSTEM_AUDIT_EVENT_TYPE,
            EventTime::now(),
            payload,
            actor.or_else(|| Some(ActorId::system())),
        )
    }

    // ---- tenant-level reads ----

    /// Subjects with at least one event, sorted
    #[must_use]
    pub fn subjects(&self, tenant_id: &TenantId) -> Vec<SubjectId> {
        self.store.subjects(tenant_id)
    }

    /// All events of one type for a tenant
    #[must_use]
    pub fn events_by_type(&self, tenant_id: &TenantId, event_type: &str) -> Vec<EventRecord> {
        self.store.events_by_type(tenant_id, event_type)
    }

    /// How many stored events were written under a schema version
    #[must_use]
    pub fn count_by_schema_version(
        &self,
        tenant_id: &TenantId,
        event_type: &str,
        schema_version: u32,
    ) -> u64 {
        self.store
            .count_by_schema_version(tenant_id, event_type, schema_version)
    }

    /// Store statistics snapshot
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
