//! Reducers fold events into state.
//!
//! A reducer must be a pure function of `(state, event)`: no clocks, no
//! randomness, no external reads. That purity is the whole replay
//! guarantee.

use std::collections::HashMap;
use std::sync::Arc;

use chronicle_store::EventRecord;
use serde_json::{Map, Value};

/// Folds one event into the accumulated state
pub trait Reducer: Send + Sync {
    /// Apply `event` to `state` in place
    fn apply(&self, state: &mut Map<String, Value>, event: &EventRecord);
}

/// Leaves state untouched
///
/// The registry default: event types nobody registered a reducer for
/// still count toward the projection cursor but contribute no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReducer;

impl Reducer for NoopReducer {
    fn apply(&self, _state: &mut Map<String, Value>, _event: &EventRecord) {}
}

/// Shallow-merges the event payload's top-level keys into state
///
/// Later events win key by key; keys absent from the payload are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeReducer;

impl Reducer for MergeReducer {
    fn apply(&self, state: &mut Map<String, Value>, event: &EventRecord) {
        if let Value::Object(fields) = &event.payload {
            for (key, value) in fields {
                state.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Replaces the whole state with the event payload
#[derive(Debug, Clone, Copy, Default)]
pub struct LastEventReducer;

impl Reducer for LastEventReducer {
    fn apply(&self, state: &mut Map<String, Value>, event: &EventRecord) {
        state.clear();
        if let Value::Object(fields) = &event.payload {
            state.extend(fields.clone());
        }
    }
}

/// Maps event types to reducers
pub struct ReducerRegistry {
    reducers: HashMap<String, Arc<dyn Reducer>>,
    default: Arc<dyn Reducer>,
}

impl ReducerRegistry {
    /// Create a registry whose unregistered types fall through to a no-op
    #[must_use]
    pub fn new() -> Self {
        Self {
            reducers: HashMap::new(),
            default: Arc::new(NoopReducer),
        }
    }

    /// Replace the fallback reducer for unregistered event types
    #[must_use]
    pub fn with_default(mut self, reducer: Arc<dyn Reducer>) -> Self {
        self.default = reducer;
        self
    }

    /// Register a reducer for an event type, replacing any previous one
    pub fn register(&mut self, event_type: impl Into<String>, reducer: Arc<dyn Reducer>) {
        self.reducers.insert(event_type.into(), reducer);
    }

    /// The reducer responsible for an event type
    #[must_use]
    pub fn reducer_for(&self, event_type: &str) -> &Arc<dyn Reducer> {
        self.reducers.get(event_type).unwrap_or(&self.default)
    }

    /// Event types with an explicit reducer
    #[must_use]
    pub fn registered_types(&self) -> Vec<&str> {
        self.reducers.keys().map(String::as_str).collect()
    }
}

impl Default for ReducerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::{
        ActorId, ChainLink, EventHash, EventId, EventTime, RecordedAt, SubjectId, TenantId,
    };
    use serde_json::json;

    fn event(event_type: &str, payload: Value) -> EventRecord {
        let tenant_id = TenantId::new("acme");
        let subject_id = SubjectId::new("s1");
        let event_time = EventTime::parse("2023-01-01T00:00:00Z").unwrap();
        let canonical = chronicle_core::canonicalize(&payload).unwrap();
        let hash = EventHash::compute(
            &tenant_id,
            &subject_id,
            event_type,
            &event_time,
            &canonical,
            &ChainLink::Genesis,
        );
        EventRecord {
            event_id: EventId::new(),
            tenant_id,
            subject_id,
            event_type: event_type.to_string(),
            schema_version: 1,
            event_time,
            recorded_at: RecordedAt::now(),
            sequence_number: 1,
            payload,
            hash,
            previous_hash: ChainLink::Genesis,
            actor: Some(ActorId::system()),
        }
    }

    #[test]
    fn test_merge_keeps_absent_keys() {
        let mut state = Map::new();
        MergeReducer.apply(&mut state, &event("a", json!({"x": 1, "y": 1})));
        MergeReducer.apply(&mut state, &event("a", json!({"y": 2})));
        assert_eq!(Value::Object(state), json!({"x": 1, "y": 2}));
    }

    #[test]
    fn test_last_event_replaces_state() {
        let mut state = Map::new();
        LastEventReducer.apply(&mut state, &event("a", json!({"x": 1, "y": 1})));
        LastEventReducer.apply(&mut state, &event("a", json!({"y": 2})));
        assert_eq!(Value::Object(state), json!({"y": 2}));
    }

    #[test]
    fn test_unregistered_type_is_noop() {
        let registry = ReducerRegistry::new();
        let mut state = Map::new();
        state.insert("kept".to_string(), json!(true));
        registry
            .reducer_for("nobody_registered_this")
            .apply(&mut state, &event("nobody_registered_this", json!({"x": 1})));
        assert_eq!(Value::Object(state), json!({"kept": true}));
    }

    #[test]
    fn test_registered_reducer_wins_over_default() {
        let mut registry = ReducerRegistry::new();
        registry.register("profile_updated", Arc::new(MergeReducer));
        let mut state = Map::new();
        registry
            .reducer_for("profile_updated")
            .apply(&mut state, &event("profile_updated", json!({"name": "Ada"})));
        assert_eq!(Value::Object(state), json!({"name": "Ada"}));
    }
}
