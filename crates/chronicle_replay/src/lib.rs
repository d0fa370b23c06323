//! Deterministic state projection for Chronicle.
//!
//! Current state is never stored; it is a fold over a subject's chain.
//! Replaying the same events through the same reducers always yields the
//! same state, which is what makes snapshots safe to use: a snapshot is a
//! cache of a replay prefix, verified against its own state hash and
//! discarded the moment it disagrees with the log.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod projector;
pub mod reducer;
pub mod snapshot;

pub use projector::{AsOf, ProjectedState, StateProjector};
pub use reducer::{LastEventReducer, MergeReducer, NoopReducer, Reducer, ReducerRegistry};
pub use snapshot::{Snapshot, SnapshotStore};
