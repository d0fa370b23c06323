//! Chronicle Core Types
//!
//! This crate contains pure types and logic with no I/O: identifiers,
//! canonical payload encoding, the event hash chain, and timestamps.
//! Everything here is deterministic across processes and platforms.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod error;
pub mod hash;
pub mod id;
pub mod time;

// Re-exports
pub use canonical::canonicalize;
pub use error::{LedgerError, LedgerResult};
pub use hash::{ChainLink, EventHash, HashError, GENESIS};
pub use id::{ActorId, EventId, SnapshotId, SubjectId, TenantId};
pub use time::{EventTime, RecordedAt};
