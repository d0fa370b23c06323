//! Chronicle Event Store
//!
//! The append-only repository at the heart of the ledger. Assigns
//! per-subject sequence numbers, enforces exactly-once linear chain
//! extension under concurrent writers, and rejects every update or delete
//! unconditionally. Events are created here and nowhere else.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod record;
pub mod store;
pub mod tail;

pub use record::EventRecord;
pub use store::{EventStore, StoreConfig, StoreError, StoreStats};
pub use tail::ChainTail;
