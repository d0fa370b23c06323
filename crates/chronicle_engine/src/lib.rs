//! The Chronicle engine facade.
//!
//! One `Ledger` wires together the schema registry, the append-only event
//! store, the chain verifier and the state projector, and is the only
//! surface an API layer needs to hold. All operations return the core
//! error taxonomy unchanged.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod ledger;

pub use config::EngineConfig;
pub use ledger::{Ledger, LedgerBuilder};
