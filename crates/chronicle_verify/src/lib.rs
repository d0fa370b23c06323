//! Hash chain verification for Chronicle.
//!
//! Re-walks a subject's chain from genesis, recomputing every hash and
//! checking every link, and reports what it found. A broken chain is a
//! finding, not an error: verification always completes and returns a
//! report, even over tampered data.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod report;
pub mod verifier;

pub use report::{Finding, FindingKind, TenantReport, VerificationReport};
pub use verifier::ChainVerifier;
