//! Verification findings and reports.

use chronicle_core::{EventId, SubjectId, TenantId};
use serde::{Deserialize, Serialize};

/// What kind of integrity defect a finding describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// The stored hash does not match a recomputation from stored fields
    HashMismatch,
    /// `previous_hash` does not equal the prior event's hash
    ChainBreak,
    /// The first event does not carry the genesis sentinel
    GenesisError,
    /// A sequence number is missing from the chain
    SequenceGap,
    /// A sequence number appears more than once
    SequenceDuplicate,
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::HashMismatch => "hash_mismatch",
            Self::ChainBreak => "chain_break",
            Self::GenesisError => "genesis_error",
            Self::SequenceGap => "sequence_gap",
            Self::SequenceDuplicate => "sequence_duplicate",
        };
        write!(f, "{s}")
    }
}

/// A single integrity defect located during a chain walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Defect classification
    pub kind: FindingKind,
    /// Sequence number where the defect was observed
    pub sequence_number: u64,
    /// The event carrying the defect, when one exists (gaps have none)
    pub event_id: Option<EventId>,
    /// Human-readable detail
    pub detail: String,
}

/// Result of verifying one subject's chain
///
/// `valid` is true iff `findings` is empty. An empty chain verifies valid
/// with `checked_count` zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Subject whose chain was walked
    pub subject_id: SubjectId,
    /// Whether the chain is intact
    pub valid: bool,
    /// How many events were examined
    pub checked_count: u64,
    /// Lowest sequence number with a defect, if any
    pub first_break_sequence: Option<u64>,
    /// Every defect found, in chain order
    pub findings: Vec<Finding>,
}

impl VerificationReport {
    /// A clean report over `checked_count` events
    #[must_use]
    pub fn clean(subject_id: SubjectId, checked_count: u64) -> Self {
        Self {
            subject_id,
            valid: true,
            checked_count,
            first_break_sequence: None,
            findings: Vec::new(),
        }
    }

    /// Build from accumulated findings
    #[must_use]
    pub fn from_findings(subject_id: SubjectId, checked_count: u64, findings: Vec<Finding>) -> Self {
        let first_break_sequence = findings.iter().map(|f| f.sequence_number).min();
        Self {
            subject_id,
            valid: findings.is_empty(),
            checked_count,
            first_break_sequence,
            findings,
        }
    }
}

/// Aggregated verification over every subject of a tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantReport {
    /// Tenant that was scanned
    pub tenant_id: TenantId,
    /// Subjects examined
    pub subject_count: u64,
    /// Events examined across all subjects
    pub checked_count: u64,
    /// Whether every chain is intact
    pub valid: bool,
    /// Per-subject reports, only for subjects with findings
    pub broken: Vec<VerificationReport>,
}
