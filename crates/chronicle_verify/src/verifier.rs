//! The chain walker.

use chronicle_core::{ChainLink, SubjectId, TenantId};
use chronicle_store::{EventRecord, EventStore, StoreError};

use crate::report::{Finding, FindingKind, TenantReport, VerificationReport};

/// Verifies hash chains by recomputation from genesis
///
/// Stateless; one instance can serve any number of walks concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainVerifier;

impl ChainVerifier {
    /// Create a verifier
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Walk an ordered slice of events and report every defect
    ///
    /// The slice is expected to be one subject's full chain ordered by
    /// sequence number, starting at 1. An empty slice verifies valid.
    /// After a defect the walk resynchronizes on the stored values, so one
    /// tampered event yields localized findings rather than flagging the
    /// whole remainder of the chain.
    #[must_use]
    pub fn verify_events(&self, subject_id: &SubjectId, events: &[EventRecord]) -> VerificationReport {
        let mut findings = Vec::new();
        let mut expected_sequence: u64 = 1;
        let mut expected_previous = ChainLink::Genesis;

        for record in events {
            if record.sequence_number > expected_sequence {
                findings.push(Finding {
                    kind: FindingKind::SequenceGap,
                    sequence_number: expected_sequence,
                    event_id: None,
                    detail: format!(
                        "expected sequence {} but found {}",
                        expected_sequence, record.sequence_number
                    ),
                });
            } else if record.sequence_number < expected_sequence {
                findings.push(Finding {
                    kind: FindingKind::SequenceDuplicate,
                    sequence_number: record.sequence_number,
                    event_id: Some(record.event_id),
                    detail: format!(
                        "sequence {} out of order after {}",
                        record.sequence_number,
                        expected_sequence - 1
                    ),
                });
            }

            if record.previous_hash != expected_previous {
                let kind = if record.sequence_number == 1 {
                    FindingKind::GenesisError
                } else {
                    FindingKind::ChainBreak
                };
                findings.push(Finding {
                    kind,
                    sequence_number: record.sequence_number,
                    event_id: Some(record.event_id),
                    detail: format!(
                        "previous_hash {} does not match expected {}",
                        record.previous_hash.preimage(),
                        expected_previous.preimage()
                    ),
                });
            }

            match record.recompute_hash() {
                Ok(recomputed) if recomputed == record.hash => {}
                Ok(recomputed) => {
                    findings.push(Finding {
                        kind: FindingKind::HashMismatch,
                        sequence_number: record.sequence_number,
                        event_id: Some(record.event_id),
                        detail: format!(
                            "stored hash {} but recomputed {}",
                            record.hash.to_hex(),
                            recomputed.to_hex()
                        ),
                    });
                }
                Err(e) => {
                    findings.push(Finding {
                        kind: FindingKind::HashMismatch,
                        sequence_number: record.sequence_number,
                        event_id: Some(record.event_id),
                        detail: format!("hash recomputation failed: {e}"),
                    });
                }
            }

            // Resynchronize on what is stored, not what was expected
            expected_sequence = record.sequence_number + 1;
            expected_previous = ChainLink::Hash(record.hash);
        }

        let report =
            VerificationReport::from_findings(subject_id.clone(), events.len() as u64, findings);
        if !report.valid {
            tracing::warn!(
                subject = %subject_id,
                findings = report.findings.len(),
                first_break = ?report.first_break_sequence,
                "chain verification found defects"
            );
        }
        report
    }

    /// Verify one subject's chain as stored
    ///
    /// # Errors
    ///
    /// Returns `SubjectUnknown` for a subject never appended to
    pub fn verify(
        &self,
        store: &EventStore,
        tenant_id: &TenantId,
        subject_id: &SubjectId,
    ) -> Result<VerificationReport, StoreError> {
        let chain = store.chain(tenant_id, subject_id, None, None)?;
        Ok(self.verify_events(subject_id, &chain))
    }

    /// Verify every subject of a tenant
    ///
    /// Subjects with clean chains contribute only to the counters; their
    /// reports are dropped.
    #[must_use]
    pub fn verify_tenant(&self, store: &EventStore, tenant_id: &TenantId) -> TenantReport {
        let subjects = store.subjects(tenant_id);
        let mut checked_count = 0;
        let mut broken = Vec::new();
        for subject_id in &subjects {
            // A subject listed here always has a chain
            if let Ok(report) = self.verify(store, tenant_id, subject_id) {
                checked_count += report.checked_count;
                if !report.valid {
                    broken.push(report);
                }
            }
        }
        TenantReport {
            tenant_id: tenant_id.clone(),
            subject_count: subjects.len() as u64,
            checked_count,
            valid: broken.is_empty(),
            broken,
        }
    }
}
