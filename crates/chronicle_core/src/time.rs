//! Time types for Chronicle.
//!
//! Two clocks matter to the ledger: `EventTime` is the business timestamp a
//! caller supplies (it may be historical and is part of the hash preimage),
//! `RecordedAt` is the ledger insertion time assigned at commit. Both are
//! UTC; the preimage formatting is fixed-width so hashes are reproducible.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Business timestamp of an event - part of the hash preimage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTime(DateTime<Utc>);

impl EventTime {
    /// Create from a UTC datetime
    #[must_use]
    pub const fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Current wall clock time
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parse from an RFC 3339 / ISO-8601 string
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimestamp` if the string does not parse
    pub fn parse(s: &str) -> LedgerResult<Self> {
        DateTime::parse_from_rfc3339(s)
            .map(|t| Self(t.with_timezone(&Utc)))
            .map_err(|e| LedgerError::InvalidTimestamp {
                reason: e.to_string(),
            })
    }

    /// Canonical ISO-8601 form used in the hash preimage
    ///
    /// Fixed microsecond precision with a `Z` suffix, so the same instant
    /// always formats to the same bytes.
    #[must_use]
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Get the inner datetime
    #[must_use]
    pub const fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for EventTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_iso8601())
    }
}

impl From<DateTime<Utc>> for EventTime {
    fn from(t: DateTime<Utc>) -> Self {
        Self(t)
    }
}

/// Ledger insertion time - metadata only, never part of the hash preimage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordedAt(DateTime<Utc>);

impl RecordedAt {
    /// Capture the current instant
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create from a UTC datetime
    #[must_use]
    pub const fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Canonical ISO-8601 form
    #[must_use]
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Get the inner datetime
    #[must_use]
    pub const fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for RecordedAt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_iso8601())
    }
}
