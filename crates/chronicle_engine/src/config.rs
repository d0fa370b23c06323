//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunables for a [`crate::Ledger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How often an append retries after losing the chain race
    pub max_append_retries: u32,
    /// Maximum canonical payload size in bytes (0 = unlimited)
    pub max_payload_bytes: usize,
    /// Page size for chain reads when the caller does not give one
    pub default_page_limit: usize,
    /// Refresh a subject's snapshot every N appends (None = never)
    pub snapshot_every: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_append_retries: 16,
            max_payload_bytes: 1024 * 1024,
            default_page_limit: 100,
            snapshot_every: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_append_retries, 16);
        assert_eq!(config.default_page_limit, 100);
        assert!(config.snapshot_every.is_none());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = EngineConfig {
            snapshot_every: Some(50),
            ..EngineConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
