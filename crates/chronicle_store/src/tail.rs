//! Chain tails - the one piece of mutable shared state in the engine.
//!
//! A tail is the versioned cell `(last_sequence, last_link)` for one
//! subject. Appends read it, hash against it, and commit with a
//! conditional extend that re-checks it; two writers observing the same
//! tail can never both win.

use chronicle_core::{ChainLink, EventHash};
use serde::{Deserialize, Serialize};

/// The current end of a subject's chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTail {
    /// Sequence of the last committed event (0 for an empty chain)
    pub sequence: u64,
    /// Link the next event must carry as `previous_hash`
    pub link: ChainLink,
}

impl ChainTail {
    /// The tail of a subject with no events yet
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            sequence: 0,
            link: ChainLink::Genesis,
        }
    }

    /// Sequence number the next append will receive
    #[must_use]
    pub const fn next_sequence(&self) -> u64 {
        self.sequence + 1
    }

    /// The tail after committing an event with the given hash
    #[must_use]
    pub fn advanced(&self, hash: EventHash) -> Self {
        Self {
            sequence: self.sequence + 1,
            link: ChainLink::Hash(hash),
        }
    }

    /// Whether the chain is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sequence == 0
    }
}

impl Default for ChainTail {
    fn default() -> Self {
        Self::empty()
    }
}
