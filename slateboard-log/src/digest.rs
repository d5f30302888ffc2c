//! Log digest — a cheap divergence check between peers.
//!
//! The digest folds the identity hash of every stamp in the log, in the
//! log's canonical ascending order. Because the log is always sorted,
//! the fold is determined by the stamp *set* alone: two peers holding
//! the same stamps compute the same digest no matter what order the
//! operations arrived in. Payload bytes are deliberately not hashed —
//! per-operation identity is sufficient to detect divergence.

use serde::{Deserialize, Serialize};
use slateboard_types::Stamp;
use std::fmt;

const FOLD_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FOLD_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Summary hash over a log's ordered stamp sequence.
///
/// Equal digests mean equal logs, up to a negligible 64-bit collision
/// probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogDigest(u64);

impl LogDigest {
    /// The digest of an empty log.
    pub const EMPTY: Self = Self(FOLD_OFFSET);

    /// Computes the digest over stamps in canonical (ascending) order.
    #[must_use]
    pub fn over<'a>(stamps: impl IntoIterator<Item = &'a Stamp>) -> Self {
        stamps
            .into_iter()
            .fold(Self::EMPTY, |acc, stamp| acc.absorb(stamp))
    }

    /// Folds one more stamp into the digest.
    ///
    /// Valid only when `stamp` extends the canonical order at the tail;
    /// mid-sequence inserts require recomputing with [`LogDigest::over`].
    #[must_use]
    pub fn absorb(self, stamp: &Stamp) -> Self {
        Self((self.0 ^ stamp.identity_hash()).wrapping_mul(FOLD_PRIME))
    }

    /// Returns the raw digest value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for LogDigest {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for LogDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
