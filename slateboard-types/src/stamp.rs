//! Logical-clock stamps for totally ordering drawing operations.
//!
//! A stamp pairs wall-clock time with the originating peer. Comparing by
//! time first and origin second gives a strict total order over all stamps
//! ever created, regardless of which peer created them or in what order
//! they arrived.

use crate::OriginId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock timestamp (milliseconds since the Unix epoch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Creates a timestamp at the current time.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(millis)
    }

    /// Creates a timestamp from raw milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the raw millisecond value.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }
}

/// The unique, globally comparable identity of an operation.
///
/// Total order: time first, origin name (lexicographic) as tie-break.
/// No two accepted operations share a stamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stamp {
    /// The peer that issued this stamp.
    pub origin: OriginId,
    /// Wall-clock time at issue.
    pub time: Timestamp,
}

/// 64-bit FNV prime used to mix the two identity hashes.
const FNV_PRIME_64: u64 = 0x0000_0100_0000_01b3;
const FNV_OFFSET_64: u64 = 0xcbf2_9ce4_8422_2325;

impl Stamp {
    /// Creates a stamp from an origin and a time.
    #[must_use]
    pub fn new(origin: OriginId, time: Timestamp) -> Self {
        Self { origin, time }
    }

    /// Stable identity hash combining both fields.
    ///
    /// Computed as `(time_hash ^ origin_hash) * FNV_PRIME` — the XOR is
    /// applied before the multiply. Only self-consistency matters: every
    /// peer computes the same value for the same `(origin, time)` pair,
    /// so digests built from these hashes are comparable across peers.
    #[must_use]
    pub fn identity_hash(&self) -> u64 {
        let time_hash = self.time.as_millis();
        let origin_hash = fnv1a(self.origin.as_str().as_bytes());
        (time_hash ^ origin_hash).wrapping_mul(FNV_PRIME_64)
    }
}

/// FNV-1a over a byte slice.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_64;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME_64);
    }
    hash
}

impl PartialOrd for Stamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Stamp {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.time.cmp(&other.time) {
            Ordering::Equal => self.origin.cmp(&other.origin),
            other => other,
        }
    }
}

impl std::fmt::Display for Stamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.origin, self.time.as_millis())
    }
}

/// Per-session stamp factory.
///
/// Issues strictly increasing stamps for locally originated operations:
/// if the wall clock has not advanced past the previous issue, the new
/// stamp is bumped one millisecond ahead instead.
#[derive(Debug, Clone)]
pub struct StampClock {
    origin: OriginId,
    last: Timestamp,
}

impl StampClock {
    /// Creates a clock for the given origin.
    #[must_use]
    pub fn new(origin: OriginId) -> Self {
        Self {
            origin,
            last: Timestamp::from_millis(0),
        }
    }

    /// The origin this clock issues stamps for.
    #[must_use]
    pub fn origin(&self) -> &OriginId {
        &self.origin
    }

    /// Issues the next stamp, guaranteed greater than any previous issue.
    pub fn next(&mut self) -> Stamp {
        let now = Timestamp::now();
        self.last = if now > self.last {
            now
        } else {
            Timestamp::from_millis(self.last.as_millis().saturating_add(1))
        };
        Stamp::new(self.origin.clone(), self.last)
    }
}
