//! Identifier types for peers in the drawing mesh.
//!
//! An origin is identified by its advertised display name. Names order
//! lexicographically, which is what breaks ties between stamps issued at
//! the same wall-clock millisecond.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identity of the peer that originated an operation.
///
/// Ordering is lexicographic over the underlying name, which makes the
/// stamp tie-break deterministic across all peers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginId(String);

impl OriginId {
    /// Creates an origin ID from a display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a random origin identity for peers without a configured name.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the underlying name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OriginId {
    type Err = crate::Error;

    /// Parses a configured origin name. Empty or all-whitespace names are
    /// rejected: they would be indistinguishable in logs and in the
    /// lexicographic stamp tie-break.
    fn from_str(s: &str) -> crate::Result<Self> {
        if s.trim().is_empty() {
            return Err(crate::Error::InvalidOrigin("empty name".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for OriginId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
