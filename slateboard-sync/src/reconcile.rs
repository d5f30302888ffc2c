//! Anti-entropy reconciliation.
//!
//! Divergence detection is pull-based: every operation broadcast carries
//! the sender's digest, and a receiver whose digest differs answers with
//! a reliable, point-to-point stamp request advertising everything it
//! already holds. The diverging sender then rebroadcasts the missing
//! operations in stamp order, so any peer overhearing the rebroadcast
//! benefits too. Lost requests and lost answers are not retried — the
//! next digest mismatch re-triggers the same repair path, giving
//! eventual (not bounded-time) convergence.

use crate::protocol::{OperationMessage, StampRequestMessage};
use slateboard_log::{LogDigest, OperationLog};
use std::collections::HashSet;
use tracing::debug;

/// Detects divergence and drives pull-based repair.
#[derive(Debug, Default)]
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    /// Creates a reconciliation engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compares a digest advertised by a peer against the local log.
    ///
    /// Returns the stamp request to send to that peer if the logs have
    /// diverged, or `None` if they agree. Divergence is a normal
    /// condition, not an error.
    #[must_use]
    pub fn observe(&self, log: &OperationLog, advertised: LogDigest) -> Option<StampRequestMessage> {
        let local = log.digest();
        if advertised == local {
            return None;
        }
        debug!(%local, %advertised, "digest mismatch, requesting repair");
        Some(StampRequestMessage {
            known_stamps: log.stamps(),
            requester_digest: local,
        })
    }

    /// Answers a stamp request with the operations the requester lacks,
    /// in ascending stamp order, each tagged with the current digest.
    ///
    /// The caller broadcasts these rather than unicasting them.
    /// Idempotent by construction: re-requested stamps the requester
    /// already ingested are absorbed as duplicates on their side.
    #[must_use]
    pub fn answer(
        &self,
        log: &OperationLog,
        request: &StampRequestMessage,
    ) -> Vec<OperationMessage> {
        let known: HashSet<_> = request.known_stamps.iter().cloned().collect();
        let digest = log.digest();
        let missing = log.missing_from(&known);
        if !missing.is_empty() {
            debug!(count = missing.len(), "answering stamp request");
        }
        missing
            .into_iter()
            .map(|op| OperationMessage::new(op, digest))
            .collect()
    }
}
