//! The operation log and its ingestion/merge algorithm.

use crate::LogDigest;
use slateboard_types::{Operation, Stamp};
use std::collections::HashSet;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Capacity of each notification stream. Subscribers that lag beyond
/// this lose the oldest notifications rather than blocking ingestion.
pub const NOTIFY_CAPACITY: usize = 256;

/// Where an ingested operation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestSource {
    /// Created on this peer from user input.
    Local,
    /// Received from another peer over the transport.
    Remote,
}

/// What `ingest` did with an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Appended at the tail (the common, in-order case).
    Appended,
    /// Inserted mid-sequence to absorb a late arrival.
    Inserted,
    /// Already present; nothing changed and nothing was emitted.
    Duplicate,
}

/// The ascending, duplicate-free sequence of operations a peer has
/// accepted.
///
/// All mutation goes through [`ingest`](OperationLog::ingest). The log is
/// a plain synchronous structure; callers that share it across tasks put
/// it behind a single owner (the session wraps it in a `tokio::sync::Mutex`)
/// so the ascending/duplicate-free invariant never races.
#[derive(Debug)]
pub struct OperationLog {
    /// Operations in strictly ascending stamp order.
    entries: Vec<Operation>,
    /// Stamp index for O(1) duplicate detection.
    seen: HashSet<Stamp>,
    /// Cached digest over the current stamp sequence.
    digest: LogDigest,
    new_tail_tx: broadcast::Sender<Operation>,
    inserted_tx: broadcast::Sender<Operation>,
    broadcast_tx: broadcast::Sender<Operation>,
}

impl OperationLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        let (new_tail_tx, _) = broadcast::channel(NOTIFY_CAPACITY);
        let (inserted_tx, _) = broadcast::channel(NOTIFY_CAPACITY);
        let (broadcast_tx, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            entries: Vec::new(),
            seen: HashSet::new(),
            digest: LogDigest::EMPTY,
            new_tail_tx,
            inserted_tx,
            broadcast_tx,
        }
    }

    /// Accepts an operation from any origin, maintaining the total-order,
    /// duplicate-free invariant.
    ///
    /// - Appends when the stamp extends the tail, notifying **new-tail**
    ///   subscribers.
    /// - Silently absorbs duplicates (same stamp already present).
    /// - Inserts late arrivals at the position that keeps the sequence
    ///   ascending, notifying **out-of-order-insert** subscribers so
    ///   derived views can re-render.
    ///
    /// Locally originated operations are additionally emitted on the
    /// **for-broadcast** stream, wherever they land.
    pub fn ingest(&mut self, op: Operation, source: IngestSource) -> IngestOutcome {
        if self.seen.contains(&op.stamp) {
            trace!(stamp = %op.stamp, "duplicate stamp absorbed");
            return IngestOutcome::Duplicate;
        }

        let outcome = match self.entries.last() {
            None => self.append(op.clone()),
            Some(last) if op.stamp > last.stamp => self.append(op.clone()),
            Some(_) => self.insert_mid(op.clone()),
        };

        if source == IngestSource::Local {
            let _ = self.broadcast_tx.send(op);
        }

        outcome
    }

    fn append(&mut self, op: Operation) -> IngestOutcome {
        self.seen.insert(op.stamp.clone());
        self.digest = self.digest.absorb(&op.stamp);
        self.entries.push(op.clone());
        let _ = self.new_tail_tx.send(op);
        IngestOutcome::Appended
    }

    fn insert_mid(&mut self, op: Operation) -> IngestOutcome {
        // Duplicates were already filtered by the index, so the search
        // always yields an insertion point.
        let pos = match self
            .entries
            .binary_search_by(|existing| existing.stamp.cmp(&op.stamp))
        {
            Ok(pos) | Err(pos) => pos,
        };
        debug!(stamp = %op.stamp, pos, len = self.entries.len(), "out-of-order insert");

        self.seen.insert(op.stamp.clone());
        self.entries.insert(pos, op.clone());
        self.digest = LogDigest::over(self.entries.iter().map(|o| &o.stamp));
        let _ = self.inserted_tx.send(op);
        IngestOutcome::Inserted
    }

    // ── Notification streams ─────────────────────────────────────

    /// Subscribes to operations appended at the tail.
    pub fn subscribe_new_tail(&self) -> broadcast::Receiver<Operation> {
        self.new_tail_tx.subscribe()
    }

    /// Subscribes to operations inserted mid-sequence.
    pub fn subscribe_inserted(&self) -> broadcast::Receiver<Operation> {
        self.inserted_tx.subscribe()
    }

    /// Subscribes to locally originated operations destined for peers.
    pub fn subscribe_broadcast(&self) -> broadcast::Receiver<Operation> {
        self.broadcast_tx.subscribe()
    }

    // ── Accessors ────────────────────────────────────────────────

    /// Number of accepted operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The accepted operations in ascending stamp order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.entries
    }

    /// The accepted stamps in ascending order.
    #[must_use]
    pub fn stamps(&self) -> Vec<Stamp> {
        self.entries.iter().map(|op| op.stamp.clone()).collect()
    }

    /// Whether a stamp has been accepted.
    #[must_use]
    pub fn contains(&self, stamp: &Stamp) -> bool {
        self.seen.contains(stamp)
    }

    /// The current digest over the log's stamp sequence.
    #[must_use]
    pub fn digest(&self) -> LogDigest {
        self.digest
    }

    /// Operations a peer with the given known-stamp set is missing,
    /// in ascending stamp order.
    #[must_use]
    pub fn missing_from(&self, known: &HashSet<Stamp>) -> Vec<Operation> {
        self.entries
            .iter()
            .filter(|op| !known.contains(&op.stamp))
            .cloned()
            .collect()
    }
}

impl Default for OperationLog {
    fn default() -> Self {
        Self::new()
    }
}
