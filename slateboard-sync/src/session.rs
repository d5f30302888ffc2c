//! Board session — dependency-injected wiring of log, scheduler,
//! reconciler, and transport.
//!
//! One session owns one peer's view of the shared board for the lifetime
//! of the process; dropping it loses all history (persistence is an
//! explicit non-goal). All ingestion, local and remote, is serialized
//! through the session's single log owner so the log's invariants never
//! race.

use crate::error::SyncResult;
use crate::protocol::{self, OperationMessage, SyncMessage};
use crate::reconcile::ReconciliationEngine;
use crate::scheduler::{BroadcastScheduler, SchedulerConfig};
use crate::transport::PeerTransport;
use slateboard_log::{IngestOutcome, IngestSource, LogDigest, OperationLog};
use slateboard_types::{LabelPayload, Operation, OriginId, Stamp, StampClock, StrokePayload};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{info, warn};

/// A live drawing session on the peer mesh.
pub struct BoardSession {
    origin: OriginId,
    clock: Mutex<StampClock>,
    log: Mutex<OperationLog>,
    scheduler: BroadcastScheduler,
    reconciler: ReconciliationEngine,
    transport: Arc<dyn PeerTransport>,
    shutdown_tx: watch::Sender<bool>,
}

impl BoardSession {
    /// Creates a session for the given origin over the given transport.
    #[must_use]
    pub fn new(
        origin: OriginId,
        config: SchedulerConfig,
        transport: Arc<dyn PeerTransport>,
    ) -> Arc<Self> {
        let (shutdown_tx, _) = watch::channel(false);
        Arc::new(Self {
            clock: Mutex::new(StampClock::new(origin.clone())),
            origin,
            log: Mutex::new(OperationLog::new()),
            scheduler: BroadcastScheduler::new(config),
            reconciler: ReconciliationEngine::new(),
            transport,
            shutdown_tx,
        })
    }

    /// This peer's origin identity.
    #[must_use]
    pub fn local_origin(&self) -> &OriginId {
        &self.origin
    }

    /// The current log digest.
    pub async fn digest(&self) -> LogDigest {
        self.log.lock().await.digest()
    }

    /// Number of operations accepted so far.
    pub async fn log_len(&self) -> usize {
        self.log.lock().await.len()
    }

    /// Snapshot of the accepted operations in stamp order.
    pub async fn operations(&self) -> Vec<Operation> {
        self.log.lock().await.operations().to_vec()
    }

    /// Messages waiting in the outgoing queue.
    #[must_use]
    pub fn pending_broadcasts(&self) -> usize {
        self.scheduler.queue_len()
    }

    /// Subscribes to operations appended at the log tail (display feed).
    pub async fn subscribe_new_tail(&self) -> broadcast::Receiver<Operation> {
        self.log.lock().await.subscribe_new_tail()
    }

    /// Subscribes to mid-sequence inserts (full re-render trigger).
    pub async fn subscribe_inserted(&self) -> broadcast::Receiver<Operation> {
        self.log.lock().await.subscribe_inserted()
    }

    /// Subscribes to locally originated operations destined for peers.
    /// Embedders running a second transport (or mirroring traffic) tap
    /// this; the session's own scheduler is fed synchronously in
    /// [`submit_stroke`](Self::submit_stroke) and does not consume it.
    pub async fn subscribe_broadcast(&self) -> broadcast::Receiver<Operation> {
        self.log.lock().await.subscribe_broadcast()
    }

    // ── Local input ──────────────────────────────────────────────

    /// Submits a locally drawn stroke: stamps it, ingests it, and queues
    /// it for broadcast. Returns the stamp assigned to the operation.
    pub async fn submit_stroke(&self, stroke: StrokePayload) -> Stamp {
        let op = {
            let mut clock = self.clock.lock().await;
            Operation::new_stroke(&mut clock, stroke)
        };
        self.ingest_local(op).await
    }

    /// Submits a locally placed label. Labels are logged and replicated;
    /// interpreting them is left to a future handler.
    pub async fn submit_label(&self, label: LabelPayload) -> Stamp {
        let op = {
            let mut clock = self.clock.lock().await;
            Operation::new_label(&mut clock, label)
        };
        self.ingest_local(op).await
    }

    // Feeds the scheduler directly rather than through the log's
    // for-broadcast stream: the message must carry the digest as of this
    // ingest, and the queue effect must be visible when submit returns.
    // The stream still fires for external subscribers.
    async fn ingest_local(&self, op: Operation) -> Stamp {
        let stamp = op.stamp.clone();
        let mut log = self.log.lock().await;
        log.ingest(op.clone(), IngestSource::Local);
        self.scheduler
            .enqueue(OperationMessage::new(op, log.digest()));
        stamp
    }

    // ── Remote input ─────────────────────────────────────────────

    /// Handles raw bytes received from a peer.
    ///
    /// Malformed frames are logged and dropped — the returned error is
    /// informational and never fatal. Well-formed operations are
    /// ingested idempotently; a digest mismatch triggers a reliable
    /// stamp request back to the sender; stamp requests are answered by
    /// queueing the missing operations for broadcast.
    pub async fn handle_incoming(&self, bytes: &[u8], from: &OriginId) -> SyncResult<()> {
        let message = match protocol::decode(bytes) {
            Ok(message) => message,
            Err(e) => {
                warn!(peer = %from, "dropping malformed message: {e}");
                return Err(e);
            }
        };

        match message {
            SyncMessage::Operation(msg) => self.handle_operation(msg, from).await,
            SyncMessage::StampRequest(request) => {
                let answers = {
                    let log = self.log.lock().await;
                    self.reconciler.answer(&log, &request)
                };
                for answer in answers {
                    self.scheduler.enqueue(answer);
                }
                Ok(())
            }
        }
    }

    async fn handle_operation(&self, msg: OperationMessage, from: &OriginId) -> SyncResult<()> {
        let request = {
            let mut log = self.log.lock().await;
            let outcome = log.ingest(msg.operation, IngestSource::Remote);
            if outcome == IngestOutcome::Inserted {
                info!(peer = %from, "absorbed late-arriving operation");
            }
            msg.digest
                .and_then(|advertised| self.reconciler.observe(&log, advertised))
        };

        if let Some(request) = request {
            let envelope = protocol::to_envelope(&SyncMessage::StampRequest(request))?;
            if let Err(e) = self.transport.send_to(from, envelope).await {
                // Not retried: the next digest mismatch re-triggers repair.
                warn!(peer = %from, "stamp request failed: {e}");
            }
        }
        Ok(())
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Runs one scheduler flush tick. Exposed for deterministic tests;
    /// production callers use [`spawn_flush_loop`](Self::spawn_flush_loop).
    pub async fn flush_once(&self) -> usize {
        self.scheduler.flush_tick(self.transport.as_ref()).await
    }

    /// Spawns the periodic flush loop. The task ends when
    /// [`shutdown`](Self::shutdown) is called or the session is dropped.
    pub fn spawn_flush_loop(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let session = Arc::clone(self);
        let shutdown = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            session
                .scheduler
                .run(session.transport.as_ref(), shutdown)
                .await;
        })
    }

    /// Stops the flush loop. In-flight sends for the current tick are
    /// abandoned; durable log state is unaffected.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
