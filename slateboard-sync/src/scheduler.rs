//! Outgoing broadcast scheduler.
//!
//! Buffers operations destined for peers and drains them on a periodic
//! flush tick, sending at most `per_flush_budget` per tick so an
//! unreliable, bandwidth-constrained transport is never flooded.
//! Operations beyond the budget stay queued in arrival order; a tick
//! that fires while disconnected discards its batch (at-most-once,
//! best-effort — reconciliation is the backstop for eventual delivery).

use crate::protocol::{self, OperationMessage, SyncMessage};
use crate::transport::PeerTransport;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Configuration for the broadcast scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often the outgoing queue is flushed.
    pub flush_interval: Duration,
    /// Maximum operations handed to the transport per second.
    pub max_rate_per_second: u32,
}

impl SchedulerConfig {
    /// Operations allowed per flush tick.
    ///
    /// Never less than 1: a rate/interval combination whose product
    /// rounds down to zero would otherwise leave the queue stuck.
    #[must_use]
    pub fn per_flush_budget(&self) -> usize {
        let budget =
            (f64::from(self.max_rate_per_second) * self.flush_interval.as_secs_f64()).floor();
        (budget as usize).max(1)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_millis(250),
            max_rate_per_second: 30,
        }
    }
}

/// Rate-limited FIFO of outgoing operation messages.
pub struct BroadcastScheduler {
    config: SchedulerConfig,
    queue: Mutex<VecDeque<OperationMessage>>,
}

impl BroadcastScheduler {
    /// Creates a scheduler with the given configuration.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// The scheduler's configuration.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Queues an operation message for broadcast. Never drops; anything
    /// over this tick's budget goes out on a later tick.
    pub fn enqueue(&self, message: OperationMessage) {
        self.queue.lock().unwrap().push_back(message);
    }

    /// Number of messages currently queued.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Runs one flush tick against the transport. Returns how many
    /// messages were handed to the transport.
    ///
    /// Drains up to the per-tick budget in arrival order. If the
    /// transport reports no connected peers, the drained batch is
    /// discarded. A send failure abandons the rest of the batch for
    /// this tick; it is not retried.
    pub async fn flush_tick(&self, transport: &dyn PeerTransport) -> usize {
        let batch: Vec<OperationMessage> = {
            let mut queue = self.queue.lock().unwrap();
            let budget = self.config.per_flush_budget().min(queue.len());
            queue.drain(..budget).collect()
        };

        if batch.is_empty() {
            return 0;
        }

        if !transport.is_connected() {
            debug!(discarded = batch.len(), "flush tick while disconnected");
            return 0;
        }

        let mut sent = 0;
        for message in batch {
            let stamp = message.operation.stamp.clone();
            let envelope = match protocol::to_envelope(&SyncMessage::Operation(message)) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!(%stamp, "failed to encode outgoing operation: {e}");
                    continue;
                }
            };
            if let Err(e) = transport.broadcast(envelope).await {
                warn!(%stamp, "broadcast failed, dropping remainder of batch: {e}");
                break;
            }
            sent += 1;
        }
        sent
    }

    /// Runs the periodic flush loop until `shutdown` flips to true.
    pub async fn run(
        &self,
        transport: &dyn PeerTransport,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(self.config.flush_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.flush_tick(transport).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("broadcast scheduler shutting down");
                        return;
                    }
                }
            }
        }
    }
}
