//! P2P broadcast scheduling and anti-entropy reconciliation for
//! Slateboard.
//!
//! Peers collaboratively build a shared, append-only log of drawing
//! operations over an unreliable, intermittently connected mesh without
//! a central server. This crate supplies everything above the log and
//! below the transport:
//!
//! - **Protocol**: wire envelope and messages (operation broadcasts
//!   carrying the sender's digest, point-to-point stamp requests)
//! - **Transport**: the trait the embedding application implements,
//!   plus a scriptable mock for tests
//! - **Scheduler**: rate-limited outgoing queue with re-queue-on-budget
//!   and discard-on-disconnect semantics
//! - **Reconciliation**: digest-compare, pull-missing repair of
//!   divergence between peers
//! - **Session**: dependency-injected wiring with an explicit
//!   init/teardown lifecycle — no ambient global state
//!
//! Delivery guarantees are deliberately asymmetric: operation broadcasts
//! are unreliable at-most-once (duplicates and reordering are absorbed
//! by ingestion), while stamp requests ride reliable point-to-point
//! delivery. A peer that misses everything still converges once any
//! digest it receives disagrees with its own.
//!
//! # Example
//!
//! ```
//! use slateboard_sync::{BoardSession, SchedulerConfig};
//! use slateboard_sync::transport::mock::MockTransport;
//! use slateboard_types::OriginId;
//! use std::sync::Arc;
//!
//! # async fn demo() {
//! let transport = Arc::new(MockTransport::new());
//! let session = BoardSession::new(
//!     OriginId::new("alice"),
//!     SchedulerConfig::default(),
//!     transport,
//! );
//! let flush = session.spawn_flush_loop();
//! // ... submit strokes, feed incoming bytes ...
//! session.shutdown();
//! let _ = flush.await;
//! # }
//! ```

mod error;
pub mod protocol;
mod reconcile;
mod scheduler;
mod session;
pub mod transport;

pub use error::{SyncError, SyncResult};
pub use protocol::{
    Envelope, MessageKind, OperationMessage, StampRequestMessage, SyncMessage, WIRE_VERSION,
};
pub use reconcile::ReconciliationEngine;
pub use scheduler::{BroadcastScheduler, SchedulerConfig};
pub use session::BoardSession;
pub use transport::PeerTransport;
