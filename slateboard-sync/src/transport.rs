//! Transport layer abstraction.
//!
//! The core never manages discovery or session lifecycle; it only
//! observes a connected-peer-set signal and hands encoded envelopes to
//! whatever transport the embedding application provides. Operation
//! broadcasts ride unreliable, unordered, at-most-once delivery;
//! stamp requests require reliable point-to-point delivery.

use crate::error::SyncResult;
use crate::protocol::Envelope;
use async_trait::async_trait;
use slateboard_types::OriginId;

/// A peer transport that can fan out and unicast envelopes.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Whether any peers are currently connected. Read-only input to the
    /// scheduler; the core never mutates connection state.
    fn is_connected(&self) -> bool;

    /// Broadcasts an envelope to all connected peers.
    ///
    /// Unreliable: the transport may drop or duplicate the frame.
    /// Duplicates are absorbed by ingestion on the receiving side.
    async fn broadcast(&self, envelope: Envelope) -> SyncResult<()>;

    /// Sends an envelope reliably to a specific peer.
    async fn send_to(&self, peer: &OriginId, envelope: Envelope) -> SyncResult<()>;
}

/// A mock transport for testing.
pub mod mock {
    use super::*;
    use crate::error::SyncError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Records every send and exposes scriptable connectivity/failures.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        connected: AtomicBool,
        failing: AtomicBool,
        broadcasts: Mutex<Vec<Envelope>>,
        unicasts: Mutex<Vec<(OriginId, Envelope)>>,
    }

    impl MockTransport {
        /// Creates a connected mock transport.
        pub fn new() -> Self {
            Self {
                connected: AtomicBool::new(true),
                ..Default::default()
            }
        }

        /// Creates a disconnected mock transport.
        pub fn disconnected() -> Self {
            Self::default()
        }

        /// Scripts the connected-peer-set signal.
        pub fn set_connected(&self, connected: bool) {
            self.connected.store(connected, Ordering::SeqCst);
        }

        /// Makes every subsequent send fail.
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Envelopes broadcast so far.
        pub fn broadcasts(&self) -> Vec<Envelope> {
            self.broadcasts.lock().unwrap().clone()
        }

        /// Number of envelopes broadcast so far.
        pub fn broadcast_count(&self) -> usize {
            self.broadcasts.lock().unwrap().len()
        }

        /// Envelopes unicast so far, with their destination.
        pub fn unicasts(&self) -> Vec<(OriginId, Envelope)> {
            self.unicasts.lock().unwrap().clone()
        }

        /// Drains and returns the recorded broadcasts.
        pub fn take_broadcasts(&self) -> Vec<Envelope> {
            std::mem::take(&mut *self.broadcasts.lock().unwrap())
        }
    }

    #[async_trait]
    impl PeerTransport for MockTransport {
        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn broadcast(&self, envelope: Envelope) -> SyncResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(SyncError::Send("mock send failure".into()));
            }
            self.broadcasts.lock().unwrap().push(envelope);
            Ok(())
        }

        async fn send_to(&self, peer: &OriginId, envelope: Envelope) -> SyncResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(SyncError::Send("mock send failure".into()));
            }
            self.unicasts.lock().unwrap().push((peer.clone(), envelope));
            Ok(())
        }
    }
}
