//! Error types for the sync layer.
//!
//! None of these are fatal: malformed messages are dropped at the decode
//! boundary, send failures make the affected batch best-effort-lost for
//! the tick, and digest mismatches are the normal reconciliation trigger
//! rather than an error at all.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An envelope failed to parse or carried an unknown tag. Dropped
    /// with a logged warning; never crashes the process.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Encoding an outgoing message failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transport could not deliver a message.
    #[error("send failed: {0}")]
    Send(String),

    /// No connected peers; the batch for this tick was discarded.
    #[error("transport disconnected")]
    Disconnected,

    /// The requested peer is not reachable.
    #[error("peer not found: {0}")]
    PeerNotFound(String),

    /// An internal channel closed.
    #[error("channel closed")]
    ChannelClosed,
}
