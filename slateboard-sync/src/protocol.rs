//! Wire protocol messages and the transport envelope.
//!
//! Every message that carries data is paired with the sender's current
//! log digest so a receiver can cheaply decide whether to reconcile.
//! The envelope tags messages with a numeric kind (0 = stroke operation,
//! 1 = label operation, 2 = stamp request) and an explicit version so
//! unknown or corrupt frames become a recoverable decode error instead
//! of a crash.

use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use slateboard_log::LogDigest;
use slateboard_types::{Operation, OperationPayload, Stamp};

/// Wire protocol version for compatibility checking.
pub const WIRE_VERSION: u32 = 1;

/// Numeric message kind carried in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageKind {
    /// A stroke operation broadcast.
    StrokeOperation = 0,
    /// A label operation broadcast.
    LabelOperation = 1,
    /// A point-to-point stamp request.
    StampRequest = 2,
}

impl MessageKind {
    /// Parses a wire tag into a kind.
    pub fn from_tag(tag: u8) -> SyncResult<Self> {
        match tag {
            0 => Ok(Self::StrokeOperation),
            1 => Ok(Self::LabelOperation),
            2 => Ok(Self::StampRequest),
            other => Err(SyncError::MalformedMessage(format!(
                "unknown message tag: {other}"
            ))),
        }
    }
}

/// An operation paired with the sender's current digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationMessage {
    /// The operation being broadcast.
    pub operation: Operation,
    /// The sender's log digest at send time, if known.
    pub digest: Option<LogDigest>,
}

impl OperationMessage {
    /// Creates an operation message tagged with the sender's digest.
    #[must_use]
    pub fn new(operation: Operation, digest: LogDigest) -> Self {
        Self {
            operation,
            digest: Some(digest),
        }
    }

    /// The envelope kind for this message's payload variant.
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self.operation.payload {
            OperationPayload::Stroke(_) => MessageKind::StrokeOperation,
            OperationPayload::Label(_) => MessageKind::LabelOperation,
        }
    }
}

/// Pull request for missing operations, sent reliably point-to-point.
///
/// The requester advertises the stamps it already holds together with
/// its digest; the responder computes the exact delta and answers by
/// broadcasting the missing operations in stamp order, so any peer
/// overhearing the rebroadcast also benefits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampRequestMessage {
    /// Stamps the requester already has.
    pub known_stamps: Vec<Stamp>,
    /// The requester's digest at request time.
    pub requester_digest: LogDigest,
}

/// A decoded sync protocol message.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncMessage {
    /// An operation broadcast (stroke or label).
    Operation(OperationMessage),
    /// A stamp request.
    StampRequest(StampRequestMessage),
}

impl SyncMessage {
    /// The envelope kind for this message.
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Operation(msg) => msg.kind(),
            Self::StampRequest(_) => MessageKind::StampRequest,
        }
    }
}

/// The transport-agnostic wire frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Protocol version.
    pub version: u32,
    /// Numeric message kind (see [`MessageKind`]).
    pub kind: u8,
    /// Serialized message payload.
    pub payload: Vec<u8>,
}

/// Wraps a message in a wire envelope.
pub fn to_envelope(message: &SyncMessage) -> SyncResult<Envelope> {
    let payload = match message {
        SyncMessage::Operation(msg) => serde_json::to_vec(msg)?,
        SyncMessage::StampRequest(msg) => serde_json::to_vec(msg)?,
    };
    Ok(Envelope {
        version: WIRE_VERSION,
        kind: message.kind() as u8,
        payload,
    })
}

/// Encodes a message into envelope bytes.
pub fn encode(message: &SyncMessage) -> SyncResult<Vec<u8>> {
    Ok(serde_json::to_vec(&to_envelope(message)?)?)
}

/// Decodes envelope bytes into a message.
///
/// Any failure — unparseable frame, unsupported version, unknown tag,
/// corrupt payload — is reported as [`SyncError::MalformedMessage`].
pub fn decode(bytes: &[u8]) -> SyncResult<SyncMessage> {
    let envelope: Envelope = serde_json::from_slice(bytes)
        .map_err(|e| SyncError::MalformedMessage(format!("bad envelope: {e}")))?;

    if envelope.version != WIRE_VERSION {
        return Err(SyncError::MalformedMessage(format!(
            "unsupported wire version: {}",
            envelope.version
        )));
    }

    match MessageKind::from_tag(envelope.kind)? {
        MessageKind::StrokeOperation | MessageKind::LabelOperation => {
            let msg: OperationMessage = serde_json::from_slice(&envelope.payload)
                .map_err(|e| SyncError::MalformedMessage(format!("bad operation payload: {e}")))?;
            Ok(SyncMessage::Operation(msg))
        }
        MessageKind::StampRequest => {
            let msg: StampRequestMessage = serde_json::from_slice(&envelope.payload)
                .map_err(|e| SyncError::MalformedMessage(format!("bad stamp request: {e}")))?;
            Ok(SyncMessage::StampRequest(msg))
        }
    }
}
