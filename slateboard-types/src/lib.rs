//! Core type definitions for Slateboard.
//!
//! This crate defines the fundamental, transport-agnostic types used
//! throughout the sync core:
//! - Origin identifiers (one per participating peer)
//! - Logical-clock stamps and the per-session stamp factory
//! - Drawing operations and their stroke/label payloads
//!
//! Rendering, input capture, and the physical transport live outside this
//! workspace; the types here only carry what peers need to agree on a
//! shared, totally ordered operation history.

mod ids;
mod op;
mod stamp;

pub use ids::OriginId;
pub use op::{
    CapStyle, LabelPayload, Operation, OperationKind, OperationPayload, Point, Rect, Segment,
    StrokeColor, StrokePayload,
};
pub use stamp::{Stamp, StampClock, Timestamp};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An origin name that cannot participate in the stamp tie-break.
    #[error("invalid origin id: {0}")]
    InvalidOrigin(String),
}
