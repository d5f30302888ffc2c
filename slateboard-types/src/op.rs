//! Drawing operations — the unit of replication between peers.
//!
//! An operation is immutable once created. `Edit` and `Delete` kinds
//! reference the stamp of a prior operation but are stored as ordinary
//! log entries; the log never mutates history, and interpreting those
//! kinds is left to the consumer. Label payloads are recognized but
//! currently have no processing semantics — the variant exists so a
//! future handler can be added without changing the operation shape.

use crate::{Stamp, StampClock};
use serde::{Deserialize, Serialize};

/// What an operation does to the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target")]
pub enum OperationKind {
    /// A new element.
    New,
    /// Edits the element created by the referenced stamp. Reserved:
    /// stored but not interpreted.
    Edit(Stamp),
    /// Deletes the element created by the referenced stamp. Reserved:
    /// stored but not interpreted.
    Delete(Stamp),
}

/// A 2-D point in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One straight piece of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}

/// Stroke cap style. A display concern carried opaquely by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapStyle {
    Butt,
    Round,
    Square,
}

/// Stroke color. A display concern carried opaquely by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeColor {
    Black,
    White,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

/// An ordered run of line segments plus presentation attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokePayload {
    /// The segments in draw order.
    pub segments: Vec<Segment>,
    /// Stroke width in board units.
    pub width: f32,
    /// Line cap style.
    pub cap: CapStyle,
    /// Stroke color.
    pub color: StrokeColor,
}

/// A text label placed on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPayload {
    /// Anchor position.
    pub position: Point,
    /// The label text.
    pub text: String,
    /// Bounding box of the rendered label.
    pub bounds: Rect,
    /// Rotation in radians.
    pub rotation: f32,
}

/// The payload of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "payload", content = "data")]
pub enum OperationPayload {
    /// A drawn stroke.
    Stroke(StrokePayload),
    /// A placed text label.
    Label(LabelPayload),
}

impl OperationPayload {
    /// Returns the stroke payload, if this is a stroke.
    #[must_use]
    pub fn as_stroke(&self) -> Option<&StrokePayload> {
        match self {
            Self::Stroke(s) => Some(s),
            Self::Label(_) => None,
        }
    }

    /// Returns the label payload, if this is a label.
    #[must_use]
    pub fn as_label(&self) -> Option<&LabelPayload> {
        match self {
            Self::Label(l) => Some(l),
            Self::Stroke(_) => None,
        }
    }
}

/// A single logged drawing action.
///
/// Operations are created once — locally from input or remotely from
/// deserialization — and never mutated. The stamp doubles as the log's
/// sort key and the operation's unique identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// What this operation does.
    pub kind: OperationKind,
    /// The drawn content.
    pub payload: OperationPayload,
    /// Unique, totally ordered identity.
    pub stamp: Stamp,
}

impl Operation {
    /// Creates an operation with an explicit stamp.
    #[must_use]
    pub fn new(kind: OperationKind, payload: OperationPayload, stamp: Stamp) -> Self {
        Self {
            kind,
            payload,
            stamp,
        }
    }

    /// Creates a new-stroke operation stamped by the given clock.
    #[must_use]
    pub fn new_stroke(clock: &mut StampClock, stroke: StrokePayload) -> Self {
        Self::new(
            OperationKind::New,
            OperationPayload::Stroke(stroke),
            clock.next(),
        )
    }

    /// Creates a new-label operation stamped by the given clock.
    #[must_use]
    pub fn new_label(clock: &mut StampClock, label: LabelPayload) -> Self {
        Self::new(
            OperationKind::New,
            OperationPayload::Label(label),
            clock.next(),
        )
    }
}
