//! Ordered, deduplicated operation log for Slateboard.
//!
//! The log is the single source of truth for "what has this peer seen".
//! It maintains a strictly ascending, duplicate-free sequence of drawing
//! operations keyed by their stamps, and publishes three independent
//! notification streams so display, broadcast, and reconciliation
//! concerns can each subscribe without coupling to one another:
//!
//! - **new-tail** — an operation was appended at the end
//! - **out-of-order-insert** — a late arrival landed mid-sequence
//!   (subscribers typically re-render everything after it)
//! - **for-broadcast** — a locally originated operation should go out
//!   to peers
//!
//! Ingestion is idempotent: duplicate stamps are absorbed silently, so
//! the log tolerates a transport that drops, duplicates, or reorders
//! messages. The digest summarizes the log's stamp set so two peers can
//! cheaply decide whether they have diverged.

mod digest;
mod log;

pub use digest::LogDigest;
pub use log::{IngestOutcome, IngestSource, OperationLog, NOTIFY_CAPACITY};
