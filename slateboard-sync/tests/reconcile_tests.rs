use pretty_assertions::{assert_eq, assert_ne};
use slateboard_log::{IngestSource, OperationLog};
use slateboard_sync::{ReconciliationEngine, StampRequestMessage};
use slateboard_types::{
    CapStyle, Operation, OperationKind, OperationPayload, OriginId, Point, Segment, Stamp,
    StrokeColor, StrokePayload, Timestamp,
};

fn stamp(origin: &str, millis: u64) -> Stamp {
    Stamp::new(OriginId::new(origin), Timestamp::from_millis(millis))
}

fn op(origin: &str, millis: u64) -> Operation {
    Operation::new(
        OperationKind::New,
        OperationPayload::Stroke(StrokePayload {
            segments: vec![Segment::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0))],
            width: 1.0,
            cap: CapStyle::Round,
            color: StrokeColor::Yellow,
        }),
        stamp(origin, millis),
    )
}

fn log_with(ops: &[Operation]) -> OperationLog {
    let mut log = OperationLog::new();
    for o in ops {
        log.ingest(o.clone(), IngestSource::Remote);
    }
    log
}

// ── Divergence detection ─────────────────────────────────────────

#[test]
fn matching_digests_need_no_repair() {
    let engine = ReconciliationEngine::new();
    let log = log_with(&[op("a", 1), op("b", 2)]);

    assert!(engine.observe(&log, log.digest()).is_none());
}

#[test]
fn mismatch_produces_a_request_with_our_stamps() {
    let engine = ReconciliationEngine::new();
    let log = log_with(&[op("a", 1), op("b", 2)]);
    let other = log_with(&[op("a", 1), op("b", 2), op("c", 3)]);

    let request = engine.observe(&log, other.digest()).expect("divergence");
    assert_eq!(request.known_stamps, log.stamps());
    assert_eq!(request.requester_digest, log.digest());
}

#[test]
fn empty_log_still_detects_divergence() {
    let engine = ReconciliationEngine::new();
    let empty = OperationLog::new();
    let other = log_with(&[op("a", 1)]);

    let request = engine.observe(&empty, other.digest()).expect("divergence");
    assert!(request.known_stamps.is_empty());
}

// ── Answering requests ───────────────────────────────────────────

#[test]
fn answer_returns_exactly_the_missing_operations_in_order() {
    let engine = ReconciliationEngine::new();
    let log = log_with(&[op("a", 1), op("a", 2), op("a", 3), op("a", 4)]);

    let request = StampRequestMessage {
        known_stamps: vec![stamp("a", 1), stamp("a", 3)],
        requester_digest: slateboard_log::LogDigest::EMPTY,
    };

    let answers = engine.answer(&log, &request);
    let stamps: Vec<_> = answers
        .iter()
        .map(|m| m.operation.stamp.to_string())
        .collect();
    assert_eq!(stamps, vec!["a@2", "a@4"]);
    for answer in &answers {
        assert_eq!(answer.digest, Some(log.digest()));
    }
}

#[test]
fn answer_is_empty_when_the_requester_has_everything() {
    let engine = ReconciliationEngine::new();
    let log = log_with(&[op("a", 1)]);

    let request = StampRequestMessage {
        known_stamps: log.stamps(),
        requester_digest: log.digest(),
    };
    assert!(engine.answer(&log, &request).is_empty());
}

// ── End-to-end convergence ───────────────────────────────────────

#[test]
fn divergent_peers_converge_after_one_round() {
    let engine = ReconciliationEngine::new();

    // Peer X has {S1, S3}; peer Y has {S1, S2, S3}.
    let mut x = log_with(&[op("p", 1), op("p", 3)]);
    let y = log_with(&[op("p", 1), op("p", 2), op("p", 3)]);
    assert_ne!(x.digest(), y.digest());

    // X sees Y's digest and issues a stamp request; Y answers; X ingests.
    let request = engine.observe(&x, y.digest()).expect("divergence");
    for answer in engine.answer(&y, &request) {
        x.ingest(answer.operation, IngestSource::Remote);
    }

    assert_eq!(x.stamps(), y.stamps());
    assert_eq!(x.digest(), y.digest());
}

#[test]
fn repeated_repair_rounds_are_idempotent() {
    let engine = ReconciliationEngine::new();

    let mut x = log_with(&[op("p", 1)]);
    let y = log_with(&[op("p", 1), op("p", 2)]);

    // Run the same repair twice; duplicates are absorbed by ingestion.
    for _ in 0..2 {
        let request = StampRequestMessage {
            known_stamps: vec![stamp("p", 1)],
            requester_digest: x.digest(),
        };
        for answer in engine.answer(&y, &request) {
            x.ingest(answer.operation, IngestSource::Remote);
        }
    }

    assert_eq!(x.len(), 2);
    assert_eq!(x.digest(), y.digest());
}

#[test]
fn gossip_answer_also_repairs_a_third_party() {
    let engine = ReconciliationEngine::new();

    let x = log_with(&[op("p", 1)]);
    let y = log_with(&[op("p", 1), op("p", 2)]);
    // Z overhears the rebroadcast answer meant for X.
    let mut z = OperationLog::new();

    let request = engine.observe(&x, y.digest()).expect("divergence");
    for answer in engine.answer(&y, &request) {
        z.ingest(answer.operation, IngestSource::Remote);
    }

    // Z picked up the delta it was also missing.
    assert!(z.contains(&stamp("p", 2)));
}
