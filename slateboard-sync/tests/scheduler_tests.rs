use slateboard_log::LogDigest;
use slateboard_sync::protocol::decode;
use slateboard_sync::transport::mock::MockTransport;
use slateboard_sync::{BroadcastScheduler, OperationMessage, SchedulerConfig, SyncMessage};
use slateboard_types::{
    CapStyle, Operation, OperationKind, OperationPayload, OriginId, Point, Segment, Stamp,
    StrokeColor, StrokePayload, Timestamp,
};
use std::time::Duration;

fn message(millis: u64) -> OperationMessage {
    let op = Operation::new(
        OperationKind::New,
        OperationPayload::Stroke(StrokePayload {
            segments: vec![Segment::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0))],
            width: 1.0,
            cap: CapStyle::Butt,
            color: StrokeColor::Orange,
        }),
        Stamp::new(OriginId::new("alice"), Timestamp::from_millis(millis)),
    );
    OperationMessage::new(op, LogDigest::EMPTY)
}

fn config(budget: u32) -> SchedulerConfig {
    SchedulerConfig {
        flush_interval: Duration::from_secs(1),
        max_rate_per_second: budget,
    }
}

fn sent_stamps(transport: &MockTransport) -> Vec<String> {
    transport
        .take_broadcasts()
        .iter()
        .map(|envelope| {
            let bytes = serde_json::to_vec(envelope).unwrap();
            match decode(&bytes).unwrap() {
                SyncMessage::Operation(msg) => msg.operation.stamp.to_string(),
                other => panic!("unexpected message: {other:?}"),
            }
        })
        .collect()
}

// ── Budget derivation ────────────────────────────────────────────

#[test]
fn default_budget_is_floor_of_rate_times_interval() {
    // 30 ops/s × 0.25 s = 7.5 → 7 per tick
    let config = SchedulerConfig::default();
    assert_eq!(config.flush_interval, Duration::from_millis(250));
    assert_eq!(config.max_rate_per_second, 30);
    assert_eq!(config.per_flush_budget(), 7);
}

#[test]
fn fractional_budget_still_makes_progress() {
    // 3 ops/s × 0.25 s = 0.75; the budget clamps to 1 so the queue
    // drains instead of stalling.
    let config = SchedulerConfig {
        flush_interval: Duration::from_millis(250),
        max_rate_per_second: 3,
    };
    assert_eq!(config.per_flush_budget(), 1);
}

#[tokio::test]
async fn clamped_budget_drains_one_per_tick() {
    let scheduler = BroadcastScheduler::new(SchedulerConfig {
        flush_interval: Duration::from_millis(250),
        max_rate_per_second: 3,
    });
    let transport = MockTransport::new();

    scheduler.enqueue(message(1));
    scheduler.enqueue(message(2));

    assert_eq!(scheduler.flush_tick(&transport).await, 1);
    assert_eq!(scheduler.flush_tick(&transport).await, 1);
    assert_eq!(scheduler.queue_len(), 0);
}

#[test]
fn budget_scales_with_interval() {
    let config = SchedulerConfig {
        flush_interval: Duration::from_millis(500),
        max_rate_per_second: 10,
    };
    assert_eq!(config.per_flush_budget(), 5);
}

// ── Rate limiting ────────────────────────────────────────────────

#[tokio::test]
async fn tick_sends_at_most_the_budget() {
    let scheduler = BroadcastScheduler::new(config(3));
    let transport = MockTransport::new();

    for t in 1..=10 {
        scheduler.enqueue(message(t));
    }

    let sent = scheduler.flush_tick(&transport).await;
    assert_eq!(sent, 3);
    assert_eq!(scheduler.queue_len(), 7);
    assert_eq!(sent_stamps(&transport), vec!["alice@1", "alice@2", "alice@3"]);
}

#[tokio::test]
async fn overflow_goes_out_on_later_ticks_in_order() {
    let scheduler = BroadcastScheduler::new(config(4));
    let transport = MockTransport::new();

    for t in 1..=10 {
        scheduler.enqueue(message(t));
    }

    assert_eq!(scheduler.flush_tick(&transport).await, 4);
    assert_eq!(scheduler.flush_tick(&transport).await, 4);
    assert_eq!(scheduler.flush_tick(&transport).await, 2);
    assert_eq!(scheduler.queue_len(), 0);

    let stamps = sent_stamps(&transport);
    let expected: Vec<_> = (1..=10).map(|t| format!("alice@{t}")).collect();
    assert_eq!(stamps, expected);
}

#[tokio::test]
async fn empty_queue_sends_nothing() {
    let scheduler = BroadcastScheduler::new(config(3));
    let transport = MockTransport::new();
    assert_eq!(scheduler.flush_tick(&transport).await, 0);
    assert_eq!(transport.broadcast_count(), 0);
}

// ── Disconnection ────────────────────────────────────────────────

#[tokio::test]
async fn disconnected_tick_discards_its_batch() {
    let scheduler = BroadcastScheduler::new(config(3));
    let transport = MockTransport::disconnected();

    for t in 1..=5 {
        scheduler.enqueue(message(t));
    }

    assert_eq!(scheduler.flush_tick(&transport).await, 0);
    // This tick's batch of 3 is gone; the remainder survives.
    assert_eq!(scheduler.queue_len(), 2);
    assert_eq!(transport.broadcast_count(), 0);
}

#[tokio::test]
async fn reconnection_resumes_with_the_survivors() {
    let scheduler = BroadcastScheduler::new(config(3));
    let transport = MockTransport::disconnected();

    for t in 1..=5 {
        scheduler.enqueue(message(t));
    }
    scheduler.flush_tick(&transport).await;

    transport.set_connected(true);
    assert_eq!(scheduler.flush_tick(&transport).await, 2);
    assert_eq!(sent_stamps(&transport), vec!["alice@4", "alice@5"]);
}

// ── Send failures ────────────────────────────────────────────────

#[tokio::test]
async fn send_failure_abandons_the_rest_of_the_batch() {
    let scheduler = BroadcastScheduler::new(config(3));
    let transport = MockTransport::new();
    transport.set_failing(true);

    for t in 1..=5 {
        scheduler.enqueue(message(t));
    }

    assert_eq!(scheduler.flush_tick(&transport).await, 0);
    // The failed batch is not retried; later arrivals still flow.
    assert_eq!(scheduler.queue_len(), 2);

    transport.set_failing(false);
    assert_eq!(scheduler.flush_tick(&transport).await, 2);
}
