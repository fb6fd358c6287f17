//! Tests for the update/flush state machine driven through `Monitor`.

mod common;

use common::*;
use hist_listener::flush::{FlushScheduler, DEFAULT_FLUSH_INTERVAL};
use hist_listener::histogram::aggregate::AggregateError;
use hist_listener::histogram::decode::DecodeError;
use hist_listener::monitor::{HandleOutcome, Monitor};
use std::time::{Duration, Instant};

fn monitor_at(t0: Instant) -> Monitor<RecordingRenderer> {
    Monitor::new(
        TOPIC,
        FlushScheduler::starting_at(t0, DEFAULT_FLUSH_INTERVAL),
        RecordingRenderer::default(),
    )
}

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

#[test]
fn two_channels_then_flush() {
    let t0 = Instant::now();
    let mut monitor = monitor_at(t0);

    let first = monitor.handle(&msg(1, GEOMETRY, "[1,1,1]", 10, "[0,5]"), t0 + secs(1.0));
    assert_eq!(first, HandleOutcome::Stored { channel: 1 });

    let second = monitor.handle(&msg(2, GEOMETRY, "[1,1,1]", 20, "[0,7]"), t0 + secs(6.0));
    let view = match second {
        HandleOutcome::Flushed { channel: 2, view } => view,
        other => panic!("expected flush, got {other:?}"),
    };
    assert_eq!(view.combined_counts, vec![2.0, 2.0, 2.0]);
    assert_eq!(view.grand_total_seen, 30);
    assert_eq!(view.mean_representative_timestamp, 6.0);
    assert_eq!(view.channel_count, 2);
    assert_eq!(view.included_triggers, 6.0);

    let renderer = monitor.into_renderer();
    assert_eq!(renderer.views, vec![view]);
}

#[test]
fn no_flush_at_exact_interval() {
    let t0 = Instant::now();
    let mut monitor = monitor_at(t0);
    let outcome = monitor.handle(&msg(1, GEOMETRY, "[1,1,1]", 1, "[0,1]"), t0 + secs(5.0));
    assert_eq!(outcome, HandleOutcome::Stored { channel: 1 });
    assert!(monitor.renderer().views.is_empty());
}

#[test]
fn decode_failure_leaves_store_untouched() {
    let t0 = Instant::now();
    let mut monitor = monitor_at(t0);
    monitor.handle(&msg(1, GEOMETRY, "[1,1,1]", 1, "[0,1]"), t0);

    let bad = msg(1, GEOMETRY, "[9,9]", 99, "[0,1]");
    let outcome = monitor.handle(&bad, t0 + secs(1.0));
    assert_eq!(
        outcome,
        HandleOutcome::Rejected(DecodeError::GeometryMismatch { expected: 3, actual: 2 })
    );

    let entry = monitor.store().entry(1).unwrap();
    assert_eq!(entry.current.counts, vec![1.0, 1.0, 1.0]);
    assert_eq!(entry.current.total_seen, 1);
    assert_eq!(monitor.stats().messages_rejected, 1);
    assert_eq!(monitor.stats().messages_decoded, 1);
}

#[test]
fn rejected_message_never_flushes() {
    let t0 = Instant::now();
    let mut monitor = monitor_at(t0);
    monitor.handle(&msg(1, GEOMETRY, "[1,1,1]", 1, "[0,1]"), t0);
    let mut bad = msg(1, GEOMETRY, "[1,1,1]", 1, "[0,1]");
    bad[1] = "not-a-channel".into();
    let outcome = monitor.handle(&bad, t0 + secs(60.0));
    assert!(matches!(outcome, HandleOutcome::Rejected(DecodeError::InvalidChannel(_))));
    assert_eq!(monitor.scheduler().last_flush(), t0);
}

#[test]
fn failed_aggregate_skips_flush_but_advances_schedule() {
    let t0 = Instant::now();
    let mut monitor = monitor_at(t0);
    let t1 = t0 + secs(6.0);

    // Only one timestamp: no representative value for channel 4.
    let outcome = monitor.handle(&msg(4, GEOMETRY, "[1,1,1]", 1, "[3]"), t1);
    assert_eq!(
        outcome,
        HandleOutcome::FlushSkipped {
            channel: 4,
            error: AggregateError::InsufficientTimestamps { channel: 4, len: 1 },
        }
    );
    assert_eq!(monitor.scheduler().last_flush(), t1);
    assert_eq!(monitor.stats().flushes_skipped, 1);
    assert!(monitor.renderer().views.is_empty());

    // The next message inside the interval does not retry.
    let outcome = monitor.handle(&msg(4, GEOMETRY, "[1,1,1]", 2, "[3,4]"), t1 + secs(1.0));
    assert_eq!(outcome, HandleOutcome::Stored { channel: 4 });
}

#[test]
fn geometry_mismatch_across_channels_skips_flush() {
    let t0 = Instant::now();
    let mut monitor = monitor_at(t0);
    monitor.handle(&msg(1, GEOMETRY, "[1,1,1]", 1, "[0,1]"), t0);
    let outcome = monitor.handle(&msg(2, "0:1:4", "[1,1,1,1]", 1, "[0,1]"), t0 + secs(10.0));
    assert!(matches!(
        outcome,
        HandleOutcome::FlushSkipped {
            error: AggregateError::GeometryMismatch { channel: 2, reference: 1 },
            ..
        }
    ));
}

#[test]
fn other_topics_are_filtered() {
    let t0 = Instant::now();
    let mut monitor = monitor_at(t0);
    let mut other = msg(1, GEOMETRY, "[1,1,1]", 1, "[0,1]");
    other[0] = "pulse_summary".into();
    assert_eq!(monitor.handle(&other, t0 + secs(10.0)), HandleOutcome::Filtered);
    assert!(monitor.store().is_empty());
    assert_eq!(monitor.stats().messages_filtered, 1);
}

#[test]
fn flush_now_on_empty_store_fails() {
    let mut monitor = monitor_at(Instant::now());
    assert_eq!(monitor.flush_now(), Err(AggregateError::NoChannels));
}

#[test]
fn render_errors_do_not_stop_the_monitor() {
    let t0 = Instant::now();
    let mut monitor = Monitor::new(
        TOPIC,
        FlushScheduler::starting_at(t0, DEFAULT_FLUSH_INTERVAL),
        FailingRenderer,
    );
    let outcome = monitor.handle(&msg(1, GEOMETRY, "[1,2,3]", 6, "[0,1]"), t0 + secs(6.0));
    assert!(matches!(outcome, HandleOutcome::Flushed { .. }));
    assert_eq!(monitor.stats().flushes_rendered, 1);
}

#[test]
fn latest_update_replaces_channel_in_aggregate() {
    let t0 = Instant::now();
    let mut monitor = monitor_at(t0);
    monitor.handle(&msg(1, GEOMETRY, "[1,1,1]", 3, "[0,1]"), t0);
    monitor.handle(&msg(1, GEOMETRY, "[5,1,1]", 9, "[0,2]"), t0 + secs(1.0));
    let view = monitor.flush_now().unwrap();
    assert_eq!(view.combined_counts, vec![5.0, 1.0, 1.0]);
    assert_eq!(view.grand_total_seen, 9);
    assert_eq!(view.channel_count, 1);

    let delta = monitor.store().delta(1).unwrap();
    assert_eq!(delta.new_counts, vec![4.0, 0.0, 0.0]);
    assert_eq!(delta.new_triggers, 6);
}
