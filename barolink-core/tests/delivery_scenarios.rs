//! End-to-end delivery scenarios
//!
//! Each test drives a full node through flush cycles with scripted sensors,
//! uplink and sink, then checks what reached the sink and what is left in
//! the offline queue.

mod common;

use barolink_core::scheduler::{DrainOutcome, FlushOutcome, FreshOutcome};
use barolink_core::traits::StatusCode;
use barolink_core::{ForecastCode, NodeEvent};

use common::{test_config, Harness, FLUSH_MS, HISTORY_MS, SAMPLE_MS};

fn fresh_of(outcome: Option<FlushOutcome>) -> FreshOutcome {
    match outcome {
        Some(FlushOutcome::Derived { fresh, .. }) => fresh,
        other => panic!("expected a derived reading, got {:?}", other),
    }
}

#[test]
fn healthy_node_delivers_every_cycle() {
    let mut h = Harness::<150>::new(test_config());

    for _ in 0..5 {
        let report = h.run_to_flush();
        assert_eq!(fresh_of(report.flush), FreshOutcome::Delivered);
    }

    let sink = &h.node.sink_mut().attempts;
    assert_eq!(sink.len(), 5);
    assert!(sink.iter().all(|a| a.created_at.is_none()));
    assert_eq!(h.node.snapshot(h.now()).queue_len, 0);
}

#[test]
fn offline_cycles_fill_the_queue_without_eviction() {
    let mut h = Harness::<150>::new(test_config());
    h.node.uplink_mut().down = true;

    for _ in 0..3 {
        let report = h.run_to_flush();
        assert!(matches!(fresh_of(report.flush), FreshOutcome::Offline { .. }));
    }

    let snapshot = h.node.snapshot(h.now());
    assert_eq!(snapshot.queue_len, 3);
    assert_eq!(snapshot.counters.evicted, 0);
    assert!(h.node.sink_mut().attempts.is_empty());
    assert!(h.node.uplink_mut().reconnects >= 1);
}

#[test]
fn failed_fresh_reading_is_retried_backdated_by_one_interval() {
    let mut h = Harness::<150>::new(test_config());
    h.node.sink_mut().script.push_back(StatusCode::new(500));

    let report = h.run_to_flush();
    assert_eq!(fresh_of(report.flush), FreshOutcome::Rejected(StatusCode::new(500)));
    assert_eq!(h.node.snapshot(h.now()).queue_len, 1);

    // Keep ticking until the queued reading is attempted again
    let retry = loop {
        let report = h.step();
        if let Some(DrainOutcome::Delivered { seconds_ago }) = report.drain {
            break seconds_ago;
        }
        assert!(h.now() < 2 * FLUSH_MS, "backlog never retried");
    };

    assert_eq!(retry, FLUSH_MS / 1_000);

    let epoch = h.epoch();
    let attempts = &h.node.sink_mut().attempts;
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[1].reading, attempts[0].reading);
    assert_eq!(attempts[1].created_at, Some(epoch - 60));
    assert_eq!(h.node.snapshot(h.now()).queue_len, 0);
}

#[test]
fn backlog_drains_oldest_first_one_per_cycle() {
    let mut h = Harness::<5>::new(test_config());
    h.node.uplink_mut().down = true;
    h.node.sensors_mut().temperature = 10.0;

    for _ in 0..5 {
        h.run_to_flush();
        h.node.sensors_mut().temperature += 1.0;
    }
    assert_eq!(h.node.snapshot(h.now()).queue_len, 5);

    h.node.uplink_mut().down = false;
    let mut ages = Vec::new();
    for report in h.run_for(5 * FLUSH_MS) {
        if let Some(DrainOutcome::Delivered { seconds_ago }) = report.drain {
            ages.push(seconds_ago);
        }
        if let Some(FlushOutcome::Derived { backlog: DrainOutcome::Delivered { seconds_ago }, .. }) = report.flush {
            ages.push(seconds_ago);
        }
    }

    assert_eq!(ages, vec![300, 240, 180, 120, 60]);
    assert_eq!(h.node.snapshot(h.now()).queue_len, 0);

    let backlog: Vec<f32> = h
        .node
        .sink_mut()
        .backlog_attempts()
        .iter()
        .map(|a| a.reading.temperature)
        .collect();
    assert_eq!(backlog, vec![10.0, 11.0, 12.0, 13.0, 14.0]);
}

#[test]
fn backlog_drains_with_drain_interval_just_under_flush() {
    let config = test_config().drain_interval_ms(FLUSH_MS - SAMPLE_MS);
    assert!(config.validate().is_ok());
    assert!(test_config().drain_interval_ms(FLUSH_MS).validate().is_err());

    let mut h = Harness::<5>::new(config);
    h.node.uplink_mut().down = true;
    h.run_to_flush();
    h.run_to_flush();
    assert_eq!(h.node.snapshot(h.now()).queue_len, 2);

    h.node.uplink_mut().down = false;
    let drained = h
        .run_for(20 * FLUSH_MS)
        .iter()
        .filter(|r| matches!(r.drain, Some(DrainOutcome::Delivered { .. })))
        .count();

    let snapshot = h.node.snapshot(h.now());
    assert_eq!(snapshot.queue_len, 0);
    assert_eq!(snapshot.counters.backlog_delivered, 2);
    assert_eq!(drained, 2);
}

#[test]
fn long_outage_keeps_the_newest_readings() {
    let mut h = Harness::<3>::new(test_config());
    h.node.uplink_mut().down = true;
    h.node.sensors_mut().temperature = 1.0;

    for _ in 0..4 {
        h.run_to_flush();
        h.node.sensors_mut().temperature += 1.0;
    }

    let snapshot = h.node.snapshot(h.now());
    assert_eq!(snapshot.queue_len, 3);
    assert_eq!(snapshot.counters.evicted, 1);
    assert!(snapshot.log.iter().any(|e| e.event == NodeEvent::Evicted));

    let queued: Vec<f32> = h.node.state().queue.iter().map(|r| r.temperature).collect();
    assert_eq!(queued, vec![2.0, 3.0, 4.0]);
}

#[test]
fn rate_limited_reading_is_dropped_by_default() {
    let mut h = Harness::<150>::new(test_config().rate_limit_ms(90_000));

    assert_eq!(fresh_of(h.run_to_flush().flush), FreshOutcome::Delivered);
    assert_eq!(
        fresh_of(h.run_to_flush().flush),
        FreshOutcome::RateLimited { queued: false }
    );

    let snapshot = h.node.snapshot(h.now());
    assert_eq!(snapshot.queue_len, 0);
    assert_eq!(snapshot.counters.skipped, 1);
    assert_eq!(h.node.sink_mut().attempts.len(), 1);
}

#[test]
fn rate_limited_reading_is_queued_when_enabled() {
    let config = test_config().rate_limit_ms(90_000).queue_rate_limited_readings(true);
    let mut h = Harness::<150>::new(config);

    h.run_to_flush();
    assert_eq!(
        fresh_of(h.run_to_flush().flush),
        FreshOutcome::RateLimited { queued: true }
    );
    assert_eq!(h.node.snapshot(h.now()).queue_len, 1);
}

#[test]
fn empty_window_produces_nothing() {
    let mut h = Harness::<150>::new(test_config());
    h.run_to_flush();
    let last_success = h.node.state().limiter.last_success();
    assert!(last_success.is_some());

    h.node.sensors_mut().temperature = f32::NAN;
    let report = h.run_to_flush();

    assert_eq!(report.flush, Some(FlushOutcome::EmptyWindow));
    assert_eq!(h.node.state().limiter.last_success(), last_success);
    assert_eq!(h.node.sink_mut().attempts.len(), 1);
}

#[test]
fn invalid_secondary_read_keeps_cached_humidity() {
    let mut h = Harness::<150>::new(test_config());
    h.run_to_flush();

    h.node.sensors_mut().secondary = None;
    let report = h.run_to_flush();

    match report.flush {
        Some(FlushOutcome::Derived { reading, .. }) => {
            assert_eq!(reading.humidity, 45.0);
            assert_eq!(reading.secondary_temperature, 20.5);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn forecast_turns_falling_after_full_history() {
    let mut h = Harness::<150>::new(test_config());

    let first = h.run_to_flush();
    match first.flush {
        Some(FlushOutcome::Derived { reading, .. }) => assert_eq!(reading.forecast, ForecastCode::Unknown),
        other => panic!("unexpected {:?}", other),
    }

    // Fill the 18-slot history at a steady 1013 hPa
    h.run_for(18 * HISTORY_MS - h.now());
    assert!(h.node.snapshot(h.now()).history_ready);

    h.node.sensors_mut().pressure = 1010.0;
    match h.run_to_flush().flush {
        Some(FlushOutcome::Derived { reading, .. }) => {
            assert_eq!(reading.pressure, 1010.0);
            assert_eq!(reading.forecast, ForecastCode::Falling);
        }
        other => panic!("unexpected {:?}", other),
    }
}
