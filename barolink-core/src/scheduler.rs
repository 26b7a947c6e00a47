//! Delivery Scheduler: Flush Cycles, Rate Limiting and Backlog Drain
//!
//! ## Overview
//!
//! All mutable engine state lives in one owned [`SchedulerState`]. The step
//! functions in this module take it by reference together with the
//! capabilities they need. There are no globals and no locks: exactly one
//! cooperative timeline ever calls them.
//!
//! ## Flush Cycle
//!
//! ```text
//! flush_cycle
//!   │
//!   ├─ aggregator.flush() ── None ──→ EmptyWindow (nothing else happens)
//!   │        │
//!   │   derive reading, classify trend, reset aggregator
//!   │        │
//!   ├─ 1. uplink down?  ──→ throttled reconnect, queue reading, STOP
//!   │
//!   ├─ 2. resync wall clock
//!   │     rate limit open? ──→ deliver(reading, None)
//!   │                           ├─ 200   → mark rate limit
//!   │                           └─ other → queue reading
//!   │
//!   ├─ 3. rate limit closed ──→ skip the reading (dropped, not queued)
//!   │
//!   └─ 4. backlog non-empty and rate limit open?
//!           ──→ deliver(oldest, now - len × flush_interval)
//!                 ├─ 200   → pop oldest, mark rate limit
//!                 └─ other → leave it for a later cycle
//! ```
//!
//! ## Skip Versus Queue
//!
//! Step 3 drops a reading that the rate limit blocked, while step 2 queues a
//! reading whose delivery failed. Under sustained rate limiting that loses
//! data. Dropping is the default;
//! [`NodeConfig::queue_rate_limited_readings`] queues skipped readings
//! instead.
//!
//! ## Drain Cap
//!
//! At most one backlog delivery is attempted per flush cycle, whether from
//! step 4 or from the [`drain_backlog`] re-check that runs between flush
//! boundaries. A full backlog therefore catches up at one reading per flush
//! interval. When the sink rejected the fresh reading, step 4 is deferred to
//! the re-check instead of hitting the failing sink twice in a row.

use crate::aggregator::SampleAggregator;
use crate::backlog::OfflineQueue;
use crate::config::NodeConfig;
use crate::connectivity::ConnectivityGate;
use crate::constants::buffers::{BACKLOG_CAPACITY, EVENT_LOG_CAPACITY, HISTORY_CAPACITY};
use crate::errors::TelemetryError;
use crate::event_log::{EventLog, NodeEvent};
use crate::forecast::classify;
use crate::history::RingHistory;
use crate::rate_limit::RateLimiter;
use crate::reading::{DerivedReading, LastKnownReadings};
use crate::time::Timestamp;
use crate::traits::{EnvironmentSensors, Sink, StatusCode, Uplink, WallClock};

/// Running totals of delivery outcomes since boot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryCounters {
    /// Fresh readings accepted by the sink
    pub delivered: u32,
    /// Backlog readings accepted by the sink
    pub backlog_delivered: u32,
    /// Delivery attempts refused (fresh or backlog)
    pub rejected: u32,
    /// Readings pushed onto the offline queue
    pub queued: u32,
    /// Readings evicted from a full queue
    pub evicted: u32,
    /// Fresh readings dropped by the rate limit
    pub skipped: u32,
}

/// Process-lifetime engine state
///
/// Capacities: H history slots, B queued readings, L log entries.
#[derive(Debug, Clone)]
pub struct SchedulerState<
    const H: usize = HISTORY_CAPACITY,
    const B: usize = BACKLOG_CAPACITY,
    const L: usize = EVENT_LOG_CAPACITY,
> {
    /// Current flush window
    pub aggregator: SampleAggregator,
    /// Pressure trend history
    pub history: RingHistory<H>,
    /// Undelivered readings
    pub queue: OfflineQueue<B>,
    /// Last confirmed successful delivery
    pub limiter: RateLimiter,
    /// Uplink availability and reconnect throttle
    pub gate: ConnectivityGate,
    /// Rolling observability log
    pub log: EventLog<L>,
    /// Most recent raw sensor values
    pub last_known: LastKnownReadings,
    /// Most recent derived reading, delivered or not
    pub last_reading: Option<DerivedReading>,
    /// Delivery statistics
    pub counters: DeliveryCounters,
    /// A backlog delivery was attempted since the last flush boundary
    drain_attempted: bool,
    /// The sink refused the fresh reading of the current cycle
    fresh_rejected: bool,
}

impl<const H: usize, const B: usize, const L: usize> SchedulerState<H, B, L> {
    /// Fresh state for a node with the given configuration
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            aggregator: SampleAggregator::new(config.temperature_offset_c),
            history: RingHistory::new(),
            queue: OfflineQueue::new(),
            limiter: RateLimiter::new(config.rate_limit_ms),
            gate: ConnectivityGate::new(config.reconnect_retry_ms),
            log: EventLog::new(),
            last_known: LastKnownReadings::default(),
            last_reading: None,
            counters: DeliveryCounters::default(),
            drain_attempted: false,
            fresh_rejected: false,
        }
    }

    /// Push onto the backlog, logging an eviction if one happened
    fn enqueue(&mut self, reading: DerivedReading, now: Timestamp) {
        if self.queue.push(reading).is_some() {
            self.counters.evicted = self.counters.evicted.saturating_add(1);
            self.log.record(now, NodeEvent::Evicted);
        }
        self.counters.queued = self.counters.queued.saturating_add(1);
    }
}

/// Capabilities a delivery step needs
pub struct Ports<'a, U, S, W> {
    /// Network availability and reconnects
    pub uplink: &'a mut U,
    /// The upstream endpoint
    pub sink: &'a mut S,
    /// Wall clock for backdating and resync
    pub clock: &'a mut W,
}

/// What happened to the fresh reading of a cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FreshOutcome {
    /// Accepted by the sink
    Delivered,
    /// Refused by the sink and queued
    Rejected(StatusCode),
    /// Not attempted because the rate-limit window was closed
    RateLimited {
        /// Whether the reading was queued instead of dropped
        queued: bool,
    },
    /// Uplink down; reading queued
    Offline {
        /// Whether this cycle issued a reconnect request
        reconnect_requested: bool,
    },
}

impl FreshOutcome {
    /// The recoverable condition behind a failed outcome
    ///
    /// A rate-limited reading is policy, not a failure.
    pub fn error(&self) -> Option<TelemetryError> {
        match *self {
            Self::Rejected(status) => Some(TelemetryError::DeliveryRejected { status }),
            Self::Offline { .. } => Some(TelemetryError::UplinkUnavailable),
            Self::Delivered | Self::RateLimited { .. } => None,
        }
    }
}

/// What happened to the backlog in a drain attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrainOutcome {
    /// Oldest reading accepted and removed
    Delivered {
        /// Backdating applied
        seconds_ago: u64,
    },
    /// Oldest reading refused; still queued
    Rejected(StatusCode),
    /// Nothing queued
    Empty,
    /// This flush cycle already used its drain attempt
    AlreadyAttempted,
    /// Sink refused the fresh reading this cycle; retry on the next re-check
    Deferred,
    /// Rate-limit window closed
    RateLimited,
    /// Uplink down
    Offline,
}

/// Result of one flush boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlushOutcome {
    /// No valid samples in the window; no reading produced
    EmptyWindow,
    /// A reading was derived and the delivery cycle ran
    Derived {
        /// The reading produced for this window
        reading: DerivedReading,
        /// Fate of that reading
        fresh: FreshOutcome,
        /// Step 4 result
        backlog: DrainOutcome,
    },
}

/// Read the sensors into the current window
///
/// Invalid primary reads are discarded; an invalid secondary read keeps the
/// cached pair. Never fails.
pub fn sample_step<E, const H: usize, const B: usize, const L: usize>(
    state: &mut SchedulerState<H, B, L>,
    sensors: &mut E,
) where
    E: EnvironmentSensors,
{
    let temperature = sensors.read_primary_temperature();
    let pressure = sensors.read_pressure();

    if temperature.is_finite() {
        state.last_known.temperature = Some(temperature);
    }
    if pressure.is_finite() {
        state.last_known.pressure = Some(pressure);
    }
    if let Err(_e) = state.aggregator.accumulate(temperature, pressure) {
        log_debug!("sample discarded: {}", _e);
    }

    let secondary = sensors.read_secondary();
    match state.aggregator.update_secondary(secondary) {
        Ok(()) => {
            if let Some((temperature, humidity)) = secondary {
                state.last_known.secondary_temperature = Some(temperature);
                state.last_known.humidity = Some(humidity);
            }
        }
        Err(_e) => {
            log_debug!("secondary read ignored: {}", _e);
        }
    }
}

/// Record one pressure history sample
///
/// A non-finite read leaves the history untouched.
pub fn history_step<E, const H: usize, const B: usize, const L: usize>(
    state: &mut SchedulerState<H, B, L>,
    sensors: &mut E,
) where
    E: EnvironmentSensors,
{
    let pressure = sensors.read_pressure();
    if pressure.is_finite() {
        state.history.record_pressure(pressure);
    } else {
        log_debug!("history sample skipped: pressure invalid");
    }
}

/// Close the flush window and run the delivery cycle
pub fn flush_cycle<U, S, W, const H: usize, const B: usize, const L: usize>(
    state: &mut SchedulerState<H, B, L>,
    config: &NodeConfig,
    ports: &mut Ports<'_, U, S, W>,
    now: Timestamp,
) -> FlushOutcome
where
    U: Uplink,
    S: Sink,
    W: WallClock,
{
    // Window boundaries are time-based: a new cycle starts here either way
    state.drain_attempted = false;
    state.fresh_rejected = false;

    let Some(average) = state.aggregator.flush() else {
        state.log.record(now, NodeEvent::EmptyWindow);
        return FlushOutcome::EmptyWindow;
    };

    let forecast = classify(average.pressure, state.history.delta(average.pressure));
    let reading = average.derive(forecast);
    state.aggregator.reset();
    state.last_reading = Some(reading);

    let fresh = deliver_fresh(state, config, ports, reading, now);

    let backlog = match fresh {
        FreshOutcome::Offline { .. } => DrainOutcome::Offline,
        _ => drain_backlog(state, config, ports, now),
    };

    FlushOutcome::Derived { reading, fresh, backlog }
}

/// Steps 1-3: deliver, queue or skip the fresh reading
fn deliver_fresh<U, S, W, const H: usize, const B: usize, const L: usize>(
    state: &mut SchedulerState<H, B, L>,
    config: &NodeConfig,
    ports: &mut Ports<'_, U, S, W>,
    reading: DerivedReading,
    now: Timestamp,
) -> FreshOutcome
where
    U: Uplink,
    S: Sink,
    W: WallClock,
{
    if !state.gate.is_open(ports.uplink) {
        let reconnect_requested = state.gate.try_reconnect(ports.uplink, now);
        if reconnect_requested {
            state.log.record(now, NodeEvent::ReconnectRequested);
        }

        state.enqueue(reading, now);
        state.log.record(now, NodeEvent::QueuedOffline { queue_len: state.queue.len() });
        return FreshOutcome::Offline { reconnect_requested };
    }

    ports.clock.resync();

    if !state.limiter.is_ready(now) {
        let queued = config.queue_rate_limited_readings;
        if queued {
            state.enqueue(reading, now);
        } else {
            state.counters.skipped = state.counters.skipped.saturating_add(1);
        }
        state.log.record(now, NodeEvent::RateLimited { queued });
        return FreshOutcome::RateLimited { queued };
    }

    let status = ports.sink.deliver(&reading, None);
    if status.is_success() {
        state.limiter.mark_success(now);
        state.counters.delivered = state.counters.delivered.saturating_add(1);
        state.log.record(now, NodeEvent::Delivered);
        FreshOutcome::Delivered
    } else {
        state.fresh_rejected = true;
        state.counters.rejected = state.counters.rejected.saturating_add(1);
        state.enqueue(reading, now);
        state.log.record(now, NodeEvent::Rejected { status });
        FreshOutcome::Rejected(status)
    }
}

/// Step 4: deliver at most one queued reading this flush cycle
///
/// Runs at the end of every flush cycle and again on each drain tick in
/// between; the per-cycle attempt flag enforces the one-per-cycle cap.
pub fn drain_backlog<U, S, W, const H: usize, const B: usize, const L: usize>(
    state: &mut SchedulerState<H, B, L>,
    config: &NodeConfig,
    ports: &mut Ports<'_, U, S, W>,
    now: Timestamp,
) -> DrainOutcome
where
    U: Uplink,
    S: Sink,
    W: WallClock,
{
    if state.queue.is_empty() {
        return DrainOutcome::Empty;
    }
    if state.drain_attempted {
        return DrainOutcome::AlreadyAttempted;
    }
    if state.fresh_rejected {
        // Only defers the in-cycle attempt; the next re-check may try again
        state.fresh_rejected = false;
        return DrainOutcome::Deferred;
    }
    if !state.gate.is_open(ports.uplink) {
        return DrainOutcome::Offline;
    }
    if !state.limiter.is_ready(now) {
        return DrainOutcome::RateLimited;
    }

    let seconds_ago = state.queue.oldest_age_secs(config.flush_interval_secs());
    let created_at = ports.clock.epoch_secs().saturating_sub(seconds_ago);

    let Some(oldest) = state.queue.peek_oldest().copied() else {
        return DrainOutcome::Empty;
    };

    state.drain_attempted = true;
    let status = ports.sink.deliver(&oldest, Some(created_at));

    if status.is_success() {
        state.queue.pop_oldest();
        state.limiter.mark_success(now);
        state.counters.backlog_delivered = state.counters.backlog_delivered.saturating_add(1);
        state.log.record(
            now,
            NodeEvent::BacklogDelivered { seconds_ago, remaining: state.queue.len() },
        );
        DrainOutcome::Delivered { seconds_ago }
    } else {
        state.counters.rejected = state.counters.rejected.saturating_add(1);
        state.log.record(now, NodeEvent::BacklogRejected { status });
        DrainOutcome::Rejected(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::ForecastCode;
    use crate::time::FixedWallClock;

    struct Link {
        up: bool,
        reconnects: u32,
    }

    impl Uplink for Link {
        fn is_available(&mut self) -> bool {
            self.up
        }

        fn request_reconnect(&mut self) {
            self.reconnects += 1;
        }
    }

    /// Answers with a fixed status and records every call
    struct Recorder {
        status: StatusCode,
        calls: Vec<(f32, Option<u64>)>,
    }

    impl Sink for Recorder {
        fn deliver(&mut self, reading: &DerivedReading, created_at: Option<u64>) -> StatusCode {
            self.calls.push((reading.temperature, created_at));
            self.status
        }
    }

    struct Rig {
        state: SchedulerState<18, 4, 16>,
        config: NodeConfig,
        link: Link,
        sink: Recorder,
        clock: FixedWallClock,
    }

    impl Rig {
        fn new() -> Self {
            let config = NodeConfig::default().temperature_offset_c(0.0);
            Self {
                state: SchedulerState::new(&config),
                config,
                link: Link { up: true, reconnects: 0 },
                sink: Recorder { status: StatusCode::OK, calls: Vec::new() },
                clock: FixedWallClock::new(1_700_000_000),
            }
        }

        fn flush(&mut self, temperature: f32, now: Timestamp) -> FlushOutcome {
            self.state.aggregator.accumulate(temperature, 1013.0).unwrap();
            let mut ports = Ports { uplink: &mut self.link, sink: &mut self.sink, clock: &mut self.clock };
            flush_cycle(&mut self.state, &self.config, &mut ports, now)
        }

        fn drain(&mut self, now: Timestamp) -> DrainOutcome {
            let mut ports = Ports { uplink: &mut self.link, sink: &mut self.sink, clock: &mut self.clock };
            drain_backlog(&mut self.state, &self.config, &mut ports, now)
        }
    }

    fn fresh(outcome: FlushOutcome) -> FreshOutcome {
        match outcome {
            FlushOutcome::Derived { fresh, .. } => fresh,
            FlushOutcome::EmptyWindow => panic!("expected a derived reading"),
        }
    }

    #[test]
    fn empty_window_touches_nothing() {
        let mut rig = Rig::new();
        rig.state.limiter.mark_success(5_000);

        let mut ports = Ports { uplink: &mut rig.link, sink: &mut rig.sink, clock: &mut rig.clock };
        let outcome = flush_cycle(&mut rig.state, &rig.config, &mut ports, 60_000);

        assert_eq!(outcome, FlushOutcome::EmptyWindow);
        assert_eq!(rig.state.limiter.last_success(), Some(5_000));
        assert!(rig.sink.calls.is_empty());
        assert!(rig.state.last_reading.is_none());
        assert_eq!(rig.state.log.last().unwrap().event, NodeEvent::EmptyWindow);
    }

    #[test]
    fn fresh_delivery_marks_rate_limit_and_resets_window() {
        let mut rig = Rig::new();
        let outcome = rig.flush(20.0, 60_000);

        assert_eq!(fresh(outcome), FreshOutcome::Delivered);
        assert_eq!(rig.sink.calls, vec![(20.0, None)]);
        assert_eq!(rig.state.limiter.last_success(), Some(60_000));
        assert_eq!(rig.state.aggregator.count(), 0);
        assert_eq!(rig.clock.resyncs(), 1);
        assert_eq!(rig.state.counters.delivered, 1);
    }

    #[test]
    fn first_reading_has_unknown_forecast() {
        let mut rig = Rig::new();
        match rig.flush(20.0, 60_000) {
            FlushOutcome::Derived { reading, .. } => assert_eq!(reading.forecast, ForecastCode::Unknown),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn offline_queues_and_stops() {
        let mut rig = Rig::new();
        rig.link.up = false;

        let outcome = rig.flush(20.0, 60_000);
        assert_eq!(fresh(outcome), FreshOutcome::Offline { reconnect_requested: true });
        assert!(matches!(outcome, FlushOutcome::Derived { backlog: DrainOutcome::Offline, .. }));

        let outcome = rig.flush(21.0, 70_000);
        assert_eq!(fresh(outcome), FreshOutcome::Offline { reconnect_requested: false });

        assert_eq!(fresh(outcome).error(), Some(TelemetryError::UplinkUnavailable));
        assert_eq!(rig.state.queue.len(), 2);
        assert_eq!(rig.link.reconnects, 1);
        assert_eq!(rig.clock.resyncs(), 0);
        assert!(rig.sink.calls.is_empty());
        // Window still resets when nothing was delivered
        assert_eq!(rig.state.aggregator.count(), 0);
    }

    #[test]
    fn rejection_queues_the_reading() {
        let mut rig = Rig::new();
        rig.sink.status = StatusCode::new(500);

        let outcome = rig.flush(20.0, 60_000);
        assert_eq!(fresh(outcome), FreshOutcome::Rejected(StatusCode::new(500)));
        assert!(matches!(outcome, FlushOutcome::Derived { backlog: DrainOutcome::Deferred, .. }));
        assert_eq!(rig.state.queue.len(), 1);
        assert_eq!(rig.state.limiter.last_success(), None);
        assert_eq!(rig.sink.calls.len(), 1);
        assert_eq!(
            fresh(outcome).error(),
            Some(TelemetryError::DeliveryRejected { status: StatusCode::new(500) })
        );
    }

    #[test]
    fn rate_limited_reading_is_dropped_by_default() {
        let mut rig = Rig::new();
        rig.state.limiter.mark_success(55_000);

        let outcome = rig.flush(20.0, 60_000);
        assert_eq!(fresh(outcome), FreshOutcome::RateLimited { queued: false });
        assert!(rig.state.queue.is_empty());
        assert!(rig.sink.calls.is_empty());
        assert_eq!(rig.state.counters.skipped, 1);
    }

    #[test]
    fn rate_limited_reading_queued_when_enabled() {
        let mut rig = Rig::new();
        rig.config = rig.config.clone().queue_rate_limited_readings(true);
        rig.state.limiter.mark_success(55_000);

        let outcome = rig.flush(20.0, 60_000);
        assert_eq!(fresh(outcome), FreshOutcome::RateLimited { queued: true });
        assert_eq!(rig.state.queue.len(), 1);
    }

    #[test]
    fn backlog_drains_one_per_cycle_with_backdating() {
        let mut rig = Rig::new();
        for tag in [1.0, 2.0, 3.0] {
            rig.state.queue.push(DerivedReading {
                temperature: tag,
                ..rig_reading()
            });
        }

        // Fresh send consumes the rate-limit window; step 4 waits
        let outcome = rig.flush(20.0, 60_000);
        assert!(matches!(outcome, FlushOutcome::Derived { backlog: DrainOutcome::RateLimited, .. }));

        // First re-check after the window: oldest goes out, backdated 3 × 60 s
        assert_eq!(rig.drain(80_000), DrainOutcome::Delivered { seconds_ago: 180 });
        assert_eq!(rig.sink.calls.last(), Some(&(1.0, Some(1_700_000_000 - 180))));
        assert_eq!(rig.state.queue.len(), 2);

        // Cap: no second backlog delivery in the same cycle
        assert_eq!(rig.drain(100_000), DrainOutcome::AlreadyAttempted);
        assert_eq!(rig.state.queue.len(), 2);
    }

    #[test]
    fn failed_backlog_entry_stays_put() {
        let mut rig = Rig::new();
        rig.state.queue.push(rig_reading());
        rig.sink.status = StatusCode::new(503);

        assert_eq!(rig.drain(1_000), DrainOutcome::Rejected(StatusCode::new(503)));
        assert_eq!(rig.state.queue.len(), 1);
        assert_eq!(rig.state.limiter.last_success(), None);
    }

    #[test]
    fn overflow_is_logged_as_eviction() {
        let mut rig = Rig::new();
        rig.link.up = false;
        for i in 0..5 {
            rig.flush(20.0 + i as f32, 60_000 * (i + 1));
        }

        assert_eq!(rig.state.queue.len(), 4);
        assert_eq!(rig.state.queue.peek_oldest().unwrap().temperature, 21.0);
        assert_eq!(rig.state.counters.evicted, 1);
        assert!(rig.state.log.iter().any(|e| e.event == NodeEvent::Evicted));
    }

    fn rig_reading() -> DerivedReading {
        DerivedReading {
            temperature: 0.0,
            secondary_temperature: 0.0,
            humidity: 50.0,
            pressure: 1013.0,
            forecast: ForecastCode::Steady,
            absolute_humidity: 8.6,
            dew_point: 10.0,
        }
    }
}
