//! Telemetry Node: the Cooperative Tick
//!
//! ## Overview
//!
//! [`TelemetryNode`] owns the board capabilities, the four cadences and the
//! [`SchedulerState`]. The main loop calls [`TelemetryNode::tick`] with the
//! current monotonic time; the node runs whichever steps are due, to
//! completion, and returns.
//!
//! ```text
//! loop {
//!     tick(now)
//!       ├─ sample  due? → read sensors into the window
//!       ├─ history due? → record one pressure sample
//!       ├─ flush   due? → derive, deliver or queue, drain one
//!       └─ drain   due? → re-check the backlog (skipped when flush ran)
//!     yield / sleep until next_due_in(now)
//! }
//! ```
//!
//! No step in a tick can fail. Problems end up in the event log and the
//! delivery counters, visible through [`TelemetryNode::snapshot`].

use heapless::Vec;

use crate::cadence::{Cadences, DueSteps};
use crate::config::NodeConfig;
use crate::constants::buffers::{BACKLOG_CAPACITY, EVENT_LOG_CAPACITY, HISTORY_CAPACITY};
use crate::constants::time::MS_PER_SECOND;
use crate::errors::ConfigError;
use crate::event_log::LogEntry;
use crate::reading::{DerivedReading, LastKnownReadings};
use crate::scheduler::{
    drain_backlog, flush_cycle, history_step, sample_step, DeliveryCounters, DrainOutcome,
    FlushOutcome, Ports, SchedulerState,
};
use crate::time::{elapsed_ms, Timestamp};
use crate::traits::{EnvironmentSensors, Sink, Uplink, WallClock};

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Steps that fired
    pub due: DueSteps,
    /// Flush cycle result, when the flush timer fired
    pub flush: Option<FlushOutcome>,
    /// Backlog re-check result, when the drain timer fired on its own
    pub drain: Option<DrainOutcome>,
}

/// Read-only view for debug pages and health endpoints
#[derive(Debug, Clone)]
pub struct NodeSnapshot<const L: usize = EVENT_LOG_CAPACITY> {
    /// Seconds since the node was created
    pub uptime_secs: u64,
    /// Readings waiting in the offline queue
    pub queue_len: usize,
    /// Offline queue capacity
    pub queue_capacity: usize,
    /// Milliseconds until the sink rate limit admits another delivery
    pub rate_limit_wait_ms: u64,
    /// Pressure history has covered a full window
    pub history_ready: bool,
    /// Copy of the event log, oldest first
    pub log: Vec<LogEntry, L>,
    /// Latest raw sensor values
    pub last_known: LastKnownReadings,
    /// Latest derived reading
    pub last_reading: Option<DerivedReading>,
    /// Delivery statistics
    pub counters: DeliveryCounters,
    /// Reconnect requests issued since boot
    pub reconnects: u32,
}

/// Sampling, forecast and delivery engine for one node
pub struct TelemetryNode<
    Sn,
    U,
    Sk,
    W,
    const H: usize = HISTORY_CAPACITY,
    const B: usize = BACKLOG_CAPACITY,
    const L: usize = EVENT_LOG_CAPACITY,
> {
    config: NodeConfig,
    sensors: Sn,
    uplink: U,
    sink: Sk,
    clock: W,
    cadences: Cadences,
    state: SchedulerState<H, B, L>,
    started_at: Timestamp,
}

impl<Sn, U, Sk, W, const H: usize, const B: usize, const L: usize> TelemetryNode<Sn, U, Sk, W, H, B, L>
where
    Sn: EnvironmentSensors,
    U: Uplink,
    Sk: Sink,
    W: WallClock,
{
    /// Create a node whose timers start at `start` (monotonic ms)
    ///
    /// The configuration is used as given; see [`TelemetryNode::try_new`].
    pub fn new(config: NodeConfig, sensors: Sn, uplink: U, sink: Sk, clock: W, start: Timestamp) -> Self {
        let cadences = Cadences::new(&config, start);
        let state = SchedulerState::new(&config);

        log_info!(
            "node up: sample {}ms, flush {}ms, backlog capacity {}",
            config.sample_interval_ms,
            config.flush_interval_ms,
            B
        );

        Self {
            config,
            sensors,
            uplink,
            sink,
            clock,
            cadences,
            state,
            started_at: start,
        }
    }

    /// Validate the configuration, then create the node
    pub fn try_new(
        config: NodeConfig,
        sensors: Sn,
        uplink: U,
        sink: Sk,
        clock: W,
        start: Timestamp,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config, sensors, uplink, sink, clock, start))
    }

    /// Run every step due at `now`
    pub fn tick(&mut self, now: Timestamp) -> TickReport {
        let due = self.cadences.poll(now);
        let mut report = TickReport { due, flush: None, drain: None };

        if due.sample {
            sample_step(&mut self.state, &mut self.sensors);
        }
        if due.history {
            history_step(&mut self.state, &mut self.sensors);
        }

        let mut ports = Ports {
            uplink: &mut self.uplink,
            sink: &mut self.sink,
            clock: &mut self.clock,
        };

        if due.flush {
            report.flush = Some(flush_cycle(&mut self.state, &self.config, &mut ports, now));
        } else if due.drain {
            report.drain = Some(drain_backlog(&mut self.state, &self.config, &mut ports, now));
        }

        report
    }

    /// Milliseconds until the next timer fires
    pub fn next_due_in(&self, now: Timestamp) -> u64 {
        self.cadences.next_due_in(now)
    }

    /// Capture the observable state at `now`
    pub fn snapshot(&self, now: Timestamp) -> NodeSnapshot<L> {
        let mut log = Vec::new();
        for entry in self.state.log.iter() {
            // Same capacity as the source log
            let _ = log.push(*entry);
        }

        NodeSnapshot {
            uptime_secs: elapsed_ms(self.started_at, now) / MS_PER_SECOND,
            queue_len: self.state.queue.len(),
            queue_capacity: self.state.queue.capacity(),
            rate_limit_wait_ms: self.state.limiter.wait_ms(now),
            history_ready: self.state.history.is_wrapped(),
            log,
            last_known: self.state.last_known,
            last_reading: self.state.last_reading,
            counters: self.state.counters,
            reconnects: self.state.gate.reconnects(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Engine state, read-only
    pub fn state(&self) -> &SchedulerState<H, B, L> {
        &self.state
    }

    /// Board sensors
    pub fn sensors_mut(&mut self) -> &mut Sn {
        &mut self.sensors
    }

    /// Uplink capability
    pub fn uplink_mut(&mut self) -> &mut U {
        &mut self.uplink
    }

    /// Sink capability
    pub fn sink_mut(&mut self) -> &mut Sk {
        &mut self.sink
    }

    /// Wall clock capability
    pub fn clock_mut(&mut self) -> &mut W {
        &mut self.clock
    }
}
