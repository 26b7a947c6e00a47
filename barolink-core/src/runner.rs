//! Cooperative main loop for hosted targets (requires std)
//!
//! Drives a [`TelemetryNode`] from a [`TimeSource`] and sleeps between
//! ticks. Sleeps are cut into slices of at most
//! [`YIELD_SLICE_MS`](crate::constants::time::YIELD_SLICE_MS); the
//! housekeeping hook runs after every slice and after every tick, so
//! firmware services (OTA checks, a debug page, a watchdog feed) get a
//! turn even while the node waits out a long cadence.
//!
//! ```no_run
//! # use barolink_core::{CooperativeRunner, DerivedReading, NodeConfig, TelemetryNode};
//! # use barolink_core::time::{MonotonicClock, SystemWallClock};
//! # use barolink_core::traits::{EnvironmentSensors, Sink, StatusCode, Uplink};
//! # struct Board; struct Wifi; struct Cloud;
//! # impl EnvironmentSensors for Board {
//! #     fn read_pressure(&mut self) -> f32 { 1013.0 }
//! #     fn read_primary_temperature(&mut self) -> f32 { 21.0 }
//! #     fn read_secondary(&mut self) -> Option<(f32, f32)> { None }
//! # }
//! # impl Uplink for Wifi { fn is_available(&mut self) -> bool { true } fn request_reconnect(&mut self) {} }
//! # impl Sink for Cloud { fn deliver(&mut self, _: &DerivedReading, _: Option<u64>) -> StatusCode { StatusCode::OK } }
//! # let (sensors, uplink, sink) = (Board, Wifi, Cloud);
//! let time = MonotonicClock::new();
//! let node: TelemetryNode<_, _, _, _> =
//!     TelemetryNode::new(NodeConfig::default(), sensors, uplink, sink, SystemWallClock, 0);
//!
//! let mut runner = CooperativeRunner::new(node, time)
//!     .with_housekeeping(|| { /* feed the watchdog */ });
//! runner.run();
//! ```

use std::thread;
use std::time::Duration;

use crate::constants::time::YIELD_SLICE_MS;
use crate::node::{TelemetryNode, TickReport};
use crate::traits::{EnvironmentSensors, Sink, TimeSource, Uplink, WallClock};

/// Tick-and-sleep loop with a cooperative yield hook
pub struct CooperativeRunner<
    Sn,
    U,
    Sk,
    W,
    T,
    const H: usize,
    const B: usize,
    const L: usize,
> {
    node: TelemetryNode<Sn, U, Sk, W, H, B, L>,
    time: T,
    housekeeping: Option<Box<dyn FnMut()>>,
    ticks: u64,
}

impl<Sn, U, Sk, W, T, const H: usize, const B: usize, const L: usize>
    CooperativeRunner<Sn, U, Sk, W, T, H, B, L>
where
    Sn: EnvironmentSensors,
    U: Uplink,
    Sk: Sink,
    W: WallClock,
    T: TimeSource,
{
    /// Wrap a node and the monotonic clock that drives it
    pub fn new(node: TelemetryNode<Sn, U, Sk, W, H, B, L>, time: T) -> Self {
        Self {
            node,
            time,
            housekeeping: None,
            ticks: 0,
        }
    }

    /// Install the hook run at every yield point
    pub fn with_housekeeping<F>(mut self, hook: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.housekeeping = Some(Box::new(hook));
        self
    }

    /// Tick once at the current time, then yield
    pub fn run_once(&mut self) -> TickReport {
        let report = self.node.tick(self.time.now());
        self.ticks += 1;
        self.yield_now();
        report
    }

    /// Sleep for `ms`, yielding at least every slice
    pub fn pause(&mut self, ms: u64) {
        let mut remaining = ms;
        while remaining > 0 {
            let slice = remaining.min(YIELD_SLICE_MS);
            thread::sleep(Duration::from_millis(slice));
            remaining -= slice;
            self.yield_now();
        }
    }

    /// Tick and sleep until `stop` returns true for a tick report
    pub fn run_until<F>(&mut self, mut stop: F)
    where
        F: FnMut(&TickReport) -> bool,
    {
        loop {
            let report = self.run_once();
            if stop(&report) {
                log_debug!("runner stopped after {} ticks", self.ticks);
                return;
            }
            let wait = self.node.next_due_in(self.time.now());
            self.pause(wait);
        }
    }

    /// Tick and sleep forever
    pub fn run(&mut self) -> ! {
        loop {
            self.run_once();
            let wait = self.node.next_due_in(self.time.now());
            self.pause(wait);
        }
    }

    /// Ticks executed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The driven node
    pub fn node(&self) -> &TelemetryNode<Sn, U, Sk, W, H, B, L> {
        &self.node
    }

    /// The driven node, mutably
    pub fn node_mut(&mut self) -> &mut TelemetryNode<Sn, U, Sk, W, H, B, L> {
        &mut self.node
    }

    fn yield_now(&mut self) {
        if let Some(hook) = self.housekeeping.as_mut() {
            hook();
        }
    }
}
