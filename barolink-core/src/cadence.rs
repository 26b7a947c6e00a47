//! Timer-Threshold Scheduling
//!
//! ## Overview
//!
//! The node runs an unbounded polling loop. Each pass asks one question per
//! timer: has its interval elapsed since it last fired? The answer for all
//! four timers comes back as one [`DueSteps`] value, and the caller executes
//! the due steps to completion before polling again.
//!
//! Timers are independent: a slow flush does not shift the sample cadence,
//! and a timer that was starved for several intervals fires once, not once
//! per missed interval.
//!
//! Time is always an argument. Tests step through hours of operation in a
//! loop of `poll(t)` calls without touching a real clock.

use crate::config::NodeConfig;
use crate::time::{elapsed_ms, Timestamp};

/// One periodic timer
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    interval_ms: u64,
    last_fired: Timestamp,
}

impl Cadence {
    /// Create a timer anchored at `start`
    pub const fn new(interval_ms: u64, start: Timestamp) -> Self {
        Self {
            interval_ms,
            last_fired: start,
        }
    }

    /// Fire if the interval has elapsed; re-anchors at `now` when it does
    pub fn fire(&mut self, now: Timestamp) -> bool {
        if elapsed_ms(self.last_fired, now) >= self.interval_ms {
            self.last_fired = now;
            true
        } else {
            false
        }
    }

    /// Milliseconds until the next firing (zero when overdue)
    pub fn remaining_ms(&self, now: Timestamp) -> u64 {
        self.interval_ms.saturating_sub(elapsed_ms(self.last_fired, now))
    }
}

/// Steps that fire in one tick
///
/// Executed in field order: sample, history, flush, drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueSteps {
    /// Read primary and secondary sensors into the aggregator
    pub sample: bool,
    /// Record one pressure history sample
    pub history: bool,
    /// Close the flush window and run the delivery cycle
    pub flush: bool,
    /// Re-check the backlog between flush boundaries
    pub drain: bool,
}

impl DueSteps {
    /// Whether anything fires
    pub fn any(&self) -> bool {
        self.sample || self.history || self.flush || self.drain
    }
}

/// The node's four timers
#[derive(Debug, Clone)]
pub struct Cadences {
    sample: Cadence,
    history: Cadence,
    flush: Cadence,
    drain: Cadence,
}

impl Cadences {
    /// Anchor all timers at `start` using the configured intervals
    pub fn new(config: &NodeConfig, start: Timestamp) -> Self {
        Self {
            sample: Cadence::new(config.sample_interval_ms, start),
            history: Cadence::new(config.history_interval_ms, start),
            flush: Cadence::new(config.flush_interval_ms, start),
            drain: Cadence::new(config.drain_interval_ms, start),
        }
    }

    /// Decide which steps fire at `now`
    pub fn poll(&mut self, now: Timestamp) -> DueSteps {
        DueSteps {
            sample: self.sample.fire(now),
            history: self.history.fire(now),
            flush: self.flush.fire(now),
            drain: self.drain.fire(now),
        }
    }

    /// Milliseconds until the earliest timer fires
    pub fn next_due_in(&self, now: Timestamp) -> u64 {
        [&self.sample, &self.history, &self.flush, &self.drain]
            .iter()
            .map(|cadence| cadence.remaining_ms(now))
            .min()
            .unwrap_or(0)
    }
}
