//! Time management for telemetry nodes
//!
//! Two clocks with different jobs:
//! - Monotonic milliseconds ([`TimeSource`]) drive cadences, the rate limit,
//!   reconnect throttling and uptime. They never jump.
//! - Wall-clock epoch seconds ([`WallClock`]) only stamp backlog deliveries
//!   with their approximate creation time. They may be resynced at any time.

pub use crate::traits::{TimeSource, WallClock};

/// Timestamp in milliseconds since device boot
pub type Timestamp = u64;

/// Wall-clock seconds since the Unix epoch
pub type EpochSeconds = u64;

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Start at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Move forward by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// Fixed wall clock for testing, counting epoch seconds
#[derive(Debug, Clone)]
pub struct FixedWallClock {
    epoch: EpochSeconds,
    resyncs: u32,
}

impl FixedWallClock {
    /// Start at `epoch`
    pub fn new(epoch: EpochSeconds) -> Self {
        Self { epoch, resyncs: 0 }
    }

    /// Move forward by `secs`
    pub fn advance(&mut self, secs: u64) {
        self.epoch += secs;
    }

    /// How many times the scheduler asked for a resync
    pub fn resyncs(&self) -> u32 {
        self.resyncs
    }
}

impl WallClock for FixedWallClock {
    fn epoch_secs(&self) -> EpochSeconds {
        self.epoch
    }

    fn resync(&mut self) {
        self.resyncs += 1;
    }
}

/// Monotonic time since construction (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    boot: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Start counting from now
    pub fn new() -> Self {
        Self { boot: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.boot.elapsed().as_millis() as Timestamp
    }
}

/// Host wall clock (requires std)
///
/// The operating system keeps it synchronized, so `resync` is a no-op.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct SystemWallClock;

#[cfg(feature = "std")]
impl WallClock for SystemWallClock {
    fn epoch_secs(&self) -> EpochSeconds {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Milliseconds elapsed between two monotonic timestamps
///
/// Saturates at zero if `later` is actually earlier.
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}
