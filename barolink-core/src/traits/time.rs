//! Time Source Abstraction
//!
//! ## Design Goals
//!
//! - **Testability**: every timer decision takes an explicit timestamp, so
//!   tests drive time by hand instead of sleeping
//! - **Platform Independence**: hardware timer, RTOS tick or `Instant`
//!
//! ## Implementations
//!
//! - `FixedTime` / `FixedWallClock`: controllable time for testing
//! - `MonotonicClock` / `SystemWallClock`: hosted targets (`std`)

use crate::time::{EpochSeconds, Timestamp};

/// Monotonic millisecond clock
///
/// Must never go backwards. The epoch is arbitrary (typically boot).
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// Externally synchronized wall clock
///
/// On a microcontroller this is usually an SNTP-disciplined RTC. Only
/// used to backdate queued readings, so a stale clock degrades timestamps
/// but never scheduling.
pub trait WallClock {
    /// Seconds since the Unix epoch
    fn epoch_secs(&self) -> EpochSeconds;

    /// Refresh synchronization with the time server
    ///
    /// Called once per flush cycle while the uplink is available.
    fn resync(&mut self) {}
}
