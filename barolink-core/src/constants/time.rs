//! Time-Related Constants
//!
//! All intervals are milliseconds on the monotonic clock unless the name
//! says otherwise.

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Raw sample cadence feeding the aggregator.
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 5_000;

/// Pressure history cadence.
///
/// 10 minutes × 18 slots = the classic 3-hour barometric tendency.
pub const DEFAULT_HISTORY_INTERVAL_MS: u64 = 600_000;

/// Flush window: one derived reading per minute.
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 60_000;

/// Backlog drain re-check between flush boundaries.
pub const DEFAULT_DRAIN_INTERVAL_MS: u64 = 20_000;

/// Minimum spacing between successful sink deliveries.
///
/// Free-tier time-series services typically accept one update per 15 s.
pub const DEFAULT_RATE_LIMIT_MS: u64 = 15_000;

/// Minimum spacing between reconnect requests while the uplink is down.
pub const DEFAULT_RECONNECT_RETRY_MS: u64 = 30_000;

/// Longest uninterrupted sleep inside a wait loop.
///
/// Housekeeping (OTA checks, debug server) must run at least this often or
/// the task watchdog fires.
pub const YIELD_SLICE_MS: u64 = 100;
