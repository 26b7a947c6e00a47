//! Buffer Sizes
//!
//! Fixed capacities for the process-lifetime buffers. Each is a const
//! generic default, so a node can be built with other sizes in tests or on
//! larger boards.

/// Pressure history slots (H).
///
/// 18 samples at the 10-minute history cadence = 3 hours.
pub const HISTORY_CAPACITY: usize = 18;

/// Offline queue slots (B).
///
/// 150 readings at one per minute = 2.5 hours of outage.
/// - ~28 bytes per `DerivedReading` → ~4.2KB
pub const BACKLOG_CAPACITY: usize = 150;

/// Rolling event log entries (L).
pub const EVENT_LOG_CAPACITY: usize = 32;
