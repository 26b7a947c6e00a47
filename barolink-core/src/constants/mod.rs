//! Constants for Barolink Core
//!
//! Every numeric value the engine depends on lives here, grouped by domain:
//! - **Physics**: psychrometric coefficients, calibration and forecast thresholds
//! - **Time**: default cadences and the cooperative yield slice
//! - **Buffers**: fixed capacities of the history ring, offline queue and event log
//!
//! Forecast thresholds are part of the contract with downstream dashboards;
//! change them only together with the tests that pin them.

/// Psychrometric coefficients, calibration and forecast thresholds.
pub mod physics;

/// Default cadences for sampling, history, flush and delivery.
pub mod time;

/// Fixed capacities for history, backlog and event log.
pub mod buffers;

// Re-export commonly used constants for convenience
pub use physics::{
    FALLING_DELTA_HPA, LOW_PRESSURE_HPA, RISING_DELTA_HPA, DEFAULT_TEMPERATURE_OFFSET_C,
};

pub use time::{
    MS_PER_SECOND, DEFAULT_SAMPLE_INTERVAL_MS, DEFAULT_HISTORY_INTERVAL_MS,
    DEFAULT_FLUSH_INTERVAL_MS, DEFAULT_DRAIN_INTERVAL_MS, DEFAULT_RATE_LIMIT_MS,
    DEFAULT_RECONNECT_RETRY_MS, YIELD_SLICE_MS,
};

pub use buffers::{HISTORY_CAPACITY, BACKLOG_CAPACITY, EVENT_LOG_CAPACITY};
