//! Error Types for Telemetry Conditions
//!
//! ## Design Philosophy
//!
//! Nothing in the sampling and delivery core is fatal. The types here
//! classify conditions so they can be logged, counted and reported in
//! snapshots; the engine itself resolves every one of them locally:
//!
//! | Condition           | Resolution                                      |
//! |---------------------|-------------------------------------------------|
//! | `SensorInvalid`     | discard the sample, keep the cached value       |
//! | `UplinkUnavailable` | queue the reading, throttle reconnect requests  |
//! | `DeliveryRejected`  | queue the reading, retry on a later cycle       |
//!
//! Queue overflow is absent: evicting the oldest reading is the
//! defined policy of the offline queue and is reported as
//! [`NodeEvent::Evicted`](crate::event_log::NodeEvent::Evicted).
//!
//! Like the readings they describe, errors are small and `Copy` so they can
//! sit inside the rolling event log without allocation.

use thiserror_no_std::Error;

use crate::traits::StatusCode;

/// Conditions the telemetry engine recognises and recovers from
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TelemetryError {
    /// A sensor returned a non-finite value or no value at all
    #[error("Sensor reading invalid: {sensor}")]
    SensorInvalid {
        /// Which reading failed ("pressure", "temperature", "secondary")
        sensor: &'static str,
    },

    /// The uplink reported no connectivity
    #[error("Uplink unavailable")]
    UplinkUnavailable,

    /// The sink answered with anything other than success
    #[error("Delivery rejected with status {status}")]
    DeliveryRejected {
        /// Status returned by the sink
        status: StatusCode,
    },
}

/// Configuration rejected by [`NodeConfig::validate`](crate::NodeConfig::validate)
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// An interval was configured as zero
    #[error("Interval {name} must be greater than zero")]
    ZeroInterval {
        /// Field name of the offending interval
        name: &'static str,
    },

    /// The drain re-check would never fire strictly between two flush boundaries
    #[error("Drain interval {drain_ms}ms must be shorter than flush interval {flush_ms}ms")]
    DrainNotShorterThanFlush {
        /// Configured drain interval
        drain_ms: u64,
        /// Configured flush interval
        flush_ms: u64,
    },

    /// The calibration offset is NaN or infinite
    #[error("Temperature offset must be finite")]
    NonFiniteOffset,

    /// The configuration document could not be parsed
    #[error("Malformed configuration document")]
    Malformed,
}

#[cfg(feature = "defmt")]
impl defmt::Format for TelemetryError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::SensorInvalid { sensor } =>
                defmt::write!(fmt, "Sensor invalid: {}", sensor),
            Self::UplinkUnavailable =>
                defmt::write!(fmt, "Uplink unavailable"),
            Self::DeliveryRejected { status } =>
                defmt::write!(fmt, "Delivery rejected: {}", status.as_u16()),
        }
    }
}
