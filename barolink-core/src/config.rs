//! Node configuration
//!
//! Every interval is in monotonic milliseconds. Defaults come from
//! [`constants`](crate::constants) and suit a one-reading-per-minute node
//! feeding a free-tier time-series service.
//!
//! ```rust
//! use barolink_core::NodeConfig;
//!
//! let config = NodeConfig::default()
//!     .flush_interval_ms(30_000)
//!     .drain_interval_ms(10_000)
//!     .rate_limit_ms(15_000);
//! assert!(config.validate().is_ok());
//! ```

use crate::constants::physics::DEFAULT_TEMPERATURE_OFFSET_C;
use crate::constants::time::{
    DEFAULT_DRAIN_INTERVAL_MS, DEFAULT_FLUSH_INTERVAL_MS, DEFAULT_HISTORY_INTERVAL_MS,
    DEFAULT_RATE_LIMIT_MS, DEFAULT_RECONNECT_RETRY_MS, DEFAULT_SAMPLE_INTERVAL_MS, MS_PER_SECOND,
};
use crate::errors::ConfigError;

/// Cadences, delivery policy and calibration for one node
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NodeConfig {
    /// Raw sample cadence
    pub sample_interval_ms: u64,
    /// Pressure history cadence
    pub history_interval_ms: u64,
    /// Flush window length; also the backlog age unit
    pub flush_interval_ms: u64,
    /// Backlog re-check cadence between flush boundaries
    pub drain_interval_ms: u64,
    /// Minimum spacing between successful deliveries
    pub rate_limit_ms: u64,
    /// Minimum spacing between reconnect requests
    pub reconnect_retry_ms: u64,
    /// Added to the averaged primary temperature
    pub temperature_offset_c: f32,
    /// Queue a fresh reading that the rate limit skipped instead of dropping it
    ///
    /// Off by default: a skipped reading is dropped, and only readings whose
    /// delivery was attempted and failed are queued. Under sustained rate
    /// limiting that loses data; turning this on closes the gap.
    pub queue_rate_limited_readings: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            history_interval_ms: DEFAULT_HISTORY_INTERVAL_MS,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            drain_interval_ms: DEFAULT_DRAIN_INTERVAL_MS,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            reconnect_retry_ms: DEFAULT_RECONNECT_RETRY_MS,
            temperature_offset_c: DEFAULT_TEMPERATURE_OFFSET_C,
            queue_rate_limited_readings: false,
        }
    }
}

impl NodeConfig {
    /// Set the raw sample cadence
    pub fn sample_interval_ms(mut self, ms: u64) -> Self {
        self.sample_interval_ms = ms;
        self
    }

    /// Set the pressure history cadence
    pub fn history_interval_ms(mut self, ms: u64) -> Self {
        self.history_interval_ms = ms;
        self
    }

    /// Set the flush window length
    pub fn flush_interval_ms(mut self, ms: u64) -> Self {
        self.flush_interval_ms = ms;
        self
    }

    /// Set the backlog re-check cadence
    pub fn drain_interval_ms(mut self, ms: u64) -> Self {
        self.drain_interval_ms = ms;
        self
    }

    /// Set the sink rate limit
    pub fn rate_limit_ms(mut self, ms: u64) -> Self {
        self.rate_limit_ms = ms;
        self
    }

    /// Set the reconnect throttle
    pub fn reconnect_retry_ms(mut self, ms: u64) -> Self {
        self.reconnect_retry_ms = ms;
        self
    }

    /// Set the temperature calibration offset
    pub fn temperature_offset_c(mut self, offset: f32) -> Self {
        self.temperature_offset_c = offset;
        self
    }

    /// Queue readings skipped by the rate limit
    pub fn queue_rate_limited_readings(mut self, enabled: bool) -> Self {
        self.queue_rate_limited_readings = enabled;
        self
    }

    /// Flush window in whole seconds, the unit of backlog backdating
    pub fn flush_interval_secs(&self) -> u64 {
        self.flush_interval_ms / MS_PER_SECOND
    }

    /// Check the configuration for values the scheduler cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("sample_interval_ms", self.sample_interval_ms),
            ("history_interval_ms", self.history_interval_ms),
            ("flush_interval_ms", self.flush_interval_ms),
            ("drain_interval_ms", self.drain_interval_ms),
            ("reconnect_retry_ms", self.reconnect_retry_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { name });
            }
        }

        // An equal interval always fires on the flush tick, where the re-check is skipped
        if self.drain_interval_ms >= self.flush_interval_ms {
            return Err(ConfigError::DrainNotShorterThanFlush {
                drain_ms: self.drain_interval_ms,
                flush_ms: self.flush_interval_ms,
            });
        }

        if !self.temperature_offset_c.is_finite() {
            return Err(ConfigError::NonFiniteOffset);
        }

        Ok(())
    }

    /// Parse and validate a JSON configuration document
    ///
    /// Missing fields take their defaults.
    #[cfg(feature = "std")]
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }
}
