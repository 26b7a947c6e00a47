//! Windowed Sample Aggregation with Psychrometric Derivation
//!
//! ## Overview
//!
//! The primary sensor is read every few seconds; the sink only wants one
//! value per minute. `SampleAggregator` keeps a running sum and count of
//! valid primary readings for the current flush window and caches the last
//! valid secondary (temperature, humidity) pair.
//!
//! ```text
//! accumulate ──→ sums += (t, p), count += 1      (every sample tick)
//! flush      ──→ mean(t) + offset, mean(p)       (flush boundary, read-only)
//! reset      ──→ sums = 0, count = 0             (caller, unconditionally)
//! ```
//!
//! ## Invalid Samples
//!
//! A NaN (or infinite) primary read is discarded without touching the count,
//! so a bad read can neither skew the mean nor silently count as zero. A
//! secondary read that is `None` or non-finite leaves the cached pair as it
//! was.
//!
//! ## Empty Windows
//!
//! [`SampleAggregator::flush`] returns `None` when nothing valid was
//! accumulated and leaves the accumulator untouched; no reading is
//! manufactured from an empty window.
//!
//! ## Derived Metrics
//!
//! ```text
//! dew_point         = T - (100 - RH) / 5
//! absolute_humidity = 6.112 × e^(17.67·T / (T + 243.5)) × RH × 2.1674 / (273.15 + T)
//! ```
//!
//! `RH` is replaced by 1.0 when the last known humidity is exactly 0, which
//! keeps the empirical formula away from a degenerate zero. `T` is the
//! calibrated window mean.

use crate::constants::physics::{
    ABSOLUTE_HUMIDITY_FACTOR, DEW_POINT_RH_DIVISOR, HUMIDITY_FLOOR_PCT, MAGNUS_A, MAGNUS_B_C,
    MAGNUS_BASE_HPA, ZERO_CELSIUS_K,
};
use crate::errors::TelemetryError;
use crate::forecast::ForecastCode;
use crate::reading::DerivedReading;

/// Running sums for the current flush window
#[derive(Debug, Clone, Default)]
pub struct SampleAggregator {
    temperature_sum: f32,
    pressure_sum: f32,
    count: u32,

    /// Last valid secondary temperature in °C
    secondary_temperature: f32,
    /// Last valid relative humidity in %
    humidity: f32,

    /// Added to the mean primary temperature
    temperature_offset: f32,
}

/// Window means ready for derivation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowAverage {
    /// Mean primary temperature plus calibration offset
    pub temperature: f32,
    /// Mean pressure in hPa
    pub pressure: f32,
    /// Cached secondary temperature
    pub secondary_temperature: f32,
    /// Cached relative humidity
    pub humidity: f32,
    /// Valid samples that contributed
    pub samples: u32,
}

impl SampleAggregator {
    /// Create an empty aggregator with a temperature calibration offset
    pub fn new(temperature_offset: f32) -> Self {
        Self {
            temperature_offset,
            ..Self::default()
        }
    }

    /// Add one primary reading
    ///
    /// Never fails from the caller's point of view; the error only reports
    /// that the sample was discarded.
    pub fn accumulate(&mut self, raw_temperature: f32, raw_pressure: f32) -> Result<(), TelemetryError> {
        if !raw_temperature.is_finite() {
            return Err(TelemetryError::SensorInvalid { sensor: "temperature" });
        }
        if !raw_pressure.is_finite() {
            return Err(TelemetryError::SensorInvalid { sensor: "pressure" });
        }

        self.temperature_sum += raw_temperature;
        self.pressure_sum += raw_pressure;
        self.count += 1;
        Ok(())
    }

    /// Update the cached secondary pair
    ///
    /// `None` or a non-finite value keeps the previous cache.
    pub fn update_secondary(&mut self, reading: Option<(f32, f32)>) -> Result<(), TelemetryError> {
        match reading {
            Some((temperature, humidity)) if temperature.is_finite() && humidity.is_finite() => {
                self.secondary_temperature = temperature;
                self.humidity = humidity;
                Ok(())
            }
            _ => Err(TelemetryError::SensorInvalid { sensor: "secondary" }),
        }
    }

    /// Means of the current window
    ///
    /// `None` when no valid sample was accumulated. Does not reset.
    pub fn flush(&self) -> Option<WindowAverage> {
        if self.count == 0 {
            return None;
        }

        let n = self.count as f32;
        Some(WindowAverage {
            temperature: self.temperature_sum / n + self.temperature_offset,
            pressure: self.pressure_sum / n,
            secondary_temperature: self.secondary_temperature,
            humidity: self.humidity,
            samples: self.count,
        })
    }

    /// Start a new window
    ///
    /// Clears sums and count; the secondary cache survives.
    pub fn reset(&mut self) {
        self.temperature_sum = 0.0;
        self.pressure_sum = 0.0;
        self.count = 0;
    }

    /// Valid samples in the current window
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl WindowAverage {
    /// Build the deliverable reading
    pub fn derive(&self, forecast: ForecastCode) -> DerivedReading {
        let humidity = safe_humidity(self.humidity);

        DerivedReading {
            temperature: self.temperature,
            secondary_temperature: self.secondary_temperature,
            humidity: self.humidity,
            pressure: self.pressure,
            forecast,
            absolute_humidity: absolute_humidity(self.temperature, humidity),
            dew_point: dew_point(self.temperature, humidity),
        }
    }
}

/// Humidity with the exact-zero case replaced by the floor value
pub fn safe_humidity(humidity: f32) -> f32 {
    if humidity == 0.0 {
        HUMIDITY_FLOOR_PCT
    } else {
        humidity
    }
}

/// Approximate dew point in °C
pub fn dew_point(temperature: f32, humidity: f32) -> f32 {
    temperature - ((100.0 - humidity) / DEW_POINT_RH_DIVISOR)
}

/// Absolute humidity in g/m³
///
/// Uses `libm::expf` so the crate stays `no_std`.
pub fn absolute_humidity(temperature: f32, humidity: f32) -> f32 {
    let saturation = MAGNUS_BASE_HPA * libm::expf(MAGNUS_A * temperature / (temperature + MAGNUS_B_C));
    (saturation * humidity * ABSOLUTE_HUMIDITY_FACTOR) / (ZERO_CELSIUS_K + temperature)
}
