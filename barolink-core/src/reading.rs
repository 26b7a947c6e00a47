//! Reading types
//!
//! [`DerivedReading`] is the unit of delivery: produced once per flush
//! window, immutable afterwards, owned by whichever queue slot holds it.

use crate::forecast::ForecastCode;

/// One flush window reduced to deliverable metrics
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedReading {
    /// Averaged, calibrated primary temperature in °C
    pub temperature: f32,
    /// Last known secondary-sensor temperature in °C
    pub secondary_temperature: f32,
    /// Last known relative humidity in %
    pub humidity: f32,
    /// Averaged station pressure in hPa
    pub pressure: f32,
    /// Short-term pressure trend
    pub forecast: ForecastCode,
    /// Absolute humidity in g/m³
    pub absolute_humidity: f32,
    /// Approximate dew point in °C
    pub dew_point: f32,
}

/// Most recent raw values seen by the sampling step
///
/// Fields stay `None` until the first valid read of that sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LastKnownReadings {
    /// Primary temperature in °C (uncalibrated)
    pub temperature: Option<f32>,
    /// Secondary temperature in °C
    pub secondary_temperature: Option<f32>,
    /// Relative humidity in %
    pub humidity: Option<f32>,
    /// Station pressure in hPa
    pub pressure: Option<f32>,
}
