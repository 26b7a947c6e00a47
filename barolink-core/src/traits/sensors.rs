//! Sensor capability
//!
//! A node carries one primary sensor (temperature + pressure, e.g. a BMP280)
//! and one secondary temperature/humidity sensor (e.g. an SHT31). The
//! secondary sensor is allowed to fail a read; the primary reports failures
//! as NaN.

/// Read access to the node's environmental sensors
pub trait EnvironmentSensors {
    /// Current station pressure in hPa (NaN when the read failed)
    fn read_pressure(&mut self) -> f32;

    /// Current primary temperature in °C (NaN when the read failed)
    fn read_primary_temperature(&mut self) -> f32;

    /// Secondary `(temperature °C, relative humidity %)`
    ///
    /// `None` means the sensor reported "invalid". Callers also treat a
    /// non-finite pair as "no update".
    fn read_secondary(&mut self) -> Option<(f32, f32)>;
}
