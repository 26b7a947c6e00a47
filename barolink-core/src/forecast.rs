//! Barometric Trend Classification
//!
//! ## Physics Background
//!
//! Falling pressure means an approaching low (cloud, wind, rain); rising
//! pressure means an approaching high (clearing). Meteorological services
//! report the 3-hour tendency and call a change of more than ~1.6 hPa
//! significant. Absolute pressure adds a second signal: below ~1000 hPa the
//! air mass is already a low even if the tendency is flat.
//!
//! ## Policy
//!
//! Evaluated in order, first match wins:
//!
//! | # | Condition                  | Code         |
//! |---|----------------------------|--------------|
//! | 1 | no history                 | Unknown (0)  |
//! | 2 | delta < -1.6 hPa           | Falling (1)  |
//! | 3 | pressure < 1000 hPa        | Low (2)      |
//! | 4 | delta > +1.6 hPa           | Rising (4)   |
//! | 5 | otherwise                  | Steady (3)   |
//!
//! All comparisons are strict: exactly -1.6, +1.6 or 1000 fall through to
//! the next rule. The numeric codes are what the upstream dashboards plot.

use crate::constants::physics::{FALLING_DELTA_HPA, LOW_PRESSURE_HPA, RISING_DELTA_HPA};

/// Discrete weather-trend code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ForecastCode {
    /// Not enough pressure history yet
    Unknown = 0,
    /// Pressure dropping fast
    Falling = 1,
    /// Low absolute pressure
    Low = 2,
    /// No significant change
    Steady = 3,
    /// Pressure rising fast
    Rising = 4,
}

impl ForecastCode {
    /// Wire value of the code
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ForecastCode {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.as_u8())
    }
}

/// Classify the pressure trend
///
/// Pure and total: every input, including NaN, maps to a code. A NaN delta
/// or pressure fails every comparison and lands on `Steady`.
pub fn classify(current_pressure: f32, history_delta: Option<f32>) -> ForecastCode {
    let Some(delta) = history_delta else {
        return ForecastCode::Unknown;
    };

    if delta < FALLING_DELTA_HPA {
        ForecastCode::Falling
    } else if current_pressure < LOW_PRESSURE_HPA {
        ForecastCode::Low
    } else if delta > RISING_DELTA_HPA {
        ForecastCode::Rising
    } else {
        ForecastCode::Steady
    }
}
