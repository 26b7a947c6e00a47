//! Psychrometric Coefficients and Forecast Thresholds
//!
//! The humidity coefficients come from the Magnus-Tetens approximation over
//! water, as used by most consumer weather stations. The forecast thresholds
//! follow the usual 3-hour barometric tendency rule of thumb.

// ===== MAGNUS-TETENS APPROXIMATION =====

/// Saturation vapour pressure at 0°C in hPa.
pub const MAGNUS_BASE_HPA: f32 = 6.112;

/// Magnus exponent numerator (dimensionless).
pub const MAGNUS_A: f32 = 17.67;

/// Magnus temperature offset in °C.
pub const MAGNUS_B_C: f32 = 243.5;

/// Converts vapour pressure (hPa) × RH (%) over temperature (K) to g/m³.
pub const ABSOLUTE_HUMIDITY_FACTOR: f32 = 2.1674;

/// 0°C expressed in kelvin.
pub const ZERO_CELSIUS_K: f32 = 273.15;

/// Humidity substituted when the last known reading is exactly 0%.
///
/// Keeps the absolute humidity formula away from a degenerate zero; it is
/// not a physically meaningful humidity.
pub const HUMIDITY_FLOOR_PCT: f32 = 1.0;

/// Dew point spread per percent of relative humidity below saturation.
///
/// `dew_point ≈ T - (100 - RH) / 5`, valid above ~50% RH; accepted as-is
/// by the upstream dashboards.
pub const DEW_POINT_RH_DIVISOR: f32 = 5.0;

// ===== CALIBRATION =====

/// Default offset added to the averaged primary temperature.
///
/// The enclosure self-heats the primary sensor by roughly 1.5°C.
pub const DEFAULT_TEMPERATURE_OFFSET_C: f32 = -1.5;

// ===== FORECAST THRESHOLDS =====

/// A pressure drop larger than this over the history window means "falling".
pub const FALLING_DELTA_HPA: f32 = -1.6;

/// A pressure rise larger than this over the history window means "rising".
pub const RISING_DELTA_HPA: f32 = 1.6;

/// Absolute pressure below which the outlook is "low" when not clearly falling.
pub const LOW_PRESSURE_HPA: f32 = 1000.0;
