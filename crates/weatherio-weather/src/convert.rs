//! Metric/imperial conversion of cached readings into display strings.
//!
//! Readings are always stored in metric base units; these helpers are the only
//! place imperial values are produced. Every function is total: NaN and
//! infinities are formatted rather than rejected.

use serde::{Deserialize, Serialize};

const MPS_TO_MPH: f64 = 2.236936;
const METRES_PER_MILE: f64 = 1609.344;
const MM_PER_INCH: f64 = 25.4;
/// 2^52: every f64 at or above this magnitude is a whole number.
const INTEGRAL_THRESHOLD: f64 = 4_503_599_627_370_496.0;

/// Measurement system used for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn from_metric(use_metric: bool) -> Self {
        if use_metric {
            Self::Metric
        } else {
            Self::Imperial
        }
    }
}

/// Round half away from zero and render exactly `places` decimals.
#[must_use]
pub fn round_to_decimal(value: f64, places: u32) -> String {
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    // past 2^52 the scaled value is already integral; near f64::MAX it overflows to inf
    let rounded = if value.is_finite() && scaled.abs() >= INTEGRAL_THRESHOLD {
        value
    } else {
        scaled.round() / factor
    };
    // -0.04 rounds to -0.0, which should not render as "-0.0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.*}", places as usize, rounded)
}

/// Format a Celsius temperature.
#[must_use]
pub fn convert_temperature(units: UnitSystem, celsius: f64) -> String {
    match units {
        UnitSystem::Metric => format!("{}°C", round_to_decimal(celsius, 1)),
        UnitSystem::Imperial => format!("{}°F", round_to_decimal(celsius * 1.8 + 32.0, 1)),
    }
}

/// Format a speed given in metres per second.
#[must_use]
pub fn convert_speed(units: UnitSystem, meters_per_second: f64) -> String {
    match units {
        UnitSystem::Metric => format!("{}m/s", round_to_decimal(meters_per_second, 1)),
        UnitSystem::Imperial => {
            format!("{}mi/h", round_to_decimal(meters_per_second * MPS_TO_MPH, 1))
        }
    }
}

/// Format a visibility distance given in metres.
#[must_use]
pub fn convert_visibility(units: UnitSystem, meters: f64) -> String {
    match units {
        UnitSystem::Metric => format!("{}km", round_to_decimal(meters / 1000.0, 1)),
        UnitSystem::Imperial => format!("{}mi", round_to_decimal(meters / METRES_PER_MILE, 1)),
    }
}

/// Format a precipitation volume given in millimetres.
#[must_use]
pub fn convert_precipitation(units: UnitSystem, millimeters: f64) -> String {
    match units {
        UnitSystem::Metric => format!("{}mm", round_to_decimal(millimeters, 1)),
        UnitSystem::Imperial => format!("{}in", round_to_decimal(millimeters / MM_PER_INCH, 1)),
    }
}

/// Format a 0.0-1.0 fraction as a whole percentage.
#[must_use]
pub fn convert_to_percentage(fraction: f64) -> String {
    format!("{}%", round_to_decimal(fraction * 100.0, 0))
}
