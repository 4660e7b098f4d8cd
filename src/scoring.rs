//! Normalization of air-quality indices and the derived safety score
//!
//! Providers report air quality on their own scales. Everything is first
//! brought to the internal 1-5 index, then mapped to a 0-100 safety score and
//! a qualitative [`SafetyLevel`]. All functions here are pure and total.

use crate::models::{AirQualityReading, SafetyLevel, SafetyScore};

/// Score used for any index outside 1..=5
pub const DEFAULT_SAFETY_SCORE: u8 = 60;

/// Map an internal air-quality index to a 0-100 safety score
#[must_use]
pub fn safety_score(aqi: i64) -> u8 {
    match aqi {
        1 => 95,
        2 => 80,
        3 => 60,
        4 => 35,
        5 => 15,
        _ => DEFAULT_SAFETY_SCORE,
    }
}

/// Band a safety score; each band includes its lower bound
#[must_use]
pub fn safety_level(score: u8) -> SafetyLevel {
    match score {
        90.. => SafetyLevel::Excellent,
        75..=89 => SafetyLevel::VeryGood,
        60..=74 => SafetyLevel::Good,
        45..=59 => SafetyLevel::Moderate,
        30..=44 => SafetyLevel::Poor,
        _ => SafetyLevel::Dangerous,
    }
}

/// Convert the US EPA six-level index to the internal five-level index.
///
/// EPA 5 ("very unhealthy") and 6 ("hazardous") both become 5; so does any
/// value the provider should never send.
#[must_use]
pub fn epa_to_internal(epa_index: i64) -> u8 {
    match epa_index {
        1 => 1,
        2 => 2,
        3 => 3,
        4 => 4,
        _ => 5,
    }
}

impl From<AirQualityReading> for SafetyScore {
    fn from(reading: AirQualityReading) -> Self {
        let score = safety_score(i64::from(reading.aqi));
        Self {
            score,
            level: safety_level(score),
        }
    }
}
