//! Air-quality reading and derived safety score

use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal air-quality index: 1 = excellent .. 5 = hazardous
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct AirQualityReading {
    pub aqi: u8,
}

impl AirQualityReading {
    /// Value assumed whenever no real reading is available
    pub const MODERATE: Self = Self { aqi: 3 };

    #[must_use]
    pub fn new(aqi: u8) -> Self {
        Self { aqi }
    }
}

/// Qualitative band of a safety score
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SafetyLevel {
    #[serde(rename = "excellent")]
    Excellent,
    #[serde(rename = "very good")]
    VeryGood,
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "poor")]
    Poor,
    #[serde(rename = "dangerous")]
    Dangerous,
}

impl SafetyLevel {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            SafetyLevel::Excellent => "excellent",
            SafetyLevel::VeryGood => "very good",
            SafetyLevel::Good => "good",
            SafetyLevel::Moderate => "moderate",
            SafetyLevel::Poor => "poor",
            SafetyLevel::Dangerous => "dangerous",
        }
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 0-100 safety score; higher is safer
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SafetyScore {
    pub score: u8,
    pub level: SafetyLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_serializes_as_label() {
        let json = serde_json::to_value(SafetyLevel::VeryGood).unwrap();
        assert_eq!(json, serde_json::json!("very good"));
        assert_eq!(SafetyLevel::Dangerous.to_string(), "dangerous");
    }

    #[test]
    fn test_moderate_default() {
        assert_eq!(AirQualityReading::MODERATE.aqi, 3);
    }
}
