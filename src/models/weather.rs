//! Weather data models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Current conditions at a location, real or synthetic
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Temperature in Celsius
    pub temperature_c: f32,
    /// Human-readable description of weather conditions
    pub condition_text: String,
    /// Relative humidity percentage (0-100)
    pub humidity_pct: u8,
    /// Wind speed in km/h
    pub wind_kph: f32,
    /// Apparent temperature in Celsius
    pub feels_like_c: f32,
}

impl WeatherSnapshot {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature_c)
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("{}%", self.humidity_pct)
    }

    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{:.1} km/h", self.wind_kph)
    }
}

/// One day of a forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// Daily maximum temperature in Celsius
    pub max_temp_c: f32,
    /// Daily minimum temperature in Celsius
    pub min_temp_c: f32,
    pub condition_text: String,
}
