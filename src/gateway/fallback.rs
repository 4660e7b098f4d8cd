//! Synthetic stand-ins for provider payloads.
//!
//! Each generator returns a value with exactly the shape of its live
//! counterpart. Content is random but plausible; callers must not read any
//! signal into it.

use chrono::{Duration, NaiveDate, Utc};
use haversine::{Location as HaversineLocation, Units, distance};
use rand::RngExt;

use crate::models::{
    AirQualityReading, Coordinate, DailyForecast, DataQuality, RouteCandidate,
    SatelliteObservation, WeatherSnapshot,
};

const CURRENT_CONDITIONS: [&str; 3] = ["Sunny", "Cloudy", "Mild"];
const FORECAST_CONDITIONS: [&str; 4] = ["Sunny", "Partly cloudy", "Mild", "Clear"];

/// Travel-time estimate for synthetic routes
const SECONDS_PER_METRE: f64 = 2.0;

pub fn weather_snapshot() -> WeatherSnapshot {
    let mut rng = rand::rng();
    WeatherSnapshot {
        temperature_c: rng.random_range(20..=35) as f32,
        condition_text: CURRENT_CONDITIONS[rng.random_range(0..CURRENT_CONDITIONS.len())]
            .to_string(),
        humidity_pct: rng.random_range(30..=70),
        wind_kph: rng.random_range(5..=25) as f32,
        feels_like_c: rng.random_range(20..=35) as f32,
    }
}

/// `days` consecutive entries starting at `today`, around one base temperature
pub fn daily_forecast(days: u8, today: NaiveDate) -> Vec<DailyForecast> {
    let mut rng = rand::rng();
    let base_temp: i32 = rng.random_range(20..=30);

    (0..days)
        .map(|offset| DailyForecast {
            date: today + Duration::days(i64::from(offset)),
            max_temp_c: (base_temp + rng.random_range(0..=5)) as f32,
            min_temp_c: (base_temp - rng.random_range(0..=5)) as f32,
            condition_text: FORECAST_CONDITIONS[rng.random_range(0..FORECAST_CONDITIONS.len())]
                .to_string(),
        })
        .collect()
}

pub fn air_quality() -> AirQualityReading {
    AirQualityReading::MODERATE
}

/// Output of the retired secondary air-quality provider
pub fn secondary_air_quality() -> AirQualityReading {
    AirQualityReading::new(rand::rng().random_range(2..=4))
}

pub fn satellite_observation(at: Coordinate) -> SatelliteObservation {
    SatelliteObservation {
        id: format!("SATDATA_{}_{}", at.lat, at.lon),
        time_start: Utc::now(),
        summary: "Satellite data is currently unavailable".to_string(),
        data_quality: DataQuality::Estimated,
        location: Some(at),
        granule: None,
    }
}

/// Great-circle distance in metres
#[must_use]
pub fn haversine_distance_m(from: &Coordinate, to: &Coordinate) -> f64 {
    let from = HaversineLocation {
        latitude: from.lat,
        longitude: from.lon,
    };
    let to = HaversineLocation {
        latitude: to.lat,
        longitude: to.lon,
    };
    distance(from, to, Units::Kilometers) * 1000.0
}

/// Straight three-point route used when no routing provider answers
#[must_use]
pub fn route(start: Coordinate, end: Coordinate) -> RouteCandidate {
    let distance_m = haversine_distance_m(&start, &end);
    RouteCandidate::new(
        distance_m,
        distance_m * SECONDS_PER_METRE,
        vec![start, start.midpoint(&end), end],
    )
}
