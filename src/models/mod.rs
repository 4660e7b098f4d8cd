//! Data models for the AirSafe service
//!
//! Every value here is request-scoped: built while handling one request,
//! never mutated afterwards, dropped once the response is serialized.
//! - Location: geographic coordinates
//! - Air quality: internal 1-5 index and the derived safety score
//! - Weather: current snapshot and daily forecast entries
//! - Route: candidate paths between two coordinates
//! - Satellite: earth-observation records

pub mod air_quality;
pub mod location;
pub mod route;
pub mod satellite;
pub mod weather;

// Re-export all public types for convenient access
pub use air_quality::{AirQualityReading, SafetyLevel, SafetyScore};
pub use location::Coordinate;
pub use route::RouteCandidate;
pub use satellite::{DataQuality, SatelliteObservation};
pub use weather::{DailyForecast, WeatherSnapshot};
