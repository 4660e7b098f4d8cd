//! Location model for geographic coordinates

use serde::{Deserialize, Serialize};

/// A point on the globe in decimal degrees.
///
/// Values are taken as given: there is no range check and no clamping.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Shift by a delta in degrees
    #[must_use]
    pub fn offset(&self, dlat: f64, dlon: f64) -> Self {
        Self::new(self.lat + dlat, self.lon + dlon)
    }

    /// Arithmetic mean of two coordinates
    #[must_use]
    pub fn midpoint(&self, other: &Coordinate) -> Self {
        Self::new((self.lat + other.lat) / 2.0, (self.lon + other.lon) / 2.0)
    }

    /// Straight-line distance on raw degree differences (not geodesic)
    #[must_use]
    pub fn degree_distance(&self, other: &Coordinate) -> f64 {
        ((self.lat - other.lat).powi(2) + (self.lon - other.lon).powi(2)).sqrt()
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint() {
        let a = Coordinate::new(10.0, 20.0);
        let b = Coordinate::new(20.0, 40.0);
        assert_eq!(a.midpoint(&b), Coordinate::new(15.0, 30.0));
    }

    #[test]
    fn test_degree_distance() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(3.0, 4.0);
        assert!((a.degree_distance(&b) - 5.0).abs() < 1e-12);
        assert_eq!(a.degree_distance(&a), 0.0);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(Coordinate::new(30.0, 31.5)).unwrap();
        assert_eq!(json, serde_json::json!({"lat": 30.0, "lon": 31.5}));
    }

    #[test]
    fn test_format_coordinates() {
        let location = Coordinate::new(46.818_234, 8.227_456);
        assert_eq!(location.format_coordinates(), "46.8182, 8.2275");
    }
}
