//! Route candidate model

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// One possible path between two coordinates
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RouteCandidate {
    /// Length in metres
    pub distance_m: f64,
    /// Estimated travel time in seconds
    pub duration_s: f64,
    /// Ordered points along the path
    pub polyline: Vec<Coordinate>,
}

impl RouteCandidate {
    #[must_use]
    pub fn new(distance_m: f64, duration_s: f64, polyline: Vec<Coordinate>) -> Self {
        Self {
            distance_m,
            duration_s,
            polyline,
        }
    }
}
