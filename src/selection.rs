//! Route and location selection by air quality
//!
//! Both selectors look up air quality point by point through an
//! [`AirQualitySource`], one awaited call at a time and without memoizing:
//! two candidates sharing a point trigger two lookups.

use std::cmp::Ordering;

use tracing::debug;

use crate::gateway::AirQualitySource;
use crate::models::{AirQualityReading, Coordinate, RouteCandidate};

/// Points sampled from the head of each polyline
const ROUTE_SAMPLE_POINTS: usize = 3;

/// Offsets, in degrees, of the places evaluated around an origin
const NEARBY_OFFSETS: [(f64, f64); 4] = [(0.01, 0.01), (-0.01, -0.01), (0.02, -0.02), (-0.02, 0.02)];

/// Mean AQI over the first few points of a route; `None` for an empty polyline
pub async fn route_cost(route: &RouteCandidate, source: &dyn AirQualitySource) -> Option<f64> {
    let sample = &route.polyline[..route.polyline.len().min(ROUTE_SAMPLE_POINTS)];
    if sample.is_empty() {
        return None;
    }

    let mut total = 0.0;
    for point in sample {
        total += f64::from(source.air_quality(*point).await.aqi);
    }
    Some(total / sample.len() as f64)
}

/// Route with the lowest mean sampled AQI. The first of equal-cost routes
/// wins; `None` when nothing can be scored.
pub async fn best_route(
    routes: Vec<RouteCandidate>,
    source: &dyn AirQualitySource,
) -> Option<RouteCandidate> {
    let mut best: Option<(f64, RouteCandidate)> = None;

    for route in routes {
        let Some(cost) = route_cost(&route, source).await else {
            debug!("Skipping route without geometry");
            continue;
        };
        debug!("Route of {:.0} m has mean AQI {:.2}", route.distance_m, cost);

        if best.as_ref().is_none_or(|(best_cost, _)| cost < *best_cost) {
            best = Some((cost, route));
        }
    }

    best.map(|(_, route)| route)
}

/// A candidate place with the data it was ranked by
#[derive(Debug, Clone, PartialEq)]
pub struct RankedLocation {
    pub location: Coordinate,
    pub air_quality: AirQualityReading,
    /// Euclidean distance from the origin in raw degrees
    pub distance_deg: f64,
}

/// Candidate with the best air, ties broken by proximity to `origin`
pub async fn nearest_safe_location(
    origin: Coordinate,
    candidates: &[Coordinate],
    source: &dyn AirQualitySource,
) -> Option<RankedLocation> {
    let mut ranked = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        ranked.push(RankedLocation {
            location: *candidate,
            air_quality: source.air_quality(*candidate).await,
            distance_deg: origin.degree_distance(candidate),
        });
    }

    // stable sort keeps input order for exact ties
    ranked.sort_by(|a, b| {
        a.air_quality
            .aqi
            .cmp(&b.air_quality.aqi)
            .then_with(|| a.distance_deg.partial_cmp(&b.distance_deg).unwrap_or(Ordering::Equal))
    });
    ranked.into_iter().next()
}

/// Places evaluated by the nearest-safe-location endpoint
#[must_use]
pub fn nearby_candidates(origin: Coordinate) -> Vec<Coordinate> {
    NEARBY_OFFSETS
        .iter()
        .map(|(dlat, dlon)| origin.offset(*dlat, *dlon))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Reads the AQI from a lookup keyed on latitude, counting calls
    struct LookupSource {
        readings: Vec<(f64, u8)>,
        calls: Mutex<Vec<Coordinate>>,
    }

    impl LookupSource {
        fn new(readings: &[(f64, u8)]) -> Self {
            Self {
                readings: readings.to_vec(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AirQualitySource for LookupSource {
        async fn air_quality(&self, at: Coordinate) -> AirQualityReading {
            self.calls.lock().unwrap().push(at);
            let aqi = self
                .readings
                .iter()
                .find(|(lat, _)| (*lat - at.lat).abs() < 1e-9)
                .map_or(3, |(_, aqi)| *aqi);
            AirQualityReading::new(aqi)
        }
    }

    fn route(distance_m: f64, lats: &[f64]) -> RouteCandidate {
        RouteCandidate::new(
            distance_m,
            distance_m * 2.0,
            lats.iter().map(|lat| Coordinate::new(*lat, 0.0)).collect(),
        )
    }

    #[tokio::test]
    async fn test_best_route_prefers_cleaner_air() {
        let source = LookupSource::new(&[(1.0, 2), (2.0, 4)]);
        let clean = route(1000.0, &[1.0, 1.0, 1.0]);
        let dirty = route(500.0, &[2.0, 2.0, 2.0]);

        let best = best_route(vec![dirty, clean.clone()], &source).await;
        assert_eq!(best, Some(clean));
    }

    #[tokio::test]
    async fn test_route_cost_samples_first_three_points() {
        let source = LookupSource::new(&[(1.0, 1), (2.0, 2), (3.0, 3), (4.0, 5)]);
        let long = route(100.0, &[1.0, 2.0, 3.0, 4.0, 4.0]);

        let cost = route_cost(&long, &source).await;
        assert_eq!(cost, Some(2.0));
        assert_eq!(source.call_count(), 3);
    }

    #[tokio::test]
    async fn test_route_cost_short_polyline() {
        let source = LookupSource::new(&[(1.0, 1), (2.0, 4)]);
        let short = route(100.0, &[1.0, 2.0]);
        assert_eq!(route_cost(&short, &source).await, Some(2.5));
        assert_eq!(route_cost(&route(1.0, &[]), &source).await, None);
    }

    #[tokio::test]
    async fn test_best_route_tie_keeps_first() {
        let source = LookupSource::new(&[]);
        let first = route(100.0, &[1.0]);
        let second = route(200.0, &[2.0]);

        let best = best_route(vec![first.clone(), second], &source).await;
        assert_eq!(best, Some(first));
    }

    #[tokio::test]
    async fn test_best_route_empty() {
        let source = LookupSource::new(&[]);
        assert_eq!(best_route(Vec::new(), &source).await, None);
        assert_eq!(best_route(vec![route(1.0, &[])], &source).await, None);
    }

    #[tokio::test]
    async fn test_no_caching_across_candidates() {
        let source = LookupSource::new(&[]);
        let shared = route(100.0, &[1.0, 1.0]);
        best_route(vec![shared.clone(), shared], &source).await;
        assert_eq!(source.call_count(), 4);
    }

    #[tokio::test]
    async fn test_nearest_tie_broken_by_distance() {
        let origin = Coordinate::new(0.0, 0.0);
        let far = Coordinate::new(5.0, 0.0);
        let near = Coordinate::new(1.0, 0.0);
        let source = LookupSource::new(&[(5.0, 2), (1.0, 2)]);

        let nearest = nearest_safe_location(origin, &[far, near], &source).await.unwrap();
        assert_eq!(nearest.location, near);
        assert_eq!(nearest.distance_deg, 1.0);
        assert_eq!(nearest.air_quality.aqi, 2);
    }

    #[tokio::test]
    async fn test_nearest_prefers_air_over_distance() {
        let origin = Coordinate::new(0.0, 0.0);
        let near_dirty = Coordinate::new(1.0, 0.0);
        let far_clean = Coordinate::new(9.0, 0.0);
        let source = LookupSource::new(&[(1.0, 4), (9.0, 1)]);

        let nearest = nearest_safe_location(origin, &[near_dirty, far_clean], &source)
            .await
            .unwrap();
        assert_eq!(nearest.location, far_clean);
    }

    #[tokio::test]
    async fn test_nearest_empty() {
        let source = LookupSource::new(&[]);
        assert!(nearest_safe_location(Coordinate::new(0.0, 0.0), &[], &source).await.is_none());
    }

    #[test]
    fn test_nearby_candidates() {
        let candidates = nearby_candidates(Coordinate::new(30.0, 31.0));
        assert_eq!(candidates.len(), 4);
        assert!((candidates[0].lat - 30.01).abs() < 1e-9);
        assert!((candidates[2].lon - 30.98).abs() < 1e-9);
    }
}
