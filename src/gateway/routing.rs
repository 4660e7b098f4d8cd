//! TomTom routing integration: alternative paths between two coordinates.

use anyhow::Result;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{HttpClient, ProviderResult, fallback};
use crate::config::RoutingConfig;
use crate::models::{Coordinate, RouteCandidate};

pub(crate) const PROVIDER: &str = "TomTom";

#[derive(Debug, Clone)]
pub struct RoutingProvider {
    http: HttpClient,
    api_key: Option<String>,
    base_url: String,
    max_alternatives: u32,
}

impl RoutingProvider {
    pub fn new(http: HttpClient, config: &RoutingConfig) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_alternatives: config.max_alternatives,
        }
    }

    /// Candidate routes from `start` to `end`.
    ///
    /// A live answer may legitimately hold no routes; the fallback always
    /// holds exactly one straight route.
    #[instrument(skip(self))]
    pub async fn routes(&self, start: Coordinate, end: Coordinate) -> ProviderResult<Vec<RouteCandidate>> {
        let Some(api_key) = &self.api_key else {
            return ProviderResult::unconfigured(PROVIDER, || vec![fallback::route(start, end)]);
        };

        let url = format!(
            "{}/calculateRoute/{},{}:{},{}/json?key={}&routeType=fastest&traffic=true&maxAlternatives={}",
            self.base_url,
            start.lat,
            start.lon,
            end.lat,
            end.lon,
            urlencoding::encode(api_key),
            self.max_alternatives
        );
        let attempt = self.fetch_routes(&url).await;

        ProviderResult::from_attempt(PROVIDER, attempt, || vec![fallback::route(start, end)])
    }

    async fn fetch_routes(&self, url: &str) -> Result<Vec<RouteCandidate>> {
        let response: ApiResponse = self.http.send_json(PROVIDER, self.http.get(url)).await?;
        let routes = response.into_candidates();
        info!("{} returned {} routes", PROVIDER, routes.len());
        Ok(routes)
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    routes: Vec<RouteResponse>,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    summary: SummaryResponse,
    #[serde(default)]
    legs: Vec<LegResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    #[serde(default)]
    length_in_meters: f64,
    #[serde(default)]
    travel_time_in_seconds: f64,
}

#[derive(Debug, Deserialize)]
struct LegResponse {
    #[serde(default)]
    points: Vec<PointResponse>,
}

#[derive(Debug, Deserialize)]
struct PointResponse {
    latitude: f64,
    longitude: f64,
}

impl ApiResponse {
    /// Routes without legs carry no geometry and are dropped
    fn into_candidates(self) -> Vec<RouteCandidate> {
        self.routes
            .into_iter()
            .filter_map(|route| {
                let leg = route.legs.into_iter().next()?;
                let polyline = leg
                    .points
                    .into_iter()
                    .map(|p| Coordinate::new(p.latitude, p.longitude))
                    .collect();
                Some(RouteCandidate::new(
                    route.summary.length_in_meters,
                    route.summary.travel_time_in_seconds,
                    polyline,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::gateway::mock;
    use axum::{Json, Router, http::StatusCode, routing::get};
    use serde_json::json;

    fn provider(base_url: String, api_key: Option<&str>) -> RoutingProvider {
        let http = HttpClient::new(&HttpConfig::default()).unwrap();
        RoutingProvider::new(
            http,
            &RoutingConfig {
                api_key: api_key.map(str::to_string),
                base_url,
                max_alternatives: 3,
            },
        )
    }

    #[test]
    fn test_parse_routes_skips_routes_without_legs() {
        let response: ApiResponse = serde_json::from_value(json!({
            "routes": [
                {
                    "summary": {"lengthInMeters": 1200, "travelTimeInSeconds": 180},
                    "legs": [{"points": [
                        {"latitude": 30.0, "longitude": 31.0},
                        {"latitude": 30.01, "longitude": 31.01}
                    ]}]
                },
                {"summary": {"lengthInMeters": 900, "travelTimeInSeconds": 200}, "legs": []}
            ]
        }))
        .unwrap();

        let routes = response.into_candidates();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].distance_m, 1200.0);
        assert_eq!(routes[0].duration_s, 180.0);
        assert_eq!(routes[0].polyline[1], Coordinate::new(30.01, 31.01));
    }

    #[test]
    fn test_missing_summary_defaults_to_zero() {
        let response: ApiResponse = serde_json::from_value(json!({
            "routes": [{"legs": [{"points": [{"latitude": 1.0, "longitude": 2.0}]}]}]
        }))
        .unwrap();

        let routes = response.into_candidates();
        assert_eq!(routes[0].distance_m, 0.0);
        assert_eq!(routes[0].duration_s, 0.0);
    }

    #[tokio::test]
    async fn test_without_key_returns_straight_route() {
        let provider = provider(mock::unreachable().await, None);
        let result = provider
            .routes(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0))
            .await;

        assert!(result.is_fallback());
        let routes = result.into_inner();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].polyline.len(), 3);
    }

    #[tokio::test]
    async fn test_live_routes() {
        let app = Router::new().route(
            "/calculateRoute/{path}/json",
            get(|| async {
                Json(json!({"routes": [
                    {"summary": {"lengthInMeters": 5000, "travelTimeInSeconds": 600},
                     "legs": [{"points": [{"latitude": 30.0, "longitude": 31.0}]}]},
                    {"summary": {"lengthInMeters": 5400, "travelTimeInSeconds": 580},
                     "legs": [{"points": [{"latitude": 30.0, "longitude": 31.0}]}]}
                ]}))
            }),
        );
        let provider = provider(mock::serve(app).await, Some("test-key"));

        let result = provider
            .routes(Coordinate::new(30.0, 31.0), Coordinate::new(30.1, 31.1))
            .await;
        assert!(!result.is_fallback());
        assert_eq!(result.value().len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_key_falls_back() {
        let app = Router::new().route(
            "/calculateRoute/{path}/json",
            get(|| async { (StatusCode::FORBIDDEN, "Developer Inactive") }),
        );
        let provider = provider(mock::serve(app).await, Some("bad-key"));

        let result = provider
            .routes(Coordinate::new(30.0, 31.0), Coordinate::new(30.1, 31.1))
            .await;
        assert!(result.is_fallback());
        assert_eq!(result.value().len(), 1);
    }
}
