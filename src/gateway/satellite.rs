//! NASA Earthdata CMR integration: latest land-surface-temperature granule
//! covering a small box around a location.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use super::{HttpClient, ProviderResult, fallback};
use crate::config::SatelliteConfig;
use crate::models::{Coordinate, DataQuality, SatelliteObservation};

pub(crate) const PROVIDER: &str = "NASA Earthdata";

/// MODIS land surface temperature, daily
const PRODUCT_SHORT_NAME: &str = "MOD11A1";
const SEARCH_WINDOW_DAYS: i64 = 30;
const BOX_HALF_SIZE_DEG: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct SatelliteProvider {
    http: HttpClient,
    credentials: Option<(String, String)>,
    base_url: String,
}

impl SatelliteProvider {
    pub fn new(http: HttpClient, config: &SatelliteConfig) -> Self {
        Self {
            http,
            credentials: config
                .credentials()
                .map(|(user, password)| (user.to_string(), password.to_string())),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Newest granule near `at`; without both credentials no request is made
    #[instrument(skip(self))]
    pub async fn observation(&self, at: Coordinate) -> ProviderResult<SatelliteObservation> {
        let Some((username, password)) = &self.credentials else {
            return ProviderResult::unconfigured(PROVIDER, || fallback::satellite_observation(at));
        };

        let url = search_url(&self.base_url, at, Utc::now());
        let attempt = self.fetch_observation(&url, username, password, at).await;

        ProviderResult::from_attempt(PROVIDER, attempt, || fallback::satellite_observation(at))
    }

    async fn fetch_observation(
        &self,
        url: &str,
        username: &str,
        password: &str,
        at: Coordinate,
    ) -> Result<SatelliteObservation> {
        let request = self.http.get(url).basic_auth(username, Some(password));
        let response: GranuleSearchResponse = self.http.send_json(PROVIDER, request).await?;

        let entry = response
            .feed
            .entry
            .into_iter()
            .next()
            .context("No granules found for location")?;

        Ok(observation_from_entry(entry, at))
    }
}

fn search_url(base_url: &str, at: Coordinate, now: DateTime<Utc>) -> String {
    let start = now - Duration::days(SEARCH_WINDOW_DAYS);
    let temporal = format!(
        "{},{}",
        start.format("%Y-%m-%dT%H:%M:%SZ"),
        now.format("%Y-%m-%dT%H:%M:%SZ")
    );
    let bounding_box = format!(
        "{},{},{},{}",
        at.lon - BOX_HALF_SIZE_DEG,
        at.lat - BOX_HALF_SIZE_DEG,
        at.lon + BOX_HALF_SIZE_DEG,
        at.lat + BOX_HALF_SIZE_DEG
    );

    format!(
        "{}/granules.json?short_name={}&temporal={}&bounding_box={}&page_size=1&sort_key=-start_date",
        base_url,
        PRODUCT_SHORT_NAME,
        urlencoding::encode(&temporal),
        urlencoding::encode(&bounding_box)
    )
}

fn observation_from_entry(entry: Value, at: Coordinate) -> SatelliteObservation {
    let text = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_string);

    let time_start = text("time_start")
        .and_then(|t| DateTime::parse_from_rfc3339(&t).ok())
        .map_or_else(Utc::now, |t| t.with_timezone(&Utc));

    SatelliteObservation {
        id: text("id").unwrap_or_else(|| {
            format!("{PRODUCT_SHORT_NAME}_{}", time_start.to_rfc3339_opts(SecondsFormat::Secs, true))
        }),
        time_start,
        summary: text("summary")
            .or_else(|| text("title"))
            .unwrap_or_else(|| format!("{PRODUCT_SHORT_NAME} granule")),
        data_quality: DataQuality::Measured,
        location: Some(at),
        granule: Some(entry),
    }
}

#[derive(Debug, Deserialize)]
struct GranuleSearchResponse {
    feed: Feed,
}

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(default)]
    entry: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::gateway::mock;
    use axum::{Json, Router, routing::get};
    use chrono::TimeZone;
    use serde_json::json;

    fn provider(base_url: String, username: Option<&str>, password: Option<&str>) -> SatelliteProvider {
        let http = HttpClient::new(&HttpConfig::default()).unwrap();
        SatelliteProvider::new(
            http,
            &SatelliteConfig {
                username: username.map(str::to_string),
                password: password.map(str::to_string),
                base_url,
            },
        )
    }

    #[test]
    fn test_search_url_parameters() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
        let url = search_url("https://cmr.example", Coordinate::new(30.0, 31.0), now);

        assert!(url.starts_with("https://cmr.example/granules.json?short_name=MOD11A1"));
        assert!(url.contains("temporal=2025-03-01T12%3A00%3A00Z%2C2025-03-31T12%3A00%3A00Z"));
        assert!(url.contains("bounding_box=30.9%2C29.9%2C31.1%2C30.1"));
        assert!(url.ends_with("page_size=1&sort_key=-start_date"));
    }

    #[test]
    fn test_observation_from_entry() {
        let entry = json!({
            "id": "G123-LPDAAC",
            "title": "MOD11A1.A2025089.h21v06.061",
            "time_start": "2025-03-30T00:00:00.000Z"
        });
        let observation = observation_from_entry(entry, Coordinate::new(30.0, 31.0));

        assert_eq!(observation.id, "G123-LPDAAC");
        assert_eq!(observation.summary, "MOD11A1.A2025089.h21v06.061");
        assert_eq!(observation.data_quality, DataQuality::Measured);
        assert_eq!(
            observation.time_start,
            Utc.with_ymd_and_hms(2025, 3, 30, 0, 0, 0).unwrap()
        );
        assert!(observation.granule.is_some());
    }

    #[tokio::test]
    async fn test_missing_password_skips_network() {
        let provider = provider(mock::unreachable().await, Some("user"), None);
        let result = provider.observation(Coordinate::new(30.0, 31.0)).await;

        assert!(result.is_fallback());
        assert!(result.value().is_estimated());
    }

    #[tokio::test]
    async fn test_live_granule() {
        let app = Router::new().route(
            "/granules.json",
            get(|| async {
                Json(json!({"feed": {"entry": [
                    {"id": "G1", "summary": "Land surface temperature", "time_start": "2025-03-30T00:00:00Z"}
                ]}}))
            }),
        );
        let provider = provider(mock::serve(app).await, Some("user"), Some("secret"));

        let result = provider.observation(Coordinate::new(30.0, 31.0)).await;
        let ProviderResult::Live(observation) = result else {
            panic!("expected live observation, got {result:?}");
        };
        assert_eq!(observation.id, "G1");
        assert_eq!(observation.summary, "Land surface temperature");
    }

    #[tokio::test]
    async fn test_empty_feed_falls_back() {
        let app = Router::new().route(
            "/granules.json",
            get(|| async { Json(json!({"feed": {"entry": []}})) }),
        );
        let provider = provider(mock::serve(app).await, Some("user"), Some("secret"));

        let result = provider.observation(Coordinate::new(30.0, 31.0)).await;
        assert!(result.is_fallback());
        assert_eq!(result.value().id, "SATDATA_30_31");
    }
}
