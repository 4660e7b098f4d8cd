//! Request orchestration
//!
//! One method per endpoint. Each awaits its provider calls one after another,
//! then scores and shapes the result. None of them can fail: provider trouble
//! is absorbed by the gateway and selection misses come back as `None`.

use chrono::{Duration, NaiveDate, Utc};
use rand::RngExt;
use serde::Serialize;
use tracing::{info, instrument};

use crate::advisory::{AdvisoryContext, Summarizer};
use crate::config::AirSafeConfig;
use crate::gateway::{Gateway, HttpClient, ProviderResult};
use crate::models::{
    AirQualityReading, Coordinate, DailyForecast, RouteCandidate, SafetyLevel, SafetyScore,
    SatelliteObservation, WeatherSnapshot,
};
use crate::selection;

/// Lowest and highest value on the internal air-quality scale
const AQI_RANGE: (u8, u8) = (1, 5);

/// Score and index reported together by most endpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyReport {
    pub safety_score: u8,
    pub safety_level: SafetyLevel,
    pub air_quality_index: u8,
}

impl From<AirQualityReading> for SafetyReport {
    fn from(reading: AirQualityReading) -> Self {
        let SafetyScore { score, level } = SafetyScore::from(reading);
        Self {
            safety_score: score,
            safety_level: level,
            air_quality_index: reading.aqi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FutureAirQuality {
    pub date: NaiveDate,
    pub predicted_aqi: u8,
    pub safety_score: u8,
    pub safety_level: SafetyLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FutureAirQualityReport {
    pub future_air_quality: Vec<FutureAirQuality>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafeLocation {
    pub lat: f64,
    pub lon: f64,
    #[serde(flatten)]
    pub report: SafetyReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestSafeLocationReport {
    pub nearest_safe_location: SafeLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComprehensiveReport {
    #[serde(flatten)]
    pub report: SafetyReport,
    pub satellite_observation: SatelliteObservation,
    pub location: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdviceReport {
    pub advice: String,
    #[serde(flatten)]
    pub report: SafetyReport,
    pub location: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
    pub environment: String,
}

/// Everything a request handler needs, built once at startup
#[derive(Debug, Clone)]
pub struct SafetyService {
    gateway: Gateway,
    summarizer: Summarizer,
    environment: String,
}

impl SafetyService {
    pub fn new(gateway: Gateway, summarizer: Summarizer, environment: impl Into<String>) -> Self {
        Self {
            gateway,
            summarizer,
            environment: environment.into(),
        }
    }

    /// Wire providers and the summarizer from configuration.
    ///
    /// Missing credentials are not an error here; the affected providers
    /// simply answer with fallback data.
    pub fn from_config(config: &AirSafeConfig) -> anyhow::Result<Self> {
        let http = HttpClient::new(&config.http)?;
        let gateway = Gateway::new(http.clone(), config);
        let summarizer = Summarizer::from_config(&config.advisory, http);

        info!(
            "Service ready (environment: {}, advice available: {})",
            config.server.environment,
            summarizer.is_available()
        );
        Ok(Self::new(gateway, summarizer, config.server.environment.clone()))
    }

    pub fn advice_available(&self) -> bool {
        self.summarizer.is_available()
    }

    #[instrument(skip(self))]
    pub async fn air_quality(&self, at: Coordinate) -> AirQualityReading {
        self.gateway.combined_air_quality(at).await
    }

    /// Today's reading with a random drift of at most one step per day
    #[instrument(skip(self))]
    pub async fn future_air_quality(&self, at: Coordinate, days: u8) -> FutureAirQualityReport {
        let current = self.gateway.combined_air_quality(at).await;
        let today = Utc::now().date_naive();
        let mut rng = rand::rng();

        let future_air_quality = (0..days)
            .map(|offset| {
                let predicted = drift(current.aqi, rng.random_range(-1..=1));
                let SafetyScore { score, level } = SafetyScore::from(AirQualityReading::new(predicted));
                FutureAirQuality {
                    date: today + Duration::days(i64::from(offset)),
                    predicted_aqi: predicted,
                    safety_score: score,
                    safety_level: level,
                }
            })
            .collect();

        FutureAirQualityReport { future_air_quality }
    }

    #[instrument(skip(self))]
    pub async fn safety_score(&self, at: Coordinate) -> SafetyReport {
        SafetyReport::from(self.gateway.combined_air_quality(at).await)
    }

    #[instrument(skip(self))]
    pub async fn best_route(&self, start: Coordinate, end: Coordinate) -> Option<RouteCandidate> {
        let routes = self.gateway.routing.routes(start, end).await.into_inner();
        selection::best_route(routes, &self.gateway).await
    }

    #[instrument(skip(self))]
    pub async fn nearest_safe_location(&self, origin: Coordinate) -> Option<NearestSafeLocationReport> {
        let candidates = selection::nearby_candidates(origin);
        let ranked = selection::nearest_safe_location(origin, &candidates, &self.gateway).await?;

        Some(NearestSafeLocationReport {
            nearest_safe_location: SafeLocation {
                lat: ranked.location.lat,
                lon: ranked.location.lon,
                report: SafetyReport::from(ranked.air_quality),
            },
        })
    }

    #[instrument(skip(self))]
    pub async fn comprehensive(&self, at: Coordinate) -> ComprehensiveReport {
        let report = self.safety_score(at).await;
        let satellite_observation = self.gateway.satellite.observation(at).await.into_inner();

        ComprehensiveReport {
            report,
            satellite_observation,
            location: at,
        }
    }

    #[instrument(skip(self))]
    pub async fn weather(&self, at: Coordinate) -> ProviderResult<WeatherSnapshot> {
        self.gateway.weather.current(at).await
    }

    #[instrument(skip(self))]
    pub async fn future_weather(&self, at: Coordinate, days: u8) -> Vec<DailyForecast> {
        self.gateway.weather.forecast(at, days).await.into_inner()
    }

    /// Metrics for `at` summarized into advice; the static text stands in
    /// whenever generation is impossible
    #[instrument(skip(self, prompt))]
    pub async fn advice(&self, at: Coordinate, prompt: Option<&str>) -> AdviceReport {
        let air_quality = self.gateway.combined_air_quality(at).await;
        let weather = self.gateway.weather.current(at).await.into_inner();
        let context = AdvisoryContext {
            location: at,
            air_quality,
            safety: SafetyScore::from(air_quality),
            weather,
        };

        let advice = self.summarizer.advise(&context, prompt).await;
        AdviceReport {
            advice: advice.into_text(),
            report: SafetyReport::from(air_quality),
            location: at,
        }
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy",
            database: "not_configured",
            environment: self.environment.clone(),
        }
    }
}

/// Shift an index by `step`, staying on the 1-5 scale
fn drift(aqi: u8, step: i8) -> u8 {
    let (low, high) = AQI_RANGE;
    (i16::from(aqi) + i16::from(step)).clamp(i16::from(low), i16::from(high)) as u8
}
