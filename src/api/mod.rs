//! HTTP endpoints
//!
//! Thin handlers: parse parameters, call the [`SafetyService`], serialize.
//! Paths keep their trailing slash.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::AirSafeError;
use crate::advisory::FALLBACK_ADVICE;
use crate::gateway::ProviderResult;
use crate::models::{AirQualityReading, DailyForecast, RouteCandidate, WeatherSnapshot};
use crate::service::{
    AdviceReport, ComprehensiveReport, FutureAirQualityReport, HealthStatus, NearestSafeLocationReport,
    SafetyReport, SafetyService,
};

pub mod params;

use params::{AdviceRequest, ApiQuery, ForecastQuery, LocationQuery, RouteQuery};


type AppState = State<Arc<SafetyService>>;
type ApiResult<T> = Result<Json<T>, AirSafeError>;

const ADVICE_UNAVAILABLE: &str = "Generative advice is not configured or unavailable.";

pub fn routes() -> Router<Arc<SafetyService>> {
    Router::new()
        .route("/air-quality/", get(air_quality))
        .route("/future-air-quality/", get(future_air_quality))
        .route("/safety-score/", get(safety_score))
        .route("/best-route/", get(best_route))
        .route("/nearest-safe-location/", get(nearest_safe_location))
        .route("/comprehensive-safety/", get(comprehensive_safety))
        .route("/weather/", get(weather))
        .route("/future-weather/", get(future_weather))
        .route("/ai-advice/", post(ai_advice))
        .route("/health/", get(health))
}

async fn air_quality(
    State(service): AppState,
    ApiQuery(query): ApiQuery<LocationQuery>,
) -> ApiResult<AirQualityReading> {
    let at = query.coordinate()?;
    Ok(Json(service.air_quality(at).await))
}

async fn future_air_quality(
    State(service): AppState,
    ApiQuery(query): ApiQuery<ForecastQuery>,
) -> ApiResult<FutureAirQualityReport> {
    let (at, days) = query.coordinate_and_days()?;
    Ok(Json(service.future_air_quality(at, days).await))
}

async fn safety_score(
    State(service): AppState,
    ApiQuery(query): ApiQuery<LocationQuery>,
) -> ApiResult<SafetyReport> {
    let at = query.coordinate()?;
    Ok(Json(service.safety_score(at).await))
}

async fn best_route(
    State(service): AppState,
    ApiQuery(query): ApiQuery<RouteQuery>,
) -> ApiResult<RouteCandidate> {
    let (start, end) = query.endpoints()?;
    service
        .best_route(start, end)
        .await
        .map(Json)
        .ok_or_else(|| AirSafeError::not_found("No routes found."))
}

async fn nearest_safe_location(
    State(service): AppState,
    ApiQuery(query): ApiQuery<LocationQuery>,
) -> ApiResult<NearestSafeLocationReport> {
    let origin = query.coordinate()?;
    service
        .nearest_safe_location(origin)
        .await
        .map(Json)
        .ok_or_else(|| AirSafeError::not_found("No safe locations found."))
}

async fn comprehensive_safety(
    State(service): AppState,
    ApiQuery(query): ApiQuery<LocationQuery>,
) -> ApiResult<ComprehensiveReport> {
    let at = query.coordinate()?;
    Ok(Json(service.comprehensive(at).await))
}

async fn weather(
    State(service): AppState,
    ApiQuery(query): ApiQuery<LocationQuery>,
) -> ApiResult<ProviderResult<WeatherSnapshot>> {
    let at = query.coordinate()?;
    Ok(Json(service.weather(at).await))
}

async fn future_weather(
    State(service): AppState,
    ApiQuery(query): ApiQuery<ForecastQuery>,
) -> ApiResult<Vec<DailyForecast>> {
    let (at, days) = query.coordinate_and_days()?;
    Ok(Json(service.future_weather(at, days).await))
}

/// Advice failure: the usual error plus the static advice text
#[derive(Debug)]
struct AdviceRejection(AirSafeError);

impl IntoResponse for AdviceRejection {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.0.user_message(), "advice": FALLBACK_ADVICE });
        (self.0.status_code(), Json(body)).into_response()
    }
}

impl From<AirSafeError> for AdviceRejection {
    fn from(error: AirSafeError) -> Self {
        Self(error)
    }
}

/// Availability is checked before the body is even parsed
async fn ai_advice(
    State(service): AppState,
    body: Bytes,
) -> Result<Json<AdviceReport>, AdviceRejection> {
    if !service.advice_available() {
        return Err(AirSafeError::unavailable(ADVICE_UNAVAILABLE).into());
    }

    let request = AdviceRequest::from_body(&body)?;
    Ok(Json(service.advice(request.location, request.prompt.as_deref()).await))
}

async fn health(State(service): AppState) -> Json<HealthStatus> {
    Json(service.health())
}
