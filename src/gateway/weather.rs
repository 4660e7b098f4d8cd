//! WeatherAPI integration: current conditions, daily forecast and the EPA
//! air-quality index reported alongside current conditions.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use super::{HttpClient, ProviderResult, fallback};
use crate::config::WeatherConfig;
use crate::models::{AirQualityReading, Coordinate, DailyForecast, WeatherSnapshot};
use crate::scoring::epa_to_internal;

pub(crate) const PROVIDER: &str = "WeatherAPI";

/// EPA index assumed when the provider omits it from an air-quality block
const DEFAULT_EPA_INDEX: i64 = 3;

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    http: HttpClient,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(http: HttpClient, config: &WeatherConfig) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Current conditions at a location
    #[instrument(skip(self))]
    pub async fn current(&self, at: Coordinate) -> ProviderResult<WeatherSnapshot> {
        let Some(api_key) = &self.api_key else {
            return ProviderResult::unconfigured(PROVIDER, fallback::weather_snapshot);
        };

        let url = format!(
            "{}/current.json?key={}&q={},{}",
            self.base_url,
            urlencoding::encode(api_key),
            at.lat,
            at.lon
        );
        let attempt = self
            .http
            .send_json::<CurrentResponse>(PROVIDER, self.http.get(&url))
            .await
            .map(WeatherSnapshot::from);

        ProviderResult::from_attempt(PROVIDER, attempt, fallback::weather_snapshot)
    }

    /// Daily forecast for `days` days starting today
    #[instrument(skip(self))]
    pub async fn forecast(&self, at: Coordinate, days: u8) -> ProviderResult<Vec<DailyForecast>> {
        let today = Utc::now().date_naive();
        let Some(api_key) = &self.api_key else {
            return ProviderResult::unconfigured(PROVIDER, || {
                fallback::daily_forecast(days, today)
            });
        };

        let url = format!(
            "{}/forecast.json?key={}&q={},{}&days={}",
            self.base_url,
            urlencoding::encode(api_key),
            at.lat,
            at.lon,
            days
        );
        let attempt = self
            .http
            .send_json::<ForecastResponse>(PROVIDER, self.http.get(&url))
            .await
            .and_then(ForecastResponse::into_days);

        if let Ok(forecast) = &attempt {
            info!("Retrieved {} forecast days", forecast.len());
        }

        ProviderResult::from_attempt(PROVIDER, attempt, || fallback::daily_forecast(days, today))
    }

    /// Air quality derived from the provider's US EPA index
    #[instrument(skip(self))]
    pub async fn air_quality(&self, at: Coordinate) -> ProviderResult<AirQualityReading> {
        let Some(api_key) = &self.api_key else {
            return ProviderResult::unconfigured(PROVIDER, fallback::air_quality);
        };

        let url = format!(
            "{}/current.json?key={}&q={},{}&aqi=yes",
            self.base_url,
            urlencoding::encode(api_key),
            at.lat,
            at.lon
        );
        let attempt = self.fetch_air_quality(&url).await;
        ProviderResult::from_attempt(PROVIDER, attempt, fallback::air_quality)
    }

    async fn fetch_air_quality(&self, url: &str) -> Result<AirQualityReading> {
        let body: Value = self.http.send_json(PROVIDER, self.http.get(url)).await?;
        parse_air_quality(&body).context("Response has no current air-quality block")
    }
}

/// Read `current.air_quality["us-epa-index"]` and convert it to the internal
/// scale. `None` when the air-quality block itself is missing.
pub fn parse_air_quality(body: &Value) -> Option<AirQualityReading> {
    let block = body.get("current")?.get("air_quality")?;
    if !block.is_object() {
        return None;
    }

    let epa_index = match block.get("us-epa-index") {
        None | Some(Value::Null) => DEFAULT_EPA_INDEX,
        Some(index) => index.as_i64().or_else(|| index.as_f64().map(|f| f as i64))?,
    };

    Some(AirQualityReading::new(epa_to_internal(epa_index)))
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentData,
}

#[derive(Debug, Deserialize)]
struct CurrentData {
    temp_c: f32,
    condition: Condition,
    humidity: f32,
    wind_kph: f32,
    feelslike_c: f32,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

impl From<CurrentResponse> for WeatherSnapshot {
    fn from(response: CurrentResponse) -> Self {
        let current = response.current;
        WeatherSnapshot {
            temperature_c: current.temp_c,
            condition_text: current.condition.text,
            humidity_pct: current.humidity.round().clamp(0.0, 100.0) as u8,
            wind_kph: current.wind_kph,
            feels_like_c: current.feelslike_c,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    forecast: ForecastData,
}

#[derive(Debug, Deserialize)]
struct ForecastData {
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: NaiveDate,
    day: DaySummary,
}

#[derive(Debug, Deserialize)]
struct DaySummary {
    maxtemp_c: f32,
    mintemp_c: f32,
    condition: Condition,
}

impl ForecastResponse {
    fn into_days(self) -> Result<Vec<DailyForecast>> {
        anyhow::ensure!(!self.forecast.forecastday.is_empty(), "forecast has no days");
        Ok(self
            .forecast
            .forecastday
            .into_iter()
            .map(|day| DailyForecast {
                date: day.date,
                max_temp_c: day.day.maxtemp_c,
                min_temp_c: day.day.mintemp_c,
                condition_text: day.day.condition.text,
            })
            .collect())
    }
}
