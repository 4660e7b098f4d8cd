//! External data gateway
//!
//! Wraps every outbound call to a third-party provider. Each provider call has
//! a synthetic twin in [`fallback`], and the public functions return a
//! [`ProviderResult`] instead of an error: a missing credential, a transport
//! failure, a non-2xx status or a body without the expected fields all yield
//! `ProviderResult::Fallback`. Endpoints therefore never fail because a third
//! party is down.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::AirSafeConfig;
use crate::models::{AirQualityReading, Coordinate};

pub mod fallback;
pub mod http;
pub mod routing;
pub mod satellite;
pub mod weather;

pub use http::HttpClient;
pub use routing::RoutingProvider;
pub use satellite::SatelliteProvider;
pub use weather::WeatherProvider;

/// Outcome of a provider call: the real payload or a synthetic one of the
/// same shape.
///
/// Serializes as the payload's own fields plus `"source": "live" | "fallback"`,
/// so it must wrap struct-like payloads when it is serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ProviderResult<T> {
    Live(T),
    Fallback(T),
}

impl<T> ProviderResult<T> {
    /// Turn one provider attempt into a result, substituting on failure
    pub fn from_attempt(
        provider: &str,
        attempt: anyhow::Result<T>,
        fallback: impl FnOnce() -> T,
    ) -> Self {
        match attempt {
            Ok(value) => Self::Live(value),
            Err(e) => {
                warn!("{} failed, using fallback data: {:#}", provider, e);
                Self::Fallback(fallback())
            }
        }
    }

    /// Fallback taken without attempting a call. Missing credentials are
    /// reported once when the [`Gateway`] is built.
    pub fn unconfigured(provider: &str, fallback: impl FnOnce() -> T) -> Self {
        debug!("{} is not configured, using fallback data", provider);
        Self::Fallback(fallback())
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Live(value) | Self::Fallback(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Live(value) | Self::Fallback(value) => value,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ProviderResult<U> {
        match self {
            Self::Live(value) => ProviderResult::Live(f(value)),
            Self::Fallback(value) => ProviderResult::Fallback(f(value)),
        }
    }
}

/// Anything that can rate the air at a point on the internal 1-5 scale.
///
/// Implementations never fail; they resolve to a neutral reading instead.
#[async_trait]
pub trait AirQualitySource: Send + Sync {
    async fn air_quality(&self, at: Coordinate) -> AirQualityReading;
}

/// Retired secondary air-quality provider.
///
/// Kept so callers written against two providers still compile; it ignores
/// its input and only ever produces fallback values.
#[derive(Debug, Default, Clone)]
pub struct SecondaryAirQuality;

impl SecondaryAirQuality {
    pub async fn fetch(&self, _at: Coordinate) -> ProviderResult<AirQualityReading> {
        tracing::info!("Secondary air-quality provider is retired, using fallback data");
        ProviderResult::Fallback(fallback::secondary_air_quality())
    }
}

#[async_trait]
impl AirQualitySource for SecondaryAirQuality {
    async fn air_quality(&self, at: Coordinate) -> AirQualityReading {
        self.fetch(at).await.into_inner()
    }
}

/// All providers, built once at startup
#[derive(Debug, Clone)]
pub struct Gateway {
    pub weather: WeatherProvider,
    pub satellite: SatelliteProvider,
    pub routing: RoutingProvider,
    pub secondary: SecondaryAirQuality,
}

impl Gateway {
    pub fn from_config(config: &AirSafeConfig) -> anyhow::Result<Self> {
        Ok(Self::new(HttpClient::new(&config.http)?, config))
    }

    /// Providers sharing one HTTP client
    pub fn new(http: HttpClient, config: &AirSafeConfig) -> Self {
        for provider in unconfigured_providers(config) {
            warn!("{} credentials not configured, its data will be synthetic", provider);
        }

        Self {
            weather: WeatherProvider::new(http.clone(), &config.weather),
            satellite: SatelliteProvider::new(http.clone(), &config.satellite),
            routing: RoutingProvider::new(http, &config.routing),
            secondary: SecondaryAirQuality,
        }
    }

    /// Combined air-quality resolution.
    ///
    /// Only the weather provider's EPA-derived index is used; when it is not
    /// available the reading is the moderate default. The secondary provider
    /// is deliberately not consulted.
    pub async fn combined_air_quality(&self, at: Coordinate) -> AirQualityReading {
        let reading = self.weather.air_quality(at).await.into_inner();
        tracing::info!("Final AQI for {}: {}", at.format_coordinates(), reading.aqi);
        reading
    }
}

/// Providers that will only ever answer with fallback data
pub fn unconfigured_providers(config: &AirSafeConfig) -> Vec<&'static str> {
    [
        (weather::PROVIDER, config.weather.api_key.is_some()),
        (satellite::PROVIDER, config.satellite.credentials().is_some()),
        (routing::PROVIDER, config.routing.api_key.is_some()),
    ]
    .into_iter()
    .filter_map(|(provider, configured)| (!configured).then_some(provider))
    .collect()
}

#[async_trait]
impl AirQualitySource for Gateway {
    async fn air_quality(&self, at: Coordinate) -> AirQualityReading {
        self.combined_air_quality(at).await
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Local stand-in for third-party APIs

    use axum::Router;
    use tokio::net::TcpListener;

    /// Serve `app` on an ephemeral port and return its base URL
    pub async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// A base URL nothing listens on
    pub async fn unreachable() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }
}
