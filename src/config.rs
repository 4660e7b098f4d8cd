//! Configuration management for the `AirSafe` service
//!
//! Configuration is assembled once at startup from defaults, an optional TOML
//! file, `AIRSAFE_`-prefixed environment variables and the provider variables
//! used by existing deployments (`AIR_API_KEY`, `TOMTOM_API_KEY`, ...). The
//! resulting value is immutable and shared with every request handler.
//!
//! A missing provider credential is never an error: it switches the matching
//! provider to its fallback generator.

use crate::AirSafeError;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Root configuration structure for the `AirSafe` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirSafeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub satellite: SatelliteConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub advisory: AdvisoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Deployment environment name reported by the health endpoint
    pub environment: String,
}

/// Outbound HTTP settings shared by every provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Weather provider (current conditions, forecast and EPA air-quality index)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

/// Earth-observation provider credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SatelliteConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub base_url: String,
}

/// Routing provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Number of alternative routes requested besides the primary one
    pub max_alternatives: u32,
}

/// Generative-language API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// First model tried for every advice request
    pub primary_model: String,
    /// Models tried in order after the primary one fails
    pub alternate_models: Vec<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

fn default_satellite_base_url() -> String {
    "https://cmr.earthdata.nasa.gov/search".to_string()
}

fn default_routing_base_url() -> String {
    "https://api.tomtom.com/routing/1".to_string()
}

fn default_advisory_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_http_timeout() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            environment: "development".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
        }
    }
}

impl Default for SatelliteConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            base_url: default_satellite_base_url(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_routing_base_url(),
            max_alternatives: 3,
        }
    }
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_advisory_base_url(),
            primary_model: "gemini-pro".to_string(),
            alternate_models: vec!["gemini-2.5-flash".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl SatelliteConfig {
    /// Username and password, only when both are present
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(password)) => Some((user.as_str(), password.as_str())),
            _ => None,
        }
    }
}

/// Provider variables read directly, mirroring the deployment's `.env` layout
const LEGACY_OVERRIDES: [(&str, &str); 6] = [
    ("AIR_API_KEY", "weather.api_key"),
    ("NASA_EARTHDATA_USERNAME", "satellite.username"),
    ("NASA_EARTHDATA_PASSWORD", "satellite.password"),
    ("TOMTOM_API_KEY", "routing.api_key"),
    ("GOOGLE_API_KEY", "advisory.api_key"),
    ("RAILWAY_ENVIRONMENT", "server.environment"),
];

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl AirSafeConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(env::var("AIRSAFE_CONFIG").ok().map(PathBuf::from))
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(FileFormat::Toml),
            );
        }

        // AIRSAFE_WEATHER__API_KEY -> weather.api_key
        builder = builder.add_source(
            Environment::with_prefix("AIRSAFE")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("advisory.alternate_models")
                .try_parsing(true),
        );

        for (variable, key) in LEGACY_OVERRIDES {
            builder = builder
                .set_override_option(key, non_empty_env(variable))
                .with_context(|| format!("Failed to apply {variable}"))?;
        }
        let port = non_empty_env("PORT").and_then(|p| p.parse::<i64>().ok());
        builder = builder
            .set_override_option("server.port", port)
            .with_context(|| "Failed to apply PORT")?;

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AirSafeConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.normalize();
        config.validate()?;

        Ok(config)
    }

    /// Treat blank credentials as absent and restore empty defaults
    pub fn normalize(&mut self) {
        fn blank_to_none(value: &mut Option<String>) {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }

        blank_to_none(&mut self.weather.api_key);
        blank_to_none(&mut self.satellite.username);
        blank_to_none(&mut self.satellite.password);
        blank_to_none(&mut self.routing.api_key);
        blank_to_none(&mut self.advisory.api_key);

        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.satellite.base_url.is_empty() {
            self.satellite.base_url = default_satellite_base_url();
        }
        if self.routing.base_url.is_empty() {
            self.routing.base_url = default_routing_base_url();
        }
        if self.advisory.base_url.is_empty() {
            self.advisory.base_url = default_advisory_base_url();
        }
        if self.server.environment.is_empty() {
            self.server.environment = ServerConfig::default().environment;
        }
        self.advisory.alternate_models.retain(|m| !m.trim().is_empty());
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds == 0 {
            return Err(AirSafeError::config("HTTP timeout must be at least 1 second").into());
        }

        if self.http.timeout_seconds > 300 {
            return Err(AirSafeError::config("HTTP timeout cannot exceed 300 seconds").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AirSafeError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AirSafeError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("weather", &self.weather.base_url),
            ("satellite", &self.satellite.base_url),
            ("routing", &self.routing.base_url),
            ("advisory", &self.advisory.base_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AirSafeError::config(format!(
                    "The {name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.advisory.primary_model.trim().is_empty() {
            return Err(AirSafeError::config("Advisory primary model cannot be empty").into());
        }

        Ok(())
    }
}
