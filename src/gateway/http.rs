//! Shared outbound HTTP client
//!
//! One `reqwest` client per process with a bounded timeout. Requests are sent
//! exactly once: a failed attempt is reported to the caller, which decides
//! what to substitute.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::AirSafeError;
use crate::config::HttpConfig;

/// Responses slower than this are logged as a warning
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new client with the configured timeout
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("AirSafe/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self { client })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        debug!("GET {}", redact(url));
        self.client.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        debug!("POST {}", redact(url));
        self.client.post(url)
    }

    /// Send a request and decode a JSON body, failing on any non-2xx status
    #[instrument(skip(self, request))]
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        provider: &'static str,
        request: RequestBuilder,
    ) -> Result<T> {
        let start_time = Instant::now();

        let response = request
            .send()
            .await
            .map_err(|e| AirSafeError::api(format!("Network error: {e}")))?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            let err = match status.as_u16() {
                401 | 403 => AirSafeError::authentication(format!(
                    "{provider} rejected the configured credentials (HTTP {})",
                    status.as_u16()
                )),
                404 => AirSafeError::api(format!("{provider} resource not found (HTTP 404)")),
                429 => AirSafeError::rate_limit(format!("{provider} rate limit exceeded")),
                _ => AirSafeError::api(format!(
                    "{provider} request failed with status: {} - {}",
                    status,
                    status.canonical_reason().unwrap_or("Unknown error")
                )),
            };
            return Err(err.into());
        }

        let parse_start = Instant::now();
        let body: T = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {provider} response"))?;

        let total_duration = start_time.elapsed();
        info!(
            "{} request succeeded in {:.3}s (parse: {:.3}s)",
            provider,
            total_duration.as_secs_f64(),
            parse_start.elapsed().as_secs_f64()
        );

        if total_duration > SLOW_RESPONSE {
            warn!(
                "Slow {} response detected: {:.3}s",
                provider,
                total_duration.as_secs_f64()
            );
        }

        Ok(body)
    }
}

/// Drop the query string so credentials never reach the logs
fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_strips_query() {
        assert_eq!(
            redact("http://api.example.com/v1/current.json?key=secret&q=1,2"),
            "http://api.example.com/v1/current.json"
        );
        assert_eq!(redact("http://plain/path"), "http://plain/path");
    }

    #[test]
    fn test_client_builds_with_default_timeout() {
        assert!(HttpClient::new(&HttpConfig::default()).is_ok());
    }
}
