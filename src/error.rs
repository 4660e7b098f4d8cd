//! Error types and handling for the `AirSafe` service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the `AirSafe` service
#[derive(Error, Debug)]
pub enum AirSafeError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream provider communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Upstream provider rejected our credentials
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// Upstream provider throttled the request
    #[error("Rate limit error: {message}")]
    RateLimit { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A selection produced no candidate
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// A capability was never configured for this process
    #[error("Service unavailable: {message}")]
    Unavailable { message: String },

}

impl AirSafeError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn rate_limit<S: Into<String>>(message: S) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// HTTP status this error maps to when it reaches the endpoint layer
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            AirSafeError::Validation { .. } => StatusCode::BAD_REQUEST,
            AirSafeError::NotFound { .. } => StatusCode::NOT_FOUND,
            AirSafeError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AirSafeError::Api { .. }
            | AirSafeError::Authentication { .. }
            | AirSafeError::RateLimit { .. } => StatusCode::BAD_GATEWAY,
            AirSafeError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AirSafeError::Config { .. } => {
                "Configuration error. Please check the service configuration.".to_string()
            }
            AirSafeError::Api { .. }
            | AirSafeError::Authentication { .. }
            | AirSafeError::RateLimit { .. } => {
                "Unable to reach an upstream data provider.".to_string()
            }
            AirSafeError::Validation { message }
            | AirSafeError::NotFound { message }
            | AirSafeError::Unavailable { message } => message.clone(),
        }
    }
}

impl IntoResponse for AirSafeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}
