//! `AirSafe` - Environmental safety aggregation service
//!
//! Gathers air-quality, weather, satellite and routing data from third-party
//! providers, normalizes it into a single safety score and optionally turns
//! it into natural-language advice. Every provider has a synthetic fallback,
//! so the endpoints keep answering when credentials are missing or a
//! provider is down.

pub mod advisory;
pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod scoring;
pub mod selection;
pub mod service;
pub mod web;

// Re-export core types for public API
pub use advisory::{Advice, ModelChain, Summarizer, TextGenerator};
pub use config::AirSafeConfig;
pub use error::AirSafeError;
pub use gateway::{AirQualitySource, Gateway, ProviderResult};
pub use models::{AirQualityReading, Coordinate, RouteCandidate, SafetyLevel, SafetyScore};
pub use service::SafetyService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
