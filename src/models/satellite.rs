//! Earth-observation record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Coordinate;

/// Whether an observation came from the provider or was synthesized
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataQuality {
    Measured,
    Estimated,
}

/// A satellite granule near a location, or a placeholder for one
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SatelliteObservation {
    pub id: String,
    pub time_start: DateTime<Utc>,
    pub summary: String,
    pub data_quality: DataQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinate>,
    /// Provider record as received, kept opaque
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granule: Option<Value>,
}

impl SatelliteObservation {
    #[must_use]
    pub fn is_estimated(&self) -> bool {
        self.data_quality == DataQuality::Estimated
    }
}
