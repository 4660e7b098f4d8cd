//! Query and body parameter parsing
//!
//! Parameters arrive as optional raw strings and are validated here, before
//! anything reaches the gateway. Every failure is an
//! [`AirSafeError::Validation`] carrying the message returned to the client.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::AirSafeError;
use crate::models::Coordinate;

pub const COORDINATES_REQUIRED: &str = "Latitude and Longitude are required.";
pub const COORDINATES_INVALID: &str = "Invalid Latitude or Longitude.";
pub const DAYS_INVALID: &str = "Invalid Latitude, Longitude, or Days (1-7).";
pub const ROUTE_REQUIRED: &str = "Start and End Latitude and Longitude are required.";
pub const ADVICE_COORDINATES_REQUIRED: &str = "Latitude and longitude are required.";
pub const BODY_NOT_JSON: &str = "Request body must be a JSON object.";

const DEFAULT_DAYS: u8 = 3;
const MAX_DAYS: u8 = 7;

/// `Query` whose rejection is a validation error, so a malformed query
/// string gets the same JSON body as every other 400
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AirSafeError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AirSafeError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub days: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RouteQuery {
    pub start_lat: Option<String>,
    pub start_lon: Option<String>,
    pub end_lat: Option<String>,
    pub end_lon: Option<String>,
}

/// Body of an advice request after validation
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceRequest {
    pub location: Coordinate,
    pub prompt: Option<String>,
}

/// Present and non-blank
fn provided(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_degrees(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl LocationQuery {
    pub fn coordinate(&self) -> Result<Coordinate, AirSafeError> {
        let (Some(lat), Some(lon)) = (provided(&self.lat), provided(&self.lon)) else {
            return Err(AirSafeError::validation(COORDINATES_REQUIRED));
        };

        match (parse_degrees(lat), parse_degrees(lon)) {
            (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err(AirSafeError::validation(COORDINATES_INVALID)),
        }
    }
}

impl ForecastQuery {
    /// Coordinate and day count; `days` defaults to 3 and must lie in 1..=7
    pub fn coordinate_and_days(&self) -> Result<(Coordinate, u8), AirSafeError> {
        let (Some(lat), Some(lon)) = (provided(&self.lat), provided(&self.lon)) else {
            return Err(AirSafeError::validation(COORDINATES_REQUIRED));
        };

        let days = match self.days.as_deref() {
            None => Some(DEFAULT_DAYS),
            Some(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|d| (1..=MAX_DAYS).contains(d)),
        };

        match (parse_degrees(lat), parse_degrees(lon), days) {
            (Some(lat), Some(lon), Some(days)) => Ok((Coordinate::new(lat, lon), days)),
            _ => Err(AirSafeError::validation(DAYS_INVALID)),
        }
    }
}

impl RouteQuery {
    pub fn endpoints(&self) -> Result<(Coordinate, Coordinate), AirSafeError> {
        let (Some(start_lat), Some(start_lon), Some(end_lat), Some(end_lon)) = (
            provided(&self.start_lat),
            provided(&self.start_lon),
            provided(&self.end_lat),
            provided(&self.end_lon),
        ) else {
            return Err(AirSafeError::validation(ROUTE_REQUIRED));
        };

        match (
            parse_degrees(start_lat),
            parse_degrees(start_lon),
            parse_degrees(end_lat),
            parse_degrees(end_lon),
        ) {
            (Some(a), Some(b), Some(c), Some(d)) => {
                Ok((Coordinate::new(a, b), Coordinate::new(c, d)))
            }
            _ => Err(AirSafeError::validation(COORDINATES_INVALID)),
        }
    }
}

/// A JSON number, or a string holding one
fn json_degrees(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_degrees(s),
        _ => None,
    }
}

impl AdviceRequest {
    /// Parse a raw request body. An empty body counts as an empty object.
    pub fn from_body(body: &[u8]) -> Result<Self, AirSafeError> {
        let value: Value = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Default::default())
        } else {
            serde_json::from_slice(body).map_err(|_| AirSafeError::validation(BODY_NOT_JSON))?
        };
        let Value::Object(fields) = value else {
            return Err(AirSafeError::validation(BODY_NOT_JSON));
        };

        let lat = fields.get("lat").filter(|v| !v.is_null());
        let lon = fields.get("lon").filter(|v| !v.is_null());
        let (Some(lat), Some(lon)) = (lat, lon) else {
            return Err(AirSafeError::validation(ADVICE_COORDINATES_REQUIRED));
        };

        let (Some(lat), Some(lon)) = (json_degrees(lat), json_degrees(lon)) else {
            return Err(AirSafeError::validation(COORDINATES_INVALID));
        };

        Ok(Self {
            location: Coordinate::new(lat, lon),
            prompt: fields
                .get("prompt")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn location(lat: Option<&str>, lon: Option<&str>) -> LocationQuery {
        LocationQuery {
            lat: lat.map(str::to_string),
            lon: lon.map(str::to_string),
        }
    }

    fn forecast(days: Option<&str>) -> ForecastQuery {
        ForecastQuery {
            lat: Some("30".to_string()),
            lon: Some("31".to_string()),
            days: days.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_coordinate() {
        let coordinate = location(Some("30.5"), Some(" -31 ")).coordinate().unwrap();
        assert_eq!(coordinate, Coordinate::new(30.5, -31.0));
    }

    #[rstest]
    #[case(None, Some("31"), COORDINATES_REQUIRED)]
    #[case(Some("30"), None, COORDINATES_REQUIRED)]
    #[case(Some(""), Some("31"), COORDINATES_REQUIRED)]
    #[case(Some("north"), Some("31"), COORDINATES_INVALID)]
    #[case(Some("30"), Some("NaN"), COORDINATES_INVALID)]
    fn test_invalid_coordinate(
        #[case] lat: Option<&str>,
        #[case] lon: Option<&str>,
        #[case] message: &str,
    ) {
        let err = location(lat, lon).coordinate().unwrap_err();
        assert_eq!(err.user_message(), message);
    }

    #[rstest]
    #[case(None, 3)]
    #[case(Some("1"), 1)]
    #[case(Some("7"), 7)]
    fn test_days(#[case] days: Option<&str>, #[case] expected: u8) {
        let (_, parsed) = forecast(days).coordinate_and_days().unwrap();
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case("0")]
    #[case("8")]
    #[case("-1")]
    #[case("2.5")]
    #[case("")]
    fn test_invalid_days(#[case] days: &str) {
        let err = forecast(Some(days)).coordinate_and_days().unwrap_err();
        assert_eq!(err.user_message(), DAYS_INVALID);
    }

    #[test]
    fn test_route_requires_all_four() {
        let query = RouteQuery {
            start_lat: Some("30".to_string()),
            start_lon: Some("31".to_string()),
            end_lat: Some("30.1".to_string()),
            end_lon: None,
        };
        assert_eq!(query.endpoints().unwrap_err().user_message(), ROUTE_REQUIRED);
    }

    #[rstest]
    #[case(br#"{"lat": 30, "lon": 31.5}"#.as_slice())]
    #[case(br#"{"lat": "30", "lon": " 31.5 "}"#.as_slice())]
    fn test_advice_coordinates(#[case] body: &[u8]) {
        let request = AdviceRequest::from_body(body).unwrap();
        assert_eq!(request.location, Coordinate::new(30.0, 31.5));
        assert_eq!(request.prompt, None);
    }

    #[test]
    fn test_advice_prompt() {
        let request = AdviceRequest::from_body(br#"{"lat": 1, "lon": 2, "prompt": "Can I run?"}"#).unwrap();
        assert_eq!(request.prompt.as_deref(), Some("Can I run?"));
    }

    #[rstest]
    #[case(b"".as_slice(), ADVICE_COORDINATES_REQUIRED)]
    #[case(br#"{"lat": 30}"#.as_slice(), ADVICE_COORDINATES_REQUIRED)]
    #[case(br#"{"lat": null, "lon": 31}"#.as_slice(), ADVICE_COORDINATES_REQUIRED)]
    #[case(br#"{"lat": "abc", "lon": 31}"#.as_slice(), COORDINATES_INVALID)]
    #[case(br#"{"lat": true, "lon": 31}"#.as_slice(), COORDINATES_INVALID)]
    #[case(b"lat=30&lon=31".as_slice(), BODY_NOT_JSON)]
    #[case(b"[30, 31]".as_slice(), BODY_NOT_JSON)]
    fn test_advice_rejections(#[case] body: &[u8], #[case] message: &str) {
        let err = AdviceRequest::from_body(body).unwrap_err();
        assert_eq!(err.user_message(), message);
    }
}
