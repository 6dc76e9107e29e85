//! Request types for the kiosk controller API.
//!
//! The kiosk shell posts these bodies when a keypad key, a text field or
//! the position sensor changes.

use serde::{Deserialize, Serialize};

use crate::models::Location;

use super::response::ApiError;

/// Body of `POST /keypad/digit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitRequest {
    /// A single character `"0"` to `"9"`.
    pub digit: String,
}

impl DigitRequest {
    /// Returns the digit, or a validation error for anything but one ASCII digit.
    pub fn key(&self) -> Result<char, ApiError> {
        let mut chars = self.digit.chars();
        match (chars.next(), chars.next()) {
            (Some(key), None) if key.is_ascii_digit() => Ok(key),
            _ => Err(ApiError::validation_error(format!(
                "digit must be a single character 0-9, got '{}'",
                self.digit
            ))),
        }
    }
}

/// Body of `PUT /approval/reason`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonRequest {
    /// The full reason text as currently typed.
    pub reason: String,
}

/// Body of `PUT /location`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationRequest {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

impl TryFrom<LocationRequest> for Location {
    type Error = ApiError;

    fn try_from(request: LocationRequest) -> Result<Self, Self::Error> {
        if !(-90.0..=90.0).contains(&request.lat) {
            return Err(ApiError::validation_error("lat must be between -90 and 90"));
        }
        if !(-180.0..=180.0).contains(&request.lng) {
            return Err(ApiError::validation_error("lng must be between -180 and 180"));
        }
        Ok(Location {
            lat: request.lat,
            lng: request.lng,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digit(value: &str) -> DigitRequest {
        DigitRequest {
            digit: value.to_string(),
        }
    }

    #[test]
    fn test_single_digit_is_accepted() {
        assert_eq!(digit("7").key().unwrap(), '7');
        assert_eq!(digit("0").key().unwrap(), '0');
    }

    #[test]
    fn test_non_digit_and_multiple_chars_rejected() {
        for value in ["a", "", "12", "٣"] {
            let error = digit(value).key().unwrap_err();
            assert_eq!(error.code, "VALIDATION_ERROR");
        }
    }

    #[test]
    fn test_location_ranges() {
        let ok = Location::try_from(LocationRequest { lat: -33.9, lng: 151.2 }).unwrap();
        assert_eq!(ok.lat, -33.9);
        assert!(Location::try_from(LocationRequest { lat: 91.0, lng: 0.0 }).is_err());
        assert!(Location::try_from(LocationRequest { lat: 0.0, lng: -181.0 }).is_err());
        assert!(Location::try_from(LocationRequest { lat: f64::NAN, lng: 0.0 }).is_err());
    }

    #[test]
    fn test_deserialize_reason() {
        let request: ReasonRequest = serde_json::from_str(r#"{"reason": "Handover"}"#).unwrap();
        assert_eq!(request.reason, "Handover");
    }
}
