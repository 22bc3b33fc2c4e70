use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::weather::WeatherPayload;

pub const MAX_LOCATION_LEN: usize = 100;
pub const MAX_DATE_RANGE_LEN: usize = 50;

/// A persisted (location, date range) → weather payload mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub id: i32,
    pub location: String,
    pub date_range: String,
    pub weather_data: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl WeatherRecord {
    pub fn payload(&self) -> serde_json::Result<WeatherPayload> {
        WeatherPayload::from_json(&self.weather_data)
    }
}

/// Trimmed, validated form input identifying a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    pub location: String,
    pub date_range: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("Please enter both location and date range")]
    Missing,

    #[error("Location must be {MAX_LOCATION_LEN} characters or less")]
    LocationTooLong,

    #[error("Date range must be {MAX_DATE_RANGE_LEN} characters or less")]
    DateRangeTooLong,
}

impl RecordKey {
    pub fn parse(location: &str, date_range: &str) -> Result<Self, KeyError> {
        let location = location.trim();
        let date_range = date_range.trim();

        if location.is_empty() || date_range.is_empty() {
            return Err(KeyError::Missing);
        }
        if location.chars().count() > MAX_LOCATION_LEN {
            return Err(KeyError::LocationTooLong);
        }
        if date_range.chars().count() > MAX_DATE_RANGE_LEN {
            return Err(KeyError::DateRangeTooLong);
        }

        Ok(Self {
            location: location.to_string(),
            date_range: date_range.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let key = RecordKey::parse("  Boston ", "\t2024-06-01\n").unwrap();
        assert_eq!(key.location, "Boston");
        assert_eq!(key.date_range, "2024-06-01");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(RecordKey::parse("", "2024-06-01"), Err(KeyError::Missing));
        assert_eq!(RecordKey::parse("Boston", "   "), Err(KeyError::Missing));
        assert_eq!(
            KeyError::Missing.to_string(),
            "Please enter both location and date range"
        );
    }

    #[test]
    fn test_parse_length_limits() {
        let long_location = "x".repeat(MAX_LOCATION_LEN + 1);
        assert_eq!(
            RecordKey::parse(&long_location, "2024"),
            Err(KeyError::LocationTooLong)
        );

        let exact = "é".repeat(MAX_LOCATION_LEN);
        assert!(RecordKey::parse(&exact, "2024").is_ok());

        let long_range = "1".repeat(MAX_DATE_RANGE_LEN + 1);
        assert_eq!(
            RecordKey::parse("Boston", &long_range),
            Err(KeyError::DateRangeTooLong)
        );
    }

    #[test]
    fn test_key_error_propagates_through_anyhow() {
        fn parse_or_bail(location: &str) -> anyhow::Result<RecordKey> {
            Ok(RecordKey::parse(location, "June")?)
        }

        let err = parse_or_bail(" ").unwrap_err();
        assert_eq!(err.downcast_ref::<KeyError>(), Some(&KeyError::Missing));
        assert_eq!(err.to_string(), "Please enter both location and date range");
    }
}
