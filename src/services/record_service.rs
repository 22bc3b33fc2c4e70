//! Domain service for weather records.
//!
//! Owns the create/update reconciliation: validate the submitted key, fetch
//! from the provider, interpret its `cod`, and persist only on success.

use crate::models::{KeyError, WeatherPayload, WeatherRecord};
use thiserror::Error;

/// Errors specific to record operations.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Record not found: {0}")]
    NotFound(i32),

    #[error("{0}")]
    Validation(String),

    /// The provider answered with a non-200 `cod`, or no answer could be obtained.
    #[error("Error: {message}")]
    Provider { code: i64, message: String },

    #[error("A record for {location} / {date_range} already exists")]
    Conflict {
        location: String,
        date_range: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<KeyError> for RecordError {
    fn from(err: KeyError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<sea_orm::DbErr> for RecordError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RecordError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<sea_orm::DbErr>() {
            Ok(db_err) => Self::from(db_err),
            Err(other) => Self::Internal(format!("{other:#}")),
        }
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("Stored weather data is not valid JSON: {err}"))
    }
}

/// Raw edit form. Absent fields keep the stored value.
#[derive(Debug, Clone, Default)]
pub struct RecordEdit {
    pub location: Option<String>,
    pub date_range: Option<String>,
}

/// Result of an edit. The key fields are always saved; `refresh_error` is set
/// when the provider refused the new location and the old payload was kept.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub record: WeatherRecord,
    pub refresh_error: Option<String>,
}

impl EditOutcome {
    #[must_use]
    pub const fn refreshed(&self) -> bool {
        self.refresh_error.is_none()
    }
}

/// A record together with its decoded payload, ready for display.
#[derive(Debug, Clone)]
pub struct RecordView {
    pub record: WeatherRecord,
    pub payload: WeatherPayload,
}

/// Domain service trait for weather records.
#[async_trait::async_trait]
pub trait RecordService: Send + Sync {
    /// Validates the pair, fetches weather, and creates or refreshes the record for that pair.
    async fn submit(&self, location: &str, date_range: &str)
    -> Result<WeatherRecord, RecordError>;

    /// Updates the key fields of a record and tries to refresh its weather.
    async fn edit(&self, id: i32, edit: RecordEdit) -> Result<EditOutcome, RecordError>;

    /// Gets a record by id.
    async fn get(&self, id: i32) -> Result<WeatherRecord, RecordError>;

    /// Gets a record by id with its stored payload decoded.
    async fn view(&self, id: i32) -> Result<RecordView, RecordError>;

    /// Lists all records, newest first.
    async fn list(&self) -> Result<Vec<WeatherRecord>, RecordError>;

    /// Deletes a record by id.
    async fn delete(&self, id: i32) -> Result<(), RecordError>;
}
