//! `SeaORM` implementation of the `RecordService` trait.

use crate::clients::WeatherProvider;
use crate::db::Store;
use crate::models::{RecordKey, WeatherRecord};
use crate::services::record_service::{
    EditOutcome, RecordEdit, RecordError, RecordService, RecordView,
};
use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};
use std::sync::Arc;
use tracing::{info, warn};

pub struct SeaOrmRecordService {
    store: Store,
    provider: Arc<dyn WeatherProvider>,
}

impl SeaOrmRecordService {
    #[must_use]
    pub fn new(store: Store, provider: Arc<dyn WeatherProvider>) -> Self {
        Self { store, provider }
    }

    fn is_unique_violation(err: &anyhow::Error) -> bool {
        err.downcast_ref::<DbErr>()
            .and_then(DbErr::sql_err)
            .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)))
    }

    fn conflict(key: &RecordKey) -> RecordError {
        RecordError::Conflict {
            location: key.location.clone(),
            date_range: key.date_range.clone(),
        }
    }
}

#[async_trait]
impl RecordService for SeaOrmRecordService {
    async fn submit(
        &self,
        location: &str,
        date_range: &str,
    ) -> Result<WeatherRecord, RecordError> {
        let key = RecordKey::parse(location, date_range)?;

        let payload = self.provider.fetch(&key.location).await;
        if !payload.is_success() {
            warn!(
                location = %key.location,
                code = payload.status_code(),
                "Provider rejected weather lookup"
            );
            return Err(RecordError::Provider {
                code: payload.status_code(),
                message: payload.error_message(),
            });
        }

        let record = self
            .store
            .upsert_record(&key.location, &key.date_range, &payload.to_json()?)
            .await?;

        info!(
            record_id = record.id,
            location = %record.location,
            date_range = %record.date_range,
            "Stored weather record"
        );
        Ok(record)
    }

    async fn edit(&self, id: i32, edit: RecordEdit) -> Result<EditOutcome, RecordError> {
        let current = self.get(id).await?;

        let location = edit.location.unwrap_or(current.location);
        let date_range = edit.date_range.unwrap_or(current.date_range);
        let key = RecordKey::parse(&location, &date_range)?;

        match self.store.find_record(&key.location, &key.date_range).await? {
            Some(existing) if existing.id != id => return Err(Self::conflict(&key)),
            _ => {}
        }

        let payload = self.provider.fetch(&key.location).await;
        let (weather_data, refresh_error) = if payload.is_success() {
            (Some(payload.to_json()?), None)
        } else {
            warn!(
                record_id = id,
                location = %key.location,
                code = payload.status_code(),
                "Could not refresh weather, keeping stored data"
            );
            (None, Some(payload.error_message()))
        };

        let record = self
            .store
            .update_record(id, &key.location, &key.date_range, weather_data.as_deref())
            .await
            .map_err(|e| {
                if Self::is_unique_violation(&e) {
                    Self::conflict(&key)
                } else {
                    RecordError::from(e)
                }
            })?
            .ok_or(RecordError::NotFound(id))?;

        info!(record_id = id, refreshed = refresh_error.is_none(), "Edited weather record");
        Ok(EditOutcome {
            record,
            refresh_error,
        })
    }

    async fn get(&self, id: i32) -> Result<WeatherRecord, RecordError> {
        self.store
            .get_record(id)
            .await?
            .ok_or(RecordError::NotFound(id))
    }

    async fn view(&self, id: i32) -> Result<RecordView, RecordError> {
        let record = self.get(id).await?;
        let payload = record.payload()?;
        Ok(RecordView { record, payload })
    }

    async fn list(&self) -> Result<Vec<WeatherRecord>, RecordError> {
        Ok(self.store.list_records().await?)
    }

    async fn delete(&self, id: i32) -> Result<(), RecordError> {
        if self.store.remove_record(id).await? {
            Ok(())
        } else {
            Err(RecordError::NotFound(id))
        }
    }
}
