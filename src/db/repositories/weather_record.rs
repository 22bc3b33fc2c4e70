use crate::entities::{prelude::*, weather_records};
use crate::models::WeatherRecord;
use anyhow::Result;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

/// Repository for the `weather_records` table.
pub struct WeatherRecordRepository {
    conn: DatabaseConnection,
}

impl WeatherRecordRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: weather_records::Model) -> WeatherRecord {
        WeatherRecord {
            id: m.id,
            location: m.location,
            date_range: m.date_range,
            weather_data: m.weather_data,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }

    /// Inserts a record, or replaces `weather_data` of the row already holding
    /// the same `(location, date_range)`.
    pub async fn upsert(
        &self,
        location: &str,
        date_range: &str,
        weather_data: &str,
    ) -> Result<WeatherRecord> {
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = weather_records::ActiveModel {
            location: Set(location.to_string()),
            date_range: Set(date_range.to_string()),
            weather_data: Set(weather_data.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(None),
            ..Default::default()
        };

        let txn = self.conn.begin().await?;

        WeatherRecords::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    weather_records::Column::Location,
                    weather_records::Column::DateRange,
                ])
                .update_column(weather_records::Column::WeatherData)
                .value(weather_records::Column::UpdatedAt, Expr::value(now))
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        let row = WeatherRecords::find()
            .filter(weather_records::Column::Location.eq(location))
            .filter(weather_records::Column::DateRange.eq(date_range))
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Upserted record for {location:?} vanished"))?;

        txn.commit().await?;

        debug!("Upserted weather record {} ({} / {})", row.id, location, date_range);
        Ok(Self::map_model(row))
    }

    pub async fn get(&self, id: i32) -> Result<Option<WeatherRecord>> {
        let row = WeatherRecords::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(Self::map_model))
    }

    pub async fn find_by_key(
        &self,
        location: &str,
        date_range: &str,
    ) -> Result<Option<WeatherRecord>> {
        let row = WeatherRecords::find()
            .filter(weather_records::Column::Location.eq(location))
            .filter(weather_records::Column::DateRange.eq(date_range))
            .one(&self.conn)
            .await?;

        Ok(row.map(Self::map_model))
    }

    /// All records, highest id first.
    pub async fn list_all(&self) -> Result<Vec<WeatherRecord>> {
        let rows = WeatherRecords::find()
            .order_by_desc(weather_records::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    /// Rewrites the key fields and, when given, the stored payload.
    /// Returns `None` if the id does not exist.
    pub async fn update(
        &self,
        id: i32,
        location: &str,
        date_range: &str,
        weather_data: Option<&str>,
    ) -> Result<Option<WeatherRecord>> {
        let Some(row) = WeatherRecords::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active_model = row.into_active_model();
        active_model.location = Set(location.to_string());
        active_model.date_range = Set(date_range.to_string());
        if let Some(data) = weather_data {
            active_model.weather_data = Set(data.to_string());
        }
        active_model.updated_at = Set(Some(chrono::Utc::now().to_rfc3339()));

        let updated = active_model.update(&self.conn).await?;
        Ok(Some(Self::map_model(updated)))
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = WeatherRecords::delete_by_id(id).exec(&self.conn).await?;
        if result.rows_affected > 0 {
            info!("Deleted weather record {}", id);
        }
        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(WeatherRecords::find().count(&self.conn).await?)
    }
}
