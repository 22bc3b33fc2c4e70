use crate::models::WeatherRecord;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::weather_record::WeatherRecordRepository;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }

            // Migrate before the pool exists so every pooled connection starts on the final schema.
            let mut migrate_opt = ConnectOptions::new(db_url.to_string());
            migrate_opt
                .max_connections(1)
                .min_connections(1)
                .sqlx_logging(false);
            let migrate_conn = Database::connect(migrate_opt).await?;
            migrator::Migrator::up(&migrate_conn, None).await?;
            migrate_conn.close().await?;
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        // Each in-memory connection is its own database, so it is migrated in place.
        if in_memory {
            migrator::Migrator::up(&conn, None).await?;
        }

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn record_repo(&self) -> WeatherRecordRepository {
        WeatherRecordRepository::new(self.conn.clone())
    }

    pub async fn upsert_record(
        &self,
        location: &str,
        date_range: &str,
        weather_data: &str,
    ) -> Result<WeatherRecord> {
        self.record_repo()
            .upsert(location, date_range, weather_data)
            .await
    }

    pub async fn get_record(&self, id: i32) -> Result<Option<WeatherRecord>> {
        self.record_repo().get(id).await
    }

    pub async fn find_record(
        &self,
        location: &str,
        date_range: &str,
    ) -> Result<Option<WeatherRecord>> {
        self.record_repo().find_by_key(location, date_range).await
    }

    pub async fn list_records(&self) -> Result<Vec<WeatherRecord>> {
        self.record_repo().list_all().await
    }

    pub async fn update_record(
        &self,
        id: i32,
        location: &str,
        date_range: &str,
        weather_data: Option<&str>,
    ) -> Result<Option<WeatherRecord>> {
        self.record_repo()
            .update(id, location, date_range, weather_data)
            .await
    }

    pub async fn remove_record(&self, id: i32) -> Result<bool> {
        self.record_repo().remove(id).await
    }

    pub async fn count_records(&self) -> Result<u64> {
        self.record_repo().count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> Store {
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("in-memory store")
    }

    fn temp_db_url() -> String {
        let path = std::env::temp_dir().join(format!("weatherlog-db-{}.db", uuid::Uuid::new_v4()));
        format!("sqlite:{}", path.display())
    }

    #[tokio::test]
    async fn test_fresh_file_database_upserts_on_every_pooled_connection() {
        let store = Store::new(&temp_db_url()).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .upsert_record("Boston", "June", &format!(r#"{{"v":{i}}}"#))
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.count_records().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reopening_migrated_file_keeps_records() {
        let url = temp_db_url();
        let first = Store::new(&url).await.unwrap();
        let record = first.upsert_record("Boston", "June", "{}").await.unwrap();
        first.conn.close().await.unwrap();

        let reopened = Store::new(&url).await.unwrap();
        let again = reopened
            .upsert_record("Boston", "June", r#"{"v":2}"#)
            .await
            .unwrap();

        assert_eq!(again.id, record.id);
        assert_eq!(reopened.count_records().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row_per_key() {
        let store = memory_store().await;

        let first = store
            .upsert_record("Boston", "2024-06-01", r#"{"v":1}"#)
            .await
            .unwrap();
        assert!(first.updated_at.is_none());

        let second = store
            .upsert_record("Boston", "2024-06-01", r#"{"v":2}"#)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.weather_data, r#"{"v":2}"#);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at.is_some());
        assert_eq!(store.count_records().await.unwrap(), 1);

        store
            .upsert_record("Boston", "2024-06-02", r#"{"v":3}"#)
            .await
            .unwrap();
        assert_eq!(store.count_records().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_is_id_descending() {
        let store = memory_store().await;

        let a = store.upsert_record("A", "d", "{}").await.unwrap();
        let b = store.upsert_record("B", "d", "{}").await.unwrap();
        let c = store.upsert_record("C", "d", "{}").await.unwrap();

        // Touching the oldest row must not move it up the list.
        store.upsert_record("A", "d", r#"{"x":1}"#).await.unwrap();
        store
            .update_record(b.id, "B", "d", Some("{}"))
            .await
            .unwrap();

        let ids: Vec<i32> = store
            .list_records()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[tokio::test]
    async fn test_update_without_payload_keeps_data() {
        let store = memory_store().await;
        let record = store
            .upsert_record("Boston", "June", r#"{"keep":true}"#)
            .await
            .unwrap();

        let updated = store
            .update_record(record.id, "Cambridge", "July", None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.location, "Cambridge");
        assert_eq!(updated.date_range, "July");
        assert_eq!(updated.weather_data, r#"{"keep":true}"#);

        assert!(store.update_record(9999, "x", "y", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_into_existing_key_is_rejected() {
        let store = memory_store().await;
        store.upsert_record("Boston", "June", "{}").await.unwrap();
        let other = store.upsert_record("Paris", "June", "{}").await.unwrap();

        let result = store.update_record(other.id, "Boston", "June", None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = memory_store().await;
        let record = store.upsert_record("Boston", "June", "{}").await.unwrap();

        assert!(store.remove_record(record.id).await.unwrap());
        assert!(!store.remove_record(record.id).await.unwrap());
        assert!(store.get_record(record.id).await.unwrap().is_none());
    }
}
