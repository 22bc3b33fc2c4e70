use std::sync::Arc;

use crate::clients::{OpenWeatherClient, WeatherProvider};
use crate::config::Config;
use crate::db::Store;
use crate::services::{RecordService, SeaOrmRecordService};

/// Process-lifetime dependencies shared by the web handlers and the CLI.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub records: Arc<dyn RecordService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        if config.provider.configured_key().is_none() {
            tracing::warn!(
                "No OpenWeather API key configured; weather lookups will fail until one is set"
            );
        }

        let provider = Arc::new(OpenWeatherClient::new(&config.provider)?);
        Self::with_provider(config, provider).await
    }

    /// Builds the state around an explicit provider, e.g. a stub in tests.
    pub async fn with_provider(
        config: Config,
        provider: Arc<dyn WeatherProvider>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let records =
            Arc::new(SeaOrmRecordService::new(store.clone(), provider)) as Arc<dyn RecordService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            records,
        })
    }
}
