use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::services::RecordService;
use crate::state::SharedState;

mod assets;
mod error;
pub mod flash;
mod observability;
mod records;
mod system;
mod validation;
pub mod views;

pub use error::ApiError;

use metrics_exporter_prometheus::PrometheusHandle;

/// Signed-cookie keys must be at least this long.
const SIGNING_KEY_LEN: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub session_key: Key,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn records(&self) -> &Arc<dyn RecordService> {
        &self.shared.records
    }
}

/// Stretches the configured secret to a valid cookie signing key.
fn session_signing_key(secret: &str) -> anyhow::Result<Key> {
    let len = secret.len().max(SIGNING_KEY_LEN);
    let bytes: Vec<u8> = secret.bytes().cycle().take(len).collect();
    Key::try_from(bytes.as_slice())
        .map_err(|e| anyhow::anyhow!("Invalid session signing secret: {e:?}"))
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let session_key = session_signing_key(shared.config.secret_key())?;

    Ok(Arc::new(AppState {
        shared,
        session_key,
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle)
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config().server;

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_expiry_minutes,
        )))
        .with_signed(state.session_key.clone());

    Router::new()
        .route("/", get(records::index).post(records::submit))
        .route("/results/{id}", get(records::results))
        .route("/records", get(records::list_records))
        .route(
            "/edit/{id}",
            get(records::edit_form).post(records::edit_submit),
        )
        .route("/delete/{id}", post(records::delete_record))
        .route("/static/{*path}", get(assets::serve_asset))
        .route("/health", get(system::health))
        .route("/metrics", get(observability::get_metrics))
        .fallback(records::not_found)
        .layer(session_layer)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(observability::logging_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(
                    observability::security_headers_middleware,
                )),
        )
}
