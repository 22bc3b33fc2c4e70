use axum::{
    Form,
    extract::{Path, State},
    http::Uri,
    response::{Html, Redirect},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::flash::{self, FlashLevel};
use super::validation::parse_record_id;
use super::{ApiError, AppState, views};
use crate::services::{RecordEdit, RecordError};

const REFRESH_WARNING: &str = "Could not refresh weather for updated location.";

#[derive(Debug, Deserialize)]
pub struct RecordForm {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date_range: Option<String>,
}

/// GET /
pub async fn index(session: Session) -> Html<String> {
    views::index_page(&flash::take(&session).await)
}

/// POST /
pub async fn submit(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<RecordForm>,
) -> Result<Redirect, ApiError> {
    let location = form.location.as_deref().unwrap_or("");
    let date_range = form.date_range.as_deref().unwrap_or("");

    match state.records().submit(location, date_range).await {
        Ok(record) => Ok(Redirect::to(&format!("/results/{}", record.id))),
        Err(e @ (RecordError::Validation(_) | RecordError::Provider { .. })) => {
            flash::push(&session, FlashLevel::Error, e.to_string()).await?;
            Ok(Redirect::to("/"))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /results/{id}
pub async fn results(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let id = parse_record_id(&id)?;
    let view = state.records().view(id).await?;
    let flashes = flash::take(&session).await;

    Ok(views::results_page(
        &flashes,
        &view,
        state.config().maps_key(),
    ))
}

/// GET /records
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Html<String>, ApiError> {
    let records = state.records().list().await?;
    Ok(views::records_page(&flash::take(&session).await, &records))
}

/// GET /edit/{id}
pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let id = parse_record_id(&id)?;
    let record = state.records().get(id).await?;
    Ok(views::edit_page(&flash::take(&session).await, &record))
}

/// POST /edit/{id}
/// Saves the new key fields and re-fetches weather; a failed refresh keeps the old data.
pub async fn edit_submit(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<RecordForm>,
) -> Result<Redirect, ApiError> {
    let id = parse_record_id(&id)?;
    let edit = RecordEdit {
        location: form.location,
        date_range: form.date_range,
    };

    match state.records().edit(id, edit).await {
        Ok(outcome) => {
            if !outcome.refreshed() {
                flash::push(&session, FlashLevel::Warning, REFRESH_WARNING).await?;
            }
            Ok(Redirect::to("/records"))
        }
        Err(e @ (RecordError::Validation(_) | RecordError::Conflict { .. })) => {
            flash::push(&session, FlashLevel::Error, e.to_string()).await?;
            Ok(Redirect::to(&format!("/edit/{id}")))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /delete/{id}
pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    let id = parse_record_id(&id)?;
    state.records().delete(id).await?;
    flash::push(&session, FlashLevel::Success, "Record deleted").await?;
    Ok(Redirect::to("/records"))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No page at {}", uri.path()))
}
