use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use jamdoc_core::models::{Snapshot, Statistics};

use super::error::{ApiError, ApiResult};
use super::AppState;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<Statistics>> {
    Ok(Json(state.db.stats()?))
}

/// Download the whole data set as a JSON backup file.
pub async fn backup(State(state): State<AppState>) -> ApiResult<Response> {
    let snapshot = state.db.export_snapshot()?;
    Ok((
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"jamdoc-backup.json\"",
        )],
        Json(snapshot),
    )
        .into_response())
}

/// Replace the whole data set from an uploaded backup.
///
/// An invalid file (wrong version, dangling project links) gets a 400 with
/// the reason; nothing is written.
pub async fn restore(
    State(state): State<AppState>,
    Json(snapshot): Json<Snapshot>,
) -> ApiResult<StatusCode> {
    state
        .db
        .import_snapshot(&snapshot)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.db.reset()?;
    Ok(StatusCode::NO_CONTENT)
}
