use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use jamdoc_core::models::{CreateNoteInput, Note, UpdateNoteInput};

use super::error::{ApiError, ApiResult};
use super::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NoteQuery {
    pub project_id: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<NoteQuery>,
) -> ApiResult<Json<Vec<Note>>> {
    Ok(Json(state.db.list_notes(query.project_id)?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateNoteInput>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    let note = state.db.create_note(input)?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateNoteInput>,
) -> ApiResult<Json<Note>> {
    let note = state
        .db
        .update_note(id, input)?
        .ok_or(ApiError::NotFound("note", id))?;
    Ok(Json(note))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    if state.db.delete_note(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("note", id))
    }
}
