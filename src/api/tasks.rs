use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use jamdoc_core::models::{CreateTaskInput, Task, UpdateTaskInput};

use super::error::{ApiError, ApiResult};
use super::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaskQuery {
    pub project_id: Option<i64>,
    pub pending: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TaskQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.db.list_tasks(query.project_id, query.pending)?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTaskInput>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.db.create_task(input)?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTaskInput>,
) -> ApiResult<Json<Task>> {
    let task = state
        .db
        .update_task(id, input)?
        .ok_or(ApiError::NotFound("task", id))?;
    Ok(Json(task))
}

pub async fn toggle(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Task>> {
    let task = state
        .db
        .toggle_task(id)?
        .ok_or(ApiError::NotFound("task", id))?;
    Ok(Json(task))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    if state.db.delete_task(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("task", id))
    }
}
