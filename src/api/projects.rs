use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use jamdoc_core::models::{CreateProjectInput, Project, ProjectSummary, UpdateProjectInput};

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::pdf::{self, CoverMeta};

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(state.db.list_projects()?))
}

pub async fn summaries(State(state): State<AppState>) -> ApiResult<Json<Vec<ProjectSummary>>> {
    Ok(Json(state.db.project_summaries()?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProjectInput>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state.db.create_project(input)?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Project>> {
    let project = state
        .db
        .get_project(id)?
        .ok_or(ApiError::NotFound("project", id))?;
    Ok(Json(project))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateProjectInput>,
) -> ApiResult<Json<Project>> {
    let project = state
        .db
        .update_project(id, input)?
        .ok_or(ApiError::NotFound("project", id))?;
    Ok(Json(project))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    if state.db.delete_project(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("project", id))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpcomingQuery {
    pub limit: Option<usize>,
}

pub async fn upcoming(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let jams = state
        .db
        .upcoming_jams(Utc::now(), query.limit.unwrap_or(5))?;
    Ok(Json(jams))
}

/// Render the project's GDD and hand it back as a PDF download.
pub async fn export_pdf(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(meta): Json<CoverMeta>,
) -> ApiResult<Response> {
    let project = state
        .db
        .get_project(id)?
        .ok_or(ApiError::NotFound("project", id))?;
    let bytes = pdf::render_gdd(&project, &meta)?;
    let file_name = pdf::gdd_file_name(&project);
    tracing::info!(project_id = id, file_name = %file_name, "GDD exported");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
