//! Loopback HTTP API consumed by the browser front-end.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use jamdoc_core::Database;

mod error;
mod notes;
mod projects;
mod system;
mod tasks;

pub use error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

pub fn create_router(db: Database) -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/api/projects", get(projects::list).post(projects::create))
        .route("/api/projects/summaries", get(projects::summaries))
        .route(
            "/api/projects/{id}",
            get(projects::get_one)
                .put(projects::update)
                .delete(projects::remove),
        )
        .route("/api/projects/{id}/export", post(projects::export_pdf))
        .route("/api/jams/upcoming", get(projects::upcoming))
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route("/api/tasks/{id}", put(tasks::update).delete(tasks::remove))
        .route("/api/tasks/{id}/toggle", post(tasks::toggle))
        .route("/api/notes", get(notes::list).post(notes::create))
        .route("/api/notes/{id}", put(notes::update).delete(notes::remove))
        .route("/api/stats", get(system::stats))
        .route("/api/backup", get(system::backup).post(system::restore))
        .route("/api/reset", post(system::reset))
        // Whiteboard notes and backups carry inline images as data URLs.
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024))
        // The dev front-end runs on its own local port, so CORS stays open.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { db })
}
