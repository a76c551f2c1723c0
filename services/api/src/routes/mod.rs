//! HTTP routes for the API service
//!
//! Everything lives under `/api/v1`. Each resource module builds its own
//! sub-router and attaches the auth or identify middleware it needs.

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use crate::response::ApiResponse;
use crate::state::AppState;

mod comments;
mod dashboard;
mod likes;
mod playlists;
mod subscriptions;
mod tweets;
mod users;
mod videos;

/// Upload requests carry whole video files
const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/healthcheck", get(health_check))
        .nest("/users", users::router(state.clone()))
        .nest("/videos", videos::router(state.clone()))
        .nest("/comments", comments::router(state.clone()))
        .nest("/likes", likes::router(state.clone()))
        .nest("/subscriptions", subscriptions::router(state.clone()))
        .nest("/playlists", playlists::router(state.clone()))
        .nest("/tweets", tweets::router(state.clone()))
        .nest("/dashboard", dashboard::router(state.clone()));

    Router::new()
        .nest("/api/v1", api)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    ApiResponse::ok(
        json!({
            "status": "ok",
            "uptime": state.started_at.elapsed().as_secs(),
            "timestamp": chrono::Utc::now(),
        }),
        "OK",
    )
}
