//! Channel dashboard handlers

use axum::{
    Extension, Router,
    extract::{Query, State},
    middleware,
    response::IntoResponse,
    routing::get,
};

use crate::error::ApiError;
use crate::middleware::{AuthUser, auth_middleware};
use crate::pagination::{PageParams, PageQuery};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(channel_stats))
        .route("/videos", get(channel_videos))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Aggregate counters for the caller's channel
pub async fn channel_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.dashboard.channel_stats(auth.id).await?;

    Ok(ApiResponse::ok(stats, "Channel stats fetched successfully"))
}

/// The caller's videos, published or not, with like counts
pub async fn channel_videos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .videos
        .channel_videos(auth.id, PageParams::from(&query))
        .await?;

    Ok(ApiResponse::ok(page, "Channel videos fetched successfully"))
}
