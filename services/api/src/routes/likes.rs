//! Like toggle and liked-videos handlers

use axum::{
    Extension, Router,
    extract::{Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};

use crate::error::{ApiError, parse_id};
use crate::middleware::{AuthUser, auth_middleware};
use crate::models::ToggleOutcome;
use crate::models::like::LikeTarget;
use crate::pagination::{PageParams, PageQuery};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/toggle/v/:videoId", post(toggle_video_like))
        .route("/toggle/c/:commentId", post(toggle_comment_like))
        .route("/toggle/t/:tweetId", post(toggle_tweet_like))
        .route("/videos", get(liked_videos))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Run one toggle after confirming the target exists
async fn toggle(
    state: &AppState,
    actor: &AuthUser,
    target: LikeTarget,
) -> Result<impl IntoResponse + use<>, ApiError> {
    let exists = match target {
        LikeTarget::Video(id) => state.videos.exists(id).await?,
        LikeTarget::Comment(id) => state.comments.exists(id).await?,
        LikeTarget::Tweet(id) => state.tweets.exists(id).await?,
    };
    if !exists {
        return Err(ApiError::not_found(format!("{} not found", target.label())));
    }

    Ok(match state.likes.toggle(actor.id, target).await? {
        ToggleOutcome::Added(like) => {
            ApiResponse::ok(Some(like), format!("{} liked", target.label()))
        }
        ToggleOutcome::Removed => ApiResponse::new(
            axum::http::StatusCode::OK,
            None,
            format!("{} like removed", target.label()),
        ),
    })
}

pub async fn toggle_video_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&video_id, "video")?;
    toggle(&state, &auth, LikeTarget::Video(id)).await
}

pub async fn toggle_comment_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&comment_id, "comment")?;
    toggle(&state, &auth, LikeTarget::Comment(id)).await
}

pub async fn toggle_tweet_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tweet_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&tweet_id, "tweet")?;
    toggle(&state, &auth, LikeTarget::Tweet(id)).await
}

/// Videos the caller has liked, most recently liked first
pub async fn liked_videos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .likes
        .liked_videos(auth.id, PageParams::from(&query))
        .await?;

    Ok(ApiResponse::ok(page, "Liked videos fetched successfully"))
}
