//! Comment handlers

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};

use crate::error::{ApiError, ApiResult, parse_id};
use crate::guard::ensure_can_mutate;
use crate::middleware::{AuthUser, auth_middleware};
use crate::models::comment::{Comment, CommentRequest};
use crate::pagination::{PageParams, PageQuery};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation::require_text;

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/:videoId", post(add_comment))
        .route("/c/:commentId", patch(update_comment).delete(delete_comment))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/:videoId", get(list_comments))
        .merge(protected)
}

/// Comments on a video, newest first
pub async fn list_comments(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let video_id = parse_id(&video_id, "video")?;

    if !state.videos.exists(video_id).await? {
        return Err(ApiError::not_found("Video not found"));
    }

    let page = state
        .comments
        .list_for_video(video_id, PageParams::from(&query))
        .await?;

    Ok(ApiResponse::ok(page, "Comments fetched successfully"))
}

/// Add a comment to a video
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let video_id = parse_id(&video_id, "video")?;
    let content = require_text(payload.content.as_deref(), "Comment content")?;

    if !state.videos.exists(video_id).await? {
        return Err(ApiError::not_found("Video not found"));
    }

    let comment = state.comments.create(auth.id, video_id, &content).await?;
    let comment = state
        .comments
        .with_owner(comment.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    Ok(ApiResponse::created(comment, "Comment added successfully"))
}

/// Load a comment and check the caller owns it
async fn owned_comment(state: &AppState, actor: &AuthUser, comment_id: &str) -> ApiResult<Comment> {
    let comment_id = parse_id(comment_id, "comment")?;

    let comment = state
        .comments
        .find_by_id(comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    ensure_can_mutate(actor.id, &comment, "comments")?;
    Ok(comment)
}

/// Replace a comment's content
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(comment_id): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = require_text(payload.content.as_deref(), "Comment content")?;
    let comment = owned_comment(&state, &auth, &comment_id).await?;

    state.comments.update(comment.id, &content).await?;
    let comment = state
        .comments
        .with_owner(comment.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    Ok(ApiResponse::ok(comment, "Comment updated successfully"))
}

/// Delete a comment
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = owned_comment(&state, &auth, &comment_id).await?;
    state.comments.delete(comment.id).await?;

    Ok(ApiResponse::<()>::ok_empty("Comment deleted successfully"))
}
