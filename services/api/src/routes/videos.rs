//! Video listing, publishing, and mutation handlers

use axum::{
    Extension, Router,
    extract::{Multipart, Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{get, patch},
};

use crate::error::{ApiError, ApiResult, parse_id};
use crate::guard::ensure_can_mutate;
use crate::middleware::{AuthUser, MaybeUser, auth_middleware, identify_middleware};
use crate::models::video::{Video, VideoListQuery};
use crate::pagination::PageParams;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::upload::UploadForm;
use crate::validation::require_text;

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", axum::routing::post(publish_video))
        .route(
            "/:videoId",
            patch(update_video).delete(delete_video),
        )
        .route("/toggle/publish/:videoId", patch(toggle_publish))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let identified = Router::new()
        .route("/", get(list_videos))
        .route("/:videoId", get(get_video))
        .route_layer(middleware::from_fn_with_state(state, identify_middleware));

    protected.merge(identified)
}

/// Published videos with search, owner scoping, and requested ordering
pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<VideoListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = query
        .user_id
        .as_deref()
        .map(|raw| parse_id(raw, "user"))
        .transpose()?;

    let search = query.query.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let page = state
        .videos
        .list(
            PageParams::from(&query.page),
            search,
            owner,
            query.page.sort_by.as_deref(),
            query.page.sort_type.as_deref(),
        )
        .await?;

    Ok(ApiResponse::ok(page, "Videos fetched successfully"))
}

/// Upload a video with its thumbnail and create the record
pub async fn publish_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = UploadForm::read(multipart).await?;

    let title = require_text(form.text("title"), "Title")?;
    let description = require_text(form.text("description"), "Description")?;

    let video_part = form.require_file("videoFile")?;
    let thumbnail_part = form.require_file("thumbnail")?;

    let video_file = state
        .storage
        .upload(
            "videos",
            &video_part.filename,
            Some(&video_part.content_type),
            video_part.bytes.clone(),
        )
        .await?;
    let thumbnail = state
        .storage
        .upload(
            "thumbnails",
            &thumbnail_part.filename,
            Some(&thumbnail_part.content_type),
            thumbnail_part.bytes.clone(),
        )
        .await?;

    let duration = video_file.duration.unwrap_or(0.0).round() as i32;

    let video = state
        .videos
        .create(
            auth.id,
            &title,
            &description,
            &video_file.url,
            &thumbnail.url,
            duration,
        )
        .await?;

    Ok(ApiResponse::created(video, "Video published successfully"))
}

/// Fetch one video, bumping views and recording the watch for known callers
pub async fn get_video(
    State(state): State<AppState>,
    Extension(MaybeUser(viewer)): Extension<MaybeUser>,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let video_id = parse_id(&video_id, "video")?;
    let viewer_id = viewer.map(|u| u.id);

    let video = state
        .videos
        .find_by_id(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    // Unpublished videos are visible to their owner only; everyone else
    // cannot tell them apart from missing ones.
    if !video.is_published && viewer_id != Some(video.owner_id) {
        return Err(ApiError::not_found("Video not found"));
    }

    state.videos.increment_views(video_id).await?;
    if let Some(viewer_id) = viewer_id {
        state.users.record_watch(viewer_id, video_id).await?;
    }

    let video = state
        .videos
        .with_owner(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    Ok(ApiResponse::ok(video, "Video fetched successfully"))
}

/// Load a video and check the caller owns it
async fn owned_video(state: &AppState, actor: &AuthUser, video_id: &str) -> ApiResult<Video> {
    let video_id = parse_id(video_id, "video")?;

    let video = state
        .videos
        .find_by_id(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    ensure_can_mutate(actor.id, &video, "videos")?;
    Ok(video)
}

/// Update title, description, and/or thumbnail
pub async fn update_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let video = owned_video(&state, &auth, &video_id).await?;

    let form = UploadForm::read(multipart).await?;
    let title = form.text("title").map(str::trim).filter(|s| !s.is_empty());
    let description = form
        .text("description")
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let thumbnail_part = form.file("thumbnail").filter(|p| !p.bytes.is_empty());

    if title.is_none() && description.is_none() && thumbnail_part.is_none() {
        return Err(ApiError::validation("At least one field is required"));
    }

    let thumbnail = match thumbnail_part {
        Some(part) => Some(
            state
                .storage
                .upload(
                    "thumbnails",
                    &part.filename,
                    Some(&part.content_type),
                    part.bytes.clone(),
                )
                .await?
                .url,
        ),
        None => None,
    };

    let video = state
        .videos
        .update(video.id, title, description, thumbnail.as_deref())
        .await?;

    Ok(ApiResponse::ok(video, "Video updated successfully"))
}

/// Delete a video
pub async fn delete_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let video = owned_video(&state, &auth, &video_id).await?;
    state.videos.delete(video.id).await?;

    Ok(ApiResponse::<()>::ok_empty("Video deleted successfully"))
}

/// Flip the publish flag
pub async fn toggle_publish(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let video = owned_video(&state, &auth, &video_id).await?;
    let video = state.videos.set_published(video.id, !video.is_published).await?;

    let message = if video.is_published {
        "Video published"
    } else {
        "Video unpublished"
    };

    Ok(ApiResponse::ok(video, message))
}
