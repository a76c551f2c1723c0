//! Playlist handlers

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
use crate::models::playlist::{Playlist, PlaylistRequest};
use crate::pagination::{PageParams, PageQuery};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation::require_text;

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_playlist))
        .route("/:playlistId", patch(update_playlist).delete(delete_playlist))
        .route("/add/:videoId/:playlistId", patch(add_video))
        .route("/remove/:videoId/:playlistId", patch(remove_video))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/:playlistId", get(get_playlist))
        .route("/user/:userId", get(user_playlists))
        .merge(protected)
}

/// Create an empty playlist
pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<PlaylistRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = require_text(payload.name.as_deref(), "Playlist name")?;
    let description = require_text(payload.description.as_deref(), "Playlist description")?;

    let playlist = state.playlists.create(auth.id, &name, &description).await?;

    Ok(ApiResponse::created(playlist, "Playlist created successfully"))
}

/// Full playlist detail with its videos in order
pub async fn get_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let playlist_id = parse_id(&playlist_id, "playlist")?;

    let playlist = state
        .playlists
        .detail(playlist_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    Ok(ApiResponse::ok(playlist, "Playlist fetched successfully"))
}

/// A user's playlists
pub async fn user_playlists(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_id(&user_id, "user")?;

    let page = state
        .playlists
        .user_playlists(user_id, PageParams::from(&query))
        .await?;

    Ok(ApiResponse::ok(page, "Playlists fetched successfully"))
}

/// Load a playlist and check the caller owns it
async fn owned_playlist(
    state: &AppState,
    actor: &AuthUser,
    playlist_id: &str,
) -> ApiResult<Playlist> {
    let playlist_id = parse_id(playlist_id, "playlist")?;

    let playlist = state
        .playlists
        .find_by_id(playlist_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    ensure_can_mutate(actor.id, &playlist, "playlists")?;
    Ok(playlist)
}

/// Replace name and description
pub async fn update_playlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(playlist_id): Path<String>,
    Json(payload): Json<PlaylistRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = require_text(payload.name.as_deref(), "Playlist name")?;
    let description = require_text(payload.description.as_deref(), "Playlist description")?;

    let playlist = owned_playlist(&state, &auth, &playlist_id).await?;
    let playlist = state.playlists.update(playlist.id, &name, &description).await?;

    Ok(ApiResponse::ok(playlist, "Playlist updated successfully"))
}

/// Delete a playlist
pub async fn delete_playlist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(playlist_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let playlist = owned_playlist(&state, &auth, &playlist_id).await?;
    state.playlists.delete(playlist.id).await?;

    Ok(ApiResponse::<()>::ok_empty("Playlist deleted successfully"))
}

/// Append a video to a playlist
pub async fn add_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let video_id = parse_id(&video_id, "video")?;
    let playlist = owned_playlist(&state, &auth, &playlist_id).await?;

    if !state.videos.exists(video_id).await? {
        return Err(ApiError::not_found("Video not found"));
    }

    if !state.playlists.add_video(playlist.id, video_id).await? {
        return Err(ApiError::validation("Video is already in the playlist"));
    }

    let playlist = state
        .playlists
        .detail(playlist.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    Ok(ApiResponse::ok(playlist, "Video added to playlist"))
}

/// Remove a video from a playlist
pub async fn remove_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let video_id = parse_id(&video_id, "video")?;
    let playlist = owned_playlist(&state, &auth, &playlist_id).await?;

    if !state.playlists.remove_video(playlist.id, video_id).await? {
        return Err(ApiError::validation("Video is not in the playlist"));
    }

    let playlist = state
        .playlists
        .detail(playlist.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    Ok(ApiResponse::ok(playlist, "Video removed from playlist"))
}
