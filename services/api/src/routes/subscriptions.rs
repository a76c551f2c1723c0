//! Subscription toggle and listing handlers

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
use crate::pagination::{PageParams, PageQuery};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/c/:channelId", post(toggle_subscription))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/c/:channelId", get(channel_subscribers))
        .route("/u/:subscriberId", get(subscribed_channels))
        .merge(protected)
}

/// Flip the caller's subscription to a channel
pub async fn toggle_subscription(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let channel_id = parse_id(&channel_id, "channel")?;

    if channel_id == auth.id {
        return Err(ApiError::InvalidOperation(
            "You cannot subscribe to your own channel".to_string(),
        ));
    }

    if state.users.find_by_id(channel_id).await?.is_none() {
        return Err(ApiError::not_found("Channel not found"));
    }

    Ok(match state.subscriptions.toggle(auth.id, channel_id).await? {
        ToggleOutcome::Added(subscription) => {
            ApiResponse::ok(Some(subscription), "Subscribed successfully")
        }
        ToggleOutcome::Removed => ApiResponse::new(
            axum::http::StatusCode::OK,
            None,
            "Unsubscribed successfully",
        ),
    })
}

/// Subscribers of a channel
pub async fn channel_subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let channel_id = parse_id(&channel_id, "channel")?;

    let page = state
        .subscriptions
        .channel_subscribers(channel_id, PageParams::from(&query))
        .await?;

    Ok(ApiResponse::ok(page, "Subscribers fetched successfully"))
}

/// Channels a user is subscribed to
pub async fn subscribed_channels(
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let subscriber_id = parse_id(&subscriber_id, "subscriber")?;

    let page = state
        .subscriptions
        .subscribed_channels(subscriber_id, PageParams::from(&query))
        .await?;

    Ok(ApiResponse::ok(
        page,
        "Subscribed channels fetched successfully",
    ))
}
