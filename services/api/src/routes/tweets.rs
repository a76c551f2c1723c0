//! Tweet handlers

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
use crate::models::tweet::{Tweet, TweetRequest};
use crate::pagination::{PageParams, PageQuery};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation::require_text;

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_tweet))
        .route("/:tweetId", patch(update_tweet).delete(delete_tweet))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/user/:userId", get(user_tweets))
        .merge(protected)
}

/// Post a tweet
pub async fn create_tweet(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<TweetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = require_text(payload.content.as_deref(), "Tweet content")?;

    let tweet = state.tweets.create(auth.id, &content).await?;
    let tweet = state
        .tweets
        .with_owner(tweet.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tweet not found"))?;

    Ok(ApiResponse::created(tweet, "Tweet posted successfully"))
}

/// A user's tweets, newest first
pub async fn user_tweets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_id(&user_id, "user")?;

    let page = state
        .tweets
        .user_tweets(user_id, PageParams::from(&query))
        .await?;

    Ok(ApiResponse::ok(page, "Tweets fetched successfully"))
}

/// Load a tweet and check the caller owns it
async fn owned_tweet(state: &AppState, actor: &AuthUser, tweet_id: &str) -> ApiResult<Tweet> {
    let tweet_id = parse_id(tweet_id, "tweet")?;

    let tweet = state
        .tweets
        .find_by_id(tweet_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tweet not found"))?;

    ensure_can_mutate(actor.id, &tweet, "tweets")?;
    Ok(tweet)
}

/// Replace a tweet's content
pub async fn update_tweet(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tweet_id): Path<String>,
    Json(payload): Json<TweetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = require_text(payload.content.as_deref(), "Tweet content")?;
    let tweet = owned_tweet(&state, &auth, &tweet_id).await?;

    state.tweets.update(tweet.id, &content).await?;
    let tweet = state
        .tweets
        .with_owner(tweet.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tweet not found"))?;

    Ok(ApiResponse::ok(tweet, "Tweet updated successfully"))
}

/// Delete a tweet
pub async fn delete_tweet(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(tweet_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tweet = owned_tweet(&state, &auth, &tweet_id).await?;
    state.tweets.delete(tweet.id).await?;

    Ok(ApiResponse::<()>::ok_empty("Tweet deleted successfully"))
}
