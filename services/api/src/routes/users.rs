//! User account, session, and channel profile handlers

use axum::{
    Extension, Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, HeaderValue, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};

use crate::error::{ApiError, ApiResult};
use crate::middleware::{AuthUser, MaybeUser, auth_middleware, identify_middleware};
use crate::models::user::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RefreshTokenRequest, RefreshTokenResponse,
    UpdateAccountRequest, UserResponse,
};
use crate::pagination::{PageParams, PageQuery};
use crate::repositories::user::NewUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::upload::UploadForm;
use crate::validation::{require_text, validate_email, validate_password, validate_username};

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/change-password", post(change_password))
        .route("/current-user", get(current_user))
        .route("/update-account", patch(update_account))
        .route("/avatar", patch(update_avatar))
        .route("/cover-image", patch(update_cover_image))
        .route("/history", get(watch_history))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let identified = Router::new()
        .route("/c/:username", get(channel_profile))
        .route_layer(middleware::from_fn_with_state(state, identify_middleware));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .merge(protected)
        .merge(identified)
}

/// Build a session cookie; tokens only ever travel HttpOnly
fn session_cookie(name: &str, value: &str, max_age: u64) -> String {
    format!("{name}={value}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={max_age}")
}

fn append_cookie(response: &mut Response, cookie: &str) -> ApiResult<()> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Invalid cookie header: {}", e)))?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}

/// Attach both session cookies to a response
fn with_session_cookies(
    state: &AppState,
    mut response: Response,
    access_token: &str,
    refresh_token: &str,
) -> ApiResult<Response> {
    append_cookie(
        &mut response,
        &session_cookie(
            "accessToken",
            access_token,
            state.jwt_service.access_token_expiry(),
        ),
    )?;
    append_cookie(
        &mut response,
        &session_cookie(
            "refreshToken",
            refresh_token,
            state.jwt_service.refresh_token_expiry(),
        ),
    )?;

    Ok(response)
}

/// Register a new user with an avatar and optional cover image
pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = UploadForm::read(multipart).await?;

    let username = require_text(form.text("username"), "Username")?;
    let email = require_text(form.text("email"), "Email")?;
    let full_name = require_text(form.text("fullName"), "Full name")?;
    let password = require_text(form.text("password"), "Password")?;

    validate_username(&username).map_err(ApiError::Validation)?;
    validate_email(&email).map_err(ApiError::Validation)?;
    validate_password(&password).map_err(ApiError::Validation)?;

    if state.users.exists_by_username_or_email(&username, &email).await? {
        return Err(ApiError::InvalidOperation(
            "User with this email or username already exists".to_string(),
        ));
    }

    let avatar_part = form.require_file("avatar")?;
    let avatar = state
        .storage
        .upload(
            "avatars",
            &avatar_part.filename,
            Some(&avatar_part.content_type),
            avatar_part.bytes.clone(),
        )
        .await?;

    let cover_image = match form.file("coverImage") {
        Some(part) if !part.bytes.is_empty() => Some(
            state
                .storage
                .upload("covers", &part.filename, Some(&part.content_type), part.bytes.clone())
                .await?
                .url,
        ),
        _ => None,
    };

    let user = state
        .users
        .create(&NewUser {
            username,
            email,
            full_name,
            password,
            avatar: avatar.url,
            cover_image,
        })
        .await?;

    Ok(ApiResponse::created(
        UserResponse::from(user),
        "User registered successfully",
    ))
}

/// Log in with username or email, issuing both tokens
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let identifier = payload
        .username
        .as_deref()
        .or(payload.email.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("Username or email is required"))?;
    let password = require_text(payload.password.as_deref(), "Password")?;

    let user = state
        .users
        .find_by_username_or_email(identifier)
        .await?
        .ok_or_else(|| ApiError::not_found("User does not exist"))?;

    if !state.users.verify_password(&user, &password)? {
        return Err(ApiError::unauthorized("Invalid user credentials"));
    }

    let access_token = state.jwt_service.generate_access_token(user.id)?;
    let refresh_token = state.jwt_service.generate_refresh_token(user.id)?;
    state.users.set_refresh_token(user.id, Some(&refresh_token)).await?;

    let body = LoginResponse {
        user: UserResponse::from(user),
        access_token: access_token.clone(),
        refresh_token: refresh_token.clone(),
    };

    let response = ApiResponse::ok(body, "User logged in successfully").into_response();
    with_session_cookies(&state, response, &access_token, &refresh_token)
}

/// Log out: drop the stored refresh token and expire both cookies
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, ApiError> {
    state.users.set_refresh_token(user.id, None).await?;

    let mut response = ApiResponse::<()>::ok_empty("User logged out").into_response();
    append_cookie(&mut response, &session_cookie("accessToken", "", 0))?;
    append_cookie(&mut response, &session_cookie("refreshToken", "", 0))?;

    Ok(response)
}

/// Rotate the refresh token; the presented token must match the stored one
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Option<Json<RefreshTokenRequest>>,
) -> Result<Response, ApiError> {
    let from_cookie = headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                (name == "refreshToken").then(|| value.to_string())
            })
        });

    let presented = from_cookie
        .or_else(|| payload.and_then(|Json(body)| body.refresh_token))
        .ok_or_else(|| ApiError::unauthorized("Unauthorized request"))?;

    let claims = state
        .jwt_service
        .validate_refresh_token(&presented)
        .map_err(|_| ApiError::unauthorized("Invalid refresh token"))?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid refresh token"))?;

    if user.refresh_token.as_deref() != Some(presented.as_str()) {
        return Err(ApiError::unauthorized("Refresh token is expired or used"));
    }

    let access_token = state.jwt_service.generate_access_token(user.id)?;
    let new_refresh_token = state.jwt_service.generate_refresh_token(user.id)?;
    state.users.set_refresh_token(user.id, Some(&new_refresh_token)).await?;

    let body = RefreshTokenResponse {
        access_token: access_token.clone(),
        refresh_token: new_refresh_token.clone(),
    };

    let response = ApiResponse::ok(body, "Access token refreshed").into_response();
    with_session_cookies(&state, response, &access_token, &new_refresh_token)
}

/// Change the password after verifying the current one
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let old_password = require_text(payload.old_password.as_deref(), "Old password")?;
    let new_password = require_text(payload.new_password.as_deref(), "New password")?;
    validate_password(&new_password).map_err(ApiError::Validation)?;

    let user = state
        .users
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid access token"))?;

    if !state.users.verify_password(&user, &old_password)? {
        return Err(ApiError::InvalidOperation("Invalid old password".to_string()));
    }

    state.users.change_password(auth.id, &new_password).await?;

    Ok(ApiResponse::<()>::ok_empty("Password changed successfully"))
}

/// The authenticated user's own profile
pub async fn current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid access token"))?;

    Ok(ApiResponse::ok(
        UserResponse::from(user),
        "Current user fetched successfully",
    ))
}

/// Update full name and/or email
pub async fn update_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let full_name = payload
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let email = payload.email.as_deref().map(str::trim).filter(|s| !s.is_empty());

    if full_name.is_none() && email.is_none() {
        return Err(ApiError::validation("At least one field is required"));
    }

    if let Some(email) = email {
        validate_email(email).map_err(ApiError::Validation)?;
    }

    let user = state
        .users
        .update_account(auth.id, full_name, email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::ok(
        UserResponse::from(user),
        "Account details updated successfully",
    ))
}

/// Replace the avatar image
pub async fn update_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let part = form.require_file("avatar")?;

    let uploaded = state
        .storage
        .upload("avatars", &part.filename, Some(&part.content_type), part.bytes.clone())
        .await?;

    let user = state
        .users
        .update_avatar(auth.id, &uploaded.url)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::ok(
        UserResponse::from(user),
        "Avatar updated successfully",
    ))
}

/// Replace the cover image
pub async fn update_cover_image(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let part = form.require_file("coverImage")?;

    let uploaded = state
        .storage
        .upload("covers", &part.filename, Some(&part.content_type), part.bytes.clone())
        .await?;

    let user = state
        .users
        .update_cover_image(auth.id, &uploaded.url)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::ok(
        UserResponse::from(user),
        "Cover image updated successfully",
    ))
}

/// A channel's public profile; subscription state reflects the caller
pub async fn channel_profile(
    State(state): State<AppState>,
    Extension(MaybeUser(viewer)): Extension<MaybeUser>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let username = require_text(Some(username.as_str()), "Username")?;

    let profile = state
        .users
        .channel_profile(&username, viewer.map(|u| u.id))
        .await?
        .ok_or_else(|| ApiError::not_found("Channel does not exist"))?;

    Ok(ApiResponse::ok(profile, "Channel profile fetched successfully"))
}

/// The caller's watch history, most recent first
pub async fn watch_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .users
        .watch_history(auth.id, PageParams::from(&query))
        .await?;

    Ok(ApiResponse::ok(page, "Watch history fetched successfully"))
}
