//! Authentication middleware for JWT token validation
//!
//! Two flavors: `auth_middleware` rejects requests without a valid access
//! token, `identify_middleware` records the caller when a token is present
//! and lets the request through either way. Both accept the token from the
//! `Authorization: Bearer` header or the `accessToken` cookie.

use axum::{
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// Caller identity on public routes; `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

/// Pull a bearer token from the Authorization header or the access cookie
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(bearer) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }

    headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                (name == "accessToken").then(|| value.to_string())
            })
        })
}

/// Resolve the token to a live user, or explain why it did not resolve
async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = extract_token(headers).ok_or_else(|| ApiError::unauthorized("Unauthorized request"))?;

    let claims = state.jwt_service.validate_access_token(&token).map_err(|e| {
        debug!("Access token rejected: {}", e);
        ApiError::unauthorized("Invalid access token")
    })?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid access token"))?;

    Ok(AuthUser {
        id: user.id,
        username: user.username,
    })
}

/// Authentication middleware; rejects anonymous requests
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let user = resolve_user(&state, req.headers()).await?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Identification middleware; anonymous requests pass with `MaybeUser(None)`
pub async fn identify_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let user = resolve_user(&state, req.headers()).await.ok();
    req.extensions_mut().insert(MaybeUser(user));

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("accessToken=cookie-token"),
        );

        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; accessToken=cookie-token; lang=en"),
        );

        assert_eq!(extract_token(&headers).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn test_missing_token() {
        let headers = HeaderMap::new();
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn test_non_bearer_scheme_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );

        assert_eq!(extract_token(&headers), None);
    }
}
