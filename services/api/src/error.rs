//! Custom error types for the API service
//!
//! Every failure surfaces to the HTTP boundary as the uniform error
//! envelope `{ statusCode, message, success: false, errors: [] }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed identifier or invalid input
    #[error("{0}")]
    Validation(String),

    /// A structurally valid request that the domain rules forbid
    #[error("{0}")]
    InvalidOperation(String),

    /// Missing, invalid, or expired credential
    #[error("{0}")]
    Unauthorized(String),

    /// Valid actor, wrong owner
    #[error("{0}")]
    PermissionDenied(String),

    /// Entity absent
    #[error("{0}")]
    NotFound(String),

    /// Downstream blob upload failure
    #[error("{0}")]
    Upload(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),

    /// Any other internal failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upload(_) | ApiError::Database(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(common::error::DatabaseError::Query(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal detail goes to the log, never to the client.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Internal error: {:#}", self);
            match self {
                ApiError::Upload(msg) => msg,
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "statusCode": status.as_u16(),
            "message": message,
            "success": false,
            "errors": [],
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// Parse a path identifier, failing with `Validation` before anything runs
pub fn parse_id(raw: &str, what: &str) -> ApiResult<uuid::Uuid> {
    raw.parse()
        .map_err(|_| ApiError::Validation(format!("Invalid {} ID", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidOperation("no".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized("who").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::PermissionDenied("not yours".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::not_found("gone").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Upload("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_parse_id_rejects_malformed_input() {
        assert!(parse_id("not-a-uuid", "video").is_err());
        assert!(parse_id("123", "video").is_err());
        assert!(parse_id("550e8400-e29b-41d4-a716-446655440000", "video").is_ok());
    }

    #[test]
    fn test_parse_id_message_names_the_entity() {
        let err = parse_id("nope", "channel").unwrap_err();
        assert_eq!(err.to_string(), "Invalid channel ID");
    }
}
