//! Uniform success envelope returned by every endpoint
//!
//! `{ statusCode, data, message, success }` where `success = statusCode < 400`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Success envelope wrapping a response payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: Option<T>,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.as_u16() < 400,
        }
    }

    /// 200 OK with a payload
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, Some(data), message)
    }

    /// 201 Created with a payload
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED, Some(data), message)
    }

    /// 200 OK without a payload (e.g. deletions, toggle removals)
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, None, message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_flag_follows_status() {
        let ok = ApiResponse::ok(1, "fine");
        assert!(ok.success);
        assert_eq!(ok.status_code, 200);

        let created = ApiResponse::created("x", "made");
        assert!(created.success);
        assert_eq!(created.status_code, 201);
    }

    #[test]
    fn test_empty_payload_serializes_as_null() {
        let resp = ApiResponse::<()>::ok_empty("done");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["data"], serde_json::Value::Null);
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["success"], true);
    }
}
