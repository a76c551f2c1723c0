//! User models
//!
//! The full `User` row carries the credential hash and refresh token; those
//! two fields never appear in any serialized projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

/// Full user row; deliberately not serializable
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub password_hash: String,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            full_name: row.try_get("full_name")?,
            avatar: row.try_get("avatar")?,
            cover_image: row.try_get("cover_image")?,
            password_hash: row.try_get("password_hash")?,
            refresh_token: row.try_get("refresh_token")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// User as returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar: user.avatar,
            cover_image: user.cover_image,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Public profile projection attached to owned entities
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
}

impl UserSummary {
    /// Read a prefixed, left-joined projection; a missed join yields `None`
    pub fn from_row_prefixed(row: &PgRow, prefix: &str) -> Result<Option<Self>, sqlx::Error> {
        let id: Option<Uuid> = row.try_get(format!("{prefix}id").as_str())?;
        match id {
            Some(id) => Ok(Some(Self {
                id,
                username: row.try_get(format!("{prefix}username").as_str())?,
                full_name: row.try_get(format!("{prefix}full_name").as_str())?,
                avatar: row.try_get(format!("{prefix}avatar").as_str())?,
            })),
            None => Ok(None),
        }
    }
}

/// Profile projection used by subscription listings, which also expose email
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContact {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub avatar: String,
}

impl UserContact {
    pub fn from_row_prefixed(row: &PgRow, prefix: &str) -> Result<Option<Self>, sqlx::Error> {
        let id: Option<Uuid> = row.try_get(format!("{prefix}id").as_str())?;
        match id {
            Some(id) => Ok(Some(Self {
                id,
                username: row.try_get(format!("{prefix}username").as_str())?,
                full_name: row.try_get(format!("{prefix}full_name").as_str())?,
                email: row.try_get(format!("{prefix}email").as_str())?,
                avatar: row.try_get(format!("{prefix}avatar").as_str())?,
            })),
            None => Ok(None),
        }
    }
}

/// Channel profile with subscription counts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub subscribers_count: i64,
    pub subscribed_to_count: i64,
    pub is_subscribed: bool,
}

/// Request for user login
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request for password change
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// Request for account detail update; at least one field must be present
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// Body-based token refresh (the cookie is preferred when present)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

/// Response for login: the profile plus both tokens
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

/// Response for token refresh
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}
