//! Playlist models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::guard::Owned;
use crate::models::user::UserSummary;

/// Full playlist row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Playlist {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Listing projection: playlist metadata plus embedded video summaries
///
/// The `videos` field is a JSON array aggregated in the query itself; its
/// shape is fixed by the projection allow-list (id, title, thumbnail,
/// duration, views).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub videos: serde_json::Value,
    pub videos_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl sqlx::FromRow<'_, PgRow> for PlaylistSummary {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            videos: row.try_get("videos")?,
            videos_count: row.try_get("videos_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Detail projection: adds the owner profile and per-video owner profiles
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetail {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner: Option<UserSummary>,
    pub videos: serde_json::Value,
    pub videos_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating a playlist
#[derive(Debug, Deserialize)]
pub struct PlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}
