//! Video models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::guard::Owned;
use crate::models::user::UserSummary;
use crate::pagination::PageQuery;

/// Full video row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Video {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Video with its owner's public profile attached
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoWithOwner {
    pub id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: Option<UserSummary>,
}

/// Projection columns shared by the video list pipelines; the owner join
/// must be aliased as `owner`
pub const VIDEO_WITH_OWNER_COLUMNS: &str = "v.id, v.video_file, v.thumbnail, v.title, v.description, v.duration, v.views, \
     v.is_published, v.created_at, v.updated_at, \
     owner.id AS owner_id, owner.username AS owner_username, \
     owner.full_name AS owner_full_name, owner.avatar AS owner_avatar";

impl sqlx::FromRow<'_, PgRow> for VideoWithOwner {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            video_file: row.try_get("video_file")?,
            thumbnail: row.try_get("thumbnail")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            duration: row.try_get("duration")?,
            views: row.try_get("views")?,
            is_published: row.try_get("is_published")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            owner: UserSummary::from_row_prefixed(row, "owner_")?,
        })
    }
}

/// Channel dashboard projection: a video with its like count
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelVideo {
    #[serde(flatten)]
    pub video: VideoWithOwner,
    pub likes_count: i64,
}

impl sqlx::FromRow<'_, PgRow> for ChannelVideo {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            video: VideoWithOwner::from_row(row)?,
            likes_count: row.try_get("likes_count")?,
        })
    }
}

/// Entry of the liked-videos listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideo {
    pub video: VideoWithOwner,
    pub liked_at: DateTime<Utc>,
}

impl sqlx::FromRow<'_, PgRow> for LikedVideo {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            video: VideoWithOwner::from_row(row)?,
            liked_at: row.try_get("liked_at")?,
        })
    }
}

/// Query parameters for the public video listing
#[derive(Debug, Default, Deserialize)]
pub struct VideoListQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    /// Free-text search over title and description
    pub query: Option<String>,
    /// Restrict to a single owner
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}
