//! Tweet models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::guard::Owned;
use crate::models::user::UserSummary;

/// Full tweet row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Tweet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Tweet {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Tweet with its owner's public profile attached
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetWithOwner {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: Option<UserSummary>,
}

/// Projection columns for the tweet pipelines; the owner join must be
/// aliased as `owner`
pub const TWEET_WITH_OWNER_COLUMNS: &str = "t.id, t.content, t.created_at, t.updated_at, \
     owner.id AS owner_id, owner.username AS owner_username, \
     owner.full_name AS owner_full_name, owner.avatar AS owner_avatar";

impl sqlx::FromRow<'_, PgRow> for TweetWithOwner {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            owner: UserSummary::from_row_prefixed(row, "owner_")?,
        })
    }
}

/// Request body for creating or updating a tweet
#[derive(Debug, Deserialize)]
pub struct TweetRequest {
    pub content: Option<String>,
}
