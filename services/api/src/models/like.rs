//! Like models
//!
//! A like targets exactly one of a video, a comment, or a tweet. The sum
//! type makes the "exactly one" invariant structural; the row it maps onto
//! keeps three nullable columns guarded by a CHECK constraint.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

/// What a like points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Video(Uuid),
    Comment(Uuid),
    Tweet(Uuid),
}

impl LikeTarget {
    /// Column holding this target's reference
    pub fn column(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video_id",
            LikeTarget::Comment(_) => "comment_id",
            LikeTarget::Tweet(_) => "tweet_id",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Tweet(id) => *id,
        }
    }

    /// Human-readable target name for messages
    pub fn label(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "Video",
            LikeTarget::Comment(_) => "Comment",
            LikeTarget::Tweet(_) => "Tweet",
        }
    }
}

/// Full like row, as returned when a toggle creates the record
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: Uuid,
    pub liked_by: Uuid,
    pub video_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub tweet_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            liked_by: row.try_get("liked_by")?,
            video_id: row.try_get("video_id")?,
            comment_id: row.try_get("comment_id")?,
            tweet_id: row.try_get("tweet_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_column_mapping() {
        let id = Uuid::new_v4();
        assert_eq!(LikeTarget::Video(id).column(), "video_id");
        assert_eq!(LikeTarget::Comment(id).column(), "comment_id");
        assert_eq!(LikeTarget::Tweet(id).column(), "tweet_id");
        assert_eq!(LikeTarget::Tweet(id).id(), id);
    }

    #[test]
    fn test_target_labels() {
        let id = Uuid::new_v4();
        assert_eq!(LikeTarget::Video(id).label(), "Video");
        assert_eq!(LikeTarget::Comment(id).label(), "Comment");
        assert_eq!(LikeTarget::Tweet(id).label(), "Tweet");
    }
}
