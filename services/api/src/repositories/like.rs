//! Like repository: toggle resolution and the liked-videos listing
//!
//! The toggle is a single logical check-then-act. Deletion goes first
//! (`DELETE ... RETURNING`); when nothing was deleted, the insert runs with
//! `ON CONFLICT DO NOTHING`, leaving races to the partial unique indexes
//! rather than application code. Two concurrent toggles can never produce a
//! duplicate (actor, target) pair.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ToggleOutcome;
use crate::models::like::{Like, LikeTarget};
use crate::models::video::{LikedVideo, VIDEO_WITH_OWNER_COLUMNS};
use crate::pagination::{Page, PageParams};
use crate::pipeline::{ListPipeline, SortDirection};

const LIKE_COLUMNS: &str = "id, liked_by, video_id, comment_id, tweet_id, created_at";

/// Like repository
#[derive(Clone)]
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    /// Create a new like repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Flip the like state for (actor, target)
    pub async fn toggle(&self, actor: Uuid, target: LikeTarget) -> Result<ToggleOutcome<Like>> {
        let column = target.column();

        let deleted = sqlx::query(&format!(
            "DELETE FROM likes WHERE liked_by = $1 AND {column} = $2 RETURNING id"
        ))
        .bind(actor)
        .bind(target.id())
        .fetch_optional(&self.pool)
        .await?;

        if deleted.is_some() {
            return Ok(ToggleOutcome::Removed);
        }

        let inserted = sqlx::query(&format!(
            "INSERT INTO likes (liked_by, {column}) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING RETURNING {LIKE_COLUMNS}"
        ))
        .bind(actor)
        .bind(target.id())
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(row) => Ok(ToggleOutcome::Added(Like::from_row(&row)?)),
            None => {
                // A concurrent toggle won the insert; the pair exists.
                let row = sqlx::query(&format!(
                    "SELECT {LIKE_COLUMNS} FROM likes WHERE liked_by = $1 AND {column} = $2"
                ))
                .bind(actor)
                .bind(target.id())
                .fetch_one(&self.pool)
                .await?;

                Ok(ToggleOutcome::Added(Like::from_row(&row)?))
            }
        }
    }

    /// Videos the actor has liked, most recently liked first
    ///
    /// The video join is required: a like whose video is gone drops out of
    /// the listing and the count.
    pub async fn liked_videos(&self, actor: Uuid, params: PageParams) -> Result<Page<LikedVideo>> {
        let projection = format!("{VIDEO_WITH_OWNER_COLUMNS}, l.created_at AS liked_at");

        let pipeline = ListPipeline::new("likes l", projection)
            .join_required("videos v ON v.id = l.video_id")
            .join("users owner ON owner.id = v.owner_id")
            .filter_id("l.liked_by", actor)
            .order("l.created_at", SortDirection::Descending);

        pipeline.fetch_page(&self.pool, params).await.map_err(Into::into)
    }
}
