//! Comment repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::comment::{COMMENT_WITH_OWNER_COLUMNS, Comment, CommentWithOwner};
use crate::pagination::{Page, PageParams};
use crate::pipeline::{ListPipeline, SortDirection};

const COMMENT_COLUMNS: &str = "id, owner_id, video_id, content, created_at, updated_at";

/// Comment repository
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    /// Create a new comment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Comments on a video, newest first
    pub async fn list_for_video(
        &self,
        video_id: Uuid,
        params: PageParams,
    ) -> Result<Page<CommentWithOwner>> {
        let pipeline = ListPipeline::new("comments c", COMMENT_WITH_OWNER_COLUMNS)
            .join("users owner ON owner.id = c.owner_id")
            .filter_id("c.video_id", video_id)
            .order("c.created_at", SortDirection::Descending);

        pipeline.fetch_page(&self.pool, params).await.map_err(Into::into)
    }

    /// Add a comment to a video
    pub async fn create(&self, owner_id: Uuid, video_id: Uuid, content: &str) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (owner_id, video_id, content) \
             VALUES ($1, $2, $3) RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(video_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Find a comment by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Check that a comment exists
    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// A comment with its owner profile attached
    pub async fn with_owner(&self, id: Uuid) -> Result<Option<CommentWithOwner>> {
        let comment = sqlx::query_as::<_, CommentWithOwner>(&format!(
            "SELECT {COMMENT_WITH_OWNER_COLUMNS} FROM comments c \
             LEFT JOIN users owner ON owner.id = c.owner_id WHERE c.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Replace a comment's content
    pub async fn update(&self, id: Uuid, content: &str) -> Result<()> {
        sqlx::query("UPDATE comments SET content = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(content)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete a comment
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
