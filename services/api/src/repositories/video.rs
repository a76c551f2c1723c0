//! Video repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::video::{VIDEO_WITH_OWNER_COLUMNS, ChannelVideo, Video, VideoWithOwner};
use crate::pagination::{Page, PageParams};
use crate::pipeline::{ListPipeline, SortDirection, SortKey};

/// Sort keys the public video listing recognizes
const VIDEO_SORT_KEYS: &[SortKey] = &[
    SortKey {
        name: "createdAt",
        column: "v.created_at",
    },
    SortKey {
        name: "views",
        column: "v.views",
    },
    SortKey {
        name: "duration",
        column: "v.duration",
    },
    SortKey {
        name: "title",
        column: "v.title",
    },
];

const VIDEO_COLUMNS: &str = "id, owner_id, video_file, thumbnail, title, description, duration, \
     views, is_published, created_at, updated_at";

/// Video repository
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    /// Create a new video repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Published videos, optionally scoped to an owner and a search term
    pub async fn list(
        &self,
        params: PageParams,
        search: Option<&str>,
        owner: Option<Uuid>,
        sort_by: Option<&str>,
        sort_type: Option<&str>,
    ) -> Result<Page<VideoWithOwner>> {
        let mut pipeline = ListPipeline::new("videos v", VIDEO_WITH_OWNER_COLUMNS)
            .join("users owner ON owner.id = v.owner_id")
            .filter_flag("v.is_published", true);

        if let Some(owner) = owner {
            pipeline = pipeline.filter_id("v.owner_id", owner);
        }

        if let Some(term) = search {
            pipeline = pipeline.search(term, &["v.title", "v.description"]);
        }

        pipeline = pipeline.order_requested(sort_by, sort_type, VIDEO_SORT_KEYS, "v.created_at");

        pipeline.fetch_page(&self.pool, params).await.map_err(Into::into)
    }

    /// Create a video record after its media has been uploaded
    pub async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        description: &str,
        video_file: &str,
        thumbnail: &str,
        duration: i32,
    ) -> Result<Video> {
        info!("Publishing video '{}' for user {}", title, owner_id);

        let video = sqlx::query_as::<_, Video>(&format!(
            "INSERT INTO videos (owner_id, title, description, video_file, thumbnail, duration) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {VIDEO_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .bind(video_file)
        .bind(thumbnail)
        .bind(duration)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    /// Find a video by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    /// Check that a video exists
    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// A video with its owner profile attached
    pub async fn with_owner(&self, id: Uuid) -> Result<Option<VideoWithOwner>> {
        let video = sqlx::query_as::<_, VideoWithOwner>(&format!(
            "SELECT {VIDEO_WITH_OWNER_COLUMNS} FROM videos v \
             LEFT JOIN users owner ON owner.id = v.owner_id WHERE v.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    /// Bump the view counter
    pub async fn increment_views(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE videos SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Update metadata; absent fields keep their value
    pub async fn update(
        &self,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        thumbnail: Option<&str>,
    ) -> Result<Video> {
        let video = sqlx::query_as::<_, Video>(&format!(
            "UPDATE videos SET title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             thumbnail = COALESCE($4, thumbnail), updated_at = now() \
             WHERE id = $1 RETURNING {VIDEO_COLUMNS}"
        ))
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(thumbnail)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    /// Delete a video
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Set the publish flag
    pub async fn set_published(&self, id: Uuid, published: bool) -> Result<Video> {
        let video = sqlx::query_as::<_, Video>(&format!(
            "UPDATE videos SET is_published = $2, updated_at = now() \
             WHERE id = $1 RETURNING {VIDEO_COLUMNS}"
        ))
        .bind(id)
        .bind(published)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    /// All of a channel's videos (published or not) with like counts
    pub async fn channel_videos(
        &self,
        owner_id: Uuid,
        params: PageParams,
    ) -> Result<Page<ChannelVideo>> {
        let projection = format!(
            "{VIDEO_WITH_OWNER_COLUMNS}, \
             (SELECT COUNT(*) FROM likes l WHERE l.video_id = v.id) AS likes_count"
        );

        let pipeline = ListPipeline::new("videos v", projection)
            .join("users owner ON owner.id = v.owner_id")
            .filter_id("v.owner_id", owner_id)
            .order("v.created_at", SortDirection::Descending);

        pipeline.fetch_page(&self.pool, params).await.map_err(Into::into)
    }
}
