//! Tweet repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::tweet::{TWEET_WITH_OWNER_COLUMNS, Tweet, TweetWithOwner};
use crate::pagination::{Page, PageParams};
use crate::pipeline::{ListPipeline, SortDirection};

const TWEET_COLUMNS: &str = "id, owner_id, content, created_at, updated_at";

/// Tweet repository
#[derive(Clone)]
pub struct TweetRepository {
    pool: PgPool,
}

impl TweetRepository {
    /// Create a new tweet repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Post a tweet
    pub async fn create(&self, owner_id: Uuid, content: &str) -> Result<Tweet> {
        let tweet = sqlx::query_as::<_, Tweet>(&format!(
            "INSERT INTO tweets (owner_id, content) VALUES ($1, $2) RETURNING {TWEET_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(tweet)
    }

    /// Find a tweet by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(&format!(
            "SELECT {TWEET_COLUMNS} FROM tweets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tweet)
    }

    /// Check that a tweet exists
    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tweets WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// A tweet with its owner profile attached
    pub async fn with_owner(&self, id: Uuid) -> Result<Option<TweetWithOwner>> {
        let tweet = sqlx::query_as::<_, TweetWithOwner>(&format!(
            "SELECT {TWEET_WITH_OWNER_COLUMNS} FROM tweets t \
             LEFT JOIN users owner ON owner.id = t.owner_id WHERE t.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tweet)
    }

    /// A user's tweets, newest first
    pub async fn user_tweets(
        &self,
        owner_id: Uuid,
        params: PageParams,
    ) -> Result<Page<TweetWithOwner>> {
        let pipeline = ListPipeline::new("tweets t", TWEET_WITH_OWNER_COLUMNS)
            .join("users owner ON owner.id = t.owner_id")
            .filter_id("t.owner_id", owner_id)
            .order("t.created_at", SortDirection::Descending);

        pipeline.fetch_page(&self.pool, params).await.map_err(Into::into)
    }

    /// Replace a tweet's content
    pub async fn update(&self, id: Uuid, content: &str) -> Result<()> {
        sqlx::query("UPDATE tweets SET content = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(content)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete a tweet
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
