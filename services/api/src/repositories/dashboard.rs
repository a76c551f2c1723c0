//! Channel dashboard aggregates

use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::ChannelStats;

/// Dashboard repository
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    /// Create a new dashboard repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Aggregate counters for a channel's dashboard
    pub async fn channel_stats(&self, channel_id: Uuid) -> Result<ChannelStats> {
        let videos = sqlx::query(
            "SELECT COUNT(*) AS total_videos, COALESCE(SUM(views), 0)::BIGINT AS total_views \
             FROM videos WHERE owner_id = $1",
        )
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await?;

        let total_subscribers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1")
                .bind(channel_id)
                .fetch_one(&self.pool)
                .await?;

        let total_likes: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM likes l JOIN videos v ON v.id = l.video_id \
             WHERE v.owner_id = $1",
        )
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ChannelStats {
            total_videos: videos.get("total_videos"),
            total_views: videos.get("total_views"),
            total_subscribers,
            total_likes,
        })
    }
}
