//! Subscription repository: toggle resolution and both listing directions
//!
//! Same toggle discipline as likes: delete first, then insert guarded by the
//! (subscriber, channel) uniqueness constraint. The self-subscription check
//! happens at the handler before this repository is ever reached; the CHECK
//! constraint backs it up at the store.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ToggleOutcome;
use crate::models::subscription::{SubscribedChannelEntry, SubscriberEntry, Subscription};
use crate::pagination::{Page, PageParams};
use crate::pipeline::{ListPipeline, SortDirection};

const SUBSCRIPTION_COLUMNS: &str = "id, subscriber_id, channel_id, created_at";

/// Subscription repository
#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Flip the subscription state for (subscriber, channel)
    pub async fn toggle(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> Result<ToggleOutcome<Subscription>> {
        let deleted = sqlx::query(
            "DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2 RETURNING id",
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .fetch_optional(&self.pool)
        .await?;

        if deleted.is_some() {
            return Ok(ToggleOutcome::Removed);
        }

        let inserted = sqlx::query_as::<_, Subscription>(&format!(
            "INSERT INTO subscriptions (subscriber_id, channel_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING RETURNING {SUBSCRIPTION_COLUMNS}"
        ))
        .bind(subscriber_id)
        .bind(channel_id)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(subscription) => Ok(ToggleOutcome::Added(subscription)),
            None => {
                // Lost an insert race; the pair exists.
                let subscription = sqlx::query_as::<_, Subscription>(&format!(
                    "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions \
                     WHERE subscriber_id = $1 AND channel_id = $2"
                ))
                .bind(subscriber_id)
                .bind(channel_id)
                .fetch_one(&self.pool)
                .await?;

                Ok(ToggleOutcome::Added(subscription))
            }
        }
    }

    /// Subscribers of a channel, newest first
    pub async fn channel_subscribers(
        &self,
        channel_id: Uuid,
        params: PageParams,
    ) -> Result<Page<SubscriberEntry>> {
        let pipeline = ListPipeline::new(
            "subscriptions s",
            "sub.id AS subscriber_id, sub.username AS subscriber_username, \
             sub.full_name AS subscriber_full_name, sub.email AS subscriber_email, \
             sub.avatar AS subscriber_avatar, s.created_at AS subscribed_at",
        )
        .join("users sub ON sub.id = s.subscriber_id")
        .filter_id("s.channel_id", channel_id)
        .order("s.created_at", SortDirection::Descending);

        pipeline.fetch_page(&self.pool, params).await.map_err(Into::into)
    }

    /// Channels a user is subscribed to, newest first
    pub async fn subscribed_channels(
        &self,
        subscriber_id: Uuid,
        params: PageParams,
    ) -> Result<Page<SubscribedChannelEntry>> {
        let pipeline = ListPipeline::new(
            "subscriptions s",
            "ch.id AS channel_id, ch.username AS channel_username, \
             ch.full_name AS channel_full_name, ch.email AS channel_email, \
             ch.avatar AS channel_avatar, s.created_at AS subscribed_at",
        )
        .join("users ch ON ch.id = s.channel_id")
        .filter_id("s.subscriber_id", subscriber_id)
        .order("s.created_at", SortDirection::Descending);

        pipeline.fetch_page(&self.pool, params).await.map_err(Into::into)
    }
}
