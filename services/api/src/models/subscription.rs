//! Subscription models

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::models::user::UserContact;

/// Full subscription row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub channel_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Entry of a channel's subscriber listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberEntry {
    pub subscriber: Option<UserContact>,
    pub subscribed_at: DateTime<Utc>,
}

impl sqlx::FromRow<'_, PgRow> for SubscriberEntry {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            subscriber: UserContact::from_row_prefixed(row, "subscriber_")?,
            subscribed_at: row.try_get("subscribed_at")?,
        })
    }
}

/// Entry of a user's subscribed-channels listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedChannelEntry {
    pub channel: Option<UserContact>,
    pub subscribed_at: DateTime<Utc>,
}

impl sqlx::FromRow<'_, PgRow> for SubscribedChannelEntry {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            channel: UserContact::from_row_prefixed(row, "channel_")?,
            subscribed_at: row.try_get("subscribed_at")?,
        })
    }
}
