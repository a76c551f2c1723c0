//! Domain models and request/response payloads

use serde::Serialize;

pub mod comment;
pub mod like;
pub mod playlist;
pub mod subscription;
pub mod tweet;
pub mod user;
pub mod video;

/// Result of a toggle operation: the record now exists, or it no longer does
#[derive(Debug)]
pub enum ToggleOutcome<T> {
    Added(T),
    Removed,
}

/// Aggregate statistics for a channel
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_videos: i64,
    pub total_views: i64,
    pub total_subscribers: i64,
    pub total_likes: i64,
}
