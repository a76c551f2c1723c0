//! Application state shared across handlers

use sqlx::PgPool;
use std::time::Instant;

use crate::jwt::JwtService;
use crate::repositories::{
    CommentRepository, DashboardRepository, LikeRepository, PlaylistRepository,
    SubscriptionRepository, TweetRepository, UserRepository, VideoRepository,
};
use crate::storage::StorageService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub users: UserRepository,
    pub videos: VideoRepository,
    pub comments: CommentRepository,
    pub likes: LikeRepository,
    pub subscriptions: SubscriptionRepository,
    pub playlists: PlaylistRepository,
    pub tweets: TweetRepository,
    pub dashboard: DashboardRepository,
    pub jwt_service: JwtService,
    pub storage: StorageService,
    /// When this process came up; reported by the healthcheck
    pub started_at: Instant,
}

impl AppState {
    /// Wire up every repository over one pool
    pub fn new(db_pool: PgPool, jwt_service: JwtService, storage: StorageService) -> Self {
        Self {
            users: UserRepository::new(db_pool.clone()),
            videos: VideoRepository::new(db_pool.clone()),
            comments: CommentRepository::new(db_pool.clone()),
            likes: LikeRepository::new(db_pool.clone()),
            subscriptions: SubscriptionRepository::new(db_pool.clone()),
            playlists: PlaylistRepository::new(db_pool.clone()),
            tweets: TweetRepository::new(db_pool.clone()),
            dashboard: DashboardRepository::new(db_pool.clone()),
            db_pool,
            jwt_service,
            storage,
            started_at: Instant::now(),
        }
    }
}
