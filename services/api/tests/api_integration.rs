//! Integration tests for the API repositories
//!
//! These tests run against a real PostgreSQL database and are ignored by
//! default. Each test seeds its own users, so reruns against a dirty
//! database stay independent.

use api::guard::ensure_can_mutate;
use api::models::ToggleOutcome;
use api::models::like::LikeTarget;
use api::pagination::PageParams;
use api::repositories::user::NewUser;
use api::repositories::{
    CommentRepository, DashboardRepository, LikeRepository, PlaylistRepository,
    SubscriptionRepository, TweetRepository, UserRepository, VideoRepository,
};
use common::database::{DatabaseConfig, init_pool};
use serial_test::serial;
use sqlx::PgPool;
use uuid::Uuid;

async fn setup() -> Result<PgPool, Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

async fn seed_user(pool: &PgPool) -> Result<api::models::user::User, Box<dyn std::error::Error>> {
    let suffix = Uuid::new_v4().simple().to_string();
    let users = UserRepository::new(pool.clone());

    let user = users
        .create(&NewUser {
            username: format!("user_{}", &suffix[..12]),
            email: format!("{}@example.com", &suffix[..12]),
            full_name: "Test User".to_string(),
            password: "password123".to_string(),
            avatar: "https://cdn.example.com/avatars/default.png".to_string(),
            cover_image: None,
        })
        .await?;

    Ok(user)
}

async fn seed_video(
    pool: &PgPool,
    owner: Uuid,
    title: &str,
    description: &str,
) -> Result<api::models::video::Video, Box<dyn std::error::Error>> {
    let videos = VideoRepository::new(pool.clone());
    let video = videos
        .create(
            owner,
            title,
            description,
            "https://cdn.example.com/videos/v.mp4",
            "https://cdn.example.com/thumbnails/t.png",
            120,
        )
        .await?;

    Ok(video)
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_like_toggle_flips_state() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let user = seed_user(&pool).await?;
    let video = seed_video(&pool, user.id, "Toggle target", "").await?;
    let likes = LikeRepository::new(pool.clone());

    let first = likes.toggle(user.id, LikeTarget::Video(video.id)).await?;
    assert!(matches!(first, ToggleOutcome::Added(_)));

    let second = likes.toggle(user.id, LikeTarget::Video(video.id)).await?;
    assert!(matches!(second, ToggleOutcome::Removed));

    let third = likes.toggle(user.id, LikeTarget::Video(video.id)).await?;
    assert!(matches!(third, ToggleOutcome::Added(_)));

    // Two adds can never stack up to two rows.
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE liked_by = $1 AND video_id = $2")
            .bind(user.id)
            .bind(video.id)
            .fetch_one(&pool)
            .await?;
    assert_eq!(count, 1);

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_subscription_toggle_moves_channel_stats() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let channel = seed_user(&pool).await?;
    let fan = seed_user(&pool).await?;
    let subscriptions = SubscriptionRepository::new(pool.clone());
    let dashboard = DashboardRepository::new(pool.clone());

    let before = dashboard.channel_stats(channel.id).await?;

    let outcome = subscriptions.toggle(fan.id, channel.id).await?;
    assert!(matches!(outcome, ToggleOutcome::Added(_)));

    let during = dashboard.channel_stats(channel.id).await?;
    assert_eq!(during.total_subscribers, before.total_subscribers + 1);

    let outcome = subscriptions.toggle(fan.id, channel.id).await?;
    assert!(matches!(outcome, ToggleOutcome::Removed));

    let after = dashboard.channel_stats(channel.id).await?;
    assert_eq!(after.total_subscribers, before.total_subscribers);

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_channel_stats_counts_views_and_likes() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let channel = seed_user(&pool).await?;
    let fan = seed_user(&pool).await?;
    let videos = VideoRepository::new(pool.clone());
    let likes = LikeRepository::new(pool.clone());
    let dashboard = DashboardRepository::new(pool.clone());

    let video = seed_video(&pool, channel.id, "Counted", "").await?;
    videos.increment_views(video.id).await?;
    videos.increment_views(video.id).await?;
    likes.toggle(fan.id, LikeTarget::Video(video.id)).await?;

    let stats = dashboard.channel_stats(channel.id).await?;
    assert_eq!(stats.total_videos, 1);
    assert_eq!(stats.total_views, 2);
    assert_eq!(stats.total_likes, 1);

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_video_search_is_case_insensitive() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let user = seed_user(&pool).await?;
    let videos = VideoRepository::new(pool.clone());

    let marker = Uuid::new_v4().simple().to_string();
    seed_video(&pool, user.id, &format!("CAT video {marker}"), "funny").await?;
    seed_video(&pool, user.id, &format!("dog video {marker}"), "about cats").await?;
    seed_video(&pool, user.id, &format!("bird video {marker}"), "chirping").await?;

    let page = videos
        .list(
            PageParams::default(),
            Some("cat"),
            Some(user.id),
            None,
            None,
        )
        .await?;

    // Title match and description match, both regardless of case.
    assert_eq!(page.total_items, 2);

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_unpublished_videos_stay_out_of_the_listing() -> Result<(), Box<dyn std::error::Error>>
{
    let pool = setup().await?;
    let user = seed_user(&pool).await?;
    let videos = VideoRepository::new(pool.clone());

    let video = seed_video(&pool, user.id, "Visible then hidden", "").await?;
    let page = videos
        .list(PageParams::default(), None, Some(user.id), None, None)
        .await?;
    assert_eq!(page.total_items, 1);

    videos.set_published(video.id, false).await?;
    let page = videos
        .list(PageParams::default(), None, Some(user.id), None, None)
        .await?;
    assert_eq!(page.total_items, 0);

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_pagination_envelope_math() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let user = seed_user(&pool).await?;
    let videos = VideoRepository::new(pool.clone());

    for i in 0..12 {
        seed_video(&pool, user.id, &format!("Video {i}"), "").await?;
    }

    let page = videos
        .list(
            PageParams { page: 2, limit: 5 },
            None,
            Some(user.id),
            None,
            None,
        )
        .await?;

    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total_items, 12);
    assert_eq!(page.total_pages, 3);
    assert!(page.has_next_page);
    assert!(page.has_prev_page);

    let last = videos
        .list(
            PageParams { page: 3, limit: 5 },
            None,
            Some(user.id),
            None,
            None,
        )
        .await?;
    assert_eq!(last.items.len(), 2);
    assert!(!last.has_next_page);

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_playlist_keeps_insertion_order() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let user = seed_user(&pool).await?;
    let playlists = PlaylistRepository::new(pool.clone());

    let playlist = playlists.create(user.id, "Ordered", "insertion order").await?;

    let a = seed_video(&pool, user.id, "First", "").await?;
    let b = seed_video(&pool, user.id, "Second", "").await?;
    let c = seed_video(&pool, user.id, "Third", "").await?;

    assert!(playlists.add_video(playlist.id, a.id).await?);
    assert!(playlists.add_video(playlist.id, b.id).await?);
    assert!(playlists.add_video(playlist.id, c.id).await?);

    // Adding the same video again changes nothing.
    assert!(!playlists.add_video(playlist.id, b.id).await?);

    let detail = playlists.detail(playlist.id).await?.expect("playlist exists");
    assert_eq!(detail.videos_count, 3);

    let titles: Vec<String> = detail.videos
        .as_array()
        .expect("videos is an array")
        .iter()
        .map(|v| v["title"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(titles, vec!["First", "Second", "Third"]);

    // Removal keeps the relative order of the rest.
    assert!(playlists.remove_video(playlist.id, b.id).await?);
    assert!(!playlists.remove_video(playlist.id, b.id).await?);

    let detail = playlists.detail(playlist.id).await?.expect("playlist exists");
    let titles: Vec<String> = detail.videos
        .as_array()
        .expect("videos is an array")
        .iter()
        .map(|v| v["title"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(titles, vec!["First", "Third"]);

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_foreign_owner_is_denied_but_absence_is_not_found()
-> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let owner = seed_user(&pool).await?;
    let stranger = seed_user(&pool).await?;
    let comments = CommentRepository::new(pool.clone());

    let video = seed_video(&pool, owner.id, "Commented", "").await?;
    let comment = comments.create(owner.id, video.id, "mine").await?;

    // Present but foreign: permission denied.
    let err = ensure_can_mutate(stranger.id, &comment, "comments").unwrap_err();
    assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);

    // Absent: the lookup itself comes back empty.
    assert!(comments.find_by_id(Uuid::new_v4()).await?.is_none());

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_self_subscription_is_rejected_by_the_store()
-> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let user = seed_user(&pool).await?;
    let subscriptions = SubscriptionRepository::new(pool.clone());

    // The handler rejects this first; the CHECK constraint backs it up.
    assert!(subscriptions.toggle(user.id, user.id).await.is_err());

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_tweet_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let user = seed_user(&pool).await?;
    let tweets = TweetRepository::new(pool.clone());

    let tweet = tweets.create(user.id, "hello world").await?;
    let listed = tweets.user_tweets(user.id, PageParams::default()).await?;
    assert_eq!(listed.total_items, 1);
    assert_eq!(
        listed.items[0].owner.as_ref().map(|o| o.id),
        Some(user.id)
    );

    tweets.update(tweet.id, "edited").await?;
    let fetched = tweets.with_owner(tweet.id).await?.expect("tweet exists");
    assert_eq!(fetched.content, "edited");

    tweets.delete(tweet.id).await?;
    assert!(tweets.find_by_id(tweet.id).await?.is_none());

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_watch_history_records_most_recent_first() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let user = seed_user(&pool).await?;
    let users = UserRepository::new(pool.clone());

    let a = seed_video(&pool, user.id, "Watched first", "").await?;
    let b = seed_video(&pool, user.id, "Watched second", "").await?;

    users.record_watch(user.id, a.id).await?;
    users.record_watch(user.id, b.id).await?;

    let history = users.watch_history(user.id, PageParams::default()).await?;
    assert_eq!(history.total_items, 2);
    assert_eq!(history.items[0].title, "Watched second");
    assert_eq!(history.items[1].title, "Watched first");

    Ok(())
}
