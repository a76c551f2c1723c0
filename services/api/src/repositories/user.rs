//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::user::{ChannelProfile, User};
use crate::models::video::{VIDEO_WITH_OWNER_COLUMNS, VideoWithOwner};
use crate::pagination::{Page, PageParams};
use crate::pipeline::{ListPipeline, SortDirection};

/// Fields needed to register a user
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub avatar: String,
    pub cover_image: Option<String>,
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        info!("Creating new user: {}", new_user.username);

        let password_hash = hash_password(&new_user.password)?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, full_name, avatar, cover_image, password_hash)
            VALUES (lower($1), $2, $3, $4, $5, $6)
            RETURNING id, username, email, full_name, avatar, cover_image,
                      password_hash, refresh_token, created_at, updated_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.full_name)
        .bind(&new_user.avatar)
        .bind(&new_user.cover_image)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        User::from_row(&row).map_err(Into::into)
    }

    /// Check whether a username or email is already taken
    pub async fn exists_by_username_or_email(&self, username: &str, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = lower($1) OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Find a user by username or email
    pub async fn find_by_username_or_email(&self, username_or_email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, full_name, avatar, cover_image,
                   password_hash, refresh_token, created_at, updated_at
            FROM users
            WHERE username = lower($1) OR email = $1
            "#,
        )
        .bind(username_or_email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(User::from_row).transpose().map_err(Into::into)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, full_name, avatar, cover_image,
                   password_hash, refresh_token, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(User::from_row).transpose().map_err(Into::into)
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    /// Replace a user's password hash
    pub async fn change_password(&self, id: Uuid, new_password: &str) -> Result<()> {
        let password_hash = hash_password(new_password)?;

        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(&password_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Store or clear the refresh token reference
    pub async fn set_refresh_token(&self, id: Uuid, refresh_token: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE users SET refresh_token = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(refresh_token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Update full name and/or email; absent fields keep their value
    pub async fn update_account(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                updated_at = now()
            WHERE id = $1
            RETURNING id, username, email, full_name, avatar, cover_image,
                      password_hash, refresh_token, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(User::from_row).transpose().map_err(Into::into)
    }

    /// Replace the avatar reference
    pub async fn update_avatar(&self, id: Uuid, avatar_url: &str) -> Result<Option<User>> {
        self.update_image(id, "avatar", avatar_url).await
    }

    /// Replace the cover image reference
    pub async fn update_cover_image(&self, id: Uuid, cover_url: &str) -> Result<Option<User>> {
        self.update_image(id, "cover_image", cover_url).await
    }

    async fn update_image(&self, id: Uuid, column: &str, url: &str) -> Result<Option<User>> {
        // `column` is one of two literals chosen above, never caller input.
        let sql = format!(
            "UPDATE users SET {column} = $2, updated_at = now() WHERE id = $1 \
             RETURNING id, username, email, full_name, avatar, cover_image, \
                       password_hash, refresh_token, created_at, updated_at"
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(User::from_row).transpose().map_err(Into::into)
    }

    /// Channel profile by username, with counts and the caller's
    /// subscription state when a viewer is known
    pub async fn channel_profile(
        &self,
        username: &str,
        viewer: Option<Uuid>,
    ) -> Result<Option<ChannelProfile>> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.username, u.full_name, u.email, u.avatar, u.cover_image,
                   (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = u.id) AS subscribers_count,
                   (SELECT COUNT(*) FROM subscriptions s WHERE s.subscriber_id = u.id) AS subscribed_to_count,
                   EXISTS(
                       SELECT 1 FROM subscriptions s
                       WHERE s.channel_id = u.id AND s.subscriber_id = $2
                   ) AS is_subscribed
            FROM users u
            WHERE u.username = lower($1)
            "#,
        )
        .bind(username.trim())
        .bind(viewer)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(ChannelProfile {
                id: row.get("id"),
                username: row.get("username"),
                full_name: row.get("full_name"),
                email: row.get("email"),
                avatar: row.get("avatar"),
                cover_image: row.get("cover_image"),
                subscribers_count: row.get("subscribers_count"),
                subscribed_to_count: row.get("subscribed_to_count"),
                is_subscribed: row.get("is_subscribed"),
            })),
            None => Ok(None),
        }
    }

    /// Append a video to the user's watch history (duplicates allowed)
    pub async fn record_watch(&self, user_id: Uuid, video_id: Uuid) -> Result<()> {
        sqlx::query("INSERT INTO watch_history (user_id, video_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(video_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// The user's watch history, most recent first
    pub async fn watch_history(
        &self,
        user_id: Uuid,
        params: PageParams,
    ) -> Result<Page<VideoWithOwner>> {
        let pipeline = ListPipeline::new("watch_history wh", VIDEO_WITH_OWNER_COLUMNS)
            .join_required("videos v ON v.id = wh.video_id")
            .join("users owner ON owner.id = v.owner_id")
            .filter_id("wh.user_id", user_id)
            .order("wh.watched_at", SortDirection::Descending);

        pipeline.fetch_page(&self.pool, params).await.map_err(Into::into)
    }
}

/// Hash a password with argon2 and a fresh salt
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(hash)
}
