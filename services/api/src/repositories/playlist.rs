//! Playlist repository for database operations
//!
//! Playlist membership lives in `playlist_videos`; its composite primary key
//! makes duplicate entries impossible, so add/remove report whether they
//! changed anything and the handler translates "no change" into a
//! validation failure.

use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::playlist::{Playlist, PlaylistDetail, PlaylistSummary};
use crate::models::user::UserSummary;
use crate::pagination::{Page, PageParams};
use crate::pipeline::{ListPipeline, SortDirection};

const PLAYLIST_COLUMNS: &str = "id, owner_id, name, description, created_at, updated_at";

/// Embedded video summaries, in playlist order
const VIDEOS_JSON: &str = "COALESCE((SELECT json_agg(json_build_object( \
        'id', v.id, 'title', v.title, 'thumbnail', v.thumbnail, \
        'duration', v.duration, 'views', v.views) ORDER BY pv.position) \
      FROM playlist_videos pv JOIN videos v ON v.id = pv.video_id \
      WHERE pv.playlist_id = p.id), '[]'::json)";

/// Playlist repository
#[derive(Clone)]
pub struct PlaylistRepository {
    pool: PgPool,
}

impl PlaylistRepository {
    /// Create a new playlist repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an empty playlist
    pub async fn create(&self, owner_id: Uuid, name: &str, description: &str) -> Result<Playlist> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!(
            "INSERT INTO playlists (owner_id, name, description) \
             VALUES ($1, $2, $3) RETURNING {PLAYLIST_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(playlist)
    }

    /// Find a playlist by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    /// A user's playlists with embedded video summaries, newest first
    pub async fn user_playlists(
        &self,
        owner_id: Uuid,
        params: PageParams,
    ) -> Result<Page<PlaylistSummary>> {
        let projection = format!(
            "p.id, p.name, p.description, p.created_at, p.updated_at, \
             {VIDEOS_JSON} AS videos, \
             (SELECT COUNT(*) FROM playlist_videos pv WHERE pv.playlist_id = p.id) AS videos_count"
        );

        let pipeline = ListPipeline::new("playlists p", projection)
            .filter_id("p.owner_id", owner_id)
            .order("p.created_at", SortDirection::Descending);

        pipeline.fetch_page(&self.pool, params).await.map_err(Into::into)
    }

    /// Full playlist detail: owner profile plus videos with their owners
    pub async fn detail(&self, id: Uuid) -> Result<Option<PlaylistDetail>> {
        let row = sqlx::query(
            r#"
            SELECT p.id, p.name, p.description, p.created_at, p.updated_at,
                   owner.id AS owner_id, owner.username AS owner_username,
                   owner.full_name AS owner_full_name, owner.avatar AS owner_avatar,
                   COALESCE((SELECT json_agg(json_build_object(
                       'id', v.id, 'title', v.title, 'description', v.description,
                       'thumbnail', v.thumbnail, 'duration', v.duration, 'views', v.views,
                       'createdAt', v.created_at,
                       'owner', json_build_object(
                           'id', vo.id, 'username', vo.username,
                           'fullName', vo.full_name, 'avatar', vo.avatar))
                       ORDER BY pv.position)
                     FROM playlist_videos pv
                     JOIN videos v ON v.id = pv.video_id
                     LEFT JOIN users vo ON vo.id = v.owner_id
                     WHERE pv.playlist_id = p.id), '[]'::json) AS videos,
                   (SELECT COUNT(*) FROM playlist_videos pv WHERE pv.playlist_id = p.id) AS videos_count
            FROM playlists p
            LEFT JOIN users owner ON owner.id = p.owner_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(PlaylistDetail {
                id: row.get("id"),
                name: row.get("name"),
                description: row.get("description"),
                owner: UserSummary::from_row_prefixed(&row, "owner_")?,
                videos: row.get("videos"),
                videos_count: row.get("videos_count"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            })),
            None => Ok(None),
        }
    }

    /// Replace name and description
    pub async fn update(&self, id: Uuid, name: &str, description: &str) -> Result<Playlist> {
        let playlist = sqlx::query_as::<_, Playlist>(&format!(
            "UPDATE playlists SET name = $2, description = $3, updated_at = now() \
             WHERE id = $1 RETURNING {PLAYLIST_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(playlist)
    }

    /// Delete a playlist
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Append a video; returns false when it was already present
    pub async fn add_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO playlist_videos (playlist_id, video_id, position)
            VALUES ($1, $2,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM playlist_videos WHERE playlist_id = $1))
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(playlist_id)
        .bind(video_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Remove a video; returns false when it was not present
    pub async fn remove_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2")
                .bind(playlist_id)
                .bind(video_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}
