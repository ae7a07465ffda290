//! Library queries. Every statement filters on `user_id`.

use async_trait::async_trait;

use super::{SqliteStore, like_pattern};
use crate::error::Result;
use crate::library::{LibraryStore, NameMatch, Page};
use crate::model::{Album, Artist, Track};

const ARTIST_COLUMNS: &str = "id, user_id, name";
const ALBUM_COLUMNS: &str = "id, user_id, name, year, album_artist_id, cover_file_id";
const TRACK_COLUMNS: &str = "id, user_id, title, number, length, artist_id, album_id, file_id";

/// Albums credited to `?artist` or holding one of their tracks.
/// Binds: user, artist, artist, user.
const ALBUMS_OF_ARTIST: &str = "user_id = ? AND (album_artist_id = ? OR id IN \
     (SELECT album_id FROM tracks WHERE artist_id = ? AND user_id = ?))";

fn name_clause(column: &str, mode: NameMatch) -> String {
    match mode {
        NameMatch::Exact => format!("{column} = ?"),
        NameMatch::Fuzzy => format!(r"{column} LIKE ? ESCAPE '\'"),
    }
}

fn name_arg(name: &str, mode: NameMatch) -> String {
    match mode {
        NameMatch::Exact => name.to_string(),
        NameMatch::Fuzzy => like_pattern(name),
    }
}

impl SqliteStore {
    async fn count(&self, sql: &str, user: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(sql).bind(user).fetch_one(self.pool()).await?;
        Ok(count)
    }

    async fn count_by_parent(&self, sql: &str, parent_id: i64, user: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(sql)
            .bind(parent_id)
            .bind(user)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl LibraryStore for SqliteStore {
    async fn find_artist(&self, id: i64, user: &str) -> Result<Option<Artist>> {
        let sql = format!("SELECT {ARTIST_COLUMNS} FROM artists WHERE id = ? AND user_id = ?");
        Ok(sqlx::query_as::<_, Artist>(&sql)
            .bind(id)
            .bind(user)
            .fetch_optional(self.pool())
            .await?)
    }

    async fn find_album(&self, id: i64, user: &str) -> Result<Option<Album>> {
        let sql = format!("SELECT {ALBUM_COLUMNS} FROM albums WHERE id = ? AND user_id = ?");
        Ok(sqlx::query_as::<_, Album>(&sql)
            .bind(id)
            .bind(user)
            .fetch_optional(self.pool())
            .await?)
    }

    async fn find_track(&self, id: i64, user: &str) -> Result<Option<Track>> {
        let sql = format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ? AND user_id = ?");
        Ok(sqlx::query_as::<_, Track>(&sql)
            .bind(id)
            .bind(user)
            .fetch_optional(self.pool())
            .await?)
    }

    async fn all_artists(&self, user: &str) -> Result<Vec<Artist>> {
        let sql = format!(
            "SELECT {ARTIST_COLUMNS} FROM artists WHERE user_id = ? ORDER BY name COLLATE NOCASE, id"
        );
        Ok(sqlx::query_as::<_, Artist>(&sql)
            .bind(user)
            .fetch_all(self.pool())
            .await?)
    }

    async fn all_albums(&self, user: &str) -> Result<Vec<Album>> {
        let sql = format!(
            "SELECT {ALBUM_COLUMNS} FROM albums WHERE user_id = ? ORDER BY name COLLATE NOCASE, id"
        );
        Ok(sqlx::query_as::<_, Album>(&sql)
            .bind(user)
            .fetch_all(self.pool())
            .await?)
    }

    async fn all_tracks(&self, user: &str, page: Page) -> Result<Vec<Track>> {
        // SQLite treats a negative LIMIT as "no limit"
        let sql = format!(
            "SELECT {TRACK_COLUMNS} FROM tracks WHERE user_id = ? \
             ORDER BY title COLLATE NOCASE, id LIMIT ? OFFSET ?"
        );
        Ok(sqlx::query_as::<_, Track>(&sql)
            .bind(user)
            .bind(page.limit.map(i64::from).unwrap_or(-1))
            .bind(page.offset.map(i64::from).unwrap_or(0))
            .fetch_all(self.pool())
            .await?)
    }

    async fn artists_by_name(&self, name: &str, user: &str, mode: NameMatch) -> Result<Vec<Artist>> {
        let sql = format!(
            "SELECT {ARTIST_COLUMNS} FROM artists WHERE user_id = ? AND {} \
             ORDER BY name COLLATE NOCASE, id",
            name_clause("name", mode)
        );
        Ok(sqlx::query_as::<_, Artist>(&sql)
            .bind(user)
            .bind(name_arg(name, mode))
            .fetch_all(self.pool())
            .await?)
    }

    async fn albums_by_name(&self, name: &str, user: &str, mode: NameMatch) -> Result<Vec<Album>> {
        let sql = format!(
            "SELECT {ALBUM_COLUMNS} FROM albums WHERE user_id = ? AND {} \
             ORDER BY name COLLATE NOCASE, id",
            name_clause("name", mode)
        );
        Ok(sqlx::query_as::<_, Album>(&sql)
            .bind(user)
            .bind(name_arg(name, mode))
            .fetch_all(self.pool())
            .await?)
    }

    async fn tracks_by_name(&self, name: &str, user: &str, mode: NameMatch) -> Result<Vec<Track>> {
        let sql = format!(
            "SELECT {TRACK_COLUMNS} FROM tracks WHERE user_id = ? AND {} \
             ORDER BY title COLLATE NOCASE, id",
            name_clause("title", mode)
        );
        Ok(sqlx::query_as::<_, Track>(&sql)
            .bind(user)
            .bind(name_arg(name, mode))
            .fetch_all(self.pool())
            .await?)
    }

    async fn tracks_by_name_recursive(&self, text: &str, user: &str) -> Result<Vec<Track>> {
        let pattern = like_pattern(text);
        let sql = r"
            SELECT t.id, t.user_id, t.title, t.number, t.length, t.artist_id, t.album_id, t.file_id
            FROM tracks t
            LEFT JOIN artists ar ON ar.id = t.artist_id AND ar.user_id = t.user_id
            LEFT JOIN albums al ON al.id = t.album_id AND al.user_id = t.user_id
            WHERE t.user_id = ?
              AND (t.title LIKE ? ESCAPE '\'
                   OR ar.name LIKE ? ESCAPE '\'
                   OR al.name LIKE ? ESCAPE '\')
            ORDER BY t.title COLLATE NOCASE, t.id
        ";
        Ok(sqlx::query_as::<_, Track>(sql)
            .bind(user)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(self.pool())
            .await?)
    }

    async fn albums_by_artist(&self, artist_id: i64, user: &str) -> Result<Vec<Album>> {
        let sql = format!(
            "SELECT {ALBUM_COLUMNS} FROM albums WHERE {ALBUMS_OF_ARTIST} \
             ORDER BY name COLLATE NOCASE, id"
        );
        Ok(sqlx::query_as::<_, Album>(&sql)
            .bind(user)
            .bind(artist_id)
            .bind(artist_id)
            .bind(user)
            .fetch_all(self.pool())
            .await?)
    }

    async fn tracks_by_artist(&self, artist_id: i64, user: &str) -> Result<Vec<Track>> {
        let sql = format!(
            "SELECT {TRACK_COLUMNS} FROM tracks WHERE artist_id = ? AND user_id = ? \
             ORDER BY title COLLATE NOCASE, id"
        );
        Ok(sqlx::query_as::<_, Track>(&sql)
            .bind(artist_id)
            .bind(user)
            .fetch_all(self.pool())
            .await?)
    }

    async fn tracks_by_album(&self, album_id: i64, user: &str) -> Result<Vec<Track>> {
        let sql = format!(
            "SELECT {TRACK_COLUMNS} FROM tracks WHERE album_id = ? AND user_id = ? \
             ORDER BY number, title COLLATE NOCASE, id"
        );
        Ok(sqlx::query_as::<_, Track>(&sql)
            .bind(album_id)
            .bind(user)
            .fetch_all(self.pool())
            .await?)
    }

    async fn count_artists(&self, user: &str) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM artists WHERE user_id = ?", user)
            .await
    }

    async fn count_albums(&self, user: &str) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM albums WHERE user_id = ?", user)
            .await
    }

    async fn count_tracks(&self, user: &str) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM tracks WHERE user_id = ?", user)
            .await
    }

    async fn count_albums_by_artist(&self, artist_id: i64, user: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM albums WHERE {ALBUMS_OF_ARTIST}");
        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(user)
            .bind(artist_id)
            .bind(artist_id)
            .bind(user)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    async fn count_tracks_by_artist(&self, artist_id: i64, user: &str) -> Result<i64> {
        self.count_by_parent(
            "SELECT COUNT(*) FROM tracks WHERE artist_id = ? AND user_id = ?",
            artist_id,
            user,
        )
        .await
    }

    async fn count_tracks_by_album(&self, album_id: i64, user: &str) -> Result<i64> {
        self.count_by_parent(
            "SELECT COUNT(*) FROM tracks WHERE album_id = ? AND user_id = ?",
            album_id,
            user,
        )
        .await
    }
}
