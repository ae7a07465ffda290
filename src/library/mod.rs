//! Library store and file storage seams.
//!
//! The gateway never owns library data; it queries it through
//! [`LibraryStore`] and resolves media through [`FileStorage`]. Every
//! library query takes the user it is scoped to.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;
use crate::model::{Album, Artist, Track};

/// How a name filter is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    /// Case-sensitive equality
    Exact,
    /// Case-insensitive substring
    Fuzzy,
}

/// Pagination window. `None` means unbounded / from the start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Query and aggregate access to a user's library.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    async fn find_artist(&self, id: i64, user: &str) -> Result<Option<Artist>>;
    async fn find_album(&self, id: i64, user: &str) -> Result<Option<Album>>;
    async fn find_track(&self, id: i64, user: &str) -> Result<Option<Track>>;

    async fn all_artists(&self, user: &str) -> Result<Vec<Artist>>;
    async fn all_albums(&self, user: &str) -> Result<Vec<Album>>;
    async fn all_tracks(&self, user: &str, page: Page) -> Result<Vec<Track>>;

    async fn artists_by_name(&self, name: &str, user: &str, mode: NameMatch) -> Result<Vec<Artist>>;
    async fn albums_by_name(&self, name: &str, user: &str, mode: NameMatch) -> Result<Vec<Album>>;
    async fn tracks_by_name(&self, name: &str, user: &str, mode: NameMatch) -> Result<Vec<Track>>;

    /// Tracks whose title, artist name or album name contains `text`.
    async fn tracks_by_name_recursive(&self, text: &str, user: &str) -> Result<Vec<Track>>;

    /// Albums credited to the artist or holding at least one of their tracks.
    async fn albums_by_artist(&self, artist_id: i64, user: &str) -> Result<Vec<Album>>;
    async fn tracks_by_artist(&self, artist_id: i64, user: &str) -> Result<Vec<Track>>;
    async fn tracks_by_album(&self, album_id: i64, user: &str) -> Result<Vec<Track>>;

    async fn count_artists(&self, user: &str) -> Result<i64>;
    async fn count_albums(&self, user: &str) -> Result<i64>;
    async fn count_tracks(&self, user: &str) -> Result<i64>;

    /// Same album set as [`LibraryStore::albums_by_artist`], counted.
    async fn count_albums_by_artist(&self, artist_id: i64, user: &str) -> Result<i64>;
    async fn count_tracks_by_artist(&self, artist_id: i64, user: &str) -> Result<i64>;
    async fn count_tracks_by_album(&self, album_id: i64, user: &str) -> Result<i64>;
}

/// A readable location of a media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub path: PathBuf,
    pub mime_type: String,
    pub size: Option<u64>,
}

/// Resolves opaque file ids to readable files.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Every existing location recorded for `file_id` (possibly none, possibly several).
    async fn handles(&self, file_id: i64) -> Result<Vec<FileHandle>>;
}
