//! Test utilities and fixtures for ampache-gateway tests.
//!
//! Provides a migrated temporary database with insert helpers, a two-user
//! library fixture, and in-memory implementations of the store seams.
//!
//! # Example
//!
//! ```ignore
//! use ampache_gateway::test_utils::{seed_two_users, temp_store};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (store, _dir) = temp_store().await;
//!     let fixture = seed_two_users(&store).await;
//!     // ... test logic
//! }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;

use crate::auth::{CredentialStore, Session, SessionStore};
use crate::db::SqliteStore;
use crate::error::Result;
use crate::library::{LibraryStore, NameMatch, Page};
use crate::model::{Album, Artist, Track};

/// Creates a temporary database for testing.
///
/// The database lives in a temporary directory that is removed when the
/// returned `TempDir` is dropped. Keep it alive for the duration of the test.
pub async fn temp_store() -> (SqliteStore, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let store = SqliteStore::open(&dir.path().join("test.db"))
        .await
        .expect("Failed to initialize test database");
    (store, dir)
}

pub async fn insert_artist(store: &SqliteStore, user: &str, name: &str) -> i64 {
    sqlx::query("INSERT INTO artists (user_id, name) VALUES (?, ?)")
        .bind(user)
        .bind(name)
        .execute(store.pool())
        .await
        .expect("Failed to insert artist")
        .last_insert_rowid()
}

pub async fn insert_album(
    store: &SqliteStore,
    user: &str,
    name: &str,
    album_artist_id: i64,
    cover_file_id: Option<i64>,
) -> i64 {
    sqlx::query(
        "INSERT INTO albums (user_id, name, year, album_artist_id, cover_file_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(user)
    .bind(name)
    .bind(None::<i64>)
    .bind(album_artist_id)
    .bind(cover_file_id)
    .execute(store.pool())
    .await
    .expect("Failed to insert album")
    .last_insert_rowid()
}

/// Inserts a track whose length is `number * 10` seconds.
pub async fn insert_track(
    store: &SqliteStore,
    user: &str,
    title: &str,
    number: i64,
    artist_id: i64,
    album_id: i64,
    file_id: i64,
) -> i64 {
    sqlx::query(
        "INSERT INTO tracks (user_id, title, number, length, artist_id, album_id, file_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user)
    .bind(title)
    .bind(number)
    .bind(number * 10)
    .bind(artist_id)
    .bind(album_id)
    .bind(file_id)
    .execute(store.pool())
    .await
    .expect("Failed to insert track")
    .last_insert_rowid()
}

pub async fn insert_file(
    store: &SqliteStore,
    file_id: i64,
    path: &str,
    mimetype: Option<&str>,
    size: Option<i64>,
) {
    sqlx::query("INSERT INTO files (file_id, path, mimetype, size) VALUES (?, ?, ?, ?)")
        .bind(file_id)
        .bind(path)
        .bind(mimetype)
        .bind(size)
        .execute(store.pool())
        .await
        .expect("Failed to insert file");
}

/// Ids created by [`seed_two_users`].
#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    pub alice_metallica: i64,
    pub alice_massive: i64,
    pub alice_acdc: i64,
    pub alice_puppets: i64,
    pub alice_mezzanine: i64,
    pub alice_black: i64,
    pub alice_battery: i64,
    pub alice_title_track: i64,
    pub alice_angel: i64,
    pub alice_teardrop: i64,
    pub alice_bells: i64,
    pub alice_guest: i64,
    pub bob_metallica: i64,
    pub bob_puppets: i64,
    pub bob_battery: i64,
}

/// File id of alice's "Master of Puppets" cover.
pub const PUPPETS_COVER_FILE: i64 = 900;

/// Seeds two libraries:
///
/// alice: 3 artists, 3 albums, 6 tracks. Metallica also appears as a guest
/// on AC/DC's "Back in Black". Only "Master of Puppets" has a cover.
/// Track file ids are 101..=106.
///
/// bob: one Metallica artist, album and track ("Battery", file 201), with
/// names that collide with alice's.
pub async fn seed_two_users(store: &SqliteStore) -> Fixture {
    let alice_metallica = insert_artist(store, "alice", "Metallica").await;
    let alice_massive = insert_artist(store, "alice", "Massive Attack").await;
    let alice_acdc = insert_artist(store, "alice", "AC/DC").await;

    let alice_puppets = insert_album(
        store,
        "alice",
        "Master of Puppets",
        alice_metallica,
        Some(PUPPETS_COVER_FILE),
    )
    .await;
    let alice_mezzanine = insert_album(store, "alice", "Mezzanine", alice_massive, None).await;
    let alice_black = insert_album(store, "alice", "Back in Black", alice_acdc, None).await;

    let alice_battery =
        insert_track(store, "alice", "Battery", 1, alice_metallica, alice_puppets, 101).await;
    let alice_title_track = insert_track(
        store,
        "alice",
        "Master of Puppets",
        2,
        alice_metallica,
        alice_puppets,
        102,
    )
    .await;
    let alice_angel =
        insert_track(store, "alice", "Angel", 1, alice_massive, alice_mezzanine, 103).await;
    let alice_teardrop =
        insert_track(store, "alice", "Teardrop", 3, alice_massive, alice_mezzanine, 104).await;
    let alice_bells =
        insert_track(store, "alice", "Hells Bells", 1, alice_acdc, alice_black, 105).await;
    let alice_guest = insert_track(
        store,
        "alice",
        "Back in Black (cover)",
        11,
        alice_metallica,
        alice_black,
        106,
    )
    .await;

    let bob_metallica = insert_artist(store, "bob", "Metallica").await;
    let bob_puppets = insert_album(store, "bob", "Master of Puppets", bob_metallica, None).await;
    let bob_battery =
        insert_track(store, "bob", "Battery", 1, bob_metallica, bob_puppets, 201).await;

    Fixture {
        alice_metallica,
        alice_massive,
        alice_acdc,
        alice_puppets,
        alice_mezzanine,
        alice_black,
        alice_battery,
        alice_title_track,
        alice_angel,
        alice_teardrop,
        alice_bells,
        alice_guest,
        bob_metallica,
        bob_puppets,
        bob_battery,
    }
}

/// In-memory [`CredentialStore`].
#[derive(Default)]
pub struct MemoryCredentials {
    hashes: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryCredentials {
    pub fn add(&self, user: &str, hash: &str) {
        self.hashes
            .lock()
            .entry(user.to_string())
            .or_default()
            .push(hash.to_string());
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentials {
    async fn password_hashes(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self.hashes.lock().get(user_id).cloned().unwrap_or_default())
    }
}

/// In-memory [`SessionStore`].
#[derive(Default)]
pub struct MemorySessions {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessions {
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn contains_hash(&self, token_hash: &str) -> bool {
        self.sessions.lock().contains_key(token_hash)
    }
}

#[async_trait]
impl SessionStore for MemorySessions {
    async fn insert_session(&self, user_id: &str, token_hash: &str, expiry: i64) -> Result<()> {
        self.sessions.lock().insert(
            token_hash.to_string(),
            Session {
                user_id: user_id.to_string(),
                expiry,
            },
        );
        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>> {
        Ok(self.sessions.lock().get(token_hash).cloned())
    }

    async fn extend_session(&self, token_hash: &str, expiry: i64, now: i64) -> Result<bool> {
        match self.sessions.lock().get_mut(token_hash) {
            Some(session) if session.expiry >= now => {
                session.expiry = expiry;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_expired_sessions(&self, now: i64) -> Result<u64> {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.expiry >= now);
        Ok((before - sessions.len()) as u64)
    }
}

/// In-memory [`LibraryStore`] that records every single-entity lookup.
#[derive(Default)]
pub struct MemoryLibrary {
    next_id: AtomicI64,
    artists: Mutex<Vec<Artist>>,
    albums: Mutex<Vec<Album>>,
    tracks: Mutex<Vec<Track>>,
    lookups: Mutex<Vec<String>>,
}

impl MemoryLibrary {
    fn id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn add_artist(&self, user: &str, name: &str) -> i64 {
        let id = self.id();
        self.artists.lock().push(Artist {
            id,
            user_id: user.to_string(),
            name: name.to_string(),
        });
        id
    }

    pub fn add_album(&self, user: &str, name: &str, album_artist_id: i64) -> i64 {
        let id = self.id();
        self.albums.lock().push(Album {
            id,
            user_id: user.to_string(),
            name: name.to_string(),
            year: None,
            album_artist_id,
            cover_file_id: None,
        });
        id
    }

    pub fn add_track(&self, user: &str, title: &str, artist_id: i64, album_id: i64) -> i64 {
        let id = self.id();
        self.tracks.lock().push(Track {
            id,
            user_id: user.to_string(),
            title: title.to_string(),
            number: None,
            length: None,
            artist_id,
            album_id,
            file_id: id,
        });
        id
    }

    /// Single-entity lookups so far, as `"artist:3"`, `"album:5"`, `"track:9"`.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }

    pub fn clear_lookups(&self) {
        self.lookups.lock().clear();
    }

    fn record(&self, kind: &str, id: i64) {
        self.lookups.lock().push(format!("{kind}:{id}"));
    }
}

fn matches(value: &str, name: &str, mode: NameMatch) -> bool {
    match mode {
        NameMatch::Exact => value == name,
        NameMatch::Fuzzy => value.to_lowercase().contains(&name.to_lowercase()),
    }
}

fn sorted<T>(mut items: Vec<T>, key: impl Fn(&T) -> (String, i64)) -> Vec<T> {
    items.sort_by_key(key);
    items
}

fn artist_key(a: &Artist) -> (String, i64) {
    (a.name.to_lowercase(), a.id)
}

fn album_key(a: &Album) -> (String, i64) {
    (a.name.to_lowercase(), a.id)
}

fn track_key(t: &Track) -> (String, i64) {
    (t.title.to_lowercase(), t.id)
}

#[async_trait]
impl LibraryStore for MemoryLibrary {
    async fn find_artist(&self, id: i64, user: &str) -> Result<Option<Artist>> {
        self.record("artist", id);
        Ok(self
            .artists
            .lock()
            .iter()
            .find(|a| a.id == id && a.user_id == user)
            .cloned())
    }

    async fn find_album(&self, id: i64, user: &str) -> Result<Option<Album>> {
        self.record("album", id);
        Ok(self
            .albums
            .lock()
            .iter()
            .find(|a| a.id == id && a.user_id == user)
            .cloned())
    }

    async fn find_track(&self, id: i64, user: &str) -> Result<Option<Track>> {
        self.record("track", id);
        Ok(self
            .tracks
            .lock()
            .iter()
            .find(|t| t.id == id && t.user_id == user)
            .cloned())
    }

    async fn all_artists(&self, user: &str) -> Result<Vec<Artist>> {
        let items = self.artists.lock().iter().filter(|a| a.user_id == user).cloned().collect();
        Ok(sorted(items, artist_key))
    }

    async fn all_albums(&self, user: &str) -> Result<Vec<Album>> {
        let items = self.albums.lock().iter().filter(|a| a.user_id == user).cloned().collect();
        Ok(sorted(items, album_key))
    }

    async fn all_tracks(&self, user: &str, page: Page) -> Result<Vec<Track>> {
        let items = self.tracks.lock().iter().filter(|t| t.user_id == user).cloned().collect();
        Ok(sorted(items, track_key)
            .into_iter()
            .skip(page.offset.unwrap_or(0) as usize)
            .take(page.limit.map_or(usize::MAX, |l| l as usize))
            .collect())
    }

    async fn artists_by_name(&self, name: &str, user: &str, mode: NameMatch) -> Result<Vec<Artist>> {
        let items = self
            .artists
            .lock()
            .iter()
            .filter(|a| a.user_id == user && matches(&a.name, name, mode))
            .cloned()
            .collect();
        Ok(sorted(items, artist_key))
    }

    async fn albums_by_name(&self, name: &str, user: &str, mode: NameMatch) -> Result<Vec<Album>> {
        let items = self
            .albums
            .lock()
            .iter()
            .filter(|a| a.user_id == user && matches(&a.name, name, mode))
            .cloned()
            .collect();
        Ok(sorted(items, album_key))
    }

    async fn tracks_by_name(&self, name: &str, user: &str, mode: NameMatch) -> Result<Vec<Track>> {
        let items = self
            .tracks
            .lock()
            .iter()
            .filter(|t| t.user_id == user && matches(&t.title, name, mode))
            .cloned()
            .collect();
        Ok(sorted(items, track_key))
    }

    async fn tracks_by_name_recursive(&self, text: &str, user: &str) -> Result<Vec<Track>> {
        let artists = self.artists.lock().clone();
        let albums = self.albums.lock().clone();
        let artist_hit = |id: i64| {
            artists
                .iter()
                .any(|a| a.id == id && a.user_id == user && matches(&a.name, text, NameMatch::Fuzzy))
        };
        let album_hit = |id: i64| {
            albums
                .iter()
                .any(|a| a.id == id && a.user_id == user && matches(&a.name, text, NameMatch::Fuzzy))
        };
        let items = self
            .tracks
            .lock()
            .iter()
            .filter(|t| {
                t.user_id == user
                    && (matches(&t.title, text, NameMatch::Fuzzy)
                        || artist_hit(t.artist_id)
                        || album_hit(t.album_id))
            })
            .cloned()
            .collect();
        Ok(sorted(items, track_key))
    }

    async fn albums_by_artist(&self, artist_id: i64, user: &str) -> Result<Vec<Album>> {
        let featured: Vec<i64> = self
            .tracks
            .lock()
            .iter()
            .filter(|t| t.user_id == user && t.artist_id == artist_id)
            .map(|t| t.album_id)
            .collect();
        let items = self
            .albums
            .lock()
            .iter()
            .filter(|a| {
                a.user_id == user && (a.album_artist_id == artist_id || featured.contains(&a.id))
            })
            .cloned()
            .collect();
        Ok(sorted(items, album_key))
    }

    async fn tracks_by_artist(&self, artist_id: i64, user: &str) -> Result<Vec<Track>> {
        let items = self
            .tracks
            .lock()
            .iter()
            .filter(|t| t.user_id == user && t.artist_id == artist_id)
            .cloned()
            .collect();
        Ok(sorted(items, track_key))
    }

    async fn tracks_by_album(&self, album_id: i64, user: &str) -> Result<Vec<Track>> {
        let items = self
            .tracks
            .lock()
            .iter()
            .filter(|t| t.user_id == user && t.album_id == album_id)
            .cloned()
            .collect();
        Ok(sorted(items, track_key))
    }

    async fn count_artists(&self, user: &str) -> Result<i64> {
        Ok(self.all_artists(user).await?.len() as i64)
    }

    async fn count_albums(&self, user: &str) -> Result<i64> {
        Ok(self.all_albums(user).await?.len() as i64)
    }

    async fn count_tracks(&self, user: &str) -> Result<i64> {
        Ok(self.all_tracks(user, Page::default()).await?.len() as i64)
    }

    async fn count_albums_by_artist(&self, artist_id: i64, user: &str) -> Result<i64> {
        Ok(self.albums_by_artist(artist_id, user).await?.len() as i64)
    }

    async fn count_tracks_by_artist(&self, artist_id: i64, user: &str) -> Result<i64> {
        Ok(self.tracks_by_artist(artist_id, user).await?.len() as i64)
    }

    async fn count_tracks_by_album(&self, album_id: i64, user: &str) -> Result<i64> {
        Ok(self.tracks_by_album(album_id, user).await?.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_store_creates_working_database() {
        let (store, _dir) = temp_store().await;
        assert!(store.all_tracks("anyone", Page::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seed_two_users() {
        let (store, _dir) = temp_store().await;
        let f = seed_two_users(&store).await;
        assert_eq!(store.count_tracks("alice").await.unwrap(), 6);
        assert_eq!(store.count_tracks("bob").await.unwrap(), 1);
        assert_ne!(f.alice_metallica, f.bob_metallica);
    }

    #[tokio::test]
    async fn test_memory_library_records_lookups() {
        let lib = MemoryLibrary::default();
        let artist = lib.add_artist("alice", "Portishead");
        assert!(lib.find_artist(artist, "alice").await.unwrap().is_some());
        assert!(lib.find_artist(artist, "bob").await.unwrap().is_none());
        assert_eq!(lib.lookups(), vec![format!("artist:{artist}"), format!("artist:{artist}")]);
        lib.clear_lookups();
        assert!(lib.lookups().is_empty());
    }
}
