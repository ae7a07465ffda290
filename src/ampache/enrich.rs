//! Cross-reference resolution ahead of serialization.
//!
//! The wire format repeats parent data inline, so every track carries its
//! artist and album (with the album's own artist), and every album carries
//! its album artist and track count. These are pure functions over
//! [`LibraryStore`]: raw entities in, resolved views out. A dangling parent
//! reference fails the whole response with a not-found error instead of
//! dropping the child.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::library::LibraryStore;
use crate::model::{Album, Artist, Track};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistView {
    pub artist: Artist,
    pub album_count: i64,
    pub track_count: i64,
}

/// An album with its album artist resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAlbum {
    pub album: Album,
    pub album_artist: Artist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumView {
    pub album: ResolvedAlbum,
    pub track_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackView {
    pub track: Track,
    pub artist: Artist,
    pub album: ResolvedAlbum,
}

/// Per-response lookup memo, seeded with parents the caller already holds.
///
/// Lives for one response only; nothing is shared between requests.
pub struct Resolver<'a> {
    library: &'a dyn LibraryStore,
    user: &'a str,
    artists: HashMap<i64, Artist>,
    albums: HashMap<i64, ResolvedAlbum>,
}

impl<'a> Resolver<'a> {
    pub fn new(library: &'a dyn LibraryStore, user: &'a str) -> Self {
        Self {
            library,
            user,
            artists: HashMap::new(),
            albums: HashMap::new(),
        }
    }

    /// Reuse an artist that is already loaded.
    pub fn with_artist(mut self, artist: Artist) -> Self {
        self.artists.insert(artist.id, artist);
        self
    }

    pub async fn artist(&mut self, id: i64) -> Result<Artist> {
        if let Some(artist) = self.artists.get(&id) {
            return Ok(artist.clone());
        }
        let artist = self
            .library
            .find_artist(id, self.user)
            .await?
            .ok_or_else(|| Error::not_found(format!("Artist {id} not found")))?;
        self.artists.insert(id, artist.clone());
        Ok(artist)
    }

    /// Attach the album's own album artist.
    pub async fn resolve_album(&mut self, album: Album) -> Result<ResolvedAlbum> {
        let album_artist = self.artist(album.album_artist_id).await?;
        Ok(ResolvedAlbum {
            album,
            album_artist,
        })
    }

    pub async fn album(&mut self, id: i64) -> Result<ResolvedAlbum> {
        if let Some(album) = self.albums.get(&id) {
            return Ok(album.clone());
        }
        let album = self
            .library
            .find_album(id, self.user)
            .await?
            .ok_or_else(|| Error::not_found(format!("Album {id} not found")))?;
        let resolved = self.resolve_album(album).await?;
        self.albums.insert(id, resolved.clone());
        Ok(resolved)
    }

    pub async fn track(&mut self, track: Track) -> Result<TrackView> {
        let artist = self.artist(track.artist_id).await?;
        let album = self.album(track.album_id).await?;
        Ok(TrackView {
            track,
            artist,
            album,
        })
    }

    pub async fn tracks(&mut self, tracks: Vec<Track>) -> Result<Vec<TrackView>> {
        let mut views = Vec::with_capacity(tracks.len());
        for track in tracks {
            views.push(self.track(track).await?);
        }
        Ok(views)
    }
}

/// Attach album and track counts to each artist.
pub async fn artists(
    library: &dyn LibraryStore,
    user: &str,
    artists: Vec<Artist>,
) -> Result<Vec<ArtistView>> {
    let mut views = Vec::with_capacity(artists.len());
    for artist in artists {
        let (album_count, track_count) = futures::try_join!(
            library.count_albums_by_artist(artist.id, user),
            library.count_tracks_by_artist(artist.id, user),
        )?;
        views.push(ArtistView {
            artist,
            album_count,
            track_count,
        });
    }
    Ok(views)
}

/// Resolve album artists and attach track counts.
pub async fn albums(resolver: &mut Resolver<'_>, albums: Vec<Album>) -> Result<Vec<AlbumView>> {
    let mut views = Vec::with_capacity(albums.len());
    for album in albums {
        let track_count = resolver
            .library
            .count_tracks_by_album(album.id, resolver.user)
            .await?;
        views.push(AlbumView {
            album: resolver.resolve_album(album).await?,
            track_count,
        });
    }
    Ok(views)
}
