//! One handler per action.
//!
//! Handlers receive the authenticated user explicitly through [`Call`];
//! nothing is read from shared request state.

use tracing::info;

use crate::auth::{Authenticator, SessionManager};
use crate::error::{Error, Result};
use crate::library::{FileStorage, LibraryStore};

use super::enrich::{self, Resolver};
use super::params::Params;
use super::query::{self, ListQuery};
use super::xml::{self, HandshakeInfo, LinkBuilder};
use super::Reply;

/// Everything an authenticated handler may touch.
pub(super) struct Call<'a> {
    pub library: &'a dyn LibraryStore,
    pub files: &'a dyn FileStorage,
    pub user: &'a str,
    pub params: &'a Params,
    pub links: LinkBuilder,
}

pub(super) async fn handshake(
    authenticator: &Authenticator,
    library: &dyn LibraryStore,
    params: &Params,
) -> Result<Reply> {
    let user = params.get("user").unwrap_or_default();
    let timestamp = params.get("timestamp").unwrap_or_default();
    let auth = params.get("auth").unwrap_or_default();

    let verified = authenticator.verify(user, timestamp, auth).await?;
    // No session is stored unless the counts succeed
    let (songs, artists, albums) = futures::try_join!(
        library.count_tracks(verified.user()),
        library.count_artists(verified.user()),
        library.count_albums(verified.user()),
    )?;
    let issued = verified.issue().await?;
    info!(target: "ampache::handshake", user = %issued.user_id, songs, artists, albums, "Client logged in");

    let body = xml::handshake(&HandshakeInfo {
        token: issued.token,
        issued_at: issued.issued_at,
        expiry: issued.expiry,
        songs,
        artists,
        albums,
    })?;
    Ok(Reply::Xml(body))
}

/// Never fails on a bad token; clients poll it unconditionally.
pub(super) async fn ping(sessions: &SessionManager, params: &Params) -> Result<Reply> {
    sessions.extend(params.auth()).await;
    Ok(Reply::Xml(xml::ping()?))
}

pub(super) async fn artists(call: &Call<'_>) -> Result<Reply> {
    let found = ListQuery::from_params(call.params)
        .artists(call.library, call.user)
        .await?;
    let views = enrich::artists(call.library, call.user, found).await?;
    Ok(Reply::Xml(xml::artists(&views)?))
}

pub(super) async fn artist_albums(call: &Call<'_>) -> Result<Reply> {
    let artist_id = call.params.id_filter()?;
    let found = call.library.albums_by_artist(artist_id, call.user).await?;
    let mut resolver = Resolver::new(call.library, call.user);
    let views = enrich::albums(&mut resolver, found).await?;
    Ok(Reply::Xml(xml::albums(&views, &call.links)?))
}

pub(super) async fn artist_songs(call: &Call<'_>) -> Result<Reply> {
    let artist_id = call.params.id_filter()?;
    let artist = call
        .library
        .find_artist(artist_id, call.user)
        .await?
        .ok_or_else(|| Error::not_found(format!("Artist {artist_id} not found")))?;
    let tracks = call.library.tracks_by_artist(artist_id, call.user).await?;
    let views = Resolver::new(call.library, call.user)
        .with_artist(artist)
        .tracks(tracks)
        .await?;
    Ok(Reply::Xml(xml::songs(&views, &call.links)?))
}

pub(super) async fn albums(call: &Call<'_>) -> Result<Reply> {
    let found = ListQuery::from_params(call.params)
        .albums(call.library, call.user)
        .await?;
    let mut resolver = Resolver::new(call.library, call.user);
    let views = enrich::albums(&mut resolver, found).await?;
    Ok(Reply::Xml(xml::albums(&views, &call.links)?))
}

pub(super) async fn album_songs(call: &Call<'_>) -> Result<Reply> {
    let album_id = call.params.id_filter()?;
    let mut resolver = Resolver::new(call.library, call.user);
    // Loads the album once and fails fast when it is missing
    resolver.album(album_id).await?;
    let tracks = call.library.tracks_by_album(album_id, call.user).await?;
    let views = resolver.tracks(tracks).await?;
    Ok(Reply::Xml(xml::songs(&views, &call.links)?))
}

pub(super) async fn songs(call: &Call<'_>) -> Result<Reply> {
    let found = ListQuery::from_params(call.params)
        .songs(call.library, call.user)
        .await?;
    let views = Resolver::new(call.library, call.user).tracks(found).await?;
    Ok(Reply::Xml(xml::songs(&views, &call.links)?))
}

pub(super) async fn song(call: &Call<'_>) -> Result<Reply> {
    let track_id = call.params.id_filter()?;
    let track = call
        .library
        .find_track(track_id, call.user)
        .await?
        .ok_or_else(|| Error::not_found(format!("Track {track_id} not found")))?;
    let view = Resolver::new(call.library, call.user).track(track).await?;
    Ok(Reply::Xml(xml::songs(&[view], &call.links)?))
}

pub(super) async fn search_songs(call: &Call<'_>) -> Result<Reply> {
    let found = query::search_songs(call.library, call.user, call.params.filter()).await?;
    let views = Resolver::new(call.library, call.user).tracks(found).await?;
    Ok(Reply::Xml(xml::songs(&views, &call.links)?))
}

pub(super) async fn play(call: &Call<'_>) -> Result<Reply> {
    let track_id = call.params.id_filter()?;
    let handle =
        super::media::resolve_track_file(call.library, call.files, track_id, call.user).await?;
    Ok(Reply::File(handle))
}

pub(super) async fn get_cover(call: &Call<'_>) -> Result<Reply> {
    let album_id = call.params.id_filter()?;
    let handle =
        super::media::resolve_album_cover_file(call.library, call.files, album_id, call.user)
            .await?;
    Ok(Reply::File(handle))
}
