//! Turns list parameters into library queries.
//!
//! A present `filter` selects by name, exactly or as a substring depending
//! on `exact`. Without a filter, `artists`/`albums` return the full set and
//! `songs` honours `limit`/`offset`. `search_songs` always searches
//! recursively and ignores `exact`.

use crate::error::Result;
use crate::library::{LibraryStore, NameMatch, Page};
use crate::model::{Album, Artist, Track};

use super::params::Params;

/// Filter and paging axes of a list action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery<'a> {
    pub filter: Option<&'a str>,
    pub mode: NameMatch,
    pub page: Page,
}

impl<'a> ListQuery<'a> {
    pub fn from_params(params: &'a Params) -> Self {
        Self {
            filter: params.filter(),
            mode: if params.exact() {
                NameMatch::Exact
            } else {
                NameMatch::Fuzzy
            },
            page: params.page(),
        }
    }

    pub async fn artists(&self, library: &dyn LibraryStore, user: &str) -> Result<Vec<Artist>> {
        match self.filter {
            Some(name) => library.artists_by_name(name, user, self.mode).await,
            None => library.all_artists(user).await,
        }
    }

    pub async fn albums(&self, library: &dyn LibraryStore, user: &str) -> Result<Vec<Album>> {
        match self.filter {
            Some(name) => library.albums_by_name(name, user, self.mode).await,
            None => library.all_albums(user).await,
        }
    }

    /// Paging applies only to the unfiltered listing.
    pub async fn songs(&self, library: &dyn LibraryStore, user: &str) -> Result<Vec<Track>> {
        match self.filter {
            Some(name) => library.tracks_by_name(name, user, self.mode).await,
            None => library.all_tracks(user, self.page).await,
        }
    }
}

/// Library-wide substring search over track, artist and album names.
/// No text matches every track.
pub async fn search_songs(
    library: &dyn LibraryStore,
    user: &str,
    text: Option<&str>,
) -> Result<Vec<Track>> {
    match text {
        Some(text) => library.tracks_by_name_recursive(text, user).await,
        None => library.all_tracks(user, Page::default()).await,
    }
}
