//! The fixed set of protocol actions.

use std::fmt;

use crate::error::{Error, Result};

/// One `action` the endpoint understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Handshake,
    Ping,
    Artists,
    ArtistAlbums,
    ArtistSongs,
    Albums,
    AlbumSongs,
    Songs,
    Song,
    SearchSongs,
    Play,
    /// Album cover bytes; not part of the Ampache protocol
    GetCover,
}

/// Wire name of every action.
const ACTIONS: &[(&str, Action)] = &[
    ("handshake", Action::Handshake),
    ("ping", Action::Ping),
    ("artists", Action::Artists),
    ("artist_albums", Action::ArtistAlbums),
    ("artist_songs", Action::ArtistSongs),
    ("albums", Action::Albums),
    ("album_songs", Action::AlbumSongs),
    ("songs", Action::Songs),
    ("song", Action::Song),
    ("search_songs", Action::SearchSongs),
    ("play", Action::Play),
    ("_get_cover", Action::GetCover),
];

impl Action {
    /// Look up an action by its wire name.
    pub fn from_name(name: &str) -> Result<Self> {
        ACTIONS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, action)| *action)
            .ok_or_else(|| Error::method_not_supported("Action not supported"))
    }

    pub fn name(self) -> &'static str {
        ACTIONS
            .iter()
            .find(|(_, a)| *a == self)
            .map(|(n, _)| *n)
            .unwrap_or("unknown")
    }

    /// Everything but `handshake` and `ping` needs a valid session first.
    pub fn requires_session(self) -> bool {
        !matches!(self, Action::Handshake | Action::Ping)
    }

    /// Media actions answer with raw bytes or a bare 404.
    pub fn is_media(self) -> bool {
        matches!(self, Action::Play | Action::GetCover)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
