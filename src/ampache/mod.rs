//! Ampache XML API: action dispatch over the library and session stores.
//!
//! A request names one [`Action`]. `handshake` and `ping` run without a
//! session; every other action first resolves the `auth` token to a user
//! and passes that user explicitly to its handler, which queries the
//! library, enriches the results, and renders an XML document (or, for
//! `play` and `_get_cover`, a file handle to stream).
//!
//! ## Components
//! - [`params`]: typed access to request parameters
//! - [`query`]: filter/exact/paging policy for list actions
//! - [`enrich`]: parent resolution and aggregate counts
//! - [`media`]: track and cover file resolution
//! - [`xml`]: response documents

mod action;
mod enrich;
mod handlers;
mod media;
mod params;
mod query;
pub mod xml;

use std::sync::Arc;

use tracing::debug;

use crate::auth::{AuthSettings, Authenticator, CredentialStore, SessionManager, SessionStore};
use crate::db::SqliteStore;
use crate::error::Result;
use crate::library::{FileHandle, FileStorage, LibraryStore};
use crate::model::UserId;

pub use action::Action;
pub use params::Params;

use handlers::Call;
use xml::LinkBuilder;

/// What a successful action produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// XML document body
    Xml(String),
    /// File to stream as-is
    File(FileHandle),
}

/// One protocol request.
#[derive(Debug, Clone)]
pub struct Request {
    pub params: Params,
    /// Server origin used to build `<url>` and `<art>` links
    pub base_url: String,
}

/// The protocol gateway over its store seams.
#[derive(Clone)]
pub struct Gateway {
    authenticator: Authenticator,
    sessions: SessionManager,
    library: Arc<dyn LibraryStore>,
    files: Arc<dyn FileStorage>,
}

impl Gateway {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        library: Arc<dyn LibraryStore>,
        files: Arc<dyn FileStorage>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            authenticator: Authenticator::new(credentials, sessions.clone(), settings),
            sessions: SessionManager::new(sessions, settings),
            library,
            files,
        }
    }

    /// Gateway whose every seam is the one SQLite store.
    pub fn from_store(store: SqliteStore, settings: AuthSettings) -> Self {
        let store = Arc::new(store);
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            settings,
        )
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Run `action`, validating the session first where required.
    pub async fn dispatch(&self, action: Action, request: &Request) -> Result<Reply> {
        let params = &request.params;
        debug!(target: "ampache::dispatch", action = %action, session = action.requires_session(), "Dispatching");

        match action {
            Action::Handshake => {
                handlers::handshake(&self.authenticator, self.library.as_ref(), params).await
            }
            Action::Ping => handlers::ping(&self.sessions, params).await,
            Action::Artists => {
                handlers::artists(&self.call(&self.authorize(request).await?, request)).await
            }
            Action::ArtistAlbums => {
                handlers::artist_albums(&self.call(&self.authorize(request).await?, request)).await
            }
            Action::ArtistSongs => {
                handlers::artist_songs(&self.call(&self.authorize(request).await?, request)).await
            }
            Action::Albums => {
                handlers::albums(&self.call(&self.authorize(request).await?, request)).await
            }
            Action::AlbumSongs => {
                handlers::album_songs(&self.call(&self.authorize(request).await?, request)).await
            }
            Action::Songs => {
                handlers::songs(&self.call(&self.authorize(request).await?, request)).await
            }
            Action::Song => {
                handlers::song(&self.call(&self.authorize(request).await?, request)).await
            }
            Action::SearchSongs => {
                handlers::search_songs(&self.call(&self.authorize(request).await?, request)).await
            }
            Action::Play => {
                handlers::play(&self.call(&self.authorize(request).await?, request)).await
            }
            Action::GetCover => {
                handlers::get_cover(&self.call(&self.authorize(request).await?, request)).await
            }
        }
    }

    /// Resolve the request's `auth` token to its user.
    async fn authorize(&self, request: &Request) -> Result<UserId> {
        let user = self.sessions.validate(request.params.auth()).await?;
        debug!(target: "ampache::dispatch", user = %user, "Session valid");
        Ok(user)
    }

    fn call<'a>(&'a self, user: &'a str, request: &'a Request) -> Call<'a> {
        Call {
            library: self.library.as_ref(),
            files: self.files.as_ref(),
            user,
            params: &request.params,
            links: LinkBuilder::new(&request.base_url, request.params.auth().unwrap_or_default()),
        }
    }
}
