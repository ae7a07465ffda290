//! Ampache authentication: handshake login and session lifecycle.
//!
//! Provides:
//! - [`Authenticator`]: validates a time-windowed handshake against every
//!   passphrase hash on file for the user and issues a session
//! - [`SessionManager`]: validates, extends ("ping") and sweeps sessions
//! - Store seams ([`CredentialStore`], [`SessionStore`]) implemented by
//!   [`crate::db::SqliteStore`] and by in-memory mocks in tests
//!
//! ## Design Decisions
//! - Session tokens are 256-bit CSPRNG values, hex encoded. Only their
//!   SHA-256 is handed to the session store.
//! - Expiry is evaluated lazily on validation; the sweep is housekeeping.
//! - Every operation has an `*_at(now)` form so the clock can be pinned in tests.

mod handshake;
mod session;
pub mod token;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::UserId;

pub use handshake::{Authenticator, IssuedSession, Verified};
pub use session::SessionManager;

/// Time-window settings shared by handshake and session validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSettings {
    /// Session lifetime and maximum handshake timestamp age, in seconds
    pub session_window: i64,
    /// Tolerated client clock lead, in seconds
    pub clock_skew: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_window: 6000,
            clock_skew: 100,
        }
    }
}

/// A stored session, looked up by token hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    /// Unix seconds; the session is valid while `now <= expiry`
    pub expiry: i64,
}

/// Read access to per-user passphrase hashes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// All passphrase hashes on file for the user (possibly none).
    async fn password_hashes(&self, user_id: &str) -> Result<Vec<String>>;
}

/// Persistence for issued sessions, keyed by token hash.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, user_id: &str, token_hash: &str, expiry: i64) -> Result<()>;

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>>;

    /// Move the expiry of a still-valid session. Returns false when no
    /// session with `expiry >= now` matched.
    async fn extend_session(&self, token_hash: &str, expiry: i64, now: i64) -> Result<bool>;

    /// Delete sessions with `expiry < now`, returning how many went.
    async fn delete_expired_sessions(&self, now: i64) -> Result<u64>;
}
