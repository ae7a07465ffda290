//! Handshake login.
//!
//! A client proves knowledge of a passphrase hash by sending
//! `sha256(timestamp ‖ hash)` together with the timestamp. The timestamp
//! must fall inside `[now - session_window, now + clock_skew]`, which bounds
//! how long a captured handshake can be replayed.

use std::sync::Arc;

use tracing::{info, warn};

use super::token::{constant_time_eq, epoch_secs, generate_token, handshake_token, hash_token};
use super::{AuthSettings, CredentialStore, SessionStore};
use crate::error::{Error, Result};
use crate::model::UserId;

/// A freshly issued session. `token` is the only copy of the plaintext.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user_id: UserId,
    pub issued_at: i64,
    pub expiry: i64,
}

/// Validates handshakes and issues sessions.
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    settings: AuthSettings,
}

impl Authenticator {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            credentials,
            sessions,
            settings,
        }
    }

    /// Check a handshake against the current clock.
    pub async fn verify(&self, user: &str, timestamp: &str, auth: &str) -> Result<Verified<'_>> {
        self.verify_at(user, timestamp, auth, epoch_secs()).await
    }

    /// Check a handshake as if the server clock read `now`.
    ///
    /// Nothing is written; the session is only stored by [`Verified::issue`].
    pub async fn verify_at(
        &self,
        user: &str,
        timestamp: &str,
        auth: &str,
        now: i64,
    ) -> Result<Verified<'_>> {
        let provided: i64 = timestamp.trim().parse().unwrap_or(0);

        if provided == 0 {
            warn!(target: "ampache::auth", user = %user, "Handshake with unparseable timestamp");
            return Err(Error::authentication("Invalid Login - cannot parse time"));
        }
        if provided < now - self.settings.session_window {
            warn!(target: "ampache::auth", user = %user, age = now - provided, "Handshake timestamp too old");
            return Err(Error::authentication("Invalid Login - session is outdated"));
        }
        if provided > now + self.settings.clock_skew {
            warn!(target: "ampache::auth", user = %user, lead = provided - now, "Handshake timestamp in the future");
            return Err(Error::authentication("Invalid Login - timestamp is in future"));
        }

        let supplied = auth.trim().to_ascii_lowercase();
        let hashes = self.credentials.password_hashes(user).await?;
        let matched = hashes.iter().any(|stored| {
            constant_time_eq(handshake_token(timestamp, stored).as_bytes(), supplied.as_bytes())
        });

        if !matched {
            warn!(target: "ampache::auth", user = %user, candidates = hashes.len(), "Handshake passphrase mismatch");
            return Err(Error::authentication(
                "Invalid Login - passphrase does not match",
            ));
        }

        Ok(Verified {
            authenticator: self,
            user: user.to_string(),
            now,
        })
    }
}

/// A handshake that passed every check. No session exists until it is issued.
pub struct Verified<'a> {
    authenticator: &'a Authenticator,
    user: UserId,
    now: i64,
}

impl Verified<'_> {
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Store a new session for the verified user.
    pub async fn issue(self) -> Result<IssuedSession> {
        let token = generate_token();
        let expiry = self.now + self.authenticator.settings.session_window;
        self.authenticator
            .sessions
            .insert_session(&self.user, &hash_token(&token), expiry)
            .await?;

        info!(target: "ampache::auth", user = %self.user, expiry, "Session issued");

        Ok(IssuedSession {
            token,
            user_id: self.user,
            issued_at: self.now,
            expiry,
        })
    }
}
