//! Session validation, extension and cleanup.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::token::{epoch_secs, hash_token};
use super::{AuthSettings, SessionStore};
use crate::error::{Error, Result};
use crate::model::UserId;

/// Backs every action except `handshake`.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    settings: AuthSettings,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, settings: AuthSettings) -> Self {
        Self { store, settings }
    }

    /// Resolve a bearer token to its user.
    pub async fn validate(&self, token: Option<&str>) -> Result<UserId> {
        self.validate_at(token, epoch_secs()).await
    }

    /// Validate as if the clock read `now`. A session is valid while `now <= expiry`.
    pub async fn validate_at(&self, token: Option<&str>, now: i64) -> Result<UserId> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Err(Error::authentication("Invalid Login - missing session token"));
        };

        match self.store.find_session(&hash_token(token)).await? {
            Some(session) if now <= session.expiry => Ok(session.user_id),
            Some(session) => {
                debug!(target: "ampache::session", user = %session.user_id, "Expired session presented");
                Err(Error::authentication("Invalid Login - session expired"))
            }
            None => Err(Error::authentication("Invalid Login - unknown session")),
        }
    }

    /// Push a session's expiry to `now + session_window` ("ping").
    ///
    /// Best effort: an empty, unknown or expired token, or a store failure,
    /// yields `false` and never an error.
    pub async fn extend(&self, token: Option<&str>) -> bool {
        self.extend_at(token, epoch_secs()).await
    }

    pub async fn extend_at(&self, token: Option<&str>, now: i64) -> bool {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return false;
        };

        let expiry = now + self.settings.session_window;
        match self.store.extend_session(&hash_token(token), expiry, now).await {
            Ok(extended) => extended,
            Err(e) => {
                warn!(target: "ampache::session", error = %e, "Failed to extend session");
                false
            }
        }
    }

    /// Delete every session that has expired.
    pub async fn cleanup(&self) -> Result<u64> {
        self.cleanup_at(epoch_secs()).await
    }

    pub async fn cleanup_at(&self, now: i64) -> Result<u64> {
        let removed = self.store.delete_expired_sessions(now).await?;
        if removed > 0 {
            info!(target: "ampache::session", removed, "Expired sessions removed");
        }
        Ok(removed)
    }
}
