//! Persisted sessions, keyed by token hash.

use async_trait::async_trait;

use super::SqliteStore;
use crate::auth::{Session, SessionStore};
use crate::error::Result;

#[async_trait]
impl SessionStore for SqliteStore {
    async fn insert_session(&self, user_id: &str, token_hash: &str, expiry: i64) -> Result<()> {
        sqlx::query("INSERT INTO ampache_sessions (user_id, token_hash, expiry) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(token_hash)
            .bind(expiry)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT user_id, expiry FROM ampache_sessions WHERE token_hash = ?")
                .bind(token_hash)
                .fetch_optional(self.pool())
                .await?;
        Ok(row.map(|(user_id, expiry)| Session { user_id, expiry }))
    }

    async fn extend_session(&self, token_hash: &str, expiry: i64, now: i64) -> Result<bool> {
        let done = sqlx::query(
            "UPDATE ampache_sessions SET expiry = ? WHERE token_hash = ? AND expiry >= ?",
        )
        .bind(expiry)
        .bind(token_hash)
        .bind(now)
        .execute(self.pool())
        .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn delete_expired_sessions(&self, now: i64) -> Result<u64> {
        let done = sqlx::query("DELETE FROM ampache_sessions WHERE expiry < ?")
            .bind(now)
            .execute(self.pool())
            .await?;
        Ok(done.rows_affected())
    }
}
