//! Ampache API passphrase hashes.

use async_trait::async_trait;

use super::SqliteStore;
use crate::auth::CredentialStore;
use crate::error::{Error, Result};
use crate::model::ApiKey;

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn password_hashes(&self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT hash FROM ampache_users WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(|(hash,)| hash).collect())
    }
}

/// Register a passphrase hash for `user_id`, returning the key's id.
pub async fn add_api_key(
    store: &SqliteStore,
    user_id: &str,
    hash: &str,
    description: Option<&str>,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO ampache_users (user_id, description, hash) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(description)
        .bind(hash)
        .execute(store.pool())
        .await;

    match result {
        Ok(done) => Ok(done.last_insert_rowid()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(Error::config("a key with this passphrase already exists"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Keys registered for `user_id`, oldest first. Hashes are never returned.
pub async fn list_api_keys(store: &SqliteStore, user_id: &str) -> Result<Vec<ApiKey>> {
    Ok(sqlx::query_as::<_, ApiKey>(
        "SELECT id, user_id, description FROM ampache_users WHERE user_id = ? ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(store.pool())
    .await?)
}

/// Remove one of `user_id`'s keys. Returns false when no such key exists.
pub async fn remove_api_key(store: &SqliteStore, user_id: &str, id: i64) -> Result<bool> {
    let done = sqlx::query("DELETE FROM ampache_users WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(store.pool())
        .await?;
    Ok(done.rows_affected() > 0)
}
