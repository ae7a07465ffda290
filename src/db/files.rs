//! File id to on-disk location lookup.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::SqliteStore;
use crate::error::Result;
use crate::library::{FileHandle, FileStorage};

#[async_trait]
impl FileStorage for SqliteStore {
    async fn handles(&self, file_id: i64) -> Result<Vec<FileHandle>> {
        let rows: Vec<(String, Option<String>, Option<i64>)> =
            sqlx::query_as("SELECT path, mimetype, size FROM files WHERE file_id = ? ORDER BY rowid")
                .bind(file_id)
                .fetch_all(self.pool())
                .await?;

        let mut handles = Vec::with_capacity(rows.len());
        for (path, mimetype, size) in rows {
            let path = PathBuf::from(path);
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                debug!(target: "ampache::media", file_id, path = %path.display(), "Recorded file is missing on disk");
                continue;
            }
            let mime_type = mimetype
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| mime_guess::from_path(&path).first_or_octet_stream().to_string());
            handles.push(FileHandle {
                path,
                mime_type,
                size: size.and_then(|s| u64::try_from(s).ok()),
            });
        }
        Ok(handles)
    }
}
