//! Track and cover file resolution for the binary actions.

use tracing::debug;

use crate::error::{Error, Result};
use crate::library::{FileHandle, FileStorage, LibraryStore};

/// The single readable file behind a track.
pub async fn resolve_track_file(
    library: &dyn LibraryStore,
    files: &dyn FileStorage,
    track_id: i64,
    user: &str,
) -> Result<FileHandle> {
    let track = library
        .find_track(track_id, user)
        .await?
        .ok_or_else(|| Error::not_found(format!("Track {track_id} not found")))?;
    single_handle(files, track.file_id).await
}

/// The single readable cover image of an album.
pub async fn resolve_album_cover_file(
    library: &dyn LibraryStore,
    files: &dyn FileStorage,
    album_id: i64,
    user: &str,
) -> Result<FileHandle> {
    let album = library
        .find_album(album_id, user)
        .await?
        .ok_or_else(|| Error::not_found(format!("Album {album_id} not found")))?;
    let file_id = album
        .cover_file_id
        .ok_or_else(|| Error::not_found(format!("Album {album_id} has no cover")))?;
    single_handle(files, file_id).await
}

/// Zero or several handles are both "not found".
async fn single_handle(files: &dyn FileStorage, file_id: i64) -> Result<FileHandle> {
    let mut handles = files.handles(file_id).await?;
    match handles.len() {
        1 => Ok(handles.remove(0)),
        n => {
            debug!(target: "ampache::media", file_id, handles = n, "File id does not resolve to exactly one file");
            Err(Error::not_found(format!("File {file_id} not found")))
        }
    }
}
