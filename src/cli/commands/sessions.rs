//! Session housekeeping, library stats and config bootstrap.

use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::auth::SessionManager;
use crate::config::{self, Config};
use crate::library::LibraryStore;

use super::open_store;

/// Delete expired sessions once.
pub fn cmd_sessions_cleanup(
    rt: &Runtime,
    config: &Config,
    db_path: Option<&Path>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let store = open_store(config, db_path).await?;
        let sessions = SessionManager::new(Arc::new(store), (&config.auth).into());
        let removed = sessions.cleanup().await?;
        println!("Removed {} expired session(s)", removed);
        Ok(())
    })
}

/// Print the counts a handshake would report for `user`.
pub fn cmd_stats(
    rt: &Runtime,
    config: &Config,
    db_path: Option<&Path>,
    user: &str,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let store = open_store(config, db_path).await?;
        let (songs, artists, albums) = futures::try_join!(
            store.count_tracks(user),
            store.count_artists(user),
            store.count_albums(user),
        )?;

        println!("Library of {}", user);
        println!("===================");
        println!("Artists: {}", artists);
        println!("Albums:  {}", albums);
        println!("Songs:   {}", songs);
        Ok(())
    })
}

/// Write the default configuration, refusing to clobber an existing file.
pub fn cmd_init_config(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let target = match path {
        Some(p) => p.to_path_buf(),
        None => config::config_path()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?,
    };
    if target.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", target.display());
    }

    let written = config::save(&Config::default(), Some(&target))?;
    println!("Wrote {}", written.display());
    Ok(())
}
