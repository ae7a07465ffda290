//! Passphrase management commands.

use std::path::Path;
use tokio::runtime::Runtime;
use tracing::info;

use crate::auth::token;
use crate::config::Config;
use crate::db;

use super::open_store;

/// Register a passphrase for `user`, generating one when none is given.
///
/// Only the hash is stored, so a generated passphrase is printed once here.
pub fn cmd_keys_add(
    rt: &Runtime,
    config: &Config,
    db_path: Option<&Path>,
    user: &str,
    description: Option<&str>,
    password: Option<&str>,
) -> anyhow::Result<()> {
    if user.trim().is_empty() {
        anyhow::bail!("user must not be empty");
    }
    let (passphrase, generated) = match password {
        Some(p) if !p.is_empty() => (p.to_string(), false),
        Some(_) => anyhow::bail!("passphrase must not be empty"),
        None => (token::generate_passphrase(), true),
    };

    rt.block_on(async {
        let store = open_store(config, db_path).await?;
        let id = db::add_api_key(&store, user, &token::passphrase_hash(&passphrase), description)
            .await?;
        info!(target: "ampache::keys", user, id, "API key added");

        println!("Added key {} for {}", id, user);
        if generated {
            println!("Passphrase: {}", passphrase);
            println!("Store it now; it cannot be shown again.");
        }
        Ok(())
    })
}

/// Print a user's keys. Hashes are never shown.
pub fn cmd_keys_list(
    rt: &Runtime,
    config: &Config,
    db_path: Option<&Path>,
    user: &str,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let store = open_store(config, db_path).await?;
        let keys = db::list_api_keys(&store, user).await?;

        if keys.is_empty() {
            println!("No keys for {}", user);
            return Ok(());
        }
        println!("Keys for {}", user);
        for key in keys {
            println!("  {:>4}  {}", key.id, key.description.as_deref().unwrap_or("-"));
        }
        Ok(())
    })
}

pub fn cmd_keys_remove(
    rt: &Runtime,
    config: &Config,
    db_path: Option<&Path>,
    user: &str,
    id: i64,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let store = open_store(config, db_path).await?;
        if !db::remove_api_key(&store, user, id).await? {
            anyhow::bail!("no key {} for {}", id, user);
        }
        info!(target: "ampache::keys", user, id, "API key removed");
        println!("Removed key {} for {}", id, user);
        Ok(())
    })
}
