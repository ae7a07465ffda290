//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `serve`: run the Ampache HTTP endpoint
//! - `keys`: manage per-user Ampache passphrases
//! - `sessions`: session housekeeping and library stats

mod keys;
mod serve;
mod sessions;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::db::SqliteStore;
use crate::error::ResultExt;

pub use keys::{cmd_keys_add, cmd_keys_list, cmd_keys_remove};
pub use serve::cmd_serve;
pub use sessions::{cmd_init_config, cmd_sessions_cleanup, cmd_stats};

/// Ampache Gateway CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/ampache-gateway/config.toml)
    #[arg(long, global = true, env = "AMPACHE_GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database path, overriding the config file
    #[arg(long, global = true, env = "AMPACHE_GATEWAY_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Serve the Ampache XML API
    Serve {
        /// Bind address, overriding the config file
        #[arg(long)]
        host: Option<String>,
        /// Port, overriding the config file
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Manage Ampache API passphrases
    Keys {
        #[command(subcommand)]
        action: KeysCommand,
    },
    /// Session maintenance
    Sessions {
        #[command(subcommand)]
        action: SessionsCommand,
    },
    /// Show library counts for a user
    Stats {
        /// Library owner
        #[arg(short, long)]
        user: String,
    },
    /// Write a config file with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum KeysCommand {
    /// Register a passphrase (generated when not given)
    Add {
        #[arg(short, long)]
        user: String,
        /// Label, e.g. the client or device it is for
        #[arg(short, long)]
        description: Option<String>,
        /// Passphrase to register instead of a generated one
        #[arg(long, env = "AMPACHE_GATEWAY_PASSWORD")]
        password: Option<String>,
    },
    /// List a user's passphrases (ids and labels only)
    List {
        #[arg(short, long)]
        user: String,
    },
    /// Remove one of a user's passphrases
    Remove {
        #[arg(short, long)]
        user: String,
        /// Key id as shown by `keys list`
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum SessionsCommand {
    /// Delete every expired session now
    Cleanup,
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = config::load(cli.config.as_deref());
    let rt = Runtime::new()?;

    match &cli.command {
        Commands::Serve { host, port } => {
            cmd_serve(&rt, &config, cli.db.as_deref(), host.as_deref(), *port)
        }
        Commands::Keys { action } => match action {
            KeysCommand::Add {
                user,
                description,
                password,
            } => cmd_keys_add(
                &rt,
                &config,
                cli.db.as_deref(),
                user,
                description.as_deref(),
                password.as_deref(),
            ),
            KeysCommand::List { user } => cmd_keys_list(&rt, &config, cli.db.as_deref(), user),
            KeysCommand::Remove { user, id } => {
                cmd_keys_remove(&rt, &config, cli.db.as_deref(), user, *id)
            }
        },
        Commands::Sessions {
            action: SessionsCommand::Cleanup,
        } => cmd_sessions_cleanup(&rt, &config, cli.db.as_deref()),
        Commands::Stats { user } => cmd_stats(&rt, &config, cli.db.as_deref(), user),
        Commands::InitConfig { force } => cmd_init_config(cli.config.as_deref(), *force),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// `--db` if given, else the configured (or default) path.
pub(crate) fn database_path(config: &Config, db: Option<&Path>) -> PathBuf {
    db.map(Path::to_path_buf)
        .unwrap_or_else(|| config.database.resolved_path())
}

/// Open the store the command operates on.
pub(crate) async fn open_store(config: &Config, db: Option<&Path>) -> anyhow::Result<SqliteStore> {
    let path = database_path(config, db);
    let store = SqliteStore::open(&path)
        .await
        .with_context(format!("opening database {}", path.display()))?;
    Ok(store)
}
