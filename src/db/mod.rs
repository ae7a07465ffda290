//! SQLite-backed stores for credentials, sessions, library and files.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! [`SqliteStore`] implements every store seam the gateway consumes:
//! - [`crate::auth::CredentialStore`] and [`crate::auth::SessionStore`]
//! - [`crate::library::LibraryStore`] (all queries scoped by user)
//! - [`crate::library::FileStorage`]
//!
//! # Example
//!
//! ```ignore
//! use ampache_gateway::db::SqliteStore;
//!
//! let store = SqliteStore::open(Path::new("library.db")).await?;
//! let artists = store.all_artists("alice").await?;
//! ```

mod credentials;
mod files;
mod library;
mod sessions;

use std::path::Path;

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub use credentials::{add_api_key, list_api_keys, remove_api_key};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "ampache_gateway.db";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
///
/// # Errors
///
/// Returns an error if:
/// - Database creation fails
/// - Connection cannot be established
/// - Migration fails
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// All gateway stores over one connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an initialized pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database at `path`, creating parent directories.
    pub async fn open(path: &Path) -> crate::error::Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let pool = init_db(&db_url(Some(path))).await?;
        tracing::info!(target: "ampache::db", path = %path.display(), "Database ready");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// `%text%` for `LIKE ... ESCAPE '\'`, with wildcards in `text` taken literally.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
