//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\ampache-gateway\config.toml
//! - macOS: ~/Library/Application Support/ampache-gateway/config.toml
//! - Linux: ~/.config/ampache-gateway/config.toml
//!
//! The file is human-readable and editable. It is read once at startup;
//! command-line flags override individual values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::auth::AuthSettings;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Library database settings
    pub database: DatabaseConfig,

    /// Handshake and session settings
    pub auth: AuthConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Base URL used when building `<url>`/`<art>` links (e.g. behind a proxy).
    /// When unset, links are built from the request's Host header.
    pub public_url: Option<String>,

    /// Upper bound for producing a response (not for streaming its body)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
            public_url: None,
            request_timeout_secs: 30,
        }
    }
}

/// Library database settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file (empty = `<data dir>/ampache-gateway/library.db`)
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Resolve the database file, falling back to the OS data directory.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("ampache-gateway").join("library.db")))
            .unwrap_or_else(|| PathBuf::from(crate::db::DEFAULT_DB_NAME))
    }
}

/// Handshake and session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Session lifetime, also the maximum age of a handshake timestamp
    pub session_window_secs: i64,

    /// How far a handshake timestamp may run ahead of the server clock
    pub clock_skew_secs: i64,

    /// Interval of the expired-session sweep (0 = disabled)
    pub session_cleanup_interval_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_window_secs: 6000,
            clock_skew_secs: 100,
            session_cleanup_interval_secs: 3600,
        }
    }
}

impl From<&AuthConfig> for AuthSettings {
    fn from(config: &AuthConfig) -> Self {
        AuthSettings {
            session_window: config.session_window_secs,
            clock_skew: config.clock_skew_secs,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ampache-gateway"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Uses `path` when given, otherwise the OS-standard location.
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load(path: Option<&Path>) -> Config {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                sanitize(config)
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Replace values the server cannot run with by their defaults.
fn sanitize(mut config: Config) -> Config {
    let defaults = Config::default();

    if config.auth.session_window_secs <= 0 {
        tracing::warn!(
            "auth.session_window_secs = {} is not positive, using {}",
            config.auth.session_window_secs,
            defaults.auth.session_window_secs
        );
        config.auth.session_window_secs = defaults.auth.session_window_secs;
    }
    if config.auth.clock_skew_secs < 0 {
        tracing::warn!(
            "auth.clock_skew_secs = {} is negative, using 0",
            config.auth.clock_skew_secs
        );
        config.auth.clock_skew_secs = 0;
    }
    if config.server.request_timeout_secs == 0 {
        tracing::warn!(
            "server.request_timeout_secs = 0 would time out every request, using {}",
            defaults.server.request_timeout_secs
        );
        config.server.request_timeout_secs = defaults.server.request_timeout_secs;
    }
    config
}

/// Save configuration to disk
///
/// Writes to `path` when given, otherwise the OS-standard location.
/// Creates the parent directory if it doesn't exist.
pub fn save(config: &Config, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path().ok_or(ConfigError::NoConfigDir)?,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, &path)
        .map_err(|e| ConfigError::Rename(temp_path, path.clone(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(path)
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
