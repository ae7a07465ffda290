//! Application-wide error types.
//!
//! Gateway modules return [`Error`] through the crate [`Result`] alias,
//! while CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - Protocol failures ([`Error::Authentication`], [`Error::MethodNotSupported`],
//!   [`Error::NotFound`]) carry the message shown to the client and map to
//!   the Ampache error codes 401, 405 and 404 via [`Error::code`].
//! - Infrastructure failures (database, I/O, XML) map to 500.
//!
//! # Example
//!
//! ```ignore
//! use ampache_gateway::error::{Error, Result};
//!
//! fn find(id: i64) -> Result<Track> {
//!     store.find_track(id, user)?.ok_or_else(|| Error::not_found("track"))
//! }
//! ```

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad or stale handshake, hash mismatch, unknown or expired session
    #[error("{0}")]
    Authentication(String),

    /// Unknown `action` parameter
    #[error("{0}")]
    MethodNotSupported(String),

    /// Entity absent, dangling reference, or unresolvable file
    #[error("{0}")]
    NotFound(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Response serialization error
    #[error("XML error: {0}")]
    Xml(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create an unsupported-action error.
    pub fn method_not_supported(message: impl Into<String>) -> Self {
        Self::MethodNotSupported(message.into())
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an XML serialization error.
    pub fn xml(message: impl ToString) -> Self {
        Self::Xml(message.to_string())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Ampache error code (doubles as the HTTP status).
    pub fn code(&self) -> u16 {
        match self {
            Error::Authentication(_) => 401,
            Error::MethodNotSupported(_) => 405,
            Error::NotFound(_) => 404,
            Error::WithContext { source, .. } => source.code(),
            _ => 500,
        }
    }

    /// True for the not-found family, looking through context wrappers.
    pub fn is_not_found(&self) -> bool {
        self.code() == 404
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}
