//! Core data models for the music library.
//!
//! Defines the primary entities: [`Artist`], [`Album`], and [`Track`].
//! These are derived from SQLx for database mapping. Every entity carries
//! its owning `user_id`; the gateway only ever reads them.
//!
//! # Database Schema
//!
//! The models map to the following tables:
//! - `artists` - Artist records per user
//! - `albums` - Albums with an album-artist reference and optional cover file
//! - `tracks` - Individual audio files referencing artist, album and file

use sqlx::FromRow;

/// Owner of library entities and sessions.
pub type UserId = String;

/// An artist in the music library.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Artist {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Owning user
    pub user_id: UserId,
    /// Artist name
    pub name: String,
}

/// An album in the music library.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Album {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Owning user
    pub user_id: UserId,
    /// Album title
    pub name: String,
    /// Release year (optional)
    pub year: Option<i64>,
    /// Artist credited for the whole album
    pub album_artist_id: i64,
    /// File holding the cover image, if one was found
    pub cover_file_id: Option<i64>,
}

/// A track (audio file) in the music library.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Track {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Owning user
    pub user_id: UserId,
    /// Track title
    pub title: String,
    /// Track number on album
    pub number: Option<i64>,
    /// Duration in seconds
    pub length: Option<i64>,
    /// Performing artist
    pub artist_id: i64,
    /// Album the track belongs to
    pub album_id: i64,
    /// Opaque id resolved by file storage
    pub file_id: i64,
}

/// A stored Ampache passphrase (the hash never leaves the store).
#[derive(Debug, Clone, FromRow)]
pub struct ApiKey {
    /// Database ID
    pub id: i64,
    /// Owning user
    pub user_id: UserId,
    /// Free-form label ("phone", "car", ...)
    pub description: Option<String>,
}
