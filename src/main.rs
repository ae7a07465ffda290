//! Ampache Gateway - an Ampache-compatible XML API over a per-user music library.
//!
//! Ampache clients log in with a time-windowed handshake, then browse
//! artists, albums and songs and stream files. Every library query is
//! scoped to the authenticated user. Run `ampache-gateway --help` for the
//! available commands.

pub mod ampache;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod library;
pub mod model;
pub mod server;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(log_filter(EnvFilter::from_default_env())?)
        .init();

    cli::run_command(&args)
}

/// Info level for the crate's modules and for the `ampache::*` protocol targets.
fn log_filter(base: EnvFilter) -> anyhow::Result<EnvFilter> {
    Ok(base
        .add_directive("ampache_gateway=info".parse()?)
        .add_directive("ampache=info".parse()?))
}
