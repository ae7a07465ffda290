//! Command-line interface for ampache-gateway.
//!
//! This module provides the `serve` command plus the administrative
//! commands for passphrases, sessions and configuration.

mod commands;

pub use commands::{Cli, Commands, run_command};
