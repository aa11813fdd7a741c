//! CLI module for the storefront server
//!
//! Provides command-line interface for:
//! - serve: Run the HTTP API
//! - check-config: Validate and print configuration
//! - hash-password: Produce an admin password hash

mod args;
mod commands;
mod config;
mod errors;

pub use args::{Cli, Command};
pub use commands::{build_state, check_config, hash_password, run, run_command, serve};
pub use config::{AuthConfig, Config, DatabaseConfig, MediaConfig, VerifierKind};
pub use errors::{CliError, CliErrorCode, CliResult};
