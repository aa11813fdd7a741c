//! CLI argument definitions using clap
//!
//! Commands:
//! - storefront serve [--config <path>] [--port <port>] [--in-memory]
//! - storefront check-config [--config <path>]
//! - storefront hash-password <password>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Storefront catalog and admin API server
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API until interrupted
    Serve {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,

        /// Keep the catalog in process memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },

    /// Load and validate configuration, then print it with secrets redacted
    CheckConfig {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print an Argon2id hash for the static credential verifier
    HashPassword {
        /// Password to hash
        password: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
