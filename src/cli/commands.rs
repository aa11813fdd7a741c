//! CLI command implementations
//!
//! `serve` builds the tokio runtime, constructs the session store once,
//! serves until Ctrl-C and tears the store down before returning.

use std::path::Path;
use std::sync::Arc;

use super::args::Command;
use super::config::{Config, VerifierKind};
use super::errors::{CliError, CliResult};
use crate::auth::crypto::hash_password as argon2_hash;
use crate::auth::{
    AuthService, CredentialVerifier, DatabaseRoleVerifier, SessionStore,
    StaticCredentialVerifier,
};
use crate::catalog::{CatalogService, CatalogStore, InMemoryCatalogStore, PgCatalogStore};
use crate::http_server::{AppState, HttpServer};
use crate::media::LocalImageStore;
use crate::observability::{log_event_with_fields, Event};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve {
            config,
            port,
            in_memory,
        } => serve(config.as_deref(), port, in_memory),
        Command::CheckConfig { config } => check_config(config.as_deref()),
        Command::HashPassword { password } => hash_password(&password),
    }
}

/// Serve the HTTP API until Ctrl-C
pub fn serve(config_path: Option<&Path>, port: Option<u16>, in_memory: bool) -> CliResult<()> {
    let mut config = Config::resolve(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }
    log_loaded(&config, in_memory);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let sessions = Arc::new(SessionStore::new(config.session_config()));
        let state = build_state(&config, in_memory, Arc::clone(&sessions))?;
        let server = HttpServer::new(config.server.clone(), state);

        let result = server
            .start(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)));

        let dropped = sessions.shutdown();
        log_event_with_fields(
            Event::ServerStop,
            &[("sessions_dropped", &dropped.to_string())],
        );
        result
    })
}

/// Load, validate and print the effective configuration
pub fn check_config(config_path: Option<&Path>) -> CliResult<()> {
    let config = Config::resolve(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);
    Ok(())
}

/// Print an Argon2id hash of `password`
pub fn hash_password(password: &str) -> CliResult<()> {
    if password.is_empty() {
        return Err(CliError::config_error("password must not be empty"));
    }
    println!("{}", argon2_hash(password)?);
    Ok(())
}

/// Construct the services the HTTP layer needs
///
/// Must run inside the tokio runtime: the PostgreSQL pool registers its
/// maintenance tasks on construction.
pub fn build_state(
    config: &Config,
    in_memory: bool,
    sessions: Arc<SessionStore>,
) -> CliResult<AppState> {
    let pg = config.pg_settings();

    let store: Arc<dyn CatalogStore> = if in_memory {
        Arc::new(InMemoryCatalogStore::new())
    } else {
        let settings = pg.clone().ok_or_else(|| {
            CliError::config_error("database.host (or DB_HOST) is required unless --in-memory")
        })?;
        Arc::new(PgCatalogStore::connect_lazy(&settings))
    };

    let verifier: Arc<dyn CredentialVerifier> = match config.auth.verifier {
        VerifierKind::Static => Arc::new(StaticCredentialVerifier::new(
            config.auth.admin_login.clone().unwrap_or_default(),
            config.auth.admin_password_hash.clone().unwrap_or_default(),
        )?),
        VerifierKind::Database => {
            let settings = pg.ok_or_else(|| {
                CliError::config_error(
                    "the database verifier needs database.host; use the static verifier with --in-memory",
                )
            })?;
            Arc::new(DatabaseRoleVerifier::new(settings))
        }
    };

    let images = LocalImageStore::new(
        config.media.uploads_dir.clone(),
        &config.server.public_base_url,
        config.media.max_upload_bytes,
    );

    Ok(AppState {
        catalog: CatalogService::new(store),
        auth: AuthService::new(sessions, verifier),
        images: Arc::new(images),
        uploads_dir: config.media.uploads_dir.clone(),
        max_upload_bytes: config.media.max_upload_bytes,
    })
}

fn log_loaded(config: &Config, in_memory: bool) {
    let backend = if in_memory { "memory" } else { "postgres" };
    let verifier = match config.auth.verifier {
        VerifierKind::Database => "database",
        VerifierKind::Static => "static",
    };
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("catalog", backend),
            ("port", &config.server.port.to_string()),
            ("verifier", verifier),
        ],
    );
}
