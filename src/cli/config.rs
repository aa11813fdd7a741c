//! Configuration file structure
//!
//! JSON, every field defaulted. Database connection fields may be
//! overridden from the environment (`DB_HOST`, `DB_NAME`, `DB_USER`,
//! `DB_PASSWORD`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::auth::crypto::is_password_hash;
use crate::auth::SessionConfig;
use crate::catalog::PgSettings;
use crate::http_server::HttpServerConfig;

/// Longest accepted session lifetime (one year)
const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

const REDACTED: &str = "********";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub media: MediaConfig,
}

/// Catalog database connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database host; absent means no database is configured
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default = "default_db_name")]
    pub name: String,

    #[serde(default = "default_db_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// How administrator credentials are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifierKind {
    /// Connect to the catalog database as the supplied role
    #[default]
    Database,
    /// Compare against `admin_login` / `admin_password_hash`
    Static,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    #[serde(default)]
    pub verifier: VerifierKind,

    #[serde(default)]
    pub admin_login: Option<String>,

    /// Argon2id PHC string, see `storefront hash-password`
    #[serde(default)]
    pub admin_password_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

fn default_db_name() -> String {
    "storefront".to_string()
}
fn default_db_user() -> String {
    "postgres".to_string()
}
fn default_max_connections() -> u32 {
    5
}
fn default_session_ttl_secs() -> u64 {
    86400
} // 24h
fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_max_upload_bytes() -> u64 {
    20 * 1024 * 1024
} // 20MiB

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            name: default_db_name(),
            user: default_db_user(),
            password: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl_secs(),
            verifier: VerifierKind::default(),
            admin_login: None,
            admin_password_hash: None,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }

    /// File (or defaults), then process environment, then validation
    pub fn resolve(path: Option<&Path>) -> CliResult<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `DB_*` overrides; empty values are ignored
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = var("DB_HOST") {
            self.database.host = Some(host);
        }
        if let Some(name) = var("DB_NAME") {
            self.database.name = name;
        }
        if let Some(user) = var("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            self.database.password = password;
        }
    }

    /// Validate field ranges and verifier requirements
    pub fn validate(&self) -> CliResult<()> {
        if self.auth.session_ttl_secs == 0 || self.auth.session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(CliError::config_error(format!(
                "auth.session_ttl_secs must be between 1 and {}",
                MAX_SESSION_TTL_SECS
            )));
        }

        if self.database.max_connections == 0 {
            return Err(CliError::config_error("database.max_connections must be > 0"));
        }

        if self.media.max_upload_bytes == 0 {
            return Err(CliError::config_error("media.max_upload_bytes must be > 0"));
        }

        if self.server.public_base_url.trim().is_empty() {
            return Err(CliError::config_error("server.public_base_url must not be empty"));
        }

        if self.auth.verifier == VerifierKind::Static {
            let login_ok = self
                .auth
                .admin_login
                .as_deref()
                .is_some_and(|l| !l.trim().is_empty());
            if !login_ok {
                return Err(CliError::config_error(
                    "auth.admin_login is required for the static verifier",
                ));
            }
            let hash_ok = self
                .auth
                .admin_password_hash
                .as_deref()
                .is_some_and(is_password_hash);
            if !hash_ok {
                return Err(CliError::config_error(
                    "auth.admin_password_hash must be an Argon2 PHC string",
                ));
            }
        }

        Ok(())
    }

    /// Connection settings, if a database host is configured
    pub fn pg_settings(&self) -> Option<PgSettings> {
        let host = self.database.host.as_ref()?;
        Some(PgSettings {
            host: host.clone(),
            port: self.database.port,
            database: self.database.name.clone(),
            user: self.database.user.clone(),
            password: self.database.password.clone(),
            max_connections: self.database.max_connections,
        })
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            ttl: Duration::from_secs(self.auth.session_ttl_secs),
        }
    }

    /// Copy safe to print
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.database.password.is_empty() {
            copy.database.password = REDACTED.to_string();
        }
        if copy.auth.admin_password_hash.is_some() {
            copy.auth.admin_password_hash = Some(REDACTED.to_string());
        }
        copy
    }
}
