//! # Credential Verifiers
//!
//! Decide whether a login/secret pair names an administrator. Backend
//! failures are errors here; [`super::api::AuthService`] folds every failure
//! into one uniform rejection for the wire.

use async_trait::async_trait;
use sqlx::postgres::PgConnection;
use sqlx::Connection;

use super::crypto::{constant_time_str_eq, is_password_hash, verify_password};
use super::errors::{AuthError, AuthResult};
use crate::catalog::PgSettings;

/// Checks administrator credentials
#[async_trait]
pub trait CredentialVerifier: Send + Sync + std::fmt::Debug {
    /// `Ok(true)` on a match, `Ok(false)` on a mismatch, `Err` when the
    /// backend could not answer
    async fn verify(&self, login: &str, secret: &str) -> AuthResult<bool>;
}

/// Single administrator with an Argon2id password hash from configuration
#[derive(Debug, Clone)]
pub struct StaticCredentialVerifier {
    login: String,
    password_hash: String,
}

impl StaticCredentialVerifier {
    pub fn new(login: impl Into<String>, password_hash: impl Into<String>) -> AuthResult<Self> {
        let password_hash = password_hash.into();
        if !is_password_hash(&password_hash) {
            return Err(AuthError::StorageError(
                "admin password hash is not a PHC string".to_string(),
            ));
        }
        Ok(Self {
            login: login.into(),
            password_hash,
        })
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentialVerifier {
    async fn verify(&self, login: &str, secret: &str) -> AuthResult<bool> {
        // Hash check runs even on a login mismatch so timing does not reveal it
        let login_ok = constant_time_str_eq(login, &self.login);
        let secret_ok = verify_password(secret, &self.password_hash)?;
        Ok(login_ok && secret_ok)
    }
}

/// Treats the credentials as a database role: a successful connect and
/// ping as that role means the caller is an administrator
#[derive(Debug, Clone)]
pub struct DatabaseRoleVerifier {
    settings: PgSettings,
}

impl DatabaseRoleVerifier {
    pub fn new(settings: PgSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl CredentialVerifier for DatabaseRoleVerifier {
    async fn verify(&self, login: &str, secret: &str) -> AuthResult<bool> {
        if login.is_empty() {
            return Ok(false);
        }
        let options = self.settings.options_for(login, secret);
        let mut conn = PgConnection::connect_with(&options)
            .await
            .map_err(|e| AuthError::StorageError(e.to_string()))?;
        let pinged = conn.ping().await;
        let _ = conn.close().await;

        pinged
            .map(|_| true)
            .map_err(|e| AuthError::StorageError(e.to_string()))
    }
}
