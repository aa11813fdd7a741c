//! # Auth Service
//!
//! `authenticate` and `authorize` as consumed by the admin endpoints.

use std::sync::Arc;

use super::crypto::token_fingerprint;
use super::errors::{AuthError, AuthResult};
use super::session::{IssuedSession, SessionStore};
use super::verifier::CredentialVerifier;
use crate::observability::{log_event_with_fields, Event};

/// Auth service combining the session store and a credential verifier
#[derive(Debug, Clone)]
pub struct AuthService {
    sessions: Arc<SessionStore>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl AuthService {
    pub fn new(sessions: Arc<SessionStore>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { sessions, verifier }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Verify credentials and issue a session token
    ///
    /// Every failure, including an unreachable verifier backend or a
    /// session store fault, is returned as `InvalidCredentials`. The log
    /// records the actual cause.
    pub async fn authenticate(&self, login: &str, secret: &str) -> AuthResult<IssuedSession> {
        let login = login.trim();

        match self.verifier.verify(login, secret).await {
            Ok(true) => {}
            Ok(false) => {
                log_event_with_fields(
                    Event::LoginFailed,
                    &[("identity", login), ("reason", "mismatch")],
                );
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                log_event_with_fields(
                    Event::LoginFailed,
                    &[
                        ("detail", &e.to_string()),
                        ("identity", login),
                        ("reason", "verifier"),
                    ],
                );
                return Err(AuthError::InvalidCredentials);
            }
        }

        let session = self.sessions.issue(login).map_err(|e| {
            log_event_with_fields(
                Event::LoginFailed,
                &[
                    ("detail", &e.to_string()),
                    ("identity", login),
                    ("reason", "session"),
                ],
            );
            AuthError::InvalidCredentials
        })?;

        log_event_with_fields(Event::LoginSucceeded, &[("identity", login)]);
        Ok(session)
    }

    /// True iff a token was presented and is currently valid
    pub fn authorize(&self, presented: Option<&str>) -> bool {
        match presented.map(str::trim) {
            Some(token) if !token.is_empty() => self.sessions.validate(token),
            _ => false,
        }
    }

    /// Resolve the admin identity behind a presented token, or `Unauthorized`
    pub fn require_admin(&self, presented: Option<&str>) -> AuthResult<String> {
        let token = presented.map(str::trim).unwrap_or_default();
        match (!token.is_empty()).then(|| self.sessions.identity(token)).flatten() {
            Some(identity) => Ok(identity),
            None => {
                let fingerprint = if token.is_empty() {
                    "none".to_string()
                } else {
                    token_fingerprint(token)
                };
                log_event_with_fields(Event::AuthorizationDenied, &[("token", &fingerprint)]);
                Err(AuthError::Unauthorized)
            }
        }
    }
}
