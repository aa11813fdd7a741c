//! # Auth Errors
//!
//! Error types for the authentication module.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ==================
    // Authentication Errors
    // ==================

    /// Wrong login, wrong password, or the verifier could not be reached.
    /// Deliberately one variant: the wire client must not tell them apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ==================
    // Authorization Errors
    // ==================

    /// Missing, unknown or expired session token
    #[error("Unauthorized")]
    Unauthorized,

    // ==================
    // Internal Errors
    // ==================

    /// No async runtime available to schedule session eviction
    #[error("Internal error: session scheduler unavailable")]
    SchedulerUnavailable,

    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// Session map or credential backend failure
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 401 Unauthorized
            AuthError::InvalidCredentials => 401,
            AuthError::Unauthorized => 401,

            // 500 Internal Server Error
            AuthError::SchedulerUnavailable => 500,
            AuthError::HashingFailed => 500,
            AuthError::StorageError(_) => 500,
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(AuthError::Unauthorized.status_code(), 401);
        assert_eq!(AuthError::HashingFailed.status_code(), 500);
        assert!(AuthError::Unauthorized.is_client_error());
        assert!(!AuthError::StorageError("x".into()).is_client_error());
    }

    #[test]
    fn test_error_messages_do_not_leak_info() {
        let err = AuthError::InvalidCredentials;
        assert!(!err.to_string().contains("password"));
        assert!(!err.to_string().contains("login"));
        assert!(!err.to_string().contains("database"));
    }
}
