//! # Cryptographic Utilities
//!
//! Session token generation, token fingerprints for logs, and admin
//! password hashing.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::errors::{AuthError, AuthResult};

/// Session token entropy in bytes (128 bits)
pub const TOKEN_BYTES: usize = 16;

/// Length of a rendered session token
pub const TOKEN_LEN: usize = TOKEN_BYTES * 2;

/// Generate a session token: 128 random bits as lowercase hex
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);

    let mut token = String::with_capacity(TOKEN_LEN);
    for byte in bytes {
        token.push_str(&format!("{:02x}", byte));
    }
    token
}

/// Short, non-reversible token identifier safe to write to logs
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = hasher.finalize();
    let mut encoded =
        base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, digest);
    encoded.truncate(12);
    encoded
}

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::HashingFailed)
}

/// Verify a password against its PHC hash string
pub fn verify_password(password: &str, hash: &str) -> AuthResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Check that a string parses as a PHC hash
pub fn is_password_hash(hash: &str) -> bool {
    PasswordHash::new(hash).is_ok()
}

/// Constant-time comparison of two strings
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_shape() {
        let token = generate_session_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_session_tokens_differ() {
        assert_ne!(generate_session_token(), generate_session_token());
    }

    #[test]
    fn test_fingerprint_is_stable_and_opaque() {
        let token = "00112233445566778899aabbccddeeff";
        assert_eq!(token_fingerprint(token), token_fingerprint(token));
        assert_eq!(token_fingerprint(token).len(), 12);
        assert!(!token.contains(&token_fingerprint(token)));
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();

        assert_ne!(hash, "correct horse");
        assert!(is_password_hash(&hash));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_invalid_credentials() {
        assert!(!is_password_hash("plaintext"));
        assert!(matches!(
            verify_password("x", "plaintext"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_str_eq("admin", "admin"));
        assert!(!constant_time_str_eq("admin", "admin2"));
        assert!(!constant_time_str_eq("admin", "Admin"));
    }
}
