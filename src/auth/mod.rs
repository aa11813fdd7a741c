//! # Storefront Auth Module
//!
//! Administrator authentication and the session token store that gates
//! every mutating endpoint.

pub mod api;
pub mod crypto;
pub mod errors;
pub mod session;
pub mod verifier;

pub use api::AuthService;
pub use errors::{AuthError, AuthResult};
pub use session::{IssuedSession, SessionConfig, SessionStore, DEFAULT_SESSION_TTL};
pub use verifier::{CredentialVerifier, DatabaseRoleVerifier, StaticCredentialVerifier};
