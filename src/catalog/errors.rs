//! # Catalog Errors
//!
//! Error types for the catalog query engine and its storage collaborator.

use thiserror::Error;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog errors
///
/// Storage detail is carried for the internal log only; `Display` never
/// includes it, so a response built from the message cannot leak
/// connection strings or credentials.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// Storage unreachable or a statement failed
    #[error("retrieval failed")]
    Retrieval(String),

    /// The addressed product does not exist
    #[error("product not found")]
    NotFound,

    /// Write payload rejected before reaching storage
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CatalogError {
    /// Wrap a storage-layer failure
    pub fn retrieval(detail: impl Into<String>) -> Self {
        CatalogError::Retrieval(detail.into())
    }

    /// Internal detail for logging
    pub fn detail(&self) -> String {
        match self {
            CatalogError::Retrieval(detail) => detail.clone(),
            other => other.to_string(),
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::InvalidInput(_) => 400,
            CatalogError::NotFound => 404,
            CatalogError::Retrieval(_) => 500,
        }
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        CatalogError::Retrieval(err.to_string())
    }
}
