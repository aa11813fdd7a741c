//! Observable events
//!
//! Every log line carries one of these as its `event` key.

use std::fmt;

use super::Severity;

/// Observable events in the storefront service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// HTTP server bound and serving
    ServerStart,
    /// HTTP server stopped
    ServerStop,
    /// Configuration loaded
    ConfigLoaded,

    // Catalog reads
    /// Catalog page served
    CatalogListed,
    /// Storage failed while serving a read
    CatalogRetrievalFailed,

    // Auth
    /// Admin authenticated
    LoginSucceeded,
    /// Admin authentication rejected or verifier failed
    LoginFailed,
    /// Session token issued
    SessionIssued,
    /// Session token evicted after its lifetime
    SessionEvicted,
    /// Mutating request rejected for a missing or unknown token
    AuthorizationDenied,

    // Catalog writes
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
    CategoryCreated,
    CategoryDeleted,
    /// Storage failed while applying a write
    CatalogWriteFailed,

    // Media
    ImageStored,
    ImageStoreFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ServerStart => "SERVER_START",
            Event::ServerStop => "SERVER_STOP",
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::CatalogListed => "CATALOG_LISTED",
            Event::CatalogRetrievalFailed => "CATALOG_RETRIEVAL_FAILED",

            Event::LoginSucceeded => "LOGIN_SUCCEEDED",
            Event::LoginFailed => "LOGIN_FAILED",
            Event::SessionIssued => "SESSION_ISSUED",
            Event::SessionEvicted => "SESSION_EVICTED",
            Event::AuthorizationDenied => "AUTHORIZATION_DENIED",

            Event::ProductCreated => "PRODUCT_CREATED",
            Event::ProductUpdated => "PRODUCT_UPDATED",
            Event::ProductDeleted => "PRODUCT_DELETED",
            Event::CategoryCreated => "CATEGORY_CREATED",
            Event::CategoryDeleted => "CATEGORY_DELETED",
            Event::CatalogWriteFailed => "CATALOG_WRITE_FAILED",

            Event::ImageStored => "IMAGE_STORED",
            Event::ImageStoreFailed => "IMAGE_STORE_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::CatalogRetrievalFailed
            | Event::CatalogWriteFailed
            | Event::ImageStoreFailed => Severity::Error,
            Event::LoginFailed | Event::AuthorizationDenied => Severity::Warn,
            Event::CatalogListed => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
