//! # Storefront Media Module
//!
//! Storage for uploaded product images. The catalog only ever records the
//! URL returned here, never image bytes.

pub mod errors;
pub mod local;
pub mod store;

pub use errors::{MediaError, MediaResult};
pub use local::{LocalImageStore, UPLOADS_ROUTE};
pub use store::ImageStore;
