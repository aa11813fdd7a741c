//! # Image Store Trait

use super::errors::MediaResult;

/// Where uploaded product images live
pub trait ImageStore: Send + Sync + std::fmt::Debug {
    /// Check an upload without persisting anything
    fn validate(&self, data: &[u8]) -> MediaResult<()>;

    /// Persist the image for a product, replacing any previous one, and
    /// return its public URL. Runs [`ImageStore::validate`] first.
    fn store(&self, product_id: i64, data: &[u8]) -> MediaResult<String>;

    /// Remove a product's image; a missing image is not an error
    fn remove(&self, product_id: i64) -> MediaResult<()>;

    /// Public URL the image for `product_id` is served under
    fn url_for(&self, product_id: i64) -> String;
}
