//! # Catalog Store
//!
//! Storage collaborator for the catalog. Implementations execute compiled
//! plans and the fixed admin statements; they never build predicates of
//! their own.

use async_trait::async_trait;

use super::errors::CatalogResult;
use super::model::{CatalogItem, Category, NewProduct};
use super::plan::QueryPlan;

/// Backend the catalog service reads from and writes to
#[async_trait]
pub trait CatalogStore: Send + Sync + std::fmt::Debug {
    /// Number of products matching the plan's predicates
    async fn count(&self, plan: &QueryPlan) -> CatalogResult<i64>;

    /// The plan's page of products, ordered and limited
    async fn fetch_page(&self, plan: &QueryPlan) -> CatalogResult<Vec<CatalogItem>>;

    /// All categories ordered by id
    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;

    /// Name of a category, `None` if it does not exist
    async fn category_name(&self, id: i64) -> CatalogResult<Option<String>>;

    /// Insert a category, returning its id
    async fn create_category(&self, name: &str) -> CatalogResult<i64>;

    /// Remove a category; products that referenced it keep the dangling key
    async fn delete_category(&self, id: i64) -> CatalogResult<()>;

    /// Insert a product, returning its id
    async fn create_product(&self, product: &NewProduct) -> CatalogResult<i64>;

    /// Overwrite a product's fields. `NotFound` if the id is unknown.
    async fn update_product(&self, id: i64, product: &NewProduct) -> CatalogResult<()>;

    /// Remove a product and its image rows; removing an unknown id is a no-op
    async fn delete_product(&self, id: i64) -> CatalogResult<()>;

    /// Record an image URL for a product unless that URL is already recorded
    async fn attach_image(&self, product_id: i64, url: &str) -> CatalogResult<()>;
}
