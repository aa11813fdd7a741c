//! # Catalog Service
//!
//! Ties the filter compiler to a [`CatalogStore`]: one compiled plan is
//! executed twice (count, then page) so that `total` and `items` are always
//! computed over the same predicate set.

use std::sync::Arc;

use super::compiler::compile;
use super::errors::{CatalogError, CatalogResult};
use super::model::{CatalogItem, CatalogPage, Category, NewProduct};
use super::request::FilterRequest;
use super::store::CatalogStore;
use crate::observability::{log_event_with_fields, Event};

/// Catalog operations exposed to the service layer
#[derive(Debug, Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// List one page of products matching the filters
    ///
    /// A page past the end yields no items and the full `total`. Zero
    /// matches is a successful empty page.
    pub async fn list_catalog(&self, request: &FilterRequest) -> CatalogResult<CatalogPage> {
        let plan = compile(request);

        let total = self
            .store
            .count(&plan)
            .await
            .map_err(|e| read_failed("count", e))?;
        let items = self
            .store
            .fetch_page(&plan)
            .await
            .map_err(|e| read_failed("select", e))?;

        log_event_with_fields(
            Event::CatalogListed,
            &[
                ("filters", &plan.predicates.len().to_string()),
                ("page", &plan.page.to_string()),
                ("returned", &items.len().to_string()),
                ("total", &total.to_string()),
            ],
        );

        Ok(CatalogPage { items, total })
    }

    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        self.store
            .list_categories()
            .await
            .map_err(|e| read_failed("categories", e))
    }

    pub async fn create_category(&self, name: &str) -> CatalogResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::InvalidInput("category name is empty".into()));
        }
        let id = self
            .store
            .create_category(name)
            .await
            .map_err(|e| write_failed("create_category", e))?;

        log_event_with_fields(Event::CategoryCreated, &[("id", &id.to_string())]);
        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    pub async fn delete_category(&self, id: i64) -> CatalogResult<()> {
        self.store
            .delete_category(id)
            .await
            .map_err(|e| write_failed("delete_category", e))?;
        log_event_with_fields(Event::CategoryDeleted, &[("id", &id.to_string())]);
        Ok(())
    }

    /// Insert a product; the returned item has no image yet
    pub async fn create_product(&self, product: &NewProduct) -> CatalogResult<CatalogItem> {
        let id = self
            .store
            .create_product(product)
            .await
            .map_err(|e| write_failed("create_product", e))?;

        log_event_with_fields(Event::ProductCreated, &[("id", &id.to_string())]);
        Ok(product.to_item(id, self.resolve_category(product).await, String::new()))
    }

    /// Overwrite a product and return it with its category name resolved
    pub async fn update_product(&self, id: i64, product: &NewProduct) -> CatalogResult<CatalogItem> {
        self.store
            .update_product(id, product)
            .await
            .map_err(|e| write_failed("update_product", e))?;

        log_event_with_fields(Event::ProductUpdated, &[("id", &id.to_string())]);
        Ok(product.to_item(id, self.resolve_category(product).await, String::new()))
    }

    pub async fn delete_product(&self, id: i64) -> CatalogResult<()> {
        self.store
            .delete_product(id)
            .await
            .map_err(|e| write_failed("delete_product", e))?;
        log_event_with_fields(Event::ProductDeleted, &[("id", &id.to_string())]);
        Ok(())
    }

    /// Link a stored image to a product
    pub async fn attach_image(&self, product_id: i64, url: &str) -> CatalogResult<()> {
        self.store
            .attach_image(product_id, url)
            .await
            .map_err(|e| write_failed("attach_image", e))
    }

    /// Category name for a response body; lookup failures degrade to ""
    async fn resolve_category(&self, product: &NewProduct) -> String {
        let Some(id) = product.category_key() else {
            return String::new();
        };
        match self.store.category_name(id).await {
            Ok(name) => name.unwrap_or_default(),
            Err(e) => {
                read_failed("category_name", e);
                String::new()
            }
        }
    }
}

fn read_failed(stage: &str, err: CatalogError) -> CatalogError {
    if let CatalogError::Retrieval(detail) = &err {
        log_event_with_fields(
            Event::CatalogRetrievalFailed,
            &[("detail", detail), ("stage", stage)],
        );
    }
    err
}

fn write_failed(stage: &str, err: CatalogError) -> CatalogError {
    if let CatalogError::Retrieval(detail) = &err {
        log_event_with_fields(
            Event::CatalogWriteFailed,
            &[("detail", detail), ("stage", stage)],
        );
    }
    err
}
