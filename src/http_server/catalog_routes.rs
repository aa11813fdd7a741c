//! Catalog HTTP Routes
//!
//! Public, unauthenticated listing endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use super::errors::ApiError;
use crate::catalog::{CatalogPage, CatalogService, Category, FilterRequest};

/// Shared catalog state
pub struct CatalogState {
    pub service: CatalogService,
}

impl CatalogState {
    pub fn new(service: CatalogService) -> Self {
        Self { service }
    }
}

/// Catalog routes with shared state
pub fn catalog_routes(state: Arc<CatalogState>) -> Router {
    Router::new()
        .route("/read", get(read_handler))
        .route("/categories", get(categories_handler))
        .with_state(state)
}

/// Filtered, sorted, paged product listing
///
/// Query parameters are parsed leniently: anything malformed is treated
/// as absent rather than rejected.
async fn read_handler(
    State(state): State<Arc<CatalogState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CatalogPage>, ApiError> {
    let request = FilterRequest::from_params(&params);
    let page = state.service.list_catalog(&request).await?;
    Ok(Json(page))
}

async fn categories_handler(
    State(state): State<Arc<CatalogState>>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.service.list_categories().await?))
}
