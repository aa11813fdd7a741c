//! # Storefront Catalog Module
//!
//! Public product listing and admin maintenance of products and categories.
//!
//! Listing requests are compiled into a [`QueryPlan`]: a fixed SQL skeleton
//! with positional placeholders plus an ordered list of bound values. The
//! same filter clause drives both the count and the page statement, so a
//! listing's `total` always describes the rows its pages are drawn from.
//! User text never reaches SQL text.

pub mod compiler;
pub mod errors;
pub mod memory;
pub mod model;
pub mod plan;
pub mod postgres;
pub mod request;
pub mod service;
pub mod store;

pub use compiler::{compile, resolve_order};
pub use errors::{CatalogError, CatalogResult};
pub use memory::InMemoryCatalogStore;
pub use model::{CatalogItem, CatalogPage, Category, NewProduct};
pub use plan::{BoundValue, Direction, OrderBy, Predicate, QueryPlan, SortColumn, Statement};
pub use postgres::{PgCatalogStore, PgSettings};
pub use request::{FilterRequest, SortOrder, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use service::CatalogService;
pub use store::CatalogStore;
