//! # Storefront HTTP Server Module
//!
//! Axum wiring for the catalog and admin services.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/read`, `/api/categories` - Public catalog
//! - `/api/admin/*` - Login and catalog maintenance (`X-Admin-Token`)
//! - `/uploads/*` - Product images

pub mod admin_routes;
pub mod catalog_routes;
pub mod config;
pub mod errors;
pub mod observability_routes;
pub mod server;

pub use admin_routes::ADMIN_TOKEN_HEADER;
pub use config::HttpServerConfig;
pub use errors::{ApiError, ErrorResponse};
pub use server::{build_router, AppState, HttpServer};
