//! # HTTP Server
//!
//! Combines the catalog, admin, health and uploads routers into one axum
//! application.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

use super::admin_routes::{admin_routes, AdminState, ADMIN_TOKEN_HEADER};
use super::catalog_routes::{catalog_routes, CatalogState};
use super::config::HttpServerConfig;
use super::observability_routes::health_routes;
use crate::auth::AuthService;
use crate::catalog::CatalogService;
use crate::media::{ImageStore, UPLOADS_ROUTE};
use crate::observability::{log_event_with_fields, Event};

/// Room for the non-file form fields of a product upload
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Services the HTTP layer dispatches to
#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub auth: AuthService,
    pub images: Arc<dyn ImageStore>,
    /// Directory served at `/uploads`
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: u64,
}

/// HTTP server for the storefront API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: AppState) -> Self {
        let router = build_router(&config, state);
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests
    pub async fn start<F>(self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;

        log_event_with_fields(
            Event::ServerStart,
            &[
                ("addr", &addr),
                ("version", env!("CARGO_PKG_VERSION")),
            ],
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

/// Build the combined router with all endpoints
pub fn build_router(config: &HttpServerConfig, state: AppState) -> Router {
    let catalog_state = Arc::new(CatalogState::new(state.catalog.clone()));
    let admin_state = Arc::new(AdminState {
        catalog: state.catalog,
        auth: state.auth,
        images: state.images,
    });

    let body_limit = usize::try_from(state.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        // Health check at root level
        .merge(health_routes())
        .nest(
            "/api",
            catalog_routes(catalog_state).nest("/admin", admin_routes(admin_state)),
        )
        .nest_service(UPLOADS_ROUTE, ServeDir::new(state.uploads_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(config))
}

fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(ADMIN_TOKEN_HEADER),
        ]);

    if config.cors_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
