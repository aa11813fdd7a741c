//! Admin HTTP Routes
//!
//! Login plus the mutating catalog endpoints. Every mutating handler checks
//! the `X-Admin-Token` header before it reads the body or touches storage.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::ApiError;
use crate::auth::AuthService;
use crate::catalog::{CatalogItem, CatalogService, Category, NewProduct};
use crate::media::ImageStore;
use crate::observability::{log_event_with_fields, Event};

/// Header carrying the admin session token
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Shared admin state
pub struct AdminState {
    pub catalog: CatalogService,
    pub auth: AuthService,
    pub images: Arc<dyn ImageStore>,
}

/// Admin routes with shared state
pub fn admin_routes(state: Arc<AdminState>) -> Router {
    Router::new()
        .route("/login", post(login_handler))
        .route("/create", post(create_product_handler))
        .route("/update", post(update_product_handler))
        .route("/delete", post(delete_product_handler))
        .route("/category/create", post(create_category_handler))
        .route("/category/delete", post(delete_category_handler))
        .with_state(state)
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct IdRequest {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: i64,
    pub deleted: bool,
}

/// Product fields read from a multipart form
#[derive(Debug, Default)]
struct ProductForm {
    id: i64,
    name: String,
    description: String,
    price: f64,
    category_id: i64,
    available: bool,
    buy_url: String,
    image: Option<Vec<u8>>,
}

impl ProductForm {
    fn product(&self) -> NewProduct {
        NewProduct {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price,
            category_id: self.category_id,
            available: self.available,
            buy_url: self.buy_url.clone(),
        }
    }
}

// ==================
// Helpers
// ==================

fn require_admin(state: &AdminState, headers: &HeaderMap) -> Result<String, ApiError> {
    let presented = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    Ok(state.auth.require_admin(presented)?)
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Numeric form fields parse leniently: unparsable values become 0.
/// Multipart failures keep their own status (413 past the body limit).
async fn read_product_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ProductForm, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::new(e.status(), e.body_text()))?;
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
            if !bytes.is_empty() {
                form.image = Some(bytes.to_vec());
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        let value = value.trim();
        match name.as_str() {
            "id" => form.id = value.parse().unwrap_or(0),
            "name" => form.name = value.to_string(),
            "description" => form.description = value.to_string(),
            "price" => {
                form.price = value
                    .parse::<f64>()
                    .ok()
                    .filter(|p| p.is_finite())
                    .unwrap_or(0.0)
            }
            "categoryID" => form.category_id = value.parse().unwrap_or(0),
            "available" => form.available = value.eq_ignore_ascii_case("true"),
            "buy_url" => form.buy_url = value.to_string(),
            _ => {}
        }
    }

    Ok(form)
}

/// Reject an unacceptable upload before anything is written
fn validate_image(state: &AdminState, form: &ProductForm) -> Result<(), ApiError> {
    match &form.image {
        Some(image) => Ok(state.images.validate(image)?),
        None => Ok(()),
    }
}

/// Store the uploaded image and link it to the product
///
/// A failed link is logged; the file stays and the URL is still returned.
async fn store_image(state: &AdminState, product_id: i64, data: &[u8]) -> Result<String, ApiError> {
    let url = state.images.store(product_id, data).map_err(|e| {
        log_event_with_fields(
            Event::ImageStoreFailed,
            &[("detail", &e.to_string()), ("product_id", &product_id.to_string())],
        );
        e
    })?;
    log_event_with_fields(Event::ImageStored, &[("product_id", &product_id.to_string())]);

    if let Err(e) = state.catalog.attach_image(product_id, &url).await {
        log_event_with_fields(
            Event::ImageStoreFailed,
            &[
                ("detail", &e.detail()),
                ("product_id", &product_id.to_string()),
                ("stage", "attach"),
            ],
        );
    }
    Ok(url)
}

// ==================
// Handlers
// ==================

/// Login handler
async fn login_handler(
    State(state): State<Arc<AdminState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let request = json_body(body)?;
    let session = state
        .auth
        .authenticate(&request.login, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
    }))
}

async fn create_product_handler(
    State(state): State<Arc<AdminState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<CatalogItem>), ApiError> {
    require_admin(&state, &headers)?;
    let form = read_product_form(multipart).await?;
    validate_image(&state, &form)?;

    let mut item = state.catalog.create_product(&form.product()).await?;
    if let Some(image) = &form.image {
        item.url = store_image(&state, item.id, image).await?;
    }

    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_product_handler(
    State(state): State<Arc<AdminState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CatalogItem>, ApiError> {
    require_admin(&state, &headers)?;
    let form = read_product_form(multipart).await?;
    validate_image(&state, &form)?;

    let mut item = state.catalog.update_product(form.id, &form.product()).await?;
    item.url = match &form.image {
        Some(image) => store_image(&state, item.id, image).await?,
        None => String::new(),
    };

    Ok(Json(item))
}

async fn delete_product_handler(
    State(state): State<Arc<AdminState>>,
    headers: HeaderMap,
    body: Result<Json<IdRequest>, JsonRejection>,
) -> Result<Json<DeletedResponse>, ApiError> {
    require_admin(&state, &headers)?;
    let request = json_body(body)?;

    state.catalog.delete_product(request.id).await?;
    if let Err(e) = state.images.remove(request.id) {
        log_event_with_fields(
            Event::ImageStoreFailed,
            &[("detail", &e.to_string()), ("product_id", &request.id.to_string())],
        );
    }

    Ok(Json(DeletedResponse {
        id: request.id,
        deleted: true,
    }))
}

async fn create_category_handler(
    State(state): State<Arc<AdminState>>,
    headers: HeaderMap,
    body: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    require_admin(&state, &headers)?;
    let request = json_body(body)?;

    let category = state.catalog.create_category(&request.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn delete_category_handler(
    State(state): State<Arc<AdminState>>,
    headers: HeaderMap,
    body: Result<Json<IdRequest>, JsonRejection>,
) -> Result<Json<DeletedResponse>, ApiError> {
    require_admin(&state, &headers)?;
    let request = json_body(body)?;

    state.catalog.delete_category(request.id).await?;
    Ok(Json(DeletedResponse {
        id: request.id,
        deleted: true,
    }))
}
