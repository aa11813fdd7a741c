//! HTTP API Tests
//!
//! Drive the assembled router in-process with `tower::ServiceExt::oneshot`.
//!
//! Test Categories:
//! 1. Public listing and health
//! 2. Login: uniform failures, malformed bodies
//! 3. Admin gate: no storage access without a valid token
//! 4. Admin catalog maintenance end to end, including image upload
//! 5. Opaque storage failures

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use storefront::auth::crypto::hash_password;
use storefront::auth::{AuthService, SessionStore, StaticCredentialVerifier};
use storefront::catalog::{
    CatalogError, CatalogItem, CatalogResult, CatalogService, CatalogStore, Category,
    InMemoryCatalogStore, NewProduct, QueryPlan,
};
use storefront::http_server::{build_router, AppState, HttpServerConfig};
use storefront::media::LocalImageStore;

const BOUNDARY: &str = "storefront-test-boundary";
const JPEG: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg-body";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-png-body";

struct Harness {
    router: Router,
    store: Arc<dyn CatalogStore>,
    uploads: TempDir,
}

fn harness_with(store: Arc<dyn CatalogStore>) -> Harness {
    let uploads = TempDir::new().unwrap();
    let verifier =
        StaticCredentialVerifier::new("admin", hash_password("s3cret").unwrap()).unwrap();
    let images = LocalImageStore::new(uploads.path(), "http://localhost:8080", 1024 * 1024);

    let state = AppState {
        catalog: CatalogService::new(Arc::clone(&store)),
        auth: AuthService::new(Arc::new(SessionStore::default()), Arc::new(verifier)),
        images: Arc::new(images),
        uploads_dir: uploads.path().to_path_buf(),
        max_upload_bytes: 1024 * 1024,
    };

    Harness {
        router: build_router(&HttpServerConfig::default(), state),
        store,
        uploads,
    }
}

fn harness() -> Harness {
    harness_with(Arc::new(InMemoryCatalogStore::new()))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(router, request).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header("X-Admin-Token", token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn multipart_body(fields: &[(&str, &str)], file: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"p.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn post_multipart(
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<&[u8]>,
) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    );
    if let Some(token) = token {
        builder = builder.header("X-Admin-Token", token);
    }
    builder.body(Body::from(multipart_body(fields, file))).unwrap()
}

async fn login(router: &Router) -> String {
    let (status, body) = send_json(
        router,
        post_json("/api/admin/login", None, json!({"login": "admin", "password": "s3cret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

// =============================================================================
// PUBLIC ENDPOINTS
// =============================================================================

#[tokio::test]
async fn test_health() {
    let h = harness();
    let (status, body) = send_json(&h.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_read_empty_catalog() {
    let h = harness();
    let (status, body) = send_json(&h.router, get("/api/read")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"items": [], "total": 0}));
}

#[tokio::test]
async fn test_read_ignores_malformed_filters() {
    let h = harness();
    h.store
        .create_product(&NewProduct {
            name: "Sencha".into(),
            description: String::new(),
            price: 7.0,
            category_id: 0,
            available: true,
            buy_url: String::new(),
        })
        .await
        .unwrap();

    let (status, body) = send_json(
        &h.router,
        get("/api/read?min_price=abc&category_id=x&page=-3&page_size=9000&sort=evil"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["name"], "Sencha");
}

// =============================================================================
// LOGIN
// =============================================================================

#[tokio::test]
async fn test_login_issues_token() {
    let h = harness();
    let (status, body) = send_json(
        &h.router,
        post_json("/api/admin/login", None, json!({"login": "admin", "password": "s3cret"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();
    assert_eq!(token.len(), 32);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let h = harness();
    let (wrong_pw_status, wrong_pw) = send_json(
        &h.router,
        post_json("/api/admin/login", None, json!({"login": "admin", "password": "nope"})),
    )
    .await;
    let (wrong_user_status, wrong_user) = send_json(
        &h.router,
        post_json("/api/admin/login", None, json!({"login": "root", "password": "s3cret"})),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_user_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, json!({"error": "Invalid credentials", "code": 401}));
    assert_eq!(wrong_pw, wrong_user);
}

#[tokio::test]
async fn test_login_malformed_body() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send_json(&h.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

// =============================================================================
// ADMIN GATE
// =============================================================================

#[tokio::test]
async fn test_mutations_require_token() {
    let h = harness();
    let fields = [("name", "Sencha"), ("price", "7")];

    for token in [None, Some(""), Some("0123456789abcdef0123456789abcdef")] {
        let (status, body) = send_json(
            &h.router,
            post_multipart("/api/admin/create", token, &fields, Some(JPEG)),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Unauthorized", "code": 401}));

        let (status, _) = send_json(
            &h.router,
            post_json("/api/admin/category/create", token, json!({"name": "Tea"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // Nothing reached storage
    let (_, body) = send_json(&h.router, get("/api/read")).await;
    assert_eq!(body["total"], 0);
    assert!(h.store.list_categories().await.unwrap().is_empty());
    assert!(!h.uploads.path().join("1.jpg").exists());
}

#[tokio::test]
async fn test_unauthorized_before_body_validation() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri("/api/admin/delete")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("garbage"))
        .unwrap();
    let (status, _) = send_json(&h.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// ADMIN CATALOG MAINTENANCE
// =============================================================================

#[tokio::test]
async fn test_product_lifecycle_with_image() {
    let h = harness();
    let token = login(&h.router).await;

    let (status, category) = send_json(
        &h.router,
        post_json("/api/admin/category/create", Some(&token), json!({"name": "Tea"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_i64().unwrap();
    let category_field = category_id.to_string();

    // Create with image
    let (status, created) = send_json(
        &h.router,
        post_multipart(
            "/api/admin/create",
            Some(&token),
            &[
                ("name", "Sencha"),
                ("description", "Steamed green tea"),
                ("price", "7.5"),
                ("categoryID", &category_field),
                ("available", "true"),
                ("buy_url", "https://shop.example/sencha"),
            ],
            Some(JPEG),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    let image_url = format!("http://localhost:8080/uploads/{}.jpg", id);
    assert_eq!(created["url"], image_url.as_str());
    assert_eq!(created["category"], "Tea");
    assert_eq!(created["buyUrl"], "https://shop.example/sencha");

    // Listed with joined category and primary image
    let (_, listing) = send_json(&h.router, get("/api/read?search=GREEN&in_stock=TRUE")).await;
    assert_eq!(listing["total"], 1);
    let item: CatalogItem = serde_json::from_value(listing["items"][0].clone()).unwrap();
    assert_eq!(item.id, id);
    assert_eq!(item.category_id, category_id);
    assert_eq!(item.category, "Tea");
    assert_eq!(item.url, image_url);
    assert_eq!(item.price, 7.5);

    // Image served from the uploads directory as JPEG
    let response = h
        .router
        .clone()
        .oneshot(get(&format!("/uploads/{}.jpg", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "image/jpeg");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"\xff\xd8\xff"));
    assert_eq!(&bytes[..], JPEG);

    // Update: lenient numerics, no new image
    let id_field = id.to_string();
    let (status, updated) = send_json(
        &h.router,
        post_multipart(
            "/api/admin/update",
            Some(&token),
            &[
                ("id", &id_field),
                ("name", "Sencha Superior"),
                ("price", "not-a-number"),
                ("categoryID", &category_field),
                ("available", "false"),
            ],
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Sencha Superior");
    assert_eq!(updated["price"], 0.0);
    assert_eq!(updated["category"], "Tea");
    assert!(updated["buyUrl"].is_null());

    let (_, listing) = send_json(&h.router, get("/api/read?in_stock=true")).await;
    assert_eq!(listing["total"], 0);

    // Delete removes the row and the file
    let (status, _) = send_json(
        &h.router,
        post_json("/api/admin/delete", Some(&token), json!({"id": id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listing) = send_json(&h.router, get("/api/read")).await;
    assert_eq!(listing["total"], 0);
    assert!(!h.uploads.path().join(format!("{}.jpg", id)).exists());
}

#[tokio::test]
async fn test_deleted_category_blanks_product_category() {
    let h = harness();
    let token = login(&h.router).await;

    let (_, category) = send_json(
        &h.router,
        post_json("/api/admin/category/create", Some(&token), json!({"name": "Seasonal"})),
    )
    .await;
    let category_field = category["id"].as_i64().unwrap().to_string();
    send_json(
        &h.router,
        post_multipart(
            "/api/admin/create",
            Some(&token),
            &[("name", "Hojicha"), ("price", "4"), ("categoryID", &category_field)],
            None,
        ),
    )
    .await;

    let (status, _) = send_json(
        &h.router,
        post_json("/api/admin/category/delete", Some(&token), json!({"id": category["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, categories) = send_json(&h.router, get("/api/categories")).await;
    assert_eq!(categories, json!([]));

    let (_, listing) = send_json(&h.router, get("/api/read")).await;
    assert_eq!(listing["items"][0]["category"], "");
    assert_eq!(listing["items"][0]["url"], "");
}

#[tokio::test]
async fn test_update_unknown_product_is_not_found() {
    let h = harness();
    let token = login(&h.router).await;

    let (status, body) = send_json(
        &h.router,
        post_multipart("/api/admin/update", Some(&token), &[("id", "999"), ("name", "Ghost")], None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_rejected_image_creates_nothing() {
    let h = harness();
    let token = login(&h.router).await;

    let uploads: [&[u8]; 2] = [b"<script>alert(1)</script>", PNG];
    for upload in uploads {
        let (status, body) = send_json(
            &h.router,
            post_multipart(
                "/api/admin/create",
                Some(&token),
                &[("name", "Script"), ("price", "1")],
                Some(upload),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unsupported image format");
    }

    let (_, listing) = send_json(&h.router, get("/api/read")).await;
    assert_eq!(listing["total"], 0);
    assert!(!h.uploads.path().join("1.jpg").exists());
}

#[tokio::test]
async fn test_rejected_image_leaves_product_unchanged() {
    let h = harness();
    let token = login(&h.router).await;

    let (_, created) = send_json(
        &h.router,
        post_multipart(
            "/api/admin/create",
            Some(&token),
            &[("name", "Sencha"), ("price", "7"), ("available", "true")],
            Some(JPEG),
        ),
    )
    .await;
    let id_field = created["id"].as_i64().unwrap().to_string();

    let (status, _) = send_json(
        &h.router,
        post_multipart(
            "/api/admin/update",
            Some(&token),
            &[("id", &id_field), ("name", "Defaced"), ("price", "0")],
            Some(PNG),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, listing) = send_json(&h.router, get("/api/read")).await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["items"][0]["name"], "Sencha");
    assert_eq!(listing["items"][0]["price"], 7.0);
    assert_eq!(listing["items"][0]["available"], true);

    let (_, bytes) = send(&h.router, get(&format!("/uploads/{}.jpg", id_field))).await;
    assert_eq!(bytes, JPEG);
}

#[tokio::test]
async fn test_oversized_image_is_payload_too_large() {
    let h = harness();
    let token = login(&h.router).await;

    // Just over the image limit but inside the body limit
    let mut over_image_limit = JPEG.to_vec();
    over_image_limit.resize(1024 * 1024 + 1, 0);
    // Past the request body limit
    let mut over_body_limit = JPEG.to_vec();
    over_body_limit.resize(2 * 1024 * 1024, 0);

    for upload in [over_image_limit, over_body_limit] {
        let (status, body) = send_json(
            &h.router,
            post_multipart(
                "/api/admin/create",
                Some(&token),
                &[("name", "Huge"), ("price", "1")],
                Some(&upload),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["code"], 413);
    }

    let (_, listing) = send_json(&h.router, get("/api/read")).await;
    assert_eq!(listing["total"], 0);
}

#[tokio::test]
async fn test_cors_preflight_allows_admin_header() {
    let h = harness();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/admin/create")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-admin-token")
        .body(Body::empty())
        .unwrap();

    let response = h.router.clone().oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    let allowed = headers
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .unwrap()
        .to_str()
        .unwrap()
        .to_lowercase();
    assert!(allowed.contains("x-admin-token"));
}

// =============================================================================
// OPAQUE STORAGE FAILURES
// =============================================================================

#[derive(Debug)]
struct UnreachableStore;

const DETAIL: &str = "could not connect to host=db.internal user=shop password=hunter2";

#[async_trait]
impl CatalogStore for UnreachableStore {
    async fn count(&self, _: &QueryPlan) -> CatalogResult<i64> {
        Err(CatalogError::retrieval(DETAIL))
    }
    async fn fetch_page(&self, _: &QueryPlan) -> CatalogResult<Vec<CatalogItem>> {
        Err(CatalogError::retrieval(DETAIL))
    }
    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        Err(CatalogError::retrieval(DETAIL))
    }
    async fn category_name(&self, _: i64) -> CatalogResult<Option<String>> {
        Err(CatalogError::retrieval(DETAIL))
    }
    async fn create_category(&self, _: &str) -> CatalogResult<i64> {
        Err(CatalogError::retrieval(DETAIL))
    }
    async fn delete_category(&self, _: i64) -> CatalogResult<()> {
        Err(CatalogError::retrieval(DETAIL))
    }
    async fn create_product(&self, _: &NewProduct) -> CatalogResult<i64> {
        Err(CatalogError::retrieval(DETAIL))
    }
    async fn update_product(&self, _: i64, _: &NewProduct) -> CatalogResult<()> {
        Err(CatalogError::retrieval(DETAIL))
    }
    async fn delete_product(&self, _: i64) -> CatalogResult<()> {
        Err(CatalogError::retrieval(DETAIL))
    }
    async fn attach_image(&self, _: i64, _: &str) -> CatalogResult<()> {
        Err(CatalogError::retrieval(DETAIL))
    }
}

#[tokio::test]
async fn test_storage_failure_is_opaque() {
    let h = harness_with(Arc::new(UnreachableStore));

    for uri in ["/api/read?search=tea", "/api/categories"] {
        let (status, body) = send(&h.router, get(uri)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let text = String::from_utf8(body).unwrap();
        assert!(!text.contains("hunter2"));
        assert!(!text.contains("db.internal"));
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"error": "retrieval failed", "code": 500}));
    }
}
