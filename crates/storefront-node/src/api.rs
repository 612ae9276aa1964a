//! HTTP API for the Storefront node.
//!
//! Every request under `/products` reaches [`products`], which dispatches on
//! the HTTP method. Each operation holds the catalog lock for its whole
//! critical section, including encoding the response body. Request bodies
//! are decoded before the lock is taken.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use storefront_catalog::{Catalog, CatalogError, Product, ProductId};
use tower_http::trace::TraceLayer;

use crate::observability::request_id_middleware;

/// The only media type accepted for request bodies.
const JSON_CONTENT_TYPE: &str = "application/json";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Product catalog.
    pub catalog: Arc<Catalog>,
}

impl AppState {
    /// Creates state around an existing catalog.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Creates state around the seed catalog.
    pub fn seeded() -> Self {
        Self::new(Catalog::seeded())
    }
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request path does not carry a product id.
    #[error("not found")]
    Routing,
    /// No product at the requested id.
    #[error("not found")]
    NotFound(#[from] CatalogError),
    /// The request body is not declared as JSON.
    #[error("content type 'application/json' required")]
    UnsupportedMediaType,
    /// The body is not a valid product.
    #[error("{0}")]
    Decode(#[source] serde_json::Error),
    /// The HTTP method is not supported.
    #[error("invalid method")]
    MethodNotAllowed,
    /// The response body could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Routing | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Decode(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Creates the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/products", routing::any(products))
        .route("/products/", routing::any(products))
        .route("/products/{*rest}", routing::any(products))
        .fallback(greeting)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Answers every path outside `/products`.
async fn greeting() -> &'static str {
    "Hello World\n"
}

/// Product collection entry point.
async fn products(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let catalog = state.catalog.as_ref();

    match method {
        Method::GET => get_products(catalog, &uri),
        Method::POST => create_product(catalog, &headers, &body),
        Method::PUT | Method::PATCH => update_product(catalog, &uri, &headers, &body),
        Method::DELETE => delete_product(catalog, &uri),
        _ => Err(ApiError::MethodNotAllowed),
    }
}

/// Lists all products, or returns one when the path carries an id.
fn get_products(catalog: &Catalog, uri: &Uri) -> Result<Response, ApiError> {
    let products = catalog.lock();

    match product_id(uri) {
        Ok(id) => json_response(StatusCode::OK, products.get(id)?),
        Err(_) => json_response(StatusCode::OK, &*products),
    }
}

/// Appends a product.
fn create_product(catalog: &Catalog, headers: &HeaderMap, body: &[u8]) -> Result<Response, ApiError> {
    let product = decode_product(headers, body)?;

    let mut products = catalog.lock();
    let id = products.push(product);
    tracing::info!(id, "Product created");

    json_response(StatusCode::CREATED, products.get(id)?)
}

/// Merges the request body into an existing product.
fn update_product(
    catalog: &Catalog,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, ApiError> {
    let id = product_id(uri)?;
    let patch = decode_product(headers, body)?;

    let mut products = catalog.lock();
    let product = products.merge(id, patch)?;
    tracing::info!(id, "Product updated");

    json_response(StatusCode::OK, product)
}

/// Removes a product.
fn delete_product(catalog: &Catalog, uri: &Uri) -> Result<Response, ApiError> {
    let id = product_id(uri)?;

    let mut products = catalog.lock();
    products.remove(id)?;
    tracing::info!(id, remaining = products.len(), "Product deleted");

    json_response(StatusCode::NO_CONTENT, "")
}

/// Extracts the product id from a `/products/{id}` request target.
///
/// The target is split on `/` as received, query string included, so
/// anything but exactly `""`, `"products"`, `"<integer>"` yields
/// [`ApiError::Routing`].
fn product_id(uri: &Uri) -> Result<ProductId, ApiError> {
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str());

    let parts: Vec<&str> = target.split('/').collect();
    if parts.len() != 3 {
        return Err(ApiError::Routing);
    }

    parts[2].parse().map_err(|_| ApiError::Routing)
}

fn decode_product(headers: &HeaderMap, body: &[u8]) -> Result<Product, ApiError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .is_some_and(|ct| ct.as_bytes() == JSON_CONTENT_TYPE.as_bytes());
    if !is_json {
        return Err(ApiError::UnsupportedMediaType);
    }

    serde_json::from_slice(body).map_err(ApiError::Decode)
}

fn json_response<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Response, ApiError> {
    let body = serde_json::to_vec(value)?;
    Ok((status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use proptest::prelude::*;
    use storefront_catalog::ProductList;
    use tower::ServiceExt;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    async fn body_string(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[test]
    fn test_product_id_from_item_path() {
        assert_eq!(product_id(&uri("/products/0")).unwrap(), 0);
        assert_eq!(product_id(&uri("/products/42")).unwrap(), 42);
        assert_eq!(product_id(&uri("/products/-1")).unwrap(), -1);
        assert_eq!(product_id(&uri("/products/+7")).unwrap(), 7);
    }

    #[test]
    fn test_product_id_rejects_other_shapes() {
        for target in [
            "/products",
            "/products/",
            "/products/abc",
            "/products/1/extra",
            "/products/1?verbose=true",
            "/products/99999999999999999999",
            "/",
        ] {
            assert!(
                matches!(product_id(&uri(target)), Err(ApiError::Routing)),
                "{target} should not yield an id"
            );
        }
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (ApiError::Routing, StatusCode::NOT_FOUND),
            (
                ApiError::NotFound(CatalogError::NotFound { id: 9 }),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::UnsupportedMediaType,
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (ApiError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ApiError::Routing.to_string(), "not found");
        assert_eq!(
            ApiError::NotFound(CatalogError::NotFound { id: 9 }).to_string(),
            "not found"
        );
        assert_eq!(
            ApiError::UnsupportedMediaType.to_string(),
            "content type 'application/json' required"
        );
        assert_eq!(ApiError::MethodNotAllowed.to_string(), "invalid method");
    }

    #[tokio::test]
    async fn test_greeting_fallback() {
        let app = create_router(AppState::seeded());

        let response = app
            .oneshot(Request::builder().uri("/hello").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "Hello World\n");
    }

    #[tokio::test]
    async fn test_trailing_slash_lists_products() {
        let app = create_router(AppState::seeded());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/products/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let listed: Vec<Product> = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(listed.len(), 3);
    }

    #[tokio::test]
    async fn test_responses_are_json() {
        let app = create_router(AppState::seeded());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/products/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_content_type_with_parameters_is_rejected() {
        let state = AppState::seeded();
        let app = create_router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/products")
                    .header("content-type", "application/json; charset=utf-8")
                    .body(Body::from(r#"{"name":"Cable","price":5}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(state.catalog.snapshot(), ProductList::seeded());
    }

    #[tokio::test]
    async fn test_update_checks_id_before_content_type() {
        let app = create_router(AppState::seeded());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/products")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, r#"{"error":"not found"}"#);
    }

    #[tokio::test]
    async fn test_delete_returns_empty_json_string() {
        let state = AppState::seeded();
        let app = create_router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/products/2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(body_string(response).await, r#""""#);
        assert_eq!(state.catalog.len(), 2);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let app = create_router(AppState::seeded());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/products")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get("x-request-id").unwrap(), "abc-123");
    }

    proptest! {
        #[test]
        fn prop_item_paths_round_trip(id in proptest::prelude::any::<i64>()) {
            let target = format!("/products/{id}");
            prop_assert_eq!(product_id(&uri(&target)).unwrap(), id);
        }

        #[test]
        fn prop_deeper_paths_have_no_id(id in 0i64..1000, tail in "[a-z0-9]{1,8}") {
            let target = format!("/products/{id}/{tail}");
            prop_assert!(product_id(&uri(&target)).is_err());
        }
    }
}
