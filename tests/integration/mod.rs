//! End-to-end tests for the storefront HTTP API.
//!
//! Each test builds the full router over an in-process catalog and drives it
//! with `oneshot` requests. No network access is needed.
//! Run with: cargo test --test integration

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

use techstore::api::{create_router, AppState};
use techstore::catalog::{CatalogSource, MockCatalog, Product};
use techstore::health::HealthContext;
use techstore::metrics::{MetricsCollector, RecordingSink};

fn app(catalog: CatalogSource) -> (Router, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let metrics = MetricsCollector::new("localhost", 2003, sink.clone());
    let state = AppState::new(catalog, metrics, HealthContext::new("test", "0.1.0"));
    (create_router(state), sink)
}

/// Catalog with the two products used by the cart scenarios.
fn two_product_catalog() -> CatalogSource {
    let mock = MockCatalog::new();
    mock.set_products(vec![
        Product::new(1, "Ten", dec!(10.00), "", "", "Home").unwrap(),
        Product::new(2, "Five", dec!(5.00), "", "", "Home").unwrap(),
    ]);
    mock.into()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn open_session(app: &Router) -> String {
    let (status, page) = send(app, Method::POST, "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    page["session_id"].as_str().unwrap().to_string()
}

fn money(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn health_reports_healthy() {
    let (app, _) = app(CatalogSource::default());

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["version"], "0.1.0");
    assert_eq!(body["checks"]["database"], "healthy");
    assert_eq!(body["checks"]["redis"], "healthy");
    assert_eq!(body["checks"]["external_services"], "healthy");
}

#[tokio::test]
async fn new_session_shows_fixture_catalog() {
    let (app, _) = app(CatalogSource::default());

    let (status, page) = send(&app, Method::POST, "/api/v1/sessions", None).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(page["loading"], false);
    assert_eq!(page["product_count"], 12);
    assert_eq!(page["header"]["store_name"], "TechStore");
    assert_eq!(page["header"]["cart_count"], 0);
    assert_eq!(page["cart"]["empty"], true);
    assert_eq!(page["products"][0]["display_price"], "$299.99");
    assert_eq!(page["products"][0]["premium"], true);
}

#[tokio::test]
async fn products_endpoint_lists_catalog() {
    let (app, _) = app(CatalogSource::default());

    let (status, products) = send(&app, Method::GET, "/api/v1/products", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(products.as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn two_items_total_with_tax() {
    let (app, _) = app(two_product_catalog());
    let id = open_session(&app).await;
    let items = format!("/api/v1/sessions/{}/cart/items", id);

    send(&app, Method::POST, &items, Some(serde_json::json!({ "product_id": 1 }))).await;
    let (status, cart) = send(
        &app,
        Method::POST,
        &items,
        Some(serde_json::json!({ "product_id": 2 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 2);
    assert_eq!(money(&cart["subtotal"]), dec!(15.00));
    assert_eq!(money(&cart["tax"]), dec!(1.20));
    assert_eq!(money(&cart["total"]), dec!(16.20));
    assert_eq!(cart["display_total"], "$16.20");
    assert_eq!(cart["shipping"], "Free");
}

#[tokio::test]
async fn remove_takes_every_line_of_a_product() {
    let (app, _) = app(two_product_catalog());
    let id = open_session(&app).await;
    let items = format!("/api/v1/sessions/{}/cart/items", id);

    for _ in 0..2 {
        send(&app, Method::POST, &items, Some(serde_json::json!({ "product_id": 1 }))).await;
    }
    let (_, cart) = send(&app, Method::GET, &format!("/api/v1/sessions/{}/cart", id), None).await;
    assert_eq!(cart["item_count"], 2);

    let (status, cart) = send(&app, Method::DELETE, &format!("{}/1", items), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 0);
    assert_eq!(money(&cart["subtotal"]), Decimal::ZERO);

    // A second remove is a no-op.
    let (status, again) = send(&app, Method::DELETE, &format!("{}/1", items), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["item_count"], 0);
}

#[tokio::test]
async fn removing_absent_product_leaves_cart_alone() {
    let (app, _) = app(two_product_catalog());
    let id = open_session(&app).await;
    let items = format!("/api/v1/sessions/{}/cart/items", id);

    let (_, before) =
        send(&app, Method::POST, &items, Some(serde_json::json!({ "product_id": 2 }))).await;
    let (_, after) = send(&app, Method::DELETE, &format!("{}/1", items), None).await;

    assert_eq!(after["lines"], before["lines"]);
    assert_eq!(after["subtotal"], before["subtotal"]);
    assert_eq!(after["total"], before["total"]);
}

#[tokio::test]
async fn session_lifecycle() {
    let (app, sink) = app(CatalogSource::default());
    let id = open_session(&app).await;
    let session = format!("/api/v1/sessions/{}", id);

    let (status, page) = send(&app, Method::GET, &session, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["session_id"], id.as_str());

    let (status, _) = send(&app, Method::DELETE, &session, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &session, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&id));

    assert_eq!(sink.named("sessions.opened").len(), 1);
}

#[tokio::test]
async fn carts_are_isolated_between_sessions() {
    let (app, _) = app(CatalogSource::default());
    let a = open_session(&app).await;
    let b = open_session(&app).await;

    send(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{}/cart/items", a),
        Some(serde_json::json!({ "product_id": 3 })),
    )
    .await;

    let (_, cart_a) = send(&app, Method::GET, &format!("/api/v1/sessions/{}/cart", a), None).await;
    let (_, cart_b) = send(&app, Method::GET, &format!("/api/v1/sessions/{}/cart", b), None).await;
    assert_eq!(cart_a["item_count"], 1);
    assert_eq!(cart_b["item_count"], 0);
}

#[tokio::test]
async fn search_matches_name_and_description() {
    let (app, _) = app(CatalogSource::default());
    let id = open_session(&app).await;

    let (status, hits) = send(
        &app,
        Method::GET,
        &format!("/api/v1/sessions/{}/search?q=wireless", id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 6, 9]);
}

#[tokio::test]
async fn error_statuses() {
    let (app, _) = app(CatalogSource::default());
    let id = open_session(&app).await;

    let (status, body) = send(&app, Method::GET, "/api/v1/sessions/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let unknown = "00000000-0000-4000-8000-000000000000";
    let (status, _) = send(&app, Method::GET, &format!("/api/v1/sessions/{}/cart", unknown), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{}/cart/items", id),
        Some(serde_json::json!({ "product_id": 999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_catalog_still_opens_session() {
    let (app, sink) = app(MockCatalog::failing("upstream unavailable").into());

    let (status, page) = send(&app, Method::POST, "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(page["loading"], false);
    assert_eq!(page["product_count"], 0);
    assert!(page["catalog_error"]
        .as_str()
        .unwrap()
        .contains("upstream unavailable"));

    let id = page["session_id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{}/cart/items", id),
        Some(serde_json::json!({ "product_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(sink.named("catalog.fetch_failed").len(), 1);

    let (status, _) = send(&app, Method::GET, "/api/v1/products", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
