//! HTTP API route definitions.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{
    add_cart_item, close_session, create_session, get_cart, get_session, health, list_products,
    metrics, remove_cart_item, search, AppState,
};
use crate::metrics::LatencyTimer;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        // Catalog
        .route("/api/v1/products", get(list_products))
        // Sessions and carts
        .route("/api/v1/sessions", post(create_session))
        .route(
            "/api/v1/sessions/:id",
            get(get_session).delete(close_session),
        )
        .route("/api/v1/sessions/:id/cart", get(get_cart))
        .route("/api/v1/sessions/:id/cart/items", post(add_cart_item))
        .route(
            "/api/v1/sessions/:id/cart/items/:product_id",
            delete(remove_cart_item),
        )
        .route("/api/v1/sessions/:id/search", get(search))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create a minimal health-only router (for startup).
pub fn health_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

/// Time every request and count server errors, keyed by route template.
async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let timer = LatencyTimer::start();
    let response = next.run(request).await;
    state.metrics.record_request_time(&path, timer.elapsed());

    if response.status().is_server_error() {
        state.metrics.record_error(&path);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::catalog::{CatalogSource, MockCatalog};
    use crate::health::{FailingProbe, HealthContext};
    use crate::metrics::{MetricsCollector, RecordingSink};

    fn state_with(
        catalog: CatalogSource,
        health: HealthContext,
    ) -> (AppState, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let metrics = MetricsCollector::new("localhost", 2003, sink.clone());
        (AppState::new(catalog, metrics, health), sink)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let (state, _) = state_with(CatalogSource::default(), HealthContext::new("test", "1"));
        let app = create_router(state);

        let response = app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_endpoint_returns_503_when_a_probe_fails() {
        let health = HealthContext::new("test", "1")
            .with_probes(vec![Arc::new(FailingProbe::new("database", "down"))]);
        let (state, _) = state_with(CatalogSource::default(), health);
        let app = create_router(state);

        let response = app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_router_serves_health_only() {
        let (state, _) = state_with(CatalogSource::default(), HealthContext::new("test", "1"));

        let response = health_router(state.clone())
            .oneshot(get_request("/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = health_router(state)
            .oneshot(get_request("/api/v1/products"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_endpoint_is_404_without_recorder() {
        let (state, _) = state_with(CatalogSource::default(), HealthContext::new("test", "1"));
        let app = create_router(state);

        let response = app.oneshot(get_request("/metrics")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn requests_are_timed_by_route() {
        let (state, sink) = state_with(CatalogSource::default(), HealthContext::new("test", "1"));
        let app = create_router(state);

        app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(sink.named("requests..health").len(), 1);
        assert!(sink.named("errors..health").is_empty());
    }

    #[tokio::test]
    async fn catalog_failure_is_counted_as_error() {
        let (state, sink) = state_with(
            MockCatalog::failing("upstream down").into(),
            HealthContext::new("test", "1"),
        );
        let app = create_router(state);

        let response = app.oneshot(get_request("/api/v1/products")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(sink.named("errors..api.v1.products").len(), 1);
    }
}
