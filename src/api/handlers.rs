//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::CatalogSource;
use crate::config::Config;
use crate::error::StorefrontError;
use crate::health::{HealthContext, HealthFailure};
use crate::metrics::MetricsCollector;
use crate::storefront::{CartView, PageView, ProductCardView, SessionId, Storefront};

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session registry.
    pub storefront: Storefront,
    /// Process metrics collector.
    pub metrics: MetricsCollector,
    /// Health report inputs.
    pub health: Arc<HealthContext>,
    /// Prometheus renderer, when a recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create app state from explicit parts.
    pub fn new(catalog: CatalogSource, metrics: MetricsCollector, health: HealthContext) -> Self {
        Self {
            storefront: Storefront::new(catalog, metrics.clone()),
            metrics,
            health: Arc::new(health),
            prometheus: None,
        }
    }

    /// Create app state from configuration.
    pub fn from_config(config: &Config, catalog: CatalogSource) -> Self {
        let mut state = Self::new(
            catalog,
            MetricsCollector::from_config(config),
            HealthContext::new(config.app_env.clone(), config.app_version.clone()),
        );
        state.storefront = state.storefront.with_session_ttl(config.session_ttl());
        state
    }

    /// Attach a Prometheus renderer for `/metrics`.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = match &self {
            StorefrontError::UnknownSession(_) | StorefrontError::UnknownProduct(_) => {
                StatusCode::NOT_FOUND
            }
            StorefrontError::InvalidSessionId(_) => StatusCode::BAD_REQUEST,
            StorefrontError::CatalogNotReady => StatusCode::CONFLICT,
            StorefrontError::Catalog(_) => StatusCode::BAD_GATEWAY,
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

/// Body of an add-to-cart request.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    /// Catalog product to add.
    pub product_id: u32,
}

/// Search query string.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search text.
    #[serde(default)]
    pub q: String,
}

/// Health check handler - 200 when healthy, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    match state.health.report() {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, Json(HealthFailure::new(&e))).into_response()
        }
    }
}

/// Prometheus exposition handler.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.prometheus {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// List the catalog as product cards.
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductCardView>>, StorefrontError> {
    let catalog = state.storefront.catalog().load_catalog().await?;
    Ok(Json(catalog.iter().map(ProductCardView::from).collect()))
}

/// Open a session and return its first page once the catalog resolves.
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<PageView>), StorefrontError> {
    let id = state.storefront.start_session().await?;
    let page = state.storefront.page(id)?;
    Ok((StatusCode::CREATED, Json(page)))
}

/// Render a session's page.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PageView>, StorefrontError> {
    let id: SessionId = id.parse()?;
    Ok(Json(state.storefront.page(id)?))
}

/// Close a session.
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StorefrontError> {
    let id: SessionId = id.parse()?;
    state.storefront.close_session(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Render a session's cart.
pub async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CartView>, StorefrontError> {
    let id: SessionId = id.parse()?;
    Ok(Json(state.storefront.cart(id)?))
}

/// Add one line to a session's cart.
pub async fn add_cart_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>, StorefrontError> {
    let id: SessionId = id.parse()?;
    Ok(Json(state.storefront.add_to_cart(id, request.product_id)?))
}

/// Remove every line of a product from a session's cart.
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(String, u32)>,
) -> Result<Json<CartView>, StorefrontError> {
    let id: SessionId = id.parse()?;
    Ok(Json(state.storefront.remove_from_cart(id, product_id)?))
}

/// Search a session's catalog.
pub async fn search(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ProductCardView>>, StorefrontError> {
    let id: SessionId = id.parse()?;
    Ok(Json(state.storefront.search(id, &params.q)?))
}
