//! Mock catalog source for unit testing.
//!
//! Serves a configurable product list without touching the network, with
//! optional latency and forced failure.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::CatalogError;

use super::fixture::fixture_products;
use super::provider::CatalogProvider;
use super::types::Product;

/// Configuration for mock catalog behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Whether to fail every fetch.
    pub fail: bool,
    /// Failure reason reported when `fail` is set.
    pub failure_reason: Option<String>,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// Mock catalog for testing.
#[derive(Debug, Clone)]
pub struct MockCatalog {
    /// Mock configuration.
    config: MockConfig,
    /// Products to serve.
    products: Arc<Mutex<Vec<Product>>>,
    /// Number of fetches served, failed ones included.
    calls: Arc<Mutex<u32>>,
}

impl MockCatalog {
    /// Create a mock serving the built-in fixture.
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create a mock with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            products: Arc::new(Mutex::new(fixture_products().unwrap_or_default())),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Create a mock that fails every fetch.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_config(MockConfig {
            fail: true,
            failure_reason: Some(reason.into()),
            latency_ms: 0,
        })
    }

    /// Replace the served products.
    pub fn set_products(&self, products: Vec<Product>) {
        if let Ok(mut current) = self.products.lock() {
            *current = products;
        }
    }

    /// Number of fetches made so far.
    pub fn calls(&self) -> u32 {
        self.calls.lock().map(|c| *c).unwrap_or(0)
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalog {
    fn record_call(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
    }
}

impl CatalogProvider for MockCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.record_call();

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.fail {
            return Err(CatalogError::FetchFailed {
                source_name: "mock".to_string(),
                reason: self
                    .config
                    .failure_reason
                    .clone()
                    .unwrap_or_else(|| "Mock catalog failure".to_string()),
            });
        }

        let products = self
            .products
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default();
        Ok(products)
    }
}
