//! HTTP catalog source.

use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::error::CatalogError;

use super::provider::CatalogProvider;
use super::types::{Product, ProductRecord};

/// Catalog fetched as a JSON array of products from a URL.
#[derive(Debug, Clone)]
pub struct RemoteCatalog {
    /// HTTP client for catalog requests.
    http: reqwest::Client,
    /// Catalog endpoint.
    url: String,
}

impl RemoteCatalog {
    /// Create a remote catalog client with the given request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(2))
            .build()?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }

    fn fetch_failed(&self, reason: impl Into<String>) -> CatalogError {
        CatalogError::FetchFailed {
            source_name: self.url.clone(),
            reason: reason.into(),
        }
    }
}

impl CatalogProvider for RemoteCatalog {
    fn name(&self) -> &str {
        "remote"
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.fetch_failed(e.to_string()))?;

        if !response.status().is_success() {
            warn!("Catalog request returned {}", response.status());
            return Err(self.fetch_failed(format!("HTTP {}", response.status())));
        }

        let records: Vec<ProductRecord> = response
            .json()
            .await
            .map_err(|e| self.fetch_failed(format!("Failed to parse catalog: {}", e)))?;

        let products = records
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = products.len(), "Remote catalog loaded");
        Ok(products)
    }
}
