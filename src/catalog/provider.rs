//! Catalog provider contract and runtime source selection.

use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::error::CatalogError;

use super::fixture::FixtureCatalog;
use super::mock::MockCatalog;
use super::remote::RemoteCatalog;
use super::types::{Catalog, Product};

/// A source of products.
///
/// The fixture never fails, but callers must handle `Err` because a remote
/// source can.
#[allow(async_fn_in_trait)]
pub trait CatalogProvider {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// List available products in catalog order.
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError>;
}

/// Catalog source selected at startup.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// Built-in fixture.
    Fixture(FixtureCatalog),
    /// JSON over HTTP.
    Remote(RemoteCatalog),
    /// Test double.
    Mock(MockCatalog),
}

impl CatalogSource {
    /// Pick the source described by the configuration.
    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        match &config.catalog_url {
            Some(url) => {
                info!("Using remote catalog at {}", url);
                let remote =
                    RemoteCatalog::new(url.clone(), Duration::from_secs(config.catalog_timeout_secs))?;
                Ok(Self::Remote(remote))
            }
            None => {
                info!("Using built-in fixture catalog");
                Ok(Self::Fixture(FixtureCatalog::with_latency(
                    Duration::from_millis(config.catalog_latency_ms),
                )))
            }
        }
    }

    /// List products and validate them into a snapshot.
    pub async fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        let products = self.list_products().await?;
        Catalog::new(products)
    }
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self::Fixture(FixtureCatalog::new())
    }
}

impl From<MockCatalog> for CatalogSource {
    fn from(mock: MockCatalog) -> Self {
        Self::Mock(mock)
    }
}

impl CatalogProvider for CatalogSource {
    fn name(&self) -> &str {
        match self {
            Self::Fixture(p) => p.name(),
            Self::Remote(p) => p.name(),
            Self::Mock(p) => p.name(),
        }
    }

    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        match self {
            Self::Fixture(p) => p.list_products().await,
            Self::Remote(p) => p.list_products().await,
            Self::Mock(p) => p.list_products().await,
        }
    }
}
