//! Browsing sessions.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::cart::CartStore;
use crate::catalog::{Catalog, Product};
use crate::error::StorefrontError;

/// Opaque browsing session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| StorefrontError::InvalidSessionId(s.to_string()))
    }
}

/// Where a session's catalog fetch stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogState {
    /// Fetch in flight; nothing is shown yet.
    Loading,
    /// Fetch resolved.
    Ready(Catalog),
    /// Fetch failed; the page shows an empty catalog.
    Failed {
        /// Why the fetch failed.
        reason: String,
    },
}

impl CatalogState {
    /// Whether the fetch is still in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The catalog, once loaded.
    pub fn catalog(&self) -> Option<&Catalog> {
        match self {
            Self::Ready(catalog) => Some(catalog),
            _ => None,
        }
    }

    /// Products to show. Empty unless loaded.
    pub fn products(&self) -> &[Product] {
        self.catalog().map(Catalog::products).unwrap_or(&[])
    }

    /// Failure reason, if the fetch failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// One shopper's session: a catalog snapshot and a cart.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    catalog: CatalogState,
    cart: CartStore,
    last_seen: Instant,
}

impl Session {
    /// Start a session whose catalog is still loading.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            catalog: CatalogState::Loading,
            cart: CartStore::new(),
            last_seen: Instant::now(),
        }
    }

    /// Session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Catalog state.
    pub fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    /// Publish the fetch result.
    pub fn set_catalog(&mut self, state: CatalogState) {
        self.catalog = state;
    }

    /// Cart, read-only.
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Last time the session was used.
    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    /// Mark the session as used at `now`.
    pub fn touch(&mut self, now: Instant) {
        self.last_seen = self.last_seen.max(now);
    }

    /// Whether the session has been unused for longer than `ttl` at `now`.
    pub fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > ttl
    }

    /// Put one line of `product_id` in the cart.
    pub fn add_to_cart(&mut self, product_id: u32) -> Result<(), StorefrontError> {
        let catalog = self
            .catalog
            .catalog()
            .ok_or(StorefrontError::CatalogNotReady)?;
        let product = catalog
            .get(product_id)
            .cloned()
            .ok_or(StorefrontError::UnknownProduct(product_id))?;

        self.cart.add_item(product);
        Ok(())
    }

    /// Take every line of `product_id` out of the cart.
    pub fn remove_from_cart(&mut self, product_id: u32) -> usize {
        self.cart.remove_item(product_id)
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }
}
