//! Storefront: browsing sessions over the catalog and their carts.
//!
//! Each session loads the catalog once, then takes add/remove intents and
//! renders view records from its current cart snapshot. Sessions are
//! independent; one session's cart is never visible to another.

pub mod session;
pub mod views;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument};

use crate::cart::CartChange;
use crate::catalog::{CatalogProvider, CatalogSource};
use crate::error::StorefrontError;
use crate::metrics::{
    LatencyTimer, MetricsCollector, METRIC_CART_ADDS, METRIC_CART_REMOVES,
    METRIC_CATALOG_FETCH_FAILED, METRIC_CATALOG_FETCH_LATENCY, METRIC_SESSIONS_EXPIRED,
    METRIC_SESSIONS_OPENED,
};

pub use session::{CatalogState, Session, SessionId};
pub use views::{CartLineView, CartView, HeaderView, PageView, ProductCardView};

/// Idle time after which a session is evicted, unless configured otherwise.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Session registry plus the collaborators sessions need.
#[derive(Debug, Clone)]
pub struct Storefront {
    catalog: CatalogSource,
    metrics: MetricsCollector,
    sessions: Arc<DashMap<SessionId, Session>>,
    session_ttl: Duration,
}

impl Storefront {
    /// Create a storefront over a catalog source.
    pub fn new(catalog: CatalogSource, metrics: MetricsCollector) -> Self {
        Self {
            catalog,
            metrics,
            sessions: Arc::new(DashMap::new()),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Set how long a session may sit unused before eviction.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Idle time after which a session is evicted.
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// The catalog source.
    pub fn catalog(&self) -> &CatalogSource {
        &self.catalog
    }

    /// The metrics collector.
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Number of open sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Register a new session in the loading state.
    pub fn open_session(&self) -> SessionId {
        let id = SessionId::new();
        self.sessions.insert(id, Session::new(id));
        self.metrics.increment_one(METRIC_SESSIONS_OPENED);
        info!(session = %id, "Session opened");
        id
    }

    /// Fetch the catalog for a session and publish the result.
    ///
    /// A failed fetch is not an error here: it is logged and recorded on the
    /// session, whose page then shows an empty catalog.
    #[instrument(skip(self), fields(session = %id, source = self.catalog.name()))]
    pub async fn load_catalog(&self, id: SessionId) -> Result<(), StorefrontError> {
        if !self.sessions.contains_key(&id) {
            return Err(StorefrontError::UnknownSession(id.to_string()));
        }

        let timer = LatencyTimer::start();
        let result = self.catalog.load_catalog().await;
        self.metrics
            .timing(METRIC_CATALOG_FETCH_LATENCY, timer.elapsed_ms());

        let state = match result {
            Ok(catalog) => {
                debug!(products = catalog.len(), "Catalog ready");
                CatalogState::Ready(catalog)
            }
            Err(e) => {
                error!("Error fetching products: {}", e);
                self.metrics.increment_one(METRIC_CATALOG_FETCH_FAILED);
                CatalogState::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| StorefrontError::UnknownSession(id.to_string()))?;
        session.set_catalog(state);
        session.touch(Instant::now());
        Ok(())
    }

    /// Open a session and wait for its catalog.
    pub async fn start_session(&self) -> Result<SessionId, StorefrontError> {
        let id = self.open_session();
        self.load_catalog(id).await?;
        Ok(id)
    }

    /// Drop a session and its cart.
    pub fn close_session(&self, id: SessionId) -> Result<(), StorefrontError> {
        self.sessions
            .remove(&id)
            .map(|(_, mut session)| {
                session.clear_cart();
                info!(session = %id, "Session closed");
            })
            .ok_or_else(|| StorefrontError::UnknownSession(id.to_string()))
    }

    /// Drop every session unused for longer than the TTL at `now`.
    ///
    /// Returns how many sessions were evicted. Evicted carts are cleared so
    /// watchers see the final change.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let ttl = self.session_ttl;
        let mut evicted = 0;

        self.sessions.retain(|id, session| {
            if !session.is_idle(now, ttl) {
                return true;
            }
            session.clear_cart();
            debug!(session = %id, "Session expired");
            evicted += 1;
            false
        });

        if evicted > 0 {
            self.metrics
                .increment(METRIC_SESSIONS_EXPIRED, evicted as u64);
            info!(evicted, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Render the full page.
    pub fn page(&self, id: SessionId) -> Result<PageView, StorefrontError> {
        self.with_session(id, |session| PageView::from(session))
    }

    /// Render the cart sidebar.
    pub fn cart(&self, id: SessionId) -> Result<CartView, StorefrontError> {
        self.with_session(id, |session| CartView::from(session.cart()))
    }

    /// Add one line of a catalog product to the session's cart.
    #[instrument(skip(self), fields(session = %id))]
    pub fn add_to_cart(&self, id: SessionId, product_id: u32) -> Result<CartView, StorefrontError> {
        let view = self.with_session_mut(id, |session| {
            session.add_to_cart(product_id)?;
            Ok(CartView::from(session.cart()))
        })?;
        self.metrics.increment_one(METRIC_CART_ADDS);
        Ok(view)
    }

    /// Remove every line of a product from the session's cart.
    #[instrument(skip(self), fields(session = %id))]
    pub fn remove_from_cart(
        &self,
        id: SessionId,
        product_id: u32,
    ) -> Result<CartView, StorefrontError> {
        let view = self.with_session_mut(id, |session| {
            let removed = session.remove_from_cart(product_id);
            debug!(removed, "Cart lines removed");
            Ok(CartView::from(session.cart()))
        })?;
        self.metrics.increment_one(METRIC_CART_REMOVES);
        Ok(view)
    }

    /// Search the session's catalog.
    pub fn search(
        &self,
        id: SessionId,
        query: &str,
    ) -> Result<Vec<ProductCardView>, StorefrontError> {
        self.with_session(id, |session| {
            session
                .catalog()
                .catalog()
                .map(|catalog| {
                    catalog
                        .search(query)
                        .into_iter()
                        .map(ProductCardView::from)
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// Watch a session's cart for changes.
    pub fn subscribe(&self, id: SessionId) -> Result<watch::Receiver<CartChange>, StorefrontError> {
        self.with_session(id, |session| session.cart().subscribe())
    }

    fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&Session) -> T,
    ) -> Result<T, StorefrontError> {
        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| StorefrontError::UnknownSession(id.to_string()))?;
        session.touch(Instant::now());
        Ok(f(session.value()))
    }

    fn with_session_mut<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut Session) -> Result<T, StorefrontError>,
    ) -> Result<T, StorefrontError> {
        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| StorefrontError::UnknownSession(id.to_string()))?;
        session.touch(Instant::now());
        f(session.value_mut())
    }
}
