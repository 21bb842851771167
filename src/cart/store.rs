//! Session-scoped cart state.

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::catalog::Product;

use super::line::CartLine;
use super::totals::CartTotals;

/// What the last cart mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeKind {
    /// No mutation yet.
    Created,
    /// One line was appended.
    Added {
        /// Product on the new line.
        product_id: u32,
    },
    /// Every line of a product was removed.
    Removed {
        /// Product removed.
        product_id: u32,
        /// Lines removed (possibly zero).
        count: usize,
    },
    /// The cart was emptied.
    Cleared,
}

/// Change notification published after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartChange {
    /// Monotonic mutation counter, starting at 0.
    pub revision: u64,
    /// The mutation.
    pub kind: ChangeKind,
}

/// Ordered cart lines with derived totals.
///
/// Mutations are synchronous, so a reader always sees the state either before
/// or after a call, never in between.
#[derive(Debug)]
pub struct CartStore {
    lines: Vec<CartLine>,
    revision: u64,
    changes: watch::Sender<CartChange>,
}

impl CartStore {
    /// Create an empty cart.
    pub fn new() -> Self {
        let (changes, _) = watch::channel(CartChange {
            revision: 0,
            kind: ChangeKind::Created,
        });

        Self {
            lines: Vec::new(),
            revision: 0,
            changes,
        }
    }

    /// Append a new line for `product`.
    pub fn add_item(&mut self, product: Product) {
        let product_id = product.id();
        self.lines.push(CartLine::new(product));
        debug!(product_id, lines = self.lines.len(), "Added cart line");
        self.notify(ChangeKind::Added { product_id });
    }

    /// Remove every line holding `product_id`; returns how many were removed.
    ///
    /// Removing an id that is not in the cart is a no-op returning 0.
    pub fn remove_item(&mut self, product_id: u32) -> usize {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id() != product_id);
        let count = before - self.lines.len();
        debug!(product_id, count, lines = self.lines.len(), "Removed cart lines");
        self.notify(ChangeKind::Removed { product_id, count });
        count
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.notify(ChangeKind::Cleared);
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// How many lines hold `product_id`.
    pub fn count_of(&self, product_id: u32) -> usize {
        self.lines
            .iter()
            .filter(|line| line.product_id() == product_id)
            .count()
    }

    /// Exact sum of line prices.
    pub fn subtotal(&self) -> Decimal {
        self.totals().subtotal
    }

    /// Tax on the subtotal, rounded to cents.
    pub fn tax(&self) -> Decimal {
        self.totals().tax
    }

    /// Subtotal plus tax, rounded to cents.
    pub fn total(&self) -> Decimal {
        self.totals().total
    }

    /// All derived figures at once.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from_prices(self.lines.iter().map(CartLine::price))
    }

    /// Current revision.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> watch::Receiver<CartChange> {
        self.changes.subscribe()
    }

    fn notify(&mut self, kind: ChangeKind) {
        self.revision += 1;
        // send_replace succeeds even with no live receivers
        self.changes.send_replace(CartChange {
            revision: self.revision,
            kind,
        });
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}
