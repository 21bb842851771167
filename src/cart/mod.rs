//! Cart module: what a shopper has picked in one session.
//!
//! - [`CartStore`]: ordered lines, add/remove, change notifications
//! - [`CartLine`]: one product occurrence
//! - [`CartTotals`]: subtotal, 8% tax and total

pub mod line;
pub mod store;
pub mod totals;

pub use line::CartLine;
pub use store::{CartChange, CartStore, ChangeKind};
pub use totals::{round_money, CartTotals, TAX_RATE};
