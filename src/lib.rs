//! TechStore: a small storefront service.
//!
//! Shoppers open a browsing session, the session loads the product catalog
//! once, and every add/remove intent updates that session's cart. Cart
//! totals are computed from the lines in the cart:
//!
//! ```text
//! Subtotal:  $15.00
//! Tax (8%):   $1.20
//! ─────────────────
//! Total:     $16.20
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`catalog`]: Products, catalog providers and the built-in fixture
//! - [`cart`]: Cart store and money arithmetic
//! - [`storefront`]: Browsing sessions and their view records
//! - [`health`]: Health report for the `/health` endpoint
//! - [`metrics`]: Graphite-style metrics collector
//! - [`api`]: HTTP API
//! - [`utils`]: Utility functions

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod storefront;
pub mod utils;

pub use config::Config;
pub use error::{Result, StoreError};
