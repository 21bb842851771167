//! Catalog module: the products a shopper can browse.
//!
//! This module handles:
//! - Product and catalog snapshot types
//! - The built-in fixture catalog
//! - An HTTP-backed catalog source
//! - Mock source for testing

pub mod fixture;
pub mod mock;
pub mod provider;
pub mod remote;
pub mod types;

pub use fixture::{fixture_products, FixtureCatalog};
pub use mock::{MockCatalog, MockConfig};
pub use provider::{CatalogProvider, CatalogSource};
pub use remote::RemoteCatalog;
pub use types::{format_money, Catalog, Product, ProductRecord, MAX_PRICE, PREMIUM_THRESHOLD};
