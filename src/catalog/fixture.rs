//! Built-in product catalog.

use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::error::CatalogError;

use super::provider::CatalogProvider;
use super::types::Product;

/// (id, name, price in cents, description, image, category)
const FIXTURE: [(u32, &str, i64, &str, &str, &str); 12] = [
    (
        1,
        "Wireless Noise-Canceling Headphones",
        29999,
        "Premium wireless headphones with active noise cancellation and 30-hour battery life",
        "/images/headphones.jpg",
        "Electronics",
    ),
    (
        2,
        "Smart Fitness Watch Pro",
        39999,
        "Advanced fitness tracking with heart rate monitoring and GPS",
        "/images/smartwatch.jpg",
        "Electronics",
    ),
    (
        3,
        "Professional Running Shoes",
        12999,
        "Lightweight performance running shoes with superior cushioning",
        "/images/shoes.jpg",
        "Sports",
    ),
    (
        4,
        "4K Ultra HD Smart TV",
        89999,
        "65-inch 4K Smart TV with HDR and built-in streaming apps",
        "/images/tv.jpg",
        "Electronics",
    ),
    (
        5,
        "Gaming Laptop RTX 4070",
        149999,
        "High-performance gaming laptop with RTX 4070 graphics",
        "/images/laptop.jpg",
        "Electronics",
    ),
    (
        6,
        "Wireless Bluetooth Speaker",
        8999,
        "Portable waterproof speaker with 360-degree sound",
        "/images/speaker.jpg",
        "Electronics",
    ),
    (
        7,
        "Yoga Mat Premium",
        4999,
        "Non-slip yoga mat with alignment lines and carrying strap",
        "/images/yoga-mat.jpg",
        "Sports",
    ),
    (
        8,
        "Coffee Maker Pro",
        19999,
        "Programmable coffee maker with built-in grinder",
        "/images/coffee-maker.jpg",
        "Home",
    ),
    (
        9,
        "Wireless Earbuds",
        15999,
        "True wireless earbuds with active noise cancellation",
        "/images/earbuds.jpg",
        "Electronics",
    ),
    (
        10,
        "Smart Home Hub",
        12999,
        "Central hub for controlling all your smart home devices",
        "/images/smart-hub.jpg",
        "Home",
    ),
    (
        11,
        "Dumbbell Set 20kg",
        7999,
        "Adjustable dumbbell set for home workouts",
        "/images/dumbbells.jpg",
        "Sports",
    ),
    (
        12,
        "Blender Professional",
        14999,
        "High-speed blender for smoothies and food processing",
        "/images/blender.jpg",
        "Home",
    ),
];

/// Build the fixture products in catalog order.
pub fn fixture_products() -> Result<Vec<Product>, CatalogError> {
    FIXTURE
        .iter()
        .map(|&(id, name, cents, description, image, category)| {
            Product::new(id, name, Decimal::new(cents, 2), description, image, category)
                .map_err(CatalogError::from)
        })
        .collect()
}

/// Static catalog source. Never fails.
#[derive(Debug, Clone, Default)]
pub struct FixtureCatalog {
    /// Simulated fetch latency.
    latency: Duration,
}

impl FixtureCatalog {
    /// Create a fixture catalog that resolves immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fixture catalog that waits before resolving.
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl CatalogProvider for FixtureCatalog {
    fn name(&self) -> &str {
        "fixture"
    }

    #[instrument(skip(self), fields(latency_ms = self.latency.as_millis() as u64))]
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let products = fixture_products()?;
        debug!(count = products.len(), "Fixture catalog loaded");
        Ok(products)
    }
}
