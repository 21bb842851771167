//! Product and catalog snapshot types.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::round_money;
use crate::error::{CatalogError, ProductError};

/// Products priced above this get a "Premium" badge.
pub const PREMIUM_THRESHOLD: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Highest accepted product price (1,000,000.00).
pub const MAX_PRICE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 2);

/// An immutable catalog entry.
///
/// Construction goes through [`Product::new`] or serde, both of which reject
/// a price below zero or above [`MAX_PRICE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord")]
pub struct Product {
    id: u32,
    name: String,
    price: Decimal,
    description: String,
    image: String,
    category: String,
}

/// Unvalidated product payload as it arrives from a catalog source.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    /// Product id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Price in major units.
    pub price: Decimal,
    /// Display description.
    #[serde(default)]
    pub description: String,
    /// Media reference.
    #[serde(default)]
    pub image: String,
    /// Display category.
    #[serde(default)]
    pub category: String,
}

impl TryFrom<ProductRecord> for Product {
    type Error = ProductError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        Product::new(
            record.id,
            record.name,
            record.price,
            record.description,
            record.image,
            record.category,
        )
    }
}

impl Product {
    /// Create a validated product.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        price: Decimal,
        description: impl Into<String>,
        image: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Self, ProductError> {
        if price < Decimal::ZERO {
            return Err(ProductError::NegativePrice { id, price });
        }
        if price > MAX_PRICE {
            return Err(ProductError::PriceTooLarge {
                id,
                price,
                max: MAX_PRICE,
            });
        }

        Ok(Self {
            id,
            name: name.into(),
            price,
            description: description.into(),
            image: image.into(),
            category: category.into(),
        })
    }

    /// Catalog-assigned identifier.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price in major units.
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Display description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Opaque media reference.
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Display category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether the product card shows the "Premium" badge.
    pub fn is_premium(&self) -> bool {
        self.price > PREMIUM_THRESHOLD
    }

    /// Price formatted for display, e.g. `$299.99`.
    pub fn display_price(&self) -> String {
        format_money(self.price)
    }

    /// Case-insensitive match against name, description and category.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [&self.name, &self.description, &self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Format an amount as dollars, rounded to cents.
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", round_money(amount))
}

/// Validated catalog snapshot: insertion order, unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a snapshot, rejecting duplicate ids.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id()) {
                return Err(CatalogError::DuplicateId(product.id()));
            }
        }

        Ok(Self { products })
    }

    /// Look up a product by id.
    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }

    /// Products in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Iterate products in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for product in &self.products {
            if !categories.contains(&product.category()) {
                categories.push(product.category());
            }
        }
        categories
    }

    /// Products matching a search query, in catalog order.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        self.products.iter().filter(|p| p.matches(query)).collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}
