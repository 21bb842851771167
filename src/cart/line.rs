//! Cart lines.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::Product;

/// One occurrence of a product in the cart.
///
/// Each add creates its own line; the same product may appear on several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    product: Product,
}

impl CartLine {
    /// Wrap a product copy.
    pub fn new(product: Product) -> Self {
        Self { product }
    }

    /// The product frozen on this line.
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Id of the underlying product.
    pub fn product_id(&self) -> u32 {
        self.product.id()
    }

    /// Line price.
    pub fn price(&self) -> Decimal {
        self.product.price()
    }
}

impl From<Product> for CartLine {
    fn from(product: Product) -> Self {
        Self::new(product)
    }
}
