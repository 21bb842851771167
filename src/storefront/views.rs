//! View records derived from session state.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::{CartLine, CartStore};
use crate::catalog::{format_money, Product};

use super::session::Session;

/// Store name shown in the header.
pub const STORE_NAME: &str = "TechStore";

/// Header navigation entries.
pub const NAV_LINKS: [&str; 4] = ["Home", "Products", "Categories", "About"];

/// Header bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    /// Store name.
    pub store_name: &'static str,
    /// Navigation entries.
    pub nav: Vec<&'static str>,
    /// Cart badge count (lines in cart).
    pub cart_count: usize,
}

impl HeaderView {
    /// Build the header for a cart.
    pub fn new(cart: &CartStore) -> Self {
        Self {
            store_name: STORE_NAME,
            nav: NAV_LINKS.to_vec(),
            cart_count: cart.len(),
        }
    }
}

/// Product card in the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCardView {
    /// Catalog product id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Media reference.
    pub image: String,
    /// Category label.
    pub category: String,
    /// Exact price.
    pub price: Decimal,
    /// Price formatted to cents, e.g. `$49.99`.
    pub display_price: String,
    /// Whether the "Premium" badge is shown.
    pub premium: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            image: product.image().to_string(),
            category: product.category().to_string(),
            price: product.price(),
            display_price: product.display_price(),
            premium: product.is_premium(),
        }
    }
}

/// One row in the cart sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineView {
    /// Zero-based position; rows of the same product differ only by this.
    pub position: usize,
    /// Product on this line.
    pub product_id: u32,
    /// Product name.
    pub name: String,
    /// Product category.
    pub category: String,
    /// Exact line price.
    pub price: Decimal,
    /// Line price formatted to cents.
    pub display_price: String,
}

impl CartLineView {
    fn new(position: usize, line: &CartLine) -> Self {
        let product = line.product();
        Self {
            position,
            product_id: product.id(),
            name: product.name().to_string(),
            category: product.category().to_string(),
            price: product.price(),
            display_price: product.display_price(),
        }
    }
}

/// Cart sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    /// Lines in insertion order.
    pub lines: Vec<CartLineView>,
    /// Number of lines.
    pub item_count: usize,
    /// Whether the "cart is empty" state is shown.
    pub empty: bool,
    /// Exact sum of line prices.
    pub subtotal: Decimal,
    /// Tax rounded to cents.
    pub tax: Decimal,
    /// Total rounded to cents.
    pub total: Decimal,
    /// Subtotal formatted to cents.
    pub display_subtotal: String,
    /// Tax formatted to cents.
    pub display_tax: String,
    /// Total formatted to cents.
    pub display_total: String,
    /// Shipping is always free.
    pub shipping: &'static str,
    /// Cart revision this view was rendered from.
    pub revision: u64,
}

impl From<&CartStore> for CartView {
    fn from(cart: &CartStore) -> Self {
        let totals = cart.totals();
        Self {
            lines: cart
                .lines()
                .iter()
                .enumerate()
                .map(|(i, line)| CartLineView::new(i, line))
                .collect(),
            item_count: cart.len(),
            empty: cart.is_empty(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            display_subtotal: format_money(totals.subtotal),
            display_tax: format_money(totals.tax),
            display_total: format_money(totals.total),
            shipping: "Free",
            revision: cart.revision(),
        }
    }
}

/// Whole storefront page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    /// Session this page belongs to.
    pub session_id: String,
    /// True until the catalog fetch resolves.
    pub loading: bool,
    /// Header bar.
    pub header: HeaderView,
    /// Number of products shown.
    pub product_count: usize,
    /// Product grid, empty while loading or after a failed fetch.
    pub products: Vec<ProductCardView>,
    /// Cart sidebar.
    pub cart: CartView,
    /// Set when the catalog fetch failed.
    pub catalog_error: Option<String>,
}

impl From<&Session> for PageView {
    fn from(session: &Session) -> Self {
        let products: Vec<ProductCardView> = session
            .catalog()
            .products()
            .iter()
            .map(ProductCardView::from)
            .collect();

        Self {
            session_id: session.id().to_string(),
            loading: session.catalog().is_loading(),
            header: HeaderView::new(session.cart()),
            product_count: products.len(),
            products,
            cart: CartView::from(session.cart()),
            catalog_error: session.catalog().error().map(str::to_string),
        }
    }
}
