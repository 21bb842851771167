//! Unified error types for the storefront service.

use rust_decimal::Decimal;
use thiserror::Error;

/// Unified error type for the storefront service.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Catalog-related error.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Session/storefront error.
    #[error("storefront error: {0}")]
    Storefront(#[from] StorefrontError),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Product record validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// Prices are in major currency units and may not be negative.
    #[error("product {id} has negative price {price}")]
    NegativePrice {
        /// Offending product id.
        id: u32,
        /// Rejected price.
        price: Decimal,
    },

    /// Prices above the catalog ceiling are rejected.
    #[error("product {id} price {price} exceeds maximum {max}")]
    PriceTooLarge {
        /// Offending product id.
        id: u32,
        /// Rejected price.
        price: Decimal,
        /// Largest accepted price.
        max: Decimal,
    },
}

/// Catalog source errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog could not be fetched from its source.
    #[error("failed to fetch catalog from {source_name}: {reason}")]
    FetchFailed {
        /// The catalog source that failed (fixture, URL, mock).
        source_name: String,
        /// Reason for failure.
        reason: String,
    },

    /// Two products in one snapshot share an id.
    #[error("duplicate product id {0} in catalog")]
    DuplicateId(u32),

    /// A product record failed validation.
    #[error("invalid product: {0}")]
    InvalidProduct(#[from] ProductError),

    /// HTTP request failed.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised while serving a browsing session.
#[derive(Error, Debug)]
pub enum StorefrontError {
    /// No session with this id is open.
    #[error("session {0} not found")]
    UnknownSession(String),

    /// The session id could not be parsed.
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    /// The product is not part of the session's catalog.
    #[error("product {0} not found in catalog")]
    UnknownProduct(u32),

    /// The session's catalog is still loading or failed to load.
    #[error("catalog is not ready")]
    CatalogNotReady,

    /// The catalog fetch itself failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Health check failures.
#[derive(Error, Debug)]
pub enum HealthError {
    /// A subsystem probe reported a failure.
    #[error("{probe} check failed: {reason}")]
    ProbeFailed {
        /// Probe name.
        probe: String,
        /// Failure reason.
        reason: String,
    },

    /// The report timestamp could not be formatted.
    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, StoreError>;
