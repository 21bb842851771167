//! HTTP API: health, metrics, catalog and per-session cart endpoints.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::{create_router, health_router};
