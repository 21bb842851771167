//! Application configuration loaded from environment variables.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, StoreError};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,

    // === Deployment ===
    /// Deployment environment reported by the health check.
    #[serde(default = "default_app_env")]
    pub app_env: String,

    /// Version reported by the health check.
    #[serde(default = "default_app_version")]
    pub app_version: String,

    // === Metrics ===
    /// Graphite host the metric lines are addressed to.
    #[serde(default = "default_graphite_host")]
    pub graphite_host: String,

    /// Graphite plaintext protocol port.
    #[serde(default = "default_graphite_port")]
    pub graphite_port: u16,

    // === Catalog ===
    /// Remote catalog URL. The built-in fixture is used when unset.
    #[serde(default)]
    pub catalog_url: Option<String>,

    /// Simulated latency of the fixture catalog, in milliseconds.
    #[serde(default)]
    pub catalog_latency_ms: u64,

    /// Request timeout for the remote catalog.
    #[serde(default = "default_catalog_timeout")]
    pub catalog_timeout_secs: u64,

    // === Sessions ===
    /// Idle seconds after which a browsing session and its cart are dropped.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_graphite_host() -> String {
    "localhost".to_string()
}

fn default_graphite_port() -> u16 {
    2003
}

fn default_catalog_timeout() -> u64 {
    10
}

fn default_session_ttl() -> u64 {
    1800
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
            app_env: default_app_env(),
            app_version: default_app_version(),
            graphite_host: default_graphite_host(),
            graphite_port: default_graphite_port(),
            catalog_url: None,
            catalog_latency_ms: 0,
            catalog_timeout_secs: default_catalog_timeout(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> std::result::Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Load and validate in one step.
    pub fn load_validated() -> Result<Self> {
        let config = Self::load()?;
        config.validate().map_err(StoreError::InvalidConfig)?;
        Ok(config)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        if self.graphite_host.trim().is_empty() {
            return Err("GRAPHITE_HOST must not be empty".to_string());
        }

        if self.graphite_port == 0 {
            return Err("GRAPHITE_PORT must be non-zero".to_string());
        }

        if self.session_ttl_secs == 0 {
            return Err("SESSION_TTL_SECS must be non-zero".to_string());
        }

        if let Some(url) = &self.catalog_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err("CATALOG_URL must be an http(s) URL".to_string());
            }
        }

        Ok(())
    }

    /// Whether the service runs in development mode.
    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("development")
    }

    /// Tracing filter directives: crate debug logging when verbose, else
    /// `RUST_LOG`.
    pub fn log_directives(&self) -> String {
        if self.verbose {
            "techstore=debug,info".to_string()
        } else {
            self.rust_log.clone()
        }
    }

    /// Session idle timeout.
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Graphite target as `host:port`.
    pub fn graphite_addr(&self) -> String {
        format!("{}:{}", self.graphite_host, self.graphite_port)
    }
}
