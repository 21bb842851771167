//! TechStore server entry point.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use techstore::api::{create_router, AppState};
use techstore::catalog::CatalogSource;
use techstore::config::Config;
use techstore::metrics::{self, MetricsCollector};
use techstore::storefront::Storefront;
use techstore::utils::{cpu_time_secs, resident_memory_bytes, shutdown_signal};

/// How often process resource gauges are reported.
const RESOURCE_REPORT_INTERVAL: Duration = Duration::from_secs(60);

/// How often idle sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// TechStore storefront server.
#[derive(Parser, Debug)]
#[command(name = "techstore")]
#[command(about = "Storefront API with per-session carts")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Load the configured catalog and print it.
    Catalog,

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging. Commands report configuration errors themselves.
    let mut log_config = Config::load().unwrap_or_default();
    log_config.verbose |= args.verbose;
    let filter = EnvFilter::try_new(log_config.log_directives())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Catalog) => cmd_catalog().await,
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        None => cmd_serve(args.port).await,
    }
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("TECHSTORE - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    println!("  Environment: {}", config.app_env);
    println!("  Version: {}", config.app_version);
    println!("  Graphite: {}", config.graphite_addr());
    println!("  Session TTL: {}s", config.session_ttl_secs);
    println!("  Log filter: {}", config.log_directives());
    match &config.catalog_url {
        Some(url) => println!("  Catalog: remote ({})", url),
        None => println!(
            "  Catalog: fixture ({}ms latency)",
            config.catalog_latency_ms
        ),
    }
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Load the catalog and print it.
async fn cmd_catalog() -> anyhow::Result<()> {
    let config = Config::load_validated()?;

    let source = CatalogSource::from_config(&config)?;
    let catalog = source.load_catalog().await?;

    println!("======================================================================");
    println!("TECHSTORE - CATALOG ({} products)", catalog.len());
    println!("======================================================================");
    for product in &catalog {
        println!(
            "  {:>3}  {:<28} {:>10}  {}{}",
            product.id(),
            product.name(),
            product.display_price(),
            product.category(),
            if product.is_premium() { "  [Premium]" } else { "" }
        );
    }
    println!("----------------------------------------------------------------------");
    println!("  Categories: {}", catalog.categories().join(", "));
    println!("======================================================================");

    Ok(())
}

/// Run the HTTP server until shutdown.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(port) = port_override {
        config.port = port;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("Configuration loaded successfully");
    info!("Environment: {}", config.app_env);
    info!("Version: {}", config.app_version);
    info!("Session TTL: {}s", config.session_ttl_secs);

    // Initialize metrics
    let prometheus = PrometheusBuilder::new().install_recorder()?;
    metrics::init_metrics();

    let catalog = CatalogSource::from_config(&config)?;
    let app_state = AppState::from_config(&config, catalog).with_prometheus(prometheus);

    let reporter = tokio::spawn(report_resources(app_state.metrics.clone()));
    let sweeper = tokio::spawn(evict_idle_sessions(app_state.storefront.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state);
    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    reporter.abort();
    sweeper.abort();
    if let Err(e) = &result {
        error!("HTTP server error: {}", e);
    }
    info!("Server stopped");

    Ok(result?)
}

/// Periodically report memory and CPU gauges.
async fn report_resources(metrics: MetricsCollector) {
    let mut interval = tokio::time::interval(RESOURCE_REPORT_INTERVAL);
    // First tick completes immediately.
    interval.tick().await;
    let mut last_cpu = cpu_time_secs();

    loop {
        interval.tick().await;

        match resident_memory_bytes() {
            Some(bytes) => metrics.record_memory_usage(bytes as f64),
            None => {
                warn!("Process resource stats unavailable, stopping reporter");
                return;
            }
        }

        let cpu = cpu_time_secs();
        if let (Some(prev), Some(now)) = (last_cpu, cpu) {
            let percent = (now - prev) / RESOURCE_REPORT_INTERVAL.as_secs_f64() * 100.0;
            metrics.record_cpu_usage(percent);
        }
        last_cpu = cpu;
    }
}

/// Periodically drop sessions that have gone idle.
async fn evict_idle_sessions(storefront: Storefront) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);

    loop {
        interval.tick().await;
        storefront.evict_idle(tokio::time::Instant::now());
    }
}
