//! Graphite-style metrics collector.
//!
//! The collector formats plaintext-protocol lines
//! (`ecommerce.<metric> <value> <unix-seconds>`) and hands them to a
//! [`MetricsSink`]. Nothing is sent over the network: the default sink writes
//! the line to the log in development mode. Every value is also mirrored to
//! the `metrics` facade so a Prometheus recorder can expose it.
//!
//! One collector is built at startup from [`Config`] and shared through the
//! application state.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use strum::{Display, EnumString};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::config::Config;

/// Prefix applied to every metric line.
pub const METRIC_PREFIX: &str = "ecommerce";

// === Metric Name Constants ===

/// Sessions opened counter metric name.
pub const METRIC_SESSIONS_OPENED: &str = "sessions.opened";
/// Idle sessions evicted counter metric name.
pub const METRIC_SESSIONS_EXPIRED: &str = "sessions.expired";
/// Cart add counter metric name.
pub const METRIC_CART_ADDS: &str = "cart.add";
/// Cart remove counter metric name.
pub const METRIC_CART_REMOVES: &str = "cart.remove";
/// Catalog fetch failure counter metric name.
pub const METRIC_CATALOG_FETCH_FAILED: &str = "catalog.fetch_failed";
/// Catalog fetch latency metric name.
pub const METRIC_CATALOG_FETCH_LATENCY: &str = "catalog.fetch";
/// Memory usage gauge metric name.
pub const METRIC_MEMORY_USAGE: &str = "memory.usage";
/// CPU usage gauge metric name.
pub const METRIC_CPU_USAGE: &str = "cpu.usage";

/// Metric type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum MetricKind {
    /// Counter.
    #[strum(serialize = "c")]
    Counter,
    /// Gauge.
    #[strum(serialize = "g")]
    Gauge,
    /// Timing in milliseconds.
    #[strum(serialize = "ms")]
    Timing,
}

/// One formatted metric sample.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricLine {
    /// Metric name without the prefix.
    pub name: String,
    /// Sample value.
    pub value: f64,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    /// Type tag.
    pub kind: MetricKind,
}

impl MetricLine {
    /// Fully qualified metric path.
    pub fn path(&self) -> String {
        format!("{}.{}", METRIC_PREFIX, self.name)
    }
}

impl fmt::Display for MetricLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.path(), self.value, self.timestamp)
    }
}

/// Destination for formatted metric lines.
pub trait MetricsSink: Send + Sync + fmt::Debug {
    /// Accept one line.
    fn emit(&self, line: &MetricLine);
}

/// Writes lines to the log when enabled.
#[derive(Debug, Clone, Copy)]
pub struct LogSink {
    enabled: bool,
}

impl LogSink {
    /// Create a sink that logs only when `enabled`.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl MetricsSink for LogSink {
    fn emit(&self, line: &MetricLine) {
        if self.enabled {
            info!(kind = %line.kind, "[METRIC] {}", line);
        }
    }
}

/// Keeps every line in memory. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<MetricLine>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines recorded so far.
    pub fn lines(&self) -> Vec<MetricLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Lines whose name matches exactly.
    pub fn named(&self, name: &str) -> Vec<MetricLine> {
        self.lines()
            .into_iter()
            .filter(|line| line.name == name)
            .collect()
    }
}

impl MetricsSink for RecordingSink {
    fn emit(&self, line: &MetricLine) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.clone());
        }
    }
}

/// Metrics collector addressed at a Graphite endpoint.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    host: String,
    port: u16,
    sink: Arc<dyn MetricsSink>,
}

impl MetricsCollector {
    /// Create a collector with an explicit sink.
    pub fn new(host: impl Into<String>, port: u16, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            host: host.into(),
            port,
            sink,
        }
    }

    /// Create the process collector from configuration.
    pub fn from_config(config: &Config) -> Self {
        debug!(
            target_addr = %config.graphite_addr(),
            log_lines = config.is_development(),
            "Metrics collector initialized"
        );
        Self::new(
            config.graphite_host.clone(),
            config.graphite_port,
            Arc::new(LogSink::new(config.is_development())),
        )
    }

    /// Graphite host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Graphite port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Add `value` to a counter.
    pub fn increment(&self, metric: &str, value: u64) {
        counter!(metric.to_string()).increment(value);
        self.send(metric, value as f64, MetricKind::Counter);
    }

    /// Add one to a counter.
    pub fn increment_one(&self, metric: &str) {
        self.increment(metric, 1);
    }

    /// Set a gauge.
    pub fn gauge(&self, metric: &str, value: f64) {
        gauge!(metric.to_string()).set(value);
        self.send(metric, value, MetricKind::Gauge);
    }

    /// Record a timing in milliseconds.
    pub fn timing(&self, metric: &str, value: f64) {
        histogram!(metric.to_string()).record(value);
        self.send(metric, value, MetricKind::Timing);
    }

    /// Record how long a request to `path` took.
    pub fn record_request_time(&self, path: &str, duration: Duration) {
        let ms = duration.as_secs_f64() * 1000.0;
        self.timing(&format!("requests.{}", dotted(path)), ms);
    }

    /// Count an error served on `path`.
    pub fn record_error(&self, path: &str) {
        self.increment_one(&format!("errors.{}", dotted(path)));
    }

    /// Report memory usage.
    pub fn record_memory_usage(&self, usage: f64) {
        self.gauge(METRIC_MEMORY_USAGE, usage);
    }

    /// Report CPU usage.
    pub fn record_cpu_usage(&self, usage: f64) {
        self.gauge(METRIC_CPU_USAGE, usage);
    }

    fn send(&self, metric: &str, value: f64, kind: MetricKind) {
        let line = MetricLine {
            name: metric.to_string(),
            value,
            timestamp: OffsetDateTime::now_utc().unix_timestamp(),
            kind,
        };
        self.sink.emit(&line);
    }
}

/// Turn a URL path into metric path segments.
fn dotted(path: &str) -> String {
    path.replace('/', ".")
}

/// Register descriptions for the fixed metric names.
/// Call this once at startup.
pub fn init_metrics() {
    describe_counter!(METRIC_SESSIONS_OPENED, "Total browsing sessions opened");
    describe_counter!(METRIC_SESSIONS_EXPIRED, "Total idle sessions evicted");
    describe_counter!(METRIC_CART_ADDS, "Total cart lines added");
    describe_counter!(METRIC_CART_REMOVES, "Total cart remove requests");
    describe_counter!(
        METRIC_CATALOG_FETCH_FAILED,
        "Total catalog fetches that failed"
    );
    describe_histogram!(
        METRIC_CATALOG_FETCH_LATENCY,
        "Catalog fetch latency in milliseconds"
    );
    describe_gauge!(METRIC_MEMORY_USAGE, "Process memory usage");
    describe_gauge!(METRIC_CPU_USAGE, "Process CPU usage");

    debug!("Metrics initialized");
}

/// Measures elapsed time for a timing metric.
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    /// Start timing now.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::thread::sleep;

    fn recording() -> (MetricsCollector, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let collector = MetricsCollector::new("localhost", 2003, sink.clone());
        (collector, sink)
    }

    #[test]
    fn line_format_matches_graphite_plaintext() {
        let line = MetricLine {
            name: "cart.add".to_string(),
            value: 1.0,
            timestamp: 1_700_000_000,
            kind: MetricKind::Counter,
        };
        assert_eq!(line.to_string(), "ecommerce.cart.add 1 1700000000");

        let line = MetricLine {
            name: "cpu.usage".to_string(),
            value: 12.5,
            timestamp: 1_700_000_000,
            kind: MetricKind::Gauge,
        };
        assert_eq!(line.to_string(), "ecommerce.cpu.usage 12.5 1700000000");
    }

    #[test]
    fn kind_tags() {
        assert_eq!(MetricKind::Counter.to_string(), "c");
        assert_eq!(MetricKind::Gauge.to_string(), "g");
        assert_eq!(MetricKind::Timing.to_string(), "ms");
        assert_eq!(MetricKind::from_str("ms").unwrap(), MetricKind::Timing);
    }

    #[test]
    fn increment_defaults_to_one() {
        let (collector, sink) = recording();
        collector.increment_one("orders");
        collector.increment("orders", 3);

        let lines = sink.named("orders");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].value, 1.0);
        assert_eq!(lines[1].value, 3.0);
        assert!(lines.iter().all(|l| l.kind == MetricKind::Counter));
    }

    #[test]
    fn request_paths_become_dotted_names() {
        let (collector, sink) = recording();
        collector.record_request_time("/api/cart", Duration::from_millis(42));
        collector.record_error("/api/cart");

        let lines = sink.lines();
        assert_eq!(lines[0].name, "requests..api.cart");
        assert_eq!(lines[0].kind, MetricKind::Timing);
        assert!((lines[0].value - 42.0).abs() < 1e-6);
        assert_eq!(lines[1].name, "errors..api.cart");
        assert_eq!(lines[1].kind, MetricKind::Counter);
    }

    #[test]
    fn resource_gauges() {
        let (collector, sink) = recording();
        collector.record_memory_usage(512.0);
        collector.record_cpu_usage(0.25);

        assert_eq!(sink.named(METRIC_MEMORY_USAGE)[0].kind, MetricKind::Gauge);
        assert_eq!(sink.named(METRIC_CPU_USAGE)[0].value, 0.25);
    }

    #[test]
    fn from_config_reads_graphite_target() {
        let config = Config {
            graphite_host: "graphite.local".to_string(),
            graphite_port: 2013,
            ..Config::default()
        };
        let collector = MetricsCollector::from_config(&config);
        assert_eq!(collector.host(), "graphite.local");
        assert_eq!(collector.port(), 2013);
    }

    #[test]
    fn latency_timer_measures_time() {
        let timer = LatencyTimer::start();
        sleep(Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 9.0);
    }
}
