//! Health reporting.
//!
//! Subsystem probes are static in this service; the report still goes
//! through [`HealthProbe`] so a failing subsystem turns into a 503.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use strum::{Display, EnumString};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::HealthError;

/// Overall and per-subsystem status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HealthStatus {
    /// Serving normally.
    Healthy,
    /// Not serving.
    Unhealthy,
}

/// A subsystem check.
pub trait HealthProbe: Send + Sync + fmt::Debug {
    /// Key in the `checks` map.
    fn name(&self) -> &str;

    /// Run the check.
    fn check(&self) -> Result<HealthStatus, HealthError>;
}

/// Probe that always reports the same status.
#[derive(Debug, Clone)]
pub struct StaticProbe {
    name: String,
    status: HealthStatus,
}

impl StaticProbe {
    /// A probe that always reports healthy.
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Healthy,
        }
    }
}

impl HealthProbe for StaticProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<HealthStatus, HealthError> {
        Ok(self.status)
    }
}

/// Probe that always fails. Used to exercise the 503 path.
#[derive(Debug, Clone)]
pub struct FailingProbe {
    name: String,
    reason: String,
}

impl FailingProbe {
    /// Create a failing probe.
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl HealthProbe for FailingProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<HealthStatus, HealthError> {
        Err(HealthError::ProbeFailed {
            probe: self.name.clone(),
            reason: self.reason.clone(),
        })
    }
}

/// The built-in probes: database, redis and external services.
pub fn default_probes() -> Vec<Arc<dyn HealthProbe>> {
    ["database", "redis", "external_services"]
        .into_iter()
        .map(|name| Arc::new(StaticProbe::healthy(name)) as Arc<dyn HealthProbe>)
        .collect()
}

/// Successful health report.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// ISO-8601 timestamp.
    pub timestamp: String,
    /// Seconds since the service started.
    pub uptime: f64,
    pub environment: String,
    pub version: String,
    pub checks: BTreeMap<String, HealthStatus>,
}

/// Body returned when the health check itself fails.
#[derive(Debug, Clone, Serialize)]
pub struct HealthFailure {
    pub status: HealthStatus,
    pub timestamp: String,
    pub error: String,
}

impl HealthFailure {
    /// Build the failure body for an error.
    pub fn new(error: &HealthError) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            // Rfc3339 only fails for years outside 0..=9999
            timestamp: now_rfc3339().unwrap_or_default(),
            error: error.to_string(),
        }
    }
}

/// Static facts the report needs.
#[derive(Debug, Clone)]
pub struct HealthContext {
    pub started_at: Instant,
    pub environment: String,
    pub version: String,
    pub probes: Vec<Arc<dyn HealthProbe>>,
}

impl HealthContext {
    /// Context with the default probes, starting now.
    pub fn new(environment: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            started_at: Instant::now(),
            environment: environment.into(),
            version: version.into(),
            probes: default_probes(),
        }
    }

    /// Replace the probes.
    pub fn with_probes(mut self, probes: Vec<Arc<dyn HealthProbe>>) -> Self {
        self.probes = probes;
        self
    }

    /// Run every probe and assemble the report.
    pub fn report(&self) -> Result<HealthReport, HealthError> {
        let mut checks = BTreeMap::new();
        for probe in &self.probes {
            checks.insert(probe.name().to_string(), probe.check()?);
        }

        Ok(HealthReport {
            status: HealthStatus::Healthy,
            timestamp: now_rfc3339()?,
            uptime: self.started_at.elapsed().as_secs_f64(),
            environment: self.environment.clone(),
            version: self.version.clone(),
            checks,
        })
    }
}

fn now_rfc3339() -> Result<String, HealthError> {
    Ok(OffsetDateTime::now_utc().format(&Rfc3339)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_report_is_healthy() {
        let ctx = HealthContext::new("development", "0.1.0");
        let report = ctx.report().unwrap();

        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.environment, "development");
        assert_eq!(report.version, "0.1.0");
        assert_eq!(report.checks.len(), 3);
        assert!(report
            .checks
            .values()
            .all(|status| *status == HealthStatus::Healthy));
        assert!(report.uptime >= 0.0);
    }

    #[test]
    fn timestamp_is_rfc3339() {
        let report = HealthContext::new("test", "1").report().unwrap();
        assert!(OffsetDateTime::parse(&report.timestamp, &Rfc3339).is_ok());
    }

    #[test]
    fn failing_probe_fails_report() {
        let ctx = HealthContext::new("test", "1").with_probes(vec![
            Arc::new(StaticProbe::healthy("database")),
            Arc::new(FailingProbe::new("redis", "connection refused")),
        ]);

        let err = ctx.report().unwrap_err();
        assert_eq!(err.to_string(), "redis check failed: connection refused");

        let body = HealthFailure::new(&err);
        assert_eq!(body.status, HealthStatus::Unhealthy);
        assert_eq!(body.error, "redis check failed: connection refused");
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(HealthStatus::Unhealthy.to_string(), "unhealthy");
    }
}
