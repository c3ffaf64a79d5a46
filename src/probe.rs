//! Database-backed health probe.
//!
//! Each evaluation runs one liveness query against the persistence dependency and
//! builds a [`HealthReport`] from the outcome. Nothing is cached between calls: the
//! timestamp, uptime, and database state are all computed fresh.
//!
//! The report is binary. Either the query succeeded and the service is healthy, or
//! it failed (for any reason, including an expired bound) and the service is
//! unhealthy with the failure message attached.

use std::time::Duration;

use axum::http::StatusCode;
use chrono::SecondsFormat;
use serde::Serialize;

use crate::clock::Clock;
use crate::config::DeploymentConfig;
use crate::db::{DatabaseError, LivenessCheck};

/// Reported in place of a failure that carries no message
pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}

/// The HTTP server itself. Always running if it is able to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Running,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Services {
    pub database: DatabaseStatus,
    pub server: ServerStatus,
}

/// Result of one probe evaluation, serialized as the health endpoint's body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// ISO-8601 UTC timestamp with millisecond precision
    pub timestamp: String,
    pub version: String,
    pub environment: String,
    pub services: Services,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Seconds since process start
    pub uptime: f64,
}

impl HealthReport {
    /// 200 when healthy, 503 otherwise.
    pub fn status_code(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Evaluates service health against a liveness dependency.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    deployment: DeploymentConfig,
    query_timeout: Option<Duration>,
}

impl HealthProbe {
    pub fn new(deployment: DeploymentConfig, query_timeout: Option<Duration>) -> Self {
        Self {
            deployment,
            query_timeout,
        }
    }

    /// Run the liveness query once and build a report from the outcome.
    ///
    /// Never fails: dependency errors are folded into an unhealthy report.
    pub async fn evaluate(&self, dependency: &dyn LivenessCheck, clock: &dyn Clock) -> HealthReport {
        let outcome = self.check(dependency).await;

        let (status, database, error) = match outcome {
            Ok(()) => (HealthStatus::Healthy, DatabaseStatus::Connected, None),
            Err(e) => {
                let message = failure_message(&e);
                tracing::warn!(error = %message, "Health check failed: database unavailable");
                (
                    HealthStatus::Unhealthy,
                    DatabaseStatus::Disconnected,
                    Some(message),
                )
            }
        };

        HealthReport {
            status,
            timestamp: clock.now().to_rfc3339_opts(SecondsFormat::Millis, true),
            version: self.deployment.version.clone(),
            environment: self.deployment.environment.clone(),
            services: Services {
                database,
                server: ServerStatus::Running,
            },
            error,
            uptime: clock.uptime().as_secs_f64(),
        }
    }

    async fn check(&self, dependency: &dyn LivenessCheck) -> Result<(), DatabaseError> {
        match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, dependency.ping())
                .await
                .map_err(|_| DatabaseError::Timeout(limit))?,
            None => dependency.ping().await,
        }
    }
}

fn failure_message(err: &DatabaseError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, SystemClock};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Reachable;

    #[async_trait]
    impl LivenessCheck for Reachable {
        async fn ping(&self) -> Result<(), DatabaseError> {
            Ok(())
        }
    }

    struct Refusing(&'static str);

    #[async_trait]
    impl LivenessCheck for Refusing {
        async fn ping(&self) -> Result<(), DatabaseError> {
            Err(DatabaseError::Other(self.0.to_string()))
        }
    }

    struct Hanging;

    #[async_trait]
    impl LivenessCheck for Hanging {
        async fn ping(&self) -> Result<(), DatabaseError> {
            std::future::pending().await
        }
    }

    #[derive(Default)]
    struct Counting(AtomicUsize);

    #[async_trait]
    impl LivenessCheck for Counting {
        async fn ping(&self) -> Result<(), DatabaseError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn fixed_clock() -> FixedClock {
        FixedClock::new(
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
            Duration::from_millis(12_500),
        )
    }

    fn probe() -> HealthProbe {
        HealthProbe::new(DeploymentConfig::default(), None)
    }

    #[tokio::test]
    async fn test_healthy_when_query_succeeds() {
        let report = probe().evaluate(&Reachable, &fixed_clock()).await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.services.database, DatabaseStatus::Connected);
        assert_eq!(report.services.server, ServerStatus::Running);
        assert_eq!(report.error, None);
        assert_eq!(report.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unhealthy_carries_error_message() {
        let report = probe()
            .evaluate(&Refusing("connection refused"), &fixed_clock())
            .await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.services.database, DatabaseStatus::Disconnected);
        assert_eq!(report.services.server, ServerStatus::Running);
        assert_eq!(report.error.as_deref(), Some("connection refused"));
        assert_eq!(report.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_empty_error_message_falls_back() {
        let report = probe().evaluate(&Refusing(""), &fixed_clock()).await;
        assert_eq!(report.error.as_deref(), Some(UNKNOWN_ERROR));

        let report = probe().evaluate(&Refusing("   "), &fixed_clock()).await;
        assert_eq!(report.error.as_deref(), Some(UNKNOWN_ERROR));
    }

    #[tokio::test]
    async fn test_timeout_is_treated_as_failure() {
        let probe = HealthProbe::new(DeploymentConfig::default(), Some(Duration::from_millis(50)));
        let report = probe.evaluate(&Hanging, &fixed_clock()).await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.services.database, DatabaseStatus::Disconnected);
        assert_eq!(
            report.error.as_deref(),
            Some("database liveness query timed out after 50ms")
        );
    }

    #[tokio::test]
    async fn test_timeout_does_not_affect_fast_query() {
        let probe = HealthProbe::new(DeploymentConfig::default(), Some(Duration::from_secs(2)));
        let report = probe.evaluate(&Reachable, &fixed_clock()).await;
        assert_eq!(report.status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_report_uses_injected_clock_and_deployment() {
        let deployment = DeploymentConfig {
            version: "2.4.1".to_string(),
            environment: "production".to_string(),
        };
        let report = HealthProbe::new(deployment, None)
            .evaluate(&Reachable, &fixed_clock())
            .await;
        assert_eq!(report.timestamp, "2026-10-18T09:30:00.000Z");
        assert_eq!(report.uptime, 12.5);
        assert_eq!(report.version, "2.4.1");
        assert_eq!(report.environment, "production");
    }

    #[tokio::test]
    async fn test_default_deployment_values() {
        let report = probe().evaluate(&Reachable, &fixed_clock()).await;
        assert_eq!(report.version, "1.0.0");
        assert_eq!(report.environment, "development");
    }

    #[tokio::test]
    async fn test_every_evaluation_queries_once() {
        let dependency = Counting::default();
        let probe = probe();
        probe.evaluate(&dependency, &fixed_clock()).await;
        probe.evaluate(&dependency, &fixed_clock()).await;
        assert_eq!(dependency.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_uptime_non_decreasing_and_timestamp_parses() {
        let clock = SystemClock::start();
        let probe = probe();
        let first = probe.evaluate(&Reachable, &clock).await;
        let second = probe.evaluate(&Refusing("down"), &clock).await;
        assert!(first.uptime >= 0.0);
        assert!(second.uptime >= first.uptime);
        for report in [&first, &second] {
            assert!(DateTime::parse_from_rfc3339(&report.timestamp).is_ok());
        }
    }

    #[test]
    fn test_healthy_report_json_shape() {
        let report = HealthReport {
            status: HealthStatus::Healthy,
            timestamp: "2026-10-18T09:30:00.000Z".to_string(),
            version: "1.0.0".to_string(),
            environment: "development".to_string(),
            services: Services {
                database: DatabaseStatus::Connected,
                server: ServerStatus::Running,
            },
            error: None,
            uptime: 1.5,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "healthy",
                "timestamp": "2026-10-18T09:30:00.000Z",
                "version": "1.0.0",
                "environment": "development",
                "services": { "database": "connected", "server": "running" },
                "uptime": 1.5
            })
        );
    }

    #[test]
    fn test_unhealthy_report_includes_error_key() {
        let report = HealthReport {
            status: HealthStatus::Unhealthy,
            timestamp: "2026-10-18T09:30:00.000Z".to_string(),
            version: "1.0.0".to_string(),
            environment: "development".to_string(),
            services: Services {
                database: DatabaseStatus::Disconnected,
                server: ServerStatus::Running,
            },
            error: Some("connection refused".to_string()),
            uptime: 1.5,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["services"]["database"], "disconnected");
        assert_eq!(json["error"], "connection refused");
    }
}
