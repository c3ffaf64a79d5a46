//! Shared application state for request handlers.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::db::LivenessCheck;
use crate::probe::HealthProbe;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// The database and clock are held as trait objects so tests can swap in fakes
/// without touching process-global state.
#[derive(Clone)]
pub struct AppState {
    pub probe: Arc<HealthProbe>,
    pub database: Arc<dyn LivenessCheck>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Creates application state, deriving the health probe from configuration.
    pub fn new(config: &AppConfig, database: Arc<dyn LivenessCheck>, clock: Arc<dyn Clock>) -> Self {
        let probe = HealthProbe::new(
            config.deployment.clone(),
            config.database.query_timeout(),
        );

        Self {
            probe: Arc::new(probe),
            database,
            clock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::DatabaseError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    struct Reachable;

    #[async_trait]
    impl LivenessCheck for Reachable {
        async fn ping(&self) -> Result<(), DatabaseError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_state_reports_configured_deployment() {
        let config = AppConfig::from_toml(
            r#"
[http]
host = "127.0.0.1"
port = 5000

[database]
url = "postgres://caseboard@localhost/caseboard"

[deployment]
version = "5.1.0"
environment = "staging"
"#,
            |_| None,
        )
        .unwrap();
        let clock = FixedClock::new(
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
            Duration::from_secs(1),
        );

        let state = AppState::new(&config, Arc::new(Reachable), Arc::new(clock));
        let report = state
            .probe
            .evaluate(state.database.as_ref(), state.clock.as_ref())
            .await;

        assert_eq!(report.version, "5.1.0");
        assert_eq!(report.environment, "staging");
    }
}
