//! Postgres connection pool and the liveness query run by the health probe.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Errors from the persistence dependency.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("{0}")]
    Query(#[from] sqlx::Error),

    #[error("database liveness query timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),
}

/// A dependency that can answer a trivial query to prove it is reachable.
#[async_trait]
pub trait LivenessCheck: Send + Sync {
    /// Run one trivial query. Completes with `Ok` or the error the dependency raised.
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// The application's Postgres pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool without opening a connection.
    ///
    /// Connections are established on first use, so the server can start (and
    /// report itself unhealthy) while the database is unreachable.
    pub fn connect_lazy(url: &str, config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let options = PgConnectOptions::from_str(url)?;
        tracing::info!(
            database = %redacted_url(&options),
            max_connections = config.max_connections,
            "Configured PostgreSQL pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_lazy_with(options);

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl LivenessCheck for Database {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

/// Rebuild a connection string without the password, for logging.
fn redacted_url(options: &PgConnectOptions) -> String {
    let mut c = String::from("postgresql://");
    let user = options.get_username();
    let host = options.get_host();
    let port = options.get_port();

    if !user.is_empty() {
        c.push_str(user);
        c.push('@');
    }

    c.push_str(host);

    if port > 0 {
        c.push(':');
        c.push_str(&port.to_string());
    }

    if let Some(db) = options.get_database() {
        c.push('/');
        c.push_str(db);
    }

    c
}
