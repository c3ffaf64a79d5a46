//! Configuration loading and constants.
//!
//! Loads application configuration from a TOML file, applies environment
//! overrides, and validates the result. `AppConfig` is the root configuration
//! struct containing all settings.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// =============================================================================
// Deployment Defaults
// =============================================================================

/// Version reported by the health probe when none is configured
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Environment name reported by the health probe when none is configured
pub const DEFAULT_ENVIRONMENT: &str = "development";

// =============================================================================
// Environment Variables
// =============================================================================

/// Overrides `deployment.version`
pub const ENV_VERSION: &str = "CASEBOARD_VERSION";

/// Overrides `deployment.environment`
pub const ENV_ENVIRONMENT: &str = "CASEBOARD_ENV";

/// Overrides `database.url`
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

// =============================================================================
// Database Pool Defaults
// =============================================================================

/// Maximum pooled connections
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Seconds to wait for a pooled connection before giving up
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "caseboard=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Deployment metadata surfaced by the health probe
    #[serde(default)]
    pub deployment: DeploymentConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

/// Postgres connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL. May be left out when DATABASE_URL is set.
    pub url: Option<String>,
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "DatabaseConfig::default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
    /// Upper bound on the health probe's query. No bound when absent.
    pub query_timeout_seconds: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: Self::default_max_connections(),
            acquire_timeout_seconds: Self::default_acquire_timeout(),
            query_timeout_seconds: None,
        }
    }
}

impl DatabaseConfig {
    fn default_max_connections() -> u32 {
        DEFAULT_MAX_CONNECTIONS
    }

    fn default_acquire_timeout() -> u64 {
        DEFAULT_ACQUIRE_TIMEOUT_SECS
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_seconds.map(Duration::from_secs)
    }
}

/// Version and environment name reported in every health report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default = "DeploymentConfig::default_version")]
    pub version: String,
    #[serde(default = "DeploymentConfig::default_environment")]
    pub environment: String,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            version: Self::default_version(),
            environment: Self::default_environment(),
        }
    }
}

impl DeploymentConfig {
    fn default_version() -> String {
        DEFAULT_VERSION.to_string()
    }

    fn default_environment() -> String {
        DEFAULT_ENVIRONMENT.to_string()
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: Self::default_format(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> LogFormat {
        LogFormat::Text
    }
}

impl AppConfig {
    /// Load configuration from a TOML file and apply process environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents, |key| std::env::var(key).ok())
    }

    /// Parse configuration, applying overrides from `env` before validating.
    pub fn from_toml<F>(contents: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: AppConfig = toml::from_str(contents)?;
        config.apply_env_overrides(env);
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_DATABASE_URL) {
            self.database.url = Some(url);
        }
        if let Some(version) = non_empty(ENV_VERSION) {
            self.deployment.version = version;
        }
        if let Some(environment) = non_empty(ENV_ENVIRONMENT) {
            self.deployment.environment = environment;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "No database configured. Set [database] url or {ENV_DATABASE_URL}"
            )));
        }

        // A refused connection is retried until the acquire timeout expires, so the
        // pool must give up before the liveness query bound does.
        if let Some(query_timeout) = self.database.query_timeout_seconds {
            if self.database.acquire_timeout_seconds >= query_timeout {
                return Err(ConfigError::Validation(format!(
                    "database.acquire_timeout_seconds ({}) must be below database.query_timeout_seconds ({})",
                    self.database.acquire_timeout_seconds, query_timeout
                )));
            }
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// The validated database URL
    pub fn database_url(&self) -> &str {
        self.database.url.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
