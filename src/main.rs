//! Caseboard health service entry point.
//!
//! Initializes tracing, loads configuration from a TOML file, builds the
//! Postgres pool, sets up the Axum router, and starts the HTTP server.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use caseboard::clock::SystemClock;
use caseboard::config::{AppConfig, LogFormat, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use caseboard::db::Database;
use caseboard::{create_router, http, AppState};

/// Caseboard: health service for the NDIS case-management dashboard
#[derive(Parser, Debug)]
#[command(name = "caseboard", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "caseboard=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Uptime counts from process start
    let clock = SystemClock::start();

    let args = Args::parse();

    // Load configuration before tracing so the log format is known
    let config = AppConfig::load(&args.config)?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry = tracing_subscriber::registry().with(EnvFilter::new(&log_filter));
    match config.logging.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!(
        config = %args.config,
        version = %config.deployment.version,
        environment = %config.deployment.environment,
        "Loaded configuration"
    );

    let database = Database::connect_lazy(config.database_url(), &config.database)?;

    let state = AppState::new(&config, Arc::new(database), Arc::new(clock));
    let app = create_router(state);

    http::start_server(app, &config.http).await?;

    Ok(())
}
