//! Caseboard: backend health service for the NDIS case-management dashboard.
//!
//! Exposes a database-backed health probe over HTTP. The library holds the
//! configuration, probe, and router so they can be driven in-process by tests;
//! `main.rs` wires them to a real Postgres pool and listener.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod middleware;
pub mod probe;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
