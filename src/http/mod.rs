//! HTTP server module.
//!
//! Serves plain HTTP; TLS is expected to terminate at the load balancer or
//! reverse proxy in front of the service. The server drains connections
//! gracefully on SIGTERM/SIGINT.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
