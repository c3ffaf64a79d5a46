//! Health check endpoint for container orchestration and uptime monitors.
//!
//! Runs the database-backed [`HealthProbe`](crate::probe::HealthProbe) on every
//! request and answers 200 with a healthy report or 503 with an unhealthy one.

use axum::{extract::State, response::IntoResponse, Json};

use crate::state::AppState;

/// Health check handler.
///
/// Each call re-evaluates the database; results are never cached.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let report = state
        .probe
        .evaluate(state.database.as_ref(), state.clock.as_ref())
        .await;

    (report.status_code(), Json(report))
}
