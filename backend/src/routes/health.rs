//! Health probes
//!
//! Kubernetes-style endpoints: /health and /health/live answer from
//! process state alone, /health/ready also pings the database and
//! reports 503 until it responds.

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Flat probe response for /health and /health/live
#[derive(Serialize)]
pub struct Probe {
    pub status: &'static str,
    pub version: &'static str,
}

/// Readiness report with the database round-trip result
#[derive(Serialize)]
pub struct ReadinessReport {
    pub status: &'static str,
    pub version: &'static str,
    pub database: String,
}

/// Basic health check
pub async fn health_check() -> Json<Probe> {
    Json(Probe {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe. Answers 503 while the database is unreachable.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ReadinessReport>, (StatusCode, Json<ReadinessReport>)> {
    match db::health_check(state.db()).await {
        Ok(()) => Ok(Json(ReadinessReport {
            status: "ready",
            version: env!("CARGO_PKG_VERSION"),
            database: "ok".to_string(),
        })),
        Err(e) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessReport {
                status: "not_ready",
                version: env!("CARGO_PKG_VERSION"),
                database: e.to_string(),
            }),
        )),
    }
}

/// Liveness probe. Succeeds whenever the process can answer at all.
pub async fn liveness_check() -> Json<Probe> {
    Json(Probe {
        status: "alive",
        version: env!("CARGO_PKG_VERSION"),
    })
}
