//! Shared liveness/readiness handlers so every service binary in the
//! workspace exposes the same `/api/health` and `/api/ready` shape.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub version: String,
    pub checked_at: DateTime<Utc>,
}

/// A single dependency readiness probe, e.g. "can I reach Postgres".
pub type ReadinessCheck = Arc<dyn Fn() -> bool + Send + Sync>;

#[derive(Clone)]
pub struct HealthState {
    pub service: String,
    pub version: String,
    pub readiness_checks: Vec<(&'static str, ReadinessCheck)>,
}

impl HealthState {
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            readiness_checks: Vec::new(),
        }
    }

    pub fn with_check(mut self, name: &'static str, check: ReadinessCheck) -> Self {
        self.readiness_checks.push((name, check));
        self
    }
}

/// `GET /api/health` — liveness only, never fails once the process is up.
pub async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: state.service,
        version: state.version,
        checked_at: Utc::now(),
    })
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: Vec<ReadinessCheckResult>,
}

#[derive(Debug, Serialize)]
pub struct ReadinessCheckResult {
    pub name: &'static str,
    pub ok: bool,
}

/// `GET /api/ready` — runs every registered dependency probe.
pub async fn ready(
    State(state): State<HealthState>,
) -> (axum::http::StatusCode, Json<ReadinessResponse>) {
    let checks: Vec<ReadinessCheckResult> = state
        .readiness_checks
        .iter()
        .map(|(name, check)| ReadinessCheckResult {
            name,
            ok: check(),
        })
        .collect();

    let all_ok = checks.iter().all(|c| c.ok);
    let status_code = if all_ok {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(ReadinessResponse {
            status: if all_ok { "ready" } else { "not_ready" },
            checks,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_service_name_and_version() {
        let state = HealthState::new("ledger-core", "1.0.0");
        let Json(body) = health(State(state)).await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.service, "ledger-core");
    }

    #[tokio::test]
    async fn ready_fails_when_a_check_fails() {
        let state = HealthState::new("ledger-core", "1.0.0")
            .with_check("db", Arc::new(|| false));
        let (status, Json(body)) = ready(State(state)).await;
        assert_eq!(status, axum::http::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "not_ready");
        assert!(!body.checks[0].ok);
    }

    #[tokio::test]
    async fn ready_succeeds_when_all_checks_pass() {
        let state = HealthState::new("ledger-core", "1.0.0")
            .with_check("db", Arc::new(|| true));
        let (status, Json(body)) = ready(State(state)).await;
        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(body.status, "ready");
    }
}
