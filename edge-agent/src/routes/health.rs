//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use edge_services::{CycleOutcome, CycleReport, CycleState};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    state: CycleState,
    cycles: u64,
    last_cycle: Option<CycleReport>,
}

/// Degraded when the last cycle failed
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let orchestrator = &state.orchestrator;
    let current = orchestrator.state();
    let last_cycle = orchestrator.last_report();

    let failed = current == CycleState::CycleFailed
        || last_cycle
            .as_ref()
            .is_some_and(|r| r.outcome == CycleOutcome::Failed);

    let (code, status) = if failed {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    } else {
        (StatusCode::OK, "healthy")
    };

    let response = HealthResponse {
        status,
        state: current,
        cycles: orchestrator.cycles_started(),
        last_cycle,
    };

    (code, Json(response))
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{app, get};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_before_first_cycle() {
        let (status, json) = get(app(Vec::new()), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["state"], "idle");
        assert_eq!(json["cycles"], 0);
        assert!(json["last_cycle"].is_null());
    }
}
