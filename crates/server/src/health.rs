use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::routes::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub gateway: HealthCheck,
    pub checked_at: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let gateway = gateway_check(state.orchestrator.gateway_name());
    let ready = gateway.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "execlens-server runtime initialized".to_string(),
        },
        gateway,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn gateway_check(gateway_name: &'static str) -> HealthCheck {
    match gateway_name {
        "http" => HealthCheck { status: "ready", detail: "http gateway configured".to_string() },
        "fixture" => HealthCheck {
            status: "ready",
            detail: "fixture gateway serving canned payloads".to_string(),
        },
        other => HealthCheck { status: "degraded", detail: format!("unrecognized gateway `{other}`") },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use execlens_agent::Orchestrator;
    use execlens_core::config::AnalysisDefaults;
    use execlens_gateway::FixtureGateway;

    use crate::health::health;
    use crate::routes::AppState;

    #[tokio::test]
    async fn health_reports_fixture_gateway_as_ready() {
        let state = AppState::new(Orchestrator::new(
            Arc::new(FixtureGateway::new()),
            AnalysisDefaults::default(),
        ));

        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.gateway.status, "ready");
        assert!(payload.gateway.detail.contains("fixture"));
        assert_eq!(payload.service.status, "ready");
    }
}
