use axum::Router;
use execlens_agent::Orchestrator;
use tower_http::trace::TraceLayer;

use crate::{analyze, health, query};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(analyze::router())
        .merge(query::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
