use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use execlens_agent::{RenderMode, RenderedResponse};
use execlens_core::errors::InterfaceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::analyze::context_from_value;
use crate::routes::AppState;

#[derive(Clone, Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub context: Option<Value>,
    #[serde(default)]
    pub mode: RenderMode,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_code: String,
    pub message: String,
    pub correlation_id: String,
}

impl From<&InterfaceError> for ErrorBody {
    fn from(error: &InterfaceError) -> Self {
        Self {
            error_code: error.error_code().to_string(),
            message: error.user_message().to_string(),
            correlation_id: error.correlation_id().to_string(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/query", post(query))
}

pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<RenderedResponse>, (StatusCode, Json<ErrorBody>)> {
    let correlation_id = Uuid::new_v4().to_string();

    if request.query.trim().is_empty() {
        let error = InterfaceError::BadRequest {
            message: "query must not be empty".to_string(),
            correlation_id,
        };
        return Err((status_for(&error), Json(ErrorBody::from(&error))));
    }

    let context = context_from_value(request.context.as_ref());
    state
        .orchestrator
        .run(&request.query, &context, request.mode, &correlation_id)
        .await
        .map(Json)
        .map_err(|error| (status_for(&error), Json(ErrorBody::from(&error))))
}

fn status_for(error: &InterfaceError) -> StatusCode {
    match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
