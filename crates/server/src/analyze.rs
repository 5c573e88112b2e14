//! Agent action-group surface.
//!
//! `POST /analyze` accepts the three request shapes an agent runtime sends
//! and always answers with the action-group response envelope, even for
//! rejected or failed requests.

use axum::body::Bytes;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use execlens_agent::RenderMode;
use execlens_core::QueryContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::routes::AppState;

pub const MESSAGE_VERSION: &str = "1.0";
pub const DEFAULT_ACTION_GROUP: &str = "security-analytics";
pub const DEFAULT_API_PATH: &str = "/analyze";
pub const DEFAULT_HTTP_METHOD: &str = "POST";
pub const MISSING_QUERY_MESSAGE: &str = "No query found in event";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedRequest {
    pub query: String,
    pub context: QueryContext,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupResponse {
    pub message_version: String,
    pub response: ActionGroupResult,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupResult {
    pub action_group: String,
    pub api_path: String,
    pub http_method: String,
    pub http_status_code: u16,
    pub response_body: ResponseBody,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "application/json")]
    pub json: TextBody,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
}

impl ActionGroupResponse {
    fn for_event(event: &Value, status: StatusCode, text: String) -> Self {
        let echoed = |key: &str, fallback: &str| {
            event.get(key).and_then(Value::as_str).unwrap_or(fallback).to_string()
        };

        Self {
            message_version: MESSAGE_VERSION.to_string(),
            response: ActionGroupResult {
                action_group: echoed("actionGroup", DEFAULT_ACTION_GROUP),
                api_path: echoed("apiPath", DEFAULT_API_PATH),
                http_method: echoed("httpMethod", DEFAULT_HTTP_METHOD),
                http_status_code: status.as_u16(),
                response_body: ResponseBody { json: TextBody { body: text } },
            },
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/analyze", post(analyze))
}

/// Reads the raw body so malformed or untyped requests still get an envelope.
pub async fn analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<ActionGroupResponse>) {
    let correlation_id = Uuid::new_v4().to_string();
    let event = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    let request = extract_request(&event);

    if request.query.trim().is_empty() {
        warn!(
            event_name = "server.analyze.rejected",
            correlation_id = %correlation_id,
            "request carried no query"
        );
        let status = StatusCode::BAD_REQUEST;
        return (
            status,
            Json(ActionGroupResponse::for_event(&event, status, MISSING_QUERY_MESSAGE.to_string())),
        );
    }

    info!(
        event_name = "server.analyze.received",
        correlation_id = %correlation_id,
        query_chars = request.query.chars().count(),
        overview = request.context.overview,
        "analyze request received"
    );

    let (status, text) = match state
        .orchestrator
        .run(&request.query, &request.context, RenderMode::Auto, &correlation_id)
        .await
    {
        Ok(rendered) => (StatusCode::OK, rendered.text),
        Err(error) => (StatusCode::INTERNAL_SERVER_ERROR, error.user_message().to_string()),
    };

    (status, Json(ActionGroupResponse::for_event(&event, status, text)))
}

/// Pulls the query and caller context out of any supported request shape.
///
/// Shapes are tried in order: direct (`inputText` + `sessionAttributes`),
/// action group (`requestBody.content["application/json"]` holding JSON text
/// or an object with `query` and `context`), then simple (`query` +
/// `context`). Unknown shapes yield an empty query.
pub fn extract_request(event: &Value) -> ExtractedRequest {
    if let Some(input_text) = event.get("inputText") {
        return ExtractedRequest {
            query: string_field(Some(input_text)),
            context: context_from_value(event.get("sessionAttributes")),
        };
    }

    if let Some(request_body) = event.get("requestBody") {
        let content = request_body.get("content").and_then(|content| content.get("application/json"));
        let parsed = match content {
            Some(Value::String(raw)) => serde_json::from_str::<Value>(raw).ok(),
            Some(object @ Value::Object(_)) => Some(object.clone()),
            _ => None,
        };
        return parsed
            .map(|payload| ExtractedRequest {
                query: string_field(payload.get("query")),
                context: context_from_value(payload.get("context")),
            })
            .unwrap_or_default();
    }

    if event.get("query").is_some() {
        return ExtractedRequest {
            query: string_field(event.get("query")),
            context: context_from_value(event.get("context")),
        };
    }

    ExtractedRequest::default()
}

fn string_field(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Session attributes arrive as loosely typed maps, often string-only.
pub fn context_from_value(value: Option<&Value>) -> QueryContext {
    let Some(attributes) = value.and_then(Value::as_object) else {
        return QueryContext::default();
    };

    let text = |key: &str| {
        attributes
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };
    let overview = match attributes.get("overview") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(flag)) => {
            matches!(flag.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
        }
        _ => false,
    };

    QueryContext { region: text("region"), time_range: text("time_range"), overview }
}
