use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::registry::Domain;

/// Status code recorded when the gateway produced no response at all.
pub const NO_RESPONSE_STATUS: u16 = 0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub domain: Domain,
    pub tool_name: String,
    pub parameters: Map<String, Value>,
}

impl ToolInvocation {
    pub fn new(domain: Domain, tool_name: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self { domain, tool_name: tool_name.into(), parameters }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

}

/// Request body shape expected by the tool gateway.
pub fn gateway_request_body(tool_name: &str, arguments: &Value) -> Value {
    serde_json::json!({"tool_name": tool_name, "arguments": arguments})
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolResult {
    Success { payload: Value },
    Failure { status_code: u16, detail: String },
}

impl ToolResult {
    pub fn failure(status_code: u16, detail: impl Into<String>) -> Self {
        Self::Failure { status_code, detail: detail.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success { payload } => Some(payload),
            Self::Failure { .. } => None,
        }
    }

    /// Tool output with the backend's `{"result": ...}` wrapper removed.
    ///
    /// Backends answer with `{"tool_name": .., "result": "<json text>"}`. A
    /// string `result` is parsed as JSON (kept as a string when it is not
    /// JSON), an object `result` is used directly, and payloads without the
    /// wrapper are returned unchanged. Failures have no output.
    pub fn output(&self) -> Option<Value> {
        let payload = self.payload()?;
        let inner = match payload.get("result") {
            Some(Value::String(raw)) => serde_json::from_str::<Value>(raw)
                .unwrap_or_else(|_| Value::String(raw.clone())),
            Some(result) => result.clone(),
            None => payload.clone(),
        };
        Some(inner)
    }

    /// Tool output as the backend sent it, for display.
    ///
    /// A string `result` is returned verbatim so key order and number
    /// formatting survive. Other outputs are written as compact JSON.
    pub fn raw_output(&self) -> Option<String> {
        let payload = self.payload()?;
        let text = match payload.get("result") {
            Some(Value::String(raw)) => raw.clone(),
            Some(result) => result.to_string(),
            None => payload.to_string(),
        };
        Some(text)
    }
}
