use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Raw answer from the tool gateway before status interpretation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayResponse {
    pub status_code: u16,
    pub body: String,
}

impl GatewayResponse {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self { status_code, body: body.into() }
    }

    pub fn ok_json(body: &Value) -> Self {
        Self { status_code: 200, body: body.to_string() }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("gateway request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("gateway connection failed: {0}")]
    Connect(String),
    #[error("gateway request could not be built: {0}")]
    Request(String),
    #[error("gateway response could not be read: {0}")]
    Body(String),
}

/// Transport seam between the orchestrator and the analytics backends.
///
/// Implementations own request construction, signing and timeouts; callers
/// only see a status code and a body, or a transport fault.
#[async_trait]
pub trait ToolGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn call(
        &self,
        endpoint: &str,
        tool_name: &str,
        arguments: &Value,
    ) -> Result<GatewayResponse, GatewayError>;
}
