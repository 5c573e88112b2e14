use std::sync::Arc;
use std::time::Instant;

use execlens_core::domain::invocation::NO_RESPONSE_STATUS;
use execlens_core::errors::DomainError;
use execlens_core::{Domain, ToolInvocation, ToolResult};
use serde_json::Value;
use tracing::{info, warn};

use crate::gateway::{GatewayResponse, ToolGateway};

const SUCCESS_STATUS: u16 = 200;

/// Sends registered tool invocations through a [`ToolGateway`] and folds
/// every outcome into a [`ToolResult`]. It never returns an error.
#[derive(Clone)]
pub struct Dispatcher {
    gateway: Arc<dyn ToolGateway>,
}

impl Dispatcher {
    pub fn new(gateway: Arc<dyn ToolGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway_name(&self) -> &'static str {
        self.gateway.name()
    }

    pub async fn invoke(&self, invocation: &ToolInvocation) -> ToolResult {
        let config = invocation.domain.config();
        if !config.has_tool(&invocation.tool_name) {
            let error = DomainError::UnregisteredTool {
                domain: invocation.domain,
                tool: invocation.tool_name.clone(),
            };
            warn!(
                event_name = "agent.dispatch.rejected",
                domain = %invocation.domain,
                tool_name = %invocation.tool_name,
                error = %error,
                "tool invocation rejected before dispatch"
            );
            return ToolResult::failure(NO_RESPONSE_STATUS, error.to_string());
        }

        let arguments = Value::Object(invocation.parameters.clone());
        let started = Instant::now();
        let outcome = self.gateway.call(config.endpoint, &invocation.tool_name, &arguments).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(response) => interpret(response),
            Err(error) => ToolResult::failure(NO_RESPONSE_STATUS, error.to_string()),
        };

        match &result {
            ToolResult::Success { .. } => info!(
                event_name = "agent.dispatch.completed",
                domain = %invocation.domain,
                tool_name = %invocation.tool_name,
                endpoint = config.endpoint,
                elapsed_ms,
                "tool invocation succeeded"
            ),
            ToolResult::Failure { status_code, detail } => warn!(
                event_name = "agent.dispatch.failed",
                domain = %invocation.domain,
                tool_name = %invocation.tool_name,
                endpoint = config.endpoint,
                status_code,
                detail = %detail,
                elapsed_ms,
                "tool invocation failed"
            ),
        }

        result
    }

    /// Convenience wrapper for callers holding loose parts.
    pub async fn call(
        &self,
        domain: Domain,
        tool_name: &str,
        parameters: serde_json::Map<String, Value>,
    ) -> ToolResult {
        self.invoke(&ToolInvocation::new(domain, tool_name, parameters)).await
    }
}

fn interpret(response: GatewayResponse) -> ToolResult {
    if response.status_code != SUCCESS_STATUS {
        return ToolResult::failure(response.status_code, response.body);
    }

    match serde_json::from_str::<Value>(&response.body) {
        Ok(payload) => ToolResult::Success { payload },
        Err(error) => ToolResult::failure(
            response.status_code,
            format!("response body is not valid JSON: {error}"),
        ),
    }
}
