use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use execlens_agent::gateway::{GatewayError, GatewayResponse, ToolGateway};
use execlens_core::domain::invocation::gateway_request_body;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use crate::signing::{sign_request, SIGNATURE_HEADER, TIMESTAMP_HEADER};

/// POSTs `{"tool_name", "arguments"}` to `{base_url}{endpoint}`.
pub struct HttpToolGateway {
    client: Client,
    base_url: String,
    timeout_secs: u64,
    signing_secret: Option<SecretString>,
}

impl std::fmt::Debug for HttpToolGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpToolGateway")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("signing", &self.signing_secret.is_some())
            .finish()
    }
}

impl HttpToolGateway {
    pub fn new(
        base_url: impl Into<String>,
        timeout_secs: u64,
        signing_secret: Option<SecretString>,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|error| GatewayError::Request(error.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs,
            signing_secret,
        })
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn map_send_error(&self, error: reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout { timeout_secs: self.timeout_secs }
        } else if error.is_connect() {
            GatewayError::Connect(error.to_string())
        } else {
            GatewayError::Request(error.to_string())
        }
    }
}

#[async_trait]
impl ToolGateway for HttpToolGateway {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn call(
        &self,
        endpoint: &str,
        tool_name: &str,
        arguments: &Value,
    ) -> Result<GatewayResponse, GatewayError> {
        let url = self.endpoint_url(endpoint);
        let body = gateway_request_body(tool_name, arguments).to_string();

        let mut request = self.client.post(&url).header(CONTENT_TYPE, "application/json");
        if let Some(secret) = &self.signing_secret {
            let timestamp = Utc::now().timestamp().to_string();
            let signature = sign_request(secret.expose_secret().as_bytes(), &timestamp, &body)
                .ok_or_else(|| GatewayError::Request("signing key rejected".to_string()))?;
            request = request.header(TIMESTAMP_HEADER, timestamp).header(SIGNATURE_HEADER, signature);
        }

        let response = request.body(body).send().await.map_err(|error| self.map_send_error(error))?;
        let status_code = response.status().as_u16();
        let text = response.text().await.map_err(|error| {
            if error.is_timeout() {
                GatewayError::Timeout { timeout_secs: self.timeout_secs }
            } else {
                GatewayError::Body(error.to_string())
            }
        })?;

        debug!(
            event_name = "gateway.http.response",
            url = %url,
            tool_name,
            status_code,
            body_bytes = text.len(),
            "gateway responded"
        );

        Ok(GatewayResponse::new(status_code, text))
    }
}
