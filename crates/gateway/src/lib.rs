//! Tool gateway implementations.
//!
//! - [`HttpToolGateway`] talks to the analytics backends over HTTP and signs
//!   requests when a secret is configured.
//! - [`FixtureGateway`] answers from canned payloads without any network.

use std::sync::Arc;

use execlens_agent::gateway::ToolGateway;
use execlens_core::config::{GatewayConfig, GatewayMode};
use thiserror::Error;
use tracing::info;

pub mod fixture;
pub mod http;
pub mod signing;

pub use fixture::FixtureGateway;
pub use http::HttpToolGateway;

#[derive(Debug, Error)]
pub enum GatewayBuildError {
    #[error("gateway.base_url is required in http mode")]
    MissingBaseUrl,
    #[error("failed to build http client: {0}")]
    Client(String),
}

pub fn from_config(config: &GatewayConfig) -> Result<Arc<dyn ToolGateway>, GatewayBuildError> {
    let gateway: Arc<dyn ToolGateway> = match config.mode {
        GatewayMode::Fixture => Arc::new(FixtureGateway::new()),
        GatewayMode::Http => {
            if config.base_url.trim().is_empty() {
                return Err(GatewayBuildError::MissingBaseUrl);
            }
            let gateway = HttpToolGateway::new(
                config.base_url.clone(),
                config.timeout_secs,
                config.signing_secret.clone(),
            )
            .map_err(|error| GatewayBuildError::Client(error.to_string()))?;
            Arc::new(gateway)
        }
    };

    info!(
        event_name = "gateway.configured",
        mode = config.mode.as_str(),
        signed = config.signing_secret.is_some(),
        timeout_secs = config.timeout_secs,
        "tool gateway configured"
    );
    Ok(gateway)
}

#[cfg(test)]
mod tests {
    use execlens_agent::gateway::ToolGateway;
    use execlens_core::config::{AppConfig, GatewayMode};

    use super::{from_config, GatewayBuildError};

    #[test]
    fn fixture_mode_needs_no_url() {
        let mut config = AppConfig::default().gateway;
        config.mode = GatewayMode::Fixture;

        let gateway = from_config(&config).expect("fixture gateway");
        assert_eq!(gateway.name(), "fixture");
    }

    #[test]
    fn http_mode_without_url_is_rejected() {
        let config = AppConfig::default().gateway;
        assert!(matches!(from_config(&config), Err(GatewayBuildError::MissingBaseUrl)));
    }

    #[test]
    fn http_mode_builds_reqwest_gateway() {
        let mut config = AppConfig::default().gateway;
        config.base_url = "https://analytics.internal".to_string();

        let gateway = from_config(&config).expect("http gateway");
        assert_eq!(gateway.name(), "http");
    }
}
