use execlens_agent::Orchestrator;
use execlens_core::config::{AppConfig, ConfigError};
use execlens_gateway::GatewayBuildError;
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub orchestrator: Orchestrator,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("tool gateway setup failed: {0}")]
    Gateway(#[from] GatewayBuildError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        gateway_mode = config.gateway.mode.as_str(),
        "starting application bootstrap"
    );

    let gateway = execlens_gateway::from_config(&config.gateway)?;
    let orchestrator = Orchestrator::new(gateway, config.defaults.clone());

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        gateway = orchestrator.gateway_name(),
        default_region = %config.defaults.region,
        default_time_range = %config.defaults.time_range,
        "orchestrator ready"
    );

    Ok(Application { config, orchestrator })
}

#[cfg(test)]
mod tests {
    use execlens_core::config::{AppConfig, ConfigOverrides, GatewayMode, LoadOptions};

    use crate::bootstrap::{bootstrap_with_config, Application, BootstrapError};

    fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
        bootstrap_with_config(AppConfig::load(options)?)
    }

    #[test]
    fn bootstrap_fails_fast_without_gateway_url() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                gateway_mode: Some(GatewayMode::Http),
                gateway_base_url: Some(String::new()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = result.err().map(|error| error.to_string()).unwrap_or_default();
        assert!(message.contains("gateway.base_url"), "unexpected message: {message}");
    }

    #[tokio::test]
    async fn fixture_bootstrap_answers_queries_end_to_end() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                gateway_mode: Some(GatewayMode::Fixture),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("fixture bootstrap should succeed");

        assert_eq!(app.orchestrator.gateway_name(), "fixture");
        let answer = app
            .orchestrator
            .answer("What is my total spend?", &Default::default(), Default::default())
            .await;
        assert_eq!(answer.text, "$125.50");
    }
}
