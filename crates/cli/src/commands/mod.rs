pub mod ask;
pub mod classify;
pub mod config;
pub mod doctor;

use execlens_agent::Orchestrator;
use execlens_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use serde::Serialize;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_GATEWAY: u8 = 3;
pub const EXIT_PIPELINE: u8 = 4;
pub const EXIT_USAGE: u8 = 64;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn json(command: &str, exit_code: u8, payload: &impl Serialize) -> Self {
        match serde_json::to_string_pretty(payload) {
            Ok(output) => Self { exit_code, output },
            Err(error) => Self::failure(command, "serialization", error.to_string(), EXIT_PIPELINE),
        }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loads config and wires the orchestrator, mapping each failure to its
/// command outcome.
pub(crate) fn load_orchestrator(
    command: &str,
    overrides: ConfigOverrides,
) -> Result<(AppConfig, Orchestrator), CommandResult> {
    let config = AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }).map_err(
        |error| CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG),
    )?;
    let gateway = execlens_gateway::from_config(&config.gateway).map_err(|error| {
        CommandResult::failure(command, "gateway_setup", error.to_string(), EXIT_GATEWAY)
    })?;
    let orchestrator = Orchestrator::new(gateway, config.defaults.clone());
    Ok((config, orchestrator))
}

pub(crate) fn current_thread_runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime",
            format!("failed to initialize async runtime: {error}"),
            EXIT_PIPELINE,
        )
    })
}
