use execlens_agent::Dispatcher;
use execlens_core::config::{AppConfig, LoadOptions};
use execlens_core::{tools, Domain, QueryContext, ToolResult};
use serde::Serialize;

use super::{current_thread_runtime, CommandResult};

const EXIT_DOCTOR_FAILED: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_DOCTOR_FAILED };

    if json_output {
        return CommandResult::json("doctor", exit_code, &report);
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            match execlens_gateway::from_config(&config.gateway) {
                Ok(gateway) => {
                    let dispatcher = Dispatcher::new(gateway);
                    checks.push(DoctorCheck {
                        name: "gateway_setup",
                        status: CheckStatus::Pass,
                        details: format!("{} gateway constructed", dispatcher.gateway_name()),
                    });
                    checks.push(probe_security_backend(&config, dispatcher));
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "gateway_setup",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(skipped("gateway_probe", "gateway could not be constructed"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("gateway_setup", "configuration did not load"));
            checks.push(skipped("gateway_probe", "configuration did not load"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
}

/// One real `check_security_services` call with the configured defaults.
fn probe_security_backend(config: &AppConfig, dispatcher: Dispatcher) -> DoctorCheck {
    let runtime = match current_thread_runtime("doctor") {
        Ok(runtime) => runtime,
        Err(result) => {
            return DoctorCheck { name: "gateway_probe", status: CheckStatus::Fail, details: result.output };
        }
    };

    let parameters = QueryContext::default().resolve(&config.defaults).to_parameters();
    let result = runtime.block_on(dispatcher.call(
        Domain::Security,
        tools::CHECK_SECURITY_SERVICES,
        parameters,
    ));

    match result {
        ToolResult::Success { .. } => DoctorCheck {
            name: "gateway_probe",
            status: CheckStatus::Pass,
            details: format!(
                "{} answered on {}",
                tools::CHECK_SECURITY_SERVICES,
                Domain::Security.config().endpoint
            ),
        },
        ToolResult::Failure { status_code, detail } => DoctorCheck {
            name: "gateway_probe",
            status: CheckStatus::Fail,
            details: format!("status {status_code}: {}", truncate(&detail, 200)),
        },
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push('…');
    truncated
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
