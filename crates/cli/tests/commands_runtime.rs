use std::env;
use std::sync::{Mutex, OnceLock};

use execlens_cli::commands::ask::AskArgs;
use execlens_cli::commands::{ask, classify, config, doctor};
use serde_json::Value;

const FIXTURE_ENV: &[(&str, &str)] = &[("EXECLENS_GATEWAY_MODE", "fixture")];

fn ask_args(query: &str) -> AskArgs {
    AskArgs { query: query.to_string(), ..AskArgs::default() }
}

#[test]
fn ask_answers_value_question_from_fixture_backend() {
    with_env(FIXTURE_ENV, || {
        let result = ask::run(ask_args("What is my monthly spend?"));
        assert_eq!(result.exit_code, 0, "unexpected output: {}", result.output);
        assert_eq!(result.output, "$125.50");
    });
}

#[test]
fn ask_json_exposes_structured_response() {
    with_env(FIXTURE_ENV, || {
        let result = ask::run(AskArgs {
            json: true,
            region: Some("eu-west-1".to_string()),
            ..ask_args("Is our guardduty spend trending up?")
        });
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "ask");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["intent"], "cost");
        assert_eq!(payload["results"]["cost_breakdown"]["kind"], "success");
        assert_eq!(payload["results"]["trends"]["kind"], "success");
        assert!(payload["answer"].as_str().is_some_and(|answer| !answer.is_empty()));
        assert!(payload["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
    });
}

#[test]
fn ask_overview_flag_runs_comprehensive_narrative() {
    with_env(FIXTURE_ENV, || {
        let result = ask::run(AskArgs { overview: true, ..ask_args("What is my total cost?") });
        assert_eq!(result.exit_code, 0);
        assert!(result.output.starts_with("Analysis complete:"));
    });
}

#[test]
fn ask_narrative_flag_overrides_value_form() {
    with_env(FIXTURE_ENV, || {
        let result = ask::run(AskArgs { narrative: true, ..ask_args("What is my monthly spend?") });
        assert_eq!(result.exit_code, 0);
        assert!(result.output.starts_with("Here's your security cost analysis:"));
        assert!(result.output.contains("Details: "));
    });
}

#[test]
fn ask_rejects_malformed_time_range() {
    with_env(FIXTURE_ENV, || {
        let result = ask::run(AskArgs {
            time_range: Some("last-month".to_string()),
            ..ask_args("What is my monthly spend?")
        });
        assert_eq!(result.exit_code, 64);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "usage");
    });
}

#[test]
fn ask_returns_config_failure_without_gateway_url() {
    with_env(&[], || {
        let result = ask::run(ask_args("What is my monthly spend?"));
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "ask");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
        assert!(payload["message"].as_str().is_some_and(|m| m.contains("gateway.base_url")));
    });
}

#[test]
fn classify_reports_scores_without_configuration() {
    with_env(&[], || {
        let result = classify::run("Is the security budget worth it?");
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "classify");
        assert_eq!(payload["primary_domain"], "cost");
        assert_eq!(payload["scores"]["security"], 1);
        assert_eq!(payload["scores"]["cost"], 1);
        assert_eq!(payload["scores"]["roi"], 1);
        assert_eq!(payload["matched_by"], "keywords");
    });
}

#[test]
fn doctor_passes_in_fixture_mode() {
    with_env(FIXTURE_ENV, || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0, "unexpected report: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        let names: Vec<&str> = payload["checks"]
            .as_array()
            .map(|checks| checks.iter().filter_map(|check| check["name"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(names, vec!["config_validation", "gateway_setup", "gateway_probe"]);
    });
}

#[test]
fn doctor_skips_gateway_checks_when_config_invalid() {
    with_env(&[("EXECLENS_GATEWAY_TIMEOUT_SECS", "0"), ("EXECLENS_GATEWAY_MODE", "fixture")], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 5);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][1]["status"], "skipped");
        assert_eq!(payload["checks"][2]["status"], "skipped");
    });
}

#[test]
fn doctor_human_output_marks_each_check() {
    with_env(FIXTURE_ENV, || {
        let result = doctor::run(false);
        assert!(result.output.starts_with("doctor: all readiness checks passed"));
        assert!(result.output.contains("- [ok] gateway_probe:"));
    });
}

#[test]
fn config_redacts_signing_secret_and_attributes_env_sources() {
    with_env(
        &[
            ("EXECLENS_GATEWAY_MODE", "http"),
            ("EXECLENS_GATEWAY_BASE_URL", "https://gateway.example.com/prod"),
            ("EXECLENS_GATEWAY_SIGNING_SECRET", "super-secret-value"),
            ("EXECLENS_LOG_LEVEL", "debug"),
        ],
        || {
            let output = config::run();

            assert!(!output.contains("super-secret-value"));
            assert!(output.contains(
                "- gateway.signing_secret = <redacted:18 chars> (source: env (EXECLENS_GATEWAY_SIGNING_SECRET))"
            ));
            assert!(output.contains(
                "- gateway.base_url = https://gateway.example.com/prod (source: env (EXECLENS_GATEWAY_BASE_URL))"
            ));
            assert!(output.contains("- logging.level = debug (source: env (EXECLENS_LOG_LEVEL))"));
            assert!(output.contains("- defaults.region = us-east-1 (source: default)"));
        },
    );
}

#[test]
fn config_reports_validation_failure() {
    with_env(&[], || {
        let output = config::run();
        assert!(output.starts_with("config validation failed:"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "EXECLENS_GATEWAY_MODE",
        "EXECLENS_GATEWAY_BASE_URL",
        "EXECLENS_GATEWAY_TIMEOUT_SECS",
        "EXECLENS_GATEWAY_SIGNING_SECRET",
        "EXECLENS_DEFAULT_REGION",
        "EXECLENS_DEFAULT_TIME_RANGE",
        "EXECLENS_SERVER_BIND_ADDRESS",
        "EXECLENS_SERVER_PORT",
        "EXECLENS_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "EXECLENS_LOGGING_LEVEL",
        "EXECLENS_LOGGING_FORMAT",
        "EXECLENS_LOG_LEVEL",
        "EXECLENS_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
