use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use execlens_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct Field {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let signing_secret = config
        .gateway
        .signing_secret
        .as_ref()
        .map(|secret| redact_secret(secret.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());
    let base_url =
        if config.gateway.base_url.is_empty() { "<unset>".to_string() } else { config.gateway.base_url.clone() };

    vec![
        Field {
            key_path: "gateway.mode",
            env_keys: &["EXECLENS_GATEWAY_MODE"],
            value: config.gateway.mode.as_str().to_string(),
        },
        Field { key_path: "gateway.base_url", env_keys: &["EXECLENS_GATEWAY_BASE_URL"], value: base_url },
        Field {
            key_path: "gateway.timeout_secs",
            env_keys: &["EXECLENS_GATEWAY_TIMEOUT_SECS"],
            value: config.gateway.timeout_secs.to_string(),
        },
        Field {
            key_path: "gateway.signing_secret",
            env_keys: &["EXECLENS_GATEWAY_SIGNING_SECRET"],
            value: signing_secret,
        },
        Field {
            key_path: "defaults.region",
            env_keys: &["EXECLENS_DEFAULT_REGION"],
            value: config.defaults.region.clone(),
        },
        Field {
            key_path: "defaults.time_range",
            env_keys: &["EXECLENS_DEFAULT_TIME_RANGE"],
            value: config.defaults.time_range.clone(),
        },
        Field {
            key_path: "server.bind_address",
            env_keys: &["EXECLENS_SERVER_BIND_ADDRESS"],
            value: config.server.bind_address.clone(),
        },
        Field {
            key_path: "server.port",
            env_keys: &["EXECLENS_SERVER_PORT"],
            value: config.server.port.to_string(),
        },
        Field {
            key_path: "server.graceful_shutdown_secs",
            env_keys: &["EXECLENS_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            value: config.server.graceful_shutdown_secs.to_string(),
        },
        Field {
            key_path: "logging.level",
            env_keys: &["EXECLENS_LOGGING_LEVEL", "EXECLENS_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key_path: "logging.format",
            env_keys: &["EXECLENS_LOGGING_FORMAT", "EXECLENS_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format).to_lowercase(),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    ["execlens.toml", "config/execlens.toml"].into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }
    format!("<redacted:{} chars>", trimmed.chars().count())
}
