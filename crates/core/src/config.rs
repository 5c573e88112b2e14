use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub defaults: AnalysisDefaults,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub mode: GatewayMode,
    pub base_url: String,
    pub timeout_secs: u64,
    pub signing_secret: Option<SecretString>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisDefaults {
    pub region: String,
    pub time_range: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayMode {
    Http,
    Fixture,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub gateway_mode: Option<GatewayMode>,
    pub gateway_base_url: Option<String>,
    pub gateway_timeout_secs: Option<u64>,
    pub default_region: Option<String>,
    pub default_time_range: Option<String>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self { region: "us-east-1".to_string(), time_range: "30d".to_string() }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig {
                mode: GatewayMode::Http,
                base_url: String::new(),
                timeout_secs: 30,
                signing_secret: None,
            },
            defaults: AnalysisDefaults::default(),
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for GatewayMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "fixture" => Ok(Self::Fixture),
            other => Err(ConfigError::Validation(format!(
                "unsupported gateway mode `{other}` (expected http|fixture)"
            ))),
        }
    }
}

impl GatewayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Fixture => "fixture",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("execlens.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(gateway) = patch.gateway {
            if let Some(mode) = gateway.mode {
                self.gateway.mode = mode;
            }
            if let Some(base_url) = gateway.base_url {
                self.gateway.base_url = base_url;
            }
            if let Some(timeout_secs) = gateway.timeout_secs {
                self.gateway.timeout_secs = timeout_secs;
            }
            if let Some(signing_secret) = gateway.signing_secret {
                self.gateway.signing_secret = Some(secret_value(signing_secret));
            }
        }

        if let Some(defaults) = patch.defaults {
            if let Some(region) = defaults.region {
                self.defaults.region = region;
            }
            if let Some(time_range) = defaults.time_range {
                self.defaults.time_range = time_range;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("EXECLENS_GATEWAY_MODE") {
            self.gateway.mode = value.parse()?;
        }
        if let Some(value) = read_env("EXECLENS_GATEWAY_BASE_URL") {
            self.gateway.base_url = value;
        }
        if let Some(value) = read_env("EXECLENS_GATEWAY_TIMEOUT_SECS") {
            self.gateway.timeout_secs = parse_u64("EXECLENS_GATEWAY_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("EXECLENS_GATEWAY_SIGNING_SECRET") {
            self.gateway.signing_secret = Some(secret_value(value));
        }

        if let Some(value) = read_env("EXECLENS_DEFAULT_REGION") {
            self.defaults.region = value;
        }
        if let Some(value) = read_env("EXECLENS_DEFAULT_TIME_RANGE") {
            self.defaults.time_range = value;
        }

        if let Some(value) = read_env("EXECLENS_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("EXECLENS_SERVER_PORT") {
            self.server.port = parse_u16("EXECLENS_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("EXECLENS_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("EXECLENS_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("EXECLENS_LOGGING_LEVEL").or_else(|| read_env("EXECLENS_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("EXECLENS_LOGGING_FORMAT").or_else(|| read_env("EXECLENS_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(mode) = overrides.gateway_mode {
            self.gateway.mode = mode;
        }
        if let Some(base_url) = overrides.gateway_base_url {
            self.gateway.base_url = base_url;
        }
        if let Some(timeout_secs) = overrides.gateway_timeout_secs {
            self.gateway.timeout_secs = timeout_secs;
        }
        if let Some(region) = overrides.default_region {
            self.defaults.region = region;
        }
        if let Some(time_range) = overrides.default_time_range {
            self.defaults.time_range = time_range;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_gateway(&self.gateway)?;
        validate_defaults(&self.defaults)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("execlens.toml"), PathBuf::from("config/execlens.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_gateway(gateway: &GatewayConfig) -> Result<(), ConfigError> {
    if gateway.timeout_secs == 0 || gateway.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "gateway.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if gateway.mode == GatewayMode::Http {
        let base_url = gateway.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::Validation(
                "gateway.base_url is required for http mode (set EXECLENS_GATEWAY_BASE_URL, or use gateway.mode = \"fixture\" for offline runs)"
                    .to_string(),
            ));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "gateway.base_url must start with http:// or https://".to_string(),
            ));
        }
    }

    if let Some(secret) = &gateway.signing_secret {
        if secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "gateway.signing_secret must not be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_defaults(defaults: &AnalysisDefaults) -> Result<(), ConfigError> {
    if defaults.region.trim().is_empty() {
        return Err(ConfigError::Validation("defaults.region must not be empty".to_string()));
    }

    if !is_time_range(defaults.time_range.trim()) {
        return Err(ConfigError::Validation(format!(
            "defaults.time_range `{}` must look like `30d`, `12w`, `6m` or `1y`",
            defaults.time_range
        )));
    }

    Ok(())
}

/// `<digits><d|w|m|y>`, e.g. `30d` or `12m`.
pub fn is_time_range(value: &str) -> bool {
    let Some(unit) = value.chars().last() else {
        return false;
    };
    let digits = &value[..value.len() - unit.len_utf8()];
    matches!(unit, 'd' | 'w' | 'm' | 'y')
        && !digits.is_empty()
        && digits.chars().all(|ch| ch.is_ascii_digit())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    gateway: Option<GatewayPatch>,
    defaults: Option<DefaultsPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayPatch {
    mode: Option<GatewayMode>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    signing_secret: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DefaultsPatch {
    region: Option<String>,
    time_range: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
