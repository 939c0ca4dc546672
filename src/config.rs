//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `INFLUX_BROKER_*` environment overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "INFLUX_BROKER_";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub influx: InfluxConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Header naming the database to query
    #[serde(default = "default_user_header")]
    pub user_header: String,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_user_header() -> String {
    "X-UserId".to_string()
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10 MB
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user_header: default_user_header(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl From<&ApiConfig> for crate::api::ApiConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            user_header: config.user_header.clone(),
            max_body_size: config.max_body_size,
        }
    }
}

/// InfluxDB connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InfluxConfig {
    #[serde(default = "default_influx_url")]
    pub url: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_influx_timeout")]
    pub timeout_ms: u64,
}

fn default_influx_url() -> String {
    "http://localhost:8086".to_string()
}

fn default_influx_timeout() -> u64 {
    30_000
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            url: default_influx_url(),
            username: None,
            password: None,
            timeout_ms: default_influx_timeout(),
        }
    }
}

impl From<&InfluxConfig> for crate::influx::InfluxConfig {
    fn from(config: &InfluxConfig) -> Self {
        Self {
            url: config.url.clone(),
            username: config.username.clone().filter(|u| !u.is_empty()),
            password: config.password.clone(),
            request_timeout_ms: config.timeout_ms,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// pretty or json
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse TOML content
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        for path in default_paths() {
            if path.exists() {
                match Self::load_with_env(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok());
    }

    /// Apply overrides from `lookup`, keyed without the `INFLUX_BROKER_` prefix
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(host) = lookup("API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!("Ignoring invalid API_PORT {:?}", port),
            }
        }
        if let Some(header) = lookup("USER_HEADER") {
            self.api.user_header = header;
        }

        // InfluxDB overrides
        if let Some(url) = lookup("INFLUX_URL") {
            self.influx.url = url;
        }
        if let Some(user) = lookup("INFLUX_USER") {
            self.influx.username = Some(user);
        }
        if let Some(password) = lookup("INFLUX_PASSWORD") {
            self.influx.password = Some(password);
        }
        if let Some(timeout) = lookup("INFLUX_TIMEOUT_MS") {
            match timeout.parse() {
                Ok(t) => self.influx.timeout_ms = t,
                Err(_) => tracing::warn!("Ignoring invalid INFLUX_TIMEOUT_MS {:?}", timeout),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }
        if lookup("DEBUG").is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes")) {
            self.logging.level = "debug".to_string();
        }
    }
}

fn default_paths() -> Vec<PathBuf> {
    [
        dirs::config_dir().map(|p| p.join("influx-broker").join("config.toml")),
        Some(PathBuf::from("/etc/influx-broker/config.toml")),
        Some(PathBuf::from("./config.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Influx Broker Configuration
#
# Environment variables override these settings:
# - INFLUX_BROKER_API_HOST
# - INFLUX_BROKER_API_PORT
# - INFLUX_BROKER_USER_HEADER
# - INFLUX_BROKER_INFLUX_URL
# - INFLUX_BROKER_INFLUX_USER
# - INFLUX_BROKER_INFLUX_PASSWORD
# - INFLUX_BROKER_INFLUX_TIMEOUT_MS
# - INFLUX_BROKER_LOG_LEVEL
# - INFLUX_BROKER_LOG_FORMAT
# - INFLUX_BROKER_DEBUG (forces debug logging)

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8082

# Request header naming the database to query
user_header = "X-UserId"

# Maximum request body size (bytes)
max_body_size = 10485760

[influx]
# InfluxDB 1.x base URL
url = "http://localhost:8086"

# Basic auth credentials, if the server requires them
# username = ""
# password = ""

# Per-request timeout (ms)
timeout_ms = 30000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 8082);
        assert_eq!(config.api.user_header, "X-UserId");
        assert_eq!(config.influx.url, "http://localhost:8086");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.api.max_body_size, 10 * 1024 * 1024);
        assert_eq!(config.influx.timeout_ms, 30_000);
        assert!(config.influx.username.is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[influx]\nurl = \"http://influx:8086\"\n\n[logging]\nformat = \"json\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.influx.url, "http://influx:8086");
        assert_eq!(config.influx.timeout_ms, 30_000);
        assert!(config.logging.is_json());
        assert_eq!(config.api.port, 8082);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[api\nport = ").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("API_PORT", "9000"),
            ("USER_HEADER", "X-Database"),
            ("INFLUX_URL", "http://db:8086"),
            ("INFLUX_USER", "reader"),
            ("INFLUX_TIMEOUT_MS", "not a number"),
            ("LOG_LEVEL", "warn"),
            ("DEBUG", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.user_header, "X-Database");
        assert_eq!(config.influx.url, "http://db:8086");
        assert_eq!(config.influx.username.as_deref(), Some("reader"));
        assert_eq!(config.influx.timeout_ms, 30_000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_conversions() {
        let mut config = Config::default();
        config.influx.username = Some(String::new());
        config.influx.timeout_ms = 500;

        let influx = crate::influx::InfluxConfig::from(&config.influx);
        assert!(influx.username.is_none());
        assert_eq!(influx.request_timeout_ms, 500);

        let api = crate::api::ApiConfig::from(&config.api);
        assert_eq!(api.addr(), "0.0.0.0:8082");
    }
}
