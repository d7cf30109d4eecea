use std::path::PathBuf;

use serde::Deserialize;

/// Process-level runtime settings, read from the environment.
///
/// Engine, scoring and server tuning live in the YAML config file that
/// `config_path` points at.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Path to the YAML config file
    pub config_path: PathBuf,
    /// Log level, overridden by `logging.level` in the config file
    pub log_level: Option<String>,
    /// Emit console logs as JSON
    pub json_logs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            config_path: pinpoint_config::config_file_path(&pinpoint_config::config_dir()),
            log_level: None,
            json_logs: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: std::env::var("PINPOINT_BIND").unwrap_or(defaults.bind_address),
            port: std::env::var("PINPOINT_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            config_path: std::env::var("PINPOINT_CONFIG")
                .map(PathBuf::from)
                .unwrap_or(defaults.config_path),
            log_level: std::env::var("RUST_LOG").ok(),
            json_logs: std::env::var("PINPOINT_LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}
