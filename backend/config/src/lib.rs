//! `pinpoint-config` — Pinpoint engine and server configuration.
//!
//! Provides:
//! - Typed config schema (engine thresholds, scoring weights, locales, server, logging)
//! - YAML read/write with backup rotation
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation report

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, load_raw_config, write_config};
pub use schema::{
    EngineSettings, LocalesConfig, LoggingConfig, PinpointConfig, ScoringWeights, ServerSettings,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Load, apply env substitution, apply defaults and validate a config file.
///
/// Validation warnings are logged; any validation error fails the load.
pub async fn load_and_prepare(path: &Path) -> Result<PinpointConfig> {
    let raw = load_raw_config(path).await?;
    let value = resolve_env_vars(&raw).context("Failed to resolve env vars in config")?;

    let config: PinpointConfig = serde_json::from_value(value)
        .context("Failed to deserialize config after env substitution")?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!("{} invalid config value(s); first: {}", report.errors.len(), first);
    }

    Ok(config)
}
