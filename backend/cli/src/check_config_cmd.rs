//! `pinpoint check-config`: load, validate and summarise the config file.

use std::path::Path;

use anyhow::{bail, Context, Result};
use pinpoint_config::{
    apply_all_defaults, resolve_env_vars, validate, write_config, PinpointConfig,
};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

pub async fn run(path: &Path, write_defaults: bool) -> Result<()> {
    if write_defaults {
        if path.exists() {
            note_warn(&format!("{} already exists; not overwriting", path.display()));
        } else {
            write_config(&apply_all_defaults(PinpointConfig::default()), path).await?;
            note_success(&format!("Wrote default config to {}", path.display()));
        }
    }

    note_info(&format!("Checking {}", path.display()));
    if !path.exists() {
        note_info("No config file; built-in defaults apply");
    }

    let raw = pinpoint_config::load_raw_config(path).await?;
    let value = resolve_env_vars(&raw).context("Failed to resolve env vars in config")?;
    let config: PinpointConfig =
        serde_json::from_value(value).context("Config does not match the schema")?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }
    if !report.is_valid() {
        bail!("{} invalid config value(s)", report.errors.len());
    }

    note_info(&format!(
        "minConfidence {} · displayLimit {} · locales {}",
        config.min_confidence(),
        config.display_limit(),
        config.enabled_locales().join(", "),
    ));
    note_success("Config is valid");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_and_accepts_defaults() {
        let dir = std::env::temp_dir().join(format!("pinpoint-check-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.yaml");
        run(&path, true).await.unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn rejects_negative_weights() {
        let dir = std::env::temp_dir().join(format!("pinpoint-check-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        std::fs::write(&path, "scoring:\n  exactMatch: -5\n").unwrap();
        assert!(run(&path, false).await.is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
