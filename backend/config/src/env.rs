//! `${VAR}` substitution for config values, resolved at load time.
//!
//! Only uppercase `[A-Z_][A-Z0-9_]*` names are recognised. `$${VAR}` is an escape
//! for a literal `${VAR}`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// A referenced env var is unset or empty.
#[derive(Debug, thiserror::Error)]
#[error("missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references using the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value, MissingEnvVarError> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute env vars using a provided map.
pub fn resolve_env_vars_with(
    value: &Value,
    env: &HashMap<String, String>,
) -> Result<Value, MissingEnvVarError> {
    substitute_value(value, env, "")
}

fn substitute_value(
    value: &Value,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<Value, MissingEnvVarError> {
    match value {
        Value::String(s) => {
            let replaced = substitute_string(s, env, path)?;
            // Whole-value references may carry numbers or booleans ("${PORT}").
            if replaced != *s && s.trim().starts_with("${") {
                if let Ok(parsed) = serde_json::from_str::<Value>(&replaced) {
                    if !parsed.is_string() && !parsed.is_object() && !parsed.is_array() {
                        return Ok(parsed);
                    }
                }
            }
            Ok(Value::String(replaced))
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                out.insert(key.clone(), substitute_value(child, env, &child_path)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<String, MissingEnvVarError> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let replaced = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let var_name = &caps[1];
        if caps[0].starts_with("$$") {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    match missing {
        Some(err) => Err(err),
        None => Ok(replaced.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_strings() {
        let value = json!({ "server": { "userAgent": "bot/${BOT_VERSION}" } });
        let out = resolve_env_vars_with(&value, &env(&[("BOT_VERSION", "2")])).unwrap();
        assert_eq!(out["server"]["userAgent"], "bot/2");
    }

    #[test]
    fn whole_value_reference_becomes_number() {
        let value = json!({ "engine": { "minConfidence": "${MIN_CONF}" } });
        let out = resolve_env_vars_with(&value, &env(&[("MIN_CONF", "70")])).unwrap();
        assert_eq!(out["engine"]["minConfidence"], 70);
    }

    #[test]
    fn escaped_reference_is_kept_literal() {
        let value = json!("$${HOME}");
        let out = resolve_env_vars_with(&value, &env(&[])).unwrap();
        assert_eq!(out, json!("${HOME}"));
    }

    #[test]
    fn missing_var_reports_path() {
        let value = json!({ "logging": { "dir": "${LOG_ROOT}/pinpoint" } });
        let err = resolve_env_vars_with(&value, &env(&[])).unwrap_err();
        assert_eq!(err.var_name, "LOG_ROOT");
        assert_eq!(err.config_path, "logging.dir");
    }
}
