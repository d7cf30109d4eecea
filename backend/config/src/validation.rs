//! Config validation: schema checks with user-friendly error messages.

use crate::defaults::SUPPORTED_LOCALES;
use crate::schema::PinpointConfig;
use pinpoint_core::LITERAL_SCORE;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &PinpointConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_engine(config, &mut report);
    validate_scoring(config, &mut report);
    validate_locales(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_engine(config: &PinpointConfig, report: &mut ValidationReport) {
    let Some(engine) = &config.engine else { return };
    if let Some(threshold) = engine.min_confidence {
        if threshold >= LITERAL_SCORE {
            report.error(
                "engine.minConfidence",
                format!("minConfidence must be below the literal selector score ({LITERAL_SCORE})"),
            );
        }
    }
    if engine.display_limit == Some(0) {
        report.warn(
            "engine.displayLimit",
            "displayLimit is 0; only the best candidate will carry selectors",
        );
    }
    if engine.max_document_bytes == Some(0) {
        report.error("engine.maxDocumentBytes", "maxDocumentBytes must be > 0");
    }
    if engine.proximity_hops == Some(0) {
        report.error("engine.proximityHops", "proximityHops must be >= 1");
    }
}

fn validate_scoring(config: &PinpointConfig, report: &mut ValidationReport) {
    let Some(weights) = &config.scoring else { return };
    for (field, value) in weights.entries() {
        if value < 0 {
            report.error(
                format!("scoring.{field}"),
                "weights are magnitudes and must be >= 0; penalties are subtracted by the scorer",
            );
        }
    }
    if weights.exact_match <= weights.partial_match {
        report.warn(
            "scoring.exactMatch",
            "exactMatch should outweigh partialMatch or partial hits will tie exact ones",
        );
    }
}

fn validate_locales(config: &PinpointConfig, report: &mut ValidationReport) {
    let Some(locales) = &config.locales else { return };
    if let Some(enabled) = &locales.enabled {
        if enabled.is_empty() && locales.extra_verbs.is_empty() {
            report.warn(
                "locales.enabled",
                "No locales enabled and no extra verbs; every query will parse as 'unknown'",
            );
        }
        for locale in enabled {
            if !SUPPORTED_LOCALES.contains(&locale.as_str()) {
                report.warn(
                    "locales.enabled",
                    format!("Unknown locale '{locale}'. Supported: {}", SUPPORTED_LOCALES.join(", ")),
                );
            }
        }
    }
    for verb in locales.extra_verbs.keys() {
        if verb.trim().is_empty() {
            report.error("locales.extraVerbs", "Verb cannot be empty");
        }
    }
}

fn validate_logging(config: &PinpointConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !matches!(
            level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            report.warn("logging.level", format!("Unrecognised log level '{level}'"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EngineSettings, LocalesConfig, ScoringWeights};

    #[test]
    fn empty_config_is_valid() {
        let report = validate(&PinpointConfig::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn threshold_at_literal_score_is_error() {
        let cfg = PinpointConfig {
            engine: Some(EngineSettings {
                min_confidence: Some(LITERAL_SCORE),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "engine.minConfidence");
    }

    #[test]
    fn negative_weight_is_error() {
        let cfg = PinpointConfig {
            scoring: Some(ScoringWeights {
                hidden_penalty: -5,
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(report.errors.iter().any(|e| e.path == "scoring.hiddenPenalty"));
    }

    #[test]
    fn unknown_locale_is_warning() {
        let cfg = PinpointConfig {
            locales: Some(LocalesConfig {
                enabled: Some(vec!["en".into(), "xx".into()]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }
}
