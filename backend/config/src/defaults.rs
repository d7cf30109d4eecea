//! Config defaults: the chosen weight table, thresholds and limits.

use crate::schema::{EngineSettings, LocalesConfig, LoggingConfig, PinpointConfig, ServerSettings};

/// `best` requires a top score strictly above this.
pub const DEFAULT_MIN_CONFIDENCE: u32 = 50;

/// Candidates that get selectors synthesized per request.
pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

/// 5 MiB of markup.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

pub const DEFAULT_MAX_ANCHOR_NODES: usize = 8;

pub const DEFAULT_PROXIMITY_HOPS: usize = 8;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

pub const DEFAULT_USER_AGENT: &str = concat!("pinpoint/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Locales with a built-in verb table.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "es", "fr", "de", "pt"];

pub const WEIGHT_EXACT_MATCH: i64 = 100;
pub const WEIGHT_PARTIAL_MATCH: i64 = 40;
pub const WEIGHT_CONTEXT_MATCH: i64 = 30;
pub const WEIGHT_WIDGET_HEURISTIC: i64 = 10;
pub const WEIGHT_TAG_INTENT: i64 = 25;
pub const WEIGHT_TAG_HINT: i64 = 15;
pub const WEIGHT_OPTION_MATCH: i64 = 20;
pub const WEIGHT_PROXIMITY: i64 = 30;
pub const WEIGHT_FORM_CONTEXT: i64 = 10;
pub const PENALTY_INTENT_MISMATCH: i64 = 30;
pub const PENALTY_CONTAINER_MISMATCH: i64 = 20;
pub const PENALTY_HIDDEN: i64 = 50;

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: PinpointConfig) -> PinpointConfig {
    let config = apply_engine_defaults(config);
    let config = apply_scoring_defaults(config);
    let config = apply_locale_defaults(config);
    let config = apply_server_defaults(config);
    apply_logging_defaults(config)
}

fn apply_engine_defaults(mut config: PinpointConfig) -> PinpointConfig {
    let engine = config.engine.get_or_insert_with(EngineSettings::default);
    engine.min_confidence.get_or_insert(DEFAULT_MIN_CONFIDENCE);
    engine.display_limit.get_or_insert(DEFAULT_DISPLAY_LIMIT);
    engine.max_document_bytes.get_or_insert(DEFAULT_MAX_DOCUMENT_BYTES);
    engine.max_anchor_nodes.get_or_insert(DEFAULT_MAX_ANCHOR_NODES);
    engine.proximity_hops.get_or_insert(DEFAULT_PROXIMITY_HOPS);
    config
}

fn apply_scoring_defaults(mut config: PinpointConfig) -> PinpointConfig {
    config.scoring.get_or_insert_with(Default::default);
    config
}

fn apply_locale_defaults(mut config: PinpointConfig) -> PinpointConfig {
    let locales = config.locales.get_or_insert_with(LocalesConfig::default);
    if locales.enabled.is_none() {
        locales.enabled = Some(SUPPORTED_LOCALES.iter().map(|s| s.to_string()).collect());
    }
    config
}

fn apply_server_defaults(mut config: PinpointConfig) -> PinpointConfig {
    let server = config.server.get_or_insert_with(ServerSettings::default);
    server.request_timeout_secs.get_or_insert(DEFAULT_REQUEST_TIMEOUT_SECS);
    server.fetch_timeout_secs.get_or_insert(DEFAULT_FETCH_TIMEOUT_SECS);
    server
        .user_agent
        .get_or_insert_with(|| DEFAULT_USER_AGENT.to_string());
    server.allow_fetch.get_or_insert(true);
    config
}

fn apply_logging_defaults(mut config: PinpointConfig) -> PinpointConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    logging.redact_values.get_or_insert(true);
    config
}
