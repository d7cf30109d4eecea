//! Pinpoint configuration schema.
//!
//! Typed for serde YAML/JSON deserialization. Every section is optional; missing
//! values are filled by [`crate::defaults::apply_all_defaults`].

use pinpoint_core::Intent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::defaults;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinpointConfig {
    /// Ranking thresholds and resource limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineSettings>,

    /// Per-signal weights for the scoring rule table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringWeights>,

    /// Verb synonym locales for the intent parser
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locales: Option<LocalesConfig>,

    /// HTTP server settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerSettings>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    /// `best` is only reported when the top score exceeds this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<u32>,
    /// How many top-ranked candidates get selectors synthesized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_document_bytes: Option<usize>,
    /// Cap on elements considered as relational anchors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_anchor_nodes: Option<usize>,
    /// Tree distance at which the proximity bonus reaches zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proximity_hops: Option<usize>,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Weights for each scoring signal. Penalties are stored as magnitudes and
/// subtracted by the scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringWeights {
    pub exact_match: i64,
    pub partial_match: i64,
    pub context_match: i64,
    pub widget_heuristic: i64,
    pub tag_intent: i64,
    pub tag_hint: i64,
    pub option_match: i64,
    pub proximity: i64,
    pub form_context: i64,
    pub intent_mismatch_penalty: i64,
    pub container_mismatch_penalty: i64,
    pub hidden_penalty: i64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            exact_match: defaults::WEIGHT_EXACT_MATCH,
            partial_match: defaults::WEIGHT_PARTIAL_MATCH,
            context_match: defaults::WEIGHT_CONTEXT_MATCH,
            widget_heuristic: defaults::WEIGHT_WIDGET_HEURISTIC,
            tag_intent: defaults::WEIGHT_TAG_INTENT,
            tag_hint: defaults::WEIGHT_TAG_HINT,
            option_match: defaults::WEIGHT_OPTION_MATCH,
            proximity: defaults::WEIGHT_PROXIMITY,
            form_context: defaults::WEIGHT_FORM_CONTEXT,
            intent_mismatch_penalty: defaults::PENALTY_INTENT_MISMATCH,
            container_mismatch_penalty: defaults::PENALTY_CONTAINER_MISMATCH,
            hidden_penalty: defaults::PENALTY_HIDDEN,
        }
    }
}

impl ScoringWeights {
    /// (field path, value) pairs, used by validation.
    pub fn entries(&self) -> [(&'static str, i64); 12] {
        [
            ("exactMatch", self.exact_match),
            ("partialMatch", self.partial_match),
            ("contextMatch", self.context_match),
            ("widgetHeuristic", self.widget_heuristic),
            ("tagIntent", self.tag_intent),
            ("tagHint", self.tag_hint),
            ("optionMatch", self.option_match),
            ("proximity", self.proximity),
            ("formContext", self.form_context),
            ("intentMismatchPenalty", self.intent_mismatch_penalty),
            ("containerMismatchPenalty", self.container_mismatch_penalty),
            ("hiddenPenalty", self.hidden_penalty),
        ]
    }
}

// ---------------------------------------------------------------------------
// Locales
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalesConfig {
    /// Built-in verb tables to load (e.g. `["en", "es"]`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<Vec<String>>,
    /// Additional verb → intent mappings, applied after the built-in tables.
    #[serde(default)]
    pub extra_verbs: BTreeMap<String, Intent>,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Allow `POST /api/locate` to fetch `url` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_fetch: Option<bool>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for the rolling NDJSON log; console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Mask value phrases ("enter <value> in ...") in request events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redact_values: Option<bool>,
}

// ---------------------------------------------------------------------------
// Resolved accessors
// ---------------------------------------------------------------------------

impl PinpointConfig {
    pub fn min_confidence(&self) -> u32 {
        self.engine
            .as_ref()
            .and_then(|e| e.min_confidence)
            .unwrap_or(defaults::DEFAULT_MIN_CONFIDENCE)
    }

    pub fn display_limit(&self) -> usize {
        self.engine
            .as_ref()
            .and_then(|e| e.display_limit)
            .unwrap_or(defaults::DEFAULT_DISPLAY_LIMIT)
    }

    pub fn max_document_bytes(&self) -> usize {
        self.engine
            .as_ref()
            .and_then(|e| e.max_document_bytes)
            .unwrap_or(defaults::DEFAULT_MAX_DOCUMENT_BYTES)
    }

    pub fn max_anchor_nodes(&self) -> usize {
        self.engine
            .as_ref()
            .and_then(|e| e.max_anchor_nodes)
            .unwrap_or(defaults::DEFAULT_MAX_ANCHOR_NODES)
    }

    pub fn proximity_hops(&self) -> usize {
        self.engine
            .as_ref()
            .and_then(|e| e.proximity_hops)
            .unwrap_or(defaults::DEFAULT_PROXIMITY_HOPS)
    }

    pub fn weights(&self) -> ScoringWeights {
        self.scoring.clone().unwrap_or_default()
    }

    pub fn enabled_locales(&self) -> Vec<String> {
        self.locales
            .as_ref()
            .and_then(|l| l.enabled.clone())
            .unwrap_or_else(|| defaults::SUPPORTED_LOCALES.iter().map(|s| s.to_string()).collect())
    }

    pub fn extra_verbs(&self) -> BTreeMap<String, Intent> {
        self.locales
            .as_ref()
            .map(|l| l.extra_verbs.clone())
            .unwrap_or_default()
    }

    pub fn redact_values(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.redact_values)
            .unwrap_or(true)
    }

    pub fn log_level(&self) -> String {
        self.logging
            .as_ref()
            .and_then(|l| l.level.clone())
            .unwrap_or_else(|| defaults::DEFAULT_LOG_LEVEL.to_string())
    }

    pub fn log_dir(&self) -> Option<String> {
        self.logging.as_ref().and_then(|l| l.dir.clone())
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.server
            .as_ref()
            .and_then(|s| s.request_timeout_secs)
            .unwrap_or(defaults::DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub fn fetch_timeout_secs(&self) -> u64 {
        self.server
            .as_ref()
            .and_then(|s| s.fetch_timeout_secs)
            .unwrap_or(defaults::DEFAULT_FETCH_TIMEOUT_SECS)
    }

    pub fn user_agent(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.user_agent.clone())
            .unwrap_or_else(|| defaults::DEFAULT_USER_AGENT.to_string())
    }

    pub fn allow_fetch(&self) -> bool {
        self.server
            .as_ref()
            .and_then(|s| s.allow_fetch)
            .unwrap_or(true)
    }
}
