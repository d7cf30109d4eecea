use serde::{Deserialize, Serialize};

/// Score given to the single candidate produced by a literal selector query.
pub const LITERAL_SCORE: u32 = 1000;

/// Independent scoring signals. Each rule in the scorer's table contributes
/// points under one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Signal {
    ExactMatch,
    PartialMatch,
    ContextMatch,
    WidgetHeuristic,
    TagIntent,
    TagHint,
    OptionMatch,
    Proximity,
    FormContext,
    IntentMismatch,
    ContainerMismatch,
    Hidden,
    LiteralSelector,
}

/// Points one signal contributed to a candidate (negative for penalties).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalScore {
    pub signal: Signal,
    pub points: i64,
}

/// Which of a candidate's locators should be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
    Css,
    Xpath,
}

/// Identifying attributes of a candidate's element, for showing and picking
/// alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `data-testid`, `data-test`, `data-qa` or similar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_test_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A scored element with its generated locators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub tag: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub attributes: AttributeSummary,
    pub score: u32,
    /// Populated only for synthesized candidates.
    pub css: Option<String>,
    pub xpath: Option<String>,
    pub unique: bool,
    pub authoritative: Option<LocatorKind>,
    pub intent_compatible: bool,
    pub breakdown: Vec<SignalScore>,
    /// Position in document order.
    pub order: usize,
}

impl Candidate {
    pub fn is_synthesized(&self) -> bool {
        self.css.is_some()
    }
}

/// Output of a locate request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    pub best: Option<Candidate>,
    pub candidates: Vec<Candidate>,
    pub total_candidates: usize,
}

impl RankedResult {
    pub fn empty() -> Self {
        Self::default()
    }
}
