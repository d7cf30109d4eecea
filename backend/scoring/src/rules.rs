//! The scoring rule table.
//!
//! Each rule pairs a [`Signal`] with a configured weight and a matcher. A matcher
//! returns a strength in `1..=100` when its signal fires; the rule contributes
//! `weight * strength / 100` points. Penalties carry negative weights.

use pinpoint_config::ScoringWeights;
use pinpoint_core::text::normalize;
use pinpoint_core::{Intent, Signal};
use pinpoint_dom::FeatureRecord;

use crate::compat;
use crate::context::QueryContext;
use crate::similarity::{contains_words, similarity};

/// Full strength for binary signals.
pub const FULL: u8 = 100;

/// Fuzzy similarity below this is noise.
const MIN_FUZZY_STRENGTH: u8 = 25;

/// Precomputed normalised views of a record, shared by every matcher.
#[derive(Debug, Clone, Default)]
pub struct RecordView {
    /// Text, label and naming attributes that can equal the target.
    pub names: Vec<String>,
    pub container_label: Option<String>,
    pub options: Vec<String>,
}

impl RecordView {
    pub fn new(record: &FeatureRecord) -> Self {
        let mut names = Vec::new();
        let mut push = |s: Option<&str>| {
            if let Some(s) = s {
                let n = normalize(s);
                if !n.is_empty() && !names.contains(&n) {
                    names.push(n);
                }
            }
        };
        push(Some(record.text.as_str()));
        push(record.label_text());
        push(record.attrs.non_empty("value"));
        push(record.attrs.aria_label());
        push(record.attrs.placeholder());
        push(record.attrs.title());
        push(record.attrs.name());
        push(record.attrs.id());
        push(record.attrs.non_empty("alt"));

        Self {
            names,
            container_label: record.container_label().map(normalize).filter(|l| !l.is_empty()),
            options: record.options.iter().map(|o| normalize(o)).collect(),
        }
    }
}

pub type Matcher = fn(&QueryContext<'_>, &FeatureRecord, &RecordView) -> Option<u8>;

#[derive(Clone)]
pub struct Rule {
    pub signal: Signal,
    pub weight: i64,
    pub matcher: Matcher,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("signal", &self.signal)
            .field("weight", &self.weight)
            .finish()
    }
}

impl Rule {
    /// Points this rule awards, if it fires.
    pub fn apply(&self, ctx: &QueryContext<'_>, record: &FeatureRecord, view: &RecordView) -> Option<i64> {
        let strength = (self.matcher)(ctx, record, view)?;
        let points = self.weight * i64::from(strength.min(FULL)) / i64::from(FULL);
        (points != 0).then_some(points)
    }
}

/// Ordered rule set; immutable once built.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn from_weights(weights: &ScoringWeights) -> Self {
        let rule = |signal, weight, matcher: Matcher| Rule {
            signal,
            weight,
            matcher,
        };
        Self {
            rules: vec![
                rule(Signal::ExactMatch, weights.exact_match, exact_match),
                rule(Signal::PartialMatch, weights.partial_match, partial_match),
                rule(Signal::ContextMatch, weights.context_match, context_match),
                rule(Signal::WidgetHeuristic, weights.widget_heuristic, widget_heuristic),
                rule(Signal::TagIntent, weights.tag_intent, tag_intent),
                rule(Signal::TagHint, weights.tag_hint, tag_hint),
                rule(Signal::OptionMatch, weights.option_match, option_match),
                rule(Signal::Proximity, weights.proximity, proximity),
                rule(Signal::FormContext, weights.form_context, form_context),
                rule(Signal::IntentMismatch, -weights.intent_mismatch_penalty, intent_mismatch),
                rule(Signal::ContainerMismatch, -weights.container_mismatch_penalty, container_mismatch),
                rule(Signal::Hidden, -weights.hidden_penalty, hidden),
            ],
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::from_weights(&ScoringWeights::default())
    }
}

// ---------------------------------------------------------------------------
// Matchers
// ---------------------------------------------------------------------------

fn exact_match(ctx: &QueryContext<'_>, _: &FeatureRecord, view: &RecordView) -> Option<u8> {
    let target = ctx.target()?;
    view.names.iter().any(|n| n == target).then_some(FULL)
}

/// Best containment or fuzzy overlap; silent whenever an exact match exists.
fn partial_match(ctx: &QueryContext<'_>, record: &FeatureRecord, view: &RecordView) -> Option<u8> {
    if exact_match(ctx, record, view).is_some() {
        return None;
    }
    let target = ctx.target()?;
    view.names
        .iter()
        .map(|name| {
            if contains_words(name, target) || contains_words(target, name) {
                let (short, long) = if name.len() < target.len() {
                    (name.len(), target.len())
                } else {
                    (target.len(), name.len())
                };
                (60 + 40 * short / long.max(1)) as u8
            } else {
                let fuzzy = (similarity(name, target) * 90.0).round() as u8;
                if fuzzy >= MIN_FUZZY_STRENGTH {
                    fuzzy
                } else {
                    0
                }
            }
        })
        .max()
        .filter(|s| *s > 0)
}

fn context_match(ctx: &QueryContext<'_>, record: &FeatureRecord, view: &RecordView) -> Option<u8> {
    if ctx.container().is_some() && record.in_container {
        return Some(FULL);
    }
    let target = ctx.target()?;
    let label = view.container_label.as_deref()?;
    contains_words(label, target).then_some(FULL / 2)
}

fn widget_heuristic(ctx: &QueryContext<'_>, record: &FeatureRecord, _: &RecordView) -> Option<u8> {
    let widget = record.widget?;
    compat::widget_suits(widget, ctx.intent()).then_some(FULL)
}

fn tag_intent(ctx: &QueryContext<'_>, record: &FeatureRecord, _: &RecordView) -> Option<u8> {
    match compat::intent_compatibility(ctx.intent(), record) {
        Some(true) if ctx.intent() != Intent::Focus => Some(FULL),
        _ => None,
    }
}

fn tag_hint(ctx: &QueryContext<'_>, record: &FeatureRecord, _: &RecordView) -> Option<u8> {
    let hint = ctx.query.tag_hint?;
    compat::hint_matches(hint, record).then_some(FULL)
}

fn option_match(ctx: &QueryContext<'_>, _: &FeatureRecord, view: &RecordView) -> Option<u8> {
    let value = ctx.value()?;
    if view.options.iter().any(|o| o == value) {
        Some(FULL)
    } else if view.options.iter().any(|o| contains_words(o, value)) {
        Some(60)
    } else {
        None
    }
}

/// Closer to the relational anchor scores higher; nothing past the hop limit.
fn proximity(ctx: &QueryContext<'_>, record: &FeatureRecord, _: &RecordView) -> Option<u8> {
    let distance = ctx.anchor_distance(record.node)?;
    let hops = ctx.proximity_hops.max(1);
    let remaining = hops - distance.min(hops);
    let strength = (remaining * usize::from(FULL) / hops) as u8;
    (strength > 0).then_some(strength)
}

/// The enclosing form mentions the target, or is a credential form and the
/// query types into a field.
fn form_context(ctx: &QueryContext<'_>, record: &FeatureRecord, _: &RecordView) -> Option<u8> {
    let form = record.form.as_ref()?;
    let mut strength = 0;
    if ctx.target().is_some_and(|t| contains_words(&form.text, t)) {
        strength += FULL / 2;
    }
    if form.has_password && ctx.intent() == Intent::Input {
        strength += FULL / 2;
    }
    (strength > 0).then_some(strength)
}

fn intent_mismatch(ctx: &QueryContext<'_>, record: &FeatureRecord, _: &RecordView) -> Option<u8> {
    (compat::intent_compatibility(ctx.intent(), record) == Some(false)).then_some(FULL)
}

fn container_mismatch(_: &QueryContext<'_>, record: &FeatureRecord, _: &RecordView) -> Option<u8> {
    record.container_mismatch.then_some(FULL)
}

fn hidden(_: &QueryContext<'_>, record: &FeatureRecord, _: &RecordView) -> Option<u8> {
    (!record.visible).then_some(FULL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalties_are_negated() {
        let table = RuleTable::default();
        let hidden = table.rules().iter().find(|r| r.signal == Signal::Hidden).unwrap();
        assert_eq!(hidden.weight, -50);
        let exact = table.rules().iter().find(|r| r.signal == Signal::ExactMatch).unwrap();
        assert_eq!(exact.weight, 100);
        assert_eq!(table.rules().len(), 12);
    }

    #[test]
    fn view_deduplicates_names() {
        let doc = pinpoint_dom::Document::parse(r#"<button id="save" aria-label="Save">Save</button>"#).unwrap();
        let record = pinpoint_dom::extract(&doc).remove(0);
        let view = RecordView::new(&record);
        assert_eq!(view.names, vec!["save".to_string()]);
    }
}
