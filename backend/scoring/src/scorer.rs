//! Applies the rule table to feature records.

use pinpoint_config::PinpointConfig;
use pinpoint_core::{Query, SignalScore};
use pinpoint_dom::{Document, FeatureRecord};
use serde::Serialize;

use crate::compat;
use crate::context::QueryContext;
use crate::rules::{RecordView, RuleTable};

/// Score and explanation for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scored {
    /// Sum of all contributions, floored at zero.
    pub total: u32,
    pub breakdown: Vec<SignalScore>,
    pub intent_compatible: bool,
}

#[derive(Debug, Clone)]
pub struct Scorer {
    table: RuleTable,
    max_anchor_nodes: usize,
    proximity_hops: usize,
}

impl Scorer {
    pub fn new(table: RuleTable, max_anchor_nodes: usize, proximity_hops: usize) -> Self {
        Self {
            table,
            max_anchor_nodes,
            proximity_hops,
        }
    }

    pub fn from_config(config: &PinpointConfig) -> Self {
        Self::new(
            RuleTable::from_weights(&config.weights()),
            config.max_anchor_nodes(),
            config.proximity_hops(),
        )
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn context<'a>(&self, query: &'a Query, doc: &'a Document) -> QueryContext<'a> {
        QueryContext::new(query, doc, self.max_anchor_nodes, self.proximity_hops)
    }

    pub fn score(&self, ctx: &QueryContext<'_>, record: &FeatureRecord) -> Scored {
        let view = RecordView::new(record);
        let breakdown: Vec<SignalScore> = self
            .table
            .rules()
            .iter()
            .filter_map(|rule| {
                rule.apply(ctx, record, &view).map(|points| SignalScore {
                    signal: rule.signal,
                    points,
                })
            })
            .collect();
        let sum: i64 = breakdown.iter().map(|s| s.points).sum();
        Scored {
            total: u32::try_from(sum.max(0)).unwrap_or(u32::MAX),
            breakdown,
            intent_compatible: compat::intent_compatibility(ctx.intent(), record) != Some(false),
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::from_config(&PinpointConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinpoint_core::Signal;
    use pinpoint_dom::{extract, scope_records, Document};
    use pinpoint_intent::QueryParser;

    fn score_all(html: &str, q: &str) -> Vec<(String, Scored)> {
        let doc = Document::parse(html).unwrap();
        let query = QueryParser::default().parse(q);
        let scorer = Scorer::default();
        let ctx = scorer.context(&query, &doc);
        let mut records = extract(&doc);
        if let Some(clause) = &query.container {
            records = scope_records(records, clause).records;
        }
        records
            .iter()
            .map(|r| (r.text.clone(), scorer.score(&ctx, r)))
            .collect()
    }

    fn has(scored: &Scored, signal: Signal) -> bool {
        scored.breakdown.iter().any(|s| s.signal == signal)
    }

    #[test]
    fn exact_label_beats_partial() {
        let scored = score_all(
            r#"<label for="u">Username</label><input id="u">
               <label for="n">Username hint</label><input id="n">"#,
            "enter Surya in Username",
        );
        assert!(has(&scored[0].1, Signal::ExactMatch));
        assert!(!has(&scored[0].1, Signal::PartialMatch));
        assert!(has(&scored[1].1, Signal::PartialMatch));
        assert!(scored[0].1.total > scored[1].1.total);
    }

    #[test]
    fn credential_form_outranks_lookalike_field() {
        let scored = score_all(
            r#"<form><label for="s">Username</label><input id="s"><button>Search</button></form>
               <form><label for="u">Username</label><input id="u"><input type="password" name="pw"></form>"#,
            "enter Surya in Username",
        );
        let form_points = |s: &Scored| {
            s.breakdown
                .iter()
                .find(|b| b.signal == Signal::FormContext)
                .map(|b| b.points)
        };
        assert_eq!(form_points(&scored[0].1), Some(5));
        assert_eq!(form_points(&scored[2].1), Some(10));
        assert!(scored[2].1.total > scored[0].1.total);
    }

    #[test]
    fn intent_mismatch_penalises_and_floors_at_zero() {
        let scored = score_all(r#"<input name="q" style="display:none">"#, "click Checkout");
        let s = &scored[0].1;
        assert!(has(s, Signal::IntentMismatch));
        assert!(has(s, Signal::Hidden));
        assert!(!s.intent_compatible);
        assert_eq!(s.total, 0);
    }

    #[test]
    fn container_fallback_is_penalised() {
        let scored = score_all(
            r#"<section aria-label="Profile"><button>Edit</button></section>"#,
            "click Edit in Billing section",
        );
        assert!(has(&scored[0].1, Signal::ContainerMismatch));
        assert_eq!(scored[0].1.total, 100 + 25 - 20);
    }

    #[test]
    fn option_and_hint_signals() {
        let scored = score_all(
            r#"<label for="c">Country</label><select id="c"><option>India</option><option>Peru</option></select>"#,
            "select India from Country dropdown",
        );
        let s = &scored[0].1;
        assert!(has(s, Signal::OptionMatch));
        assert!(has(s, Signal::TagHint));
        assert!(has(s, Signal::ExactMatch));
        assert_eq!(s.total, 100 + 25 + 15 + 20);
    }

    #[test]
    fn proximity_prefers_the_closer_control() {
        let scored = score_all(
            r#"<div><span>Remember me</span><input type="checkbox" id="a"></div>
               <div><div><div><input type="checkbox" id="b"></div></div></div>"#,
            "tick the checkbox next to Remember me",
        );
        let near = scored[0].1.breakdown.iter().find(|s| s.signal == Signal::Proximity).map(|s| s.points);
        let far = scored[1].1.breakdown.iter().find(|s| s.signal == Signal::Proximity).map(|s| s.points);
        assert!(near.unwrap_or(0) > far.unwrap_or(0));
    }
}
