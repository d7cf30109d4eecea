//! Candidate construction, ordering and locator attachment.

use pinpoint_core::text::truncate_chars;
use pinpoint_core::{
    AttributeSummary, Candidate, LocatorKind, RankedResult, Signal, SignalScore, LITERAL_SCORE,
};
use pinpoint_dom::extract::MAX_TEXT_CHARS;
use pinpoint_dom::{Attributes, Document, FeatureRecord, NodeId};
use pinpoint_locator::xpath;
use pinpoint_scoring::Scored;

/// A candidate still tied to its node, before locators are attached.
#[derive(Debug, Clone)]
pub(crate) struct Ranked {
    pub node: NodeId,
    pub candidate: Candidate,
}

impl Ranked {
    pub fn new(record: &FeatureRecord, scored: Scored) -> Self {
        Self {
            node: record.node,
            candidate: Candidate {
                tag: record.tag.clone(),
                text: record.text.clone(),
                label: record.label_text().map(str::to_string),
                attributes: summarize(&record.attrs),
                score: scored.total,
                css: None,
                xpath: None,
                unique: false,
                authoritative: None,
                intent_compatible: scored.intent_compatible,
                breakdown: scored.breakdown,
                order: record.node,
            },
        }
    }

    /// Fill in CSS and XPath locators for this candidate.
    pub fn synthesize(&mut self, doc: &Document) {
        if let Some(locators) = pinpoint_locator::synthesize(doc, self.node) {
            self.candidate.css = Some(locators.css);
            self.candidate.xpath = Some(locators.xpath);
            self.candidate.unique = locators.unique;
            self.candidate.authoritative = Some(locators.authoritative);
        }
    }
}

fn summarize(attrs: &Attributes) -> AttributeSummary {
    let owned = |v: Option<&str>| v.map(str::to_string);
    AttributeSummary {
        id: owned(attrs.id()),
        name: owned(attrs.name()),
        data_test_id: owned(attrs.test_id()),
        aria_label: owned(attrs.aria_label()),
        placeholder: owned(attrs.placeholder()),
        role: attrs.role(),
    }
}

/// Descending score, then ascending document order.
pub(crate) fn sort(ranked: &mut [Ranked]) {
    ranked.sort_by(|a, b| {
        b.candidate
            .score
            .cmp(&a.candidate.score)
            .then(a.candidate.order.cmp(&b.candidate.order))
    });
}

/// Single-candidate result for a literal selector: the first match in document
/// order, reported with the selector text itself as its CSS locator.
pub(crate) fn literal(doc: &Document, selector: &str) -> RankedResult {
    let Some(hits) = doc.select_css(selector) else {
        tracing::debug!(selector, "Literal selector does not parse");
        return RankedResult::empty();
    };
    let Some(&first) = hits.first() else {
        return RankedResult::empty();
    };

    let unique = hits.len() == 1;
    let candidate = Candidate {
        tag: doc.tag(first).unwrap_or_default().to_string(),
        text: truncate_chars(&doc.text_of(first), MAX_TEXT_CHARS),
        label: None,
        attributes: doc.attrs(first).map(summarize).unwrap_or_default(),
        score: LITERAL_SCORE,
        css: Some(selector.to_string()),
        xpath: xpath::synthesize(doc, first),
        unique,
        authoritative: Some(if unique { LocatorKind::Css } else { LocatorKind::Xpath }),
        intent_compatible: true,
        breakdown: vec![SignalScore {
            signal: Signal::LiteralSelector,
            points: i64::from(LITERAL_SCORE),
        }],
        order: first,
    };

    RankedResult {
        best: Some(candidate.clone()),
        candidates: vec![candidate],
        total_candidates: hits.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(score: u32, order: usize) -> Ranked {
        Ranked {
            node: order,
            candidate: Candidate {
                tag: "button".into(),
                text: String::new(),
                label: None,
                attributes: AttributeSummary::default(),
                score,
                css: None,
                xpath: None,
                unique: false,
                authoritative: None,
                intent_compatible: true,
                breakdown: Vec::new(),
                order,
            },
        }
    }

    #[test]
    fn sorts_by_score_then_document_order() {
        let mut list = vec![ranked(10, 1), ranked(40, 5), ranked(40, 2), ranked(0, 0), ranked(10, 3)];
        sort(&mut list);
        let order: Vec<(u32, usize)> = list.iter().map(|r| (r.candidate.score, r.candidate.order)).collect();
        assert_eq!(order, vec![(40, 2), (40, 5), (10, 1), (10, 3), (0, 0)]);
    }

    #[test]
    fn candidates_carry_identifying_attributes() {
        let doc = Document::parse(
            r#"<input id="email" name="email" data-qa="signup-email" placeholder="you@example.com" role="textbox">"#,
        )
        .unwrap();
        let record = pinpoint_dom::extract(&doc).remove(0);
        let scored = Scored {
            total: 0,
            breakdown: Vec::new(),
            intent_compatible: true,
        };
        let attrs = Ranked::new(&record, scored).candidate.attributes;
        assert_eq!(attrs.id.as_deref(), Some("email"));
        assert_eq!(attrs.name.as_deref(), Some("email"));
        assert_eq!(attrs.data_test_id.as_deref(), Some("signup-email"));
        assert_eq!(attrs.placeholder.as_deref(), Some("you@example.com"));
        assert_eq!(attrs.role.as_deref(), Some("textbox"));
        assert!(attrs.aria_label.is_none());
    }

    #[test]
    fn literal_takes_first_match() {
        let doc = Document::parse(r#"<a data-x="1">one</a><a data-x="1">two</a>"#).unwrap();
        let result = literal(&doc, r#"a[data-x="1"]"#);
        let best = result.best.unwrap();
        assert_eq!(best.text, "one");
        assert_eq!(best.score, LITERAL_SCORE);
        assert_eq!(best.css.as_deref(), Some(r#"a[data-x="1"]"#));
        assert!(!best.unique);
        assert_eq!(best.authoritative, Some(LocatorKind::Xpath));
        assert_eq!(result.total_candidates, 2);
        assert_eq!(result.candidates.len(), 1);
    }

    #[test]
    fn literal_without_match_is_empty() {
        let doc = Document::parse("<p>nothing here</p>").unwrap();
        assert_eq!(literal(&doc, "button[name=go]"), RankedResult::empty());
        assert_eq!(literal(&doc, "[[["), RankedResult::empty());
    }
}
