//! Per-query matching context.

use pinpoint_core::text::normalize;
use pinpoint_core::{Intent, Query};
use pinpoint_dom::{Document, NodeId};
use tracing::debug;

/// Normalised query fields and resolved anchor nodes, computed once per request.
#[derive(Debug)]
pub struct QueryContext<'a> {
    pub query: &'a Query,
    pub doc: &'a Document,
    pub proximity_hops: usize,
    target: Option<String>,
    container: Option<String>,
    value: Option<String>,
    anchors: Vec<NodeId>,
}

impl<'a> QueryContext<'a> {
    pub fn new(query: &'a Query, doc: &'a Document, max_anchor_nodes: usize, proximity_hops: usize) -> Self {
        let nonblank = |s: String| (!s.is_empty()).then_some(s);
        let anchors = query
            .anchor
            .as_deref()
            .map(|a| find_anchors(doc, a, max_anchor_nodes))
            .unwrap_or_default();
        Self {
            query,
            doc,
            proximity_hops,
            target: query.phrase().map(normalize).and_then(nonblank),
            container: query.container_phrase().map(normalize).and_then(nonblank),
            value: query.value.as_deref().map(normalize).and_then(nonblank),
            anchors,
        }
    }

    pub fn intent(&self) -> Intent {
        self.query.intent
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn anchors(&self) -> &[NodeId] {
        &self.anchors
    }

    /// Tree distance from `node` to the closest anchor.
    pub fn anchor_distance(&self, node: NodeId) -> Option<usize> {
        self.anchors
            .iter()
            .map(|a| self.doc.tree_distance(*a, node))
            .min()
    }
}

/// Deepest elements whose own text or id names the anchor, in document order.
fn find_anchors(doc: &Document, anchor: &str, limit: usize) -> Vec<NodeId> {
    let needle = normalize(anchor);
    if needle.is_empty() {
        return Vec::new();
    }
    let anchors: Vec<NodeId> = doc
        .elements()
        .filter(|id| {
            let by_text = normalize(&doc.own_text(*id)).contains(&needle);
            let by_id = doc
                .attrs(*id)
                .and_then(|a| a.id())
                .map(|i| normalize(i) == needle)
                .unwrap_or(false);
            by_text || by_id
        })
        .take(limit)
        .collect();
    debug!(anchor, found = anchors.len(), "Resolved relational anchors");
    anchors
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinpoint_intent::QueryParser;

    #[test]
    fn anchors_resolve_by_text_and_id() {
        let doc = Document::parse(
            r#"<div><label>Remember me</label><input type="checkbox"></div>
               <table><tr id="A-1042"><td>A-1042</td><td><button>Edit</button></td></tr></table>"#,
        )
        .unwrap();
        let parser = QueryParser::default();

        let query = parser.parse("tick the checkbox next to Remember me");
        let ctx = QueryContext::new(&query, &doc, 8, 8);
        assert_eq!(ctx.anchors().len(), 1);
        assert_eq!(doc.tag(ctx.anchors()[0]), Some("label"));

        let query = parser.parse("click Edit in row #A-1042");
        let ctx = QueryContext::new(&query, &doc, 8, 8);
        assert_eq!(ctx.anchors().len(), 2);
        assert_eq!(ctx.container(), Some("a 1042"));
        assert_eq!(ctx.target(), Some("edit"));
    }

    #[test]
    fn anchor_count_is_capped() {
        let doc = Document::parse("<p>x</p><p>x</p><p>x</p>").unwrap();
        let parser = QueryParser::default();
        let query = parser.parse("click Go near x");
        let ctx = QueryContext::new(&query, &doc, 2, 8);
        assert_eq!(ctx.anchors().len(), 2);
    }
}
