//! Document snapshot.
//!
//! Parses markup once with `scraper` and flattens it into an arena in document
//! order. Ancestor context (wrapping label, fieldset, form, table row/cell, named
//! container, hidden state) is computed top-down during the same pass, so every
//! later lookup is O(1) instead of a per-node upward walk.

use std::collections::HashMap;

use pinpoint_core::LocateError;
use scraper::node::Node as HtmlNode;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::attributes::Attributes;
use crate::classify;

/// Index of a node in document order.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lowercase local name.
    pub tag: String,
    pub attrs: Attributes,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
    /// Document root, doctype, comments and processing instructions.
    Other,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub depth: usize,
    /// 1-based position among element siblings; 0 for non-elements.
    pub element_position: usize,
    /// Index in the parent's `children`.
    pub child_index: usize,
    /// Last node of this subtree in document order; descendants are `id + 1..=subtree_end`.
    pub subtree_end: NodeId,
}

/// Nearest ancestors of interest, excluding the node itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AncestorContext {
    pub label: Option<NodeId>,
    pub fieldset: Option<NodeId>,
    pub form: Option<NodeId>,
    pub row: Option<NodeId>,
    pub cell: Option<NodeId>,
    pub table: Option<NodeId>,
    pub container: Option<NodeId>,
    pub native_control: Option<NodeId>,
    pub hidden: bool,
}

pub struct Document {
    html: Html,
    nodes: Vec<Node>,
    context: Vec<AncestorContext>,
    contains_native: Vec<bool>,
    ids: HashMap<String, NodeId>,
    labels_for: HashMap<String, NodeId>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("ids", &self.ids.len())
            .finish()
    }
}

impl Document {
    /// Parse a serialized document.
    ///
    /// The HTML parser itself never rejects input, so a document is malformed when
    /// there is nothing to parse: empty input or text without any markup.
    pub fn parse(source: &str) -> Result<Self, LocateError> {
        if source.trim().is_empty() {
            return Err(LocateError::MalformedDocument("document is empty".into()));
        }
        if !source.contains('<') {
            return Err(LocateError::MalformedDocument(
                "document contains no markup".into(),
            ));
        }

        let html = Html::parse_document(source);
        let doc = Self::from_html(html);
        debug!(nodes = doc.nodes.len(), ids = doc.ids.len(), "Parsed document");
        Ok(doc)
    }

    /// Flatten an already-parsed tree.
    pub fn from_html(html: Html) -> Self {
        let mut nodes: Vec<Node> = Vec::new();
        let mut context: Vec<AncestorContext> = Vec::new();
        let mut ids = HashMap::new();
        let mut labels_for = HashMap::new();
        let mut index = HashMap::new();
        let mut element_counts: Vec<usize> = Vec::new();

        for node_ref in html.tree.root().descendants() {
            let idx = nodes.len();
            index.insert(node_ref.id(), idx);

            let parent = node_ref.parent().and_then(|p| index.get(&p.id()).copied());
            let kind = match node_ref.value() {
                HtmlNode::Element(el) => NodeKind::Element(ElementData {
                    tag: el.name().to_ascii_lowercase(),
                    attrs: el.attrs().collect(),
                }),
                HtmlNode::Text(text) => {
                    let content: &str = &text.text;
                    NodeKind::Text(content.to_string())
                }
                _ => NodeKind::Other,
            };

            let (depth, element_position, child_index, ctx) = match parent {
                Some(p) => {
                    let position = if matches!(kind, NodeKind::Element(_)) {
                        element_counts[p] += 1;
                        element_counts[p]
                    } else {
                        0
                    };
                    let child_index = nodes[p].children.len();
                    nodes[p].children.push(idx);
                    (
                        nodes[p].depth + 1,
                        position,
                        child_index,
                        child_context(&context[p], p, &nodes[p]),
                    )
                }
                None => (0, 0, 0, AncestorContext::default()),
            };

            if let NodeKind::Element(el) = &kind {
                if let Some(id) = el.attrs.id() {
                    ids.entry(id.to_string()).or_insert(idx);
                }
                if el.tag == "label" {
                    if let Some(target) = el.attrs.non_empty("for") {
                        labels_for.entry(target.to_string()).or_insert(idx);
                    }
                }
            }

            nodes.push(Node {
                kind,
                parent,
                children: Vec::new(),
                depth,
                element_position,
                child_index,
                subtree_end: idx,
            });
            context.push(ctx);
            element_counts.push(0);
        }

        // Bottom-up: children always follow their parent in document order.
        let mut contains_native = vec![false; nodes.len()];
        for idx in (0..nodes.len()).rev() {
            let Some(parent) = nodes[idx].parent else { continue };
            let end = nodes[idx].subtree_end;
            if end > nodes[parent].subtree_end {
                nodes[parent].subtree_end = end;
            }
            let native_here = match &nodes[idx].kind {
                NodeKind::Element(el) => classify::is_native_control(el),
                _ => false,
            };
            if native_here || contains_native[idx] {
                contains_native[parent] = true;
            }
        }

        Self {
            html,
            nodes,
            context,
            contains_native,
            ids,
            labels_for,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn attrs(&self, id: NodeId) -> Option<&Attributes> {
        self.element(id).map(|el| &el.attrs)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// Parent only if it is an element (stops at the document root).
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.element(*p).is_some())
    }

    pub fn context(&self, id: NodeId) -> &AncestorContext {
        &self.context[id]
    }

    /// Element ids in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).filter(|i| matches!(self.nodes[*i].kind, NodeKind::Element(_)))
    }

    /// Descendant elements of `id` in document order, excluding `id` itself.
    pub fn descendant_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        (id + 1..=self.nodes[id].subtree_end)
            .filter(|i| matches!(self.nodes[*i].kind, NodeKind::Element(_)))
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .filter(|c| matches!(self.nodes[*c].kind, NodeKind::Element(_)))
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        if self.context[id].hidden {
            return false;
        }
        self.element(id).map(|el| !classify::is_self_hidden(el)).unwrap_or(true)
    }

    /// Whether any descendant is a native control.
    pub fn contains_native_control(&self, id: NodeId) -> bool {
        self.contains_native[id]
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// The first `<label for=...>` pointing at `id`.
    pub fn label_for(&self, id: &str) -> Option<NodeId> {
        self.labels_for.get(id).copied()
    }

    /// Visible text of a subtree, whitespace-collapsed.
    pub fn text_of(&self, id: NodeId) -> String {
        self.text_of_except(id, None)
    }

    /// Subtree text leaving out one nested subtree (a control inside its label).
    pub fn text_of_except(&self, id: NodeId, skip: Option<NodeId>) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if Some(current) == skip {
                continue;
            }
            match &self.nodes[current].kind {
                NodeKind::Text(t) => parts.push(t),
                NodeKind::Element(el) if classify::NON_TEXT_TAGS.contains(&el.tag.as_str()) => {
                    continue
                }
                _ => {}
            }
            stack.extend(self.nodes[current].children.iter().rev().copied());
        }
        collapse(&parts)
    }

    /// Text of direct text children only.
    pub fn own_text(&self, id: NodeId) -> String {
        let parts: Vec<&str> = self.nodes[id]
            .children
            .iter()
            .filter_map(|c| match &self.nodes[*c].kind {
                NodeKind::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        collapse(&parts)
    }

    /// Collapsed content of a text node.
    pub fn text_node(&self, id: NodeId) -> Option<String> {
        match &self.nodes[id].kind {
            NodeKind::Text(t) => Some(collapse(&[t.as_str()])),
            _ => None,
        }
    }

    /// (1-based position, count) among element siblings sharing the tag.
    pub fn type_position(&self, id: NodeId) -> (usize, usize) {
        let Some(tag) = self.tag(id) else { return (1, 1) };
        let Some(parent) = self.parent(id) else { return (1, 1) };
        let mut position = 0;
        let mut count = 0;
        for sibling in self.element_children(parent) {
            if self.tag(sibling) == Some(tag) {
                count += 1;
                if sibling == id {
                    position = count;
                }
            }
        }
        (position.max(1), count.max(1))
    }

    /// Number of edges on the tree path between two nodes.
    pub fn tree_distance(&self, a: NodeId, b: NodeId) -> usize {
        let (mut x, mut y) = (a, b);
        let mut hops = 0;
        while self.nodes[x].depth > self.nodes[y].depth {
            x = self.nodes[x].parent.unwrap_or(x);
            hops += 1;
        }
        while self.nodes[y].depth > self.nodes[x].depth {
            y = self.nodes[y].parent.unwrap_or(y);
            hops += 1;
        }
        while x != y {
            match (self.nodes[x].parent, self.nodes[y].parent) {
                (Some(px), Some(py)) => {
                    x = px;
                    y = py;
                    hops += 2;
                }
                _ => break,
            }
        }
        hops
    }

    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        ancestor < id && id <= self.nodes[ancestor].subtree_end
    }

    /// Elements matching a parsed selector, in document order.
    pub fn select(&self, selector: &Selector) -> Vec<NodeId> {
        // The arena was built from this same pre-order walk, so positions line up.
        self.html
            .tree
            .root()
            .descendants()
            .enumerate()
            .filter_map(|(idx, node_ref)| {
                let element = ElementRef::wrap(node_ref)?;
                selector.matches(&element).then_some(idx)
            })
            .collect()
    }

    /// Parse and evaluate a CSS selector; `None` if it does not parse.
    pub fn select_css(&self, css: &str) -> Option<Vec<NodeId>> {
        let selector = Selector::parse(css).ok()?;
        Some(self.select(&selector))
    }
}

fn collapse(parts: &[&str]) -> String {
    let mut out = String::new();
    for word in parts.iter().flat_map(|p| p.split_whitespace()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

fn child_context(parent_ctx: &AncestorContext, parent_id: NodeId, parent: &Node) -> AncestorContext {
    let mut ctx = *parent_ctx;
    let NodeKind::Element(el) = &parent.kind else {
        return ctx;
    };

    match el.tag.as_str() {
        "label" => ctx.label = Some(parent_id),
        "fieldset" => ctx.fieldset = Some(parent_id),
        "form" => ctx.form = Some(parent_id),
        "tr" => {
            ctx.row = Some(parent_id);
            ctx.cell = None;
        }
        "td" | "th" => ctx.cell = Some(parent_id),
        "table" => {
            ctx.table = Some(parent_id);
            ctx.row = None;
            ctx.cell = None;
        }
        _ => {}
    }
    match el.attrs.role().as_deref() {
        Some("row") => {
            ctx.row = Some(parent_id);
            ctx.cell = None;
        }
        Some("cell" | "gridcell" | "columnheader" | "rowheader") => ctx.cell = Some(parent_id),
        Some("grid" | "table" | "treegrid") => {
            ctx.table = Some(parent_id);
            ctx.row = None;
            ctx.cell = None;
        }
        _ => {}
    }

    if classify::is_native_control(el) {
        ctx.native_control = Some(parent_id);
    }
    if classify::container_kind(el).is_some() {
        ctx.container = Some(parent_id);
    }
    ctx.hidden |= classify::is_self_hidden(el);
    ctx
}
