//! Anchor-relative structural XPath synthesis.
//!
//! Paths start from the nearest ancestor-or-self carrying a stable id, test id,
//! other `data-*` attribute or role, and descend with tag names, adding `[n]`
//! only where same-tag siblings make a step ambiguous. Without such an anchor the
//! path is absolute from the root element.

use pinpoint_dom::attributes::TEST_ID_ATTRIBUTES;
use pinpoint_dom::{Document, NodeId};

use crate::eval;
use crate::stability::{is_stable_id, is_stable_value};

/// Quote a string as an XPath 1.0 literal, falling back to `concat()` when it
/// contains both quote characters.
pub fn quote_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// `//*[@id='x']`-style step for an anchor element, if it qualifies.
fn anchor_step(doc: &Document, node: NodeId) -> Option<String> {
    let el = doc.element(node)?;
    let attrs = &el.attrs;
    if let Some(id) = attrs.id().filter(|id| is_stable_id(id)) {
        return Some(format!("//*[@id={}]", quote_literal(id)));
    }
    for name in TEST_ID_ATTRIBUTES {
        if let Some(value) = attrs.non_empty(name).filter(|v| is_stable_value(v)) {
            return Some(format!("//*[@{}={}]", name, quote_literal(value)));
        }
    }
    if let Some((name, value)) = attrs
        .data_attributes()
        .find(|(name, value)| !TEST_ID_ATTRIBUTES.contains(name) && is_stable_value(value))
    {
        return Some(format!("//{}[@{}={}]", el.tag, name, quote_literal(value)));
    }
    if let Some(role) = attrs.non_empty("role") {
        return Some(format!("//{}[@role={}]", el.tag, quote_literal(role)));
    }
    None
}

/// `tag` or `tag[n]` relative to the parent.
fn child_step(doc: &Document, node: NodeId) -> Option<String> {
    let tag = doc.tag(node)?;
    let (position, count) = doc.type_position(node);
    Some(if count > 1 {
        format!("{tag}[{position}]")
    } else {
        tag.to_string()
    })
}

/// Anchored step, indexed when the anchor predicate is itself ambiguous.
fn resolved_anchor(doc: &Document, node: NodeId) -> Option<String> {
    let step = anchor_step(doc, node)?;
    let hits = eval::evaluate(doc, &step).ok()?;
    match hits.iter().position(|h| *h == node)? {
        _ if hits.len() == 1 => Some(step),
        index => Some(format!("({step})[{}]", index + 1)),
    }
}

/// Structural path for `node`.
pub fn synthesize(doc: &Document, node: NodeId) -> Option<String> {
    let mut steps = Vec::new();
    let mut current = node;
    loop {
        if let Some(anchor) = resolved_anchor(doc, current) {
            steps.reverse();
            return Some(if steps.is_empty() {
                anchor
            } else {
                format!("{}/{}", anchor, steps.join("/"))
            });
        }
        steps.push(child_step(doc, current)?);
        match doc.parent_element(current) {
            Some(parent) => current = parent,
            None => {
                steps.reverse();
                return Some(format!("/{}", steps.join("/")));
            }
        }
    }
}
