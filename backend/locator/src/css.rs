//! Short CSS selector synthesis.
//!
//! Strategies run from most to least durable. Each produces selector candidates
//! that are checked against the document; the first one resolving to exactly the
//! target element wins. Attribute values are always copied from the element.

use pinpoint_dom::attributes::TEST_ID_ATTRIBUTES;
use pinpoint_dom::{Document, NodeId};
use serde::Serialize;

use crate::stability::{is_stable_class, is_stable_id, is_stable_value};

const ACCESSIBLE_TEXT_ATTRIBUTES: &[&str] = &["aria-label", "title", "alt", "value"];

/// Most class tokens combined into one selector.
const MAX_CLASS_TOKENS: usize = 3;

/// Which strategy produced a CSS selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CssStrategy {
    Id,
    TestId,
    DataAttribute,
    Name,
    AriaLabel,
    Placeholder,
    RoleText,
    InputType,
    ClassTokens,
    Positional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssLocator {
    pub selector: String,
    pub strategy: CssStrategy,
    /// Number of elements the selector matches.
    pub matches: usize,
}

impl CssLocator {
    pub fn is_unique(&self) -> bool {
        self.matches == 1
    }
}

/// Escape a string for use as a CSS identifier (`#id`, `.class`).
pub fn escape_ident(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let chars: Vec<char> = value.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        let leading_digit = c.is_ascii_digit() && (i == 0 || (i == 1 && chars[0] == '-'));
        if c == '\0' {
            out.push('\u{FFFD}');
        } else if c.is_control() || leading_digit {
            out.push_str(&format!("\\{:x} ", c as u32));
        } else if i == 0 && c == '-' && chars.len() == 1 {
            out.push_str("\\-");
        } else if !c.is_ascii() || c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// Quote a string as a CSS attribute value.
pub fn quote_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\a "),
            c if c.is_control() => out.push_str(&format!("\\{:x} ", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn attr_selector(tag: Option<&str>, name: &str, value: &str) -> String {
    format!("{}[{}={}]", tag.unwrap_or(""), name, quote_value(value))
}

/// Matches of `selector`, or `None` if it does not parse or misses `node`.
fn resolve(doc: &Document, selector: &str, node: NodeId) -> Option<usize> {
    let hits = doc.select_css(selector)?;
    hits.contains(&node).then_some(hits.len())
}

/// Ordered candidate selectors for one element.
fn candidates(doc: &Document, node: NodeId) -> Vec<(CssStrategy, String)> {
    let Some(el) = doc.element(node) else {
        return Vec::new();
    };
    let tag = el.tag.as_str();
    let attrs = &el.attrs;
    let mut out = Vec::new();

    if let Some(id) = attrs.id().filter(|id| is_stable_id(id)) {
        out.push((CssStrategy::Id, format!("#{}", escape_ident(id))));
        out.push((CssStrategy::Id, format!("{}#{}", tag, escape_ident(id))));
    }

    for name in TEST_ID_ATTRIBUTES {
        if let Some(value) = attrs.non_empty(name).filter(|v| is_stable_value(v)) {
            out.push((CssStrategy::TestId, attr_selector(None, name, value)));
            out.push((CssStrategy::TestId, attr_selector(Some(tag), name, value)));
        }
    }

    for (name, value) in attrs.data_attributes() {
        if TEST_ID_ATTRIBUTES.contains(&name) || !is_stable_value(value) {
            continue;
        }
        out.push((CssStrategy::DataAttribute, attr_selector(Some(tag), name, value)));
    }

    if let Some(name) = attrs.name().filter(|v| is_stable_value(v)) {
        out.push((CssStrategy::Name, attr_selector(Some(tag), "name", name)));
    }

    if let Some(label) = attrs.aria_label().filter(|v| is_stable_value(v)) {
        out.push((CssStrategy::AriaLabel, attr_selector(Some(tag), "aria-label", label)));
    }
    if let Some(placeholder) = attrs.placeholder().filter(|v| is_stable_value(v)) {
        out.push((CssStrategy::Placeholder, attr_selector(Some(tag), "placeholder", placeholder)));
    }

    if let Some(role) = attrs.non_empty("role") {
        for text_attr in ACCESSIBLE_TEXT_ATTRIBUTES {
            if let Some(value) = attrs.non_empty(text_attr).filter(|v| is_stable_value(v)) {
                out.push((
                    CssStrategy::RoleText,
                    format!(
                        "{}[role={}][{}={}]",
                        tag,
                        quote_value(role),
                        text_attr,
                        quote_value(value)
                    ),
                ));
            }
        }
    }

    if tag == "input" {
        if let Some(input_type) = attrs.non_empty("type") {
            out.push((CssStrategy::InputType, attr_selector(Some(tag), "type", input_type)));
        }
    }

    let classes: Vec<String> = attrs
        .classes()
        .filter(|c| is_stable_class(c))
        .map(escape_ident)
        .take(MAX_CLASS_TOKENS)
        .collect();
    for n in 1..=classes.len() {
        for combo in combinations(&classes, n) {
            out.push((CssStrategy::ClassTokens, format!("{}.{}", tag, combo.join("."))));
        }
    }

    out
}

fn combinations(items: &[String], n: usize) -> Vec<Vec<String>> {
    if n == 0 {
        return vec![Vec::new()];
    }
    let mut out = Vec::new();
    for (i, item) in items.iter().enumerate() {
        for mut rest in combinations(&items[i + 1..], n - 1) {
            rest.insert(0, item.clone());
            out.push(rest);
        }
    }
    out
}

/// Unique selector for an ancestor used as a positional anchor.
fn anchor_selector(doc: &Document, node: NodeId) -> Option<String> {
    let attrs = doc.attrs(node)?;
    let id = attrs.id().filter(|id| is_stable_id(id))?;
    let selector = format!("#{}", escape_ident(id));
    (resolve(doc, &selector, node) == Some(1)).then_some(selector)
}

/// `anchor > tag:nth-of-type(n) > ...`, rooted at the nearest uniquely
/// identifiable ancestor or at the document root.
pub fn positional(doc: &Document, node: NodeId) -> Option<String> {
    let mut steps = Vec::new();
    let mut current = node;
    loop {
        let tag = doc.tag(current)?;
        let (position, count) = doc.type_position(current);
        steps.push(if count > 1 {
            format!("{tag}:nth-of-type({position})")
        } else {
            tag.to_string()
        });

        let Some(parent) = doc.parent_element(current) else {
            // `current` is the root element.
            steps.reverse();
            return Some(steps.join(" > "));
        };
        if let Some(anchor) = anchor_selector(doc, parent) {
            steps.push(anchor);
            steps.reverse();
            return Some(steps.join(" > "));
        }
        current = parent;
    }
}

/// Best CSS selector for `node`: the first unique strategy, else the best
/// non-unique one.
pub fn synthesize(doc: &Document, node: NodeId) -> Option<CssLocator> {
    let mut fallback: Option<CssLocator> = None;
    for (strategy, selector) in candidates(doc, node) {
        let Some(matches) = resolve(doc, &selector, node) else {
            continue;
        };
        let locator = CssLocator {
            selector,
            strategy,
            matches,
        };
        if locator.is_unique() {
            return Some(locator);
        }
        if fallback.is_none() {
            fallback = Some(locator);
        }
    }

    if let Some(selector) = positional(doc, node) {
        if let Some(matches) = resolve(doc, &selector, node) {
            let locator = CssLocator {
                selector,
                strategy: CssStrategy::Positional,
                matches,
            };
            if locator.is_unique() || fallback.is_none() {
                return Some(locator);
            }
        }
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(doc: &Document, tag: &str) -> NodeId {
        doc.elements().find(|i| doc.tag(*i) == Some(tag)).unwrap()
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_ident("login"), "login");
        assert_eq!(escape_ident("1st"), "\\31 st");
        assert_eq!(escape_ident("a.b"), "a\\.b");
        assert_eq!(quote_value(r#"say "hi""#), r#""say \"hi\"""#);
    }

    #[test]
    fn id_wins_when_stable() {
        let doc = Document::parse(r#"<button id="login">Login</button>"#).unwrap();
        let css = synthesize(&doc, first(&doc, "button")).unwrap();
        assert_eq!(css.selector, "#login");
        assert_eq!(css.strategy, CssStrategy::Id);
        assert!(css.is_unique());
    }

    #[test]
    fn generated_id_falls_through_to_test_id() {
        let doc = Document::parse(r#"<button id="ember421" data-testid="save">Save</button>"#).unwrap();
        let css = synthesize(&doc, first(&doc, "button")).unwrap();
        assert_eq!(css.selector, r#"[data-testid="save"]"#);
    }

    #[test]
    fn duplicate_names_are_skipped() {
        let doc = Document::parse(
            r#"<input name="q" placeholder="Search site"><input name="q" placeholder="Search docs">"#,
        )
        .unwrap();
        let second = doc.elements().filter(|i| doc.tag(*i) == Some("input")).nth(1).unwrap();
        let css = synthesize(&doc, second).unwrap();
        assert_eq!(css.selector, r#"input[placeholder="Search docs"]"#);
        assert_eq!(css.strategy, CssStrategy::Placeholder);
    }

    #[test]
    fn class_combinations() {
        let doc = Document::parse(
            r#"<a class="btn primary">A</a><a class="btn">B</a><a class="primary">C</a>"#,
        )
        .unwrap();
        let css = synthesize(&doc, first(&doc, "a")).unwrap();
        assert_eq!(css.selector, "a.btn.primary");
    }

    #[test]
    fn positional_from_anchor_or_root() {
        let doc = Document::parse(
            r#"<div id="toolbar"><span></span><button>A</button><button>B</button></div>
               <ul><li>x</li><li><button>C</button></li></ul>"#,
        )
        .unwrap();
        let buttons: Vec<_> = doc.elements().filter(|i| doc.tag(*i) == Some("button")).collect();

        let css = synthesize(&doc, buttons[1]).unwrap();
        assert_eq!(css.selector, "#toolbar > button:nth-of-type(2)");
        assert_eq!(css.strategy, CssStrategy::Positional);

        let css = synthesize(&doc, buttons[2]).unwrap();
        assert_eq!(css.selector, "html > body > ul > li:nth-of-type(2) > button");
        assert!(css.is_unique());
    }
}
