//! Locator synthesis.
//!
//! For a chosen element, produce a short CSS selector (validated for uniqueness
//! against the same snapshot) and an anchor-relative structural XPath. When the
//! CSS selector is ambiguous the XPath is the authoritative locator.

pub mod css;
pub mod eval;
pub mod stability;
pub mod xpath;

use pinpoint_core::LocatorKind;
use pinpoint_dom::{Document, NodeId};
use serde::Serialize;
use tracing::warn;

pub use css::{CssLocator, CssStrategy};
pub use eval::{evaluate, PathError};

/// Locators for one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Locators {
    pub css: String,
    pub css_strategy: CssStrategy,
    pub xpath: String,
    /// The CSS selector matches exactly this element.
    pub unique: bool,
    pub authoritative: LocatorKind,
}

/// Build both locators for `node`; `None` only for non-element nodes.
pub fn synthesize(doc: &Document, node: NodeId) -> Option<Locators> {
    let css = css::synthesize(doc, node)?;
    let xpath = xpath::synthesize(doc, node)?;

    match evaluate(doc, &xpath) {
        Ok(hits) if hits == [node] => {}
        Ok(hits) => warn!(%xpath, matches = hits.len(), "Structural path does not isolate its element"),
        Err(e) => warn!(%xpath, error = %e, "Structural path failed to evaluate"),
    }

    let unique = css.is_unique();
    Some(Locators {
        css: css.selector,
        css_strategy: css.strategy,
        xpath,
        unique,
        authoritative: if unique { LocatorKind::Css } else { LocatorKind::Xpath },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_button() {
        let doc = Document::parse(r#"<button id="login">Login</button>"#).unwrap();
        let button = doc.elements().find(|i| doc.tag(*i) == Some("button")).unwrap();
        let locators = synthesize(&doc, button).unwrap();
        assert_eq!(locators.css, "#login");
        assert_eq!(locators.xpath, "//*[@id='login']");
        assert!(locators.unique);
        assert_eq!(locators.authoritative, LocatorKind::Css);
    }

    #[test]
    fn unique_css_matches_exactly_one_element() {
        let doc = Document::parse(
            r#"<form><input name="email"><input name="email"><button class="btn">Go</button></form>"#,
        )
        .unwrap();
        for node in doc.elements().filter(|i| matches!(doc.tag(*i), Some("input" | "button"))) {
            let locators = synthesize(&doc, node).unwrap();
            if locators.unique {
                assert_eq!(doc.select_css(&locators.css).unwrap(), vec![node]);
            }
            assert_eq!(evaluate(&doc, &locators.xpath).unwrap(), vec![node]);
        }
    }

    #[test]
    fn duplicate_ids_fall_back_to_position() {
        let doc = Document::parse(r#"<div id="x"><a id="dup">1</a></div><p><a id="dup">2</a></p>"#).unwrap();
        let second = doc.elements().filter(|i| doc.tag(*i) == Some("a")).nth(1).unwrap();
        let locators = synthesize(&doc, second).unwrap();
        assert_eq!(locators.xpath, "(//*[@id='dup'])[2]");
        assert_eq!(evaluate(&doc, &locators.xpath).unwrap(), vec![second]);
        assert!(locators.unique);
        assert_eq!(locators.css, "html > body > p > a");
    }
}
