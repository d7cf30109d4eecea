//! Literal selector detection.
//!
//! A query is taken verbatim as a CSS selector when it is written like one:
//! selector punctuation in every compound and a clean parse. A trailing bracketed
//! fragment (`click save [data-testid=save]`) also counts.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;

static TRAILING_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<head>.*?)\s*(?P<frag>(?:[A-Za-z][A-Za-z0-9-]*)?(?:\[[^\[\]]+\])+)\s*$").unwrap()
});

/// Tag names accepted as bare compounds in a descendant selector (`form #login`).
const BARE_TAGS: &[&str] = &[
    "a", "button", "div", "form", "input", "label", "li", "nav", "section", "select", "span",
    "table", "td", "textarea", "tr", "ul", "main", "header", "footer", "dialog", "aside",
];

const COMBINATORS: &[&str] = &[">", "+", "~"];

/// A literal selector found in a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralMatch {
    pub selector: String,
    /// Text before a trailing fragment; empty when the whole query is the selector.
    pub rest: String,
}

/// Whether `candidate` parses as a CSS selector.
pub fn parses(candidate: &str) -> bool {
    Selector::parse(candidate).is_ok()
}

/// Detect a literal selector in a trimmed query.
pub fn detect(query: &str) -> Option<LiteralMatch> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    if looks_like_selector(query) && parses(query) {
        return Some(LiteralMatch {
            selector: query.to_string(),
            rest: String::new(),
        });
    }

    let caps = TRAILING_FRAGMENT.captures(query)?;
    let fragment = caps.name("frag")?.as_str();
    let head = caps.name("head").map(|m| m.as_str()).unwrap_or_default();
    // "[data-testid=save]" glued to a preceding word ("save[x]") is not a fragment.
    if !head.is_empty() && !query[head.len()..].starts_with(char::is_whitespace) {
        return None;
    }
    parses(fragment).then(|| LiteralMatch {
        selector: fragment.to_string(),
        rest: head.trim().to_string(),
    })
}

fn looks_like_selector(query: &str) -> bool {
    if !query.contains(['#', '.', '[']) {
        return false;
    }
    compounds(query).iter().all(|part| {
        COMBINATORS.contains(&part.as_str())
            || part.contains(['#', '.', '[', ':', '>'])
            || BARE_TAGS.contains(&part.to_ascii_lowercase().as_str())
    })
}

/// Whitespace-separated parts, ignoring whitespace inside brackets and quotes.
fn compounds(query: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for ch in query.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_query_selectors() {
        for q in ["#login", "button[name=go]", ".btn.primary", "form #login", "[aria-label='Save changes']"] {
            let m = detect(q).unwrap_or_else(|| panic!("{q} should be literal"));
            assert_eq!(m.selector, q);
            assert!(m.rest.is_empty());
        }
    }

    #[test]
    fn natural_language_is_not_literal() {
        assert!(detect("click Edit in row #A-1042").is_none());
        assert!(detect("Save changes.").is_none());
        assert!(detect("click Login button").is_none());
    }

    #[test]
    fn trailing_fragment() {
        let m = detect("click save [data-testid=save]").unwrap();
        assert_eq!(m.selector, "[data-testid=save]");
        assert_eq!(m.rest, "click save");

        let m = detect("press button[name=go]").unwrap();
        assert_eq!(m.selector, "button[name=go]");
        assert_eq!(m.rest, "press");
    }
}
