//! Query Redaction
//!
//! Values typed into fields ("enter hunter2 in Password") must not reach the logs.

use once_cell::sync::Lazy;
use regex::Regex;

const MASK: &str = "[REDACTED]";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}").unwrap());
static TELEPHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});
static LONG_DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:\d[ -]?){12,19}\b").unwrap());

/// Mask emails, phone numbers and card-like digit runs.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = EMAIL_RE.replace_all(input, MASK);
    let redacted = LONG_DIGITS_RE.replace_all(&redacted, MASK);
    TELEPHONE_RE.replace_all(&redacted, MASK).into_owned()
}

/// Mask the parsed value phrase of a query, then any remaining sensitive patterns.
///
/// Only the first whole-word occurrence of the value is masked: that is the span
/// the value was parsed from, since it precedes the field and container phrases.
pub fn redact_query(raw: &str, value: Option<&str>) -> String {
    let masked = match value.map(str::trim).filter(|v| !v.is_empty()).and_then(value_pattern) {
        Some(pattern) => pattern.replacen(raw, 1, MASK).into_owned(),
        None => raw.to_string(),
    };
    redact_sensitive_data(&masked)
}

fn value_pattern(value: &str) -> Option<Regex> {
    let word = |c: char| c.is_alphanumeric() || c == '_';
    let start = if value.starts_with(word) { r"\b" } else { "" };
    let end = if value.ends_with(word) { r"\b" } else { "" };
    Regex::new(&format!("{start}{}{end}", regex::escape(value))).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_value_phrase() {
        let clean = redact_query("enter hunter2 in Password", Some("hunter2"));
        assert_eq!(clean, "enter [REDACTED] in Password");
    }

    #[test]
    fn masks_only_the_value_span() {
        assert_eq!(
            redact_query("enter 5 in row 1542", Some("5")),
            "enter [REDACTED] in row 1542"
        );
        assert_eq!(
            redact_query("enter 2 in Quantity in row 2", Some("2")),
            "enter [REDACTED] in Quantity in row 2"
        );
        assert_eq!(
            redact_query("type 'a+b' into Formula", Some("a+b")),
            "type '[REDACTED]' into Formula"
        );
    }

    #[test]
    fn masks_email_without_value() {
        let clean = redact_query("type jane@example.com into Email", None);
        assert!(!clean.contains("jane@example.com"));
        assert!(clean.contains("Email"));
    }

    #[test]
    fn leaves_plain_queries_alone() {
        assert_eq!(redact_query("click Edit in row #A-1042", None), "click Edit in row #A-1042");
    }
}
