//! Typed attribute map.
//!
//! An absent attribute and an empty one are different things: `get` returns
//! `Some("")` for `<input disabled>`, `non_empty` filters blanks.

use serde::Serialize;
use std::collections::BTreeMap;

/// Test-hook attributes, in preference order.
pub const TEST_ID_ATTRIBUTES: &[&str] = &["data-testid", "data-test", "data-qa", "data-cy", "data-test-id"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names are stored lowercase; the first occurrence of a duplicate wins.
    pub fn insert(&mut self, name: &str, value: &str) {
        self.0
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Present and not blank, trimmed.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn id(&self) -> Option<&str> {
        self.non_empty("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.non_empty("name")
    }

    /// First token of the `role` attribute, lowercased.
    pub fn role(&self) -> Option<String> {
        self.non_empty("role")
            .and_then(|r| r.split_whitespace().next())
            .map(str::to_ascii_lowercase)
    }

    /// Lowercased `type`; `None` when the attribute is absent.
    pub fn input_type(&self) -> Option<String> {
        self.non_empty("type").map(str::to_ascii_lowercase)
    }

    pub fn aria_label(&self) -> Option<&str> {
        self.non_empty("aria-label")
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.non_empty("placeholder")
    }

    pub fn title(&self) -> Option<&str> {
        self.non_empty("title")
    }

    /// First non-blank test-hook attribute value.
    pub fn test_id(&self) -> Option<&str> {
        TEST_ID_ATTRIBUTES.iter().find_map(|name| self.non_empty(name))
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class_token(&self, token: &str) -> bool {
        self.classes().any(|c| c.eq_ignore_ascii_case(token))
    }

    /// `data-*` attributes in name order.
    pub fn data_attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(name, _)| name.starts_with("data-"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (name, value) in iter {
            attrs.insert(name, value);
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_differs_from_empty() {
        let attrs: Attributes = [("disabled", ""), ("id", "  ")].into_iter().collect();
        assert_eq!(attrs.get("disabled"), Some(""));
        assert_eq!(attrs.get("checked"), None);
        assert!(attrs.has("id"));
        assert_eq!(attrs.id(), None);
    }

    #[test]
    fn role_and_type_are_normalised() {
        let attrs: Attributes = [("ROLE", "Button link"), ("type", "Checkbox")].into_iter().collect();
        assert_eq!(attrs.role().as_deref(), Some("button"));
        assert_eq!(attrs.input_type().as_deref(), Some("checkbox"));
    }

    #[test]
    fn data_attributes_are_ordered() {
        let attrs: Attributes = [("data-testid", "save"), ("class", "a b"), ("data-action", "x")]
            .into_iter()
            .collect();
        let names: Vec<_> = attrs.data_attributes().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["data-action", "data-testid"]);
        assert!(attrs.has_class_token("B"));
        assert_eq!(attrs.test_id(), Some("save"));
    }
}
