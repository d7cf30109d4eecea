//! Detection of framework-generated ids, classes and attribute values.
//!
//! A locator built on a value that changes between builds or renders is worse
//! than a positional one, so anything that looks generated is rejected.

use once_cell::sync::Lazy;
use regex::Regex;

static GENERATED_ID: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d+$",
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
        r"(?i)^[0-9a-f]{10,}$",
        r"^(ember|ext-gen|ext-comp|yui_|gwt-uid-|j_idt|mui-|react-select-|radix-|headlessui-|rc_|__BVID__|uid-|id-)\S*\d",
        r":",
        r"^[a-zA-Z]{1,3}[0-9]{5,}$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static FRAMEWORK_CLASS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^css-[a-z0-9]+$",
        r"^sc-[a-zA-Z0-9]+$",
        r"^jss\d+$",
        r"^(ng-|_ng)",
        r"^svelte-[a-z0-9]+$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static HASHED_CLASS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^[a-zA-Z]+[-_]{1,2}[a-zA-Z0-9]{5,}$",
        r"^[a-zA-Z0-9]*\d[a-zA-Z0-9]*\d[a-zA-Z0-9]*\d",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Classes describing transient state rather than identity.
const STATE_CLASSES: &[&str] = &[
    "active", "selected", "focus", "focused", "hover", "disabled", "open", "opened", "closed",
    "show", "shown", "hidden", "visible", "collapsed", "expanded", "checked", "loading", "error",
    "invalid", "valid", "dirty", "pristine", "touched", "current",
];

/// Longest attribute value worth copying into a locator.
const MAX_VALUE_CHARS: usize = 64;

pub fn is_stable_id(id: &str) -> bool {
    let id = id.trim();
    !id.is_empty() && id.len() <= MAX_VALUE_CHARS && !GENERATED_ID.iter().any(|re| re.is_match(id))
}

pub fn is_stable_class(class: &str) -> bool {
    let lower = class.to_ascii_lowercase();
    if class.is_empty() || STATE_CLASSES.contains(&lower.as_str()) {
        return false;
    }
    if lower.starts_with("is-") || lower.starts_with("has-") {
        return false;
    }
    if FRAMEWORK_CLASS.iter().any(|re| re.is_match(class)) {
        return false;
    }
    // "btn-primary" and "form_field" are words, not hashes.
    if class.split(['-', '_']).all(|part| part.chars().all(|c| c.is_ascii_lowercase())) {
        return true;
    }
    !HASHED_CLASS.iter().any(|re| re.is_match(class))
}

/// Attribute values copied into `[attr="..."]` selectors.
pub fn is_stable_value(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && value.chars().count() <= MAX_VALUE_CHARS
        && !value.contains('\n')
        && !GENERATED_ID[..3].iter().any(|re| re.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids() {
        for id in ["12345", "ember421", ":r1:", "mui-17", "3f2a9c0d1e7b", "j_idt42", "ab123456",
                   "123e4567-e89b-12d3-a456-426614174000"] {
            assert!(!is_stable_id(id), "{id} should be unstable");
        }
        for id in ["login", "A-1042", "user_name", "submit-btn", "step2"] {
            assert!(is_stable_id(id), "{id} should be stable");
        }
    }

    #[test]
    fn generated_classes() {
        for class in ["css-1x2y3z", "sc-bdVaJa", "jss12", "ng-star-inserted", "active", "is-open", "button_x7f3A"] {
            assert!(!is_stable_class(class), "{class} should be unstable");
        }
        for class in ["btn", "btn-primary", "profile-card", "form_field", "col-md-6"] {
            assert!(is_stable_class(class), "{class} should be stable");
        }
    }

    #[test]
    fn attribute_values() {
        assert!(is_stable_value("Save changes"));
        assert!(!is_stable_value("   "));
        assert!(!is_stable_value("9999"));
        assert!(!is_stable_value(&"x".repeat(100)));
    }
}
