//! Fuzzy text similarity on normalised strings.
//!
//! Token Jaccard blended with character-trigram overlap: tokens reward whole-word
//! agreement, trigrams tolerate inflection and typos ("adress" vs "address").

use std::collections::HashSet;

const TOKEN_WEIGHT: f64 = 0.6;
const TRIGRAM_WEIGHT: f64 = 0.4;

fn token_set(s: &str) -> HashSet<&str> {
    s.split(' ').filter(|t| !t.is_empty()).collect()
}

fn trigrams(s: &str) -> HashSet<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        return HashSet::new();
    }
    if chars.len() <= 3 {
        return HashSet::from([s.to_string()]);
    }
    chars.windows(3).map(|w| w.iter().collect()).collect()
}

fn jaccard<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Similarity in `0.0..=1.0` of two normalised strings.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let tokens = jaccard(&token_set(a), &token_set(b));
    let grams = jaccard(&trigrams(a), &trigrams(b));
    TOKEN_WEIGHT * tokens + TRIGRAM_WEIGHT * grams
}

/// Whether `needle` occurs in `haystack` on word boundaries.
pub fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }
    haystack == needle
        || haystack.starts_with(&format!("{needle} "))
        || haystack.ends_with(&format!(" {needle}"))
        || haystack.contains(&format!(" {needle} "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_are_fully_similar() {
        assert!((similarity("user name", "user name") - 1.0).abs() < 1e-9);
        assert_eq!(similarity("", "x"), 0.0);
    }

    #[test]
    fn typos_still_overlap() {
        let close = similarity("adress", "address");
        let far = similarity("adress", "password");
        assert!(close > far);
        assert!(close > 0.15);
    }

    #[test]
    fn word_boundaries() {
        assert!(contains_words("save changes", "save"));
        assert!(contains_words("click to save now", "save"));
        assert!(!contains_words("unsaved", "save"));
    }
}
