//! Text normalisation shared by the parser, extractor and scorer.
//!
//! Every comparison in the engine goes through [`normalize`] so that both sides
//! of a match are folded the same way.

/// Lowercase, map every non-alphanumeric character to a space and collapse runs
/// of whitespace. `"User_Name:"` and `"user name"` normalise identically.
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Normalised whitespace-separated tokens.
pub fn tokens(input: &str) -> Vec<String> {
    normalize(input)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Collapse internal whitespace and trim, keeping case and punctuation.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(input: &str, max: usize) -> String {
    match input.char_indices().nth(max) {
        Some((idx, _)) => input[..idx].trim_end().to_string(),
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_case_and_separators() {
        assert_eq!(normalize("  User_Name: "), "user name");
        assert_eq!(normalize("#A-1042"), "a 1042");
        assert_eq!(normalize("Éditer"), "éditer");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn tokens_split_normalized_text() {
        assert_eq!(tokens("Click 'Save' now!"), vec!["click", "save", "now"]);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo world", 5), "héllo");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
