//! Terminal output utilities: notes, ANSI formatting and the candidate table.

use pinpoint_core::{Candidate, RankedResult};

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm'
            for next in chars.by_ref() {
                if next == 'm' { break; }
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn paint(style: &str, s: &str) -> String {
    if supports_color() {
        format!("{style}{s}{RESET}")
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

/// Column alignment.
pub enum Align { Left, Right }

/// A table column definition.
pub struct Column {
    pub header: String,
    pub align: Align,
    pub max_width: Option<usize>,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Left, max_width: None }
    }
    pub fn right(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Right, max_width: None }
    }
    pub fn max(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }
}

/// Render a table with given columns and rows. Cells wider than a column's
/// `max_width` are cut with an ellipsis.
pub fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let num_cols = columns.len();
    let mut widths: Vec<usize> = columns.iter().map(|c| strip_ansi(&c.header).chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(num_cols) {
            let w = strip_ansi(cell).chars().count();
            let w = columns[i].max_width.map_or(w, |max| w.min(max));
            widths[i] = widths[i].max(w);
        }
    }

    let mut out = String::new();

    let header_cells: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| pad_cell(&col.header, widths[i], &col.align))
        .collect();
    out.push_str(&paint(BOLD, &format!("  {}  ", header_cells.join("  "))));
    out.push('\n');

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}  \n", sep.join("  ")));

    for row in rows {
        let cells: Vec<String> = (0..num_cols)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                pad_cell(&clip(cell, widths[i]), widths[i], &columns[i].align)
            })
            .collect();
        out.push_str(&format!("  {}  \n", cells.join("  ")));
    }

    out
}

fn clip(s: &str, width: usize) -> String {
    let plain = strip_ansi(s);
    if plain.chars().count() <= width {
        return s.to_string();
    }
    let mut cut: String = plain.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn pad_cell(s: &str, width: usize, align: &Align) -> String {
    let visible_len = strip_ansi(s).chars().count();
    let pad = width.saturating_sub(visible_len);
    match align {
        Align::Left => format!("{s}{}", " ".repeat(pad)),
        Align::Right => format!("{}{s}", " ".repeat(pad)),
    }
}

// ---------------------------------------------------------------------------
// Ranked results
// ---------------------------------------------------------------------------

fn candidate_row(rank: usize, candidate: &Candidate, is_best: bool) -> Vec<String> {
    let marker = if is_best { paint(GREEN, "★") } else { String::new() };
    let unique = match (candidate.is_synthesized(), candidate.unique) {
        (false, _) => paint(DIM, "-"),
        (true, true) => "yes".to_string(),
        (true, false) => paint(YELLOW, "no"),
    };
    vec![
        format!("{marker}{rank}"),
        candidate.score.to_string(),
        candidate.tag.clone(),
        candidate.label.clone().unwrap_or_else(|| candidate.text.clone()),
        candidate.css.clone().unwrap_or_default(),
        unique,
    ]
}

/// Human-readable ranking, best first.
pub fn render_result(result: &RankedResult) -> String {
    let columns = [
        Column::right("#"),
        Column::right("Score"),
        Column::left("Tag"),
        Column::left("Text").max(40),
        Column::left("CSS").max(60),
        Column::left("Unique"),
    ];
    let best_order = result.best.as_ref().map(|b| b.order);
    let rows: Vec<Vec<String>> = result
        .candidates
        .iter()
        .enumerate()
        .map(|(i, c)| candidate_row(i + 1, c, Some(c.order) == best_order))
        .collect();

    let mut out = render_table(&columns, &rows);
    out.push_str(&format!("\n  {} candidate(s) evaluated\n", result.total_candidates));
    match &result.best {
        Some(best) => {
            if let Some(xpath) = &best.xpath {
                out.push_str(&format!("  best xpath: {xpath}\n"));
            }
        }
        None => out.push_str(&format!("  {}\n", paint(YELLOW, "no candidate passed the confidence threshold"))),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ansi() {
        let colored = format!("{GREEN}hello{RESET}");
        assert_eq!(strip_ansi(&colored), "hello");
    }

    #[test]
    fn renders_table() {
        let cols = vec![Column::left("Name"), Column::right("Count")];
        let rows = vec![
            vec!["Alice".to_string(), "42".to_string()],
            vec!["Bob".to_string(), "7".to_string()],
        ];
        let table = render_table(&cols, &rows);
        assert!(table.contains("Alice"));
        assert!(table.contains("42"));
    }

    #[test]
    fn clips_wide_cells() {
        let cols = vec![Column::left("Text").max(5)];
        let rows = vec![vec!["Save all changes".to_string()]];
        let table = strip_ansi(&render_table(&cols, &rows));
        assert!(table.contains("Save…"));
        assert!(!table.contains("changes"));
    }

    #[test]
    fn empty_result_mentions_threshold() {
        let out = strip_ansi(&render_result(&RankedResult::empty()));
        assert!(out.contains("0 candidate(s)"));
        assert!(out.contains("confidence threshold"));
    }
}
