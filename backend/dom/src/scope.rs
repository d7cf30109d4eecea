//! Container scoping of feature records.

use pinpoint_core::text::normalize;
use pinpoint_core::{ContainerClause, ContainerKind};
use tracing::debug;

use crate::features::FeatureRecord;

/// Result of restricting records to a named container.
#[derive(Debug, Clone)]
pub struct Scoped {
    pub records: Vec<FeatureRecord>,
    /// No container matched; every record carries `container_mismatch`.
    pub fell_back: bool,
}

/// Keep records whose container chain is labelled (or identified) by the clause.
///
/// A row clause ("in row 2", "in row #A-1042") is first matched exactly against
/// each record's row key and 1-based row index. Otherwise, and when no row
/// matches, the phrase is a case-insensitive substring test on normalised
/// container labels and ids, so a leading `#` is ignored. When nothing matches,
/// all records are returned flagged as mismatched rather than dropping the
/// candidate set.
pub fn scope_records(records: Vec<FeatureRecord>, clause: &ContainerClause) -> Scoped {
    let needle = normalize(&clause.phrase);
    if needle.is_empty() {
        return Scoped {
            records,
            fell_back: false,
        };
    }

    if clause.kind == Some(ContainerKind::Row) {
        let rows = keep(&records, |r| r.table.as_ref().is_some_and(|t| t.matches_row(&needle)));
        if !rows.is_empty() {
            debug!(phrase = %clause.phrase, kept = rows.len(), "Scoped records to row");
            return Scoped {
                records: rows,
                fell_back: false,
            };
        }
    }

    let matched = keep(&records, |r| r.scope_keys.iter().any(|k| k.contains(&needle)));
    if !matched.is_empty() {
        debug!(phrase = %clause.phrase, kept = matched.len(), "Scoped records to container");
        return Scoped {
            records: matched,
            fell_back: false,
        };
    }

    debug!(phrase = %clause.phrase, "No container matched, falling back to all records");
    let records = records
        .into_iter()
        .map(|mut r| {
            r.container_mismatch = true;
            r
        })
        .collect();
    Scoped {
        records,
        fell_back: true,
    }
}

fn keep(records: &[FeatureRecord], matches: impl Fn(&FeatureRecord) -> bool) -> Vec<FeatureRecord> {
    records
        .iter()
        .filter(|r| matches(r))
        .cloned()
        .map(|mut r| {
            r.in_container = true;
            r
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::extract::extract;

    const PAGE: &str = r#"
        <section aria-label="Profile"><button>Edit</button></section>
        <section><h2>Billing</h2><button>Edit</button></section>
        <table><tr id="A-1042"><td>A-1042</td><td><button>Edit</button></td></tr></table>"#;

    fn clause(phrase: &str, kind: Option<ContainerKind>) -> ContainerClause {
        ContainerClause {
            phrase: phrase.into(),
            kind,
        }
    }

    fn scope(html: &str, phrase: &str, kind: Option<ContainerKind>) -> Scoped {
        let doc = Document::parse(html).unwrap();
        scope_records(extract(&doc), &clause(phrase, kind))
    }

    #[test]
    fn keeps_only_matching_container() {
        let scoped = scope(PAGE, "billing", Some(ContainerKind::Section));
        assert!(!scoped.fell_back);
        assert_eq!(scoped.records.len(), 1);
        assert_eq!(scoped.records[0].container_label(), Some("Billing"));
        assert!(scoped.records[0].in_container);
    }

    #[test]
    fn hash_prefixed_row_ids_match() {
        let scoped = scope(PAGE, "#A-1042", Some(ContainerKind::Row));
        assert_eq!(scoped.records.len(), 1);
        assert!(scoped.records[0].table.is_some());
    }

    #[test]
    fn row_number_matches_index_not_row_text() {
        let html = r#"<table>
            <tr><td>Alice</td><td>12</td><td><button>Edit</button></td></tr>
            <tr><td>Bob</td><td>30</td><td><button>Edit</button></td></tr>
            <tr><td>Carol</td><td>45</td><td><button>Edit</button></td></tr>
        </table>"#;
        let scoped = scope(html, "2", Some(ContainerKind::Row));
        assert!(!scoped.fell_back);
        assert_eq!(scoped.records.len(), 1);
        let row = scoped.records[0].table.as_ref().unwrap();
        assert_eq!(row.row_index, 2);
        assert_eq!(scoped.records[0].container_label(), Some("Bob 30 Edit"));
    }

    #[test]
    fn row_clause_falls_back_to_row_text() {
        let html = r#"<table>
            <tr><td>Alice</td><td><button>Edit</button></td></tr>
            <tr><td>Bob</td><td><button>Edit</button></td></tr>
        </table>"#;
        let scoped = scope(html, "Bob", Some(ContainerKind::Row));
        assert_eq!(scoped.records.len(), 1);
        assert_eq!(scoped.records[0].table.as_ref().unwrap().row_index, 2);
    }

    #[test]
    fn unmatched_scope_flags_everything() {
        let scoped = scope(PAGE, "Shipping", None);
        assert!(scoped.fell_back);
        assert_eq!(scoped.records.len(), 3);
        assert!(scoped.records.iter().all(|r| r.container_mismatch && !r.in_container));
    }
}
