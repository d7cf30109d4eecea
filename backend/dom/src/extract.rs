//! Feature extraction over eligible elements.
//!
//! One pass over the arena in document order. Container labels, table row lists,
//! header rows and form summaries are resolved lazily and cached for the lifetime
//! of the pass; subtree scans use the arena's pre-order ranges.

use std::collections::HashMap;

use pinpoint_core::text::{normalize, truncate_chars};
use pinpoint_core::ContainerKind;
use tracing::debug;

use crate::classify;
use crate::document::{Document, NodeId};
use crate::features::{ContainerInfo, FeatureRecord, FormInfo, Label, LabelSource, TableContext};

/// Longest text kept on a record.
pub const MAX_TEXT_CHARS: usize = 200;

/// Sibling text longer than this is content, not a label.
const MAX_SIBLING_LABEL_CHARS: usize = 80;

/// How many preceding siblings are inspected for label-like text.
const SIBLING_LOOKBACK: usize = 3;

/// Longest form text kept for matching.
const MAX_FORM_TEXT_CHARS: usize = 600;

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

const LABEL_LIKE_TAGS: &[&str] = &[
    "label", "span", "div", "p", "strong", "b", "em", "dt", "th", "td", "small",
];

/// Whether an element becomes a candidate.
pub fn is_eligible(doc: &Document, id: NodeId) -> bool {
    let Some(el) = doc.element(id) else {
        return false;
    };
    if classify::is_native_control(el)
        || classify::has_interactive_role(el)
        || classify::is_content_editable(el)
    {
        return true;
    }
    classify::widget_kind(el).is_some()
        && doc.context(id).native_control.is_none()
        && !doc.contains_native_control(id)
}

/// Build a record for every eligible element, in document order.
pub fn extract(doc: &Document) -> Vec<FeatureRecord> {
    let mut extractor = Extractor::new(doc);
    let records: Vec<FeatureRecord> = doc
        .elements()
        .filter(|id| is_eligible(doc, *id))
        .filter_map(|id| extractor.record(id))
        .collect();
    debug!(eligible = records.len(), "Extracted feature records");
    records
}

struct Extractor<'d> {
    doc: &'d Document,
    container_labels: HashMap<NodeId, Option<String>>,
    table_rows: HashMap<NodeId, Vec<NodeId>>,
    /// 1-based row index within its table, filled alongside `table_rows`.
    row_indexes: HashMap<NodeId, usize>,
    table_headers: HashMap<NodeId, Vec<String>>,
    forms: HashMap<NodeId, FormInfo>,
}

impl<'d> Extractor<'d> {
    fn new(doc: &'d Document) -> Self {
        Self {
            doc,
            container_labels: HashMap::new(),
            table_rows: HashMap::new(),
            row_indexes: HashMap::new(),
            table_headers: HashMap::new(),
            forms: HashMap::new(),
        }
    }

    fn record(&mut self, id: NodeId) -> Option<FeatureRecord> {
        let doc = self.doc;
        let el = doc.element(id)?;
        let ctx = *doc.context(id);

        let text = self.visible_text(id);
        let label = self.label(id, !text.is_empty());
        let container = ctx.container.map(|c| {
            let kind = doc
                .element(c)
                .and_then(classify::container_kind)
                .unwrap_or(ContainerKind::Region);
            ContainerInfo {
                node: c,
                kind,
                label: self.container_label(c),
            }
        });
        let table = self.table_context(id);
        let scope_keys = self.scope_keys(id);

        Some(FeatureRecord {
            node: id,
            tag: el.tag.clone(),
            attrs: el.attrs.clone(),
            role: classify::effective_role(el),
            text,
            label,
            container,
            form: ctx.form.map(|f| self.form_info(f)),
            table,
            sibling_index: doc.node(id).element_position,
            visible: doc.is_visible(id),
            widget: classify::widget_kind(el),
            options: self.options(id),
            scope_keys,
            in_container: false,
            container_mismatch: false,
        })
    }

    fn visible_text(&self, id: NodeId) -> String {
        let doc = self.doc;
        let text = match doc.element(id) {
            // Button-like inputs show their value.
            Some(el) if el.tag == "input" => match el.attrs.input_type().as_deref() {
                Some("submit" | "reset" | "button") => {
                    el.attrs.non_empty("value").unwrap_or_default().to_string()
                }
                _ => String::new(),
            },
            Some(el) if el.tag == "select" => String::new(),
            _ => doc.text_of(id),
        };
        truncate_chars(&text, MAX_TEXT_CHARS)
    }

    // -- labels -------------------------------------------------------------

    fn label(&mut self, id: NodeId, has_text: bool) -> Option<Label> {
        let doc = self.doc;
        let attrs = doc.attrs(id)?;

        if let Some(label) = attrs.id().and_then(|i| doc.label_for(i)) {
            let text = doc.text_of_except(label, Some(id));
            if !text.is_empty() {
                return Some(Label {
                    text,
                    source: LabelSource::LabelFor,
                });
            }
        }

        if let Some(ids) = attrs.non_empty("aria-labelledby") {
            let text = ids
                .split_whitespace()
                .filter_map(|i| doc.element_by_id(i))
                .map(|n| doc.text_of(n))
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !text.is_empty() {
                return Some(Label {
                    text,
                    source: LabelSource::AriaLabelledBy,
                });
            }
        }

        if let Some(wrapping) = doc.context(id).label {
            let text = doc.text_of_except(wrapping, Some(id));
            if !text.is_empty() {
                return Some(Label {
                    text,
                    source: LabelSource::Wrapping,
                });
            }
        }

        if let Some(text) = self.preceding_sibling_text(id) {
            return Some(Label {
                text,
                source: LabelSource::PrecedingSibling,
            });
        }

        if let Some(text) = doc.context(id).fieldset.and_then(|f| self.legend(f)) {
            return Some(Label {
                text,
                source: LabelSource::Legend,
            });
        }

        if has_text {
            return None;
        }
        let container = doc.context(id).container?;
        // A row's label is its whole text, which says nothing about one cell.
        if doc.element(container).and_then(classify::container_kind) == Some(ContainerKind::Row) {
            return None;
        }
        let text = self.container_label(container)?;
        Some(Label {
            text,
            source: LabelSource::ContainerHeading,
        })
    }

    fn preceding_sibling_text(&self, id: NodeId) -> Option<String> {
        let doc = self.doc;
        let parent = doc.parent(id)?;
        let siblings = &doc.node(parent).children;
        let position = doc.node(id).child_index;

        let mut inspected = 0;
        for sibling in siblings[..position].iter().rev().copied() {
            if inspected >= SIBLING_LOOKBACK {
                break;
            }
            let text = match doc.element(sibling) {
                Some(el) => {
                    if classify::is_native_control(el) || doc.contains_native_control(sibling) {
                        return None;
                    }
                    if !LABEL_LIKE_TAGS.contains(&el.tag.as_str()) {
                        inspected += 1;
                        continue;
                    }
                    doc.text_of(sibling)
                }
                None => doc.text_node(sibling).unwrap_or_default(),
            };
            if text.is_empty() {
                continue;
            }
            inspected += 1;
            if text.chars().count() <= MAX_SIBLING_LABEL_CHARS {
                return Some(text);
            }
        }
        None
    }

    fn legend(&self, fieldset: NodeId) -> Option<String> {
        self.doc
            .element_children(fieldset)
            .find(|c| self.doc.tag(*c) == Some("legend"))
            .map(|l| self.doc.text_of(l))
            .filter(|t| !t.is_empty())
    }

    /// First heading (or caption) inside a container.
    fn heading_within(&self, container: NodeId) -> Option<String> {
        let doc = self.doc;
        doc.descendant_elements(container)
            .find(|e| {
                let Some(el) = doc.element(*e) else { return false };
                HEADING_TAGS.contains(&el.tag.as_str())
                    || matches!(el.tag.as_str(), "legend" | "caption" | "summary")
                    || el.attrs.role().as_deref() == Some("heading")
            })
            .map(|h| doc.text_of(h))
            .filter(|t| !t.is_empty())
    }

    // -- containers ---------------------------------------------------------

    fn container_label(&mut self, container: NodeId) -> Option<String> {
        if let Some(cached) = self.container_labels.get(&container) {
            return cached.clone();
        }
        let label = self.resolve_container_label(container);
        self.container_labels.insert(container, label.clone());
        label
    }

    fn resolve_container_label(&self, container: NodeId) -> Option<String> {
        let doc = self.doc;
        let el = doc.element(container)?;
        if let Some(aria) = el.attrs.aria_label() {
            return Some(aria.to_string());
        }
        if let Some(ids) = el.attrs.non_empty("aria-labelledby") {
            let text = ids
                .split_whitespace()
                .filter_map(|i| doc.element_by_id(i))
                .map(|n| doc.text_of(n))
                .collect::<Vec<_>>()
                .join(" ");
            if !text.trim().is_empty() {
                return Some(text);
            }
        }
        if classify::container_kind(el) == Some(ContainerKind::Row) {
            let text = truncate_chars(&doc.text_of(container), MAX_TEXT_CHARS);
            return Some(text).filter(|t| !t.is_empty());
        }
        self.heading_within(container)
    }

    /// Normalised label and id of every enclosing container.
    fn scope_keys(&mut self, id: NodeId) -> Vec<String> {
        let mut keys = Vec::new();
        let mut current = self.doc.context(id).container;
        while let Some(container) = current {
            if let Some(label) = self.container_label(container) {
                let key = normalize(&label);
                if !key.is_empty() {
                    keys.push(key);
                }
            }
            if let Some(row_key) = self.row_key_attr(container) {
                let key = normalize(&row_key);
                if !key.is_empty() {
                    keys.push(key);
                }
            }
            if let Some(explicit) = self.doc.attrs(container).and_then(|a| a.id()) {
                let key = normalize(explicit);
                if !key.is_empty() {
                    keys.push(key);
                }
            }
            current = self.doc.context(container).container;
        }
        keys
    }

    // -- tables -------------------------------------------------------------

    fn row_key_attr(&self, row: NodeId) -> Option<String> {
        let attrs = self.doc.attrs(row)?;
        if let Some(id) = attrs.id() {
            return Some(id.to_string());
        }
        attrs
            .data_attributes()
            .map(|(_, v)| v.trim())
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn rows_of(&mut self, table: NodeId) -> &Vec<NodeId> {
        let doc = self.doc;
        let row_indexes = &mut self.row_indexes;
        self.table_rows.entry(table).or_insert_with(|| {
            let rows: Vec<NodeId> = doc
                .descendant_elements(table)
                .filter(|e| is_row(doc, *e) && doc.context(*e).table == Some(table))
                .collect();
            for (i, row) in rows.iter().enumerate() {
                row_indexes.insert(*row, i + 1);
            }
            rows
        })
    }

    fn headers_of(&mut self, table: NodeId) -> &Vec<String> {
        let doc = self.doc;
        if !self.table_headers.contains_key(&table) {
            let rows = self.rows_of(table).clone();
            let header_row = rows.into_iter().find(|r| {
                doc.element_children(*r).any(|c| {
                    doc.tag(c) == Some("th")
                        || doc.attrs(c).and_then(|a| a.role()).as_deref() == Some("columnheader")
                })
            });
            let headers = header_row
                .map(|r| doc.element_children(r).map(|c| doc.text_of(c)).collect())
                .unwrap_or_default();
            self.table_headers.insert(table, headers);
        }
        &self.table_headers[&table]
    }

    fn table_context(&mut self, id: NodeId) -> Option<TableContext> {
        let doc = self.doc;
        let ctx = *doc.context(id);
        let row = ctx.row?;

        if let Some(table) = ctx.table {
            self.rows_of(table);
        }
        let row_index = self
            .row_indexes
            .get(&row)
            .copied()
            .unwrap_or(doc.node(row).element_position);

        let column_index = ctx
            .cell
            .filter(|cell| doc.parent(*cell) == Some(row))
            .map(|cell| doc.node(cell).element_position);
        let column_header = match (ctx.table, column_index) {
            (Some(table), Some(col)) => self
                .headers_of(table)
                .get(col - 1)
                .cloned()
                .filter(|h| !h.is_empty()),
            _ => None,
        };

        Some(TableContext {
            row,
            row_key: self.row_key_attr(row).unwrap_or_else(|| row_index.to_string()),
            row_index,
            column_index,
            column_header,
        })
    }

    // -- forms --------------------------------------------------------------

    fn form_info(&mut self, form: NodeId) -> FormInfo {
        let doc = self.doc;
        self.forms
            .entry(form)
            .or_insert_with(|| FormInfo {
                node: form,
                has_password: doc.descendant_elements(form).any(|e| {
                    doc.tag(e) == Some("input")
                        && doc.attrs(e).and_then(|a| a.input_type()).as_deref() == Some("password")
                }),
                text: normalize(&truncate_chars(&doc.text_of(form), MAX_FORM_TEXT_CHARS)),
            })
            .clone()
    }

    // -- options ------------------------------------------------------------

    fn options(&self, id: NodeId) -> Vec<String> {
        let doc = self.doc;
        let Some(el) = doc.element(id) else {
            return Vec::new();
        };
        let is_list = el.tag == "select"
            || matches!(classify::effective_role(el).as_deref(), Some("listbox" | "combobox"));
        if !is_list {
            return Vec::new();
        }
        doc.descendant_elements(id)
            .filter(|e| {
                doc.tag(*e) == Some("option")
                    || doc.attrs(*e).and_then(|a| a.role()).as_deref() == Some("option")
            })
            .map(|o| doc.text_of(o))
            .filter(|t| !t.is_empty())
            .collect()
    }
}

fn is_row(doc: &Document, id: NodeId) -> bool {
    doc.tag(id) == Some("tr") || doc.attrs(id).and_then(|a| a.role()).as_deref() == Some("row")
}
