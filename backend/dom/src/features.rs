//! Per-element feature records.

use pinpoint_core::text::normalize;
use pinpoint_core::ContainerKind;
use serde::Serialize;

use crate::attributes::Attributes;
use crate::classify::WidgetKind;
use crate::document::NodeId;

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Where a label was found, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelSource {
    LabelFor,
    AriaLabelledBy,
    Wrapping,
    PrecedingSibling,
    Legend,
    ContainerHeading,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub text: String,
    pub source: LabelSource,
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Nearest named container of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub node: NodeId,
    pub kind: ContainerKind,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableContext {
    pub row: NodeId,
    /// `id` or first `data-*` value of the row, else its 1-based index.
    pub row_key: String,
    pub row_index: usize,
    /// 1-based cell position within the row.
    pub column_index: Option<usize>,
    pub column_header: Option<String>,
}

impl TableContext {
    /// Exact match of a normalised row phrase against the row key or index.
    pub fn matches_row(&self, needle: &str) -> bool {
        normalize(&self.row_key) == needle || self.row_index.to_string() == needle
    }
}

/// Enclosing `<form>` of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInfo {
    pub node: NodeId,
    /// The form holds a password field (a sign-in or sign-up form).
    pub has_password: bool,
    /// Normalised form text, truncated.
    pub text: String,
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRecord {
    pub node: NodeId,
    pub tag: String,
    pub attrs: Attributes,
    pub role: Option<String>,
    pub text: String,
    pub label: Option<Label>,
    pub container: Option<ContainerInfo>,
    pub form: Option<FormInfo>,
    pub table: Option<TableContext>,
    /// 1-based position among element siblings.
    pub sibling_index: usize,
    pub visible: bool,
    pub widget: Option<WidgetKind>,
    /// Option texts offered by a select or listbox.
    pub options: Vec<String>,
    /// Normalised labels and ids of every enclosing container, innermost first.
    #[serde(skip)]
    pub scope_keys: Vec<String>,
    /// Set by scoping when this record sits in the named container.
    pub in_container: bool,
    pub container_mismatch: bool,
}

impl FeatureRecord {
    pub fn label_text(&self) -> Option<&str> {
        self.label.as_ref().map(|l| l.text.as_str())
    }

    pub fn container_label(&self) -> Option<&str> {
        self.container.as_ref().and_then(|c| c.label.as_deref())
    }

    pub fn input_type(&self) -> Option<String> {
        if self.tag == "input" {
            Some(self.attrs.input_type().unwrap_or_else(|| "text".to_string()))
        } else {
            None
        }
    }
}
