use std::fmt;

use serde::{Deserialize, Serialize};

/// The action category implied by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    Click,
    Input,
    Select,
    Toggle,
    SetDate,
    Upload,
    Navigate,
    Focus,
    #[default]
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 9] = [
        Intent::Click,
        Intent::Input,
        Intent::Select,
        Intent::Toggle,
        Intent::SetDate,
        Intent::Upload,
        Intent::Navigate,
        Intent::Focus,
        Intent::Unknown,
    ];

    /// Intents that carry a value phrase ("enter X", "select X").
    pub fn takes_value(self) -> bool {
        matches!(self, Intent::Input | Intent::Select | Intent::SetDate)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Click => "click",
            Intent::Input => "input",
            Intent::Select => "select",
            Intent::Toggle => "toggle",
            Intent::SetDate => "setDate",
            Intent::Upload => "upload",
            Intent::Navigate => "navigate",
            Intent::Focus => "focus",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of named ancestor a query can scope to ("in the Billing card").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerKind {
    Section,
    Card,
    Dialog,
    Drawer,
    Row,
    Panel,
    Form,
    Table,
    Tab,
    Fieldset,
    Sidebar,
    Menu,
    Region,
}

impl ContainerKind {
    /// Map a noun from a query or a class token to a container kind.
    pub fn from_word(word: &str) -> Option<Self> {
        let kind = match word.to_ascii_lowercase().as_str() {
            "section" | "sections" => ContainerKind::Section,
            "card" | "tile" => ContainerKind::Card,
            "dialog" | "modal" | "popup" | "popover" => ContainerKind::Dialog,
            "drawer" | "sheet" => ContainerKind::Drawer,
            "row" | "line" => ContainerKind::Row,
            "panel" | "pane" => ContainerKind::Panel,
            "form" => ContainerKind::Form,
            "table" | "grid" => ContainerKind::Table,
            "tab" | "tabpanel" => ContainerKind::Tab,
            "fieldset" | "group" => ContainerKind::Fieldset,
            "sidebar" | "aside" => ContainerKind::Sidebar,
            "menu" | "navbar" | "nav" => ContainerKind::Menu,
            "region" => ContainerKind::Region,
            _ => return None,
        };
        Some(kind)
    }
}

/// Element-kind noun trailing the target phrase ("Login button", "Email field").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TagHint {
    Button,
    Link,
    TextField,
    Checkbox,
    Radio,
    Dropdown,
    Tab,
    Switch,
    Upload,
}

impl TagHint {
    pub fn from_word(word: &str) -> Option<Self> {
        let hint = match word.to_ascii_lowercase().as_str() {
            "button" | "btn" => TagHint::Button,
            "link" | "anchor" => TagHint::Link,
            "field" | "input" | "textbox" | "box" | "textarea" => TagHint::TextField,
            "checkbox" | "tickbox" => TagHint::Checkbox,
            "radio" => TagHint::Radio,
            "dropdown" | "combobox" | "select" | "picker" => TagHint::Dropdown,
            "tab" => TagHint::Tab,
            "switch" | "toggle" => TagHint::Switch,
            "uploader" | "dropzone" => TagHint::Upload,
            _ => return None,
        };
        Some(hint)
    }
}

/// A container scope extracted from the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerClause {
    pub phrase: String,
    pub kind: Option<ContainerKind>,
}

/// What the query points at: natural-language text or a literal selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum QueryTarget {
    Phrase(String),
    Literal(String),
}

/// A parsed natural-language instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub raw: String,
    /// Normalised tokens of the raw query.
    pub tokens: Vec<String>,
    pub intent: Intent,
    pub target: QueryTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Relational anchor ("next to Password", "in row #A-1042").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_hint: Option<TagHint>,
}

impl Query {
    /// A query with no recognised structure: the whole text is the target.
    pub fn unknown(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            tokens: crate::text::tokens(raw),
            intent: Intent::Unknown,
            target: QueryTarget::Phrase(crate::text::collapse_whitespace(raw)),
            container: None,
            value: None,
            anchor: None,
            tag_hint: None,
        }
    }

    /// The natural-language target phrase, if the query is not a literal selector.
    pub fn phrase(&self) -> Option<&str> {
        match &self.target {
            QueryTarget::Phrase(p) => Some(p.as_str()),
            QueryTarget::Literal(_) => None,
        }
    }

    pub fn literal(&self) -> Option<&str> {
        match &self.target {
            QueryTarget::Literal(l) => Some(l.as_str()),
            QueryTarget::Phrase(_) => None,
        }
    }

    pub fn container_phrase(&self) -> Option<&str> {
        self.container.as_ref().map(|c| c.phrase.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_serializes_camel_case() {
        let json = serde_json::to_string(&Intent::SetDate).unwrap();
        assert_eq!(json, "\"setDate\"");
        let back: Intent = serde_json::from_str("\"upload\"").unwrap();
        assert_eq!(back, Intent::Upload);
    }

    #[test]
    fn container_words_map_to_kinds() {
        assert_eq!(ContainerKind::from_word("Modal"), Some(ContainerKind::Dialog));
        assert_eq!(ContainerKind::from_word("row"), Some(ContainerKind::Row));
        assert_eq!(ContainerKind::from_word("username"), None);
    }

    #[test]
    fn unknown_query_keeps_whole_text() {
        let q = Query::unknown("  Save   changes ");
        assert_eq!(q.intent, Intent::Unknown);
        assert_eq!(q.phrase(), Some("Save changes"));
        assert!(q.literal().is_none());
    }
}
