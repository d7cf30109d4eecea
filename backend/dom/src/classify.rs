//! Element classification: native controls, roles, containers, widgets, visibility.
//!
//! Role tables follow the WAI-ARIA implicit role mapping for the tags we care about.

use pinpoint_core::ContainerKind;
use serde::Serialize;

use crate::document::ElementData;

/// Roles that make any element a candidate.
pub const INTERACTIVE_ROLES: &[&str] = &[
    "button",
    "link",
    "textbox",
    "checkbox",
    "radio",
    "combobox",
    "listbox",
    "menuitem",
    "menuitemcheckbox",
    "menuitemradio",
    "option",
    "searchbox",
    "slider",
    "spinbutton",
    "switch",
    "tab",
    "treeitem",
];

/// Subtrees whose text never counts as visible content.
pub const NON_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Custom widget recognised from class tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WidgetKind {
    Checkbox,
    Toggle,
    Radio,
    Button,
    Dropdown,
    DatePicker,
    Upload,
}

pub fn is_native_control(el: &ElementData) -> bool {
    match el.tag.as_str() {
        "input" => el.attrs.input_type().as_deref() != Some("hidden"),
        "button" | "select" | "textarea" | "a" => true,
        _ => false,
    }
}

pub fn has_interactive_role(el: &ElementData) -> bool {
    el.attrs
        .role()
        .map(|r| INTERACTIVE_ROLES.contains(&r.as_str()))
        .unwrap_or(false)
}

pub fn is_content_editable(el: &ElementData) -> bool {
    match el.attrs.get("contenteditable") {
        Some(v) => !v.trim().eq_ignore_ascii_case("false"),
        None => false,
    }
}

/// Explicit role, else the implicit role of the tag.
pub fn effective_role(el: &ElementData) -> Option<String> {
    if let Some(role) = el.attrs.role() {
        return Some(role);
    }
    let role = match el.tag.as_str() {
        "a" if el.attrs.has("href") => "link",
        "button" | "summary" => "button",
        "select" if el.attrs.has("multiple") => "listbox",
        "select" => "combobox",
        "textarea" => "textbox",
        "option" => "option",
        "input" => input_role(el.attrs.input_type().as_deref()),
        _ => return None,
    };
    Some(role.to_string())
}

fn input_role(input_type: Option<&str>) -> &'static str {
    match input_type.unwrap_or("text") {
        "search" => "searchbox",
        "number" => "spinbutton",
        "checkbox" => "checkbox",
        "radio" => "radio",
        "submit" | "reset" | "button" | "image" => "button",
        "range" => "slider",
        _ => "textbox",
    }
}

/// Hidden by its own attributes or inline style (inheritance is handled by the document).
pub fn is_self_hidden(el: &ElementData) -> bool {
    if el.attrs.has("hidden") {
        return true;
    }
    if el
        .attrs
        .get("aria-hidden")
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
    {
        return true;
    }
    if el.tag == "input" && el.attrs.input_type().as_deref() == Some("hidden") {
        return true;
    }
    match el.attrs.get("style") {
        Some(style) => {
            let compact: String = style
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase();
            compact.contains("display:none") || compact.contains("visibility:hidden")
        }
        None => false,
    }
}

/// Named-container kind of an element, if it is one.
pub fn container_kind(el: &ElementData) -> Option<ContainerKind> {
    let by_tag = match el.tag.as_str() {
        "section" | "article" => Some(ContainerKind::Section),
        "dialog" => Some(ContainerKind::Dialog),
        "aside" => Some(ContainerKind::Sidebar),
        "nav" | "menu" => Some(ContainerKind::Menu),
        "form" => Some(ContainerKind::Form),
        "fieldset" => Some(ContainerKind::Fieldset),
        "tr" => Some(ContainerKind::Row),
        "table" => Some(ContainerKind::Table),
        "details" => Some(ContainerKind::Panel),
        _ => None,
    };
    if by_tag.is_some() {
        return by_tag;
    }

    if let Some(role) = el.attrs.role() {
        let by_role = match role.as_str() {
            "dialog" | "alertdialog" => Some(ContainerKind::Dialog),
            "region" => Some(ContainerKind::Region),
            "tabpanel" => Some(ContainerKind::Tab),
            "group" | "radiogroup" => Some(ContainerKind::Fieldset),
            "row" => Some(ContainerKind::Row),
            "form" | "search" => Some(ContainerKind::Form),
            "navigation" | "menu" | "menubar" => Some(ContainerKind::Menu),
            "complementary" => Some(ContainerKind::Sidebar),
            "grid" | "table" | "treegrid" => Some(ContainerKind::Table),
            _ => None,
        };
        if by_role.is_some() {
            return by_role;
        }
    }

    // "profile-card" and "modal-dialog" qualify; "card-body" does not.
    el.attrs.classes().find_map(|token| {
        let lower = token.to_ascii_lowercase();
        let last = lower.rsplit(|c: char| c == '-' || c == '_').next().unwrap_or(lower.as_str());
        // Grid "row" and "tab" buttons are layout classes, not named containers.
        ContainerKind::from_word(last).filter(|k| !matches!(k, ContainerKind::Row | ContainerKind::Tab))
    })
}

/// Custom-widget kind from class tokens.
pub fn widget_kind(el: &ElementData) -> Option<WidgetKind> {
    el.attrs.classes().find_map(|token| {
        let lower = token.to_ascii_lowercase();
        let compact: String = lower.chars().filter(|c| *c != '-' && *c != '_').collect();
        if compact.contains("checkbox") {
            Some(WidgetKind::Checkbox)
        } else if compact.contains("toggle") || compact.contains("switch") {
            Some(WidgetKind::Toggle)
        } else if compact.contains("radio") {
            Some(WidgetKind::Radio)
        } else if compact.contains("datepicker") || compact.contains("calendar") {
            Some(WidgetKind::DatePicker)
        } else if compact.contains("dropdown") || compact.contains("combobox")
            || lower == "select"
            || lower.starts_with("select-")
        {
            Some(WidgetKind::Dropdown)
        } else if compact.contains("upload") || compact.contains("dropzone") {
            Some(WidgetKind::Upload)
        } else if compact == "btn" || compact.starts_with("btn") || compact.contains("button") {
            Some(WidgetKind::Button)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;

    fn el(tag: &str, attrs: &[(&str, &str)]) -> ElementData {
        ElementData {
            tag: tag.to_string(),
            attrs: attrs.iter().copied().collect::<Attributes>(),
        }
    }

    #[test]
    fn hidden_inputs_are_not_controls() {
        assert!(!is_native_control(&el("input", &[("type", "hidden")])));
        assert!(is_native_control(&el("input", &[])));
        assert!(is_self_hidden(&el("div", &[("style", "display: none")])));
        assert!(!is_self_hidden(&el("div", &[("style", "display:block")])));
    }

    #[test]
    fn implicit_roles() {
        assert_eq!(effective_role(&el("a", &[("href", "/x")])).as_deref(), Some("link"));
        assert_eq!(effective_role(&el("a", &[])), None);
        assert_eq!(effective_role(&el("input", &[("type", "search")])).as_deref(), Some("searchbox"));
        assert_eq!(effective_role(&el("div", &[("role", "Tab")])).as_deref(), Some("tab"));
    }

    #[test]
    fn containers_by_tag_role_and_class() {
        assert_eq!(container_kind(&el("section", &[])), Some(ContainerKind::Section));
        assert_eq!(container_kind(&el("div", &[("role", "dialog")])), Some(ContainerKind::Dialog));
        assert_eq!(container_kind(&el("div", &[("class", "profile-card")])), Some(ContainerKind::Card));
        assert_eq!(container_kind(&el("div", &[("class", "card-body")])), None);
    }

    #[test]
    fn widgets_from_class_tokens() {
        assert_eq!(widget_kind(&el("span", &[("class", "ui-checkbox")])), Some(WidgetKind::Checkbox));
        assert_eq!(widget_kind(&el("div", &[("class", "btn btn-primary")])), Some(WidgetKind::Button));
        assert_eq!(widget_kind(&el("div", &[("class", "date-picker")])), Some(WidgetKind::DatePicker));
        assert_eq!(widget_kind(&el("div", &[("class", "wrapper")])), None);
    }
}
