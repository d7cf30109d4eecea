//! Which elements suit which intents, tag hints and widgets.

use pinpoint_core::{Intent, TagHint};
use pinpoint_dom::{FeatureRecord, WidgetKind};

const TEXT_INPUT_TYPES: &[&str] = &["text", "email", "password", "search", "tel", "url", "number"];
const DATE_INPUT_TYPES: &[&str] = &["date", "datetime-local", "month", "time", "week"];
const BUTTON_INPUT_TYPES: &[&str] = &["submit", "button", "reset", "image"];

fn role_is(record: &FeatureRecord, roles: &[&str]) -> bool {
    record.role.as_deref().map(|r| roles.contains(&r)).unwrap_or(false)
}

fn input_type_is(record: &FeatureRecord, types: &[&str]) -> bool {
    record
        .input_type()
        .map(|t| types.contains(&t.as_str()))
        .unwrap_or(false)
}

pub fn is_text_entry(record: &FeatureRecord) -> bool {
    input_type_is(record, TEXT_INPUT_TYPES)
        || record.tag == "textarea"
        || (record.attrs.has("contenteditable") && record.attrs.get("contenteditable") != Some("false"))
        || role_is(record, &["textbox", "searchbox"])
}

pub fn is_button_like(record: &FeatureRecord) -> bool {
    record.tag == "button"
        || input_type_is(record, BUTTON_INPUT_TYPES)
        || role_is(record, &["button"])
        || record.widget == Some(WidgetKind::Button)
}

pub fn is_link_like(record: &FeatureRecord) -> bool {
    record.tag == "a" || role_is(record, &["link"])
}

pub fn is_choice_list(record: &FeatureRecord) -> bool {
    record.tag == "select"
        || role_is(record, &["listbox", "combobox"])
        || record.widget == Some(WidgetKind::Dropdown)
}

pub fn is_checkable(record: &FeatureRecord) -> bool {
    input_type_is(record, &["checkbox", "radio"])
        || role_is(record, &["checkbox", "radio", "switch", "menuitemcheckbox", "menuitemradio"])
        || matches!(
            record.widget,
            Some(WidgetKind::Checkbox | WidgetKind::Toggle | WidgetKind::Radio)
        )
        || record.attrs.has("aria-pressed")
        || record.attrs.has("aria-checked")
}

/// `Some(true)` when the element suits the intent, `Some(false)` when it clearly
/// does not, `None` for an unknown intent.
pub fn intent_compatibility(intent: Intent, record: &FeatureRecord) -> Option<bool> {
    let compatible = match intent {
        Intent::Unknown => return None,
        Intent::Focus => true,
        Intent::Click => !is_text_entry(record),
        Intent::Input => {
            is_text_entry(record)
                || is_choice_list(record)
                || role_is(record, &["spinbutton", "slider"])
                || input_type_is(record, DATE_INPUT_TYPES)
        }
        Intent::SetDate => {
            is_text_entry(record)
                || input_type_is(record, DATE_INPUT_TYPES)
                || record.widget == Some(WidgetKind::DatePicker)
                || is_choice_list(record)
        }
        Intent::Select => {
            is_choice_list(record)
                || input_type_is(record, &["radio"])
                || role_is(record, &["option", "radio", "menuitemradio"])
                || record.widget == Some(WidgetKind::Radio)
        }
        Intent::Toggle => is_checkable(record),
        Intent::Upload => {
            input_type_is(record, &["file"])
                || record.widget == Some(WidgetKind::Upload)
                || is_button_like(record)
        }
        Intent::Navigate => {
            is_link_like(record)
                || is_button_like(record)
                || role_is(record, &["tab", "menuitem", "treeitem"])
        }
    };
    Some(compatible)
}

pub fn widget_suits(widget: WidgetKind, intent: Intent) -> bool {
    matches!(
        (widget, intent),
        (WidgetKind::Checkbox | WidgetKind::Toggle | WidgetKind::Radio, Intent::Toggle)
            | (WidgetKind::Radio | WidgetKind::Dropdown, Intent::Select)
            | (WidgetKind::Button, Intent::Click | Intent::Navigate)
            | (WidgetKind::DatePicker, Intent::SetDate)
            | (WidgetKind::Upload, Intent::Upload)
    )
}

pub fn hint_matches(hint: TagHint, record: &FeatureRecord) -> bool {
    match hint {
        TagHint::Button => is_button_like(record),
        TagHint::Link => is_link_like(record),
        TagHint::TextField => is_text_entry(record),
        TagHint::Checkbox => {
            input_type_is(record, &["checkbox"])
                || role_is(record, &["checkbox", "menuitemcheckbox"])
                || record.widget == Some(WidgetKind::Checkbox)
        }
        TagHint::Radio => {
            input_type_is(record, &["radio"])
                || role_is(record, &["radio", "menuitemradio"])
                || record.widget == Some(WidgetKind::Radio)
        }
        TagHint::Dropdown => is_choice_list(record),
        TagHint::Tab => role_is(record, &["tab"]),
        TagHint::Switch => {
            role_is(record, &["switch"])
                || record.widget == Some(WidgetKind::Toggle)
                || input_type_is(record, &["checkbox"])
        }
        TagHint::Upload => {
            input_type_is(record, &["file"]) || record.widget == Some(WidgetKind::Upload)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinpoint_dom::{extract, Document};

    fn record(html: &str) -> FeatureRecord {
        let doc = Document::parse(html).unwrap();
        extract(&doc).into_iter().next().unwrap()
    }

    #[test]
    fn text_fields_do_not_suit_clicks() {
        let field = record(r#"<input name="q">"#);
        assert_eq!(intent_compatibility(Intent::Click, &field), Some(false));
        assert_eq!(intent_compatibility(Intent::Input, &field), Some(true));
        assert_eq!(intent_compatibility(Intent::Unknown, &field), None);
    }

    #[test]
    fn toggles_need_something_checkable() {
        assert_eq!(intent_compatibility(Intent::Toggle, &record(r#"<input type="checkbox">"#)), Some(true));
        assert_eq!(intent_compatibility(Intent::Toggle, &record("<button>Go</button>")), Some(false));
        assert_eq!(
            intent_compatibility(Intent::Toggle, &record(r#"<button aria-pressed="false">Bold</button>"#)),
            Some(true)
        );
    }

    #[test]
    fn hints() {
        assert!(hint_matches(TagHint::Button, &record(r#"<input type="submit" value="Go">"#)));
        assert!(hint_matches(TagHint::Link, &record(r#"<a href="/">Home</a>"#)));
        assert!(hint_matches(TagHint::Dropdown, &record("<select><option>A</option></select>")));
        assert!(!hint_matches(TagHint::TextField, &record("<button>Go</button>")));
    }
}
