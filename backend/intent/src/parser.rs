//! Query parser: free text → [`Query`].
//!
//! Clauses are peeled off in a fixed order: literal selector, container scope,
//! relational anchor, verb, value, tag hint. Whatever is left is the target
//! phrase. Parsing never fails; an unrecognised query becomes `Intent::Unknown`
//! with its remaining text as the target.

use once_cell::sync::Lazy;
use pinpoint_core::text::{collapse_whitespace, tokens};
use pinpoint_core::{ContainerClause, ContainerKind, Intent, Query, QueryTarget, TagHint};
use regex::Regex;
use tracing::debug;

use crate::literal;
use crate::verbs::VerbTable;

/// Connectors that open a container clause.
const CONTAINER_CONNECTORS: &[&str] = &["in", "inside", "within", "under"];

/// Longest phrase accepted between a connector and a trailing kind word.
const MAX_CONTAINER_WORDS: usize = 6;

/// Relational anchors, longest first.
const ANCHOR_CONNECTORS: &[&[&str]] = &[
    &["next", "to"],
    &["close", "to"],
    &["right", "of"],
    &["left", "of"],
    &["near"],
    &["beside"],
    &["below"],
    &["above"],
];

/// "type X into Y": value first.
const INTO_CONNECTORS: &[&str] = &["into", "in", "on", "for", "en", "dans", "em", "no", "na"];

/// "set Y to X": target first.
const TO_CONNECTORS: &[&str] = &["to", "with", "as", "avec", "mit", "com", "con"];

/// "select X from Y": value first.
const FROM_CONNECTORS: &[&str] = &["from", "in", "de", "dans", "aus", "em"];

const FILLERS: &[&str] = &[
    "the", "a", "an", "on", "at", "please", "el", "la", "los", "las", "le", "les", "der", "die",
    "das", "den", "o", "os", "sur", "auf",
];

/// Words allowed before the verb.
const PREFIXES: &[&str] = &["please", "now", "then", "kindly", "just", "also", "and", "por", "favor"];

/// Words after which the remainder names the control ("field labelled Email").
const NAMING_WORDS: &[&str] = &["labelled", "labeled", "called", "named", "titled"];

const DATE_WORDS: &[&str] = &["date", "dob", "birthday", "birthdate", "fecha", "datum", "data"];

static DATE_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)^(
            \d{4}-\d{1,2}-\d{1,2}
          | \d{1,2}[/.-]\d{1,2}[/.-]\d{2,4}
          | \d{1,2}\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{2,4}
          | (jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{1,2}(st|nd|rd|th)?,?\s+\d{2,4}
          | today | tomorrow | yesterday
        )$",
    )
    .unwrap()
});

/// A word of the query with its original spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Word {
    text: String,
    quoted: bool,
}

impl Word {
    fn lower(&self) -> String {
        self.text.to_lowercase()
    }

    fn is(&self, candidates: &[&str]) -> bool {
        !self.quoted && candidates.contains(&self.lower().as_str())
    }
}

/// Parses queries against an immutable verb table.
#[derive(Debug, Clone)]
pub struct QueryParser {
    verbs: VerbTable,
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new(VerbTable::all_locales())
    }
}

impl QueryParser {
    pub fn new(verbs: VerbTable) -> Self {
        Self { verbs }
    }

    pub fn verbs(&self) -> &VerbTable {
        &self.verbs
    }

    pub fn parse(&self, raw: &str) -> Query {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Query::unknown(raw);
        }

        let mut query = Query::unknown(raw);
        let mut text = trimmed.to_string();
        let mut literal_selector = None;
        if let Some(found) = literal::detect(trimmed) {
            text = found.rest;
            literal_selector = Some(found.selector);
        }

        let mut words = split_words(&text);
        query.container = take_container(&mut words);
        query.anchor = take_anchor(&mut words);
        if query.anchor.is_none() {
            // "in row #A-1042": the row text doubles as a proximity anchor.
            query.anchor = query
                .container
                .as_ref()
                .filter(|c| c.kind == Some(ContainerKind::Row) && !c.phrase.is_empty())
                .map(|c| c.phrase.clone());
        }

        let (intent, rest) = self.take_verb(&words);
        query.intent = intent;

        let (target_words, value) = split_value(intent, rest);
        query.value = value;

        let (hint, target_words) = take_tag_hint(&target_words);
        query.tag_hint = hint;
        let target = join(&target_words);

        if matches!(query.intent, Intent::Input | Intent::Select) && mentions_date(&target, query.value.as_deref()) {
            query.intent = Intent::SetDate;
        }

        query.target = match literal_selector {
            Some(selector) => QueryTarget::Literal(selector),
            // A bare verb ("Submit") is also the label being looked for.
            None if target.is_empty() && !words.is_empty() => QueryTarget::Phrase(join(&words)),
            None if target.is_empty() => QueryTarget::Phrase(collapse_whitespace(&text)),
            None => QueryTarget::Phrase(target),
        };
        query.tokens = tokens(raw);

        debug!(
            intent = %query.intent,
            target = ?query.target,
            container = ?query.container_phrase(),
            has_value = query.value.is_some(),
            anchor = ?query.anchor,
            "Parsed query"
        );
        query
    }

    fn take_verb<'w>(&self, words: &'w [Word]) -> (Intent, &'w [Word]) {
        // A verb may follow a short courtesy prefix ("please click", "now type").
        for start in 0..words.len().min(3) {
            if words[start].quoted || !words[..start].iter().all(|w| w.is(PREFIXES)) {
                break;
            }
            let window: Vec<&str> = words[start..]
                .iter()
                .take_while(|w| !w.quoted)
                .map(|w| w.text.as_str())
                .collect();
            if let Some((intent, consumed)) = self.verbs.match_at(&window) {
                return (intent, &words[start + consumed..]);
            }
        }
        (Intent::Unknown, words)
    }
}

/// Split on whitespace, keeping quoted phrases whole and dropping sentence punctuation.
fn split_words(text: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if matches!(ch, '"' | '\'' | '“' | '‘') {
            let close = match ch {
                '“' => '”',
                '‘' => '’',
                other => other,
            };
            chars.next();
            let phrase: String = chars.by_ref().take_while(|c| *c != close).collect();
            words.push(Word {
                text: phrase,
                quoted: true,
            });
            continue;
        }
        let mut word = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            word.push(c);
            chars.next();
        }
        let trimmed = word.trim_end_matches([',', ';', '!', '?', ':']);
        let trimmed = trimmed.strip_suffix('.').filter(|t| !t.contains('.')).unwrap_or(trimmed);
        if !trimmed.is_empty() {
            words.push(Word {
                text: trimmed.to_string(),
                quoted: false,
            });
        }
    }
    words
}

fn join(words: &[Word]) -> String {
    words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_fillers(words: &[Word]) -> &[Word] {
    let mut slice = words;
    while let Some(first) = slice.first() {
        if first.is(FILLERS) {
            slice = &slice[1..];
        } else {
            break;
        }
    }
    while let Some(last) = slice.last() {
        if last.is(FILLERS) {
            slice = &slice[..slice.len() - 1];
        } else {
            break;
        }
    }
    slice
}

fn kind_of(word: &Word) -> Option<ContainerKind> {
    if word.quoted {
        return None;
    }
    ContainerKind::from_word(&word.lower())
}

/// Remove a container clause, trying connectors from the right.
///
/// Accepts both `in <phrase> <kind>` and `in <kind> <phrase>`.
fn take_container(words: &mut Vec<Word>) -> Option<ContainerClause> {
    for connector in (0..words.len()).rev() {
        if !words[connector].is(CONTAINER_CONNECTORS) {
            continue;
        }
        let after = connector + 1;
        let mut first = after;
        while first < words.len() && words[first].is(FILLERS) {
            first += 1;
        }

        // in <phrase> <kind>
        let limit = words.len().min(first + MAX_CONTAINER_WORDS + 1);
        if let Some(kind_at) = (first..limit).find(|i| kind_of(&words[*i]).is_some()) {
            if kind_at > first || kind_at + 1 == words.len() || !leads_phrase(&words[kind_at + 1..]) {
                let kind = kind_of(&words[kind_at]);
                let phrase = join(strip_fillers(&words[first..kind_at]));
                let phrase = if phrase.is_empty() {
                    words[kind_at].text.clone()
                } else {
                    phrase
                };
                words.drain(connector..=kind_at);
                return Some(ContainerClause { phrase, kind });
            }

            // in <kind> <phrase>
            let end = clause_end(words, kind_at + 1);
            let kind = kind_of(&words[kind_at]);
            let phrase = join(strip_fillers(&words[kind_at + 1..end]));
            words.drain(connector..end);
            return Some(ContainerClause { phrase, kind });
        }
    }
    None
}

/// Whether the words after a kind continue a container name ("row #A-1042").
fn leads_phrase(rest: &[Word]) -> bool {
    rest.first()
        .map(|w| !w.is(CONTAINER_CONNECTORS) && !w.is(TO_CONNECTORS) && !w.is(INTO_CONNECTORS))
        .unwrap_or(false)
}

/// End of a trailing phrase: the next connector, or the end of the query.
fn clause_end(words: &[Word], from: usize) -> usize {
    (from + 1..words.len())
        .find(|i| {
            words[*i].is(CONTAINER_CONNECTORS)
                || words[*i].is(TO_CONNECTORS)
                || words[*i].is(&["into", "from"])
                || anchor_at(words, *i).is_some()
        })
        .unwrap_or(words.len())
}

fn anchor_at(words: &[Word], at: usize) -> Option<usize> {
    ANCHOR_CONNECTORS.iter().find_map(|pattern| {
        let fits = pattern.len() <= words.len() - at
            && pattern
                .iter()
                .enumerate()
                .all(|(offset, p)| words[at + offset].is(&[*p]));
        fits.then_some(pattern.len())
    })
}

/// Remove a relational anchor clause ("next to Password").
fn take_anchor(words: &mut Vec<Word>) -> Option<String> {
    let (at, len) = (1..words.len()).find_map(|i| anchor_at(words, i).map(|len| (i, len)))?;
    let end = clause_end(words, at + len);
    let phrase = join(strip_fillers(&words[at + len..end]));
    if phrase.is_empty() {
        return None;
    }
    words.drain(at..end);
    Some(phrase)
}

/// Split the words after the verb into target and value.
fn split_value(intent: Intent, rest: &[Word]) -> (Vec<Word>, Option<String>) {
    let position = |connectors: &[&str]| (1..rest.len()).find(|i| rest[*i].is(connectors));
    let value_of = |words: &[Word]| {
        let words = strip_fillers(words);
        (!words.is_empty()).then(|| join(words))
    };

    match intent {
        Intent::Input | Intent::SetDate => {
            if let Some(at) = position(INTO_CONNECTORS) {
                return (rest[at + 1..].to_vec(), value_of(&rest[..at]));
            }
            if let Some(at) = position(TO_CONNECTORS) {
                return (rest[..at].to_vec(), value_of(&rest[at + 1..]));
            }
            // enter "Surya" Username
            if rest.len() > 1 && rest[0].quoted {
                return (rest[1..].to_vec(), Some(rest[0].text.clone()));
            }
            (rest.to_vec(), None)
        }
        Intent::Select => {
            if let Some(at) = position(FROM_CONNECTORS) {
                return (rest[at + 1..].to_vec(), value_of(&rest[..at]));
            }
            if let Some(at) = position(TO_CONNECTORS) {
                return (rest[..at].to_vec(), value_of(&rest[at + 1..]));
            }
            (rest.to_vec(), None)
        }
        _ => (rest.to_vec(), None),
    }
}

/// Pull a role noun off the target phrase.
fn take_tag_hint(words: &[Word]) -> (Option<TagHint>, Vec<Word>) {
    let trimmed = strip_fillers(words).to_vec();

    if let Some(at) = trimmed.iter().position(|w| w.is(NAMING_WORDS)) {
        let hint = trimmed[..at]
            .iter()
            .rev()
            .find_map(|w| (!w.quoted).then(|| TagHint::from_word(&w.lower())).flatten());
        return (hint, strip_fillers(&trimmed[at + 1..]).to_vec());
    }

    let Some(last) = trimmed.last() else {
        return (None, trimmed);
    };
    if last.quoted {
        return (None, trimmed);
    }
    match TagHint::from_word(&last.lower()) {
        Some(hint) if trimmed.len() > 1 => {
            let kept = strip_fillers(&trimmed[..trimmed.len() - 1]).to_vec();
            (Some(hint), kept)
        }
        Some(hint) => (Some(hint), trimmed),
        None => (None, trimmed),
    }
}

fn mentions_date(target: &str, value: Option<&str>) -> bool {
    if tokens(target).iter().any(|t| DATE_WORDS.contains(&t.as_str())) {
        return true;
    }
    value.map(|v| DATE_VALUE.is_match(v.trim())).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(q: &str) -> Query {
        QueryParser::default().parse(q)
    }

    #[test]
    fn value_before_target() {
        let q = parse("enter Surya in Username");
        assert_eq!(q.intent, Intent::Input);
        assert_eq!(q.value.as_deref(), Some("Surya"));
        assert_eq!(q.phrase(), Some("Username"));
        assert!(q.container.is_none());
    }

    #[test]
    fn target_before_value() {
        let q = parse("set Quantity to 5");
        assert_eq!(q.intent, Intent::Input);
        assert_eq!(q.phrase(), Some("Quantity"));
        assert_eq!(q.value.as_deref(), Some("5"));

        let q = parse("select India from Country dropdown");
        assert_eq!(q.intent, Intent::Select);
        assert_eq!(q.value.as_deref(), Some("India"));
        assert_eq!(q.phrase(), Some("Country"));
        assert_eq!(q.tag_hint, Some(TagHint::Dropdown));
    }

    #[test]
    fn leading_container_clause_is_removed_before_verb() {
        let q = parse("in Profile section click Edit");
        assert_eq!(q.intent, Intent::Click);
        assert_eq!(q.phrase(), Some("Edit"));
        let c = q.container.unwrap();
        assert_eq!(c.phrase, "Profile");
        assert_eq!(c.kind, Some(ContainerKind::Section));
    }

    #[test]
    fn kind_first_container_clause() {
        let q = parse("click Edit in row #A-1042");
        assert_eq!(q.intent, Intent::Click);
        assert_eq!(q.phrase(), Some("Edit"));
        assert_eq!(q.container_phrase(), Some("#A-1042"));
        assert_eq!(q.anchor.as_deref(), Some("#A-1042"));
    }

    #[test]
    fn container_connector_nearest_the_end_wins() {
        let q = parse("type 5 in quantity field in the cart dialog");
        assert_eq!(q.container_phrase(), Some("cart"));
        assert_eq!(q.value.as_deref(), Some("5"));
        assert_eq!(q.phrase(), Some("quantity"));
        assert_eq!(q.tag_hint, Some(TagHint::TextField));
    }

    #[test]
    fn tag_hint_and_fillers() {
        let q = parse("click the Login button");
        assert_eq!(q.phrase(), Some("Login"));
        assert_eq!(q.tag_hint, Some(TagHint::Button));

        let q = parse("type hello into the field labelled Search");
        assert_eq!(q.phrase(), Some("Search"));
        assert_eq!(q.tag_hint, Some(TagHint::TextField));
    }

    #[test]
    fn quoted_values_are_verbatim() {
        let q = parse(r#"type "Hello, World" into Message"#);
        assert_eq!(q.value.as_deref(), Some("Hello, World"));
        assert_eq!(q.phrase(), Some("Message"));
    }

    #[test]
    fn dates_reclassify() {
        assert_eq!(parse("enter 2024-03-12 in Start date").intent, Intent::SetDate);
        assert_eq!(parse("set DOB to 12/03/1990").intent, Intent::SetDate);
        assert_eq!(parse("schedule Meeting to tomorrow").intent, Intent::SetDate);
        assert_eq!(parse("enter Surya in Username").intent, Intent::Input);
    }

    #[test]
    fn other_locales() {
        assert_eq!(parse("haz clic en Guardar").intent, Intent::Click);
        assert_eq!(parse("haz clic en Guardar").phrase(), Some("Guardar"));
        assert_eq!(parse("cliquez sur Enregistrer").intent, Intent::Click);
        assert_eq!(parse("wähle Deutschland").intent, Intent::Select);
        assert_eq!(parse("marque Aceito").intent, Intent::Toggle);
    }

    #[test]
    fn relational_anchor() {
        let q = parse("tick the checkbox next to Remember me");
        assert_eq!(q.intent, Intent::Toggle);
        assert_eq!(q.anchor.as_deref(), Some("Remember me"));
        assert_eq!(q.tag_hint, Some(TagHint::Checkbox));
    }

    #[test]
    fn literal_override() {
        let q = parse("#login");
        assert_eq!(q.literal(), Some("#login"));
        assert_eq!(q.intent, Intent::Unknown);

        let q = parse("click save [data-testid=save]");
        assert_eq!(q.literal(), Some("[data-testid=save]"));
        assert_eq!(q.intent, Intent::Click);
    }

    #[test]
    fn bare_verb_is_its_own_target() {
        let q = parse("Submit");
        assert_eq!(q.intent, Intent::Click);
        assert_eq!(q.phrase(), Some("Submit"));

        let q = parse("please click Save");
        assert_eq!(q.intent, Intent::Click);
        assert_eq!(q.phrase(), Some("Save"));
    }

    #[test]
    fn unknown_falls_back_to_whole_text() {
        let q = parse("Login");
        assert_eq!(q.intent, Intent::Unknown);
        assert_eq!(q.phrase(), Some("Login"));
        assert_eq!(q.tokens, vec!["login".to_string()]);
        assert_eq!(parse("   ").intent, Intent::Unknown);
    }
}
