//! Verb → intent synonym table.
//!
//! Built once per engine from the enabled locales plus configured extra verbs and
//! never mutated afterwards. Lookups are on normalised words, so accents survive
//! but case and punctuation do not.

use std::collections::{BTreeMap, HashMap};

use pinpoint_core::text::normalize;
use pinpoint_core::Intent;
use tracing::debug;

/// Longest verb phrase, in words, the table will try to match.
pub const MAX_VERB_WORDS: usize = 3;

type LocaleVerbs = &'static [(&'static str, Intent)];

const EN: LocaleVerbs = &[
    ("click", Intent::Click),
    ("click on", Intent::Click),
    ("double click", Intent::Click),
    ("right click", Intent::Click),
    ("tap", Intent::Click),
    ("tap on", Intent::Click),
    ("press", Intent::Click),
    ("hit", Intent::Click),
    ("push", Intent::Click),
    ("submit", Intent::Click),
    ("enter", Intent::Input),
    ("type", Intent::Input),
    ("fill", Intent::Input),
    ("fill in", Intent::Input),
    ("fill out", Intent::Input),
    ("set", Intent::Input),
    ("write", Intent::Input),
    ("input", Intent::Input),
    ("provide", Intent::Input),
    ("key in", Intent::Input),
    ("paste", Intent::Input),
    ("choose", Intent::Select),
    ("select", Intent::Select),
    ("pick", Intent::Select),
    ("check", Intent::Toggle),
    ("uncheck", Intent::Toggle),
    ("tick", Intent::Toggle),
    ("untick", Intent::Toggle),
    ("enable", Intent::Toggle),
    ("disable", Intent::Toggle),
    ("toggle", Intent::Toggle),
    ("turn on", Intent::Toggle),
    ("turn off", Intent::Toggle),
    ("switch on", Intent::Toggle),
    ("switch off", Intent::Toggle),
    ("upload", Intent::Upload),
    ("attach", Intent::Upload),
    ("open", Intent::Navigate),
    ("go to", Intent::Navigate),
    ("navigate to", Intent::Navigate),
    ("navigate", Intent::Navigate),
    ("visit", Intent::Navigate),
    ("follow", Intent::Navigate),
    ("focus", Intent::Focus),
    ("focus on", Intent::Focus),
    ("schedule", Intent::SetDate),
    ("date", Intent::SetDate),
];

const ES: LocaleVerbs = &[
    ("haz clic", Intent::Click),
    ("haz clic en", Intent::Click),
    ("hacer clic", Intent::Click),
    ("clic", Intent::Click),
    ("pulsa", Intent::Click),
    ("presiona", Intent::Click),
    ("escribe", Intent::Input),
    ("introduce", Intent::Input),
    ("ingresa", Intent::Input),
    ("rellena", Intent::Input),
    ("selecciona", Intent::Select),
    ("elige", Intent::Select),
    ("marca", Intent::Toggle),
    ("desmarca", Intent::Toggle),
    ("activa", Intent::Toggle),
    ("desactiva", Intent::Toggle),
    ("sube", Intent::Upload),
    ("adjunta", Intent::Upload),
    ("abre", Intent::Navigate),
    ("ve a", Intent::Navigate),
    ("navega", Intent::Navigate),
    ("visita", Intent::Navigate),
    ("enfoca", Intent::Focus),
];

const FR: LocaleVerbs = &[
    ("clique", Intent::Click),
    ("cliquez", Intent::Click),
    ("clique sur", Intent::Click),
    ("cliquez sur", Intent::Click),
    ("appuie sur", Intent::Click),
    ("appuyez sur", Intent::Click),
    ("saisis", Intent::Input),
    ("saisissez", Intent::Input),
    ("tapez", Intent::Input),
    ("entrez", Intent::Input),
    ("remplis", Intent::Input),
    ("remplissez", Intent::Input),
    ("sélectionne", Intent::Select),
    ("sélectionnez", Intent::Select),
    ("choisis", Intent::Select),
    ("choisissez", Intent::Select),
    ("coche", Intent::Toggle),
    ("cochez", Intent::Toggle),
    ("décoche", Intent::Toggle),
    ("décochez", Intent::Toggle),
    ("activez", Intent::Toggle),
    ("désactivez", Intent::Toggle),
    ("téléverse", Intent::Upload),
    ("téléversez", Intent::Upload),
    ("joins", Intent::Upload),
    ("ouvre", Intent::Navigate),
    ("ouvrez", Intent::Navigate),
    ("va à", Intent::Navigate),
    ("allez à", Intent::Navigate),
    ("visitez", Intent::Navigate),
];

const DE: LocaleVerbs = &[
    ("klicke", Intent::Click),
    ("klicke auf", Intent::Click),
    ("klicken", Intent::Click),
    ("klick", Intent::Click),
    ("drücke", Intent::Click),
    ("tippe", Intent::Input),
    ("gib", Intent::Input),
    ("eingeben", Intent::Input),
    ("fülle", Intent::Input),
    ("wähle", Intent::Select),
    ("auswählen", Intent::Select),
    ("markiere", Intent::Toggle),
    ("aktiviere", Intent::Toggle),
    ("deaktiviere", Intent::Toggle),
    ("lade hoch", Intent::Upload),
    ("hochladen", Intent::Upload),
    ("öffne", Intent::Navigate),
    ("gehe zu", Intent::Navigate),
    ("besuche", Intent::Navigate),
    ("fokussiere", Intent::Focus),
];

const PT: LocaleVerbs = &[
    ("clica", Intent::Click),
    ("clique em", Intent::Click),
    ("pressione", Intent::Click),
    ("aperte", Intent::Click),
    ("digite", Intent::Input),
    ("insira", Intent::Input),
    ("preencha", Intent::Input),
    ("escreva", Intent::Input),
    ("selecione", Intent::Select),
    ("escolha", Intent::Select),
    ("marque", Intent::Toggle),
    ("desmarque", Intent::Toggle),
    ("ative", Intent::Toggle),
    ("desative", Intent::Toggle),
    ("envie", Intent::Upload),
    ("anexe", Intent::Upload),
    ("abra", Intent::Navigate),
    ("vá para", Intent::Navigate),
    ("navegue", Intent::Navigate),
    ("visite", Intent::Navigate),
];

fn locale_verbs(locale: &str) -> Option<LocaleVerbs> {
    match locale {
        "en" => Some(EN),
        "es" => Some(ES),
        "fr" => Some(FR),
        "de" => Some(DE),
        "pt" => Some(PT),
        _ => None,
    }
}

/// Immutable verb lookup shared by every parse.
#[derive(Debug, Clone, Default)]
pub struct VerbTable {
    verbs: HashMap<String, Intent>,
}

impl VerbTable {
    /// Build from locale codes and extra `verb → intent` entries.
    ///
    /// Unknown locale codes are skipped. Extra verbs override built-ins.
    pub fn new<S: AsRef<str>>(locales: &[S], extra: &BTreeMap<String, Intent>) -> Self {
        let mut verbs = HashMap::new();
        for locale in locales {
            let code = locale.as_ref().to_ascii_lowercase();
            let Some(entries) = locale_verbs(&code) else {
                debug!(locale = %code, "Skipping unknown locale");
                continue;
            };
            for (verb, intent) in entries.iter() {
                // First locale wins when two languages share a spelling.
                verbs.entry(normalize(verb)).or_insert(*intent);
            }
        }
        for (verb, intent) in extra {
            let key = normalize(verb);
            if !key.is_empty() {
                verbs.insert(key, *intent);
            }
        }
        Self { verbs }
    }

    /// Every built-in locale.
    pub fn all_locales() -> Self {
        Self::new(&["en", "es", "fr", "de", "pt"], &BTreeMap::new())
    }

    pub fn len(&self) -> usize {
        self.verbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    pub fn get(&self, verb: &str) -> Option<Intent> {
        self.verbs.get(&normalize(verb)).copied()
    }

    /// Longest verb phrase starting at `words[0]`: (intent, words consumed).
    pub fn match_at(&self, words: &[&str]) -> Option<(Intent, usize)> {
        let max = words.len().min(MAX_VERB_WORDS);
        (1..=max).rev().find_map(|n| {
            let phrase = normalize(&words[..n].join(" "));
            self.verbs.get(&phrase).map(|intent| (*intent, n))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_synonyms() {
        let table = VerbTable::new(&["en"], &BTreeMap::new());
        assert_eq!(table.get("Tap"), Some(Intent::Click));
        assert_eq!(table.get("fill"), Some(Intent::Input));
        assert_eq!(table.get("pick"), Some(Intent::Select));
        assert_eq!(table.get("uncheck"), Some(Intent::Toggle));
        assert_eq!(table.get("attach"), Some(Intent::Upload));
        assert_eq!(table.get("selecciona"), None);
    }

    #[test]
    fn multi_word_verbs_prefer_longest() {
        let table = VerbTable::all_locales();
        assert_eq!(table.match_at(&["haz", "clic", "en", "Guardar"]), Some((Intent::Click, 3)));
        assert_eq!(table.match_at(&["double", "click", "row"]), Some((Intent::Click, 2)));
        assert_eq!(table.match_at(&["Selecciona", "país"]), Some((Intent::Select, 1)));
        assert_eq!(table.match_at(&["Login", "button"]), None);
    }

    #[test]
    fn extra_verbs_override_builtins() {
        let mut extra = BTreeMap::new();
        extra.insert("Press".to_string(), Intent::Focus);
        extra.insert("drücken".to_string(), Intent::Click);
        let table = VerbTable::new(&["en", "xx"], &extra);
        assert_eq!(table.get("press"), Some(Intent::Focus));
        assert_eq!(table.get("drücken"), Some(Intent::Click));
    }
}
