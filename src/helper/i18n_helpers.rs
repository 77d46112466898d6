use crate::models::Language;
use std::collections::HashMap;

const EN: &str = include_str!("../../locales/en.json");
const DE: &str = include_str!("../../locales/de.json");
const RU: &str = include_str!("../../locales/ru.json");

/// UI strings for every supported locale. Parsed once at startup and only read afterwards.
#[derive(Debug, Clone)]
pub struct Dictionaries {
    by_locale: HashMap<Language, HashMap<String, String>>,
}

impl Dictionaries {
    pub fn load() -> Result<Self, serde_json::Error> {
        let mut by_locale = HashMap::new();
        by_locale.insert(Language::En, serde_json::from_str(EN)?);
        by_locale.insert(Language::De, serde_json::from_str(DE)?);
        by_locale.insert(Language::Ru, serde_json::from_str(RU)?);
        Ok(Dictionaries { by_locale })
    }

    /// Looks `key` up in `locale`, then in English, then gives the key back.
    pub fn text<'a>(&'a self, locale: Language, key: &'a str) -> &'a str {
        self.by_locale
            .get(&locale)
            .and_then(|d| d.get(key))
            .or_else(|| self.by_locale.get(&Language::En).and_then(|d| d.get(key)))
            .map(String::as_str)
            .unwrap_or(key)
    }

    /// The whole dictionary for a locale, for handing to templates.
    pub fn for_locale(&self, locale: Language) -> HashMap<String, String> {
        let mut merged = self.by_locale.get(&Language::En).cloned().unwrap_or_default();
        if let Some(localized) = self.by_locale.get(&locale) {
            merged.extend(localized.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }
}

/// Picks the supported locale with the highest q-value in an `Accept-Language`
/// header. Region subtags are ignored; the default is English.
pub fn negotiate_locale(header: Option<&str>) -> Language {
    let Some(header) = header else {
        return Language::En;
    };

    let mut best: Option<(Language, f32)> = None;
    for entry in header.split(',') {
        let mut parts = entry.split(';');
        let tag = parts.next().unwrap_or("").trim();
        let code = tag.split('-').next().unwrap_or("");

        let mut quality = 1.0_f32;
        for param in parts {
            if let Some((key, value)) = param.split_once('=') {
                if key.trim() == "q" {
                    quality = value.trim().parse::<f32>().unwrap_or(0.0).clamp(0.0, 1.0);
                }
            }
        }
        if quality <= 0.0 {
            continue;
        }

        if let Ok(language) = code.parse::<Language>() {
            if best.map_or(true, |(_, q)| quality > q) {
                best = Some((language, quality));
            }
        }
    }

    best.map(|(language, _)| language).unwrap_or(Language::En)
}
