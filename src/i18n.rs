use std::collections::HashMap;

pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "fil"];
pub const DEFAULT_LANGUAGE: &str = "en";

/// Returns the supported language a path is prefixed with, if any.
/// `/fil/dashboard` -> `Some("fil")`, `/dashboard` -> `None`.
pub fn path_language(path: &str) -> Option<&'static str> {
    let first = path.trim_start_matches('/').split('/').next()?;
    SUPPORTED_LANGUAGES
        .iter()
        .find(|lang| **lang == first)
        .copied()
}

/// Language selected by a path, falling back to the default.
pub fn detect_language(path: &str) -> &'static str {
    path_language(path).unwrap_or(DEFAULT_LANGUAGE)
}

// The message store: one flat id -> string dictionary per language,
// embedded at compile time. Lookups fall back to English, then to the id
// itself so a missing entry stays visible instead of panicking.
pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<String, String>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert("en", parse_catalog(include_str!("../messages/en.json")));
        catalogs.insert("fil", parse_catalog(include_str!("../messages/fil.json")));
        Self { catalogs }
    }

    pub fn translate<'a>(&'a self, lang: &str, id: &'a str) -> &'a str {
        if let Some(message) = self.catalogs.get(lang).and_then(|c| c.get(id)) {
            return message;
        }
        self.catalogs
            .get(DEFAULT_LANGUAGE)
            .and_then(|c| c.get(id))
            .map(String::as_str)
            .unwrap_or(id)
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_catalog(raw: &str) -> HashMap<String, String> {
    serde_json::from_str(raw).expect("message catalog must be valid JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_language_from_path_prefix() {
        assert_eq!(detect_language("/fil/dashboard"), "fil");
        assert_eq!(detect_language("/en/business"), "en");
        assert_eq!(detect_language("/dashboard"), "en");
        assert_eq!(detect_language("/"), "en");
        // `/filipino` is not the `fil` locale
        assert_eq!(detect_language("/filipino/foo"), "en");
    }

    #[test]
    fn translates_in_both_languages() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate("en", "error.auth_required"),
            "Authentication required"
        );
        assert_eq!(
            store.translate("fil", "error.auth_required"),
            "Kailangang naka-log in"
        );
    }

    #[test]
    fn falls_back_to_english_then_to_the_id() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate("de", "error.auth_required"),
            "Authentication required"
        );
        assert_eq!(store.translate("en", "no.such.key"), "no.such.key");
    }
}
