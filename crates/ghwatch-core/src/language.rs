//! Language selection for the few strings the dashboard itself emits.

use serde::{Deserialize, Serialize};

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Russian,
}

impl Language {
    /// Get the locale code for this language
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Russian => "ru",
        }
    }

    /// Get all available languages
    pub fn all() -> &'static [Language] {
        &[Language::English, Language::Russian]
    }

    /// Parse a language from its locale code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" | "english" => Some(Language::English),
            "ru" | "russian" => Some(Language::Russian),
            _ => None,
        }
    }

    /// Placeholder for a panel whose filtered list is empty.
    pub fn no_data(self) -> &'static str {
        match self {
            Language::English => "No data",
            Language::Russian => "Нет данных",
        }
    }

    /// Prefix for an inline cycle-failure message.
    pub fn load_error(self) -> &'static str {
        match self {
            Language::English => "Load error",
            Language::Russian => "Ошибка загрузки",
        }
    }

    /// Placeholder shown before the first cycle completes.
    pub fn loading(self) -> &'static str {
        match self {
            Language::English => "Loading…",
            Language::Russian => "Загрузка…",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for &lang in Language::all() {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
        assert_eq!(Language::from_code("de"), None);
    }

    #[test]
    fn empty_and_error_strings_differ() {
        for &lang in Language::all() {
            assert_ne!(lang.no_data(), lang.load_error());
        }
    }
}
