use serde::Serialize;

/// A selectable language: display name shown in the page and the M2M100 code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub name: &'static str,
    pub code: &'static str,
}

/// Supported languages in selection order.
pub static LANGUAGES: [Language; 13] = [
    Language { name: "Arabic", code: "ar" },
    Language { name: "Chinese", code: "zh" },
    Language { name: "French", code: "fr" },
    Language { name: "German", code: "de" },
    Language { name: "Hindi", code: "hi" },
    Language { name: "Italian", code: "it" },
    Language { name: "Japanese", code: "ja" },
    Language { name: "Korean", code: "ko" },
    Language { name: "Portuguese", code: "pt" },
    Language { name: "Russian", code: "ru" },
    Language { name: "Spanish", code: "es" },
    Language { name: "Turkish", code: "tr" },
    Language { name: "English", code: "en" },
];

/// First entry of the table, preselected by the page
pub fn default_language() -> &'static Language {
    &LANGUAGES[0]
}

pub fn by_name(name: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|lang| lang.name == name)
}

pub fn by_code(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|lang| lang.code == code)
}

/// Resolve a selector value, accepting either the display name or the code
pub fn resolve(value: &str) -> Option<&'static Language> {
    by_name(value).or_else(|| by_code(value))
}
