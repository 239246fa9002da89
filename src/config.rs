use tracing::warn;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_DATA_BASE: &str = ".";
/// eframe storage key holding the chosen language code.
pub const LANGUAGE_PREFERENCE_KEY: &str = "graph-language";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language {
        code: "en",
        name: "English",
    },
    Language {
        code: "zh",
        name: "中文",
    },
];

pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|language| language.code == code)
        .map(|language| language.name)
}

/// Picks the start-up language: an explicit choice first, then the stored
/// preference, then the default. Unknown codes are kept, the data layout
/// decides whether they exist.
pub fn initial_language(explicit: Option<&str>, stored: Option<&str>) -> String {
    let code = explicit
        .or(stored)
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);

    if language_name(code).is_none() {
        warn!(language = code, "language is not one of the bundled translations");
    }

    code.to_owned()
}
