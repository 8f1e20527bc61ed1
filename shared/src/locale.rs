//! Locale handling and bilingual text resolution
//!
//! Every route is prefixed with a locale segment (`/en/...`, `/ar/...`).
//! Bilingual fields are stored side by side (`title_en`, `title_ar`) and
//! resolved at read time: the active locale wins, the other language fills in
//! when the preferred one is blank.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }

    /// Text direction for the locale
    pub fn dir(&self) -> &'static str {
        match self {
            Locale::En => "ltr",
            Locale::Ar => "rtl",
        }
    }

    /// Parse a locale path segment
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "en" => Some(Locale::En),
            "ar" => Some(Locale::Ar),
            _ => None,
        }
    }

    /// Parse, falling back to English for anything unknown
    pub fn safe(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLocale(pub String);

impl fmt::Display for UnknownLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown locale: {}", self.0)
    }
}

impl std::error::Error for UnknownLocale {}

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownLocale(s.to_string()))
    }
}

/// Collapse runs of whitespace and trim; `None` and blank input become `""`
pub fn clean_text(value: Option<&str>) -> String {
    match value {
        Some(v) => v.split_whitespace().collect::<Vec<_>>().join(" "),
        None => String::new(),
    }
}

/// Resolve a bilingual pair for `locale`, falling back to the other language
pub fn localize_text(locale: Locale, en: Option<&str>, ar: Option<&str>) -> String {
    let e = clean_text(en);
    let a = clean_text(ar);
    match locale {
        Locale::Ar if a.is_empty() => e,
        Locale::Ar => a,
        Locale::En if e.is_empty() => a,
        Locale::En => e,
    }
}

/// True when [`localize_text`] had to use the other language
pub fn is_fallback(locale: Locale, en: Option<&str>, ar: Option<&str>) -> bool {
    let e = clean_text(en);
    let a = clean_text(ar);
    match locale {
        Locale::Ar => a.is_empty() && !e.is_empty(),
        Locale::En => e.is_empty() && !a.is_empty(),
    }
}
