//! Locales recognised by the citation formatter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a locale tag is not one of the recognised set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized locale `{0}` (expected one of: en, fr)")]
pub struct LocaleError(pub String);

/// Page language, used to pick the conjunction joining author lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Fr];

    /// The word placed before the last name of a list ("A, B, and C")
    pub fn conjunction(self) -> &'static str {
        match self {
            Locale::En => "and",
            Locale::Fr => "et",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }

    /// Detect a locale from a language directory in a page identifier.
    ///
    /// Only directory components count, so `/fr/notes/page.md` is French
    /// while `/notes/fr` is not.
    ///
    /// ```
    /// use pagepress_types::Locale;
    ///
    /// assert_eq!(Locale::from_identifier("/fr/notes/page.md"), Some(Locale::Fr));
    /// assert_eq!(Locale::from_identifier("/notes/page.md"), None);
    /// ```
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let mut components: Vec<&str> = identifier.split('/').collect();
        components.pop();
        components
            .into_iter()
            .filter(|c| c.len() == 2 && c.chars().all(|ch| ch.is_ascii_lowercase()))
            .find_map(|c| c.parse().ok())
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Ok(Locale::En),
            "fr" => Ok(Locale::Fr),
            _ => Err(LocaleError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.tag().to_string()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
