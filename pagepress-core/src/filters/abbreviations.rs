//! Abbreviation wrapping.

use crate::html::escape;
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Abbreviation → expansion.
///
/// The matching regex is built on first use and reused until the table
/// changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbbreviationTable {
    expansions: HashMap<String, String>,
    #[serde(skip)]
    pattern: OnceCell<Option<Regex>>,
}

impl PartialEq for AbbreviationTable {
    fn eq(&self, other: &Self) -> bool {
        self.expansions == other.expansions
    }
}

impl Eq for AbbreviationTable {}

impl AbbreviationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, abbreviation: impl Into<String>, expansion: impl Into<String>) {
        self.expansions.insert(abbreviation.into(), expansion.into());
        self.pattern = OnceCell::new();
    }

    pub fn is_empty(&self) -> bool {
        self.expansions.is_empty()
    }

    /// Layer `other` on top of this table; its expansions win.
    pub fn merged(&self, other: &AbbreviationTable) -> AbbreviationTable {
        let mut expansions = self.expansions.clone();
        expansions.extend(other.expansions.iter().map(|(k, v)| (k.clone(), v.clone())));
        AbbreviationTable {
            expansions,
            pattern: OnceCell::new(),
        }
    }

    /// Wrap whole-word occurrences as `<abbr title="…">ABBR</abbr>`.
    ///
    /// HTML tags (and the content of existing `<abbr>` elements), citation
    /// link targets, unresolved `[[key]]` tokens with their `(override)`
    /// text, and `$$…$$` math spans are copied unchanged.
    pub fn apply(&self, text: &str) -> String {
        let Some(re) = self.pattern() else {
            return text.to_string();
        };

        let mut out = String::with_capacity(text.len());
        let mut last_end = 0;
        for caps in re.captures_iter(text) {
            let Some(m) = caps.name("abbr") else {
                continue;
            };
            if !is_word_boundary(text, m.start(), m.end()) {
                continue;
            }
            let Some(expansion) = self.expansions.get(m.as_str()) else {
                continue;
            };
            out.push_str(&text[last_end..m.start()]);
            out.push_str(&format!(
                "<abbr title=\"{}\">{}</abbr>",
                escape(expansion),
                escape(m.as_str())
            ));
            last_end = m.end();
        }
        out.push_str(&text[last_end..]);
        out
    }

    fn pattern(&self) -> Option<&Regex> {
        self.pattern.get_or_init(|| self.build_pattern()).as_ref()
    }

    fn build_pattern(&self) -> Option<Regex> {
        let mut keys: Vec<&str> = self
            .expansions
            .keys()
            .map(String::as_str)
            .filter(|k| !k.is_empty())
            .collect();
        if keys.is_empty() {
            return None;
        }
        // Longest first so "HTML5" wins over "HTML"
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = keys
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");

        match Regex::new(&format!("{}|(?P<abbr>{})", SKIP_PATTERN.as_str(), alternation)) {
            Ok(re) => Some(re),
            Err(err) => {
                warn!(
                    abbreviations = keys.len(),
                    "abbreviation pattern failed to build, leaving text unchanged: {err}"
                );
                None
            }
        }
    }
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Regions never rewritten: existing abbr elements, other tags, link
/// targets, citation tokens left unresolved, and display math.
static SKIP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?s)<abbr\b[^>]*>.*?</abbr>",
        r"|<[^>]*>",
        r"|\]\([^)]*\)(?:\{:[^}]*\})?",
        r"|(?:\([^()\n]+\))?\[\[[^\]]*\]\]",
        r"|\$\$.+?\$\$",
    ))
    .expect("valid skip regex")
});
