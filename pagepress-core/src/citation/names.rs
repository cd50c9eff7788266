//! Author-name parsing and rendering.
//!
//! Raw author strings arrive already normalised to "von Last, Jr, First"
//! order. Parsing is purely syntactic: no case folding, no accent handling.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

/// An author name split into its bibliographic parts.
///
/// A name whose raw string could not be decomposed has every field unset
/// and renders as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StructuredName {
    pub first: Option<String>,
    /// Lowercase particle(s) preceding the surname, e.g. "van der"
    pub von: Option<String>,
    pub last: Option<String>,
    /// Generational suffix, e.g. "Jr" or "III"
    pub jr: Option<String>,
}

impl StructuredName {
    /// Parse a raw "von Last, Jr, First" author string.
    ///
    /// One segment is "von Last", two are "von Last, First", three are
    /// "von Last, Jr, First". Anything else yields an unparsed name.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagepress_core::StructuredName;
    ///
    /// let name = StructuredName::parse("van der Berg, Jr, Paul");
    /// assert_eq!(name.von.as_deref(), Some("van der"));
    /// assert_eq!(name.last.as_deref(), Some("Berg"));
    /// assert_eq!(name.jr.as_deref(), Some("Jr"));
    /// assert_eq!(name.first.as_deref(), Some("Paul"));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let segments: Vec<&str> = SEGMENT_SEPARATOR.split(raw.trim()).collect();

        let (von_last, jr, first) = match segments.as_slice() {
            [von_last] => (*von_last, None, None),
            [von_last, first] => (*von_last, None, Some(*first)),
            [von_last, jr, first] => (*von_last, Some(*jr), Some(*first)),
            _ => return Self::default(),
        };

        let Some((von, last)) = split_von_last(von_last) else {
            return Self::default();
        };

        Self {
            first: non_empty(first),
            von: non_empty(Some(von)),
            last: Some(last.to_string()),
            jr: non_empty(jr),
        }
    }

    /// Whether parsing found a surname
    pub fn is_parsed(&self) -> bool {
        self.last.is_some()
    }

    /// "First von Last, Jr", skipping unset parts.
    pub fn full_name(&self) -> String {
        self.render(true)
    }

    /// "von Last, Jr": the form used in citation text, never with the given name.
    pub fn surname_form(&self) -> String {
        self.render(false)
    }

    fn render(&self, with_first: bool) -> String {
        let first = if with_first { self.first.as_deref() } else { None };
        let mut out = [first, self.von.as_deref(), self.last.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        if let Some(jr) = &self.jr {
            out.push_str(", ");
            out.push_str(jr);
        }
        out
    }
}

impl fmt::Display for StructuredName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

static SEGMENT_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,\s*").expect("valid name separator regex"));

/// Split "von Last" at the trailing alphabetic run.
///
/// The run must start the segment or follow whitespace. A hyphen or
/// apostrophe between two alphabetic runs belongs to the run.
fn split_von_last(segment: &str) -> Option<(&str, &str)> {
    let graphemes: Vec<(usize, &str)> = segment.grapheme_indices(true).collect();
    let mut start = segment.len();
    let mut i = graphemes.len();

    while i > 0 {
        let (idx, g) = graphemes[i - 1];
        let joins_runs = is_joiner(g)
            && start < segment.len()
            && i >= 2
            && is_alphabetic(graphemes[i - 2].1);
        if is_alphabetic(g) || joins_runs {
            start = idx;
            i -= 1;
        } else {
            break;
        }
    }

    if start == segment.len() {
        return None;
    }
    if i > 0 && !graphemes[i - 1].1.chars().all(char::is_whitespace) {
        return None;
    }

    Some((segment[..start].trim_end(), &segment[start..]))
}

fn is_alphabetic(grapheme: &str) -> bool {
    grapheme.chars().next().is_some_and(char::is_alphabetic)
}

fn is_joiner(grapheme: &str) -> bool {
    matches!(grapheme, "-" | "'" | "\u{2019}")
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
