//! Inline citation token resolution.
//!
//! Recognised tokens, scanned left to right without overlap:
//!
//! - `[[key]]`: citation with generated text, long author lists truncated
//! - `[[key >>]]`: citation listing every author
//! - `(text)[[key]]`: citation with author-supplied link text
//!
//! A token whose key is not in the bibliography is copied through verbatim.

use super::format::CitationFormatter;
use super::names::StructuredName;
use once_cell::sync::Lazy;
use pagepress_types::{BibliographyEntry, BibliographyTable, Locale};
use regex::{Captures, Regex};
use tracing::debug;

/// CSS class attached to every generated citation link
pub const REFERENCE_CLASS: &str = "bibliography-reference";

/// Rewritten text plus what the scan found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    /// Resolved keys in order of first citation
    pub cited: Vec<String>,
    /// Keys left untouched because the bibliography lacks them
    pub unresolved: Vec<String>,
    /// Raw author strings that could not be parsed and were cited verbatim
    pub unparsed_authors: Vec<String>,
}

/// Replaces citation tokens with links for one page's bibliography.
pub struct ReferenceResolver<'a> {
    bibliography: &'a BibliographyTable,
    formatter: CitationFormatter,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(bibliography: &'a BibliographyTable, locale: Locale) -> Self {
        Self::with_formatter(bibliography, CitationFormatter::new(locale))
    }

    pub fn with_formatter(bibliography: &'a BibliographyTable, formatter: CitationFormatter) -> Self {
        Self {
            bibliography,
            formatter,
        }
    }

    pub fn resolve(&self, text: &str) -> String {
        self.resolve_with_report(text).text
    }

    pub fn resolve_with_report(&self, text: &str) -> Resolution {
        let mut resolution = Resolution {
            text: String::with_capacity(text.len()),
            ..Resolution::default()
        };
        let mut last_end = 0;

        for caps in CITATION_RE.captures_iter(text) {
            let Some(full) = caps.get(0) else {
                continue;
            };
            resolution.text.push_str(&text[last_end..full.start()]);
            last_end = full.end();

            let key = caps.name("key").map(|m| m.as_str()).unwrap_or_default();
            let Some(entry) = self.bibliography.get(key) else {
                push_unique(&mut resolution.unresolved, key);
                resolution.text.push_str(full.as_str());
                continue;
            };

            push_unique(&mut resolution.cited, key);
            let label = match caps.name("label") {
                Some(label) => label.as_str().to_string(),
                None => self.citation_label(entry, show_all(&caps), &mut resolution.unparsed_authors),
            };
            resolution.text.push_str(&format!(
                "[{label}](#{key}){{: .{REFERENCE_CLASS}}}"
            ));
        }

        resolution.text.push_str(&text[last_end..]);
        resolution
    }

    fn citation_label(
        &self,
        entry: &BibliographyEntry,
        show_all: bool,
        unparsed: &mut Vec<String>,
    ) -> String {
        let surnames: Vec<String> = entry
            .authors
            .iter()
            .map(|raw| {
                let name = StructuredName::parse(raw);
                if name.is_parsed() {
                    name.surname_form()
                } else {
                    debug!("Citing unparsed author name '{}' verbatim", raw);
                    push_unique(unparsed, raw);
                    raw.trim().to_string()
                }
            })
            .collect();

        self.formatter
            .citation_text(&surnames, entry.year.as_str(), !show_all)
    }
}

/// Resolve citation tokens in `text` against `bibliography`.
///
/// ```
/// use pagepress_core::resolve;
/// use pagepress_types::{BibliographyTable, Locale};
///
/// let text = "see [[NoSuchKey]] for details";
/// assert_eq!(resolve(text, &BibliographyTable::new(), Locale::En), text);
/// ```
pub fn resolve(text: &str, bibliography: &BibliographyTable, locale: Locale) -> String {
    ReferenceResolver::new(bibliography, locale).resolve(text)
}

fn show_all(caps: &Captures<'_>) -> bool {
    caps.name("all").is_some()
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

static CITATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\((?P<label>[^()\n]*[^()\s][^()\n]*)\))?\[\[[ \t]*(?P<key>\p{Alphabetic}\S*?)[ \t]*(?P<all>>>)?[ \t]*\]\]",
    )
    .expect("valid citation regex")
});

#[cfg(test)]
mod tests {
    use super::*;
    use pagepress_types::BibliographyEntry;

    fn table() -> BibliographyTable {
        let mut table = BibliographyTable::new();
        table.insert("Jessie:1999", BibliographyEntry::new(["James, J."], 1999));
        table.insert("Lee1975", BibliographyEntry::new(["Lee, J.", "van der Berg, Paul"], 1975));
        table.insert(
            "Big2001",
            BibliographyEntry::new(
                ["Lee, J.", "Berg, P.", "Chen, A.", "Diaz, M.", "Okafor, N."],
                2001,
            ),
        );
        table
    }

    #[test]
    fn test_unknown_key_is_untouched() {
        let text = "see [[NoSuchKey]] for details";
        assert_eq!(resolve(text, &BibliographyTable::new(), Locale::En), text);
    }

    #[test]
    fn test_plain_citation() {
        let out = resolve("As shown in [[Lee1975]].", &table(), Locale::En);
        assert_eq!(
            out,
            "As shown in [Lee and van der Berg (1975)](#Lee1975){: .bibliography-reference}."
        );
    }

    #[test]
    fn test_override_text() {
        let out = resolve("see (Team Rocket)[[Jessie:1999]]", &table(), Locale::En);
        assert_eq!(
            out,
            "see [Team Rocket](#Jessie:1999){: .bibliography-reference}"
        );
    }

    #[test]
    fn test_blank_override_is_not_an_override() {
        let out = resolve("( )[[Jessie:1999]] and ()[[Jessie:1999]]", &table(), Locale::En);
        let link = "[James (1999)](#Jessie:1999){: .bibliography-reference}";
        assert_eq!(out, format!("( ){link} and (){link}"));

        let out = resolve("( Team )[[Jessie:1999]]", &table(), Locale::En);
        assert_eq!(out, "[ Team ](#Jessie:1999){: .bibliography-reference}");
    }

    #[test]
    fn test_override_with_unknown_key_is_untouched() {
        let text = "see (Team Rocket)[[Meowth:2000]] now";
        assert_eq!(resolve(text, &table(), Locale::En), text);
    }

    #[test]
    fn test_et_al_and_show_all_marker() {
        let bib = table();
        let out = resolve("[[Big2001]]", &bib, Locale::En);
        assert_eq!(out, "[Lee et al (2001)](#Big2001){: .bibliography-reference}");

        let out = resolve("[[Big2001 >>]] and [[Big2001>>]]", &bib, Locale::Fr);
        let link = "[Lee, Berg, Chen, Diaz, et Okafor (2001)](#Big2001){: .bibliography-reference}";
        assert_eq!(out, format!("{link} and {link}"));
    }

    #[test]
    fn test_whitespace_inside_brackets() {
        let out = resolve("[[ Jessie:1999 ]]", &table(), Locale::En);
        assert_eq!(out, "[James (1999)](#Jessie:1999){: .bibliography-reference}");
    }

    #[test]
    fn test_key_must_start_alphabetic() {
        let mut bib = table();
        bib.insert("1999", BibliographyEntry::new(["James, J."], 1999));
        let text = "year [[1999]] and [[ ]] and [[]]";
        assert_eq!(resolve(text, &bib, Locale::En), text);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let bib = table();
        let once = resolve("a [[Lee1975]] b (X)[[Jessie:1999]] c", &bib, Locale::En);
        let twice = resolve(&once, &bib, Locale::En);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_report_tracks_keys() {
        let bib = table();
        let resolver = ReferenceResolver::new(&bib, Locale::En);
        let report =
            resolver.resolve_with_report("[[Lee1975]] [[Nope]] [[Jessie:1999]] [[Lee1975]] [[Nope]]");
        assert_eq!(report.cited, vec!["Lee1975", "Jessie:1999"]);
        assert_eq!(report.unresolved, vec!["Nope"]);
        assert!(report.unparsed_authors.is_empty());
        assert!(report.text.contains("[[Nope]] [James (1999)]"));
    }

    #[test]
    fn test_unparsed_author_falls_back_to_raw_text() {
        let mut bib = BibliographyTable::new();
        bib.insert(
            "Odd",
            BibliographyEntry::new(["Lee, J.", "The Working Group on X, 2, 3, 4"], 2010),
        );
        let report = ReferenceResolver::new(&bib, Locale::En).resolve_with_report("[[Odd]]");
        assert_eq!(
            report.text,
            "[Lee and The Working Group on X, 2, 3, 4 (2010)](#Odd){: .bibliography-reference}"
        );
        assert_eq!(report.unparsed_authors, vec!["The Working Group on X, 2, 3, 4"]);
    }

    #[test]
    fn test_formatter_threshold_is_used() {
        let bib = table();
        let formatter = CitationFormatter::new(Locale::En).with_max_before_truncate(1);
        let out = ReferenceResolver::with_formatter(&bib, formatter).resolve("[[Lee1975]]");
        assert_eq!(out, "[Lee et al (1975)](#Lee1975){: .bibliography-reference}");
    }
}
