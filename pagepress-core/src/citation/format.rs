//! Citation and author-list text.

use super::names::StructuredName;
use pagepress_types::Locale;

/// Author count above which a citation collapses to "First et al"
pub const DEFAULT_MAX_BEFORE_TRUNCATE: usize = 4;

/// Renders author lists and citation labels for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationFormatter {
    locale: Locale,
    max_before_truncate: usize,
}

impl CitationFormatter {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            max_before_truncate: DEFAULT_MAX_BEFORE_TRUNCATE,
        }
    }

    pub fn with_max_before_truncate(mut self, max: usize) -> Self {
        self.max_before_truncate = max;
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn max_before_truncate(&self) -> usize {
        self.max_before_truncate
    }

    /// Citation label such as "Lee and Berg (1975)".
    ///
    /// With `et_al` false, long author lists are shown in full.
    pub fn format_citation(&self, names: &[StructuredName], year: &str, et_al: bool) -> String {
        let surnames: Vec<String> = names.iter().map(StructuredName::surname_form).collect();
        self.citation_text(&surnames, year, et_al)
    }

    /// Same as [`format_citation`](Self::format_citation) over names that are
    /// already rendered, for callers that substitute raw text for unparsed names.
    pub fn citation_text(&self, surnames: &[String], year: &str, et_al: bool) -> String {
        let authors = if surnames.len() > self.max_before_truncate {
            if et_al {
                format!("{} et al", surnames[0])
            } else {
                self.join_serial(surnames)
            }
        } else {
            self.join(surnames)
        };

        if authors.is_empty() {
            format!("({year})")
        } else {
            format!("{authors} ({year})")
        }
    }

    /// Byline of full names, "J. Lee, P. Berg, and A. Chen".
    ///
    /// `truncate_after` collapses lists longer than the threshold to
    /// "Surname, al." for the first author; `None` always lists everyone.
    pub fn format_authors_list(
        &self,
        names: &[StructuredName],
        truncate_after: Option<usize>,
    ) -> String {
        match (truncate_after, names.first()) {
            (Some(max), Some(first)) if names.len() > max => {
                format!("{}, al.", first.surname_form())
            }
            _ => {
                let full: Vec<String> = names.iter().map(StructuredName::full_name).collect();
                self.join(&full)
            }
        }
    }

    /// "A", "A and B", "A, B, and C"
    pub fn join(&self, items: &[String]) -> String {
        match items {
            [] => String::new(),
            [only] => only.clone(),
            [a, b] => format!("{a} {} {b}", self.locale.conjunction()),
            _ => self.join_serial(items),
        }
    }

    fn join_serial(&self, items: &[String]) -> String {
        match items.split_last() {
            None => String::new(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => {
                format!("{}, {} {last}", rest.join(", "), self.locale.conjunction())
            }
        }
    }
}

impl Default for CitationFormatter {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

/// Citation label for `names`; see [`CitationFormatter::format_citation`].
pub fn format_citation(
    names: &[StructuredName],
    year: &str,
    locale: Locale,
    et_al: bool,
    max_before_truncate: usize,
) -> String {
    CitationFormatter::new(locale)
        .with_max_before_truncate(max_before_truncate)
        .format_citation(names, year, et_al)
}

/// Full-name byline for `names`; see [`CitationFormatter::format_authors_list`].
pub fn format_authors_list(
    names: &[StructuredName],
    locale: Locale,
    max_before_truncate: Option<usize>,
) -> String {
    CitationFormatter::new(locale).format_authors_list(names, max_before_truncate)
}
