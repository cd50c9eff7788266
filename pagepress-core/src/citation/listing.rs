//! Bibliography listing rendered at the end of a page.
//!
//! Each entry carries its citation key as its DOM id, which is what the
//! links emitted by the resolver point at.

use super::format::CitationFormatter;
use super::names::StructuredName;
use crate::html::escape;
use pagepress_types::{BibliographyEntry, BibliographyTable, Locale};
use std::cmp::Ordering;

/// Render entries of `table` as an HTML list.
///
/// `only` restricts the listing to the given keys (keys missing from the
/// table are skipped). Returns `None` when there is nothing to list.
pub fn render_bibliography(
    table: &BibliographyTable,
    formatter: &CitationFormatter,
    only: Option<&[String]>,
) -> Option<String> {
    let mut entries: Vec<(&str, &BibliographyEntry)> = match only {
        Some(keys) => keys
            .iter()
            .filter_map(|k| table.get(k).map(|e| (k.as_str(), e)))
            .collect(),
        None => table.iter().collect(),
    };
    if entries.is_empty() {
        return None;
    }
    entries.sort_by(|a, b| compare_entries(a, b));

    let mut html = format!(
        "<section class=\"bibliography\"><h3>{}</h3>\n<ol class=\"bibliography-list\">\n",
        heading(formatter.locale())
    );
    for (key, entry) in entries {
        html.push_str(&format!("<li id=\"{}\">", escape(key)));

        let names: Vec<String> = entry.authors.iter().map(|raw| display_name(raw)).collect();
        let authors = formatter.join(&names);
        if !authors.is_empty() {
            html.push_str(&format!(
                "<span class=\"bibliography-authors\">{}</span> ",
                escape(&authors)
            ));
        }
        html.push_str(&format!("({})", escape(entry.year.as_str())));
        if let Some(title) = &entry.title {
            html.push_str(&format!(
                ". <span class=\"bibliography-title\">{}</span>",
                escape(title)
            ));
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ol></section>");

    Some(html)
}

fn heading(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "References",
        Locale::Fr => "Références",
    }
}

fn display_name(raw: &str) -> String {
    let name = StructuredName::parse(raw);
    if name.is_parsed() {
        name.full_name()
    } else {
        raw.trim().to_string()
    }
}

fn sort_name(entry: &BibliographyEntry) -> String {
    entry
        .authors
        .first()
        .map(|raw| {
            let name = StructuredName::parse(raw);
            let last = name.last.unwrap_or_else(|| raw.trim().to_string());
            last.to_lowercase()
        })
        .unwrap_or_default()
}

fn compare_entries(a: &(&str, &BibliographyEntry), b: &(&str, &BibliographyEntry)) -> Ordering {
    sort_name(a.1)
        .cmp(&sort_name(b.1))
        .then_with(|| a.1.year.cmp(&b.1.year))
        .then_with(|| a.0.cmp(b.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn table() -> BibliographyTable {
        let mut table = BibliographyTable::new();
        table.insert(
            "Lee1975",
            BibliographyEntry::new(["Lee, J.", "van der Berg, Jr, Paul"], 1975)
                .with_title("Notes on <Things>"),
        );
        table.insert("Abel1990", BibliographyEntry::new(["Abel, N."], 1990));
        table.insert("Abel1980", BibliographyEntry::new(["Abel, N."], 1980));
        table.insert("Anon", BibliographyEntry::new(Vec::<String>::new(), "n.d."));
        table
    }

    #[test]
    fn test_full_listing() {
        let html = render_bibliography(&table(), &CitationFormatter::new(Locale::En), None).unwrap();
        assert_snapshot!(html, @r###"
        <section class="bibliography"><h3>References</h3>
        <ol class="bibliography-list">
        <li id="Anon">(n.d.)</li>
        <li id="Abel1980"><span class="bibliography-authors">N. Abel</span> (1980)</li>
        <li id="Abel1990"><span class="bibliography-authors">N. Abel</span> (1990)</li>
        <li id="Lee1975"><span class="bibliography-authors">J. Lee and Paul van der Berg, Jr</span> (1975). <span class="bibliography-title">Notes on &lt;Things&gt;</span></li>
        </ol></section>
        "###);
    }

    #[test]
    fn test_only_cited_keys() {
        let cited = vec!["Lee1975".to_string(), "Missing".to_string()];
        let html =
            render_bibliography(&table(), &CitationFormatter::new(Locale::Fr), Some(cited.as_slice())).unwrap();
        assert!(html.contains("<h3>Références</h3>"));
        assert!(html.contains("id=\"Lee1975\""));
        assert!(html.contains("J. Lee et Paul van der Berg, Jr"));
        assert!(!html.contains("Abel"));
    }

    #[test]
    fn test_nothing_to_list() {
        let formatter = CitationFormatter::new(Locale::En);
        assert!(render_bibliography(&BibliographyTable::new(), &formatter, None).is_none());
        assert!(render_bibliography(&table(), &formatter, Some(&[] as &[String])).is_none());
    }

    #[test]
    fn test_key_is_escaped_in_id() {
        let mut table = BibliographyTable::new();
        table.insert("a\"b", BibliographyEntry::new(["Lee, J."], 2000));
        let html = render_bibliography(&table, &CitationFormatter::default(), None).unwrap();
        assert!(html.contains("<li id=\"a&quot;b\">"));
    }

    #[test]
    fn test_authors_join_like_untruncated_byline() {
        let mut table = BibliographyTable::new();
        let authors = ["Lee, J.", "Berg, P.", "Chen, A.", "Diaz, M.", "Okafor, N."];
        table.insert("Big2001", BibliographyEntry::new(authors, 2001));
        table.insert("Raw", BibliographyEntry::new(["Lee, J.", " J.Smith "], 2002));

        let formatter = CitationFormatter::new(Locale::En);
        let html = render_bibliography(&table, &formatter, None).unwrap();
        let names: Vec<StructuredName> = authors.iter().map(|a| StructuredName::parse(a)).collect();
        let byline = formatter.format_authors_list(&names, None);
        assert!(html.contains(&format!("<span class=\"bibliography-authors\">{byline}</span>")));
        assert!(html.contains("J. Lee and J.Smith</span>"));
    }
}
