//! Bibliography data supplied per page by the caller.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Display value for an entry's year.
///
/// Front matter may give the year as an integer or as free text
/// (`1975`, `"1975a"`, `"forthcoming"`); it is kept as opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "YearRepr", into = "String")]
pub struct Year(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum YearRepr {
    Int(i64),
    Text(String),
}

impl From<YearRepr> for Year {
    fn from(repr: YearRepr) -> Self {
        match repr {
            YearRepr::Int(n) => Year(n.to_string()),
            YearRepr::Text(s) => Year(s),
        }
    }
}

impl From<Year> for String {
    fn from(year: Year) -> Self {
        year.0
    }
}

impl Year {
    pub fn new(value: impl Into<String>) -> Self {
        Year(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Year {
    fn from(value: &str) -> Self {
        Year(value.to_string())
    }
}

impl From<i32> for Year {
    fn from(value: i32) -> Self {
        Year(value.to_string())
    }
}

impl From<i64> for Year {
    fn from(value: i64) -> Self {
        Year(value.to_string())
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single bibliography entry.
///
/// Authors are raw strings in "von Last, Jr, First" order and are kept
/// in citation order, not sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibliographyEntry {
    #[serde(default)]
    pub authors: Vec<String>,
    pub year: Year,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl BibliographyEntry {
    pub fn new<I, S>(authors: I, year: impl Into<Year>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            authors: authors.into_iter().map(Into::into).collect(),
            year: year.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Key → entry mapping for one page.
///
/// A missing key is the ordinary "not yet defined" case, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BibliographyTable {
    entries: HashMap<String, BibliographyEntry>,
}

impl BibliographyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any previous entry with the same key
    pub fn insert(&mut self, key: impl Into<String>, entry: BibliographyEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Lookup a bibliography entry by key.
    pub fn get(&self, key: &str) -> Option<&BibliographyEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BibliographyEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge another table into this one; entries from `other` win.
    pub fn extend(&mut self, other: BibliographyTable) {
        self.entries.extend(other.entries);
    }
}

impl FromIterator<(String, BibliographyEntry)> for BibliographyTable {
    fn from_iter<T: IntoIterator<Item = (String, BibliographyEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_from_int_or_text() {
        let entry: BibliographyEntry =
            serde_yaml::from_str("authors: [\"Lee, J.\"]\nyear: 1975\n").unwrap();
        assert_eq!(entry.year.as_str(), "1975");

        let entry: BibliographyEntry =
            serde_yaml::from_str("authors: [\"Lee, J.\"]\nyear: \"1975a\"\n").unwrap();
        assert_eq!(entry.year, Year::from("1975a"));
    }

    #[test]
    fn test_authors_keep_insertion_order() {
        let entry: BibliographyEntry =
            serde_yaml::from_str("authors: [\"Zeta, A.\", \"Alpha, B.\"]\nyear: 2001\n").unwrap();
        assert_eq!(entry.authors, vec!["Zeta, A.", "Alpha, B."]);
    }

    #[test]
    fn test_table_deserializes_from_mapping() {
        let yaml = r#"
"Jessie:1999":
  authors: ["James, J."]
  year: 1999
Lee1975:
  authors: []
  year: 1975
  title: Notes
"#;
        let table: BibliographyTable = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.contains_key("Jessie:1999"));
        assert_eq!(table.get("Lee1975").unwrap().title.as_deref(), Some("Notes"));
        assert!(table.get("Missing").is_none());
    }

    #[test]
    fn test_extend_overrides() {
        let mut table = BibliographyTable::new();
        table.insert("k", BibliographyEntry::new(["A, B."], 1990));
        let other: BibliographyTable = [("k".to_string(), BibliographyEntry::new(["C, D."], 2000))]
            .into_iter()
            .collect();
        table.extend(other);
        assert_eq!(table.get("k").unwrap().year.as_str(), "2000");
    }
}
