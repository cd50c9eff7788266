//! Per-page metadata parsed from YAML front matter.

use crate::filters::{AbbreviationTable, MacroTable};
use pagepress_types::BibliographyTable;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Metadata a page supplies to the filters.
///
/// Keys the filters do not use are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub title: Option<String>,

    /// Language tag; validated when the page is rendered
    #[serde(default)]
    pub lang: Option<String>,

    #[serde(default)]
    pub bibliography: BibliographyTable,

    #[serde(default)]
    pub macros: MacroTable,

    #[serde(default)]
    pub abbreviations: AbbreviationTable,
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)^---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n(.*))?$")
            .expect("valid frontmatter regex")
    })
}

/// Parse front matter from page content
///
/// Returns a tuple of (metadata, body).
/// If no front matter is present, returns default metadata with the full content as body.
///
/// # Example
///
/// ```
/// use pagepress_core::frontmatter::parse_frontmatter;
///
/// let content = "---\ntitle: Notes\nlang: fr\n---\nSee [[Lee1975]].\n";
///
/// let (meta, body) = parse_frontmatter(content).unwrap();
/// assert_eq!(meta.title.as_deref(), Some("Notes"));
/// assert_eq!(meta.lang.as_deref(), Some("fr"));
/// assert_eq!(body, "See [[Lee1975]].\n");
/// ```
pub fn parse_frontmatter(content: &str) -> Result<(PageMeta, String), FrontmatterError> {
    let Some(captures) = frontmatter_regex().captures(content) else {
        return Ok((PageMeta::default(), content.to_string()));
    };

    let yaml = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let body = captures.get(2).map(|m| m.as_str()).unwrap_or_default();

    let meta = if yaml.trim().is_empty() {
        PageMeta::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    Ok((meta, body.to_string()))
}
