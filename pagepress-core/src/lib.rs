//! # pagepress-core
//!
//! Core library for the pagepress page filters.
//!
//! The centre of this crate is the citation engine: parsing author names,
//! rendering citation text and bibliography listings, and resolving inline
//! `[[key]]` tokens against a page's bibliography. Around it sit the other
//! per-page filters (macros, math hooks, abbreviations) and the site
//! configuration that drives them.

pub mod citation;
pub mod config;
pub mod context;
pub mod filters;
pub mod frontmatter;
mod html;

pub use citation::{
    format_authors_list, format_citation, render_bibliography, resolve, CitationFormatter,
    ReferenceResolver, Resolution, StructuredName,
};
pub use config::{Config, ConfigError};
pub use context::RenderContext;
pub use filters::{Page, PageRenderer, RenderedPage};
pub use frontmatter::{parse_frontmatter, FrontmatterError, PageMeta};
pub use pagepress_types::{
    BibliographyEntry, BibliographyTable, Diagnostic, DiagnosticSeverity, Locale, Year,
};
