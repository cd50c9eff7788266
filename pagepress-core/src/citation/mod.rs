//! Citation engine: author names, citation text, and inline token resolution.

pub mod format;
pub mod listing;
pub mod names;
pub mod resolver;

pub use format::{
    format_authors_list, format_citation, CitationFormatter, DEFAULT_MAX_BEFORE_TRUNCATE,
};
pub use listing::render_bibliography;
pub use names::StructuredName;
pub use resolver::{resolve, ReferenceResolver, Resolution, REFERENCE_CLASS};
