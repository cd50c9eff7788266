//! Page filter pipeline with the citation engine at its centre.
//!
//! Order: macros → math hooks → citation tokens → abbreviations →
//! appended bibliography listing.

pub mod abbreviations;
pub mod macros;
pub mod math;

pub use abbreviations::AbbreviationTable;
pub use macros::MacroTable;
pub use math::{EquationNumbering, MathHook, MathNode, MathPass, TensorIndices};

use crate::citation::{render_bibliography, CitationFormatter, ReferenceResolver};
use crate::config::Config;
use crate::context::RenderContext;
use crate::frontmatter::{parse_frontmatter, FrontmatterError, PageMeta};
use pagepress_types::{Diagnostic, Locale};
use serde::Serialize;
use tracing::{debug, warn};

/// A page ready to be rendered: its metadata and body text.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Identifier used in diagnostics and for path-based locale detection
    pub id: Option<String>,
    pub meta: PageMeta,
    pub body: String,
}

impl Page {
    pub fn new(meta: PageMeta, body: impl Into<String>) -> Self {
        Self {
            id: None,
            meta,
            body: body.into(),
        }
    }

    /// Split raw page content into front matter and body
    pub fn parse(id: Option<String>, content: &str) -> Result<Self, FrontmatterError> {
        let (meta, body) = parse_frontmatter(content)?;
        Ok(Self { id, meta, body })
    }
}

/// Result of rendering one page.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    pub text: String,
    pub locale: Locale,
    /// Resolved citation keys in order of first use
    pub cited: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RenderedPage {
    /// Number of distinct citation keys left unresolved
    pub fn unresolved_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.code == "citation.unresolved")
            .count()
    }
}

/// Applies the configured filters to pages.
///
/// Holds only immutable site settings; every render builds its own
/// [`RenderContext`], so one renderer can serve many pages concurrently.
pub struct PageRenderer {
    locale: Locale,
    max_before_truncate: usize,
    append_bibliography: bool,
    macros: MacroTable,
    abbreviations: AbbreviationTable,
    math: MathPass,
}

impl PageRenderer {
    pub fn new(config: &Config) -> Self {
        let mut math = MathPass::new();
        if config.math.tensor_indices {
            math = math.with_hook(TensorIndices);
        }
        if config.math.equation_numbering {
            math = math.with_hook(EquationNumbering);
        }

        Self {
            locale: config.locale,
            max_before_truncate: config.citations.max_before_truncate,
            append_bibliography: config.citations.append_bibliography,
            macros: config.macros.clone(),
            abbreviations: config.abbreviations.clone(),
            math,
        }
    }

    /// Register an additional math hook, run after the built-in ones
    pub fn with_math_hook(mut self, hook: impl MathHook + 'static) -> Self {
        self.math = self.math.with_hook(hook);
        self
    }

    pub fn render(&self, page: &Page) -> RenderedPage {
        let mut ctx = match &page.id {
            Some(id) => RenderContext::for_page(id.clone()),
            None => RenderContext::new(),
        };
        let locale = self.page_locale(page, &mut ctx);
        debug!(page = ?page.id, %locale, "Rendering page");

        let macros = self.macros.merged(&page.meta.macros);
        let text = macros.expand(&page.body);

        let text = self.math.apply(&text, &mut ctx);

        let formatter =
            CitationFormatter::new(locale).with_max_before_truncate(self.max_before_truncate);
        let resolution = ReferenceResolver::with_formatter(&page.meta.bibliography, formatter)
            .resolve_with_report(&text);
        for key in &resolution.unresolved {
            ctx.report(
                Diagnostic::warning(
                    "citation.unresolved",
                    format!("No bibliography entry for citation key '{}'", key),
                )
                .with_context(format!("[[{}]]", key)),
            );
        }
        for raw in &resolution.unparsed_authors {
            ctx.report(Diagnostic::info(
                "citation.unparsed_author",
                format!("Author name '{}' could not be parsed; cited verbatim", raw),
            ));
        }

        // The site table keeps its compiled pattern across renders
        let mut text = if page.meta.abbreviations.is_empty() {
            self.abbreviations.apply(&resolution.text)
        } else {
            self.abbreviations
                .merged(&page.meta.abbreviations)
                .apply(&resolution.text)
        };

        if self.append_bibliography {
            if let Some(listing) =
                render_bibliography(&page.meta.bibliography, &formatter, Some(resolution.cited.as_slice()))
            {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push('\n');
                text.push_str(&listing);
                text.push('\n');
            }
        }

        RenderedPage {
            text,
            locale,
            cited: resolution.cited,
            diagnostics: ctx.into_diagnostics(),
        }
    }

    /// Front matter `lang`, then the page path, then the site default.
    ///
    /// An unrecognised `lang` falls back to the site default rather than
    /// producing a sentence with no conjunction.
    fn page_locale(&self, page: &Page, ctx: &mut RenderContext) -> Locale {
        if let Some(tag) = &page.meta.lang {
            match tag.parse::<Locale>() {
                Ok(locale) => return locale,
                Err(err) => {
                    warn!("{}; falling back to '{}'", err, self.locale);
                    ctx.report(Diagnostic::warning(
                        "locale.unknown",
                        format!("{}; using '{}'", err, self.locale),
                    ));
                    return self.locale;
                }
            }
        }

        page.id
            .as_deref()
            .and_then(Locale::from_identifier)
            .unwrap_or(self.locale)
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
