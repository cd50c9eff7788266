//! Page-scoped render state.

use pagepress_types::Diagnostic;
use std::collections::HashSet;

/// State that lives for exactly one page render.
///
/// A fresh context is created per page so renders stay independent and
/// can run in parallel.
#[derive(Debug, Default)]
pub struct RenderContext {
    page: Option<String>,
    diagnostics: Vec<Diagnostic>,
    equation_labels: HashSet<String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_page(page: impl Into<String>) -> Self {
        Self {
            page: Some(page.into()),
            ..Self::default()
        }
    }

    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }

    /// Record a diagnostic, tagging it with the current page
    pub fn report(&mut self, diagnostic: Diagnostic) {
        let diagnostic = match (&self.page, &diagnostic.page) {
            (Some(page), None) => diagnostic.with_page(page.clone()),
            _ => diagnostic,
        };
        self.diagnostics.push(diagnostic);
    }

    /// Register an equation label; false if the page already used it.
    pub fn register_label(&mut self, label: &str) -> bool {
        self.equation_labels.insert(label.to_string())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
