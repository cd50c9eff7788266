//! CLI command implementations.

pub mod check;
pub mod name;
pub mod render;

pub use check::check_pages;
pub use name::show_name;
pub use render::render_page;

use anyhow::{Context, Result};
use pagepress_core::{Config, Diagnostic, DiagnosticSeverity, Page};
use std::fs;
use std::path::Path;

/// Load the site configuration, falling back to defaults when absent
fn load_config(config_path: &Path) -> Result<Config> {
    Config::load_or_default(config_path).context("Failed to load configuration")
}

/// Read a page file and split off its front matter
fn load_page(path: &Path) -> Result<Page> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read page {:?}", path))?;
    Page::parse(Some(path.to_string_lossy().to_string()), &content)
        .with_context(|| format!("Failed to parse front matter in {:?}", path))
}

/// Log a diagnostic at the level matching its severity
fn log_diagnostic(diag: &Diagnostic) {
    let page = diag.page.as_deref().unwrap_or("-");
    match diag.severity {
        DiagnosticSeverity::Error => tracing::error!(page, "{}: {}", diag.code, diag.message),
        DiagnosticSeverity::Warning => tracing::warn!(page, "{}: {}", diag.code, diag.message),
        DiagnosticSeverity::Info => tracing::info!(page, "{}: {}", diag.code, diag.message),
    }
}
