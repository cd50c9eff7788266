//! Check pages and emit diagnostics.

use super::{load_config, load_page};
use anyhow::{bail, Result};
use pagepress_core::{Diagnostic, DiagnosticSeverity, PageRenderer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Serialize)]
struct CheckSummary<'a> {
    pages: usize,
    citations: usize,
    unresolved: usize,
    warnings: usize,
    diagnostics: &'a [Diagnostic],
}

/// Render every page under `paths` and report what the filters found.
///
/// In strict mode any unresolved citation makes the command fail.
pub fn check_pages(config_path: &Path, paths: &[PathBuf], json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let renderer = PageRenderer::new(&config);

    let files = collect_pages(paths);
    tracing::debug!("Checking {} pages", files.len());

    let mut diagnostics = Vec::new();
    let mut citations = 0;
    let mut unresolved = 0;
    for file in &files {
        let page = load_page(file)?;
        let rendered = renderer.render(&page);
        citations += rendered.cited.len();
        unresolved += rendered.unresolved_count();
        diagnostics.extend(rendered.diagnostics);
    }

    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Warning)
        .count();
    let summary = CheckSummary {
        pages: files.len(),
        citations,
        unresolved,
        warnings,
        diagnostics: &diagnostics,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Checked {} pages: {} citations, {} unresolved, {} warnings",
            summary.pages, citations, unresolved, warnings
        );
        for diag in &diagnostics {
            let page = diag
                .page
                .as_deref()
                .map(|s| format!(" [{}]", s))
                .unwrap_or_default();
            println!("- {:?} {}{}: {}", diag.severity, diag.code, page, diag.message);
        }
    }

    if config.strict && unresolved > 0 {
        bail!("{} unresolved citation(s) in strict mode", unresolved);
    }
    Ok(())
}

fn collect_pages(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_page(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}

fn is_page(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("markdown")
    )
}
