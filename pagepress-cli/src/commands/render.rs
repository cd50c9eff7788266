//! Render command implementation.

use super::{load_config, load_page, log_diagnostic};
use anyhow::{Context, Result};
use pagepress_core::PageRenderer;
use std::fs;
use std::path::Path;

/// Render one page and write the result to `output` or stdout.
///
/// Diagnostics are logged; they never fail the render.
pub fn render_page(config_path: &Path, input: &Path, output: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let page = load_page(input)?;

    let rendered = PageRenderer::new(&config).render(&page);
    rendered.diagnostics.iter().for_each(log_diagnostic);

    match output {
        Some(path) => {
            fs::write(path, &rendered.text)
                .with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("Wrote {:?} ({} citations)", path, rendered.cited.len());
        }
        None => print!("{}", rendered.text),
    }

    Ok(())
}
