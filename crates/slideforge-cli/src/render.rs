//! Slide images through LibreOffice and poppler
//!
//! `soffice --headless` converts the deck to PDF, `pdftoppm` rasterizes each
//! page. Page images are renamed to `slide-01.png`, `slide-02.png`, ... and
//! the intermediate PDF is removed. Page images from an earlier render in
//! the same directory are deleted first.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::config::RenderConfig;

const PAGE_PREFIX: &str = "slide";

/// Default output directory: `<stem>_slides` next to the deck
pub fn default_output_dir(pptx: &Path) -> PathBuf {
    let stem = pptx
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "deck".to_string());
    pptx.parent()
        .unwrap_or(Path::new("."))
        .join(format!("{}_slides", stem))
}

/// Render every slide of `pptx` into `output_dir`; returns the images in
/// slide order
pub fn render_slides(pptx: &Path, output_dir: &Path, dpi: u32, tools: &RenderConfig) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;
    let stale = clear_stale_pages(output_dir)?;
    if stale > 0 {
        debug!(count = stale, dir = %output_dir.display(), "removed earlier page images");
    }

    let mut soffice = Command::new(&tools.soffice);
    soffice
        .args(["--headless", "--convert-to", "pdf", "--outdir"])
        .arg(output_dir)
        .arg(pptx);
    run_tool(&tools.soffice, soffice)?;

    let pdf = output_dir.join(pptx.with_extension("pdf").file_name().unwrap_or_default());
    if !pdf.is_file() {
        anyhow::bail!("{} produced no PDF for {}", tools.soffice, pptx.display());
    }

    let mut pdftoppm = Command::new(&tools.pdftoppm);
    pdftoppm
        .args(["-png", "-r"])
        .arg(dpi.to_string())
        .arg(&pdf)
        .arg(output_dir.join(PAGE_PREFIX));
    let rasterized = run_tool(&tools.pdftoppm, pdftoppm);

    if let Err(e) = fs::remove_file(&pdf) {
        warn!(pdf = %pdf.display(), error = %e, "intermediate PDF not removed");
    }
    rasterized?;

    normalize_page_names(output_dir)
}

fn run_tool(name: &str, mut command: Command) -> Result<()> {
    debug!(command = ?command, "running");
    let output = command
        .output()
        .with_context(|| format!("Failed to run {} (is it installed and on PATH?)", name))?;
    if !output.status.success() {
        anyhow::bail!(
            "{} failed ({}): {}",
            name,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

/// Page number of a `slide-<n>.png` image name
fn page_number(path: &Path) -> Option<u32> {
    path.file_name()?
        .to_str()?
        .strip_prefix("slide-")?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

/// Delete every `slide-<n>.png` in `dir`; returns how many were removed
pub fn clear_stale_pages(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && page_number(&path).is_some() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Rename `slide-<n>.png` (pdftoppm pads to the page count's width) to
/// two-digit `slide-NN.png`; returns the images sorted by page
pub fn normalize_page_names(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<(u32, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if let Some(page) = page_number(&path) {
            pages.push((page, path));
        }
    }
    pages.sort_by_key(|(page, _)| *page);

    let mut images = Vec::with_capacity(pages.len());
    for (page, path) in pages {
        let target = dir.join(format!("{}-{:02}.png", PAGE_PREFIX, page));
        if target != path {
            fs::rename(&path, &target)?;
        }
        images.push(target);
    }
    Ok(images)
}
