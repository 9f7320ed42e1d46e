//! # Export
//!
//! Turns a [`Canvas`] into an output file.
//!
//! PNG, SVG and PDF go through Skia. PostScript is written by a small
//! built-in emitter since Skia has no PostScript backend.

pub mod postscript;
pub mod skia;

use crate::canvas::Canvas;
use crate::errors::{EaselError, Result};
use std::fs;
use std::path::Path;
use tracing::instrument;

/// Output file formats, chosen by extension.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
    Pdf,
    Ps,
}

impl OutputFormat {
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            "ps" | "eps" => Ok(Self::Ps),
            _ => Err(EaselError::UnsupportedFormat(ext.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| EaselError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(ext)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Ps => "ps",
        }
    }
}

/// Size of the output page, either the canvas size or a letterboxed fit.
fn page_size(canvas_size: (f64, f64), fit: Option<(u32, u32)>) -> (f64, f64) {
    match fit {
        Some((w, h)) if w > 0 && h > 0 => (w as f64, h as f64),
        _ => canvas_size,
    }
}

/// Encodes the canvas in `format` and returns the file contents.
pub fn render_to_bytes(
    canvas: &Canvas,
    canvas_size: (f64, f64),
    fit: Option<(u32, u32)>,
    format: OutputFormat,
) -> Result<Vec<u8>> {
    let page = page_size(canvas_size, fit);
    match format {
        OutputFormat::Png => skia::render_png(canvas, canvas_size, page),
        OutputFormat::Svg => skia::render_svg(canvas, canvas_size, page),
        OutputFormat::Pdf => skia::render_pdf(canvas, canvas_size, page),
        OutputFormat::Ps => postscript::render_ps(canvas, canvas_size, page),
    }
}

/// Renders the canvas to `path`, picking the format from the extension.
#[instrument(level = "debug", skip(canvas), fields(path = %path.display()))]
pub fn render_to_file(
    canvas: &Canvas,
    canvas_size: (f64, f64),
    fit: Option<(u32, u32)>,
    path: &Path,
) -> Result<()> {
    let format = OutputFormat::from_path(path)?;
    let bytes = render_to_bytes(canvas, canvas_size, fit, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}
