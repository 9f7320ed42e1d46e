//! # Easel
//!
//! `easel-core` is a creative-coding drawing engine in the Nodebox tradition.
//!
//! Short scripts issue imperative drawing commands. The commands are buffered into a
//! retained display list, replayed onto a 2D surface ([Skia](https://skia.org/) or a
//! built-in PostScript writer) and saved as PNG, SVG, PDF or PS.
//! Scripts are written in [Rhai](https://rhai.rs/).
//!
//! ## Core Features
//!
//! *   **Display List**: Shapes, paths, text and images are recorded as grobs and painted in order.
//! *   **Drawing State**: Colors, transforms and text settings live in an explicit [`Bot`] context.
//! *   **Typography**: Text is laid out with Skia's paragraph engine and painted as glyph outlines.
//! *   **Variables**: Scripts declare tweakable variables that survive re-runs.
//! *   **Output**: PNG, SVG, PDF and PostScript.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use easel_core::Sketch;
//!
//! let mut sketch = Sketch::from_source(r#"
//!     size(200, 200);
//!     fill(1.0, 0.0, 0.0);
//!     rect(20, 20, 100, 100);
//! "#);
//! sketch.render("out.png").unwrap();
//! ```

/// Error type shared by the whole crate.
pub mod errors;

/// Colors, units and the drawing-mode enums.
pub mod types;

/// Recorded affine transforms.
pub mod transform;

/// Bezier paths and shape geometry.
pub mod path;

/// Graphic objects stored in the display list.
pub mod grob;

/// The display list and the painter seam.
pub mod canvas;

/// Font loading and text layout.
pub mod typography;

/// Script variables that persist across runs.
pub mod variables;

/// The drawing-state context behind every script verb.
pub mod bot;

/// Asset management (script-relative paths, font and image caches).
pub mod systems;

/// Output backends (PNG, SVG, PDF, PostScript).
pub mod export;

/// Rhai scripting API bindings.
pub mod scripting;

/// Script loading and execution.
pub mod sketch;

pub use bot::{Bot, SharedBot};
pub use canvas::{Canvas, Painter};
pub use errors::{EaselError, Result};
pub use export::OutputFormat;
pub use sketch::{RunOutcome, Sketch, SketchOptions};
pub use variables::{VarType, VarValue, Variable, VariableRegistry};

use tracing::{debug, instrument};

/// Environment variable naming the default font file.
pub const FONT_ENV: &str = "EASEL_FONT";

/// Well-known locations tried when no default font is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A trait for abstracting file system access.
///
/// This allows the engine to be embedded where assets come from somewhere other
/// than the local disk (an archive, a network store, an in-memory test fixture).
pub trait AssetLoader: Send + Sync {
    /// Loads the raw bytes of an asset from the given path.
    fn load_bytes(&self, path: &str) -> anyhow::Result<Vec<u8>>;

    /// Loads the font used when a script never calls `font()`.
    fn load_default_font(&self) -> anyhow::Result<Vec<u8>> {
        Err(anyhow::anyhow!("no default font configured"))
    }
}

/// The default implementation of `AssetLoader` using `std::fs`.
pub struct DefaultAssetLoader;

impl AssetLoader for DefaultAssetLoader {
    /// Loads bytes from the local filesystem, falling back to `assets/`.
    #[instrument(level = "debug", skip(self), fields(path = path))]
    fn load_bytes(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        if let Ok(bytes) = std::fs::read(path) {
            return Ok(bytes);
        }
        let alt = format!("assets/{}", path);
        std::fs::read(&alt).map_err(|e| {
            anyhow::anyhow!(
                "Asset not found: {} (checked '{}' and '{}'): {}",
                path,
                path,
                alt,
                e
            )
        })
    }

    /// Checks `EASEL_FONT`, then `assets/fonts/default.ttf`, then common system fonts.
    fn load_default_font(&self) -> anyhow::Result<Vec<u8>> {
        if let Ok(path) = std::env::var(FONT_ENV) {
            match std::fs::read(&path) {
                Ok(bytes) => return Ok(bytes),
                Err(e) => debug!(path = %path, error = %e, "{} is not readable", FONT_ENV),
            }
        }
        if let Ok(bytes) = std::fs::read("assets/fonts/default.ttf") {
            return Ok(bytes);
        }
        for candidate in SYSTEM_FONTS {
            if let Ok(bytes) = std::fs::read(candidate) {
                debug!(path = *candidate, "Using system font");
                return Ok(bytes);
            }
        }
        Err(anyhow::anyhow!(
            "no default font found (set {} to a .ttf/.otf file)",
            FONT_ENV
        ))
    }
}
