use crate::errors::{EaselError, Result};
use crate::typography::FontFace;
use crate::AssetLoader;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument};

/// A decoded-enough image: the encoded bytes plus the pixel dimensions.
#[derive(Clone, Debug)]
pub struct LoadedImage {
    pub data: Arc<Vec<u8>>,
    pub size: (u32, u32),
}

/// Resolves script-relative paths and caches fonts and images.
///
/// Relative paths are tried against the script directory first, then handed
/// to the [`AssetLoader`] as-is.
#[derive(Clone)]
pub struct AssetManager {
    pub loader: Arc<dyn AssetLoader>,
    pub base_dir: Option<PathBuf>,
    fonts: HashMap<String, Arc<FontFace>>,
    default_font: Option<Arc<FontFace>>,
    images: HashMap<String, LoadedImage>,
}

impl AssetManager {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            loader,
            base_dir: None,
            fonts: HashMap::new(),
            default_font: None,
            images: HashMap::new(),
        }
    }

    pub fn with_base_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.base_dir = dir;
        self
    }

    /// Maps `path` onto the script directory when that file exists.
    pub fn resolve(&self, path: &str) -> String {
        let p = Path::new(path);
        if p.is_relative() {
            if let Some(dir) = &self.base_dir {
                let candidate = dir.join(p);
                if candidate.exists() {
                    return candidate.to_string_lossy().into_owned();
                }
            }
        }
        path.to_string()
    }

    pub fn load_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let resolved = self.resolve(path);
        self.loader
            .load_bytes(&resolved)
            .map_err(|e| EaselError::AssetNotFound(format!("{} ({})", path, e)))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn font(&mut self, path: &str) -> Result<Arc<FontFace>> {
        if let Some(face) = self.fonts.get(path) {
            return Ok(face.clone());
        }
        let bytes = self.load_bytes(path)?;
        let face = Arc::new(FontFace::from_bytes(Arc::new(bytes))?);
        self.fonts.insert(path.to_string(), face.clone());
        Ok(face)
    }

    pub fn default_font(&mut self) -> Result<Arc<FontFace>> {
        if let Some(face) = &self.default_font {
            return Ok(face.clone());
        }
        let bytes = self.loader.load_default_font().map_err(|e| {
            debug!(error = %e, "Default font lookup failed");
            EaselError::FontUnavailable
        })?;
        let face = Arc::new(FontFace::from_bytes(Arc::new(bytes))?);
        self.default_font = Some(face.clone());
        Ok(face)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn image(&mut self, path: &str) -> Result<LoadedImage> {
        if let Some(image) = self.images.get(path) {
            return Ok(image.clone());
        }
        let bytes = self.load_bytes(path)?;
        let size = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| EaselError::Image(e.to_string()))?
            .into_dimensions()
            .map_err(|e| EaselError::Image(format!("{}: {}", path, e)))?;
        let loaded = LoadedImage {
            data: Arc::new(bytes),
            size,
        };
        self.images.insert(path.to_string(), loaded.clone());
        Ok(loaded)
    }
}
