//! # Graphic Objects
//!
//! Everything that can sit in the display list. Drawable grobs carry a copy of
//! the paint state that was current when they were created, so later state
//! changes in the script never affect grobs already on the canvas.

use crate::path::BezierPath;
use crate::transform::Transform;
use crate::types::{Color, TransformMode};
use kurbo::{Affine, BezPath, Point, Rect};
use std::sync::Arc;

/// Fill, stroke and stroke width snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub strokewidth: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            strokewidth: 1.0,
        }
    }
}

impl Style {
    pub fn is_visible(&self) -> bool {
        self.fill.is_some() || self.stroke.is_some()
    }
}

/// A block of laid-out text, stored as glyph outlines.
#[derive(Clone, Debug)]
pub struct TextGrob {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    /// Glyph outlines in canvas coordinates.
    pub outline: BezPath,
    /// Laid-out block size as `(width, height)`.
    pub metrics: (f64, f64),
    /// Distance from the top of the block to the first baseline.
    pub baseline: f64,
    pub style: Style,
    pub transform: Transform,
    pub transform_mode: TransformMode,
}

impl TextGrob {
    /// The layout box, whose top sits one baseline above `y`.
    pub fn layout_box(&self) -> Rect {
        let top = self.y - self.baseline;
        Rect::new(self.x, top, self.x + self.metrics.0, top + self.metrics.1)
    }

    pub fn matrix(&self) -> Affine {
        self.transform
            .matrix_with_center(self.layout_box().center(), self.transform_mode)
    }

    /// Converts the text into a path grob that keeps the text's paint state.
    pub fn to_path(&self) -> BezierPath {
        BezierPath {
            geometry: self.outline.clone(),
            style: self.style.clone(),
            transform: self.transform.clone(),
            transform_mode: self.transform_mode,
        }
    }
}

/// An encoded bitmap placed into a destination rectangle.
#[derive(Clone, Debug)]
pub struct ImageGrob {
    pub source: String,
    pub data: Arc<Vec<u8>>,
    /// Decoded pixel dimensions.
    pub pixel_size: (u32, u32),
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub alpha: f64,
    pub transform: Transform,
    pub transform_mode: TransformMode,
}

impl ImageGrob {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn matrix(&self) -> Affine {
        self.transform
            .matrix_with_center(self.rect().center(), self.transform_mode)
    }
}

/// Starts a clipping region that lasts until the matching [`Grob::Restore`].
#[derive(Clone, Debug)]
pub struct ClipGrob {
    pub path: BezierPath,
}

impl ClipGrob {
    pub fn matrix(&self) -> Affine {
        self.path
            .transform
            .matrix_with_center(self.path.center(), self.path.transform_mode)
    }
}

/// An entry in the display list.
#[derive(Clone, Debug)]
pub enum Grob {
    Path(BezierPath),
    Text(TextGrob),
    Image(ImageGrob),
    Clip(ClipGrob),
    Restore,
}

impl Grob {
    pub fn kind(&self) -> &'static str {
        match self {
            Grob::Path(_) => "path",
            Grob::Text(_) => "text",
            Grob::Image(_) => "image",
            Grob::Clip(_) => "clip",
            Grob::Restore => "restore",
        }
    }
}

impl BezierPath {
    /// The matrix this path is painted with.
    pub fn matrix(&self) -> Affine {
        let center = if self.is_empty() {
            Point::ORIGIN
        } else {
            self.center()
        };
        self.transform.matrix_with_center(center, self.transform_mode)
    }
}
