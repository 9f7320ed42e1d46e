//! # Canvas
//!
//! The retained display list and its replay onto a [`Painter`].
//!
//! ## Responsibilities
//! - **Ordering**: Grobs are painted in insertion order.
//! - **State Isolation**: Every grob is painted inside its own save/restore pair.
//! - **Clipping**: Clip grobs open a clip that lasts until the matching restore.
//!   Clips left open at the end of the list are closed.

use crate::grob::{Grob, ImageGrob, Style};
use crate::transform::fit_matrix;
use kurbo::{Affine, BezPath, Vec2};
use tracing::warn;

/// Backend seam used when replaying the display list.
pub trait Painter {
    fn save(&mut self);
    fn restore(&mut self);
    fn concat(&mut self, matrix: Affine);
    fn clip(&mut self, path: &BezPath);
    /// Fills then strokes `path` with whatever parts of `style` are set.
    fn fill_and_stroke(&mut self, path: &BezPath, style: &Style);
    /// Draws the image scaled into its destination rect.
    fn draw_image(&mut self, image: &ImageGrob);
}

#[derive(Clone, Debug, Default)]
pub struct Canvas {
    grobs: Vec<Grob>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, grob: Grob) {
        self.grobs.push(grob);
    }

    pub fn clear(&mut self) {
        self.grobs.clear();
    }

    pub fn len(&self) -> usize {
        self.grobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grobs.is_empty()
    }

    pub fn grobs(&self) -> &[Grob] {
        &self.grobs
    }

    /// Replays every grob onto `painter`.
    pub fn draw(&self, painter: &mut dyn Painter) {
        let mut open_clips = 0usize;

        for grob in &self.grobs {
            match grob {
                Grob::Path(path) => {
                    if !path.style.is_visible() {
                        warn!("Path has neither fill nor stroke; nothing painted");
                        continue;
                    }
                    painter.save();
                    painter.concat(path.matrix());
                    painter.fill_and_stroke(&path.geometry, &path.style);
                    painter.restore();
                }
                Grob::Text(text) => {
                    if !text.style.is_visible() {
                        warn!(text = %text.text, "Text has neither fill nor stroke; nothing painted");
                        continue;
                    }
                    painter.save();
                    painter.concat(text.matrix());
                    painter.fill_and_stroke(&text.outline, &text.style);
                    painter.restore();
                }
                Grob::Image(image) => {
                    painter.save();
                    painter.concat(image.matrix());
                    painter.draw_image(image);
                    painter.restore();
                }
                Grob::Clip(clip) => {
                    painter.save();
                    let mut geometry = clip.path.geometry.clone();
                    geometry.apply_affine(clip.matrix());
                    painter.clip(&geometry);
                    open_clips += 1;
                }
                Grob::Restore => {
                    if open_clips == 0 {
                        warn!("endclip() without a matching beginclip(); ignored");
                        continue;
                    }
                    painter.restore();
                    open_clips -= 1;
                }
            }
        }

        for _ in 0..open_clips {
            painter.restore();
        }
    }

    /// Replays the list scaled to fit `viewport`, letterboxed and centered.
    pub fn draw_fitted(&self, painter: &mut dyn Painter, canvas_size: (f64, f64), viewport: (f64, f64)) {
        painter.save();
        painter.concat(letterbox(canvas_size, viewport));
        self.draw(painter);
        painter.restore();
    }
}

/// Scale and offset mapping a canvas of `canvas_size` into `viewport`.
pub fn letterbox(canvas_size: (f64, f64), viewport: (f64, f64)) -> Affine {
    let (cw, ch) = canvas_size;
    let (vw, vh) = viewport;
    if cw <= 0.0 || ch <= 0.0 || vw <= 0.0 || vh <= 0.0 {
        return Affine::IDENTITY;
    }

    let canvas_ratio = cw / ch;
    let viewport_ratio = vw / vh;
    if viewport_ratio < canvas_ratio {
        let scale = vw / cw;
        fit_matrix(scale, Vec2::new(0.0, (vh - ch * scale) / 2.0))
    } else {
        let scale = vh / ch;
        fit_matrix(scale, Vec2::new((vw - cw * scale) / 2.0, 0.0))
    }
}
