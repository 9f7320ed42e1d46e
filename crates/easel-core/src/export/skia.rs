//! Skia-backed painter and the PNG, SVG and PDF writers.

use crate::canvas::{Canvas, Painter};
use crate::errors::{EaselError, Result};
use crate::grob::{ImageGrob, Style};
use kurbo::{Affine, BezPath, PathEl};
use skia_safe::{
    pdf, surfaces, svg, AlphaType, ClipOp, Color, ColorSpace, ColorType, Data, Image, ImageInfo,
    Matrix, Paint, PaintStyle, Path, Rect,
};
use std::io::Cursor;
use tracing::warn;

/// Replays grobs onto any Skia canvas (raster, SVG or PDF).
pub struct SkiaPainter<'a> {
    canvas: &'a skia_safe::Canvas,
}

impl<'a> SkiaPainter<'a> {
    pub fn new(canvas: &'a skia_safe::Canvas) -> Self {
        Self { canvas }
    }
}

impl Painter for SkiaPainter<'_> {
    fn save(&mut self) {
        self.canvas.save();
    }

    fn restore(&mut self) {
        self.canvas.restore();
    }

    fn concat(&mut self, matrix: Affine) {
        self.canvas.concat(&to_skia_matrix(matrix));
    }

    fn clip(&mut self, path: &BezPath) {
        self.canvas
            .clip_path(&to_skia_path(path), ClipOp::Intersect, true);
    }

    fn fill_and_stroke(&mut self, path: &BezPath, style: &Style) {
        let sk_path = to_skia_path(path);
        if let Some(fill) = style.fill {
            let mut paint = Paint::new(fill.to_color4f(), None);
            paint.set_anti_alias(true);
            paint.set_style(PaintStyle::Fill);
            self.canvas.draw_path(&sk_path, &paint);
        }
        if let Some(stroke) = style.stroke {
            let mut paint = Paint::new(stroke.to_color4f(), None);
            paint.set_anti_alias(true);
            paint.set_style(PaintStyle::Stroke);
            paint.set_stroke_width(style.strokewidth as f32);
            self.canvas.draw_path(&sk_path, &paint);
        }
    }

    fn draw_image(&mut self, image: &ImageGrob) {
        let Some(sk_image) = Image::from_encoded(Data::new_copy(&image.data)) else {
            warn!(source = %image.source, "Skia could not decode image; skipped");
            return;
        };
        let mut paint = Paint::default();
        paint.set_anti_alias(true);
        paint.set_alpha_f(image.alpha as f32);
        let rect = Rect::from_xywh(
            image.x as f32,
            image.y as f32,
            image.width as f32,
            image.height as f32,
        );
        self.canvas.draw_image_rect(&sk_image, None, rect, &paint);
    }
}

/// Kurbo's `[a, b, c, d, e, f]` is column-major; Skia wants row-major.
pub fn to_skia_matrix(m: Affine) -> Matrix {
    let [a, b, c, d, e, f] = m.as_coeffs();
    Matrix::new_all(
        a as f32, c as f32, e as f32, b as f32, d as f32, f as f32, 0.0, 0.0, 1.0,
    )
}

pub fn to_skia_path(bez_path: &BezPath) -> Path {
    let mut path = Path::new();
    for el in bez_path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                path.move_to((p.x as f32, p.y as f32));
            }
            PathEl::LineTo(p) => {
                path.line_to((p.x as f32, p.y as f32));
            }
            PathEl::QuadTo(p1, p2) => {
                path.quad_to((p1.x as f32, p1.y as f32), (p2.x as f32, p2.y as f32));
            }
            PathEl::CurveTo(p1, p2, p3) => {
                path.cubic_to(
                    (p1.x as f32, p1.y as f32),
                    (p2.x as f32, p2.y as f32),
                    (p3.x as f32, p3.y as f32),
                );
            }
            PathEl::ClosePath => {
                path.close();
            }
        }
    }
    path
}

fn replay(target: &skia_safe::Canvas, canvas: &Canvas, canvas_size: (f64, f64), page: (f64, f64)) {
    let mut painter = SkiaPainter::new(target);
    if page == canvas_size {
        canvas.draw(&mut painter);
    } else {
        canvas.draw_fitted(&mut painter, canvas_size, page);
    }
}

/// Rasterizes onto a transparent RGBA surface and encodes it as PNG.
pub fn render_png(canvas: &Canvas, canvas_size: (f64, f64), page: (f64, f64)) -> Result<Vec<u8>> {
    let (w, h) = (page.0.round().max(1.0) as i32, page.1.round().max(1.0) as i32);
    let info = ImageInfo::new(
        (w, h),
        ColorType::RGBA8888,
        AlphaType::Premul,
        Some(ColorSpace::new_srgb()),
    );
    let mut surface = surfaces::raster(&info, None, None).ok_or(EaselError::SurfaceFailure)?;
    surface.canvas().clear(Color::TRANSPARENT);
    replay(surface.canvas(), canvas, canvas_size, page);

    // PNG stores straight alpha.
    let read_info = ImageInfo::new(
        (w, h),
        ColorType::RGBA8888,
        AlphaType::Unpremul,
        Some(ColorSpace::new_srgb()),
    );
    let mut pixels = vec![0u8; (w * h * 4) as usize];
    if !surface.read_pixels(&read_info, &mut pixels, (w * 4) as usize, (0, 0)) {
        return Err(EaselError::Graphics("reading back the raster surface failed".into()));
    }
    let image = image::RgbaImage::from_raw(w as u32, h as u32, pixels)
        .ok_or_else(|| EaselError::Graphics("raster buffer has the wrong size".into()))?;
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| EaselError::Image(e.to_string()))?;
    Ok(out.into_inner())
}

pub fn render_svg(canvas: &Canvas, canvas_size: (f64, f64), page: (f64, f64)) -> Result<Vec<u8>> {
    let bounds = Rect::from_wh(page.0 as f32, page.1 as f32);
    let svg_canvas = svg::Canvas::new(bounds, None);
    replay(&svg_canvas, canvas, canvas_size, page);
    let data = svg_canvas.end();
    Ok(data.as_bytes().to_vec())
}

pub fn render_pdf(canvas: &Canvas, canvas_size: (f64, f64), page: (f64, f64)) -> Result<Vec<u8>> {
    let mut out: Vec<u8> = Vec::new();
    {
        let document = pdf::new_document(&mut out, None);
        let mut on_page = document.begin_page((page.0 as f32, page.1 as f32), None);
        replay(on_page.canvas(), canvas, canvas_size, page);
        on_page.end_page().close();
    }
    if out.is_empty() {
        return Err(EaselError::Graphics("PDF document is empty".into()));
    }
    Ok(out)
}
