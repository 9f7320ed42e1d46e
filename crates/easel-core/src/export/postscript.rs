//! A minimal PostScript writer.
//!
//! Output is EPS-compatible level 2 PostScript. The page is flipped so that
//! the origin is at the top-left like every other backend. PostScript has no
//! alpha channel, so translucent colors and images are composited over white.

use crate::canvas::{Canvas, Painter};
use crate::errors::Result;
use crate::grob::{ImageGrob, Style};
use crate::types::Color;
use kurbo::{Affine, BezPath, PathEl};
use std::fmt::Write as _;
use tracing::warn;

#[derive(Default)]
pub struct PostScriptPainter {
    out: String,
    current: (f64, f64),
}

impl PostScriptPainter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn emit_path(&mut self, path: &BezPath) {
        self.line("newpath");
        for el in path.elements() {
            let op = match *el {
                PathEl::MoveTo(p) => {
                    self.current = (p.x, p.y);
                    format!("{} {} moveto", num(p.x), num(p.y))
                }
                PathEl::LineTo(p) => {
                    self.current = (p.x, p.y);
                    format!("{} {} lineto", num(p.x), num(p.y))
                }
                PathEl::QuadTo(q, p) => {
                    let (x0, y0) = self.current;
                    let c1 = (x0 + 2.0 / 3.0 * (q.x - x0), y0 + 2.0 / 3.0 * (q.y - y0));
                    let c2 = (p.x + 2.0 / 3.0 * (q.x - p.x), p.y + 2.0 / 3.0 * (q.y - p.y));
                    self.current = (p.x, p.y);
                    format!(
                        "{} {} {} {} {} {} curveto",
                        num(c1.0),
                        num(c1.1),
                        num(c2.0),
                        num(c2.1),
                        num(p.x),
                        num(p.y)
                    )
                }
                PathEl::CurveTo(c1, c2, p) => {
                    self.current = (p.x, p.y);
                    format!(
                        "{} {} {} {} {} {} curveto",
                        num(c1.x),
                        num(c1.y),
                        num(c2.x),
                        num(c2.y),
                        num(p.x),
                        num(p.y)
                    )
                }
                PathEl::ClosePath => "closepath".to_string(),
            };
            self.line(&op);
        }
    }

    fn set_color(&mut self, color: &Color) {
        let (r, g, b) = color.over_white();
        self.line(&format!("{} {} {} setrgbcolor", num(r), num(g), num(b)));
    }
}

impl Painter for PostScriptPainter {
    fn save(&mut self) {
        self.line("gsave");
    }

    fn restore(&mut self) {
        self.line("grestore");
    }

    fn concat(&mut self, matrix: Affine) {
        if matrix == Affine::IDENTITY {
            return;
        }
        let [a, b, c, d, e, f] = matrix.as_coeffs();
        self.line(&format!(
            "[{} {} {} {} {} {}] concat",
            num(a),
            num(b),
            num(c),
            num(d),
            num(e),
            num(f)
        ));
    }

    fn clip(&mut self, path: &BezPath) {
        self.emit_path(path);
        self.line("clip newpath");
    }

    fn fill_and_stroke(&mut self, path: &BezPath, style: &Style) {
        self.emit_path(path);
        if let Some(fill) = &style.fill {
            self.line("gsave");
            self.set_color(fill);
            self.line("fill");
            self.line("grestore");
        }
        if let Some(stroke) = &style.stroke {
            self.set_color(stroke);
            self.line(&format!("{} setlinewidth", num(style.strokewidth)));
            self.line("stroke");
        }
        self.line("newpath");
    }

    fn draw_image(&mut self, image: &ImageGrob) {
        let decoded = match image::load_from_memory(&image.data) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                warn!(source = %image.source, error = %e, "Could not decode image for PostScript; skipped");
                return;
            }
        };
        let (pw, ph) = decoded.dimensions();
        if pw == 0 || ph == 0 {
            return;
        }

        self.line("gsave");
        self.line(&format!(
            "{} {} translate {} {} scale",
            num(image.x),
            num(image.y),
            num(image.width),
            num(image.height)
        ));
        self.line(&format!("/picstr {} string def", pw * 3));
        self.line(&format!(
            "{} {} 8 [{} 0 0 {} 0 0] {{currentfile picstr readhexstring pop}} false 3 colorimage",
            pw, ph, pw, ph
        ));

        let mut column = 0;
        for pixel in decoded.pixels() {
            let [r, g, b, a] = pixel.0;
            let alpha = a as f64 / 255.0 * image.alpha;
            let blend = |c: u8| (c as f64 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
            let _ = write!(self.out, "{:02x}{:02x}{:02x}", blend(r), blend(g), blend(b));
            column += 6;
            if column >= 72 {
                self.out.push('\n');
                column = 0;
            }
        }
        if column > 0 {
            self.out.push('\n');
        }
        self.line("grestore");
    }
}

/// Formats a coordinate compactly (no trailing zeros).
fn num(v: f64) -> String {
    let v = if v.abs() < 1e-9 { 0.0 } else { v };
    let s = format!("{:.4}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Writes a complete single-page document.
pub fn render_ps(canvas: &Canvas, canvas_size: (f64, f64), page: (f64, f64)) -> Result<Vec<u8>> {
    let (w, h) = (page.0.ceil() as i64, page.1.ceil() as i64);
    let mut painter = PostScriptPainter::new();
    painter.line("%!PS-Adobe-3.0 EPSF-3.0");
    painter.line(&format!("%%BoundingBox: 0 0 {} {}", w, h));
    painter.line("%%Creator: easel");
    painter.line("%%Pages: 1");
    painter.line("%%EndComments");
    painter.line("%%Page: 1 1");
    painter.line("gsave");
    painter.line(&format!("0 {} translate 1 -1 scale", num(page.1)));

    if page == canvas_size {
        canvas.draw(&mut painter);
    } else {
        canvas.draw_fitted(&mut painter, canvas_size, page);
    }

    painter.line("grestore");
    painter.line("showpage");
    painter.line("%%EOF");
    Ok(painter.into_string().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grob::{ClipGrob, Grob};
    use crate::path::BezierPath;
    use std::sync::Arc;

    fn render(canvas: &Canvas) -> String {
        String::from_utf8(render_ps(canvas, (100.0, 50.0), (100.0, 50.0)).unwrap()).unwrap()
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(-0.00001), "0");
        assert_eq!(num(1.23456), "1.2346");
    }

    #[test]
    fn document_has_header_and_flip() {
        let ps = render(&Canvas::new());
        assert!(ps.starts_with("%!PS-Adobe-3.0"));
        assert!(ps.contains("%%BoundingBox: 0 0 100 50"));
        assert!(ps.contains("0 50 translate 1 -1 scale"));
        assert!(ps.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn filled_and_stroked_rect() {
        let mut path = BezierPath::default();
        path.rect(10.0, 10.0, 20.0, 20.0, 0.0, Default::default());
        path.style = Style {
            fill: Some(Color::new(1.0, 0.0, 0.0, 1.0)),
            stroke: Some(Color::new(0.0, 0.0, 0.0, 0.5)),
            strokewidth: 2.0,
        };
        let mut canvas = Canvas::new();
        canvas.add(Grob::Path(path));

        let ps = render(&canvas);
        assert!(ps.contains("10 10 moveto"));
        assert!(ps.contains("30 10 lineto"));
        assert!(ps.contains("closepath"));
        assert!(ps.contains("1 0 0 setrgbcolor\nfill"));
        // Half-transparent black over white.
        assert!(ps.contains("0.5 0.5 0.5 setrgbcolor"));
        assert!(ps.contains("2 setlinewidth\nstroke"));
    }

    #[test]
    fn clip_is_balanced() {
        let mut clip_path = BezierPath::default();
        clip_path.rect(0.0, 0.0, 5.0, 5.0, 0.0, Default::default());
        let mut canvas = Canvas::new();
        canvas.add(Grob::Clip(ClipGrob { path: clip_path }));

        let ps = render(&canvas);
        assert!(ps.contains("clip newpath"));
        assert_eq!(ps.matches("gsave").count(), ps.matches("grestore").count());
    }

    #[test]
    fn images_become_colorimage() {
        let mut bytes = Vec::new();
        image::RgbaImage::from_pixel(2, 1, image::Rgba([255, 0, 0, 255]))
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
        let grob = ImageGrob {
            source: "red.png".into(),
            data: Arc::new(bytes),
            pixel_size: (2, 1),
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 10.0,
            alpha: 1.0,
            transform: Default::default(),
            transform_mode: Default::default(),
        };
        let mut canvas = Canvas::new();
        canvas.add(Grob::Image(grob));

        let ps = render(&canvas);
        assert!(ps.contains("false 3 colorimage"));
        assert!(ps.contains("ff0000ff0000"));
    }
}
