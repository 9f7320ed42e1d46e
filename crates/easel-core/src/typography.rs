//! # Typography
//!
//! Font loading and paragraph layout on Skia's text shaper (SkParagraph).
//! Shaped glyph runs are turned into outlines here so every backend paints
//! text the same way a path is painted.

use crate::errors::{EaselError, Result};
use crate::types::Align;
use kurbo::{BezPath, Point};
use skia_safe::path::{Iter as SkPathIter, Verb};
use skia_safe::textlayout::{
    FontCollection, Paragraph, ParagraphBuilder, ParagraphStyle, StrutStyle, TextAlign,
    TextDirection, TextStyle, TypefaceFontProvider,
};
use skia_safe::{Font, FontMetrics, FontMgr, Typeface};
use std::sync::Arc;
use tracing::debug;

/// Family name a loaded face is registered under in its font collection.
const FACE_ALIAS: &str = "easel-face";

/// A parsed TrueType/OpenType face.
#[derive(Clone)]
pub struct FontFace {
    typeface: Typeface,
    bytes: usize,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.typeface.family_name())
            .field("bytes", &self.bytes)
            .finish()
    }
}

/// One laid-out line.
#[derive(Clone, Debug, PartialEq)]
pub struct LineLayout {
    pub text: String,
    /// Horizontal offset of the line start from the block origin.
    pub offset: f64,
    /// Baseline position relative to the first baseline.
    pub baseline: f64,
    pub width: f64,
}

/// The result of [`FontFace::layout`].
#[derive(Clone, Debug)]
pub struct TextLayout {
    pub lines: Vec<LineLayout>,
    pub width: f64,
    pub height: f64,
    /// Distance from the top of the block to the first baseline.
    pub baseline: f64,
    /// Glyph outlines with the first baseline at the requested origin.
    pub outline: BezPath,
}

impl FontFace {
    pub fn from_bytes(data: Arc<Vec<u8>>) -> Result<Self> {
        let typeface = FontMgr::new()
            .new_from_data(&data, 0)
            .ok_or_else(|| EaselError::Font("unrecognized font data".into()))?;
        Ok(Self {
            typeface,
            bytes: data.len(),
        })
    }

    pub fn family_name(&self) -> String {
        self.typeface.family_name()
    }

    fn metrics(&self, size: f64) -> FontMetrics {
        Font::new(self.typeface.clone(), size as f32).metrics().1
    }

    pub fn ascent(&self, size: f64) -> f64 {
        -self.metrics(size).ascent as f64
    }

    /// Distance below the baseline, as a positive number.
    pub fn descent(&self, size: f64) -> f64 {
        self.metrics(size).descent as f64
    }

    pub fn line_gap(&self, size: f64) -> f64 {
        self.metrics(size).leading as f64
    }

    pub fn line_pitch(&self, size: f64, lineheight: f64) -> f64 {
        (self.ascent(size) + self.descent(size) + self.line_gap(size)) * lineheight
    }

    /// The face under [`FACE_ALIAS`], with system fonts as fallback for missing glyphs.
    fn font_collection(&self) -> FontCollection {
        let mut provider = TypefaceFontProvider::new();
        provider.register_typeface(self.typeface.clone(), Some(FACE_ALIAS));

        let mut collection = FontCollection::new();
        collection.set_asset_font_manager(Some(provider.into()));
        collection.set_default_font_manager(FontMgr::default(), None);
        collection
    }

    fn paragraph(
        &self,
        text: &str,
        size: f64,
        width: Option<f64>,
        align: Align,
        lineheight: f64,
    ) -> Paragraph {
        let mut text_style = TextStyle::new();
        text_style.set_font_families(&[FACE_ALIAS]);
        text_style.set_font_size(size as f32);

        // Every line is exactly one pitch tall.
        let pitch = self.line_pitch(size, lineheight);
        let mut strut_style = StrutStyle::new();
        strut_style.set_font_families(&[FACE_ALIAS]);
        strut_style.set_font_size(size as f32);
        strut_style.set_height(if size > 0.0 { (pitch / size) as f32 } else { 1.0 });
        strut_style.set_height_override(true);
        strut_style.set_strut_enabled(true);
        strut_style.set_force_strut_height(true);

        let mut paragraph_style = ParagraphStyle::new();
        paragraph_style.set_text_align(text_align(align));
        paragraph_style.set_text_direction(TextDirection::LTR);
        paragraph_style.set_text_style(&text_style);
        paragraph_style.set_strut_style(strut_style);
        paragraph_style.set_replace_tab_characters(true);

        let mut builder = ParagraphBuilder::new(&paragraph_style, self.font_collection());
        builder.push_style(&text_style);
        builder.add_text(text);
        builder.pop();
        let mut paragraph = builder.build();

        match width {
            Some(w) => paragraph.layout(w as f32),
            None => {
                paragraph.layout(f32::INFINITY);
                // Align within the widest line.
                if align != Align::Left {
                    let natural = paragraph.max_intrinsic_width().ceil();
                    paragraph.layout(natural);
                }
            }
        }
        paragraph
    }

    /// Lays out `text` with its first baseline at `origin`.
    ///
    /// Lines break at `\n` and, with a `width`, wherever the shaper wraps words.
    pub fn layout(
        &self,
        text: &str,
        size: f64,
        width: Option<f64>,
        align: Align,
        lineheight: f64,
        origin: Point,
    ) -> Result<TextLayout> {
        let mut paragraph = self.paragraph(text, size, width, align, lineheight);
        let first_baseline = paragraph.alphabetic_baseline() as f64;

        let lines: Vec<LineLayout> = paragraph
            .get_line_metrics()
            .iter()
            .map(|m| LineLayout {
                text: text
                    .get(m.start_index..m.end_excluding_whitespaces)
                    .unwrap_or_default()
                    .to_string(),
                offset: m.left,
                baseline: m.baseline - first_baseline,
                width: m.width,
            })
            .collect();

        let outline = glyph_outlines(&mut paragraph, (origin.x, origin.y - first_baseline));

        Ok(TextLayout {
            lines,
            width: paragraph.longest_line() as f64,
            height: paragraph.height() as f64,
            baseline: first_baseline,
            outline,
        })
    }
}

fn text_align(align: Align) -> TextAlign {
    match align {
        Align::Left => TextAlign::Left,
        Align::Center => TextAlign::Center,
        Align::Right => TextAlign::Right,
        Align::Justify => TextAlign::Justify,
    }
}

/// Collects the outlines of every shaped glyph, offset by `shift`.
fn glyph_outlines(paragraph: &mut Paragraph, shift: (f64, f64)) -> BezPath {
    let mut outline = BezPath::new();
    paragraph.visit(|_, info| {
        let Some(info) = info else {
            return;
        };
        let origin = info.origin();
        let font = info.font();
        for (glyph, pos) in info.glyphs().iter().zip(info.positions()) {
            let at = (
                shift.0 + (origin.x + pos.x) as f64,
                shift.1 + (origin.y + pos.y) as f64,
            );
            match font.get_path(*glyph) {
                Some(path) => append_skia_path(&mut outline, &path, at),
                None => debug!(glyph = *glyph, "Glyph has no outline"),
            }
        }
    });
    outline
}

/// Appends a Skia path translated by `offset`. Quadratics are elevated to cubics
/// so backends only see cubic segments.
fn append_skia_path(dst: &mut BezPath, src: &skia_safe::Path, offset: (f64, f64)) {
    let at = |p: &skia_safe::Point| Point::new(p.x as f64 + offset.0, p.y as f64 + offset.1);
    for (verb, points) in SkPathIter::new(src, false) {
        match (verb, points.as_slice()) {
            (Verb::Move, [p]) => dst.move_to(at(p)),
            (Verb::Line, [_, p]) => dst.line_to(at(p)),
            // Conics do not occur in glyph outlines; a quad is close enough.
            (Verb::Quad | Verb::Conic, [p0, q, p]) => {
                let (p0, q, p) = (at(p0), at(q), at(p));
                dst.curve_to(p0 + (q - p0) * (2.0 / 3.0), p + (q - p) * (2.0 / 3.0), p);
            }
            (Verb::Cubic, [_, c1, c2, p]) => dst.curve_to(at(c1), at(c2), at(p)),
            (Verb::Close, _) => dst.close_path(),
            _ => {}
        }
    }
}
