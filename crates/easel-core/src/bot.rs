//! # Bot
//!
//! The drawing-state context behind every script verb.
//!
//! ## Responsibilities
//! - **State**: Current colors, stroke width, modes, transform and text settings.
//! - **Grob Creation**: Shape verbs snapshot the state into new grobs.
//! - **Display List**: Drawn grobs are appended to the [`Canvas`].
//! - **Output**: `finish()` and `snapshot()` hand the canvas to the export backends.

use crate::canvas::Canvas;
use crate::errors::{EaselError, Result};
use crate::export::{self, OutputFormat};
use crate::grob::{ClipGrob, Grob, ImageGrob, Style, TextGrob};
use crate::path::{self, BezierPath};
use crate::sketch::SnapshotSource;
use crate::systems::assets::AssetManager;
use crate::transform::Transform;
use crate::types::{Align, ArrowType, Color, ColorArg, ColorMode, RectMode, TransformMode};
use crate::typography::FontFace;
use crate::variables::{VarType, VarValue, Variable, VariableRegistry};
use crate::{AssetLoader, DefaultAssetLoader};
use kurbo::Point;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// The bot as shared between native script functions.
pub type SharedBot = Arc<Mutex<Bot>>;

/// Per-call replacements for the current paint state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleOverrides {
    /// `Some(None)` disables filling for this grob.
    pub fill: Option<Option<Color>>,
    pub stroke: Option<Option<Color>>,
    pub strokewidth: Option<f64>,
}

/// What `text()` produced.
#[derive(Clone, Debug)]
pub enum TextOutput {
    Text(TextGrob),
    Path(BezierPath),
}

/// The explicit drawing context.
#[derive(Clone)]
pub struct Bot {
    pub canvas: Canvas,
    pub variables: VariableRegistry,
    pub assets: AssetManager,
    width: f64,
    height: f64,
    frame: u64,
    framerate: f64,
    fill: Option<Color>,
    stroke: Option<Color>,
    strokewidth: f64,
    color_mode: ColorMode,
    color_range: f64,
    rect_mode: RectMode,
    transform_mode: TransformMode,
    transform: Transform,
    transform_stack: Vec<Transform>,
    path: Option<BezierPath>,
    autoclosepath: bool,
    font_path: Option<String>,
    font_size: f64,
    lineheight: f64,
    align: Align,
    fit: Option<(u32, u32)>,
    snapshot_source: Option<SnapshotSource>,
}

impl Default for Bot {
    fn default() -> Self {
        Self::new(Arc::new(DefaultAssetLoader))
    }
}

impl Bot {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self::with_assets(AssetManager::new(loader))
    }

    pub fn with_assets(assets: AssetManager) -> Self {
        Self {
            canvas: Canvas::new(),
            variables: VariableRegistry::new(),
            assets,
            width: 200.0,
            height: 200.0,
            frame: 0,
            framerate: 30.0,
            fill: Some(Color::gray(0.2, 1.0)),
            stroke: None,
            strokewidth: 1.0,
            color_mode: ColorMode::Rgb,
            color_range: 1.0,
            rect_mode: RectMode::Corner,
            transform_mode: TransformMode::Center,
            transform: Transform::new(),
            transform_stack: Vec::new(),
            path: None,
            autoclosepath: true,
            font_path: None,
            font_size: 16.0,
            lineheight: 1.0,
            align: Align::Left,
            fit: None,
            snapshot_source: None,
        }
    }

    pub fn into_shared(self) -> SharedBot {
        Arc::new(Mutex::new(self))
    }

    // --- Canvas ---

    /// Sets the canvas size. A zero or missing dimension keeps the current one.
    pub fn size(&mut self, width: Option<f64>, height: Option<f64>) {
        if let Some(w) = width.filter(|w| *w > 0.0) {
            self.width = w.trunc();
        }
        if let Some(h) = height.filter(|h| *h > 0.0) {
            self.height = h.trunc();
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn speed(&mut self, fps: Option<f64>) -> f64 {
        if let Some(fps) = fps.filter(|f| *f > 0.0) {
            self.framerate = fps;
        }
        self.framerate
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn set_frame(&mut self, frame: u64) {
        self.frame = frame;
    }

    /// Letterboxes the output into `width` x `height` pixels.
    pub fn set_fit(&mut self, fit: Option<(u32, u32)>) {
        self.fit = fit;
    }

    pub(crate) fn set_snapshot_source(&mut self, source: Option<SnapshotSource>) {
        self.snapshot_source = source;
    }

    // --- Paint state ---

    pub fn current_style(&self) -> Style {
        Style {
            fill: self.fill,
            stroke: self.stroke,
            strokewidth: self.strokewidth,
        }
    }

    fn style_with(&self, overrides: &StyleOverrides) -> Style {
        let mut style = self.current_style();
        if let Some(fill) = overrides.fill {
            style.fill = fill;
        }
        if let Some(stroke) = overrides.stroke {
            style.stroke = stroke;
        }
        if let Some(w) = overrides.strokewidth {
            style.strokewidth = w;
        }
        style
    }

    fn new_path(&self, overrides: &StyleOverrides) -> BezierPath {
        BezierPath::new(
            self.style_with(overrides),
            self.transform.clone(),
            self.transform_mode,
        )
    }

    fn emit(&mut self, path: BezierPath, draw: bool) -> BezierPath {
        if draw {
            self.canvas.add(Grob::Path(path.clone()));
        }
        path
    }

    // --- Shapes ---

    #[allow(clippy::too_many_arguments)]
    pub fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        roundness: f64,
        draw: bool,
        overrides: &StyleOverrides,
    ) -> BezierPath {
        let mut p = self.new_path(overrides);
        p.rect(x, y, width, height, roundness, self.rect_mode);
        self.emit(p, draw)
    }

    pub fn rectmode(&mut self, mode: Option<RectMode>) -> RectMode {
        if let Some(mode) = mode {
            self.rect_mode = mode;
        }
        self.rect_mode
    }

    /// Draws an ellipse inscribed in the box at `(x, y)`. `oval` is the same verb.
    pub fn ellipse(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        draw: bool,
        overrides: &StyleOverrides,
    ) -> BezierPath {
        let mut p = self.new_path(overrides);
        p.ellipse(x, y, width, height);
        self.emit(p, draw)
    }

    pub fn circle(
        &mut self,
        x: f64,
        y: f64,
        diameter: f64,
        draw: bool,
        overrides: &StyleOverrides,
    ) -> BezierPath {
        self.ellipse(x, y, diameter, diameter, draw, overrides)
    }

    /// An open two-point path.
    pub fn line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        draw: bool,
        overrides: &StyleOverrides,
    ) -> BezierPath {
        let mut p = self.new_path(overrides);
        p.moveto(x1, y1);
        p.lineto(x2, y2);
        self.emit(p, draw)
    }

    pub fn arrow(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        kind: ArrowType,
        draw: bool,
        overrides: &StyleOverrides,
    ) -> BezierPath {
        let mut p = self.new_path(overrides);
        p.geometry = path::arrow_geometry(x, y, width, kind);
        self.emit(p, draw)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn star(
        &mut self,
        x: f64,
        y: f64,
        points: u32,
        outer: f64,
        inner: f64,
        draw: bool,
        overrides: &StyleOverrides,
    ) -> BezierPath {
        let mut p = self.new_path(overrides);
        p.geometry = path::star_geometry(x, y, points, outer, inner);
        self.emit(p, draw)
    }

    // --- Paths ---

    pub fn beginpath(&mut self, start: Option<(f64, f64)>) {
        let mut p = self.new_path(&StyleOverrides::default());
        if let Some((x, y)) = start {
            p.moveto(x, y);
        }
        self.path = Some(p);
    }

    fn current_path(&mut self) -> Result<&mut BezierPath> {
        self.path.as_mut().ok_or(EaselError::NoCurrentPath)
    }

    pub fn moveto(&mut self, x: f64, y: f64) -> Result<()> {
        self.current_path()?.moveto(x, y);
        Ok(())
    }

    pub fn lineto(&mut self, x: f64, y: f64) -> Result<()> {
        self.current_path()?.lineto(x, y);
        Ok(())
    }

    pub fn curveto(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> Result<()> {
        self.current_path()?.curveto(x1, y1, x2, y2, x3, y3);
        Ok(())
    }

    pub fn closepath(&mut self) -> Result<()> {
        self.current_path()?.closepath();
        Ok(())
    }

    pub fn relmoveto(&mut self, dx: f64, dy: f64) -> Result<()> {
        self.current_path()?.relmoveto(dx, dy);
        Ok(())
    }

    pub fn rellineto(&mut self, dx: f64, dy: f64) -> Result<()> {
        self.current_path()?.rellineto(dx, dy);
        Ok(())
    }

    pub fn relcurveto(
        &mut self,
        h1x: f64,
        h1y: f64,
        h2x: f64,
        h2y: f64,
        x: f64,
        y: f64,
    ) -> Result<()> {
        self.current_path()?.relcurveto(h1x, h1y, h2x, h2y, x, y);
        Ok(())
    }

    /// Finishes the current path, optionally adding it to the canvas.
    pub fn endpath(&mut self, draw: bool) -> Result<BezierPath> {
        let mut p = self.path.take().ok_or(EaselError::NoCurrentPath)?;
        if self.autoclosepath {
            p.closepath();
        }
        Ok(self.emit(p, draw))
    }

    /// Draws `path` with the current paint state and transform.
    pub fn drawpath(&mut self, path: &BezierPath) {
        let mut p = self.new_path(&StyleOverrides::default());
        p.geometry = path.geometry.clone();
        self.canvas.add(Grob::Path(p));
    }

    pub fn autoclosepath(&mut self, close: bool) {
        self.autoclosepath = close;
    }

    /// A smooth path through `points`, styled with the current state but not drawn.
    pub fn findpath(&self, points: &[Point], curvature: f64) -> Option<BezierPath> {
        let geometry = path::findpath(points, curvature)?;
        let mut p = self.new_path(&StyleOverrides::default());
        p.geometry = geometry;
        Some(p)
    }

    // --- Clipping ---

    pub fn beginclip(&mut self, path: &BezierPath) {
        self.canvas.add(Grob::Clip(ClipGrob { path: path.clone() }));
    }

    pub fn endclip(&mut self) {
        self.canvas.add(Grob::Restore);
    }

    // --- Transform ---

    pub fn transform(&mut self, mode: Option<TransformMode>) -> TransformMode {
        if let Some(mode) = mode {
            self.transform_mode = mode;
        }
        self.transform_mode
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.transform.translate(x, y);
    }

    /// Positive angles turn counter-clockwise on screen.
    pub fn rotate(&mut self, degrees: f64) {
        self.rotate_radians(degrees.to_radians());
    }

    pub fn rotate_radians(&mut self, radians: f64) {
        self.transform.rotate(-radians);
    }

    /// Scales by `x` and `y` (defaulting to `x`). Zero factors become 1.
    pub fn scale(&mut self, x: f64, y: Option<f64>) {
        let y = y.filter(|y| *y != 0.0).unwrap_or(x);
        let x = if x == 0.0 { 1.0 } else { x };
        let y = if y == 0.0 { 1.0 } else { y };
        self.transform.scale(x, y);
    }

    /// Skew angles in degrees.
    pub fn skew(&mut self, x: f64, y: f64) {
        self.transform.skew(x.to_radians(), y.to_radians());
    }

    /// Appends a raw matrix `(xx, yx, xy, yy, x0, y0)`, composed in local space.
    pub fn apply_matrix(&mut self, coeffs: [f64; 6]) {
        self.transform.append_matrix(kurbo::Affine::new(coeffs));
    }

    pub fn push(&mut self) {
        self.transform_stack.push(self.transform.clone());
    }

    pub fn pop(&mut self) -> Result<()> {
        self.transform = self
            .transform_stack
            .pop()
            .ok_or(EaselError::TransformStackEmpty)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.transform = Transform::new();
    }

    pub fn current_transform(&self) -> &Transform {
        &self.transform
    }

    // --- Color ---

    pub fn colormode(&mut self, mode: Option<ColorMode>, range: Option<f64>) -> ColorMode {
        if let Some(mode) = mode {
            self.color_mode = mode;
        }
        if let Some(range) = range {
            self.color_range = range;
        }
        self.color_mode
    }

    pub fn colorrange(&mut self, range: f64) {
        self.color_range = range;
    }

    pub fn color(&self, args: &[ColorArg]) -> Result<Color> {
        Color::from_args(args, self.color_mode, self.color_range)
    }

    /// Sets the fill. With no arguments returns the current fill unchanged.
    pub fn fill(&mut self, args: &[ColorArg]) -> Result<Option<Color>> {
        if !args.is_empty() {
            self.fill = Some(self.color(args)?);
        }
        Ok(self.fill)
    }

    pub fn nofill(&mut self) {
        self.fill = None;
    }

    pub fn stroke(&mut self, args: &[ColorArg]) -> Result<Option<Color>> {
        if !args.is_empty() {
            self.stroke = Some(self.color(args)?);
        }
        Ok(self.stroke)
    }

    pub fn nostroke(&mut self) {
        self.stroke = None;
    }

    pub fn strokewidth(&mut self, width: Option<f64>) -> f64 {
        if let Some(w) = width {
            self.strokewidth = w.max(0.0);
        }
        self.strokewidth
    }

    /// Covers the canvas with a rect in the given color, untransformed and unstroked.
    pub fn background(&mut self, args: &[ColorArg]) -> Result<()> {
        let color = self.color(args)?;
        let mut p = BezierPath::new(
            Style {
                fill: Some(color),
                stroke: None,
                strokewidth: self.strokewidth,
            },
            Transform::new(),
            self.transform_mode,
        );
        p.rect(0.0, 0.0, self.width, self.height, 0.0, RectMode::Corner);
        self.canvas.add(Grob::Path(p));
        Ok(())
    }

    // --- Text ---

    /// Selects a font file (and optionally its size). Returns the current font path.
    pub fn font(&mut self, path: Option<&str>, size: Option<f64>) -> Result<Option<String>> {
        if let Some(path) = path {
            self.assets.font(path)?;
            self.font_path = Some(path.to_string());
        }
        if let Some(size) = size {
            self.font_size = size;
        }
        Ok(self.font_path.clone())
    }

    pub fn fontsize(&mut self, size: Option<f64>) -> f64 {
        if let Some(size) = size {
            self.font_size = size;
        }
        self.font_size
    }

    pub fn lineheight(&mut self, height: Option<f64>) -> f64 {
        if let Some(h) = height {
            self.lineheight = h;
        }
        self.lineheight
    }

    pub fn align(&mut self, align: Option<Align>) -> Align {
        if let Some(align) = align {
            self.align = align;
        }
        self.align
    }

    fn face(&mut self) -> Result<Arc<FontFace>> {
        match self.font_path.clone() {
            Some(path) => self.assets.font(&path),
            None => self.assets.default_font(),
        }
    }

    fn text_grob(
        &mut self,
        txt: &str,
        x: f64,
        y: f64,
        width: Option<f64>,
        overrides: &StyleOverrides,
    ) -> Result<TextGrob> {
        let face = self.face()?;
        let layout = face.layout(
            txt,
            self.font_size,
            width,
            self.align,
            self.lineheight,
            Point::new(x, y),
        )?;
        Ok(TextGrob {
            text: txt.to_string(),
            x,
            y,
            width,
            outline: layout.outline,
            metrics: (layout.width, layout.height),
            baseline: layout.baseline,
            style: self.style_with(overrides),
            transform: self.transform.clone(),
            transform_mode: self.transform_mode,
        })
    }

    /// Draws text with its first baseline at `(x, y)`.
    ///
    /// With `outline` the text is converted to a path first.
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        txt: &str,
        x: f64,
        y: f64,
        width: Option<f64>,
        outline: bool,
        draw: bool,
        overrides: &StyleOverrides,
    ) -> Result<TextOutput> {
        let grob = self.text_grob(txt, x, y, width, overrides)?;
        if outline {
            return Ok(TextOutput::Path(self.emit(grob.to_path(), draw)));
        }
        if draw {
            self.canvas.add(Grob::Text(grob.clone()));
        }
        Ok(TextOutput::Text(grob))
    }

    /// The outline of `txt` as a path. Only drawn when `draw` is set.
    pub fn textpath(
        &mut self,
        txt: &str,
        x: f64,
        y: f64,
        width: Option<f64>,
        draw: bool,
        overrides: &StyleOverrides,
    ) -> Result<BezierPath> {
        let grob = self.text_grob(txt, x, y, width, overrides)?;
        Ok(self.emit(grob.to_path(), draw))
    }

    pub fn textmetrics(&mut self, txt: &str, width: Option<f64>) -> Result<(f64, f64)> {
        let face = self.face()?;
        let layout = face.layout(
            txt,
            self.font_size,
            width,
            self.align,
            self.lineheight,
            Point::ORIGIN,
        )?;
        Ok((layout.width, layout.height))
    }

    pub fn textwidth(&mut self, txt: &str, width: Option<f64>) -> Result<f64> {
        Ok(self.textmetrics(txt, width)?.0)
    }

    pub fn textheight(&mut self, txt: &str, width: Option<f64>) -> Result<f64> {
        Ok(self.textmetrics(txt, width)?.1)
    }

    // --- Images ---

    /// Places the image at `(x, y)`.
    ///
    /// A missing width or height is derived from the other one, keeping the
    /// aspect ratio. A file that cannot be loaded is skipped with a warning.
    #[allow(clippy::too_many_arguments)]
    pub fn image(
        &mut self,
        path: &str,
        x: f64,
        y: f64,
        width: Option<f64>,
        height: Option<f64>,
        alpha: f64,
        draw: bool,
    ) -> Result<Option<ImageGrob>> {
        let loaded = match self.assets.image(path) {
            Ok(loaded) => loaded,
            Err(EaselError::AssetNotFound(msg)) => {
                warn!(path = %path, "Image not found, skipping: {}", msg);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let (pw, ph) = (loaded.size.0 as f64, loaded.size.1 as f64);
        let (width, height) = match (width, height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) if pw > 0.0 => (w, ph * w / pw),
            (None, Some(h)) if ph > 0.0 => (pw * h / ph, h),
            _ => (pw, ph),
        };

        let grob = ImageGrob {
            source: path.to_string(),
            data: loaded.data,
            pixel_size: loaded.size,
            x,
            y,
            width,
            height,
            alpha: alpha.clamp(0.0, 1.0),
            transform: self.transform.clone(),
            transform_mode: self.transform_mode,
        };
        if draw {
            self.canvas.add(Grob::Image(grob.clone()));
        }
        Ok(Some(grob))
    }

    pub fn imagesize(&mut self, path: &str) -> Result<(u32, u32)> {
        Ok(self.assets.image(path)?.size)
    }

    pub fn drawimage(&mut self, image: &ImageGrob) {
        self.canvas.add(Grob::Image(image.clone()));
    }

    // --- Variables ---

    /// Declares a script variable and returns its effective value.
    pub fn var(
        &mut self,
        name: &str,
        kind: VarType,
        default: Option<VarValue>,
        min: f64,
        max: f64,
    ) -> Result<Option<VarValue>> {
        let var = Variable::new(name, kind, default, min, max)?;
        Ok(self.variables.declare(var))
    }

    pub fn setvars(&mut self, entries: &[(String, f64)]) -> Result<()> {
        self.variables.setvars(entries)
    }

    pub fn getvar(&self, name: &str) -> Option<VarValue> {
        self.variables.value(name)
    }

    // --- Output ---

    /// Renders the display list to `target`. The format follows the extension.
    pub fn finish(&self, target: impl AsRef<Path>) -> Result<()> {
        let target = target.as_ref();
        export::render_to_file(&self.canvas, (self.width, self.height), self.fit, target)?;
        info!(path = %target.display(), grobs = self.canvas.len(), "Output written");
        Ok(())
    }

    /// Writes the current state while a script is running.
    ///
    /// Bitmaps capture the display list as it is. Vector formats re-run the
    /// script in a fresh context with the current variable values.
    pub fn snapshot(&self, target: impl AsRef<Path>) -> Result<()> {
        let target = target.as_ref();
        let format = OutputFormat::from_path(target)?;
        if format == OutputFormat::Png {
            return self.finish(target);
        }
        match &self.snapshot_source {
            Some(source) => source.render(self.variables.snapshot_values(), target),
            None => {
                debug!(path = %target.display(), "Snapshots are disabled in this run");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(r: f64, g: f64, b: f64) -> Vec<ColorArg> {
        vec![ColorArg::Number(r), ColorArg::Number(g), ColorArg::Number(b)]
    }

    #[test]
    fn defaults() {
        let bot = Bot::default();
        assert_eq!((bot.width(), bot.height()), (200.0, 200.0));
        let style = bot.current_style();
        assert_eq!(style.fill, Some(Color::gray(0.2, 1.0)));
        assert_eq!(style.stroke, None);
        assert_eq!(style.strokewidth, 1.0);
    }

    #[test]
    fn size_keeps_missing_dimensions() {
        let mut bot = Bot::default();
        bot.size(Some(300.0), None);
        assert_eq!((bot.width(), bot.height()), (300.0, 200.0));
        bot.size(Some(0.0), Some(50.0));
        assert_eq!((bot.width(), bot.height()), (300.0, 50.0));
    }

    #[test]
    fn grobs_snapshot_state_at_creation() {
        let mut bot = Bot::default();
        bot.fill(&rgb(1.0, 0.0, 0.0)).unwrap();
        bot.rect(0.0, 0.0, 10.0, 10.0, 0.0, true, &StyleOverrides::default());
        bot.fill(&rgb(0.0, 0.0, 1.0)).unwrap();

        match &bot.canvas.grobs()[0] {
            Grob::Path(p) => assert_eq!(p.style.fill, Some(Color::new(1.0, 0.0, 0.0, 1.0))),
            other => panic!("expected a path, got {}", other.kind()),
        }
    }

    #[test]
    fn overrides_replace_snapshot() {
        let mut bot = Bot::default();
        let overrides = StyleOverrides {
            fill: Some(None),
            stroke: Some(Some(Color::BLACK)),
            strokewidth: Some(4.0),
        };
        let p = bot.ellipse(0.0, 0.0, 10.0, 10.0, false, &overrides);
        assert_eq!(p.style.fill, None);
        assert_eq!(p.style.stroke, Some(Color::BLACK));
        assert_eq!(p.style.strokewidth, 4.0);
        assert!(bot.canvas.is_empty());
    }

    #[test]
    fn path_verbs_require_beginpath() {
        let mut bot = Bot::default();
        assert!(matches!(bot.moveto(0.0, 0.0), Err(EaselError::NoCurrentPath)));
        assert!(matches!(bot.endpath(true), Err(EaselError::NoCurrentPath)));

        bot.beginpath(Some((0.0, 0.0)));
        bot.lineto(10.0, 0.0).unwrap();
        bot.lineto(10.0, 10.0).unwrap();
        let p = bot.endpath(true).unwrap();
        assert!(p.is_closed());
        assert_eq!(bot.canvas.len(), 1);
        assert!(matches!(bot.lineto(1.0, 1.0), Err(EaselError::NoCurrentPath)));
    }

    #[test]
    fn autoclosepath_off_leaves_path_open() {
        let mut bot = Bot::default();
        bot.autoclosepath(false);
        bot.beginpath(Some((0.0, 0.0)));
        bot.lineto(10.0, 0.0).unwrap();
        assert!(!bot.endpath(false).unwrap().is_closed());
    }

    #[test]
    fn push_pop_restores_transform() {
        let mut bot = Bot::default();
        bot.translate(10.0, 0.0);
        bot.push();
        bot.rotate(45.0);
        assert_eq!(bot.current_transform().ops().len(), 2);
        bot.pop().unwrap();
        assert_eq!(bot.current_transform().ops().len(), 1);
        assert!(matches!(bot.pop(), Err(EaselError::TransformStackEmpty)));
        bot.reset();
        assert!(bot.current_transform().is_identity());
    }

    #[test]
    fn scale_replaces_zero_factors() {
        let mut bot = Bot::default();
        bot.scale(0.0, None);
        bot.scale(2.0, Some(0.0));
        use crate::transform::TransformOp;
        assert_eq!(
            bot.current_transform().ops(),
            &[TransformOp::Scale(1.0, 1.0), TransformOp::Scale(2.0, 2.0)]
        );
    }

    #[test]
    fn background_ignores_transform_and_stroke() {
        let mut bot = Bot::default();
        bot.size(Some(100.0), Some(50.0));
        bot.rotate(30.0);
        bot.stroke(&rgb(1.0, 0.0, 0.0)).unwrap();
        bot.background(&[ColorArg::Number(1.0)]).unwrap();

        match &bot.canvas.grobs()[0] {
            Grob::Path(p) => {
                assert!(p.transform.is_identity());
                assert_eq!(p.style.stroke, None);
                assert_eq!(p.bounds(), kurbo::Rect::new(0.0, 0.0, 100.0, 50.0));
            }
            other => panic!("expected a path, got {}", other.kind()),
        }
    }

    #[test]
    fn fill_without_args_reports_current() {
        let mut bot = Bot::default();
        bot.nofill();
        assert_eq!(bot.fill(&[]).unwrap(), None);
        bot.colormode(Some(ColorMode::Rgb), Some(255.0));
        let fill = bot.fill(&rgb(255.0, 0.0, 0.0)).unwrap();
        assert_eq!(fill, Some(Color::new(1.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn missing_image_is_skipped() {
        let mut bot = Bot::default();
        let result = bot
            .image("does/not/exist.png", 0.0, 0.0, None, None, 1.0, true)
            .unwrap();
        assert!(result.is_none());
        assert!(bot.canvas.is_empty());
    }

    #[test]
    fn var_returns_effective_value() {
        let mut bot = Bot::default();
        bot.variables.set("n", VarValue::Number(3.0));
        let value = bot
            .var("n", VarType::Number, Some(VarValue::Number(1.0)), 0.0, 10.0)
            .unwrap();
        assert_eq!(value, Some(VarValue::Number(3.0)));
        assert_eq!(bot.getvar("n"), Some(VarValue::Number(3.0)));
    }
}
