//! # Bezier Paths
//!
//! The path grob and the geometry builders used by the shape verbs.
//!
//! ## Responsibilities
//! - **BezierPath**: Geometry plus the style and transform captured when it was created.
//! - **Shapes**: Rectangles (with rounded corners), ellipses, arrows and stars.
//! - **Curve fitting**: `findpath` threads a smooth cubic spline through a list of points.

use crate::grob::Style;
use crate::transform::Transform;
use crate::types::{ArrowType, RectMode, TransformMode};
use kurbo::{BezPath, PathEl, Point, Rect, Shape};

/// Cubic approximation constant for a quarter circle.
const KAPPA: f64 = 0.552_284_749_8;

/// A vector path with its own paint state.
#[derive(Clone, Debug, Default)]
pub struct BezierPath {
    pub geometry: BezPath,
    pub style: Style,
    pub transform: Transform,
    pub transform_mode: TransformMode,
}

impl BezierPath {
    pub fn new(style: Style, transform: Transform, transform_mode: TransformMode) -> Self {
        Self {
            geometry: BezPath::new(),
            style,
            transform,
            transform_mode,
        }
    }

    pub fn moveto(&mut self, x: f64, y: f64) {
        self.geometry.move_to((x, y));
    }

    pub fn lineto(&mut self, x: f64, y: f64) {
        self.ensure_started();
        self.geometry.line_to((x, y));
    }

    pub fn curveto(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.ensure_started();
        self.geometry.curve_to((x1, y1), (x2, y2), (x3, y3));
    }

    pub fn closepath(&mut self) {
        if !self.is_closed() && !self.geometry.elements().is_empty() {
            self.geometry.close_path();
        }
    }

    pub fn relmoveto(&mut self, dx: f64, dy: f64) {
        let p = self.current_point().unwrap_or(Point::ORIGIN);
        self.moveto(p.x + dx, p.y + dy);
    }

    pub fn rellineto(&mut self, dx: f64, dy: f64) {
        let p = self.current_point().unwrap_or(Point::ORIGIN);
        self.lineto(p.x + dx, p.y + dy);
    }

    pub fn relcurveto(&mut self, h1x: f64, h1y: f64, h2x: f64, h2y: f64, x: f64, y: f64) {
        let p = self.current_point().unwrap_or(Point::ORIGIN);
        self.curveto(
            p.x + h1x,
            p.y + h1y,
            p.x + h2x,
            p.y + h2y,
            p.x + x,
            p.y + y,
        );
    }

    /// Whether the last element closes the current subpath.
    pub fn is_closed(&self) -> bool {
        matches!(self.geometry.elements().last(), Some(PathEl::ClosePath))
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.elements().is_empty()
    }

    /// Appends a rectangle, interpreting the coordinates according to `mode`.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, roundness: f64, mode: RectMode) {
        let (x, y, width, height) = match mode {
            RectMode::Corner => (x, y, width, height),
            RectMode::Corners => (x, y, width - x, height - y),
            RectMode::Center => (x - width / 2.0, y - height / 2.0, width, height),
        };
        append(&mut self.geometry, &rect_geometry(x, y, width, height, roundness));
    }

    /// Appends an ellipse inscribed in the given box.
    pub fn ellipse(&mut self, x: f64, y: f64, width: f64, height: f64) {
        append(&mut self.geometry, &ellipse_geometry(x, y, width, height));
    }

    /// The point the next relative operation starts from.
    pub fn current_point(&self) -> Option<Point> {
        current_point(&self.geometry)
    }

    /// Bounding box of the geometry. Empty paths report a zero rect at the origin.
    pub fn bounds(&self) -> Rect {
        if self.is_empty() {
            Rect::ZERO
        } else {
            self.geometry.bounding_box()
        }
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    fn ensure_started(&mut self) {
        if self.geometry.elements().is_empty() {
            self.geometry.move_to(Point::ORIGIN);
        }
    }
}

fn append(dst: &mut BezPath, src: &BezPath) {
    for el in src.elements() {
        dst.push(*el);
    }
}

/// Returns the end point of the last element, following `ClosePath` back to its subpath start.
pub fn current_point(path: &BezPath) -> Option<Point> {
    let mut subpath_start = None;
    let mut current = None;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                subpath_start = Some(p);
                current = Some(p);
            }
            PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
                current = Some(p)
            }
            PathEl::ClosePath => current = subpath_start,
        }
    }
    current
}

/// A rectangle. Non-zero `roundness` rounds the corners by `min(w * r, h * r)`.
pub fn rect_geometry(x: f64, y: f64, w: f64, h: f64, roundness: f64) -> BezPath {
    let mut p = BezPath::new();
    if roundness <= 0.0 {
        p.move_to((x, y));
        p.line_to((x + w, y));
        p.line_to((x + w, y + h));
        p.line_to((x, y + h));
        p.close_path();
        return p;
    }

    let curve = (w * roundness).min(h * roundness);
    p.move_to((x, y + curve));
    p.curve_to((x, y), (x, y), (x + curve, y));
    p.line_to((x + w - curve, y));
    p.curve_to((x + w, y), (x + w, y), (x + w, y + curve));
    p.line_to((x + w, y + h - curve));
    p.curve_to((x + w, y + h), (x + w, y + h), (x + w - curve, y + h));
    p.line_to((x + curve, y + h));
    p.curve_to((x, y + h), (x, y + h), (x, y + h - curve));
    p.close_path();
    p
}

/// An ellipse inscribed in the box at `(x, y)`, built from four cubic arcs.
pub fn ellipse_geometry(x: f64, y: f64, w: f64, h: f64) -> BezPath {
    let (rx, ry) = (w / 2.0, h / 2.0);
    let (cx, cy) = (x + rx, y + ry);
    let (ox, oy) = (rx * KAPPA, ry * KAPPA);

    let mut p = BezPath::new();
    p.move_to((cx + rx, cy));
    p.curve_to((cx + rx, cy + oy), (cx + ox, cy + ry), (cx, cy + ry));
    p.curve_to((cx - ox, cy + ry), (cx - rx, cy + oy), (cx - rx, cy));
    p.curve_to((cx - rx, cy - oy), (cx - ox, cy - ry), (cx, cy - ry));
    p.curve_to((cx + ox, cy - ry), (cx + rx, cy - oy), (cx + rx, cy));
    p.close_path();
    p
}

/// The classic Nodebox arrow with its tip at `(x, y)` pointing right.
pub fn arrow_geometry(x: f64, y: f64, width: f64, kind: ArrowType) -> BezPath {
    let points: Vec<(f64, f64)> = match kind {
        ArrowType::Normal => {
            let head = width * 0.4;
            let tail = width * 0.2;
            vec![
                (x, y),
                (x - head, y + head),
                (x - head, y + tail),
                (x - width, y + tail),
                (x - width, y - tail),
                (x - head, y - tail),
                (x - head, y - head),
                (x, y),
            ]
        }
        ArrowType::FortyFive => {
            let head = 0.3;
            let tail = 1.0 + head;
            vec![
                (x, y),
                (x, y + width * (1.0 - head)),
                (x - width * head, y + width),
                (x - width * head, y + width * tail * 0.4),
                (x - width * tail * 0.6, y + width),
                (x - width, y + width * tail * 0.6),
                (x - width * tail * 0.4, y + width * head),
                (x - width, y + width * head),
                (x - width * (1.0 - head), y),
                (x, y),
            ]
        }
    };
    polygon(&points)
}

/// A star with `points` tips alternating between the outer and inner radius.
pub fn star_geometry(x: f64, y: f64, points: u32, outer: f64, inner: f64) -> BezPath {
    let mut vertices = vec![(x, y + outer)];
    let points = points.max(1);
    for i in 1..(2 * points) {
        let angle = i as f64 * std::f64::consts::PI / points as f64;
        let radius = if i % 2 == 1 { inner } else { outer };
        vertices.push((x + radius * angle.sin(), y + radius * angle.cos()));
    }
    polygon(&vertices)
}

fn polygon(points: &[(f64, f64)]) -> BezPath {
    let mut p = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        p.move_to(*first);
        for pt in rest {
            p.line_to(*pt);
        }
        p.close_path();
    }
    p
}

/// Builds a smooth path through `points`.
///
/// `curvature` is clamped to `0..=1`; zero yields straight segments, one the
/// smoothest spline. Returns `None` for an empty point list.
pub fn findpath(points: &[Point], curvature: f64) -> Option<BezPath> {
    let n = points.len();
    let mut path = BezPath::new();
    match n {
        0 => return None,
        1 => {
            path.move_to(points[0]);
            return Some(path);
        }
        2 => {
            path.move_to(points[0]);
            path.line_to(points[1]);
            return Some(path);
        }
        _ => {}
    }

    let curvature = curvature.clamp(0.0, 1.0);
    if curvature == 0.0 {
        path.move_to(points[0]);
        for p in &points[1..] {
            path.line_to(*p);
        }
        return Some(path);
    }

    let c = 4.0 + (1.0 - curvature) * 40.0;

    // Forward sweep of the tridiagonal system; index 0 and n-1 are pinned to zero.
    let mut bi = vec![0.0; n];
    let mut ax = vec![0.0; n];
    let mut ay = vec![0.0; n];
    bi[1] = -0.25;
    ax[1] = (points[2].x - points[0].x) / 4.0;
    ay[1] = (points[2].y - points[0].y) / 4.0;
    for i in 2..n - 1 {
        bi[i] = -1.0 / (c + bi[i - 1]);
        ax[i] = -(points[i + 1].x - points[i - 1].x - ax[i - 1]) * bi[i];
        ay[i] = -(points[i + 1].y - points[i - 1].y - ay[i - 1]) * bi[i];
    }

    let mut dx = vec![0.0; n];
    let mut dy = vec![0.0; n];
    for i in (1..n - 1).rev() {
        dx[i] = ax[i] + dx[i + 1] * bi[i];
        dy[i] = ay[i] + dy[i + 1] * bi[i];
    }

    path.move_to(points[0]);
    for i in 0..n - 1 {
        path.curve_to(
            (points[i].x + dx[i], points[i].y + dy[i]),
            (points[i + 1].x - dx[i + 1], points[i + 1].y - dy[i + 1]),
            points[i + 1],
        );
    }
    Some(path)
}
