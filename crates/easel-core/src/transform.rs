//! # Transform
//!
//! Recorded affine operations that are resolved against a grob's center at paint time.
//!
//! Rotation, scaling and skewing pivot around the current device position of the
//! grob's center (`TransformMode::Center`) or of its origin (`TransformMode::Corner`).
//! Translation always happens in local space.

use crate::types::TransformMode;
use kurbo::{Affine, Point, Vec2};

/// One recorded transform operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformOp {
    Translate(f64, f64),
    /// Angle in radians.
    Rotate(f64),
    Scale(f64, f64),
    /// Skew angles in radians.
    Skew(f64, f64),
    Matrix(Affine),
}

/// An ordered list of transform operations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transform {
    ops: Vec<TransformOp>,
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.ops.push(TransformOp::Translate(x, y));
    }

    pub fn rotate(&mut self, radians: f64) {
        self.ops.push(TransformOp::Rotate(radians));
    }

    pub fn scale(&mut self, x: f64, y: f64) {
        self.ops.push(TransformOp::Scale(x, y));
    }

    pub fn skew(&mut self, x: f64, y: f64) {
        self.ops.push(TransformOp::Skew(x, y));
    }

    pub fn append_matrix(&mut self, matrix: Affine) {
        self.ops.push(TransformOp::Matrix(matrix));
    }

    /// Folds the operations into a single matrix.
    ///
    /// `center` is the grob's center in its own coordinates.
    pub fn matrix_with_center(&self, center: Point, mode: TransformMode) -> Affine {
        let pivot_source = match mode {
            TransformMode::Center => center,
            TransformMode::Corner => Point::ORIGIN,
        };

        self.ops.iter().fold(Affine::IDENTITY, |m, op| match *op {
            TransformOp::Translate(x, y) => m * Affine::translate((x, y)),
            TransformOp::Matrix(matrix) => m * matrix,
            TransformOp::Rotate(angle) => around(m * pivot_source, Affine::rotate(angle)) * m,
            TransformOp::Scale(x, y) => {
                around(m * pivot_source, Affine::scale_non_uniform(x, y)) * m
            }
            TransformOp::Skew(x, y) => {
                let skew = Affine::new([1.0, y.tan(), x.tan(), 1.0, 0.0, 0.0]);
                around(m * pivot_source, skew) * m
            }
        })
    }
}

/// Conjugates `linear` so that it keeps `pivot` fixed.
fn around(pivot: Point, linear: Affine) -> Affine {
    let offset = pivot.to_vec2();
    Affine::translate(offset) * linear * Affine::translate(-offset)
}

/// Helper used by the letterbox fit: scale + translate.
pub(crate) fn fit_matrix(scale: f64, offset: Vec2) -> Affine {
    Affine::translate(offset) * Affine::scale(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn assert_point(p: Point, x: f64, y: f64) {
        assert!(
            (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9,
            "expected ({}, {}), got {:?}",
            x,
            y,
            p
        );
    }

    #[test]
    fn identity_when_empty() {
        let t = Transform::new();
        assert!(t.is_identity());
        assert_eq!(
            t.matrix_with_center(Point::new(5.0, 5.0), TransformMode::Center),
            Affine::IDENTITY
        );
    }

    #[test]
    fn rotation_pivots_on_center() {
        let mut t = Transform::new();
        t.rotate(FRAC_PI_2);
        let center = Point::new(10.0, 10.0);
        let m = t.matrix_with_center(center, TransformMode::Center);

        // The center stays put, a corner swings around it.
        assert_point(m * center, 10.0, 10.0);
        assert_point(m * Point::new(20.0, 10.0), 10.0, 20.0);
    }

    #[test]
    fn rotation_pivots_on_origin_in_corner_mode() {
        let mut t = Transform::new();
        t.rotate(FRAC_PI_2);
        let m = t.matrix_with_center(Point::new(10.0, 10.0), TransformMode::Corner);
        assert_point(m * Point::new(10.0, 0.0), 0.0, 10.0);
    }

    #[test]
    fn translate_then_rotate_keeps_translated_center() {
        let mut t = Transform::new();
        t.translate(100.0, 0.0);
        t.rotate(FRAC_PI_2);
        let center = Point::new(10.0, 10.0);
        let m = t.matrix_with_center(center, TransformMode::Center);
        assert_point(m * center, 110.0, 10.0);
    }

    #[test]
    fn scale_pivots_on_center() {
        let mut t = Transform::new();
        t.scale(2.0, 2.0);
        let m = t.matrix_with_center(Point::new(5.0, 5.0), TransformMode::Center);
        assert_point(m * Point::new(0.0, 0.0), -5.0, -5.0);
        assert_point(m * Point::new(10.0, 10.0), 15.0, 15.0);
    }

    #[test]
    fn skew_shears_horizontally() {
        let mut t = Transform::new();
        t.skew(std::f64::consts::FRAC_PI_4, 0.0);
        let m = t.matrix_with_center(Point::ORIGIN, TransformMode::Corner);
        assert_point(m * Point::new(0.0, 10.0), 10.0, 10.0);
    }

    #[test]
    fn raw_matrix_composes_with_translate_and_rotate() {
        let mut t = Transform::new();
        t.translate(10.0, 0.0);
        t.append_matrix(Affine::new([1.0, 0.0, 0.0, 1.0, 5.0, 5.0]));
        let m = t.matrix_with_center(Point::ORIGIN, TransformMode::Corner);
        assert_point(m * Point::ORIGIN, 15.0, 5.0);

        // A rotation after the raw matrix pivots on where the matrix moved the origin.
        t.rotate(FRAC_PI_2);
        let m = t.matrix_with_center(Point::ORIGIN, TransformMode::Corner);
        assert_point(m * Point::ORIGIN, 15.0, 5.0);
        assert_point(m * Point::new(1.0, 0.0), 15.0, 6.0);
    }
}
