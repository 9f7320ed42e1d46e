//! # Types Module
//!
//! Shared data types used across the engine.
//!
//! ## Responsibilities
//! - **Color**: RGBA color in float format, built from script arguments in RGB or HSB mode.
//! - **Modes**: `ColorMode`, `RectMode`, `TransformMode`, `Align`, `ArrowType`.
//! - **Units**: Print units (`inch`, `cm`, `mm`) expressed in points.

use crate::errors::{EaselError, Result};
use serde::{Deserialize, Serialize};
use skia_safe::Color4f;
use std::fmt;
use std::str::FromStr;

/// Points per inch.
pub const INCH: f64 = 72.0;
/// Points per centimeter.
pub const CM: f64 = 28.3465;
/// Points per millimeter.
pub const MM: f64 = 2.8346;

/// Represents a RGBA color in float format (0.0 - 1.0).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// A single argument accepted by `color()`, `fill()`, `stroke()` and `background()`.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorArg {
    Number(f64),
    Hex(String),
    Color(Color),
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn gray(level: f64, alpha: f64) -> Self {
        Self::new(level, level, level, alpha)
    }

    /// Converts hue/saturation/brightness (all 0..1) to RGB.
    pub fn from_hsb(h: f64, s: f64, v: f64, a: f64) -> Self {
        let (h, s, v) = (h.clamp(0.0, 1.0), s.clamp(0.0, 1.0), v.clamp(0.0, 1.0));
        if s == 0.0 {
            return Self::new(v, v, v, a);
        }
        let sector = (h * 6.0).floor();
        let f = h * 6.0 - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match (sector as i64).rem_euclid(6) {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self::new(r, g, b, a)
    }

    /// Parses `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || EaselError::InvalidArgument(format!("invalid hex color '{}'", hex));
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        if !digits.is_ascii() {
            return Err(invalid());
        }

        let (r, g, b, a) = match digits.len() {
            3 | 4 => {
                let mut vals = [255u8; 4];
                for (i, c) in digits.char_indices() {
                    vals[i] = channel(&c.to_string())? * 17;
                }
                (vals[0], vals[1], vals[2], vals[3])
            }
            6 | 8 => {
                let r = channel(&digits[0..2])?;
                let g = channel(&digits[2..4])?;
                let b = channel(&digits[4..6])?;
                let a = if digits.len() == 8 {
                    channel(&digits[6..8])?
                } else {
                    255
                };
                (r, g, b, a)
            }
            _ => return Err(invalid()),
        };

        Ok(Self::new(
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
            a as f64 / 255.0,
        ))
    }

    /// Builds a color from script arguments.
    ///
    /// Numbers are divided by `range` and interpreted according to `mode`.
    /// Hex strings and `Color` values are taken as-is.
    pub fn from_args(args: &[ColorArg], mode: ColorMode, range: f64) -> Result<Self> {
        let range = if range == 0.0 { 1.0 } else { range };
        let number = |arg: &ColorArg| match arg {
            ColorArg::Number(n) => Ok(n / range),
            other => Err(EaselError::InvalidArgument(format!(
                "expected a number in color arguments, got {:?}",
                other
            ))),
        };
        let from_components = |c1: f64, c2: f64, c3: f64, a: f64| match mode {
            ColorMode::Rgb => Self::new(c1, c2, c3, a),
            ColorMode::Hsb => Self::from_hsb(c1, c2, c3, a),
        };

        match args {
            [] => Ok(Self::TRANSPARENT),
            [ColorArg::Color(c)] => Ok(*c),
            [ColorArg::Hex(h)] => Self::from_hex(h),
            [gray] => {
                let g = number(gray)?;
                Ok(Self::gray(g, 1.0))
            }
            [gray, alpha] => Ok(Self::gray(number(gray)?, number(alpha)?)),
            [c1, c2, c3] => Ok(from_components(number(c1)?, number(c2)?, number(c3)?, 1.0)),
            [c1, c2, c3, a] => Ok(from_components(
                number(c1)?,
                number(c2)?,
                number(c3)?,
                number(a)?,
            )),
            _ => Err(EaselError::InvalidArgument(format!(
                "color() takes at most 4 values, got {}",
                args.len()
            ))),
        }
    }

    /// Returns the color with its alpha multiplied by `alpha`.
    pub fn with_alpha_scaled(&self, alpha: f64) -> Self {
        Self::new(self.r, self.g, self.b, self.a * alpha)
    }

    /// Composites the color over white, used where a backend has no alpha channel.
    pub fn over_white(&self) -> (f64, f64, f64) {
        let blend = |c: f64| c * self.a + (1.0 - self.a);
        (blend(self.r), blend(self.g), blend(self.b))
    }

    /// Converts to Skia's `Color4f` struct (float based).
    pub fn to_color4f(&self) -> Color4f {
        Color4f::new(self.r as f32, self.g as f32, self.b as f32, self.a as f32)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

macro_rules! script_enum {
    ($(#[$meta:meta])* $name:ident, $what:literal { $($variant:ident => $($text:literal)|+),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl FromStr for $name {
            type Err = EaselError;

            fn from_str(s: &str) -> Result<Self> {
                match s.to_ascii_lowercase().as_str() {
                    $($($text)|+ => Ok(Self::$variant),)+
                    _ => Err(EaselError::InvalidMode {
                        what: $what,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

script_enum!(
    /// How `rect()` interprets its coordinates.
    RectMode, "rectmode" {
        Corner => "corner",
        Center => "center",
        Corners => "corners",
    }
);

script_enum!(
    /// The pivot used when rotating, scaling and skewing a grob.
    TransformMode, "transform" {
        Corner => "corner",
        Center => "center",
    }
);

script_enum!(
    /// Horizontal text alignment.
    Align, "align" {
        Left => "left",
        Center => "center",
        Right => "right",
        Justify => "justify",
    }
);

script_enum!(
    /// Arrow shape drawn by `arrow()`.
    ArrowType, "arrow" {
        Normal => "1" | "normal",
        FortyFive => "2" | "fortyfive",
    }
);

/// Color interpretation for numeric color arguments.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColorMode {
    #[default]
    Rgb,
    Hsb,
}

impl FromStr for ColorMode {
    type Err = EaselError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rgb" => Ok(Self::Rgb),
            "hsb" => Ok(Self::Hsb),
            other => Err(EaselError::InvalidColorMode(other.to_string())),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Rgb => write!(f, "rgb"),
            ColorMode::Hsb => write!(f, "hsb"),
        }
    }
}

impl Default for RectMode {
    fn default() -> Self {
        Self::Corner
    }
}

impl Default for TransformMode {
    fn default() -> Self {
        Self::Center
    }
}

impl Default for Align {
    fn default() -> Self {
        Self::Left
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformMode::Corner => write!(f, "corner"),
            TransformMode::Center => write!(f, "center"),
        }
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
            Align::Justify => "justify",
        };
        f.write_str(name)
    }
}

impl fmt::Display for RectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RectMode::Corner => write!(f, "corner"),
            RectMode::Center => write!(f, "center"),
            RectMode::Corners => write!(f, "corners"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn gray_and_alpha_arguments() {
        let c = Color::from_args(&[ColorArg::Number(0.5)], ColorMode::Rgb, 1.0).unwrap();
        assert_eq!(c, Color::new(0.5, 0.5, 0.5, 1.0));

        let c = Color::from_args(
            &[ColorArg::Number(0.5), ColorArg::Number(0.25)],
            ColorMode::Rgb,
            1.0,
        )
        .unwrap();
        assert!(approx(c.a, 0.25));
    }

    #[test]
    fn range_scales_numeric_components() {
        let args = [
            ColorArg::Number(255.0),
            ColorArg::Number(0.0),
            ColorArg::Number(127.5),
        ];
        let c = Color::from_args(&args, ColorMode::Rgb, 255.0).unwrap();
        assert!(approx(c.r, 1.0));
        assert!(approx(c.g, 0.0));
        assert!(approx(c.b, 0.5));
        assert!(approx(c.a, 1.0));
    }

    #[test]
    fn hsb_primary_hues() {
        let red = Color::from_hsb(0.0, 1.0, 1.0, 1.0);
        assert_eq!(red, Color::new(1.0, 0.0, 0.0, 1.0));

        let green = Color::from_hsb(1.0 / 3.0, 1.0, 1.0, 1.0);
        assert!(approx(green.g, 1.0) && green.r < 1e-9);

        let blue = Color::from_args(
            &[
                ColorArg::Number(2.0 / 3.0),
                ColorArg::Number(1.0),
                ColorArg::Number(1.0),
            ],
            ColorMode::Hsb,
            1.0,
        )
        .unwrap();
        assert!(approx(blue.b, 1.0) && blue.r < 1e-9);
    }

    #[test]
    fn hex_forms_ignore_range() {
        let c = Color::from_args(&[ColorArg::Hex("#ff0000".into())], ColorMode::Rgb, 255.0)
            .unwrap();
        assert_eq!(c, Color::new(1.0, 0.0, 0.0, 1.0));

        let short = Color::from_hex("#0f0").unwrap();
        assert_eq!(short, Color::new(0.0, 1.0, 0.0, 1.0));

        let with_alpha = Color::from_hex("00000080").unwrap();
        assert!((with_alpha.a - 128.0 / 255.0).abs() < 1e-9);

        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#zzzzzz").is_err());
    }

    #[test]
    fn too_many_components_is_rejected() {
        let args = vec![ColorArg::Number(0.1); 5];
        assert!(matches!(
            Color::from_args(&args, ColorMode::Rgb, 1.0),
            Err(EaselError::InvalidArgument(_))
        ));
    }

    #[test]
    fn components_are_clamped() {
        let c = Color::from_args(&[ColorArg::Number(3.0)], ColorMode::Rgb, 1.0).unwrap();
        assert_eq!(c, Color::WHITE);
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("hsb".parse::<ColorMode>().unwrap(), ColorMode::Hsb);
        assert!(matches!(
            "cmyk".parse::<ColorMode>(),
            Err(EaselError::InvalidColorMode(_))
        ));
        assert_eq!("CENTER".parse::<RectMode>().unwrap(), RectMode::Center);
        assert_eq!("LEFT".parse::<Align>().unwrap(), Align::Left);
        assert_eq!("2".parse::<ArrowType>().unwrap(), ArrowType::FortyFive);
        assert!("diagonal".parse::<RectMode>().is_err());
    }
}
