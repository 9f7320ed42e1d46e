//! # Scripting Utilities
//!
//! Argument conversion helpers shared by the Rhai bindings.
//!
//! ## Responsibilities
//! - **Numbers**: Accept INT or FLOAT wherever a number is expected.
//! - **Colors**: Turn script values into [`ColorArg`] lists.
//! - **Keyword Maps**: Read `draw`, `fill`, `stroke` and friends from a trailing map.
//! - **State Access**: Lock the shared [`Bot`] and map library errors into script errors.

use crate::bot::{Bot, SharedBot, StyleOverrides};
use crate::errors::EaselError;
use crate::types::{Color, ColorArg};
use kurbo::Point;
use rhai::{Array, Dynamic, Engine, EvalAltResult, Map, INT};
use std::fmt::Display;
use std::ops::RangeInclusive;

pub type ScriptResult<T> = Result<T, Box<EvalAltResult>>;

/// A verb implementation taking its positional arguments as a list.
pub type Variadic = fn(&SharedBot, Vec<Dynamic>) -> ScriptResult<Dynamic>;

/// Registers `verb` under `name` once per arity in `arities` (at most 7).
pub fn register_variadic(
    engine: &mut Engine,
    name: &str,
    bot: &SharedBot,
    arities: RangeInclusive<usize>,
    verb: Variadic,
) {
    type D = Dynamic;
    for arity in arities {
        let b = bot.clone();
        match arity {
            0 => {
                engine.register_fn(name, move || verb(&b, vec![]));
            }
            1 => {
                engine.register_fn(name, move |a: D| verb(&b, vec![a]));
            }
            2 => {
                engine.register_fn(name, move |a: D, c: D| verb(&b, vec![a, c]));
            }
            3 => {
                engine.register_fn(name, move |a: D, c: D, d: D| verb(&b, vec![a, c, d]));
            }
            4 => {
                engine.register_fn(name, move |a: D, c: D, d: D, e: D| {
                    verb(&b, vec![a, c, d, e])
                });
            }
            5 => {
                engine.register_fn(name, move |a: D, c: D, d: D, e: D, f: D| {
                    verb(&b, vec![a, c, d, e, f])
                });
            }
            6 => {
                engine.register_fn(name, move |a: D, c: D, d: D, e: D, f: D, g: D| {
                    verb(&b, vec![a, c, d, e, f, g])
                });
            }
            7 => {
                engine.register_fn(name, move |a: D, c: D, d: D, e: D, f: D, g: D, h: D| {
                    verb(&b, vec![a, c, d, e, f, g, h])
                });
            }
            _ => {}
        }
    }
}

/// Splits a trailing keyword map off the positional arguments.
pub fn split_kwargs(mut args: Vec<Dynamic>) -> (Vec<Dynamic>, Map) {
    if let Some(map) = args.last().and_then(|last| last.clone().try_cast::<Map>()) {
        args.pop();
        return (args, map);
    }
    (args, Map::new())
}

/// The positional number at `index`, required.
pub fn arg_num(args: &[Dynamic], index: usize, verb: &str) -> ScriptResult<f64> {
    match args.get(index) {
        Some(value) => num(value),
        None => Err(script_error(format!(
            "{}() is missing argument {}",
            verb,
            index + 1
        ))),
    }
}

/// The positional number at `index`, falling back to the keyword `key`.
pub fn arg_or_key(args: &[Dynamic], index: usize, map: &Map, key: &str) -> ScriptResult<Option<f64>> {
    match args.get(index) {
        Some(value) => opt_num(value),
        None => map_num(map, key),
    }
}

pub fn script_error(e: impl Display) -> Box<EvalAltResult> {
    e.to_string().into()
}

/// Locks the bot for the duration of `f`.
pub fn with_bot<T>(
    bot: &SharedBot,
    f: impl FnOnce(&mut Bot) -> crate::Result<T>,
) -> ScriptResult<T> {
    let mut guard = bot
        .lock()
        .map_err(|_| script_error("drawing state is unavailable (poisoned lock)"))?;
    f(&mut guard).map_err(script_error)
}

/// Reads a number given as INT or FLOAT.
pub fn num(value: &Dynamic) -> ScriptResult<f64> {
    if let Ok(f) = value.as_float() {
        return Ok(f);
    }
    if let Ok(i) = value.as_int() {
        return Ok(i as f64);
    }
    Err(script_error(format!(
        "expected a number, got {}",
        value.type_name()
    )))
}

pub fn opt_num(value: &Dynamic) -> ScriptResult<Option<f64>> {
    if value.is_unit() {
        Ok(None)
    } else {
        num(value).map(Some)
    }
}

pub fn is_number(value: &Dynamic) -> bool {
    value.is_int() || value.is_float()
}

pub fn string(value: &Dynamic) -> ScriptResult<String> {
    value
        .clone()
        .into_string()
        .map_err(|t| script_error(format!("expected a string, got {}", t)))
}

/// Flattens script color arguments. A single array is spread into its elements.
pub fn color_args(values: &[Dynamic]) -> ScriptResult<Vec<ColorArg>> {
    if let [single] = values {
        if let Some(items) = single.clone().try_cast::<Array>() {
            return color_args(&items);
        }
    }
    values.iter().map(color_arg).collect()
}

fn color_arg(value: &Dynamic) -> ScriptResult<ColorArg> {
    if let Some(color) = value.clone().try_cast::<Color>() {
        return Ok(ColorArg::Color(color));
    }
    if value.is_string() {
        return Ok(ColorArg::Hex(string(value)?));
    }
    num(value)
        .map(ColorArg::Number)
        .map_err(|_| script_error(format!("invalid color component: {}", value.type_name())))
}

/// A keyword flag, `default` when absent.
pub fn map_bool(map: &Map, key: &str, default: bool) -> ScriptResult<bool> {
    match map.get(key) {
        None => Ok(default),
        Some(v) => v
            .as_bool()
            .map_err(|t| script_error(format!("'{}' must be a bool, got {}", key, t))),
    }
}

pub fn map_num(map: &Map, key: &str) -> ScriptResult<Option<f64>> {
    match map.get(key) {
        None => Ok(None),
        Some(v) => opt_num(v),
    }
}

pub fn map_string(map: &Map, key: &str) -> ScriptResult<Option<String>> {
    match map.get(key) {
        None => Ok(None),
        Some(v) if v.is_unit() => Ok(None),
        Some(v) => string(v).map(Some),
    }
}

/// Resolves a color keyword. `()` means "none".
fn map_color(bot: &Bot, map: &Map, key: &str) -> crate::Result<Option<Option<Color>>> {
    let Some(value) = map.get(key) else {
        return Ok(None);
    };
    if value.is_unit() {
        return Ok(Some(None));
    }
    let args = color_args(std::slice::from_ref(value))
        .map_err(|e| EaselError::InvalidArgument(e.to_string()))?;
    Ok(Some(Some(bot.color(&args)?)))
}

/// Reads `fill`, `stroke` and `strokewidth` keywords using the bot's color mode.
pub fn style_overrides(bot: &Bot, map: &Map) -> crate::Result<StyleOverrides> {
    let strokewidth = match map.get("strokewidth") {
        None => None,
        Some(v) => Some(num(v).map_err(|e| EaselError::InvalidArgument(e.to_string()))?),
    };
    Ok(StyleOverrides {
        fill: map_color(bot, map, "fill")?,
        stroke: map_color(bot, map, "stroke")?,
        strokewidth,
    })
}

/// The `draw` flag and the style keywords of a shape call.
pub fn draw_options(bot: &Bot, map: &Map) -> crate::Result<(bool, StyleOverrides)> {
    let draw = map_bool(map, "draw", true).map_err(|e| EaselError::InvalidArgument(e.to_string()))?;
    Ok((draw, style_overrides(bot, map)?))
}

/// A point given as `[x, y]` or `#{x: .., y: ..}`.
pub fn point(value: &Dynamic) -> ScriptResult<Point> {
    if let Some(items) = value.clone().try_cast::<Array>() {
        if let [x, y, ..] = items.as_slice() {
            return Ok(Point::new(num(x)?, num(y)?));
        }
    }
    if let Some(map) = value.clone().try_cast::<Map>() {
        if let (Some(x), Some(y)) = (map.get("x"), map.get("y")) {
            return Ok(Point::new(num(x)?, num(y)?));
        }
    }
    Err(script_error("expected a point as [x, y] or #{x, y}"))
}

pub fn points(list: &Array) -> ScriptResult<Vec<Point>> {
    list.iter().map(point).collect()
}

pub fn int(value: INT) -> Dynamic {
    Dynamic::from_int(value)
}

pub fn float_pair(a: f64, b: f64) -> Dynamic {
    Dynamic::from_array(vec![Dynamic::from_float(a), Dynamic::from_float(b)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_accept_int_and_float() {
        assert_eq!(num(&Dynamic::from_int(3)).unwrap(), 3.0);
        assert_eq!(num(&Dynamic::from_float(2.5)).unwrap(), 2.5);
        assert!(num(&Dynamic::from("x")).is_err());
        assert_eq!(opt_num(&Dynamic::UNIT).unwrap(), None);
    }

    #[test]
    fn color_args_spread_arrays() {
        let array = Dynamic::from_array(vec![
            Dynamic::from_int(1),
            Dynamic::from_float(0.5),
            Dynamic::from_int(0),
        ]);
        let args = color_args(&[array]).unwrap();
        assert_eq!(
            args,
            vec![
                ColorArg::Number(1.0),
                ColorArg::Number(0.5),
                ColorArg::Number(0.0)
            ]
        );
        let hex = color_args(&[Dynamic::from("#ff0000")]).unwrap();
        assert_eq!(hex, vec![ColorArg::Hex("#ff0000".into())]);
    }

    #[test]
    fn style_overrides_read_keywords() {
        let bot = Bot::default();
        let mut map = Map::new();
        map.insert("fill".into(), Dynamic::UNIT);
        map.insert("stroke".into(), Dynamic::from("#000"));
        map.insert("strokewidth".into(), Dynamic::from_int(3));

        let o = style_overrides(&bot, &map).unwrap();
        assert_eq!(o.fill, Some(None));
        assert_eq!(o.stroke, Some(Some(Color::BLACK)));
        assert_eq!(o.strokewidth, Some(3.0));
    }

    #[test]
    fn trailing_map_becomes_kwargs() {
        let mut m = Map::new();
        m.insert("draw".into(), Dynamic::FALSE);
        let (args, kw) = split_kwargs(vec![Dynamic::from_int(1), Dynamic::from_map(m)]);
        assert_eq!(args.len(), 1);
        assert!(!map_bool(&kw, "draw", true).unwrap());

        let (args, kw) = split_kwargs(vec![Dynamic::from_int(1), Dynamic::from_int(2)]);
        assert_eq!(args.len(), 2);
        assert!(kw.is_empty());
        assert!(arg_num(&args, 2, "rect").is_err());
        assert_eq!(arg_or_key(&args, 1, &kw, "y").unwrap(), Some(2.0));
    }

    #[test]
    fn points_from_arrays_and_maps() {
        let a = Dynamic::from_array(vec![Dynamic::from_int(1), Dynamic::from_float(2.0)]);
        let mut m = Map::new();
        m.insert("x".into(), Dynamic::from_int(3));
        m.insert("y".into(), Dynamic::from_int(4));
        let pts = points(&vec![a, Dynamic::from_map(m)]).unwrap();
        assert_eq!(pts, vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
        assert!(point(&Dynamic::from_int(1)).is_err());
    }
}
