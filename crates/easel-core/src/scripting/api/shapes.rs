//! # Shapes API
//!
//! ## Responsibilities
//! - **Primitives**: `rect`, `oval`/`ellipse`, `circle`, `line`
//! - **Compound Shapes**: `arrow`, `star`
//! - **Modes**: `rectmode`
//!
//! Every shape accepts a trailing keyword map with `draw`, `fill`, `stroke`
//! and `strokewidth`, and returns the created `BezierPath`.

use crate::bot::SharedBot;
use crate::scripting::utils::{
    arg_num, arg_or_key, draw_options, register_variadic, script_error, split_kwargs, string,
    with_bot, ScriptResult,
};
use crate::types::{ArrowType, RectMode};
use rhai::{Dynamic, Engine};

fn rect(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let (args, kw) = split_kwargs(args);
    let x = arg_num(&args, 0, "rect")?;
    let y = arg_num(&args, 1, "rect")?;
    let w = arg_num(&args, 2, "rect")?;
    let h = arg_num(&args, 3, "rect")?;
    let roundness = arg_or_key(&args, 4, &kw, "roundness")?.unwrap_or(0.0);
    with_bot(bot, |b| {
        let (draw, ov) = draw_options(b, &kw)?;
        Ok(Dynamic::from(b.rect(x, y, w, h, roundness, draw, &ov)))
    })
}

fn ellipse(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let (args, kw) = split_kwargs(args);
    let x = arg_num(&args, 0, "ellipse")?;
    let y = arg_num(&args, 1, "ellipse")?;
    let w = arg_num(&args, 2, "ellipse")?;
    let h = arg_num(&args, 3, "ellipse")?;
    with_bot(bot, |b| {
        let (draw, ov) = draw_options(b, &kw)?;
        Ok(Dynamic::from(b.ellipse(x, y, w, h, draw, &ov)))
    })
}

fn circle(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let (args, kw) = split_kwargs(args);
    let x = arg_num(&args, 0, "circle")?;
    let y = arg_num(&args, 1, "circle")?;
    let d = arg_num(&args, 2, "circle")?;
    with_bot(bot, |b| {
        let (draw, ov) = draw_options(b, &kw)?;
        Ok(Dynamic::from(b.circle(x, y, d, draw, &ov)))
    })
}

fn line(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let (args, kw) = split_kwargs(args);
    let x1 = arg_num(&args, 0, "line")?;
    let y1 = arg_num(&args, 1, "line")?;
    let x2 = arg_num(&args, 2, "line")?;
    let y2 = arg_num(&args, 3, "line")?;
    with_bot(bot, |b| {
        let (draw, ov) = draw_options(b, &kw)?;
        Ok(Dynamic::from(b.line(x1, y1, x2, y2, draw, &ov)))
    })
}

/// Arrow types are given as `NORMAL`/`FORTYFIVE` or as the numbers 1 and 2.
fn arrow_type(value: Option<&Dynamic>) -> ScriptResult<ArrowType> {
    let Some(value) = value else {
        return Ok(ArrowType::Normal);
    };
    let text = if value.is_int() {
        value.as_int().map_err(script_error)?.to_string()
    } else {
        string(value)?
    };
    text.parse().map_err(script_error)
}

fn arrow(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let (args, kw) = split_kwargs(args);
    let x = arg_num(&args, 0, "arrow")?;
    let y = arg_num(&args, 1, "arrow")?;
    let width = arg_num(&args, 2, "arrow")?;
    let kind = arrow_type(args.get(3).or_else(|| kw.get("type")))?;
    with_bot(bot, |b| {
        let (draw, ov) = draw_options(b, &kw)?;
        Ok(Dynamic::from(b.arrow(x, y, width, kind, draw, &ov)))
    })
}

fn star(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let (args, kw) = split_kwargs(args);
    let x = arg_num(&args, 0, "star")?;
    let y = arg_num(&args, 1, "star")?;
    let points = arg_or_key(&args, 2, &kw, "points")?.unwrap_or(20.0).max(0.0) as u32;
    let outer = arg_or_key(&args, 3, &kw, "outer")?.unwrap_or(100.0);
    let inner = arg_or_key(&args, 4, &kw, "inner")?.unwrap_or(50.0);
    with_bot(bot, |b| {
        let (draw, ov) = draw_options(b, &kw)?;
        Ok(Dynamic::from(b.star(x, y, points, outer, inner, draw, &ov)))
    })
}

/// Register shape functions.
pub fn register(engine: &mut Engine, bot: SharedBot) {
    register_variadic(engine, "rect", &bot, 4..=6, rect);
    register_variadic(engine, "oval", &bot, 4..=5, ellipse);
    register_variadic(engine, "ellipse", &bot, 4..=5, ellipse);
    register_variadic(engine, "circle", &bot, 3..=4, circle);
    register_variadic(engine, "line", &bot, 4..=5, line);
    register_variadic(engine, "arrow", &bot, 3..=5, arrow);
    register_variadic(engine, "star", &bot, 2..=6, star);

    let b = bot.clone();
    engine.register_fn("rectmode", move || {
        with_bot(&b, |bot| Ok(bot.rectmode(None).to_string()))
    });
    let b = bot;
    engine.register_fn("rectmode", move |mode: &str| -> ScriptResult<String> {
        let mode: RectMode = mode.parse().map_err(script_error)?;
        with_bot(&b, |bot| Ok(bot.rectmode(Some(mode)).to_string()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhai::Map;

    #[test]
    fn arrow_types_accept_numbers_and_names() {
        assert_eq!(arrow_type(None).unwrap(), ArrowType::Normal);
        assert_eq!(
            arrow_type(Some(&Dynamic::from_int(2))).unwrap(),
            ArrowType::FortyFive
        );
        assert_eq!(
            arrow_type(Some(&Dynamic::from("fortyfive"))).unwrap(),
            ArrowType::FortyFive
        );
        assert!(arrow_type(Some(&Dynamic::from("sideways"))).is_err());
    }

    #[test]
    fn keyword_map_is_not_a_position() {
        let mut kw = Map::new();
        kw.insert("roundness".into(), Dynamic::from_float(0.5));
        let (args, kw) = split_kwargs(vec![
            Dynamic::from_int(0),
            Dynamic::from_int(0),
            Dynamic::from_int(10),
            Dynamic::from_int(10),
            Dynamic::from_map(kw),
        ]);
        assert_eq!(arg_or_key(&args, 4, &kw, "roundness").unwrap(), Some(0.5));
    }
}
