//! # Color API
//!
//! ## Responsibilities
//! - **Color Type**: `Color` values with `r`, `g`, `b`, `a` getters
//! - **Modes**: `colormode`, `colorrange`
//! - **Paint State**: `fill`, `nofill`, `stroke`, `nostroke`, `strokewidth`
//! - **Background**: `background` covers the canvas

use crate::bot::{Bot, SharedBot};
use crate::types::{Color, ColorArg, ColorMode};
use rhai::{Dynamic, Engine};

use crate::scripting::utils::{color_args, num, script_error, string, with_bot, ScriptResult};

type ColorVerb = fn(&mut Bot, &[ColorArg]) -> crate::Result<Dynamic>;

/// Registers `name` for 0 to 4 color arguments.
fn register_color_verb(engine: &mut Engine, name: &str, bot: &SharedBot, verb: ColorVerb) {
    let b = bot.clone();
    engine.register_fn(name, move || -> ScriptResult<Dynamic> {
        with_bot(&b, |bot| verb(bot, &[]))
    });
    let b = bot.clone();
    engine.register_fn(name, move |a: Dynamic| -> ScriptResult<Dynamic> {
        let args = color_args(&[a])?;
        with_bot(&b, |bot| verb(bot, &args))
    });
    let b = bot.clone();
    engine.register_fn(name, move |a: Dynamic, c: Dynamic| -> ScriptResult<Dynamic> {
        let args = color_args(&[a, c])?;
        with_bot(&b, |bot| verb(bot, &args))
    });
    let b = bot.clone();
    engine.register_fn(
        name,
        move |a: Dynamic, c: Dynamic, d: Dynamic| -> ScriptResult<Dynamic> {
            let args = color_args(&[a, c, d])?;
            with_bot(&b, |bot| verb(bot, &args))
        },
    );
    let b = bot.clone();
    engine.register_fn(
        name,
        move |a: Dynamic, c: Dynamic, d: Dynamic, e: Dynamic| -> ScriptResult<Dynamic> {
            let args = color_args(&[a, c, d, e])?;
            with_bot(&b, |bot| verb(bot, &args))
        },
    );
}

fn optional_color(color: Option<Color>) -> Dynamic {
    color.map(Dynamic::from).unwrap_or(Dynamic::UNIT)
}

/// Register color-related Rhai functions.
pub fn register(engine: &mut Engine, bot: SharedBot) {
    engine.register_type_with_name::<Color>("Color");
    engine.register_get("r", |c: &mut Color| c.r);
    engine.register_get("g", |c: &mut Color| c.g);
    engine.register_get("b", |c: &mut Color| c.b);
    engine.register_get("a", |c: &mut Color| c.a);
    engine.register_fn("to_string", |c: &mut Color| {
        format!("Color({}, {}, {}, {})", c.r, c.g, c.b, c.a)
    });

    register_color_verb(engine, "color", &bot, |b, args| {
        Ok(Dynamic::from(b.color(args)?))
    });
    register_color_verb(engine, "fill", &bot, |b, args| {
        Ok(optional_color(b.fill(args)?))
    });
    register_color_verb(engine, "stroke", &bot, |b, args| {
        Ok(optional_color(b.stroke(args)?))
    });
    register_color_verb(engine, "background", &bot, |b, args| {
        b.background(args)?;
        Ok(Dynamic::UNIT)
    });

    let b = bot.clone();
    engine.register_fn("nofill", move || with_bot(&b, |bot| Ok(bot.nofill())));
    let b = bot.clone();
    engine.register_fn("nostroke", move || with_bot(&b, |bot| Ok(bot.nostroke())));

    let b = bot.clone();
    engine.register_fn("strokewidth", move || {
        with_bot(&b, |bot| Ok(bot.strokewidth(None)))
    });
    let b = bot.clone();
    engine.register_fn("strokewidth", move |w: Dynamic| -> ScriptResult<f64> {
        let w = num(&w)?;
        with_bot(&b, |bot| Ok(bot.strokewidth(Some(w))))
    });

    // ========== COLOR MODES ==========
    let b = bot.clone();
    engine.register_fn("colormode", move || {
        with_bot(&b, |bot| Ok(bot.colormode(None, None).to_string()))
    });
    let b = bot.clone();
    engine.register_fn("colormode", move |mode: Dynamic| -> ScriptResult<String> {
        let mode: ColorMode = string(&mode)?.parse().map_err(script_error)?;
        with_bot(&b, |bot| Ok(bot.colormode(Some(mode), None).to_string()))
    });
    let b = bot.clone();
    engine.register_fn(
        "colormode",
        move |mode: Dynamic, range: Dynamic| -> ScriptResult<String> {
            let mode: ColorMode = string(&mode)?.parse().map_err(script_error)?;
            let range = num(&range)?;
            with_bot(&b, |bot| Ok(bot.colormode(Some(mode), Some(range)).to_string()))
        },
    );
    let b = bot;
    engine.register_fn("colorrange", move |range: Dynamic| -> ScriptResult<()> {
        let range = num(&range)?;
        with_bot(&b, |bot| {
            bot.colorrange(range);
            Ok(())
        })
    });
}
