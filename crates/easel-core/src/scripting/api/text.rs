//! # Text API
//!
//! ## Responsibilities
//! - **Font State**: `font`, `fontsize`, `lineheight`, `align`
//! - **Drawing**: `text`, `textpath`
//! - **Metrics**: `textmetrics`, `textwidth`, `textheight`
//! - **Text Type**: read-only getters on text grobs

use crate::bot::{SharedBot, TextOutput};
use crate::grob::TextGrob;
use crate::scripting::utils::{
    arg_num, draw_options, float_pair, map_bool, opt_num, register_variadic, script_error,
    split_kwargs, with_bot, ScriptResult,
};
use crate::types::Align;
use rhai::{Dynamic, Engine, Map};

/// Any printable value is accepted as text.
fn text_arg(args: &[Dynamic], verb: &str) -> ScriptResult<String> {
    match args.first() {
        Some(v) if v.is_string() => v.clone().into_string().map_err(script_error),
        Some(v) => Ok(v.to_string()),
        None => Err(script_error(format!("{}() is missing its text", verb))),
    }
}

/// The wrap width, positional or as the `width` keyword.
fn wrap_width(args: &[Dynamic], index: usize, kw: &Map) -> ScriptResult<Option<f64>> {
    match args.get(index).or_else(|| kw.get("width")) {
        Some(v) => opt_num(v),
        None => Ok(None),
    }
}

fn text(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let (args, kw) = split_kwargs(args);
    let txt = text_arg(&args, "text")?;
    let x = arg_num(&args, 1, "text")?;
    let y = arg_num(&args, 2, "text")?;
    let width = wrap_width(&args, 3, &kw)?;
    let outline = map_bool(&kw, "outline", false)?;
    with_bot(bot, |b| {
        let (draw, ov) = draw_options(b, &kw)?;
        Ok(match b.text(&txt, x, y, width, outline, draw, &ov)? {
            TextOutput::Text(grob) => Dynamic::from(grob),
            TextOutput::Path(path) => Dynamic::from(path),
        })
    })
}

fn textpath(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let (args, kw) = split_kwargs(args);
    let txt = text_arg(&args, "textpath")?;
    let x = arg_num(&args, 1, "textpath")?;
    let y = arg_num(&args, 2, "textpath")?;
    let width = wrap_width(&args, 3, &kw)?;
    let draw = map_bool(&kw, "draw", false)?;
    with_bot(bot, |b| {
        let (_, ov) = draw_options(b, &kw)?;
        Ok(Dynamic::from(b.textpath(&txt, x, y, width, draw, &ov)?))
    })
}

fn textmetrics(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let (args, kw) = split_kwargs(args);
    let txt = text_arg(&args, "textmetrics")?;
    let width = wrap_width(&args, 1, &kw)?;
    let (w, h) = with_bot(bot, |b| b.textmetrics(&txt, width))?;
    Ok(float_pair(w, h))
}

fn textwidth(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let (args, kw) = split_kwargs(args);
    let txt = text_arg(&args, "textwidth")?;
    let width = wrap_width(&args, 1, &kw)?;
    with_bot(bot, |b| b.textwidth(&txt, width)).map(Dynamic::from_float)
}

fn textheight(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let (args, kw) = split_kwargs(args);
    let txt = text_arg(&args, "textheight")?;
    let width = wrap_width(&args, 1, &kw)?;
    with_bot(bot, |b| b.textheight(&txt, width)).map(Dynamic::from_float)
}

fn register_text_type(engine: &mut Engine) {
    engine.register_type_with_name::<TextGrob>("Text");
    engine.register_get("text", |t: &mut TextGrob| t.text.clone());
    engine.register_get("x", |t: &mut TextGrob| t.x);
    engine.register_get("y", |t: &mut TextGrob| t.y);
    engine.register_get("width", |t: &mut TextGrob| {
        t.width.map(Dynamic::from_float).unwrap_or(Dynamic::UNIT)
    });
    engine.register_get("metrics", |t: &mut TextGrob| float_pair(t.metrics.0, t.metrics.1));
    engine.register_get("baseline", |t: &mut TextGrob| t.baseline);
    engine.register_get("path", |t: &mut TextGrob| t.to_path());
}

/// Register text functions.
pub fn register(engine: &mut Engine, bot: SharedBot) {
    register_text_type(engine);

    let b = bot.clone();
    engine.register_fn("font", move || {
        with_bot(&b, |bot| {
            Ok(bot
                .font(None, None)?
                .map(Dynamic::from)
                .unwrap_or(Dynamic::UNIT))
        })
    });
    let b = bot.clone();
    engine.register_fn("font", move |path: &str| {
        with_bot(&b, |bot| {
            bot.font(Some(path), None)?;
            Ok(())
        })
    });
    let b = bot.clone();
    engine.register_fn("font", move |path: &str, size: Dynamic| -> ScriptResult<()> {
        let size = opt_num(&size)?;
        with_bot(&b, |bot| {
            bot.font(Some(path), size)?;
            Ok(())
        })
    });

    let b = bot.clone();
    engine.register_fn("fontsize", move || with_bot(&b, |bot| Ok(bot.fontsize(None))));
    let b = bot.clone();
    engine.register_fn("fontsize", move |size: Dynamic| -> ScriptResult<f64> {
        let size = opt_num(&size)?;
        with_bot(&b, |bot| Ok(bot.fontsize(size)))
    });
    let b = bot.clone();
    engine.register_fn("lineheight", move || {
        with_bot(&b, |bot| Ok(bot.lineheight(None)))
    });
    let b = bot.clone();
    engine.register_fn("lineheight", move |h: Dynamic| -> ScriptResult<f64> {
        let h = opt_num(&h)?;
        with_bot(&b, |bot| Ok(bot.lineheight(h)))
    });
    let b = bot.clone();
    engine.register_fn("align", move || {
        with_bot(&b, |bot| Ok(bot.align(None).to_string()))
    });
    let b = bot.clone();
    engine.register_fn("align", move |align: &str| -> ScriptResult<String> {
        let align: Align = align.parse().map_err(script_error)?;
        with_bot(&b, |bot| Ok(bot.align(Some(align)).to_string()))
    });

    register_variadic(engine, "text", &bot, 3..=5, text);
    register_variadic(engine, "textpath", &bot, 3..=5, textpath);
    register_variadic(engine, "textmetrics", &bot, 1..=3, textmetrics);
    register_variadic(engine, "textwidth", &bot, 1..=3, textwidth);
    register_variadic(engine, "textheight", &bot, 1..=3, textheight);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_printed_as_text() {
        assert_eq!(text_arg(&[Dynamic::from("hi")], "text").unwrap(), "hi");
        assert_eq!(text_arg(&[Dynamic::from_int(42)], "text").unwrap(), "42");
        assert!(text_arg(&[], "text").is_err());
    }

    #[test]
    fn wrap_width_prefers_position() {
        let mut kw = Map::new();
        kw.insert("width".into(), Dynamic::from_int(50));
        let args = [Dynamic::from("t"), Dynamic::from_int(200)];
        assert_eq!(wrap_width(&args, 1, &kw).unwrap(), Some(200.0));
        assert_eq!(wrap_width(&args, 2, &kw).unwrap(), Some(50.0));
        assert_eq!(wrap_width(&args, 2, &Map::new()).unwrap(), None);
    }
}
