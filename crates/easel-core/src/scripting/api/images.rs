//! # Images API
//!
//! ## Responsibilities
//! - **Placement**: `image(path, x, y, width?, height?)` with `alpha` and `draw` keywords
//! - **Queries**: `imagesize(path)`
//! - **Redraw**: `drawimage(img)`

use crate::bot::SharedBot;
use crate::grob::ImageGrob;
use crate::scripting::utils::{
    arg_num, arg_or_key, int, map_bool, register_variadic, script_error, split_kwargs, with_bot,
    ScriptResult,
};
use rhai::{Dynamic, Engine};

fn image(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let (args, kw) = split_kwargs(args);
    let path = args
        .first()
        .and_then(|v| v.clone().into_string().ok())
        .ok_or_else(|| script_error("image() expects a file path"))?;
    let x = arg_num(&args, 1, "image")?;
    let y = arg_num(&args, 2, "image")?;
    let width = arg_or_key(&args, 3, &kw, "width")?;
    let height = arg_or_key(&args, 4, &kw, "height")?;
    let alpha = arg_or_key(&args, 5, &kw, "alpha")?.unwrap_or(1.0);
    let draw = map_bool(&kw, "draw", true)?;
    with_bot(bot, |b| {
        Ok(b.image(&path, x, y, width, height, alpha, draw)?
            .map(Dynamic::from)
            .unwrap_or(Dynamic::UNIT))
    })
}

fn register_image_type(engine: &mut Engine) {
    engine.register_type_with_name::<ImageGrob>("Image");
    engine.register_get("source", |i: &mut ImageGrob| i.source.clone());
    engine.register_get("x", |i: &mut ImageGrob| i.x);
    engine.register_get("y", |i: &mut ImageGrob| i.y);
    engine.register_get("width", |i: &mut ImageGrob| i.width);
    engine.register_get("height", |i: &mut ImageGrob| i.height);
    engine.register_get("alpha", |i: &mut ImageGrob| i.alpha);
    engine.register_get("size", |i: &mut ImageGrob| {
        Dynamic::from_array(vec![
            int(i.pixel_size.0 as i64),
            int(i.pixel_size.1 as i64),
        ])
    });
}

/// Register image functions.
pub fn register(engine: &mut Engine, bot: SharedBot) {
    register_image_type(engine);

    register_variadic(engine, "image", &bot, 3..=7, image);

    let b = bot.clone();
    engine.register_fn("imagesize", move |path: &str| -> ScriptResult<Dynamic> {
        let (w, h) = with_bot(&b, |bot| bot.imagesize(path))?;
        Ok(Dynamic::from_array(vec![int(w as i64), int(h as i64)]))
    });

    let b = bot;
    engine.register_fn("drawimage", move |img: ImageGrob| {
        with_bot(&b, |bot| {
            bot.drawimage(&img);
            Ok(())
        })
    });
}
