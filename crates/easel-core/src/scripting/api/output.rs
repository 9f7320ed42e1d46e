//! # Output API
//!
//! ## Responsibilities
//! - **Canvas**: `size(w, h)` and the `WIDTH`/`HEIGHT` it updates
//! - **Animation**: `speed(fps)`
//! - **Files**: `finish(target)`, `snapshot(target)`

use crate::bot::SharedBot;
use crate::scripting::utils::{int, opt_num, with_bot, ScriptResult};
use rhai::{Dynamic, Engine};

/// Register output functions.
pub fn register(engine: &mut Engine, bot: SharedBot) {
    let b = bot.clone();
    engine.register_fn("size", move || {
        with_bot(&b, |bot| {
            Ok(Dynamic::from_array(vec![
                int(bot.width() as i64),
                int(bot.height() as i64),
            ]))
        })
    });
    let b = bot.clone();
    engine.register_fn("size", move |w: Dynamic| -> ScriptResult<()> {
        let w = opt_num(&w)?;
        with_bot(&b, |bot| {
            bot.size(w, None);
            Ok(())
        })
    });
    let b = bot.clone();
    engine.register_fn("size", move |w: Dynamic, h: Dynamic| -> ScriptResult<()> {
        let (w, h) = (opt_num(&w)?, opt_num(&h)?);
        with_bot(&b, |bot| {
            bot.size(w, h);
            Ok(())
        })
    });

    let b = bot.clone();
    engine.register_fn("speed", move || with_bot(&b, |bot| Ok(bot.speed(None))));
    let b = bot.clone();
    engine.register_fn("speed", move |fps: Dynamic| -> ScriptResult<f64> {
        let fps = opt_num(&fps)?;
        with_bot(&b, |bot| Ok(bot.speed(fps)))
    });

    let b = bot.clone();
    engine.register_fn("finish", move |target: &str| {
        with_bot(&b, |bot| bot.finish(target))
    });

    let b = bot;
    engine.register_fn("snapshot", move |target: &str| {
        with_bot(&b, |bot| bot.snapshot(target))
    });
}
