//! # Transforms API
//!
//! ## Responsibilities
//! - **Mode**: `transform(CORNER | CENTER)`
//! - **Operations**: `translate`, `rotate`, `scale`, `skew`, `apply_matrix`
//! - **Stack**: `push`, `pop`, `reset`

use crate::bot::SharedBot;
use crate::scripting::utils::{map_num, num, script_error, with_bot, ScriptResult};
use crate::types::TransformMode;
use rhai::{Array, Dynamic, Engine, Map};

/// Register transform functions.
pub fn register(engine: &mut Engine, bot: SharedBot) {
    let b = bot.clone();
    engine.register_fn("transform", move || {
        with_bot(&b, |bot| Ok(bot.transform(None).to_string()))
    });
    let b = bot.clone();
    engine.register_fn("transform", move |mode: &str| -> ScriptResult<String> {
        let mode: TransformMode = mode.parse().map_err(script_error)?;
        with_bot(&b, |bot| Ok(bot.transform(Some(mode)).to_string()))
    });

    let b = bot.clone();
    engine.register_fn("translate", move |x: Dynamic, y: Dynamic| -> ScriptResult<()> {
        let (x, y) = (num(&x)?, num(&y)?);
        with_bot(&b, |bot| {
            bot.translate(x, y);
            Ok(())
        })
    });

    let b = bot.clone();
    engine.register_fn("rotate", move |degrees: Dynamic| -> ScriptResult<()> {
        let degrees = num(&degrees)?;
        with_bot(&b, |bot| {
            bot.rotate(degrees);
            Ok(())
        })
    });
    let b = bot.clone();
    engine.register_fn("rotate", move |kw: Map| -> ScriptResult<()> {
        let radians = map_num(&kw, "radians")?;
        let degrees = map_num(&kw, "degrees")?;
        with_bot(&b, |bot| {
            match (radians, degrees) {
                (Some(r), _) => bot.rotate_radians(r),
                (None, Some(d)) => bot.rotate(d),
                (None, None) => {}
            }
            Ok(())
        })
    });

    let b = bot.clone();
    engine.register_fn("scale", move |x: Dynamic| -> ScriptResult<()> {
        let x = num(&x)?;
        with_bot(&b, |bot| {
            bot.scale(x, None);
            Ok(())
        })
    });
    let b = bot.clone();
    engine.register_fn("scale", move |x: Dynamic, y: Dynamic| -> ScriptResult<()> {
        let (x, y) = (num(&x)?, num(&y)?);
        with_bot(&b, |bot| {
            bot.scale(x, Some(y));
            Ok(())
        })
    });

    let b = bot.clone();
    engine.register_fn("skew", move |x: Dynamic| -> ScriptResult<()> {
        let x = num(&x)?;
        with_bot(&b, |bot| {
            bot.skew(x, 0.0);
            Ok(())
        })
    });
    let b = bot.clone();
    engine.register_fn("skew", move |x: Dynamic, y: Dynamic| -> ScriptResult<()> {
        let (x, y) = (num(&x)?, num(&y)?);
        with_bot(&b, |bot| {
            bot.skew(x, y);
            Ok(())
        })
    });

    let b = bot.clone();
    engine.register_fn(
        "apply_matrix",
        move |xx: Dynamic,
              yx: Dynamic,
              xy: Dynamic,
              yy: Dynamic,
              x0: Dynamic,
              y0: Dynamic|
              -> ScriptResult<()> {
            let coeffs = [num(&xx)?, num(&yx)?, num(&xy)?, num(&yy)?, num(&x0)?, num(&y0)?];
            with_bot(&b, |bot| {
                bot.apply_matrix(coeffs);
                Ok(())
            })
        },
    );
    let b = bot.clone();
    engine.register_fn("apply_matrix", move |values: Array| -> ScriptResult<()> {
        let coeffs = matrix_coeffs(&values)?;
        with_bot(&b, |bot| {
            bot.apply_matrix(coeffs);
            Ok(())
        })
    });

    // ========== STACK ==========
    let b = bot.clone();
    engine.register_fn("push", move || {
        with_bot(&b, |bot| {
            bot.push();
            Ok(())
        })
    });
    let b = bot.clone();
    engine.register_fn("pop", move || with_bot(&b, |bot| bot.pop()));
    let b = bot;
    engine.register_fn("reset", move || {
        with_bot(&b, |bot| {
            bot.reset();
            Ok(())
        })
    });
}

/// Reads the six coefficients of `apply_matrix([xx, yx, xy, yy, x0, y0])`.
fn matrix_coeffs(values: &Array) -> ScriptResult<[f64; 6]> {
    if values.len() != 6 {
        return Err(script_error(format!(
            "apply_matrix() expects 6 values, got {}",
            values.len()
        )));
    }
    let mut coeffs = [0.0; 6];
    for (slot, value) in coeffs.iter_mut().zip(values) {
        *slot = num(value)?;
    }
    Ok(coeffs)
}
