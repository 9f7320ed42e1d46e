//! # Paths API
//!
//! ## Responsibilities
//! - **BezierPath Type**: Constructor and path-editing methods
//! - **Current Path**: `beginpath` ... `endpath` and the relative verbs
//! - **Curve Fitting**: `findpath`
//! - **Clipping**: `beginclip`, `endclip`

use crate::bot::SharedBot;
use crate::path::BezierPath;
use crate::scripting::utils::{
    arg_num, float_pair, map_bool, num, points, register_variadic, script_error, with_bot,
    ScriptResult,
};
use crate::types::RectMode;
use rhai::{Array, Dynamic, Engine, Map};

fn bounds_array(path: &BezierPath) -> Array {
    let r = path.bounds();
    vec![
        Dynamic::from_float(r.x0),
        Dynamic::from_float(r.y0),
        Dynamic::from_float(r.width()),
        Dynamic::from_float(r.height()),
    ]
}

fn register_path_type(engine: &mut Engine, bot: &SharedBot) {
    engine.register_type_with_name::<BezierPath>("BezierPath");

    let b = bot.clone();
    engine.register_fn("BezierPath", move || {
        with_bot(&b, |bot| {
            let mode = bot.transform(None);
            Ok(BezierPath::new(
                bot.current_style(),
                bot.current_transform().clone(),
                mode,
            ))
        })
    });

    engine.register_fn(
        "moveto",
        |p: &mut BezierPath, x: Dynamic, y: Dynamic| -> ScriptResult<()> {
            p.moveto(num(&x)?, num(&y)?);
            Ok(())
        },
    );
    engine.register_fn(
        "lineto",
        |p: &mut BezierPath, x: Dynamic, y: Dynamic| -> ScriptResult<()> {
            p.lineto(num(&x)?, num(&y)?);
            Ok(())
        },
    );
    engine.register_fn(
        "curveto",
        |p: &mut BezierPath,
         x1: Dynamic,
         y1: Dynamic,
         x2: Dynamic,
         y2: Dynamic,
         x3: Dynamic,
         y3: Dynamic|
         -> ScriptResult<()> {
            p.curveto(num(&x1)?, num(&y1)?, num(&x2)?, num(&y2)?, num(&x3)?, num(&y3)?);
            Ok(())
        },
    );
    engine.register_fn("closepath", |p: &mut BezierPath| p.closepath());
    engine.register_fn(
        "relmoveto",
        |p: &mut BezierPath, dx: Dynamic, dy: Dynamic| -> ScriptResult<()> {
            p.relmoveto(num(&dx)?, num(&dy)?);
            Ok(())
        },
    );
    engine.register_fn(
        "rellineto",
        |p: &mut BezierPath, dx: Dynamic, dy: Dynamic| -> ScriptResult<()> {
            p.rellineto(num(&dx)?, num(&dy)?);
            Ok(())
        },
    );
    engine.register_fn(
        "relcurveto",
        |p: &mut BezierPath,
         h1x: Dynamic,
         h1y: Dynamic,
         h2x: Dynamic,
         h2y: Dynamic,
         x: Dynamic,
         y: Dynamic|
         -> ScriptResult<()> {
            p.relcurveto(num(&h1x)?, num(&h1y)?, num(&h2x)?, num(&h2y)?, num(&x)?, num(&y)?);
            Ok(())
        },
    );
    engine.register_fn(
        "rect",
        |p: &mut BezierPath, x: Dynamic, y: Dynamic, w: Dynamic, h: Dynamic| -> ScriptResult<()> {
            p.rect(num(&x)?, num(&y)?, num(&w)?, num(&h)?, 0.0, RectMode::Corner);
            Ok(())
        },
    );
    engine.register_fn(
        "rect",
        |p: &mut BezierPath,
         x: Dynamic,
         y: Dynamic,
         w: Dynamic,
         h: Dynamic,
         roundness: Dynamic|
         -> ScriptResult<()> {
            p.rect(
                num(&x)?,
                num(&y)?,
                num(&w)?,
                num(&h)?,
                num(&roundness)?,
                RectMode::Corner,
            );
            Ok(())
        },
    );
    engine.register_fn(
        "ellipse",
        |p: &mut BezierPath, x: Dynamic, y: Dynamic, w: Dynamic, h: Dynamic| -> ScriptResult<()> {
            p.ellipse(num(&x)?, num(&y)?, num(&w)?, num(&h)?);
            Ok(())
        },
    );

    engine.register_fn("bounds", |p: &mut BezierPath| bounds_array(p));
    engine.register_fn("center", |p: &mut BezierPath| {
        let c = p.center();
        float_pair(c.x, c.y)
    });
    engine.register_get("closed", |p: &mut BezierPath| p.is_closed());
    engine.register_get("empty", |p: &mut BezierPath| p.is_empty());
    engine.register_fn("to_string", |p: &mut BezierPath| {
        format!("BezierPath({} elements)", p.geometry.elements().len())
    });
}

fn beginpath(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let start = match args.as_slice() {
        [] => None,
        [x, y] => Some((num(x)?, num(y)?)),
        _ => {
            return Err(script_error(
                "beginpath() takes either no arguments or a start point (x, y)",
            ))
        }
    };
    with_bot(bot, |b| {
        b.beginpath(start);
        Ok(Dynamic::UNIT)
    })
}

fn curveto(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let mut v = [0.0; 6];
    for (i, slot) in v.iter_mut().enumerate() {
        *slot = arg_num(&args, i, "curveto")?;
    }
    with_bot(bot, |b| b.curveto(v[0], v[1], v[2], v[3], v[4], v[5]))?;
    Ok(Dynamic::UNIT)
}

fn relcurveto(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let mut v = [0.0; 6];
    for (i, slot) in v.iter_mut().enumerate() {
        *slot = arg_num(&args, i, "relcurveto")?;
    }
    with_bot(bot, |b| b.relcurveto(v[0], v[1], v[2], v[3], v[4], v[5]))?;
    Ok(Dynamic::UNIT)
}

/// `endpath()`, `endpath(false)` or `endpath(#{draw: false})`.
fn endpath_draw(args: &[Dynamic]) -> ScriptResult<bool> {
    match args.first() {
        None => Ok(true),
        Some(v) if v.is_bool() => v.as_bool().map_err(script_error),
        Some(v) => match v.clone().try_cast::<Map>() {
            Some(map) => map_bool(&map, "draw", true),
            None => Err(script_error("endpath() expects a bool or a keyword map")),
        },
    }
}

fn findpath(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let list = args
        .first()
        .and_then(|v| v.clone().try_cast::<Array>())
        .ok_or_else(|| script_error("findpath() expects a list of points"))?;
    let pts = points(&list)?;
    let curvature = match args.get(1) {
        Some(c) => num(c)?,
        None => 1.0,
    };
    with_bot(bot, |b| {
        Ok(b.findpath(&pts, curvature)
            .map(Dynamic::from)
            .unwrap_or(Dynamic::UNIT))
    })
}

/// Register path functions.
pub fn register(engine: &mut Engine, bot: SharedBot) {
    register_path_type(engine, &bot);

    register_variadic(engine, "beginpath", &bot, 0..=2, beginpath);

    let b = bot.clone();
    engine.register_fn("moveto", move |x: Dynamic, y: Dynamic| -> ScriptResult<()> {
        let (x, y) = (num(&x)?, num(&y)?);
        with_bot(&b, |bot| bot.moveto(x, y))
    });
    let b = bot.clone();
    engine.register_fn("lineto", move |x: Dynamic, y: Dynamic| -> ScriptResult<()> {
        let (x, y) = (num(&x)?, num(&y)?);
        with_bot(&b, |bot| bot.lineto(x, y))
    });
    register_variadic(engine, "curveto", &bot, 6..=6, curveto);
    let b = bot.clone();
    engine.register_fn("closepath", move || with_bot(&b, |bot| bot.closepath()));
    let b = bot.clone();
    engine.register_fn("relmoveto", move |x: Dynamic, y: Dynamic| -> ScriptResult<()> {
        let (x, y) = (num(&x)?, num(&y)?);
        with_bot(&b, |bot| bot.relmoveto(x, y))
    });
    let b = bot.clone();
    engine.register_fn("rellineto", move |x: Dynamic, y: Dynamic| -> ScriptResult<()> {
        let (x, y) = (num(&x)?, num(&y)?);
        with_bot(&b, |bot| bot.rellineto(x, y))
    });
    register_variadic(engine, "relcurveto", &bot, 6..=6, relcurveto);

    let b = bot.clone();
    engine.register_fn("endpath", move || with_bot(&b, |bot| bot.endpath(true)));
    let b = bot.clone();
    engine.register_fn("endpath", move |opt: Dynamic| -> ScriptResult<BezierPath> {
        let draw = endpath_draw(std::slice::from_ref(&opt))?;
        with_bot(&b, |bot| bot.endpath(draw))
    });

    let b = bot.clone();
    engine.register_fn("drawpath", move |path: BezierPath| {
        with_bot(&b, |bot| {
            bot.drawpath(&path);
            Ok(())
        })
    });
    let b = bot.clone();
    engine.register_fn("autoclosepath", move || {
        with_bot(&b, |bot| {
            bot.autoclosepath(true);
            Ok(())
        })
    });
    let b = bot.clone();
    engine.register_fn("autoclosepath", move |close: bool| {
        with_bot(&b, |bot| {
            bot.autoclosepath(close);
            Ok(())
        })
    });

    register_variadic(engine, "findpath", &bot, 1..=2, findpath);

    // ========== CLIPPING ==========
    let b = bot.clone();
    engine.register_fn("beginclip", move |path: BezierPath| {
        with_bot(&b, |bot| {
            bot.beginclip(&path);
            Ok(())
        })
    });
    let b = bot;
    engine.register_fn("endclip", move || {
        with_bot(&b, |bot| {
            bot.endclip();
            Ok(())
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpath_accepts_bool_or_map() {
        assert!(endpath_draw(&[]).unwrap());
        assert!(!endpath_draw(&[Dynamic::FALSE]).unwrap());
        let mut map = Map::new();
        map.insert("draw".into(), Dynamic::FALSE);
        assert!(!endpath_draw(&[Dynamic::from_map(map)]).unwrap());
        assert!(endpath_draw(&[Dynamic::from_int(1)]).is_err());
    }

    #[test]
    fn bounds_are_x_y_w_h() {
        let mut p = BezierPath::default();
        p.rect(10.0, 20.0, 30.0, 40.0, 0.0, RectMode::Corner);
        let b: Vec<f64> = bounds_array(&p)
            .into_iter()
            .map(|d| d.as_float().unwrap())
            .collect();
        assert_eq!(b, vec![10.0, 20.0, 30.0, 40.0]);
    }
}
