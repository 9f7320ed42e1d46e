//! # Scripting Module
//!
//! Rhai scripting API bindings for Easel.
//!
//! ## Responsibilities
//! - **Engine Setup**: Registers every drawing verb as a native function.
//! - **Namespace**: Resolves constants, canvas dimensions, `FRAME` and declared
//!   variables by name, inside hooks as well as at the top level.
//! - **Keyword Arguments**: A trailing object map carries optional arguments,
//!   e.g. `rect(10, 10, 50, 50, #{ roundness: 0.2, fill: "#f00" })`.
//!
//! ## Pattern
//! All bindings follow: `engine.register_fn("name", move |...| with_bot(&bot, |b| ...))`
//!
//! ## Module Structure
//! - `utils`: Argument conversion helpers
//! - `api/`: Sub-modules for shapes, paths, transforms, color, text, images, variables, utility and output

mod api;
pub mod utils;

use crate::bot::SharedBot;
use crate::types::{CM, INCH, MM};
use crate::variables::VarValue;
use rhai::{Dynamic, Engine};

/// Registers the drawing API into the provided Rhai `Engine`.
pub fn register_rhai_api(engine: &mut Engine, bot: SharedBot) {
    engine.set_max_expr_depths(0, 0);
    register_namespace(engine, bot.clone());
    api::register_all(engine, bot);
}

/// String constants accepted by the mode verbs.
fn constant(name: &str) -> Option<Dynamic> {
    let value = match name {
        "RGB" => "rgb",
        "HSB" => "hsb",
        "CORNER" => "corner",
        "CENTER" => "center",
        "CORNERS" => "corners",
        "NORMAL" => "normal",
        "FORTYFIVE" => "fortyfive",
        "LEFT" => "left",
        "RIGHT" => "right",
        "JUSTIFY" => "justify",
        "NUMBER" => "number",
        "TEXT" => "text",
        "BOOLEAN" => "boolean",
        "BUTTON" => "button",
        "inch" => return Some(Dynamic::from_float(INCH)),
        "cm" => return Some(Dynamic::from_float(CM)),
        "mm" => return Some(Dynamic::from_float(MM)),
        _ => return None,
    };
    Some(value.into())
}

pub(crate) fn var_to_dynamic(value: VarValue) -> Dynamic {
    match value {
        VarValue::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
            Dynamic::from_int(n as i64)
        }
        VarValue::Number(n) => Dynamic::from_float(n),
        VarValue::Boolean(b) => Dynamic::from_bool(b),
        VarValue::Text(s) => s.into(),
    }
}

/// Installs the variable resolver. Script locals always shadow resolved names.
fn register_namespace(engine: &mut Engine, bot: SharedBot) {
    engine.on_var(move |name, index, _context| {
        if index > 0 {
            return Ok(None);
        }
        if let Some(value) = constant(name) {
            return Ok(Some(value));
        }
        let Ok(b) = bot.lock() else {
            return Ok(None);
        };
        let value = match name {
            "WIDTH" => Some(Dynamic::from_int(b.width() as i64)),
            "HEIGHT" => Some(Dynamic::from_int(b.height() as i64)),
            "FRAME" => Some(Dynamic::from_int(b.frame() as i64)),
            _ => b.variables.value(name).map(var_to_dynamic),
        };
        Ok(value)
    });
}
