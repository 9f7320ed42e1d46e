//! # Variables API
//!
//! ## Responsibilities
//! - **Declaration**: `var(name, type, default?, min?, max?)` returns the effective value
//! - **Bulk Form**: `setvars(#{name: value})`
//! - **Lookup**: `getvar(name)`

use crate::bot::SharedBot;
use crate::scripting::utils::{num, opt_num, register_variadic, script_error, with_bot, ScriptResult};
use crate::scripting::var_to_dynamic;
use crate::variables::{VarType, VarValue};
use rhai::{Dynamic, Engine, Map};

fn to_var_value(value: &Dynamic) -> ScriptResult<Option<VarValue>> {
    if value.is_unit() {
        return Ok(None);
    }
    if let Ok(b) = value.as_bool() {
        return Ok(Some(VarValue::Boolean(b)));
    }
    if value.is_string() {
        return Ok(Some(VarValue::Text(value.to_string())));
    }
    Ok(opt_num(value)?.map(VarValue::Number))
}

fn var(bot: &SharedBot, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let name = args
        .first()
        .and_then(|v| v.clone().into_string().ok())
        .ok_or_else(|| script_error("var() expects a name"))?;
    let kind: VarType = args
        .get(1)
        .and_then(|v| v.clone().into_string().ok())
        .ok_or_else(|| script_error("var() expects a type"))?
        .parse()
        .map_err(script_error)?;
    let default = match args.get(2) {
        Some(v) => to_var_value(v)?,
        None => None,
    };
    let min = match args.get(3) {
        Some(v) => opt_num(v)?.unwrap_or(0.0),
        None => 0.0,
    };
    let max = match args.get(4) {
        Some(v) => opt_num(v)?.unwrap_or(255.0),
        None => 255.0,
    };
    let value = with_bot(bot, |b| b.var(&name, kind, default, min, max))?;
    Ok(value.map(var_to_dynamic).unwrap_or(Dynamic::UNIT))
}

/// Register variable functions.
pub fn register(engine: &mut Engine, bot: SharedBot) {
    register_variadic(engine, "var", &bot, 2..=5, var);

    let b = bot.clone();
    engine.register_fn("setvars", move |entries: Map| -> ScriptResult<()> {
        let entries = entries
            .into_iter()
            .map(|(name, v)| Ok((name.to_string(), num(&v)?)))
            .collect::<ScriptResult<Vec<_>>>()?;
        with_bot(&b, |bot| bot.setvars(&entries))
    });

    let b = bot;
    engine.register_fn("getvar", move |name: &str| {
        with_bot(&b, |bot| {
            Ok(bot.getvar(name).map(var_to_dynamic).unwrap_or(Dynamic::UNIT))
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_values_map_to_var_values() {
        assert_eq!(to_var_value(&Dynamic::UNIT).unwrap(), None);
        assert_eq!(
            to_var_value(&Dynamic::TRUE).unwrap(),
            Some(VarValue::Boolean(true))
        );
        assert_eq!(
            to_var_value(&Dynamic::from("hi")).unwrap(),
            Some(VarValue::Text("hi".into()))
        );
        assert_eq!(
            to_var_value(&Dynamic::from_int(7)).unwrap(),
            Some(VarValue::Number(7.0))
        );
    }
}
