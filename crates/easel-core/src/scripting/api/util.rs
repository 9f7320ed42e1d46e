//! # Utility API
//!
//! ## Responsibilities
//! - **Randomness**: `random`, `choice`, `shuffled`
//! - **Layout**: `grid`
//! - **Files**: `files(pattern)` lists files matching a glob pattern

use crate::bot::SharedBot;
use crate::scripting::utils::{num, script_error, with_bot, ScriptResult};
use rand::seq::SliceRandom;
use rand::Rng;
use glob::{Pattern, PatternError};
use rhai::{Array, Dynamic, Engine, FLOAT, INT};
use std::path::Path;
use tracing::debug;

/// `random(n)`: an int below `n` for an int, a float in `0..n` otherwise.
fn random_below(rng: &mut impl Rng, n: &Dynamic) -> ScriptResult<Dynamic> {
    if let Ok(n) = n.as_int() {
        return Ok(Dynamic::from_int((rng.gen::<FLOAT>() * n as FLOAT) as INT));
    }
    Ok(Dynamic::from_float(rng.gen::<FLOAT>() * num(n)?))
}

/// `random(a, b)`: an int in `min..=max` when both are ints, a float otherwise.
fn random_between(rng: &mut impl Rng, a: &Dynamic, b: &Dynamic) -> ScriptResult<Dynamic> {
    if let (Ok(a), Ok(b)) = (a.as_int(), b.as_int()) {
        let (lo, hi) = (a.min(b), a.max(b));
        return Ok(Dynamic::from_int(rng.gen_range(lo..=hi)));
    }
    let (a, b) = (num(a)?, num(b)?);
    let (lo, hi) = (a.min(b), a.max(b));
    Ok(Dynamic::from_float(lo + rng.gen::<FLOAT>() * (hi - lo)))
}

fn scaled(index: INT, size: &Dynamic) -> ScriptResult<Dynamic> {
    match size.as_int() {
        Ok(s) => Ok(Dynamic::from_int(index * s)),
        Err(_) => Ok(Dynamic::from_float(index as FLOAT * num(size)?)),
    }
}

/// Row-major `[x, y]` positions of a `cols` x `rows` grid.
fn grid(
    cols: INT,
    rows: INT,
    colsize: &Dynamic,
    rowsize: &Dynamic,
    shuffle: bool,
) -> ScriptResult<Array> {
    let mut cells = Array::new();
    for y in 0..rows.max(0) {
        for x in 0..cols.max(0) {
            cells.push(Dynamic::from_array(vec![
                scaled(x, colsize)?,
                scaled(y, rowsize)?,
            ]));
        }
    }
    if shuffle {
        cells.shuffle(&mut rand::thread_rng());
    }
    Ok(cells)
}

/// Files matching a glob pattern, sorted.
///
/// Relative patterns are looked up under `base` and returned relative to it.
/// `*`, `?`, `[...]` classes and wildcards in directory components all match.
pub fn files(pattern: &str, base: Option<&Path>) -> Result<Vec<String>, PatternError> {
    let root = base.filter(|_| Path::new(pattern).is_relative());
    let full = match root {
        Some(root) => format!("{}/{}", Pattern::escape(&root.to_string_lossy()), pattern),
        None => pattern.to_string(),
    };

    let mut found: Vec<String> = glob::glob(&full)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(error = %e, "Skipping unreadable path");
                None
            }
        })
        .filter(|path| path.is_file())
        .map(|path| {
            let shown = root
                .and_then(|root| path.strip_prefix(root).ok())
                .unwrap_or(path.as_path());
            shown.to_string_lossy().replace('\\', "/")
        })
        .collect();
    found.sort();
    Ok(found)
}

/// Register utility functions.
pub fn register(engine: &mut Engine, bot: SharedBot) {
    engine.register_fn("random", || rand::thread_rng().gen::<FLOAT>());
    engine.register_fn("random", |n: Dynamic| {
        random_below(&mut rand::thread_rng(), &n)
    });
    engine.register_fn("random", |a: Dynamic, b: Dynamic| {
        random_between(&mut rand::thread_rng(), &a, &b)
    });

    engine.register_fn("choice", |list: Array| -> ScriptResult<Dynamic> {
        list.choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| script_error("choice() from an empty list"))
    });
    engine.register_fn("shuffled", |mut list: Array| {
        list.shuffle(&mut rand::thread_rng());
        list
    });

    engine.register_fn("grid", |cols: INT, rows: INT| {
        grid(cols, rows, &Dynamic::from_int(1), &Dynamic::from_int(1), false)
    });
    engine.register_fn(
        "grid",
        |cols: INT, rows: INT, colsize: Dynamic, rowsize: Dynamic| {
            grid(cols, rows, &colsize, &rowsize, false)
        },
    );
    engine.register_fn(
        "grid",
        |cols: INT, rows: INT, colsize: Dynamic, rowsize: Dynamic, shuffle: bool| {
            grid(cols, rows, &colsize, &rowsize, shuffle)
        },
    );

    engine.register_fn("files", move |pattern: &str| -> ScriptResult<Array> {
        let base = with_bot(&bot, |b| Ok(b.assets.base_dir.clone()))?;
        let found = files(pattern, base.as_deref())
            .map_err(|e| script_error(format!("files(): invalid pattern '{}': {}", pattern, e)))?;
        Ok(found
            .into_iter()
            .map(Dynamic::from)
            .collect())
    });
}
