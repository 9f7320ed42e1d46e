//! # API Module
//!
//! Aggregates all Rhai API sub-modules and provides a single registration point.
//!
//! ## Sub-modules
//! - **shapes**: rect, oval/ellipse, circle, line, arrow, star
//! - **paths**: BezierPath type, path construction verbs, findpath, clipping
//! - **transforms**: transform mode, translate/rotate/scale/skew, push/pop/reset
//! - **color**: Color type, color modes, fill and stroke, background
//! - **text**: font selection, text, textpath, text metrics
//! - **images**: image, imagesize, drawimage
//! - **variables**: var, setvars, getvar
//! - **util**: random, choice, shuffled, grid, files
//! - **output**: size, speed, finish, snapshot

pub mod color;
pub mod images;
pub mod output;
pub mod paths;
pub mod shapes;
pub mod text;
pub mod transforms;
pub mod util;
pub mod variables;

use crate::bot::SharedBot;
use rhai::Engine;

/// Register all API functions with the Rhai engine.
pub fn register_all(engine: &mut Engine, bot: SharedBot) {
    color::register(engine, bot.clone());
    shapes::register(engine, bot.clone());
    paths::register(engine, bot.clone());
    transforms::register(engine, bot.clone());
    text::register(engine, bot.clone());
    images::register(engine, bot.clone());
    variables::register(engine, bot.clone());
    output::register(engine, bot.clone());
    util::register(engine, bot);
}
