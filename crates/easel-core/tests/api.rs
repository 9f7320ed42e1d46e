//! Scripting API Tests
//!
//! Drives the Rhai bindings with script strings and inspects the resulting
//! display list and drawing state.

use easel_core::grob::Grob;
use easel_core::scripting::register_rhai_api;
use easel_core::types::Color;
use easel_core::{Bot, DefaultAssetLoader};
use rhai::Engine;

fn run(script: &str) -> Bot {
    let bot = Bot::default().into_shared();
    let mut engine = Engine::new();
    register_rhai_api(&mut engine, bot.clone());

    if let Err(e) = engine.run(script) {
        panic!("Rhai script failed: {}", e);
    }
    let result = bot.lock().unwrap().clone();
    result
}

fn run_err(script: &str) -> String {
    let bot = Bot::default().into_shared();
    let mut engine = Engine::new();
    register_rhai_api(&mut engine, bot);
    match engine.run(script) {
        Ok(()) => panic!("script should have failed: {}", script),
        Err(e) => e.to_string(),
    }
}

fn paths(bot: &Bot) -> Vec<&easel_core::path::BezierPath> {
    bot.canvas
        .grobs()
        .iter()
        .filter_map(|g| match g {
            Grob::Path(p) => Some(p),
            _ => None,
        })
        .collect()
}

/// Test shape verbs and keyword arguments.
///
/// Validates:
/// - Every shape verb adds one path
/// - `draw: false` keeps a shape off the canvas
/// - Keyword colors override the current fill for that shape only
#[test]
fn shapes_and_keywords() {
    let bot = run(r##"
        rect(10, 10, 50, 50);
        rect(10, 10, 50, 50, 0.3);
        oval(0, 0, 20, 10);
        ellipse(0, 0, 20, 10);
        circle(5, 5, 10);
        line(0, 0, 100, 100);
        arrow(50, 50, 40);
        arrow(50, 50, 40, FORTYFIVE);
        star(50, 50);
        star(50, 50, 5, 40, 20);
        let hidden = rect(0, 0, 5, 5, #{ draw: false });
        rect(0, 0, 5, 5, #{ fill: "#ff0000", stroke: (), strokewidth: 4 });
    "##);

    let shapes = paths(&bot);
    assert_eq!(shapes.len(), 11);

    let last = shapes[10];
    assert_eq!(last.style.fill, Some(Color::new(1.0, 0.0, 0.0, 1.0)));
    assert_eq!(last.style.stroke, None);
    assert_eq!(last.style.strokewidth, 4.0);

    // The keyword fill did not leak into the state.
    assert_eq!(bot.current_style().fill, Some(Color::gray(0.2, 1.0)));

    // line() is an open path.
    assert!(!shapes[5].is_closed());
}

/// Test rect modes through the API.
///
/// Validates that CENTER and CORNERS change how rect() reads its arguments.
#[test]
fn rect_modes() {
    let bot = run(r#"
        rectmode(CENTER);
        rect(50, 50, 20, 10);
        rectmode(CORNERS);
        rect(10, 10, 30, 40);
    "#);
    let shapes = paths(&bot);
    let centered = shapes[0].bounds();
    assert_eq!((centered.x0, centered.y0, centered.x1, centered.y1), (40.0, 45.0, 60.0, 55.0));
    let corners = shapes[1].bounds();
    assert_eq!((corners.x0, corners.y0, corners.x1, corners.y1), (10.0, 10.0, 30.0, 40.0));
}

/// Test color state verbs.
///
/// Validates:
/// - fill/stroke/nofill/nostroke/strokewidth change the current style
/// - colorrange scales numeric components
/// - HSB mode converts to RGB
/// - fill() with no arguments returns the current fill
#[test]
fn color_state() {
    let bot = run(r##"
        colorrange(255);
        fill(255, 0, 0);
        stroke("#00ff00");
        strokewidth(3);
        let f = fill();
        if f.r != 1.0 || f.g != 0.0 { throw "fill() returned " + f.r; }
        let c = color(0, 0, 255, 255);
        if c.b != 1.0 { throw "color() blue is " + c.b; }
        rect(0, 0, 10, 10);
        nofill();
        nostroke();
        colormode(HSB, 1.0);
    "##);
    let shapes = paths(&bot);
    assert_eq!(shapes[0].style.fill, Some(Color::new(1.0, 0.0, 0.0, 1.0)));
    assert_eq!(shapes[0].style.stroke, Some(Color::new(0.0, 1.0, 0.0, 1.0)));
    assert_eq!(shapes[0].style.strokewidth, 3.0);
    assert_eq!(bot.current_style().fill, None);
    assert_eq!(bot.current_style().stroke, None);

    let hsb = run(r#"colormode(HSB); fill(0, 1, 1); rect(0, 0, 1, 1);"#);
    let red = paths(&hsb)[0].style.fill.unwrap();
    assert!((red.r - 1.0).abs() < 1e-9 && red.g.abs() < 1e-9 && red.b.abs() < 1e-9);
}

/// Test background().
///
/// Validates that the background covers the whole canvas, ignores the
/// current transform and is not stroked.
#[test]
fn background_covers_canvas() {
    let bot = run(r#"
        size(300, 100);
        stroke(0);
        translate(50, 50);
        background(1, 1, 1);
    "#);
    let bg = paths(&bot)[0];
    assert!(bg.transform.is_identity());
    assert_eq!(bg.style.stroke, None);
    let b = bg.bounds();
    assert_eq!((b.x0, b.y0, b.x1, b.y1), (0.0, 0.0, 300.0, 100.0));
}

/// Test the current-path verbs.
///
/// Validates:
/// - beginpath/lineto/endpath build and draw a closed path
/// - endpath(false) returns the path without drawing it
/// - BezierPath objects can be edited and drawn with drawpath()
#[test]
fn path_building() {
    let bot = run(r#"
        beginpath(10, 10);
        lineto(40, 10);
        lineto(40, 40);
        let p = endpath();
        if !p.closed { throw "endpath() should close the path"; }

        beginpath();
        moveto(0, 0);
        curveto(10, 0, 20, 10, 20, 20);
        relcurveto(0, 5, 5, 10, 10, 10);
        let q = endpath(false);

        autoclosepath(false);
        beginpath(0, 0);
        rellineto(10, 0);
        relmoveto(0, 10);
        let open = endpath(#{ draw: false });
        if open.closed { throw "autoclosepath(false) ignored"; }

        let r = BezierPath();
        r.moveto(0, 0);
        r.lineto(5, 5);
        r.rect(10, 10, 5, 5);
        r.ellipse(20, 20, 5, 5);
        r.closepath();
        drawpath(r);
        let b = r.bounds();
        if b[2] != 25.0 { throw "bounds width is " + b[2]; }
    "#);
    assert_eq!(bot.canvas.len(), 2);
}

/// Test path errors.
///
/// Validates that editing without a current path, or starting one with a
/// lone coordinate, fails with a clear message.
#[test]
fn path_verbs_require_beginpath() {
    let msg = run_err("lineto(10, 10);");
    assert!(msg.contains("beginpath"), "{}", msg);
    let msg = run_err("endpath();");
    assert!(msg.contains("beginpath"), "{}", msg);
    let msg = run_err("beginpath(10);");
    assert!(msg.contains("start point"), "{}", msg);
}

/// Test findpath().
///
/// Validates point formats, the empty case and that the result is not drawn.
#[test]
fn findpath_variants() {
    let bot = run(r#"
        let p = findpath([[0, 0], [50, 50], #{ x: 100, y: 0 }], 0.5);
        if type_of(p) != "BezierPath" { throw "findpath() returned " + type_of(p); }
        let none = findpath([]);
        if type_of(none) != "()" { throw "empty findpath() should be ()"; }
        let straight = findpath([[0, 0], [10, 10], [20, 0]], 0);
        drawpath(p);
    "#);
    assert_eq!(bot.canvas.len(), 1);
}

/// Test transforms.
///
/// Validates:
/// - translate() is captured by later shapes
/// - push()/pop() restore the transform
/// - reset() clears it
/// - pop() on an empty stack is an error
#[test]
fn transforms() {
    let bot = run(r#"
        translate(10, 20);
        rect(0, 0, 10, 10);
        push();
        rotate(45);
        scale(2);
        skew(10);
        pop();
        rect(0, 0, 10, 10);
        reset();
        rect(0, 0, 10, 10);
        rotate(#{ radians: 1.0 });
        scale(2, 3);
        skew(5, 5);
        transform(CORNER);
    "#);
    let shapes = paths(&bot);
    let [_, _, _, _, e, f] = shapes[0].matrix().as_coeffs();
    assert_eq!((e, f), (10.0, 20.0));
    assert_eq!(shapes[1].matrix(), shapes[0].matrix());
    assert!(shapes[2].transform.is_identity());

    let msg = run_err("pop();");
    assert!(msg.contains("pop()"), "{}", msg);
}

/// Test raw matrices.
///
/// Validates that apply_matrix() composes with translate() and rotate() and
/// accepts either six numbers or a six-element array.
#[test]
fn apply_matrix_composes() {
    let bot = run(r#"
        translate(10, 0);
        apply_matrix(1, 0, 0, 1, 5, 5);
        rect(0, 0, 10, 10);
        reset();
        apply_matrix([2, 0, 0, 2, 0, 0]);
        rotate(90);
        rect(0, 0, 10, 10);
    "#);
    let shapes = paths(&bot);

    let [a, b, c, d, e, f] = shapes[0].matrix().as_coeffs();
    assert_eq!((a, b, c, d, e, f), (1.0, 0.0, 0.0, 1.0, 15.0, 5.0));

    // Scaled by two, then turned a quarter around the shape's center.
    let m = shapes[1].matrix();
    let center = m * kurbo::Point::new(5.0, 5.0);
    assert!((center.x - 10.0).abs() < 1e-9 && (center.y - 10.0).abs() < 1e-9, "{:?}", center);
    let [a, b, _, _, _, _] = m.as_coeffs();
    assert!(a.abs() < 1e-9 && (b.abs() - 2.0).abs() < 1e-9, "{:?}", m);

    let msg = run_err("apply_matrix([1, 2, 3]);");
    assert!(msg.contains("6 values"), "{}", msg);
}

/// Test mode validation.
///
/// Validates that unknown mode strings are rejected with the offending value.
#[test]
fn invalid_modes() {
    assert!(run_err(r#"colormode("cmyk");"#).contains("cmyk"));
    assert!(run_err(r#"rectmode("sideways");"#).contains("sideways"));
    assert!(run_err(r#"transform("skewed");"#).contains("skewed"));
    assert!(run_err(r#"align("middle");"#).contains("middle"));
}

/// Test clipping.
///
/// Validates that beginclip/endclip record a clip and a restore.
#[test]
fn clipping_records_restore() {
    let bot = run(r#"
        let mask = circle(50, 50, 40, #{ draw: false });
        beginclip(mask);
        rect(0, 0, 100, 100);
        endclip();
    "#);
    let kinds: Vec<&str> = bot.canvas.grobs().iter().map(|g| g.kind()).collect();
    assert_eq!(kinds.len(), 3);
    assert!(matches!(bot.canvas.grobs()[0], Grob::Clip(_)));
    assert!(matches!(bot.canvas.grobs()[2], Grob::Restore));
}

/// Test canvas and namespace values.
///
/// Validates that WIDTH/HEIGHT follow size(), units resolve and locals shadow names.
#[test]
fn namespace_values() {
    let bot = run(r#"
        size(320, 240);
        if WIDTH != 320 || HEIGHT != 240 { throw "WIDTH/HEIGHT not updated"; }
        if inch != 72.0 { throw "inch is " + inch; }
        let WIDTH = 5;
        if WIDTH != 5 { throw "locals must shadow WIDTH"; }
        let s = size();
        if s[0] != 320 { throw "size() returned " + s; }
        if speed(24) != 24.0 { throw "speed() not set"; }
    "#);
    assert_eq!((bot.width(), bot.height()), (320.0, 240.0));
    assert_eq!(bot.frame(), 0);
}

/// Test utility functions.
///
/// Validates the result shapes of random, choice, shuffled and grid.
#[test]
fn utilities() {
    run(r#"
        let r = random();
        if r < 0.0 || r >= 1.0 { throw "random() out of range"; }
        let i = random(10);
        if type_of(i) != "i64" || i < 0 || i >= 10 { throw "random(10) gave " + i; }
        let f = random(2.0);
        if type_of(f) != "f64" { throw "random(2.0) should be a float"; }
        let between = random(5, 7);
        if between < 5 || between > 7 { throw "random(5, 7) gave " + between; }
        let c = choice([1, 2, 3]);
        if c < 1 || c > 3 { throw "choice gave " + c; }
        let s = shuffled([1, 2, 3, 4]);
        if s.len() != 4 { throw "shuffled lost items"; }
        let g = grid(3, 2, 10, 20);
        if g.len() != 6 { throw "grid size " + g.len(); }
        if g[4][0] != 10 || g[4][1] != 20 { throw "grid is not row-major"; }
        let gs = grid(2, 2, 1.5, 1.5, true);
        if gs.len() != 4 { throw "shuffled grid size"; }
    "#);
    assert!(run_err("choice([]);").contains("empty"));
}

/// Test text verbs.
///
/// Validates text grobs, outlines and metrics when a default font is available.
#[test]
fn text_verbs() {
    use easel_core::AssetLoader;
    if DefaultAssetLoader.load_default_font().is_err() {
        eprintln!("no default font available; skipping");
        return;
    }
    let bot = run(r#"
        fontsize(24);
        lineheight(1.2);
        align(CENTER);
        let t = text("Hello", 10, 40);
        if t.text != "Hello" { throw "text getter"; }
        let p = text("Hi", 10, 80, #{ outline: true });
        if type_of(p) != "BezierPath" { throw "outline should give a path"; }
        let hidden = textpath("Path", 0, 0);
        let m = textmetrics("Hello");
        if m[0] <= 0.0 || m[1] <= 0.0 { throw "textmetrics " + m; }
        if textwidth("Hello") != m[0] { throw "textwidth mismatch"; }
        if textheight("a\nb") <= textheight("a") { throw "two lines should be taller"; }
        text("wrap these words please", 0, 120, 60);
    "#);
    let grobs = bot.canvas.grobs();
    assert_eq!(grobs.len(), 3);
    assert!(matches!(grobs[0], Grob::Text(_)));
    assert!(matches!(grobs[1], Grob::Path(_)));
    match &grobs[2] {
        Grob::Text(t) => assert_eq!(t.width, Some(60.0)),
        other => panic!("expected text, got {}", other.kind()),
    }
}
