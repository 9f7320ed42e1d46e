//! Rendering Tests
//!
//! Renders scripts to files and checks the pixels (PNG) or the document
//! structure (SVG, PDF, PostScript).

use easel_core::{EaselError, Sketch, SketchOptions};
use image::RgbaImage;
use std::path::Path;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

fn render_png(script: &str, dir: &Path) -> RgbaImage {
    init_logging();
    let out = dir.join("out.png");
    let mut sketch = Sketch::from_source(script);
    if let Err(e) = sketch.render(&out) {
        panic!("render failed: {}", e);
    }
    image::open(&out).expect("decodable PNG").to_rgba8()
}

fn px(img: &RgbaImage, x: u32, y: u32) -> [u8; 4] {
    img.get_pixel(x, y).0
}

/// Test basic raster output.
///
/// Validates:
/// - The PNG has the canvas size
/// - Background and fill colors land on the expected pixels
/// - Uncovered pixels stay transparent
#[test]
fn png_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let img = render_png(
        r#"
        size(40, 20);
        fill(1, 0, 0);
        rect(10, 5, 10, 10);
        "#,
        dir.path(),
    );
    assert_eq!(img.dimensions(), (40, 20));
    assert_eq!(px(&img, 15, 10), [255, 0, 0, 255]);
    assert_eq!(px(&img, 2, 2)[3], 0);

    let img = render_png(
        r#"
        size(20, 20);
        background(1, 1, 1);
        fill(0, 0, 1);
        rect(0, 0, 10, 10);
        "#,
        dir.path(),
    );
    assert_eq!(px(&img, 5, 5), [0, 0, 255, 255]);
    assert_eq!(px(&img, 15, 15), [255, 255, 255, 255]);
}

/// Test transforms at paint time.
///
/// Validates that translation moves the shape and that a 90 degree rotation
/// pivots around the shape's center.
#[test]
fn transformed_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let img = render_png(
        r#"
        size(40, 40);
        fill(1, 0, 0);
        translate(20, 0);
        rect(0, 0, 10, 10);
        "#,
        dir.path(),
    );
    assert_eq!(px(&img, 25, 5), [255, 0, 0, 255]);
    assert_eq!(px(&img, 5, 5)[3], 0);

    let img = render_png(
        r#"
        size(40, 40);
        fill(0, 1, 0);
        rotate(90);
        rect(0, 16, 40, 8);
        "#,
        dir.path(),
    );
    // A horizontal bar through the middle becomes a vertical one.
    assert_eq!(px(&img, 20, 4), [0, 255, 0, 255]);
    assert_eq!(px(&img, 4, 20)[3], 0);
}

/// Test clipping at paint time.
///
/// Validates that drawing between beginclip and endclip is masked and that
/// drawing after endclip is not.
#[test]
fn clipped_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let img = render_png(
        r#"
        size(40, 20);
        fill(0, 0, 1);
        beginclip(rect(0, 0, 20, 20, #{ draw: false }));
        rect(0, 0, 40, 20);
        endclip();
        fill(1, 0, 0);
        rect(30, 0, 10, 5);
        "#,
        dir.path(),
    );
    assert_eq!(px(&img, 10, 10), [0, 0, 255, 255]);
    assert_eq!(px(&img, 25, 10)[3], 0);
    assert_eq!(px(&img, 35, 2), [255, 0, 0, 255]);
}

/// Test letterboxed output.
///
/// Validates that a wide canvas fitted into a square is scaled by width and
/// centered vertically.
#[test]
fn fitted_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("fit.png");
    let mut sketch = Sketch::from_source("size(100, 50); background(1, 0, 0);").with_options(
        SketchOptions {
            fit: Some((200, 200)),
            ..SketchOptions::default()
        },
    );
    sketch.render(&out).unwrap();
    let img = image::open(&out).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (200, 200));
    assert_eq!(px(&img, 100, 100), [255, 0, 0, 255]);
    assert_eq!(px(&img, 100, 10)[3], 0);
    assert_eq!(px(&img, 100, 190)[3], 0);
}

/// Test vector formats.
///
/// Validates that the extension picks the backend and each file is well formed.
#[test]
fn vector_formats() {
    let dir = tempfile::tempdir().unwrap();
    let script = r#"
        size(50, 50);
        stroke(0);
        fill(1, 0, 0, 0.5);
        ellipse(5, 5, 40, 40);
    "#;

    let svg = dir.path().join("out.svg");
    Sketch::from_source(script).render(&svg).unwrap();
    let text = std::fs::read_to_string(&svg).unwrap();
    assert!(text.contains("<svg"), "{}", text);

    let pdf = dir.path().join("out.pdf");
    Sketch::from_source(script).render(&pdf).unwrap();
    assert!(std::fs::read(&pdf).unwrap().starts_with(b"%PDF"));

    let ps = dir.path().join("OUT.PS");
    Sketch::from_source(script).render(&ps).unwrap();
    let text = std::fs::read_to_string(&ps).unwrap();
    assert!(text.starts_with("%!PS-Adobe-3.0"));
    assert!(text.contains("curveto"));
    assert!(text.contains("setrgbcolor"));
}

/// Test unsupported output.
///
/// Validates that an unknown extension fails with UnsupportedFormat.
#[test]
fn unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let result = Sketch::from_source("rect(0, 0, 10, 10);").render(dir.path().join("out.gif"));
    assert!(matches!(result, Err(EaselError::UnsupportedFormat(_))));
}

/// Test images.
///
/// Validates natural size, proportional scaling, imagesize() and that a
/// missing file is skipped instead of failing the script.
#[test]
fn images_draw_and_measure() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("red.png");
    RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]))
        .save(&source)
        .unwrap();

    let script = format!(
        r#"
        size(20, 20);
        let path = {path:?};
        let img = image(path, 0, 0);
        if img.width != 4.0 || img.height != 2.0 {{ throw "natural size " + img.width; }}
        let scaled = image(path, 0, 10, #{{ width: 8, draw: false }});
        if scaled.height != 4.0 {{ throw "proportional height " + scaled.height; }}
        drawimage(scaled);
        let s = imagesize(path);
        if s[0] != 4 || s[1] != 2 {{ throw "imagesize " + s; }}
        let missing = image("does-not-exist.png", 0, 0);
        if type_of(missing) != "()" {{ throw "missing image should be ()"; }}
        "#,
        path = source.to_string_lossy()
    );
    let img = render_png(&script, dir.path());
    assert_eq!(px(&img, 1, 1), [255, 0, 0, 255]);
    assert_eq!(px(&img, 6, 12), [255, 0, 0, 255]);
    assert_eq!(px(&img, 15, 5)[3], 0);
}
