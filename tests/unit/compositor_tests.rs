// Text compositing tests against a real system font
//
// Each test returns early when the machine has no fonts installed.

use image::{Rgba, RgbaImage};

use filigree::geometry::{Point, Rect, Size};
use filigree::raster::{ColorMode, RasterImage};
use filigree::watermark::{
    resolve_anchor, text_box, Anchor, Color, Compositor, FontBook, Placement, ScaleFactors,
    TextWatermarkSpec, WatermarkSpec,
};

fn fonts() -> Option<FontBook> {
    let book = FontBook::system("DejaVu Sans");
    (!book.is_empty()).then_some(book)
}

fn black(w: u32, h: u32) -> RasterImage {
    RasterImage::new(
        RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255])),
        ColorMode::Rgb,
    )
}

fn white_text(text: &str, placement: Placement) -> WatermarkSpec {
    let mut spec = TextWatermarkSpec::new(text);
    spec.color = Color::white();
    spec.opacity = 100;
    WatermarkSpec::new(spec, placement)
}

/// Bounding box of pixels that are no longer black.
fn ink_bounds(image: &RasterImage) -> Option<Rect> {
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (u32::MAX, u32::MAX, 0, 0);
    for (x, y, pixel) in image.pixels().enumerate_pixels() {
        if pixel[0] > 40 {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    (min_x != u32::MAX).then(|| {
        Rect::new(
            min_x as i32,
            min_y as i32,
            max_x - min_x + 1,
            max_y - min_y + 1,
        )
    })
}

#[test]
fn test_bottom_right_text_stays_inside_padding() {
    let Some(fonts) = fonts() else { return };
    let compositor = Compositor::new(&fonts);
    let canvas = black(800, 600);
    let spec = white_text("Filigree", Placement::Anchor(Anchor::BottomRight));

    let out = compositor
        .compose(&canvas, &spec, ScaleFactors::IDENTITY)
        .unwrap();
    let ink = ink_bounds(&out).unwrap();
    assert!(ink.x > 400 && ink.y > 300, "ink at {:?}", ink);
    assert!(ink.right() <= 764, "ink at {:?}", ink);
    assert!(ink.bottom() <= 600, "ink at {:?}", ink);
}

#[test]
fn test_anchor_matches_measured_box() {
    let Some(fonts) = fonts() else { return };
    let compositor = Compositor::new(&fonts);
    let spec = white_text("Center", Placement::Anchor(Anchor::Center));
    let canvas = Size::new(640, 480);

    let text = text_box(&fonts, &spec.text, 1.0).unwrap();
    let expected = resolve_anchor(Anchor::Center, canvas, text);
    let anchor = compositor
        .text_anchor(canvas, &spec, ScaleFactors::IDENTITY)
        .unwrap();
    assert_eq!(anchor, expected);
}

#[test]
fn test_export_scale_grows_text() {
    let Some(fonts) = fonts() else { return };
    let compositor = Compositor::new(&fonts);
    let spec = white_text("Scale", Placement::Absolute(Point::new(20, 80)));

    let small = compositor
        .compose(&black(400, 300), &spec, ScaleFactors::IDENTITY)
        .unwrap();
    let large = compositor
        .compose(&black(800, 600), &spec, ScaleFactors::new(2.0, 2.0))
        .unwrap();

    let small_ink = ink_bounds(&small).unwrap();
    let large_ink = ink_bounds(&large).unwrap();
    let ratio = large_ink.width as f64 / small_ink.width as f64;
    assert!((1.8..=2.2).contains(&ratio), "width ratio {}", ratio);
    assert!((large_ink.x - 2 * small_ink.x).abs() <= 3);
}

#[test]
fn test_rotation_turns_text_footprint() {
    let Some(fonts) = fonts() else { return };
    let compositor = Compositor::new(&fonts);
    let mut spec = white_text("Rotated text", Placement::Absolute(Point::new(200, 100)));

    let flat = compositor
        .compose(&black(400, 400), &spec, ScaleFactors::IDENTITY)
        .unwrap();
    spec.text.rotation = 90.0;
    let turned = compositor
        .compose(&black(400, 400), &spec, ScaleFactors::IDENTITY)
        .unwrap();

    let flat_ink = ink_bounds(&flat).unwrap();
    let turned_ink = ink_bounds(&turned).unwrap();
    assert!(flat_ink.width > flat_ink.height);
    assert!(turned_ink.height > turned_ink.width);
    // Clockwise about the anchor: the text now runs downward from it.
    assert!(turned_ink.y >= 95);
}

#[test]
fn test_zero_opacity_leaves_canvas_untouched() {
    let Some(fonts) = fonts() else { return };
    let compositor = Compositor::new(&fonts);
    let mut spec = white_text("ghost", Placement::Anchor(Anchor::Center));
    spec.text.opacity = 0;
    spec.text.shadow = true;
    let canvas = black(200, 100);

    let out = compositor
        .compose(&canvas, &spec, ScaleFactors::IDENTITY)
        .unwrap();
    assert_eq!(out.pixels(), canvas.pixels());
}
