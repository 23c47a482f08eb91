// Preview session and export agreement tests

use image::{Rgba, RgbaImage};
use std::time::{Duration, Instant};

use filigree::export::{render_for_export, ExportOptions, SizingPolicy};
use filigree::geometry::{Point, Size};
use filigree::preview::{PreviewSession, RefreshState};
use filigree::raster::{ColorMode, RasterImage};
use filigree::watermark::{
    Compositor, FontBook, ImageWatermarkSpec, LogoSource, Placement, TextWatermarkSpec,
    WatermarkSpec,
};

const FRAME: Duration = Duration::from_millis(16);

fn black(w: u32, h: u32) -> RasterImage {
    RasterImage::new(
        RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255])),
        ColorMode::Rgb,
    )
}

fn logo_spec(dir: &std::path::Path) -> WatermarkSpec {
    let path = dir.join("logo.png");
    RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]))
        .save(&path)
        .unwrap();
    WatermarkSpec::new(TextWatermarkSpec::new(""), Placement::default()).with_image(
        ImageWatermarkSpec {
            opacity: 100,
            placement: Some(Point::new(100, 50)),
            ..ImageWatermarkSpec::new(path, 20, 20)
        },
    )
}

fn is_white(image: &RasterImage, x: u32, y: u32) -> bool {
    image.pixels().get_pixel(x, y)[0] > 250
}

#[test]
fn test_logo_lands_on_same_relative_spot_in_preview_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let fonts = FontBook::from_faces(Vec::new(), "Arial");
    let compositor = Compositor::new(&fonts);
    let spec = logo_spec(dir.path());

    // 800x600 source shown at 400x300 inside a 400x400 preview.
    let mut session =
        PreviewSession::new(compositor, black(800, 600), Size::new(400, 400), spec.clone(), FRAME)
            .unwrap();
    assert_eq!(session.canvas().size(), Size::new(400, 300));

    let preview = session.tick(Instant::now()).unwrap().unwrap().clone();
    assert!(is_white(&preview, 105, 55));
    assert!(is_white(&preview, 118, 68));
    assert!(!is_white(&preview, 98, 48));
    assert!(!is_white(&preview, 122, 72));

    let options = ExportOptions {
        reference: session.reference_space(),
        ..ExportOptions::default()
    };
    let full = render_for_export(
        &compositor,
        session.source(),
        &spec,
        &options,
        LogoSource::Load,
    )
    .unwrap();
    assert_eq!(full.size(), Size::new(800, 600));
    assert!(is_white(&full, 205, 105));
    assert!(is_white(&full, 237, 137));
    assert!(!is_white(&full, 196, 96));
    assert!(!is_white(&full, 243, 143));

    let half = render_for_export(
        &compositor,
        session.source(),
        &spec,
        &ExportOptions {
            sizing: SizingPolicy::Percentage { percent: 50 },
            ..options
        },
        LogoSource::Load,
    )
    .unwrap();
    assert_eq!(half.size(), Size::new(400, 300));
    assert!(is_white(&half, 105, 55));
    assert!(!is_white(&half, 122, 72));
}

#[test]
fn test_spec_changes_render_at_frame_rate() {
    let fonts = FontBook::from_faces(Vec::new(), "Arial");
    let mut session = PreviewSession::new(
        Compositor::new(&fonts),
        black(64, 64),
        Size::new(64, 64),
        WatermarkSpec::new(TextWatermarkSpec::new(""), Placement::default()),
        FRAME,
    )
    .unwrap();

    let start = Instant::now();
    let mut renders = 0;
    let mut spec = session.spec().clone();
    // 100 updates, one per millisecond.
    for ms in 0..100u64 {
        spec.text.opacity = (ms % 100) as u8;
        session.update_spec(spec.clone()).unwrap();
        if session.tick(start + Duration::from_millis(ms)).unwrap().is_some() {
            renders += 1;
        }
    }
    assert!(renders <= 7, "rendered {} times", renders);
    assert_eq!(session.state(), RefreshState::Dirty);

    session.render_now(start + Duration::from_millis(100)).unwrap();
    assert_eq!(session.state(), RefreshState::Idle);
}

#[test]
fn test_invalid_spec_update_is_rejected() {
    let fonts = FontBook::from_faces(Vec::new(), "Arial");
    let mut session = PreviewSession::new(
        Compositor::new(&fonts),
        black(10, 10),
        Size::new(10, 10),
        WatermarkSpec::new(TextWatermarkSpec::new(""), Placement::default()),
        FRAME,
    )
    .unwrap();
    let mut spec = session.spec().clone();
    spec.text.opacity = 150;
    assert!(session.update_spec(spec).is_err());
    assert_eq!(session.spec().text.opacity, 80);
}
