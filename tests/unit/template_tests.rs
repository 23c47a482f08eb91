// Template store to rendered output

use image::{Rgba, RgbaImage};

use filigree::geometry::Point;
use filigree::raster::{ColorMode, RasterImage};
use filigree::templates::{StoredPosition, TemplateRecord, TemplateStore};
use filigree::watermark::{Anchor, Compositor, FontBook, Placement, ScaleFactors};

#[test]
fn test_saved_template_drives_compositor() {
    let dir = tempfile::tempdir().unwrap();
    let store = TemplateStore::new(dir.path().join("t.json"), dir.path().join("last.json"));

    let logo_path = dir.path().join("logo.png");
    RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]))
        .save(&logo_path)
        .unwrap();

    let record = TemplateRecord {
        watermark_text: String::new(),
        watermark_position: StoredPosition::Named("top-left".into()),
        enable_image_watermark: true,
        image_watermark_path: logo_path.display().to_string(),
        image_opacity: 100,
        image_width: 8,
        image_height: 8,
        image_watermark_position: Some([4, 4]),
        ..TemplateRecord::default()
    };
    store.save("logo only", record).unwrap();

    let spec = store.load("logo only").unwrap().unwrap().to_spec().unwrap();
    assert_eq!(spec.placement, Placement::Anchor(Anchor::TopLeft));

    let fonts = FontBook::from_faces(Vec::new(), "Arial");
    let canvas = RasterImage::new(
        RgbaImage::from_pixel(32, 32, Rgba([0, 0, 0, 255])),
        ColorMode::Rgb,
    );
    let out = Compositor::new(&fonts)
        .compose(&canvas, &spec, ScaleFactors::IDENTITY)
        .unwrap();
    assert_eq!(out.pixels().get_pixel(6, 6)[0], 255);
    assert_eq!(out.pixels().get_pixel(20, 20)[0], 0);
}

#[test]
fn test_last_settings_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let settings = {
        let mut spec = TemplateRecord::default_template().to_spec().unwrap();
        spec.placement = Placement::Absolute(Point::new(320, 240));
        spec.text.rotation = 30.0;
        TemplateRecord::from_spec(&spec)
    };

    TemplateStore::new(dir.path().join("t.json"), dir.path().join("last.json"))
        .save_last_settings(settings)
        .unwrap();

    let reopened = TemplateStore::new(dir.path().join("t.json"), dir.path().join("last.json"));
    let spec = reopened
        .load_last_settings()
        .unwrap()
        .unwrap()
        .to_spec()
        .unwrap();
    assert_eq!(spec.placement, Placement::Absolute(Point::new(320, 240)));
    assert_eq!(spec.text.rotation, 30.0);
    assert_eq!(spec.text.text, "水印文本");
    assert_eq!(reopened.count().unwrap(), 0);
}
