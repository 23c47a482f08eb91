// Export pipeline tests: naming, sizing and encoded output on disk

use image::{ImageFormat, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

use filigree::export::{
    export_all, export_file, EncodeError, ExportOptions, NamingRule, OutputFormat, SizingPolicy,
};
use filigree::geometry::{Point, Size};
use filigree::raster::{probe, RasterImage};
use filigree::watermark::{
    Compositor, FontBook, ImageWatermarkSpec, LogoSource, Placement, ReferenceSpace,
    TextWatermarkSpec, WatermarkSpec,
};

fn write_png(dir: &Path, name: &str, w: u32, h: u32, pixel: Rgba<u8>) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(w, h, pixel)
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();
    path
}

fn no_fonts() -> FontBook {
    FontBook::from_faces(Vec::new(), "Arial")
}

#[test]
fn test_batch_names_and_formats() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let a = write_png(input.path(), "a.png", 40, 30, Rgba([0, 0, 0, 255]));
    let b = write_png(input.path(), "b.png", 30, 40, Rgba([0, 0, 0, 255]));

    let fonts = no_fonts();
    let compositor = Compositor::new(&fonts);
    let spec = WatermarkSpec::new(TextWatermarkSpec::new(""), Placement::default());

    let report = export_all(
        &compositor,
        &[a, b],
        output.path(),
        &spec,
        &ExportOptions::default(),
    )
    .unwrap();
    assert!(report.is_success());
    assert_eq!(
        report.exported,
        vec![
            output.path().join("a_watermarked.jpg"),
            output.path().join("b_watermarked.jpg"),
        ]
    );

    let info = probe(output.path().join("b_watermarked.jpg")).unwrap();
    assert_eq!(info.format.as_deref(), Some("JPEG"));
    assert_eq!((info.width, info.height), (30, 40));
}

#[test]
fn test_custom_keep_aspect_export() {
    let input = tempfile::tempdir().unwrap();
    let source = write_png(input.path(), "wide.png", 400, 200, Rgba([10, 10, 10, 255]));
    let out_path = input.path().join("out.png");

    let fonts = no_fonts();
    let compositor = Compositor::new(&fonts);
    let spec = WatermarkSpec::new(TextWatermarkSpec::new(""), Placement::default());
    let options = ExportOptions {
        format: OutputFormat::Png,
        sizing: SizingPolicy::Custom {
            width: 100,
            height: 100,
            keep_aspect_ratio: true,
        },
        ..ExportOptions::default()
    };

    export_file(&compositor, &source, &out_path, &spec, &options, LogoSource::Load).unwrap();
    let written = RasterImage::open(&out_path).unwrap();
    assert_eq!(written.size(), Size::new(100, 50));
}

#[test]
fn test_png_keeps_transparency_and_logo() {
    let input = tempfile::tempdir().unwrap();
    let source = write_png(input.path(), "clear.png", 60, 60, Rgba([0, 0, 0, 0]));
    let logo = write_png(input.path(), "logo.png", 10, 10, Rgba([255, 0, 0, 255]));
    let out_path = input.path().join("clear_out.png");

    let fonts = no_fonts();
    let compositor = Compositor::new(&fonts);
    let spec = WatermarkSpec::new(TextWatermarkSpec::new(""), Placement::default()).with_image(
        ImageWatermarkSpec {
            opacity: 100,
            ..ImageWatermarkSpec::new(&logo, 10, 10)
        },
    );
    let options = ExportOptions {
        format: OutputFormat::Png,
        ..ExportOptions::default()
    };

    export_file(&compositor, &source, &out_path, &spec, &options, LogoSource::Load).unwrap();
    let written = RasterImage::open(&out_path).unwrap();
    // Default logo placement: top-right, 10px margin.
    assert_eq!(written.pixels().get_pixel(45, 15), &Rgba([255, 0, 0, 255]));
    assert_eq!(written.pixels().get_pixel(5, 50)[3], 0);
}

#[test]
fn test_batch_keeps_going_after_failures() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let good = write_png(input.path(), "good.png", 20, 20, Rgba([0, 0, 0, 255]));
    let corrupt = input.path().join("corrupt.jpg");
    std::fs::write(&corrupt, b"\xff\xd8 definitely not a jpeg").unwrap();

    let fonts = no_fonts();
    let compositor = Compositor::new(&fonts);
    let spec = WatermarkSpec::new(
        TextWatermarkSpec::new(""),
        Placement::Absolute(Point::new(1, 1)),
    );
    let options = ExportOptions {
        naming: NamingRule::Original,
        format: OutputFormat::Png,
        reference: ReferenceSpace::Fixed {
            size: Size::new(10, 10),
        },
        ..ExportOptions::default()
    };

    let report = export_all(&compositor, &[corrupt.clone(), good], output.path(), &spec, &options)
        .unwrap();
    assert_eq!(report.total(), 2);
    assert_eq!(report.exported, vec![output.path().join("good.png")]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source, corrupt);
    assert!(matches!(report.failures[0].error, filigree::Error::Raster(_)));
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}

#[test]
fn test_batch_same_stem_in_two_folders_reports_conflict() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    std::fs::create_dir(input.path().join("a")).unwrap();
    std::fs::create_dir(input.path().join("b")).unwrap();
    let first = write_png(&input.path().join("a"), "photo.png", 20, 20, Rgba([0, 0, 0, 255]));
    let second = write_png(&input.path().join("b"), "photo.png", 30, 30, Rgba([0, 0, 0, 255]));

    let fonts = no_fonts();
    let compositor = Compositor::new(&fonts);
    let spec = WatermarkSpec::new(TextWatermarkSpec::new(""), Placement::default());

    let report = export_all(
        &compositor,
        &[first.clone(), second.clone()],
        output.path(),
        &spec,
        &ExportOptions::default(),
    )
    .unwrap();

    let expected = output.path().join("photo_watermarked.jpg");
    assert_eq!(report.total(), 2);
    assert_eq!(report.exported, vec![expected.clone()]);
    assert_eq!(files_in(output.path()), report.exported);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source, second);
    match &report.failures[0].error {
        filigree::Error::Encode(EncodeError::OutputConflict { path, claimed_by }) => {
            assert_eq!(path, &expected);
            assert_eq!(claimed_by, &first);
        }
        other => panic!("unexpected error: {}", other),
    }

    // The first source's output survives untouched.
    let info = probe(&expected).unwrap();
    assert_eq!((info.width, info.height), (20, 20));
}

#[test]
fn test_batch_distinct_stems_across_folders() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    std::fs::create_dir(input.path().join("2023")).unwrap();
    std::fs::create_dir(input.path().join("2024")).unwrap();
    let a = write_png(&input.path().join("2023"), "beach.png", 16, 16, Rgba([0, 0, 0, 255]));
    let b = write_png(&input.path().join("2024"), "hills.png", 16, 16, Rgba([0, 0, 0, 255]));

    let fonts = no_fonts();
    let compositor = Compositor::new(&fonts);
    let spec = WatermarkSpec::new(TextWatermarkSpec::new(""), Placement::default());
    let options = ExportOptions {
        format: OutputFormat::Png,
        naming: NamingRule::Prefix("wm_".into()),
        ..ExportOptions::default()
    };

    let report = export_all(&compositor, &[a, b], output.path(), &spec, &options).unwrap();
    assert!(report.is_success());
    assert!(!report.writes_into_source_folder);
    assert_eq!(
        report.exported,
        vec![
            output.path().join("wm_beach.png"),
            output.path().join("wm_hills.png"),
        ]
    );
    assert_eq!(files_in(output.path()), report.exported);
}

#[test]
fn test_batch_into_source_folder_is_flagged() {
    let input = tempfile::tempdir().unwrap();
    let source = write_png(input.path(), "keep.png", 12, 12, Rgba([0, 0, 0, 255]));

    let fonts = no_fonts();
    let compositor = Compositor::new(&fonts);
    let spec = WatermarkSpec::new(TextWatermarkSpec::new(""), Placement::default());
    let options = ExportOptions {
        format: OutputFormat::Png,
        ..ExportOptions::default()
    };

    let report = export_all(
        &compositor,
        &[source.clone()],
        input.path(),
        &spec,
        &options,
    )
    .unwrap();
    assert!(report.writes_into_source_folder);
    assert_eq!(report.exported, vec![input.path().join("keep_watermarked.png")]);
    assert!(source.exists());
}
