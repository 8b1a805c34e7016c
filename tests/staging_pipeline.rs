//! End-to-end staging pipeline tests
//!
//! Every scenario drives the public API with the passthrough segmenter so the
//! whole pipeline (refinement, geometry, lighting, compositing) runs exactly
//! as it would in production, minus the external model.

use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use photostage::{
    stage_product_image, BackgroundChoice, BackgroundStyle, FlatColor, PassthroughSegmenter,
    StageConfig, StageError,
};

/// Fully opaque gray square centered on a transparent canvas
fn cutout_square(canvas: u32, square: u32, value: u8) -> DynamicImage {
    let offset = (canvas - square) / 2;
    let mut image = RgbaImage::new(canvas, canvas);
    for y in offset..offset + square {
        for x in offset..offset + square {
            image.put_pixel(x, y, Rgba([value, value, value, 255]));
        }
    }
    DynamicImage::ImageRgba8(image)
}

fn run(config: StageConfig, input: &DynamicImage) -> photostage::StagedResult {
    stage_product_image(input, &config, Box::new(PassthroughSegmenter::new())).unwrap()
}

#[test]
fn white_background_is_exact_outside_the_subject() {
    // 300px trimmed subject plus the 100px safe margin -> 500x500 output
    let input = cutout_square(500, 300, 128);
    let config = StageConfig::builder()
        .background(BackgroundChoice::Flat(FlatColor::White))
        .build()
        .unwrap();

    let result = run(config, &input);

    assert_eq!(result.label, "White");
    assert_eq!(result.dimensions(), (500, 500));
    assert_eq!(result.image.color(), image::ColorType::Rgb8);

    // Far from the feathered silhouette the background is exactly white
    assert_eq!(result.image.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    assert_eq!(result.image.get_pixel(499, 499), Rgba([255, 255, 255, 255]));
    // The subject interior is untouched: no grain on the flat path
    assert_eq!(result.image.get_pixel(250, 250), Rgba([128, 128, 128, 255]));
}

#[test]
fn auto_detection_mirrors_subject_brightness() {
    let near_white = cutout_square(120, 60, 250);
    let near_black = cutout_square(120, 60, 10);
    let config = StageConfig::builder()
        .background(BackgroundChoice::Auto)
        .build()
        .unwrap();

    let light_result = run(config.clone(), &near_white);
    assert_eq!(light_result.label, "Black");

    let dark_result = run(config, &near_black);
    assert_eq!(dark_result.label, "White");
    // A dark subject lands on a white canvas
    assert_eq!(dark_result.image.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
}

#[test]
fn empty_segmentation_is_a_content_error() {
    let transparent = DynamicImage::ImageRgba8(RgbaImage::new(64, 64));
    let config = StageConfig::default();
    let err = stage_product_image(
        &transparent,
        &config,
        Box::new(PassthroughSegmenter::new()),
    )
    .unwrap_err();
    assert!(matches!(err, StageError::NoSubject(_)));
    assert!(err.to_string().contains("foreground subject"));
}

#[test]
fn marble_floor_matches_plate_dimensions_and_is_seeded_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let plate = RgbaImage::from_pixel(64, 64, Rgba([180, 180, 200, 255]));
    plate.save(dir.path().join("marble_floor.png")).unwrap();

    let input = cutout_square(100, 60, 128);
    let config = StageConfig::builder()
        .background(BackgroundChoice::Style(BackgroundStyle::MarbleFloor))
        .assets_dir(dir.path())
        .safe_margin(20)
        .grain_seed(42)
        .build()
        .unwrap();

    let first = run(config.clone(), &input);
    let second = run(config.clone(), &input);

    assert_eq!(first.label, "Marble Floor");
    // Plate is loaded at the padded subject size: 60 + 2*20 per side
    assert_eq!(first.dimensions(), (100, 100));
    assert_eq!(first.image.color(), image::ColorType::Rgb8);

    // Same seed, same pixels
    assert_eq!(first.image.to_rgb8(), second.image.to_rgb8());

    // A different grain seed must produce different pixels
    let reseeded = StageConfig {
        grain_seed: Some(7),
        ..config
    };
    let third = run(reseeded, &input);
    assert_ne!(first.image.to_rgb8(), third.image.to_rgb8());
}

#[test]
fn flat_lay_stages_without_plate_assets() {
    // No plate on disk: the catalog degrades to a flat white canvas
    let input = cutout_square(100, 60, 40);
    let dir = tempfile::tempdir().unwrap();
    let config = StageConfig::builder()
        .background(BackgroundChoice::Style(BackgroundStyle::DarkStudioFlatLay))
        .assets_dir(dir.path())
        .safe_margin(20)
        .grain_seed(1)
        .build()
        .unwrap();

    let result = run(config, &input);
    assert_eq!(result.label, "Dark Studio (Flat Lay)");
    assert_eq!(result.dimensions(), (100, 100));
    // The flat-lay contact shadow grounds the subject: pixels under it are
    // darker than the fallback plate
    let stats = result.subject_mask.statistics();
    assert!(stats.opaque_pixels > 0);
}

#[test]
fn subject_mask_tracks_the_refined_subject() {
    let input = cutout_square(200, 120, 128);
    let config = StageConfig::builder()
        .background(BackgroundChoice::Flat(FlatColor::White))
        .build()
        .unwrap();

    let result = run(config, &input);
    // Mask dimensions equal the padded subject
    assert_eq!(result.subject_mask.dimensions, (320, 320));
    let stats = result.subject_mask.statistics();
    assert!(stats.coverage > 0.1 && stats.coverage < 0.9);
}

#[tokio::test]
async fn reader_entry_point_round_trips() {
    let input = cutout_square(80, 40, 90);
    let mut png_bytes = Vec::new();
    input
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), image::ImageFormat::Png)
        .unwrap();

    let config = StageConfig::builder()
        .background(BackgroundChoice::Flat(FlatColor::Black))
        .build()
        .unwrap();

    let result = photostage::stage_product_from_reader(
        std::io::Cursor::new(png_bytes),
        &config,
        Box::new(PassthroughSegmenter::new()),
    )
    .await
    .unwrap();

    assert_eq!(result.label, "Black");
    assert_eq!(result.image.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
}
