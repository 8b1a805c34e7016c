//! Staging pipeline benchmarks

use criterion::{criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};
use photostage::{
    lighting, stage_product_image, BackgroundChoice, FlatColor, PassthroughSegmenter, StageConfig,
};
use std::hint::black_box;

fn square_subject(canvas: u32, square: u32) -> RgbaImage {
    let offset = (canvas - square) / 2;
    let mut image = RgbaImage::new(canvas, canvas);
    for y in offset..offset + square {
        for x in offset..offset + square {
            image.put_pixel(x, y, Rgba([128, 128, 128, 255]));
        }
    }
    image
}

fn bench_drop_shadow(c: &mut Criterion) {
    let subject = square_subject(128, 64);
    c.bench_function("drop_shadow_128px", |b| {
        b.iter(|| {
            lighting::drop_shadow(black_box(&subject), (0, 4), Rgba([0, 0, 0, 80]), 10.0)
        });
    });
}

fn bench_flat_pipeline(c: &mut Criterion) {
    let input = DynamicImage::ImageRgba8(square_subject(128, 64));
    let config = StageConfig::builder()
        .background(BackgroundChoice::Flat(FlatColor::White))
        .safe_margin(20)
        .build()
        .unwrap();

    c.bench_function("flat_pipeline_128px", |b| {
        b.iter(|| {
            stage_product_image(
                black_box(&input),
                &config,
                Box::new(PassthroughSegmenter::new()),
            )
            .unwrap()
        });
    });
}

criterion_group!(benches, bench_drop_shadow, bench_flat_pipeline);
criterion_main!(benches);
