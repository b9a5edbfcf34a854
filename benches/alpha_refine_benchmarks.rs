//! Performance benchmarks for alpha-refine
//!
//! Measures the individual stages and the full pipeline on synthetic
//! segmentation output of increasing size.

use alpha_refine::{
    AnalyzeComponents, ClassifyAlpha, Image, Pipeline, PipelineConfig, RefineEdges, Solidify,
};
use criterion::*;
use image::Rgba;
use itertools::iproduct;
use std::hint::black_box;

/// Synthetic model output: opaque ellipse, soft falloff, scattered speckle
fn create_segmented_image(width: u32, height: u32) -> Image<Rgba<u8>> {
    let mut image: Image<Rgba<u8>> = Image::new(width, height);
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    iproduct!(0..height, 0..width).for_each(|(y, x)| {
        let dx = (x as f32 - center_x) / (width as f32 * 0.35);
        let dy = (y as f32 - center_y) / (height as f32 * 0.4);
        let distance = dx.hypot(dy);

        let alpha = if distance < 0.8 {
            255
        } else if distance < 1.0 {
            (255.0 * (1.0 - distance) * 5.0) as u8
        } else if (x * 31 + y * 17) % 97 == 0 {
            // Speckle in the background
            ((x + y) % 60) as u8
        } else {
            0
        };

        let shade = ((x + y) * 255 / (width + height)) as u8;
        image.put_pixel(x, y, Rgba([shade, 120, 255 - shade, alpha]));
    });

    image
}

const SIZES: [(u32, u32); 3] = [(256, 256), (1024, 1024), (1920, 1080)];

fn bench_stages(c: &mut Criterion) {
    let config = PipelineConfig::default();
    let mut group = c.benchmark_group("stages");
    group.sample_size(10);

    for (width, height) in SIZES {
        group.throughput(Throughput::Elements(u64::from(width * height)));
        let label = format!("{width}x{height}");

        let image = create_segmented_image(width, height);
        let bands = image.classify_alpha(config.noise_threshold);
        let regions = bands.analyze_components(config.min_region_fraction, false);
        let (solid, _) = image.solidify(&bands, &regions, true);

        group.bench_with_input(BenchmarkId::new("classify", &label), &image, |b, img| {
            b.iter(|| black_box(img.classify_alpha(config.noise_threshold)))
        });
        group.bench_with_input(BenchmarkId::new("components", &label), &bands, |b, bands| {
            b.iter(|| black_box(bands.analyze_components(config.min_region_fraction, false)))
        });
        group.bench_with_input(BenchmarkId::new("solidify", &label), &image, |b, img| {
            b.iter(|| black_box(img.solidify(&bands, &regions, true)))
        });
        group.bench_with_input(BenchmarkId::new("refine_edges", &label), &solid, |b, img| {
            b.iter(|| {
                black_box(img.refine_edges(
                    &bands,
                    &regions,
                    config.smoothing_radius,
                    config.white_luminosity_threshold,
                ))
            })
        });
    }

    group.finish();
}

/// Full pipeline across smoothing radii
fn bench_pipeline(c: &mut Criterion) {
    let radii = [0, 1, 3];

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    for ((width, height), radius) in iproduct!(SIZES, radii) {
        group.throughput(Throughput::Elements(u64::from(width * height)));

        let image = create_segmented_image(width, height);
        let pipeline =
            Pipeline::new(PipelineConfig::default().with_smoothing_radius(radius)).unwrap();

        group.bench_with_input(
            BenchmarkId::new("run", format!("{width}x{height}_r{radius}")),
            &image,
            |b, img| b.iter(|| black_box(pipeline.run(img))),
        );
    }

    group.finish();
}

/// Batch processing, parallel when built with the `rayon` feature
fn bench_batch(c: &mut Criterion) {
    let images: Vec<Image<Rgba<u8>>> = (0..8).map(|_| create_segmented_image(512, 512)).collect();
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();

    let mut group = c.benchmark_group("batch");
    group.sample_size(10);
    group.throughput(Throughput::Elements(8 * 512 * 512));
    group.bench_function("run_batch_8x512", |b| {
        b.iter(|| black_box(pipeline.run_batch(&images)))
    });
    group.finish();
}

criterion_group!(benches, bench_stages, bench_pipeline, bench_batch);
criterion_main!(benches);
