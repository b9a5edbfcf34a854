//! Integration tests for alpha-refine workflows
//!
//! These tests combine the individual stages and the pipeline entry points
//! the way callers do.

use alpha_refine::{
    alpha_distribution, AnalyzeComponents, ClassifyAlpha, Image, Pipeline, PipelineConfig,
    Preset, RefineAlpha, RefineEdges, Solidify,
};
use image::{DynamicImage, ImageBuffer, Rgba};

/// 20x20 test raster: opaque core, partial rim, a faint speck and a small blob
fn create_test_raster() -> Image<Rgba<u8>> {
    Image::from_fn(20, 20, |x, y| {
        let alpha = if (6..14).contains(&x) && (6..14).contains(&y) {
            255
        } else if (4..16).contains(&x) && (4..16).contains(&y) {
            90
        } else if (x, y) == (1, 1) {
            12
        } else if x == 18 && y == 18 {
            160
        } else {
            0
        };
        Rgba([70, 90, 110, alpha])
    })
}

#[test]
fn manual_stages_match_pipeline() {
    let raster = create_test_raster();
    let config = PipelineConfig::default();

    let bands = raster.classify_alpha(config.noise_threshold);
    let regions = bands.analyze_components(config.min_region_fraction, config.keep_largest_region);
    let (solid, _) = raster.solidify(&bands, &regions, config.preserve_elements);
    let (refined, _) = solid.refine_edges(
        &bands,
        &regions,
        config.smoothing_radius,
        config.white_luminosity_threshold,
    );

    let refinement = Pipeline::new(config).unwrap().run(&raster);
    assert_eq!(refinement.image, refined);
    assert_eq!(refinement.statistics.regions_before(), regions.len());
    assert_eq!(refinement.statistics.input_bands(), bands.histogram());
}

#[test]
fn pipeline_removes_speck_and_blob_but_keeps_subject() {
    let refinement = create_test_raster()
        .refine_alpha(&PipelineConfig::default())
        .unwrap();
    let alpha = |x, y| refinement.image.get_pixel(x, y)[3];

    assert_eq!(alpha(10, 10), 255);
    assert_eq!(alpha(5, 10), 255);
    assert_eq!(alpha(1, 1), 0);
    // A single pixel is 0.25% of the frame, below the default cutoff
    assert_eq!(alpha(18, 18), 0);

    let statistics = refinement.statistics;
    assert_eq!(statistics.regions_before(), 3);
    assert_eq!(statistics.regions_after(), 1);
    assert_eq!(statistics.opaque_pixels(), 12 * 12);
    assert!(statistics.to_string().contains("regions 3 -> 1"));
}

#[test]
fn input_is_left_untouched() {
    let raster = create_test_raster();
    let copy = raster.clone();

    let _ = raster.refine_alpha(&PipelineConfig::default()).unwrap();
    assert_eq!(raster, copy);
}

#[test]
fn batch_matches_individual_runs() {
    let pipeline = Pipeline::new(PipelineConfig::from_preset(Preset::Clean)).unwrap();
    let rasters: Vec<Image<Rgba<u8>>> = (0..4)
        .map(|shift| {
            let mut raster = create_test_raster();
            raster.put_pixel(shift, 19, Rgba([0, 0, 0, 200]));
            raster
        })
        .collect();

    let batch = pipeline.run_batch(&rasters);

    assert_eq!(batch.len(), rasters.len());
    for (raster, refinement) in rasters.iter().zip(&batch) {
        assert_eq!(refinement, &pipeline.run(raster));
    }
}

#[test]
fn dynamic_images_of_any_alpha_depth_are_refined() {
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let raster = create_test_raster();
    let expected = pipeline.run(&raster);

    let rgba8 = DynamicImage::ImageRgba8(raster.clone());
    assert_eq!(pipeline.run_dynamic(&rgba8).unwrap(), expected);

    // 16-bit input is reduced to 8 bits before refinement
    let rgba16: ImageBuffer<Rgba<u16>, Vec<u16>> = ImageBuffer::from_fn(20, 20, |x, y| {
        let Rgba([r, g, b, a]) = *raster.get_pixel(x, y);
        Rgba([r, g, b, a].map(|c| u16::from(c) * 257))
    });
    let refined = pipeline
        .run_dynamic(&DynamicImage::ImageRgba16(rgba16))
        .unwrap();
    assert_eq!(refined.image, expected.image);
}

#[test]
fn presets_are_ordered_by_strictness() {
    let raster = create_test_raster();
    let opaque = |preset| {
        raster
            .refine_alpha(&PipelineConfig::from_preset(preset))
            .unwrap()
            .statistics
            .opaque_pixels()
    };

    let preserve = opaque(Preset::Preserve);
    let clean = opaque(Preset::Clean);
    let strict = opaque(Preset::Strict);

    assert_eq!(preserve, 12 * 12);
    assert_eq!(clean, 8 * 8);
    assert_eq!(strict, 8 * 8);
}

#[test]
fn distribution_reflects_refinement() {
    let raster = create_test_raster();
    let before = alpha_distribution(&raster);
    assert!(before.partial() > 0);
    assert_eq!(before.total(), 400);

    let refinement = raster.refine_alpha(&PipelineConfig::default()).unwrap();
    let after = alpha_distribution(&refinement.image);
    assert_eq!(after.partial(), 0);
    assert_eq!(after.solid, refinement.statistics.opaque_pixels());
    assert_eq!(after.transparent, refinement.statistics.transparent_pixels());
}
