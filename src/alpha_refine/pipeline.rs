//! Orchestration of the alpha refinement stages.
//!
//! A run always executes Classify -> Analyze -> Solidify -> Refine in that
//! order and finishes by summarizing the output in [`RunStatistics`].
//! Every stage is linear in the pixel count and the smoothing kernel has a
//! fixed size, so a run always terminates.
//!
//! Runs share no state. The input raster is only borrowed; each run allocates
//! its own band map, region map and output raster, which makes batches safe
//! to process in parallel (see [`Pipeline::run_batch`]).

use image::{DynamicImage, Rgba};
use tracing::{debug, info};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::alpha_refine::classify::{BandHistogram, ClassifyAlpha};
use crate::alpha_refine::components::AnalyzeComponents;
use crate::alpha_refine::config::PipelineConfig;
use crate::alpha_refine::edge_refine::{RefineEdges, RefineReport};
use crate::alpha_refine::solidify::{Solidify, SolidifyReport};
use crate::alpha_refine::statistics::RunStatistics;
use crate::error::Error;
use crate::Image;

/// Output of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    /// The refined raster; every alpha value is 0 or 255
    pub image: Image<Rgba<u8>>,
    /// Summary of the run
    pub statistics: RunStatistics,
}

/// Alpha refinement pipeline with a validated configuration
///
/// # Examples
///
/// ```no_run
/// use alpha_refine::{Image, Pipeline, PipelineConfig};
/// use image::Rgba;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let segmented: Image<Rgba<u8>> = Image::new(640, 480);
///
/// let pipeline = Pipeline::new(PipelineConfig::default().with_noise_threshold(20))?;
/// let refinement = pipeline.run(&segmented);
/// println!("{}", refinement.statistics);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline after validating `config`
    ///
    /// # Errors
    ///
    /// * `Error::InvalidConfiguration` - The configuration violates its invariants
    pub fn new(config: PipelineConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Refines the alpha channel of `raster`
    ///
    /// The input is not modified. A zero-pixel raster yields an empty output.
    pub fn run(&self, raster: &Image<Rgba<u8>>) -> Refinement {
        let config = &self.config;
        let (width, height) = raster.dimensions();

        if width == 0 || height == 0 {
            debug!(width, height, "empty raster, nothing to refine");
            return self.finish(
                raster.clone(),
                0,
                0,
                BandHistogram::default(),
                SolidifyReport::default(),
                RefineReport::default(),
            );
        }

        let bands = raster.classify_alpha(config.noise_threshold);
        let histogram = bands.histogram();
        debug!(
            background = histogram.background,
            noise = histogram.noise,
            ambiguous = histogram.ambiguous,
            opaque = histogram.opaque,
            "classified alpha bands"
        );

        let regions =
            bands.analyze_components(config.min_region_fraction, config.keep_largest_region);
        debug!(
            regions = regions.len(),
            principal = regions.principal_count(),
            fragments = regions.fragment_count(),
            "analyzed components"
        );

        let (solid, solidify_report) =
            raster.solidify(&bands, &regions, config.preserve_elements);
        debug!(?solidify_report, "solidified alpha");

        let (refined, refine_report) = solid.refine_edges(
            &bands,
            &regions,
            config.smoothing_radius,
            config.white_luminosity_threshold,
        );
        debug!(?refine_report, "refined edges");

        // A region survives when at least one of its pixels ends up opaque.
        let mut survivors = vec![false; regions.len()];
        for (x, y, pixel) in refined.enumerate_pixels() {
            if pixel[3] == u8::MAX {
                if let Some(index) = regions.index_at(x, y) {
                    survivors[index] = true;
                }
            }
        }
        let regions_after = survivors.into_iter().filter(|kept| *kept).count();

        self.finish(
            refined,
            regions.len(),
            regions_after,
            histogram,
            solidify_report,
            refine_report,
        )
    }

    /// Refines a decoded image, requiring it to carry an alpha channel
    ///
    /// Any alpha-carrying layout (e.g. `La8`, `Rgba16`) is converted to 8-bit RGBA.
    ///
    /// # Errors
    ///
    /// * `Error::UnsupportedChannelLayout` - The image has no alpha channel
    pub fn run_dynamic(&self, image: &DynamicImage) -> Result<Refinement, Error> {
        let color_type = image.color();
        if !color_type.has_alpha() {
            return Err(Error::UnsupportedChannelLayout { color_type });
        }

        match image {
            DynamicImage::ImageRgba8(raster) => Ok(self.run(raster)),
            other => Ok(self.run(&other.to_rgba8())),
        }
    }

    /// Refines every raster independently
    ///
    /// Results are returned in input order. With the `rayon` feature the
    /// rasters are processed in parallel.
    pub fn run_batch(&self, rasters: &[Image<Rgba<u8>>]) -> Vec<Refinement> {
        #[cfg(feature = "rayon")]
        let iter = rasters.par_iter();
        #[cfg(not(feature = "rayon"))]
        let iter = rasters.iter();

        iter.map(|raster| self.run(raster)).collect()
    }

    fn finish(
        &self,
        image: Image<Rgba<u8>>,
        regions_before: usize,
        regions_after: usize,
        histogram: BandHistogram,
        solidify_report: SolidifyReport,
        refine_report: RefineReport,
    ) -> Refinement {
        let statistics = RunStatistics::new(
            &image,
            regions_before,
            regions_after,
            histogram,
            solidify_report,
            refine_report,
        );

        if self.config.verbose {
            info!(
                total_pixels = statistics.total_pixels(),
                opaque_pixels = statistics.opaque_pixels(),
                transparency_percentage = statistics.transparency_percentage(),
                regions_before = statistics.regions_before(),
                regions_after = statistics.regions_after(),
                noise_removed = solidify_report.noise_removed,
                solidified = solidify_report.ambiguous_solidified,
                whiteness_removed = refine_report.whiteness_removed,
                "alpha refinement finished"
            );
        }

        Refinement { image, statistics }
    }
}

/// Trait providing one-call alpha refinement on RGBA rasters
pub trait RefineAlpha {
    /// Validates `config` and runs the full pipeline
    ///
    /// # Errors
    ///
    /// * `Error::InvalidConfiguration` - The configuration violates its invariants
    fn refine_alpha(&self, config: &PipelineConfig) -> Result<Refinement, Error>;
}

impl RefineAlpha for Image<Rgba<u8>> {
    fn refine_alpha(&self, config: &PipelineConfig) -> Result<Refinement, Error> {
        Ok(Pipeline::new(*config)?.run(self))
    }
}
