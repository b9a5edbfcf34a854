//! Boundary refinement applied after solidification.
//!
//! Two passes run in order:
//!
//! 1. **Smoothing** - the alpha channel is blurred with a small separable
//!    Gaussian. Opaque pixels of the uncertain zone (ambiguous pixels of
//!    principal regions) whose blurred value falls below the midpoint become
//!    transparent. Smoothing only ever demotes, so a pixel the solidifier
//!    made transparent stays transparent and no partial alpha is reintroduced.
//! 2. **Residual whiteness** - bright halo pixels left by the segmentation
//!    model's antialiasing are removed where they touch the background.
//!    Only pixels whose input alpha was uncertain (noise or ambiguous) are
//!    candidates; pixels the model marked fully opaque are never trimmed.
//!
//! A `smoothing_radius` of 0 skips the first pass and a
//! `white_luminosity_threshold` of 255 skips the second.

use image::{ImageBuffer, Luma, Rgba};
use imageproc::filter::separable_filter_equal;
use itertools::iproduct;

use crate::alpha_refine::classify::{AlphaBand, BandMap};
use crate::alpha_refine::components::{RegionFlag, RegionMap};
use crate::utils::{is_transparent_or_outside, rec601_luminosity};
use crate::Image;

/// Opaque uncertain pixels whose blurred alpha falls below this become transparent
const CLIP_MIDPOINT: u8 = 128;

/// Builds a normalized Gaussian kernel of length `2 * radius + 1`
///
/// Sigma follows the usual rule for a kernel of that size,
/// `0.3 * (radius - 1) + 0.8`, so a radius of 1 gives a mild 3-tap spread.
/// A radius of 0 yields the identity kernel `[1.0]`.
pub fn gaussian_kernel(radius: u32) -> Vec<f32> {
    if radius == 0 {
        return vec![1.0];
    }

    let sigma = 0.3 * (radius as f32 - 1.0) + 0.8;
    let denominator = 2.0 * sigma * sigma;
    let r = radius as i64;

    let weights: Vec<f32> = (-r..=r)
        .map(|offset| (-((offset * offset) as f32) / denominator).exp())
        .collect();
    let sum: f32 = weights.iter().sum();

    weights.into_iter().map(|w| w / sum).collect()
}

/// Pixel counts of the changes made by the edge refiner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefineReport {
    /// Uncertain-zone pixels turned transparent by smoothing
    pub smoothing_demoted: u64,
    /// Halo pixels removed by the residual-whiteness pass
    pub whiteness_removed: u64,
}

/// Trait providing boundary refinement of solidified rasters
pub trait RefineEdges: Sized {
    /// Smooths the solidified boundary and removes residual whiteness
    ///
    /// Smoothing never turns a transparent pixel opaque. The whiteness pass
    /// only trims pixels whose input band was Noise or Ambiguous.
    ///
    /// # Arguments
    ///
    /// * `bands` - Bands of the original (pre-solidification) raster
    /// * `regions` - Regions computed from `bands`
    /// * `smoothing_radius` - Blur radius; 0 disables smoothing
    /// * `white_luminosity_threshold` - Luminosity above which halo pixels are removed
    fn refine_edges(
        &self,
        bands: &BandMap,
        regions: &RegionMap,
        smoothing_radius: u32,
        white_luminosity_threshold: u8,
    ) -> (Self, RefineReport);
}

impl RefineEdges for Image<Rgba<u8>> {
    fn refine_edges(
        &self,
        bands: &BandMap,
        regions: &RegionMap,
        smoothing_radius: u32,
        white_luminosity_threshold: u8,
    ) -> (Self, RefineReport) {
        debug_assert_eq!(self.dimensions(), bands.dimensions());

        let mut output = self.clone();
        let mut report = RefineReport::default();

        if smoothing_radius > 0 {
            smooth_uncertain_zone(&mut output, bands, regions, smoothing_radius, &mut report);
        }
        remove_residual_whiteness(&mut output, bands, white_luminosity_threshold, &mut report);

        (output, report)
    }
}

fn smooth_uncertain_zone(
    image: &mut Image<Rgba<u8>>,
    bands: &BandMap,
    regions: &RegionMap,
    radius: u32,
    report: &mut RefineReport,
) {
    let alpha: Image<Luma<u8>> =
        ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
            Luma([image.get_pixel(x, y)[3]])
        });
    let blurred = separable_filter_equal(&alpha, &gaussian_kernel(radius));

    image
        .pixels_mut()
        .zip(bands.as_slice())
        .zip(regions.flags())
        .zip(blurred.pixels())
        .for_each(|(((pixel, &band), flag), Luma([smoothed]))| {
            if band != AlphaBand::Ambiguous
                || flag != Some(RegionFlag::Principal)
                || pixel[3] != u8::MAX
            {
                return;
            }

            if *smoothed < CLIP_MIDPOINT {
                pixel[3] = 0;
                report.smoothing_demoted += 1;
            }
        });
}

fn remove_residual_whiteness(
    image: &mut Image<Rgba<u8>>,
    bands: &BandMap,
    white_luminosity_threshold: u8,
    report: &mut RefineReport,
) {
    // No luminosity exceeds the maximum
    if white_luminosity_threshold == u8::MAX {
        return;
    }
    let threshold = f32::from(white_luminosity_threshold);
    let (width, height) = image.dimensions();

    // Adjacency is judged against the alpha before this pass so removals do not cascade.
    let snapshot = image.clone();
    let neighbour_is_background = |x: u32, y: u32| {
        let (x, y) = (i64::from(x), i64::from(y));
        [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
            .into_iter()
            .any(|(nx, ny)| is_transparent_or_outside(&snapshot, nx, ny))
    };

    for (y, x) in iproduct!(0..height, 0..width) {
        if !matches!(bands.get(x, y), AlphaBand::Noise | AlphaBand::Ambiguous) {
            continue;
        }

        let Rgba([red, green, blue, alpha]) = *snapshot.get_pixel(x, y);
        if alpha == 0 || rec601_luminosity(red, green, blue) <= threshold {
            continue;
        }

        if neighbour_is_background(x, y) {
            image.get_pixel_mut(x, y)[3] = 0;
            report.whiteness_removed += 1;
        }
    }
}
