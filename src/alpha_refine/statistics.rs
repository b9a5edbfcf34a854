use std::fmt;

use image::Rgba;

use crate::alpha_refine::classify::BandHistogram;
use crate::alpha_refine::edge_refine::RefineReport;
use crate::alpha_refine::solidify::SolidifyReport;
use crate::utils::percentage;
use crate::Image;

/// Read-only summary of one pipeline run
///
/// Built once from the final raster; there are no setters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStatistics {
    total_pixels: u64,
    opaque_pixels: u64,
    transparent_pixels: u64,
    regions_before: usize,
    regions_after: usize,
    input_bands: BandHistogram,
    solidify: SolidifyReport,
    refine: RefineReport,
}

impl RunStatistics {
    pub(crate) fn new(
        output: &Image<Rgba<u8>>,
        regions_before: usize,
        regions_after: usize,
        input_bands: BandHistogram,
        solidify: SolidifyReport,
        refine: RefineReport,
    ) -> Self {
        let total_pixels = u64::from(output.width()) * u64::from(output.height());
        let (opaque_pixels, transparent_pixels) =
            output
                .pixels()
                .fold((0, 0), |(opaque, transparent), Rgba([_, _, _, alpha])| match *alpha {
                    u8::MAX => (opaque + 1, transparent),
                    0 => (opaque, transparent + 1),
                    _ => (opaque, transparent),
                });

        Self {
            total_pixels,
            opaque_pixels,
            transparent_pixels,
            regions_before,
            regions_after,
            input_bands,
            solidify,
            refine,
        }
    }

    pub fn total_pixels(&self) -> u64 {
        self.total_pixels
    }

    pub fn opaque_pixels(&self) -> u64 {
        self.opaque_pixels
    }

    pub fn transparent_pixels(&self) -> u64 {
        self.transparent_pixels
    }

    /// Share of fully transparent output pixels, in percent
    ///
    /// A zero-pixel raster counts as fully transparent (100%).
    pub fn transparency_percentage(&self) -> f64 {
        percentage(self.transparent_pixels, self.total_pixels, 100.0)
    }

    /// Number of regions found in the input
    pub fn regions_before(&self) -> usize {
        self.regions_before
    }

    /// Number of input regions that still hold opaque pixels in the final output
    pub fn regions_after(&self) -> usize {
        self.regions_after
    }

    /// Band counts of the input raster
    pub fn input_bands(&self) -> BandHistogram {
        self.input_bands
    }

    pub fn solidify_report(&self) -> SolidifyReport {
        self.solidify
    }

    pub fn refine_report(&self) -> RefineReport {
        self.refine
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} pixels opaque, {:.1}% transparent, regions {} -> {}",
            self.opaque_pixels,
            self.total_pixels,
            self.transparency_percentage(),
            self.regions_before,
            self.regions_after
        )
    }
}

/// Coarse alpha histogram of a raster
///
/// Ranges are `0`, `1-50`, `51-100`, `101-180`, `181-254` and `255`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlphaDistribution {
    pub transparent: u64,
    pub very_low: u64,
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    pub solid: u64,
}

impl AlphaDistribution {
    pub fn total(&self) -> u64 {
        self.transparent + self.very_low + self.low + self.medium + self.high + self.solid
    }

    /// Pixels that are neither fully transparent nor fully opaque
    pub fn partial(&self) -> u64 {
        self.very_low + self.low + self.medium + self.high
    }

    /// `(label, count)` rows in ascending alpha order
    pub fn rows(&self) -> [(&'static str, u64); 6] {
        [
            ("0", self.transparent),
            ("1-50", self.very_low),
            ("51-100", self.low),
            ("101-180", self.medium),
            ("181-254", self.high),
            ("255", self.solid),
        ]
    }
}

/// Computes the [`AlphaDistribution`] of an RGBA raster
pub fn alpha_distribution(image: &Image<Rgba<u8>>) -> AlphaDistribution {
    image
        .pixels()
        .fold(AlphaDistribution::default(), |mut dist, Rgba([_, _, _, alpha])| {
            match *alpha {
                0 => dist.transparent += 1,
                1..=50 => dist.very_low += 1,
                51..=100 => dist.low += 1,
                101..=180 => dist.medium += 1,
                181..=254 => dist.high += 1,
                255 => dist.solid += 1,
            }
            dist
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_alpha_raster;

    #[test]
    fn alpha_distribution_covers_every_value() {
        let raster = create_alpha_raster(&[&[0, 1, 50, 51, 100, 101, 180, 181, 254, 255]]);
        let dist = alpha_distribution(&raster);

        assert_eq!(dist.total(), 10);
        assert_eq!(dist.partial(), 8);
        assert_eq!(
            dist.rows().map(|(_, count)| count),
            [1, 2, 2, 2, 2, 1]
        );
    }

    #[test]
    fn statistics_count_output_alpha() {
        let output = create_alpha_raster(&[&[0, 255], &[255, 255]]);
        let stats = RunStatistics::new(
            &output,
            2,
            1,
            BandHistogram::default(),
            SolidifyReport::default(),
            RefineReport::default(),
        );

        assert_eq!(stats.total_pixels(), 4);
        assert_eq!(stats.opaque_pixels(), 3);
        assert_eq!(stats.transparent_pixels(), 1);
        assert!((stats.transparency_percentage() - 25.0).abs() < f64::EPSILON);
        assert!(stats.to_string().contains("regions 2 -> 1"));
    }

    #[test]
    fn empty_raster_is_fully_transparent() {
        let output: Image<Rgba<u8>> = Image::new(0, 0);
        let stats = RunStatistics::new(
            &output,
            0,
            0,
            BandHistogram::default(),
            SolidifyReport::default(),
            RefineReport::default(),
        );

        assert_eq!(stats.total_pixels(), 0);
        assert_eq!(stats.transparency_percentage(), 100.0);
    }
}
