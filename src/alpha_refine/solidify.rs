use image::Rgba;

use crate::alpha_refine::classify::{AlphaBand, BandMap};
use crate::alpha_refine::components::{RegionFlag, RegionMap};
use crate::Image;

const TRANSPARENT: u8 = 0;
const OPAQUE: u8 = u8::MAX;

/// Decides the binary alpha of one pixel
///
/// Noise is never kept. Ambiguous pixels survive only inside principal
/// regions and only when `preserve_elements` is set. Background and Opaque
/// pixels keep their value.
///
/// # Arguments
///
/// * `band` - Alpha band of the pixel
/// * `flag` - Flag of the region containing the pixel, `None` for background
/// * `preserve_elements` - Ambiguous-band policy
#[inline]
pub const fn solidified_alpha(
    band: AlphaBand,
    flag: Option<RegionFlag>,
    preserve_elements: bool,
) -> u8 {
    match (band, flag) {
        (AlphaBand::Background | AlphaBand::Noise, _) => TRANSPARENT,
        (AlphaBand::Opaque, _) => OPAQUE,
        (AlphaBand::Ambiguous, Some(RegionFlag::Principal)) if preserve_elements => OPAQUE,
        (AlphaBand::Ambiguous, _) => TRANSPARENT,
    }
}

/// Pixel counts of the changes made by the solidifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolidifyReport {
    /// Noise pixels forced transparent
    pub noise_removed: u64,
    /// Ambiguous pixels of principal regions forced opaque
    pub ambiguous_solidified: u64,
    /// Ambiguous pixels of principal regions forced transparent
    pub ambiguous_removed: u64,
    /// Ambiguous pixels of fragments forced transparent
    pub fragment_pixels_removed: u64,
}

/// Trait rewriting partial alpha to fully opaque or fully transparent
pub trait Solidify: Sized {
    /// Returns a copy whose alpha is rewritten by [`solidified_alpha`]
    ///
    /// Color channels are copied unchanged.
    fn solidify(
        &self,
        bands: &BandMap,
        regions: &RegionMap,
        preserve_elements: bool,
    ) -> (Self, SolidifyReport);
}

impl Solidify for Image<Rgba<u8>> {
    fn solidify(
        &self,
        bands: &BandMap,
        regions: &RegionMap,
        preserve_elements: bool,
    ) -> (Self, SolidifyReport) {
        debug_assert_eq!(self.dimensions(), bands.dimensions());

        let mut output = self.clone();
        let mut report = SolidifyReport::default();

        output
            .pixels_mut()
            .zip(bands.as_slice())
            .zip(regions.flags())
            .for_each(|((pixel, &band), flag)| {
                let alpha = solidified_alpha(band, flag, preserve_elements);
                match (band, flag, alpha) {
                    (AlphaBand::Noise, _, _) => report.noise_removed += 1,
                    (AlphaBand::Ambiguous, Some(RegionFlag::Fragment), _) => {
                        report.fragment_pixels_removed += 1;
                    }
                    (AlphaBand::Ambiguous, _, OPAQUE) => report.ambiguous_solidified += 1,
                    (AlphaBand::Ambiguous, _, _) => report.ambiguous_removed += 1,
                    _ => {}
                }
                pixel[3] = alpha;
            });

        (output, report)
    }
}
