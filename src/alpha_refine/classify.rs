use image::Rgba;

use crate::Image;

/// Classification of a pixel's alpha value
///
/// The bands partition `0..=255` without gaps:
///
/// * `Background` - `alpha == 0`
/// * `Noise` - `0 < alpha < noise_threshold`
/// * `Ambiguous` - `noise_threshold <= alpha < 255`
/// * `Opaque` - `alpha == 255`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlphaBand {
    Background,
    Noise,
    Ambiguous,
    Opaque,
}

impl AlphaBand {
    /// Maps a single alpha value to its band
    ///
    /// A `noise_threshold` of 0 or 1 leaves the Noise band empty.
    #[inline]
    pub const fn classify(alpha: u8, noise_threshold: u8) -> Self {
        match alpha {
            0 => Self::Background,
            u8::MAX => Self::Opaque,
            a if a < noise_threshold => Self::Noise,
            _ => Self::Ambiguous,
        }
    }

    /// Whether the pixel takes part in region analysis
    #[inline]
    pub const fn is_foreground(self) -> bool {
        !matches!(self, Self::Background)
    }
}

/// Pixel counts per alpha band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandHistogram {
    pub background: u64,
    pub noise: u64,
    pub ambiguous: u64,
    pub opaque: u64,
}

impl BandHistogram {
    pub fn total(&self) -> u64 {
        self.background + self.noise + self.ambiguous + self.opaque
    }

    fn record(&mut self, band: AlphaBand) {
        match band {
            AlphaBand::Background => self.background += 1,
            AlphaBand::Noise => self.noise += 1,
            AlphaBand::Ambiguous => self.ambiguous += 1,
            AlphaBand::Opaque => self.opaque += 1,
        }
    }
}

/// Per-pixel band labels with the same dimensions as the source raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandMap {
    width: u32,
    height: u32,
    bands: Vec<AlphaBand>,
}

impl BandMap {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Band of the pixel at `(x, y)`
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the map.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> AlphaBand {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.bands[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Bands in row-major order, matching `ImageBuffer::pixels`
    pub fn as_slice(&self) -> &[AlphaBand] {
        &self.bands
    }

    pub fn histogram(&self) -> BandHistogram {
        let mut histogram = BandHistogram::default();
        for &band in &self.bands {
            histogram.record(band);
        }
        histogram
    }
}

/// Trait providing alpha band classification for RGBA rasters
///
/// Only the alpha channel is read; color channels never influence the result.
pub trait ClassifyAlpha {
    /// Labels every pixel with its [`AlphaBand`]
    fn classify_alpha(&self, noise_threshold: u8) -> BandMap;
}

impl ClassifyAlpha for Image<Rgba<u8>> {
    fn classify_alpha(&self, noise_threshold: u8) -> BandMap {
        let (width, height) = self.dimensions();
        let bands = self
            .pixels()
            .map(|Rgba([_, _, _, alpha])| AlphaBand::classify(*alpha, noise_threshold))
            .collect();

        BandMap {
            width,
            height,
            bands,
        }
    }
}
