use image::ColorType;
use thiserror::Error;

/// Error type for pipeline configuration validation
///
/// These errors are raised by `PipelineConfig::validate` before any
/// pixel is touched, so a rejected configuration never produces partial output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The noise threshold leaves no room for the Opaque band
    ///
    /// Alpha 255 is always Opaque, so the noise threshold must be
    /// strictly below it.
    #[error("Noise threshold ({value}) must be less than 255")]
    NoiseThresholdTooHigh { value: u8 },

    /// The minimum region fraction is not a finite value in [0.0, 1.0]
    #[error("Minimum region fraction ({value}) must be within [0.0, 1.0]")]
    RegionFractionOutOfRange { value: f64 },
}

/// Error type for alpha refinement operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The configuration was rejected before processing began
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// The input raster has no alpha channel
    ///
    /// RGB-only input is a caller error; it is never silently upgraded
    /// to an opaque RGBA raster.
    #[error("Unsupported channel layout {color_type:?}: an alpha channel is required")]
    UnsupportedChannelLayout {
        /// Color type of the rejected input
        color_type: ColorType,
    },
}
