use crate::error::ConfigError;

/// Default noise threshold; alpha below this is treated as segmentation noise
pub const DEFAULT_NOISE_THRESHOLD: u8 = 25;
/// Default fragment cutoff as a fraction of the image area
pub const DEFAULT_MIN_REGION_FRACTION: f64 = 0.01;
/// Default smoothing kernel radius
pub const DEFAULT_SMOOTHING_RADIUS: u32 = 1;
/// Default luminosity above which boundary pixels count as residual white
pub const DEFAULT_WHITE_LUMINOSITY_THRESHOLD: u8 = 245;

/// Named configurations reproducing the historical cleanup policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Preset {
    /// Keep every element the model detected; solidify anything above a low threshold
    #[default]
    Preserve,
    /// Drop everything below a high threshold, keep the main components
    Clean,
    /// Only pixels the model was fully certain about survive
    Strict,
}

/// Immutable configuration of one pipeline run
///
/// Construct it with [`PipelineConfig::default`] or [`PipelineConfig::from_preset`]
/// and adjust it with the `with_*` setters. Values are checked by
/// [`PipelineConfig::validate`] when a [`crate::Pipeline`] is created.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct PipelineConfig {
    /// Alpha values in `1..noise_threshold` are noise and always discarded
    pub noise_threshold: u8,
    /// Regions smaller than this fraction of the image are fragments
    pub min_region_fraction: f64,
    /// Whether ambiguous pixels of principal regions become opaque (true) or transparent (false)
    pub preserve_elements: bool,
    /// Radius of the boundary smoothing kernel; 0 disables smoothing
    pub smoothing_radius: u32,
    /// Luminosity above which halo pixels next to the background are removed
    pub white_luminosity_threshold: u8,
    /// Always keep the largest region(s), even when below the fragment cutoff
    pub keep_largest_region: bool,
    /// Log run statistics at `info` level
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            min_region_fraction: DEFAULT_MIN_REGION_FRACTION,
            preserve_elements: true,
            smoothing_radius: DEFAULT_SMOOTHING_RADIUS,
            white_luminosity_threshold: DEFAULT_WHITE_LUMINOSITY_THRESHOLD,
            keep_largest_region: false,
            verbose: false,
        }
    }
}

impl PipelineConfig {
    /// Creates the configuration for a named preset
    ///
    /// * `Preserve` - noise threshold 25, ambiguous pixels solidified
    /// * `Clean` - noise threshold 150, ambiguous pixels solidified, largest region always kept
    /// * `Strict` - ambiguous pixels removed, only fully opaque pixels survive
    pub fn from_preset(preset: Preset) -> Self {
        let base = Self::default();
        match preset {
            Preset::Preserve => base,
            Preset::Clean => base.with_noise_threshold(150).with_keep_largest_region(true),
            Preset::Strict => base.with_preserve_elements(false),
        }
    }

    pub fn with_noise_threshold(mut self, noise_threshold: u8) -> Self {
        self.noise_threshold = noise_threshold;
        self
    }

    pub fn with_min_region_fraction(mut self, min_region_fraction: f64) -> Self {
        self.min_region_fraction = min_region_fraction;
        self
    }

    pub fn with_preserve_elements(mut self, preserve_elements: bool) -> Self {
        self.preserve_elements = preserve_elements;
        self
    }

    pub fn with_smoothing_radius(mut self, smoothing_radius: u32) -> Self {
        self.smoothing_radius = smoothing_radius;
        self
    }

    pub fn with_white_luminosity_threshold(mut self, threshold: u8) -> Self {
        self.white_luminosity_threshold = threshold;
        self
    }

    pub fn with_keep_largest_region(mut self, keep_largest_region: bool) -> Self {
        self.keep_largest_region = keep_largest_region;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Checks the configuration invariants
    ///
    /// # Errors
    ///
    /// * `ConfigError::NoiseThresholdTooHigh` - `noise_threshold` is 255
    /// * `ConfigError::RegionFractionOutOfRange` - `min_region_fraction` is NaN or outside [0.0, 1.0]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.noise_threshold == u8::MAX {
            return Err(ConfigError::NoiseThresholdTooHigh {
                value: self.noise_threshold,
            });
        }

        if !(0.0..=1.0).contains(&self.min_region_fraction) {
            return Err(ConfigError::RegionFractionOutOfRange {
                value: self.min_region_fraction,
            });
        }

        Ok(())
    }
}
