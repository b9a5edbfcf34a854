mod alpha_refine;
mod error;
mod utils;

#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use alpha_refine::classify::{AlphaBand, BandHistogram, BandMap, ClassifyAlpha};
pub use alpha_refine::components::{
    flag_for_size, AnalyzeComponents, Region, RegionFlag, RegionMap, REGION_CONNECTIVITY,
};
pub use alpha_refine::config::{
    PipelineConfig, Preset, DEFAULT_MIN_REGION_FRACTION, DEFAULT_NOISE_THRESHOLD,
    DEFAULT_SMOOTHING_RADIUS, DEFAULT_WHITE_LUMINOSITY_THRESHOLD,
};
pub use alpha_refine::edge_refine::{gaussian_kernel, RefineEdges, RefineReport};
pub use alpha_refine::pipeline::{Pipeline, RefineAlpha, Refinement};
pub use alpha_refine::solidify::{solidified_alpha, Solidify, SolidifyReport};
pub use alpha_refine::statistics::{alpha_distribution, AlphaDistribution, RunStatistics};
pub use error::{ConfigError, Error};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
