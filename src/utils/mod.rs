//! Internal utility functions for alpha-refine.
//!
//! This module contains pixel helpers shared by the pipeline stages.

use image::Rgba;

use crate::Image;

/// Rec.601 luma weights, as used by the residual-whiteness test
const LUMA_RED: f32 = 0.299;
const LUMA_GREEN: f32 = 0.587;
const LUMA_BLUE: f32 = 0.114;

/// Computes the Rec.601 luminosity of an RGB triple.
///
/// # Returns
///
/// The luminosity in the range [0, 255]
#[inline]
pub fn rec601_luminosity(red: u8, green: u8, blue: u8) -> f32 {
    LUMA_BLUE.mul_add(
        f32::from(blue),
        LUMA_GREEN.mul_add(f32::from(green), LUMA_RED * f32::from(red)),
    )
}

/// Reports whether the pixel at `(x, y)` is fully transparent.
///
/// Coordinates outside the image count as transparent, so a pixel on the
/// image border is always adjacent to the background.
#[inline]
pub fn is_transparent_or_outside(image: &Image<Rgba<u8>>, x: i64, y: i64) -> bool {
    let (width, height) = image.dimensions();
    if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
        return true;
    }
    image.get_pixel(x as u32, y as u32)[3] == 0
}

/// Computes `part / total` as a percentage, treating an empty total as `empty`.
#[inline]
pub fn percentage(part: u64, total: u64, empty: f64) -> f64 {
    if total == 0 {
        empty
    } else {
        part as f64 / total as f64 * 100.0
    }
}
