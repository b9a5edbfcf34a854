//! Test utilities for alpha-refine
//!
//! Builders for small rasters with known alpha layouts.
//! Only compiled when running tests.

use image::Rgba;

use crate::Image;

/// Colour used for every pixel built by [`create_alpha_raster`]
///
/// Dark enough (luminosity ~ 82) that the residual-whiteness pass never
/// touches it.
pub const RASTER_COLOR: [u8; 3] = [128, 64, 32];

/// Creates a 2x2 RGBA test image with known pixel values:
/// - (0,0): [200, 150, 100, 255] (opaque)
/// - (1,0): [100, 200, 150, 128] (semi-transparent)
/// - (0,1): [150, 100, 200, 64]  (more transparent)
/// - (1,1): [50, 75, 25, 0]      (fully transparent)
pub fn create_test_rgba_image() -> Image<Rgba<u8>> {
    let mut image: Image<Rgba<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgba([200, 150, 100, 255]));
    image.put_pixel(1, 0, Rgba([100, 200, 150, 128]));
    image.put_pixel(0, 1, Rgba([150, 100, 200, 64]));
    image.put_pixel(1, 1, Rgba([50, 75, 25, 0]));
    image
}

/// Creates an RGBA raster whose alpha channel is given row by row
///
/// All rows must have the same length. Colour channels are [`RASTER_COLOR`].
pub fn create_alpha_raster(rows: &[&[u8]]) -> Image<Rgba<u8>> {
    let height = rows.len() as u32;
    let width = rows.first().map_or(0, |row| row.len()) as u32;
    assert!(
        rows.iter().all(|row| row.len() == width as usize),
        "rows must have equal length"
    );

    let [red, green, blue] = RASTER_COLOR;
    Image::from_fn(width, height, |x, y| {
        Rgba([red, green, blue, rows[y as usize][x as usize]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_alpha_raster_lays_out_rows() {
        let raster = create_alpha_raster(&[&[0, 1, 2], &[3, 4, 5]]);
        assert_eq!(raster.dimensions(), (3, 2));
        assert_eq!(raster.get_pixel(2, 1)[3], 5);
        assert_eq!(raster.get_pixel(1, 0), &Rgba([128, 64, 32, 1]));
    }

    #[test]
    fn create_alpha_raster_accepts_no_rows() {
        let raster = create_alpha_raster(&[]);
        assert_eq!(raster.dimensions(), (0, 0));
    }

    #[test]
    fn create_test_rgba_image_has_every_alpha_kind() {
        let image = create_test_rgba_image();
        let alphas: Vec<u8> = image.pixels().map(|p| p[3]).collect();
        assert_eq!(alphas, vec![255, 128, 64, 0]);
    }
}
