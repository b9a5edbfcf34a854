//! Connected region analysis over the non-background pixels of a band map.
//!
//! Labelling is delegated to `imageproc::region_labelling::connected_components`,
//! a two-pass union-find over a flat disjoint-set forest. It is iterative, so
//! large images cannot exhaust the stack, and it runs in time linear in the
//! pixel count.
//!
//! Connectivity is fixed to 4-neighbour. Diagonal contact is not enough to
//! merge two regions, which keeps diagonal speckle from attaching itself to
//! the subject.

use image::{ImageBuffer, Luma};
use imageproc::rect::Rect;
use imageproc::region_labelling::{connected_components, Connectivity};

use crate::alpha_refine::classify::BandMap;
use crate::Image;

/// Connectivity used for every region computation
pub const REGION_CONNECTIVITY: Connectivity = Connectivity::Four;

const FOREGROUND: Luma<u8> = Luma([u8::MAX]);
const BACKGROUND: Luma<u8> = Luma([0]);

/// Keep or discard decision for a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionFlag {
    /// Part of the subject
    Principal,
    /// Too small to be meaningful; its uncertain pixels are removed
    Fragment,
}

/// A maximal 4-connected set of non-background pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    label: u32,
    pixel_count: u64,
    bounds: Rect,
    area_fraction: f64,
    flag: RegionFlag,
}

impl Region {
    /// Label of the region in [`RegionMap::label_at`], starting at 1
    pub fn label(&self) -> u32 {
        self.label
    }

    pub fn pixel_count(&self) -> u64 {
        self.pixel_count
    }

    /// Smallest axis-aligned rectangle containing every pixel of the region
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Pixel count relative to the total pixel count of the image
    pub fn area_fraction(&self) -> f64 {
        self.area_fraction
    }

    pub fn flag(&self) -> RegionFlag {
        self.flag
    }

    pub fn is_principal(&self) -> bool {
        self.flag == RegionFlag::Principal
    }
}

/// Decides the flag of a region from its size alone
///
/// Regions whose area fraction is below `min_region_fraction` are fragments.
/// With `keep_largest`, a region as large as the largest region is always
/// principal.
#[inline]
pub fn flag_for_size(
    pixel_count: u64,
    area_fraction: f64,
    largest_pixel_count: u64,
    min_region_fraction: f64,
    keep_largest: bool,
) -> RegionFlag {
    if area_fraction >= min_region_fraction || (keep_largest && pixel_count == largest_pixel_count)
    {
        RegionFlag::Principal
    } else {
        RegionFlag::Fragment
    }
}

/// Region labels per pixel together with the region table
#[derive(Debug, Clone)]
pub struct RegionMap {
    labels: Image<Luma<u32>>,
    regions: Vec<Region>,
    index_of_label: Vec<Option<usize>>,
}

impl RegionMap {
    /// All regions, ordered by label
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn principal_count(&self) -> usize {
        self.regions.iter().filter(|r| r.is_principal()).count()
    }

    pub fn fragment_count(&self) -> usize {
        self.len() - self.principal_count()
    }

    /// Raw label of the pixel at `(x, y)`; 0 for background
    #[inline]
    pub fn label_at(&self, x: u32, y: u32) -> u32 {
        self.labels.get_pixel(x, y)[0]
    }

    /// Region containing the pixel at `(x, y)`, if it is not background
    #[inline]
    pub fn region_at(&self, x: u32, y: u32) -> Option<&Region> {
        self.region_for_label(self.label_at(x, y))
    }

    /// Flag of the region containing the pixel at `(x, y)`
    #[inline]
    pub fn flag_at(&self, x: u32, y: u32) -> Option<RegionFlag> {
        self.region_at(x, y).map(Region::flag)
    }

    /// Index into [`RegionMap::regions`] of the region containing `(x, y)`
    #[inline]
    pub fn index_at(&self, x: u32, y: u32) -> Option<usize> {
        self.index_for_label(self.label_at(x, y))
    }

    fn index_for_label(&self, label: u32) -> Option<usize> {
        self.index_of_label.get(label as usize).copied().flatten()
    }

    fn region_for_label(&self, label: u32) -> Option<&Region> {
        self.index_for_label(label).map(|index| &self.regions[index])
    }

    /// Flags in row-major pixel order, `None` for background
    pub fn flags(&self) -> impl Iterator<Item = Option<RegionFlag>> + '_ {
        self.labels
            .pixels()
            .map(|Luma([label])| self.region_for_label(*label).map(Region::flag))
    }
}

/// Per-label accumulator used while scanning the label image
#[derive(Debug, Clone, Copy)]
struct RegionAccumulator {
    pixel_count: u64,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl RegionAccumulator {
    fn new(x: u32, y: u32) -> Self {
        Self {
            pixel_count: 0,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.pixel_count += 1;
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn bounds(&self) -> Rect {
        Rect::at(self.min_x as i32, self.min_y as i32)
            .of_size(self.max_x - self.min_x + 1, self.max_y - self.min_y + 1)
    }
}

/// Labels the foreground of `mask`, 0 marking background
///
/// `connected_components` sizes its forest by the pixel count and cannot
/// relabel a lone foreground pixel, so rasters with at most one pixel are
/// labelled directly.
fn label_regions(mask: &Image<Luma<u8>>) -> Image<Luma<u32>> {
    let (width, height) = mask.dimensions();
    if u64::from(width) * u64::from(height) <= 1 {
        return ImageBuffer::from_fn(width, height, |x, y| {
            Luma([u32::from(*mask.get_pixel(x, y) != BACKGROUND)])
        });
    }
    connected_components(mask, REGION_CONNECTIVITY, BACKGROUND)
}

/// Trait providing connected region analysis
pub trait AnalyzeComponents {
    /// Labels the 4-connected regions of non-background pixels and flags each by size
    ///
    /// # Arguments
    ///
    /// * `min_region_fraction` - Regions below this fraction of the image area are fragments
    /// * `keep_largest` - Never flag the largest region(s) as fragments
    fn analyze_components(&self, min_region_fraction: f64, keep_largest: bool) -> RegionMap;
}

impl AnalyzeComponents for BandMap {
    fn analyze_components(&self, min_region_fraction: f64, keep_largest: bool) -> RegionMap {
        let (width, height) = self.dimensions();
        let bands = self.as_slice();

        let mask: Image<Luma<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
            if bands[(y as usize) * (width as usize) + x as usize].is_foreground() {
                FOREGROUND
            } else {
                BACKGROUND
            }
        });
        let labels = label_regions(&mask);

        let max_label = labels.pixels().map(|Luma([label])| *label).max().unwrap_or(0);
        let mut accumulators: Vec<Option<RegionAccumulator>> = vec![None; max_label as usize + 1];

        for (x, y, Luma([label])) in labels.enumerate_pixels() {
            if *label == 0 {
                continue;
            }
            accumulators[*label as usize]
                .get_or_insert_with(|| RegionAccumulator::new(x, y))
                .add(x, y);
        }

        let total_pixels = u64::from(width) * u64::from(height);
        let largest_pixel_count = accumulators
            .iter()
            .flatten()
            .map(|acc| acc.pixel_count)
            .max()
            .unwrap_or(0);

        let mut regions = Vec::new();
        let mut index_of_label = vec![None; accumulators.len()];
        for (label, acc) in accumulators.iter().enumerate() {
            let Some(acc) = acc else {
                continue;
            };
            let area_fraction = acc.pixel_count as f64 / total_pixels as f64;
            let flag = flag_for_size(
                acc.pixel_count,
                area_fraction,
                largest_pixel_count,
                min_region_fraction,
                keep_largest,
            );

            index_of_label[label] = Some(regions.len());
            regions.push(Region {
                label: label as u32,
                pixel_count: acc.pixel_count,
                bounds: acc.bounds(),
                area_fraction,
                flag,
            });
        }

        RegionMap {
            labels,
            regions,
            index_of_label,
        }
    }
}
