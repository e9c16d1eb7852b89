use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::HashMap;
use crate::models::Region;

/// Regions of a mask together with the number of contours they produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionScan {
    /// Foreground regions in extraction order.
    pub regions: Vec<Region>,
    /// Outer boundaries plus hole boundaries.
    pub contours: usize,
}

/// Find the 8-connected foreground regions of a binary mask.
///
/// Regions come back in extraction order: the order in which a raster scan
/// (top row first, left to right) first meets them. Callers rely on this
/// order for tie-breaking, so it must stay deterministic.
pub fn find_regions(mask: &GrayImage) -> RegionScan {
    let labeled = connected_components(mask, Connectivity::Eight, Luma([0]));

    // Label -> index of first sighting in the scan
    let mut slots: HashMap<u32, usize> = HashMap::new();
    let mut regions: Vec<Region> = Vec::new();

    for (x, y, label) in labeled.enumerate_pixels() {
        let label_val = label[0];
        if label_val == 0 {
            continue; // Background
        }

        let slot = *slots.entry(label_val).or_insert_with(|| {
            regions.push(Region {
                label: label_val,
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
                m00: 0,
                m10: 0,
                m01: 0,
            });
            regions.len() - 1
        });

        let region = &mut regions[slot];
        region.min_x = region.min_x.min(x);
        region.min_y = region.min_y.min(y);
        region.max_x = region.max_x.max(x);
        region.max_y = region.max_y.max(y);
        region.m00 += 1;
        region.m10 += x as u64;
        region.m01 += y as u64;
    }

    let contours = regions.len() + count_holes(mask);
    RegionScan { regions, contours }
}

/// Count enclosed background areas.
///
/// The foreground is 8-connected, so the background is 4-connected. Any
/// background component that does not reach the image border is a hole.
pub fn count_holes(mask: &GrayImage) -> usize {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return 0;
    }

    let mut background = mask.clone();
    for pixel in background.pixels_mut() {
        pixel[0] = if pixel[0] == 0 { 255 } else { 0 };
    }
    let labeled = connected_components(&background, Connectivity::Four, Luma([0]));

    let mut touches_border: HashMap<u32, bool> = HashMap::new();
    for (x, y, label) in labeled.enumerate_pixels() {
        let label_val = label[0];
        if label_val == 0 {
            continue;
        }
        let on_border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
        *touches_border.entry(label_val).or_insert(false) |= on_border;
    }

    touches_border.values().filter(|&&border| !border).count()
}
