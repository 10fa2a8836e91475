//! Connected-component regions of a binary mask.
//!
//! Regions are 8-connected (the segmenter's gap-closing lines produce
//! diagonal bridges that must stay within one blob) and are listed in
//! label order, which is stable for a given mask.

use crate::mask::{max_label, BinaryMask};

/// A connected set of foreground pixels.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Region {
    /// Component label (1-based, in extraction order).
    pub label: u32,
    /// Pixel count.
    pub area: usize,
    /// Centre of mass `[x, y]` in pixel coordinates.
    pub centroid: [f64; 2],
}

/// Label the mask and return one region per connected component.
pub fn extract_regions(mask: &BinaryMask) -> Vec<Region> {
    extract_regions_min_area(mask, 1)
}

/// Like [`extract_regions`], discarding components smaller than `min_area`.
pub fn extract_regions_min_area(mask: &BinaryMask, min_area: usize) -> Vec<Region> {
    let (w, h) = mask.dimensions();
    if w == 0 || h == 0 || mask.is_blank() {
        return Vec::new();
    }

    let labels = mask.label_components();
    let n = max_label(&labels) as usize;
    let mut area = vec![0usize; n + 1];
    let mut sum_x = vec![0u64; n + 1];
    let mut sum_y = vec![0u64; n + 1];
    for (x, y, px) in labels.enumerate_pixels() {
        let label = px[0] as usize;
        if label == 0 {
            continue;
        }
        area[label] += 1;
        sum_x[label] += x as u64;
        sum_y[label] += y as u64;
    }

    (1..=n)
        .filter(|&label| area[label] > 0 && area[label] >= min_area)
        .map(|label| {
            let a = area[label] as f64;
            Region {
                label: label as u32,
                area: area[label],
                centroid: [sum_x[label] as f64 / a, sum_y[label] as f64 / a],
            }
        })
        .collect()
}
