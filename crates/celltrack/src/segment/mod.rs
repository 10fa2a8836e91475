//! Frame segmentation: grayscale phase-contrast frame -> binary cell mask.
//!
//! Stage order matters:
//!
//! 1. Sobel edges thresholded at `otsu * edge_threshold_factor`.
//! 2. Dilation by the union of lines at 0°, 30°, 60°, 90° to close gaps.
//! 3. Hole filling.
//! 4. Disk erosion back toward cell size.
//! 5. Halo suppression: raw intensity above `halo_brightness_threshold`
//!    is forced to background.
//! 6. Second dilation -> hole filling -> erosion to re-smooth boundaries.
//! 7. Removal of components smaller than `min_region_area`.
//!
//! Segmentation is a pure function of the frame and the configuration.

pub mod edges;
pub mod strel;

use crate::error::TrackError;
use crate::frame::Frame;
use crate::mask::BinaryMask;

use strel::{StructuringElement, GAP_CLOSING_ANGLES_DEG};

/// Morphology parameters. Every value is geometry-dependent (resolution and
/// cell size) and must be supplied explicitly.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentConfig {
    /// Multiplier applied to the Otsu level to get the edge threshold.
    pub edge_threshold_factor: f64,
    /// Length (pixels) of each gap-closing line in the first dilation.
    pub first_dilation_radius: u32,
    /// Disk radius (pixels) of the first erosion.
    pub first_erosion_radius: u32,
    /// Raw intensity above which a pixel is considered halo.
    pub halo_brightness_threshold: u16,
    /// Length (pixels) of each gap-closing line in the second dilation.
    pub second_dilation_radius: u32,
    /// Disk radius (pixels) of the second erosion.
    pub second_erosion_radius: u32,
    /// Minimum component area (pixels) kept in the final mask.
    pub min_region_area: usize,
}

impl SegmentConfig {
    pub fn validate(&self) -> Result<(), TrackError> {
        if !self.edge_threshold_factor.is_finite() || self.edge_threshold_factor < 0.0 {
            return Err(TrackError::InvalidConfig(
                "edge_threshold_factor must be finite and >= 0".to_string(),
            ));
        }
        if self.min_region_area == 0 {
            return Err(TrackError::InvalidConfig(
                "min_region_area must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Every intermediate mask of one segmentation run, in stage order.
#[derive(Debug, Clone)]
pub struct SegmentationStages {
    pub edges: BinaryMask,
    pub gaps_closed: BinaryMask,
    pub filled: BinaryMask,
    pub eroded: BinaryMask,
    pub halo_removed: BinaryMask,
    pub resmoothed: BinaryMask,
    pub cleaned: BinaryMask,
}

/// Segment a frame into a binary cell mask.
pub fn segment_frame(frame: &Frame, config: &SegmentConfig) -> BinaryMask {
    segment_frame_stages(frame, config).cleaned
}

/// Segment a frame and keep every intermediate mask.
pub fn segment_frame_stages(frame: &Frame, config: &SegmentConfig) -> SegmentationStages {
    let edges = edges::edge_mask(frame, config.edge_threshold_factor);

    let first_lines =
        StructuringElement::oriented_lines(config.first_dilation_radius, &GAP_CLOSING_ANGLES_DEG);
    let gaps_closed = edges.dilate(&first_lines);
    let filled = gaps_closed.fill_holes();
    let eroded = filled.erode(&StructuringElement::disk(config.first_erosion_radius));

    let halo_removed = suppress_halo(&eroded, frame, config.halo_brightness_threshold);

    let second_lines =
        StructuringElement::oriented_lines(config.second_dilation_radius, &GAP_CLOSING_ANGLES_DEG);
    let resmoothed = halo_removed
        .dilate(&second_lines)
        .fill_holes()
        .erode(&StructuringElement::disk(config.second_erosion_radius));

    let cleaned = resmoothed.remove_small_components(config.min_region_area);

    tracing::debug!(
        "frame {}: {} edge px, {} px after halo removal, {} px final",
        frame.index(),
        edges.count_foreground(),
        halo_removed.count_foreground(),
        cleaned.count_foreground()
    );

    SegmentationStages {
        edges,
        gaps_closed,
        filled,
        eroded,
        halo_removed,
        resmoothed,
        cleaned,
    }
}

/// Clear mask pixels whose raw frame intensity exceeds `threshold`.
fn suppress_halo(mask: &BinaryMask, frame: &Frame, threshold: u16) -> BinaryMask {
    let (w, h) = mask.dimensions();
    BinaryMask::from_fn(w, h, |x, y| mask.get(x, y) && frame.sample(x, y) <= threshold)
}
