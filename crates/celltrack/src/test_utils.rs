//! Shared test utilities: synthetic phase-contrast frames.
//!
//! A synthetic cell is a dark body surrounded by a bright halo ring on a
//! mid-gray background, which is what the segmenter's halo suppression is
//! tuned against.

use image::{GrayImage, Luma};

use crate::segment::SegmentConfig;

pub(crate) const BACKGROUND_PIX: u8 = 128;
pub(crate) const BODY_PIX: u8 = 50;
pub(crate) const HALO_PIX: u8 = 230;

/// One synthetic cell.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellSpec {
    pub center: [f32; 2],
    pub body_radius: f32,
    pub halo_radius: f32,
}

impl CellSpec {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            center: [x, y],
            body_radius: 6.0,
            halo_radius: 8.0,
        }
    }
}

/// Render cells onto a uniform background. Later cells paint over earlier ones.
pub(crate) fn draw_cells_image(w: u32, h: u32, cells: &[CellSpec]) -> GrayImage {
    let mut img = GrayImage::from_pixel(w, h, Luma([BACKGROUND_PIX]));
    for y in 0..h {
        for x in 0..w {
            for cell in cells {
                let dx = x as f32 - cell.center[0];
                let dy = y as f32 - cell.center[1];
                let d = (dx * dx + dy * dy).sqrt();
                if d <= cell.body_radius {
                    img.put_pixel(x, y, Luma([BODY_PIX]));
                } else if d <= cell.halo_radius {
                    img.put_pixel(x, y, Luma([HALO_PIX]));
                }
            }
        }
    }
    img
}

/// Segmentation parameters matched to [`CellSpec::at`] cells.
pub(crate) fn cell_config() -> SegmentConfig {
    SegmentConfig {
        edge_threshold_factor: 0.5,
        first_dilation_radius: 5,
        first_erosion_radius: 2,
        halo_brightness_threshold: 200,
        second_dilation_radius: 5,
        second_erosion_radius: 2,
        min_region_area: 20,
    }
}
