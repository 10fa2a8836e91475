//! Gradient-magnitude edge detection with an Otsu-derived threshold.

use image::{ImageBuffer, Luma};
use imageproc::filter::filter3x3;

use crate::frame::Frame;
use crate::mask::BinaryMask;

/// Global Otsu level of the frame's intensity histogram, in `[0, 1]`.
pub fn otsu_level(frame: &Frame) -> f32 {
    if frame.samples().is_empty() {
        return 0.0;
    }
    imageproc::contrast::otsu_level(&frame.to_gray8()) as f32 / u8::MAX as f32
}

/// Row-major 3x3 Sobel kernels, x then y.
const SOBEL_X: [f32; 9] = [-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0];
const SOBEL_Y: [f32; 9] = [-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0];

/// Sobel gradient magnitude of the normalized frame.
///
/// Kernels are scaled by 1/4 so a step of contrast `c` (in normalized
/// intensity) yields a magnitude of `c` on both sides of the step. Border
/// pixels replicate their nearest in-image neighbour. Filtering runs on the
/// `f32` plane, so 16-bit frames keep their full precision.
pub fn gradient_magnitude(frame: &Frame) -> Vec<f32> {
    let (w, h) = frame.dimensions();
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let plane: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_raw(w, h, frame.normalized()).expect("sample count matches dimensions");
    let gx = filter3x3::<_, f32, f32>(&plane, &SOBEL_X);
    let gy = filter3x3::<_, f32, f32>(&plane, &SOBEL_Y);
    gx.as_raw()
        .iter()
        .zip(gy.as_raw())
        .map(|(&x, &y)| 0.25 * (x * x + y * y).sqrt())
        .collect()
}

/// Edge threshold: Otsu level scaled by `factor`.
pub fn edge_threshold(frame: &Frame, factor: f64) -> f32 {
    otsu_level(frame) * factor as f32
}

/// Pixels whose gradient magnitude strictly exceeds the scaled Otsu level.
pub fn edge_mask(frame: &Frame, factor: f64) -> BinaryMask {
    let (w, h) = frame.dimensions();
    let threshold = edge_threshold(frame, factor);
    let magnitude = gradient_magnitude(frame);
    tracing::trace!(
        "frame {}: edge threshold {:.4} (factor {})",
        frame.index(),
        threshold,
        factor
    );
    let mut idx = 0usize;
    BinaryMask::from_fn(w, h, |_, _| {
        let edge = magnitude[idx] > threshold;
        idx += 1;
        edge
    })
}
