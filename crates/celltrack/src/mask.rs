//! Binary masks and the morphology primitives the segmenter is built from.
//!
//! Conventions:
//! - foreground is 8-connected, background is 4-connected (the dual), so a
//!   hole is a 4-connected background component that does not touch the
//!   image border;
//! - dilation treats pixels outside the image as background, erosion treats
//!   them as foreground (borders never erode a blob on their own).

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};

use crate::segment::strel::StructuringElement;

const FOREGROUND: u8 = 255;

/// Per-pixel component labels; 0 is unlabelled.
pub(crate) type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;

/// A boolean image with the same geometry as the frame it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl BinaryMask {
    /// All-background mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; width as usize * height as usize],
        }
    }

    /// Build a mask by evaluating `f(x, y)` at every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Non-zero pixels become foreground.
    pub fn from_luma8(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.as_raw().iter().map(|&v| v != 0).collect(),
        }
    }

    /// Foreground as 255, background as 0.
    pub fn to_luma8(&self) -> GrayImage {
        let raw = self
            .data
            .iter()
            .map(|&v| if v { FOREGROUND } else { 0 })
            .collect();
        GrayImage::from_raw(self.width, self.height, raw).expect("mask dimensions match")
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let idx = y as usize * self.width as usize + x as usize;
        self.data[idx] = value;
    }

    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// `true` when no pixel is foreground.
    pub fn is_blank(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// Minkowski sum with `se`: every foreground pixel stamps the element.
    pub fn dilate(&self, se: &StructuringElement) -> Self {
        let mut out = Self::new(self.width, self.height);
        let w = self.width as i64;
        let h = self.height as i64;
        for y in 0..h {
            for x in 0..w {
                if !self.data[(y * w + x) as usize] {
                    continue;
                }
                for &[dx, dy] in se.offsets() {
                    let nx = x + dx as i64;
                    let ny = y + dy as i64;
                    if nx >= 0 && nx < w && ny >= 0 && ny < h {
                        out.data[(ny * w + nx) as usize] = true;
                    }
                }
            }
        }
        out
    }

    /// A pixel survives iff every element offset lands on foreground.
    pub fn erode(&self, se: &StructuringElement) -> Self {
        let mut out = Self::new(self.width, self.height);
        let w = self.width as i64;
        let h = self.height as i64;
        for y in 0..h {
            for x in 0..w {
                let idx = (y * w + x) as usize;
                if !self.data[idx] {
                    continue;
                }
                out.data[idx] = se.offsets().iter().all(|&[dx, dy]| {
                    let nx = x + dx as i64;
                    let ny = y + dy as i64;
                    if nx < 0 || nx >= w || ny < 0 || ny >= h {
                        return true;
                    }
                    self.data[(ny * w + nx) as usize]
                });
            }
        }
        out
    }

    /// Fill background components that are fully enclosed by foreground.
    pub fn fill_holes(&self) -> Self {
        if self.data.is_empty() {
            return self.clone();
        }
        let inverted = GrayImage::from_raw(
            self.width,
            self.height,
            self.data
                .iter()
                .map(|&v| if v { 0 } else { FOREGROUND })
                .collect(),
        )
        .expect("mask dimensions match");
        let labels = connected_components(&inverted, Connectivity::Four, Luma([0u8]));
        let n_labels = max_label(&labels);

        let mut touches_border = vec![false; n_labels as usize + 1];
        let (w, h) = (self.width, self.height);
        for x in 0..w {
            touches_border[labels.get_pixel(x, 0)[0] as usize] = true;
            touches_border[labels.get_pixel(x, h - 1)[0] as usize] = true;
        }
        for y in 0..h {
            touches_border[labels.get_pixel(0, y)[0] as usize] = true;
            touches_border[labels.get_pixel(w - 1, y)[0] as usize] = true;
        }

        let data = self
            .data
            .iter()
            .zip(labels.as_raw())
            .map(|(&fg, &label)| fg || (label != 0 && !touches_border[label as usize]))
            .collect();
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Drop 8-connected components with fewer than `min_area` pixels.
    pub fn remove_small_components(&self, min_area: usize) -> Self {
        if self.data.is_empty() {
            return self.clone();
        }
        let labels = self.label_components();
        let n_labels = max_label(&labels);
        let mut areas = vec![0usize; n_labels as usize + 1];
        for &label in labels.as_raw() {
            areas[label as usize] += 1;
        }

        let data = labels
            .as_raw()
            .iter()
            .map(|&label| label != 0 && areas[label as usize] >= min_area)
            .collect();
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// 8-connected foreground labels, numbered in raster order of first pixel.
    pub(crate) fn label_components(&self) -> LabelImage {
        connected_components(&self.to_luma8(), Connectivity::Eight, Luma([0u8]))
    }
}

pub(crate) fn max_label(labels: &LabelImage) -> u32 {
    labels.as_raw().iter().copied().max().unwrap_or(0)
}
