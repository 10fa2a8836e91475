//! Frames and frame sources.
//!
//! A [`Frame`] keeps its samples in a 16-bit luma buffer together with the
//! bit depth it was acquired at, so raw-intensity thresholds stay in the
//! frame's native scale (0..=255 for 8-bit, 0..=65535 for 16-bit stacks).

use std::path::{Path, PathBuf};

use image::{ColorType, GrayImage, ImageBuffer, Luma};

use crate::error::TrackError;

/// 16-bit single-channel image buffer.
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "tif", "tiff"];

/// Sample depth of the acquired frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl BitDepth {
    /// Largest representable raw sample value.
    pub fn max_value(self) -> u16 {
        match self {
            Self::Eight => u8::MAX as u16,
            Self::Sixteen => u16::MAX,
        }
    }
}

/// One grayscale frame of a time-lapse stack, identified by its 1-based index.
#[derive(Debug, Clone)]
pub struct Frame {
    index: usize,
    depth: BitDepth,
    samples: Gray16Image,
}

impl Frame {
    /// Wrap an 8-bit image.
    pub fn from_gray8(index: usize, image: &GrayImage) -> Self {
        let (w, h) = image.dimensions();
        let raw = image.as_raw().iter().map(|&v| v as u16).collect();
        let samples = Gray16Image::from_raw(w, h, raw).expect("sample count matches dimensions");
        Self {
            index,
            depth: BitDepth::Eight,
            samples,
        }
    }

    /// Wrap a 16-bit image.
    pub fn from_gray16(index: usize, image: Gray16Image) -> Self {
        Self {
            index,
            depth: BitDepth::Sixteen,
            samples: image,
        }
    }

    /// 1-based position of this frame in its stack.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.samples.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.samples.width()
    }

    pub fn height(&self) -> u32 {
        self.samples.height()
    }

    /// Raw sample at `(x, y)` in the frame's native scale.
    #[inline]
    pub fn sample(&self, x: u32, y: u32) -> u16 {
        self.samples.get_pixel(x, y)[0]
    }

    /// Row-major raw samples.
    pub fn samples(&self) -> &[u16] {
        self.samples.as_raw()
    }

    /// Samples rescaled to `[0, 1]` by the bit depth's full range.
    pub fn normalized(&self) -> Vec<f32> {
        let max = self.depth.max_value() as f32;
        self.samples
            .as_raw()
            .iter()
            .map(|&v| v as f32 / max)
            .collect()
    }

    /// 8-bit rendition (16-bit samples keep their high byte).
    pub fn to_gray8(&self) -> GrayImage {
        let (w, h) = self.dimensions();
        let raw = match self.depth {
            BitDepth::Eight => self.samples.as_raw().iter().map(|&v| v as u8).collect(),
            BitDepth::Sixteen => self
                .samples
                .as_raw()
                .iter()
                .map(|&v| (v >> 8) as u8)
                .collect(),
        };
        GrayImage::from_raw(w, h, raw).expect("sample count matches dimensions")
    }
}

/// Random access to the frames of a pre-opened stack.
///
/// Indices are 1-based, `1..=frame_count()`.
pub trait FrameSource {
    fn frame_count(&self) -> usize;

    fn frame(&self, index: usize) -> Result<Frame, TrackError>;
}

fn out_of_range(index: usize, count: usize) -> TrackError {
    TrackError::FrameUnavailable {
        frame: index,
        reason: format!("index outside 1..={}", count),
    }
}

/// Frames held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFrames {
    frames: Vec<Frame>,
}

impl InMemoryFrames {
    /// Build from 8-bit images; frame indices follow vector order.
    pub fn from_gray8(images: &[GrayImage]) -> Self {
        let frames = images
            .iter()
            .enumerate()
            .map(|(i, img)| Frame::from_gray8(i + 1, img))
            .collect();
        Self { frames }
    }

    /// Build from 16-bit images; frame indices follow vector order.
    pub fn from_gray16(images: Vec<Gray16Image>) -> Self {
        let frames = images
            .into_iter()
            .enumerate()
            .map(|(i, img)| Frame::from_gray16(i + 1, img))
            .collect();
        Self { frames }
    }
}

impl FrameSource for InMemoryFrames {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, index: usize) -> Result<Frame, TrackError> {
        if index == 0 {
            return Err(out_of_range(index, self.frames.len()));
        }
        let mut frame = self
            .frames
            .get(index - 1)
            .cloned()
            .ok_or_else(|| out_of_range(index, self.frames.len()))?;
        frame.index = index;
        Ok(frame)
    }
}

/// A stack stored as one grayscale image file per frame.
///
/// Files are decoded lazily on [`FrameSource::frame`]. 16-bit files keep
/// their depth, everything else is converted to 8-bit luma.
#[derive(Debug, Clone)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
}

impl ImageSequence {
    /// Use the given files in the given order.
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Collect PNG/TIFF files in `dir`, ordered by file name.
    pub fn from_dir(dir: &Path) -> std::io::Result<Self> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_image {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl FrameSource for ImageSequence {
    fn frame_count(&self) -> usize {
        self.paths.len()
    }

    fn frame(&self, index: usize) -> Result<Frame, TrackError> {
        if index == 0 || index > self.paths.len() {
            return Err(out_of_range(index, self.paths.len()));
        }
        let path = &self.paths[index - 1];
        let img = image::open(path).map_err(|e| TrackError::FrameUnavailable {
            frame: index,
            reason: format!("{}: {}", path.display(), e),
        })?;

        let frame = match img.color() {
            ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => {
                Frame::from_gray16(index, img.to_luma16())
            }
            _ => Frame::from_gray8(index, &img.to_luma8()),
        };
        Ok(frame)
    }
}
