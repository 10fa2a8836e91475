//! Error type shared by every pipeline stage.
//!
//! All variants are fatal for the run in which they occur: tracking needs an
//! unbroken frame sequence, so a failure at frame `k` aborts the walk for all
//! tracks. Undefined numeric results (e.g. the heading of a zero-length step)
//! are not errors; they are reported as `NaN`.

/// Errors raised by the segmentation, tracking and I/O boundary layers.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackError {
    /// The frame source contains no frames.
    EmptyFrameSource,
    /// Segmentation produced no candidate regions for a frame that needs them.
    NoRegionsAvailable {
        /// 1-based frame index.
        frame: usize,
    },
    /// A seed point lies outside the frame-1 image bounds.
    InvalidSeedPoint {
        /// 0-based seed index in the order supplied.
        seed: usize,
        x: f64,
        y: f64,
        width: u32,
        height: u32,
    },
    /// A frame's dimensions differ from those of frame 1.
    InconsistentFrameDimensions {
        /// 1-based frame index.
        frame: usize,
        expected: [u32; 2],
        found: [u32; 2],
    },
    /// The frame source could not deliver a frame.
    FrameUnavailable {
        /// 1-based frame index.
        frame: usize,
        reason: String,
    },
    /// A configuration value is missing, non-finite or out of range.
    InvalidConfig(String),
}

impl std::fmt::Display for TrackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFrameSource => write!(f, "frame source contains no frames"),
            Self::NoRegionsAvailable { frame } => {
                write!(f, "no candidate regions in frame {}", frame)
            }
            Self::InvalidSeedPoint {
                seed,
                x,
                y,
                width,
                height,
            } => write!(
                f,
                "seed {} at ({}, {}) lies outside the {}x{} frame",
                seed, x, y, width, height
            ),
            Self::InconsistentFrameDimensions {
                frame,
                expected,
                found,
            } => write!(
                f,
                "frame {} is {}x{}, expected {}x{}",
                frame, found[0], found[1], expected[0], expected[1]
            ),
            Self::FrameUnavailable { frame, reason } => {
                write!(f, "cannot read frame {}: {}", frame, reason)
            }
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for TrackError {}
