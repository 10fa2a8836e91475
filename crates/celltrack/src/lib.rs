//! celltrack: migration tracking of cells in phase-contrast time-lapse stacks.
//!
//! The pipeline stages are:
//!
//! 1. **Segment** – Sobel edges at an Otsu-scaled threshold, gap-closing
//!    dilation with oriented lines, hole filling, disk erosion, halo
//!    suppression, a second smoothing round and an area filter.
//! 2. **Regions** – 8-connected component labelling with area and centroid.
//! 3. **Initialize** – each user seed binds to the nearest frame-1 centroid.
//! 4. **Track** – each track independently moves to the nearest centroid of
//!    the next frame (greedy, single hypothesis, no mutual exclusion).
//! 5. **Kinematics** – step, path length, displacement to start, velocity,
//!    heading, turning angle and its cosine.
//!
//! # Public API
//! - [`CellTracker`] as the primary entry point
//! - [`PipelineConfig`] with [`SegmentConfig`] and [`KinematicsConfig`]
//! - [`FrameSource`], [`ResultSink`] and [`AnnotationSink`] at the I/O seams
//! - the stage functions, for callers that drive the pipeline themselves

mod api;
mod config;
mod error;
mod export;
mod frame;
mod kinematics;
mod mask;
mod pipeline;
mod regions;
mod segment;
mod tracker;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::CellTracker;
pub use config::PipelineConfig;
pub use error::TrackError;
pub use export::{
    result_rows, write_rows, AnnotatedTrack, AnnotationFrame, AnnotationSink, ResultRow,
    ResultSink,
};
pub use frame::{BitDepth, Frame, FrameSource, Gray16Image, ImageSequence, InMemoryFrames};
pub use kinematics::{
    compute_kinematics, heading_deg, track_kinematics, KinematicRecord, KinematicsConfig,
    TrackKinematics, TrackSummary,
};
pub use mask::BinaryMask;
pub use pipeline::{
    detect_regions, detect_stack, run_tracking, segment_stack, FrameRegions, TrackingResult,
};
pub use regions::{extract_regions, extract_regions_min_area, Region};
pub use segment::edges::{edge_mask, gradient_magnitude, otsu_level};
pub use segment::strel::{StructuringElement, GAP_CLOSING_ANGLES_DEG};
pub use segment::{segment_frame, segment_frame_stages, SegmentConfig, SegmentationStages};
pub use tracker::{nearest_region, SeedPoint, Track, Tracker};
