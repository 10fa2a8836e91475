//! Stack-level orchestration: segment -> extract -> initialize -> track -> kinematics.
//!
//! Frames are consumed strictly in increasing order because the tracker's
//! state at frame `k` depends on frame `k - 1`. Any error aborts the whole
//! walk; no partial per-track results are returned.

use crate::config::PipelineConfig;
use crate::error::TrackError;
use crate::export::{result_rows, AnnotationFrame, AnnotationSink, ResultRow};
use crate::frame::{Frame, FrameSource};
use crate::kinematics::{compute_kinematics, TrackKinematics, TrackSummary};
use crate::mask::BinaryMask;
use crate::regions::{extract_regions_min_area, Region};
use crate::segment::{segment_frame, SegmentConfig};
use crate::tracker::{SeedPoint, Track, Tracker};

/// Regions detected in one frame.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameRegions {
    /// 1-based frame index.
    pub frame: usize,
    pub regions: Vec<Region>,
}

/// Output of a complete tracking run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackingResult {
    pub frame_count: usize,
    /// `[width, height]` shared by every frame.
    pub image_size: [u32; 2],
    pub tracks: Vec<Track>,
    pub kinematics: Vec<TrackKinematics>,
}

impl TrackingResult {
    /// Export rows, track-major.
    pub fn rows(&self) -> Vec<ResultRow> {
        result_rows(&self.kinematics)
    }

    pub fn summaries(&self) -> Vec<TrackSummary> {
        self.kinematics.iter().map(TrackKinematics::summary).collect()
    }
}

/// Segment one frame and extract its candidate regions.
pub fn detect_regions(frame: &Frame, config: &SegmentConfig) -> Vec<Region> {
    let mask = segment_frame(frame, config);
    extract_regions_min_area(&mask, config.min_region_area)
}

fn checked_frame(
    source: &dyn FrameSource,
    index: usize,
    expected: [u32; 2],
) -> Result<Frame, TrackError> {
    let frame = source.frame(index)?;
    let (w, h) = frame.dimensions();
    if [w, h] != expected {
        return Err(TrackError::InconsistentFrameDimensions {
            frame: index,
            expected,
            found: [w, h],
        });
    }
    Ok(frame)
}

/// Validate the stack shape and apply `per_frame` to frames `1..=n` in order.
fn walk_stack<T>(
    source: &dyn FrameSource,
    mut per_frame: impl FnMut(usize, &Frame) -> T,
) -> Result<Vec<T>, TrackError> {
    let n_frames = source.frame_count();
    if n_frames == 0 {
        return Err(TrackError::EmptyFrameSource);
    }
    let first = source.frame(1)?;
    let (w, h) = first.dimensions();

    let mut out = Vec::with_capacity(n_frames);
    out.push(per_frame(1, &first));
    for k in 2..=n_frames {
        let frame = checked_frame(source, k, [w, h])?;
        out.push(per_frame(k, &frame));
    }
    Ok(out)
}

/// Detect regions in every frame of the stack, without tracking.
pub fn detect_stack(
    source: &dyn FrameSource,
    config: &SegmentConfig,
) -> Result<Vec<FrameRegions>, TrackError> {
    config.validate()?;
    walk_stack(source, |k, frame| FrameRegions {
        frame: k,
        regions: detect_regions(frame, config),
    })
}

/// Like [`detect_stack`], also returning each frame's final mask.
pub fn segment_stack(
    source: &dyn FrameSource,
    config: &SegmentConfig,
) -> Result<Vec<(FrameRegions, BinaryMask)>, TrackError> {
    config.validate()?;
    walk_stack(source, |k, frame| {
        let mask = segment_frame(frame, config);
        let regions = extract_regions_min_area(&mask, config.min_region_area);
        (FrameRegions { frame: k, regions }, mask)
    })
}

/// Run the full pipeline over a stack.
///
/// `seeds` select the cells to follow (one track per seed, in order). When an
/// annotation sink is given it receives a snapshot after every frame.
pub fn run_tracking(
    source: &dyn FrameSource,
    seeds: &[SeedPoint],
    config: &PipelineConfig,
    mut annotations: Option<&mut dyn AnnotationSink>,
) -> Result<TrackingResult, TrackError> {
    config.validate()?;
    let n_frames = source.frame_count();
    if n_frames == 0 {
        return Err(TrackError::EmptyFrameSource);
    }

    let first = source.frame(1)?;
    let (w, h) = first.dimensions();
    let regions = detect_regions(&first, &config.segmentation);
    tracing::debug!("frame 1: {} regions", regions.len());
    let mut tracker = Tracker::initialize(&regions, seeds, (w, h))?;
    if let Some(sink) = annotations.as_mut() {
        sink.annotate(&AnnotationFrame::from_tracks(1, tracker.tracks()));
    }

    for k in 2..=n_frames {
        let frame = checked_frame(source, k, [w, h])?;
        let regions = detect_regions(&frame, &config.segmentation);
        tracing::debug!("frame {}: {} regions", k, regions.len());
        tracker.advance(&regions)?;
        if let Some(sink) = annotations.as_mut() {
            sink.annotate(&AnnotationFrame::from_tracks(k, tracker.tracks()));
        }
    }

    let tracks = tracker.into_tracks();
    let kinematics = compute_kinematics(&tracks, &config.kinematics);
    tracing::info!(
        "tracked {} cells over {} frames ({}x{})",
        tracks.len(),
        n_frames,
        w,
        h
    );

    Ok(TrackingResult {
        frame_count: n_frames,
        image_size: [w, h],
        tracks,
        kinematics,
    })
}
