//! High-level tracking API.
//!
//! [`CellTracker`] wraps a validated [`PipelineConfig`]: create once, run on
//! many stacks.

use std::path::Path;

use crate::config::PipelineConfig;
use crate::error::TrackError;
use crate::export::AnnotationSink;
use crate::frame::{Frame, FrameSource};
use crate::pipeline::{self, FrameRegions, TrackingResult};
use crate::regions::Region;
use crate::tracker::SeedPoint;

/// Primary tracking interface.
///
/// # Examples
///
/// ```no_run
/// use celltrack::{CellTracker, ImageSequence, SeedPoint};
/// use std::path::Path;
///
/// let tracker = CellTracker::from_json_file(Path::new("config.json")).unwrap();
/// let stack = ImageSequence::from_dir(Path::new("frames/")).unwrap();
/// let result = tracker.track(&stack, &[SeedPoint::new(120.0, 88.0)]).unwrap();
/// for row in result.rows() {
///     println!("{} {} {:?}", row.track_id, row.frame, row.velocity);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CellTracker {
    config: PipelineConfig,
}

impl CellTracker {
    /// Validate `config` and wrap it.
    pub fn new(config: PipelineConfig) -> Result<Self, TrackError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Load configuration JSON and create a tracker in one step.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::new(PipelineConfig::from_json_file(path)?)?)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Mutable access for post-construction tuning; re-validated on every run.
    pub fn config_mut(&mut self) -> &mut PipelineConfig {
        &mut self.config
    }

    /// Candidate regions of a single frame.
    pub fn regions(&self, frame: &Frame) -> Vec<Region> {
        pipeline::detect_regions(frame, &self.config.segmentation)
    }

    /// Candidate regions of every frame, without tracking.
    pub fn detect_stack(&self, source: &dyn FrameSource) -> Result<Vec<FrameRegions>, TrackError> {
        pipeline::detect_stack(source, &self.config.segmentation)
    }

    /// Track the cells selected by `seeds` through the whole stack.
    pub fn track(
        &self,
        source: &dyn FrameSource,
        seeds: &[SeedPoint],
    ) -> Result<TrackingResult, TrackError> {
        pipeline::run_tracking(source, seeds, &self.config, None)
    }

    /// Like [`CellTracker::track`], feeding per-frame overlays to `sink`.
    pub fn track_with_annotations(
        &self,
        source: &dyn FrameSource,
        seeds: &[SeedPoint],
        sink: &mut dyn AnnotationSink,
    ) -> Result<TrackingResult, TrackError> {
        pipeline::run_tracking(source, seeds, &self.config, Some(sink))
    }
}
