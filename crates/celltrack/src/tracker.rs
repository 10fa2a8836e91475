//! Track initialization and frame-to-frame nearest-centroid tracking.
//!
//! Assignment is greedy and per track: each track independently moves to the
//! region centroid nearest to its previous position. There is no mutual
//! exclusion, so several tracks may share a region in the same frame, and no
//! track is ever terminated or re-acquired. Distance ties resolve to the
//! first region in extraction order.

use crate::error::TrackError;
use crate::regions::Region;

/// User-chosen starting coordinate in frame-1 pixel space.
///
/// Serialized as a plain `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct SeedPoint {
    pub x: f64,
    pub y: f64,
}

impl SeedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn in_bounds(&self, width: u32, height: u32) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.x >= 0.0
            && self.y >= 0.0
            && self.x < width as f64
            && self.y < height as f64
    }
}

impl From<[f64; 2]> for SeedPoint {
    fn from(xy: [f64; 2]) -> Self {
        Self::new(xy[0], xy[1])
    }
}

impl From<SeedPoint> for [f64; 2] {
    fn from(p: SeedPoint) -> Self {
        [p.x, p.y]
    }
}

/// Positions of one tracked cell, one entry per processed frame.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Track {
    /// 1-based track ID, in seed order.
    pub id: usize,
    /// `positions[k - 1]` is the `[x, y]` position in frame `k`.
    pub positions: Vec<[f64; 2]>,
}

impl Track {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position in the most recently processed frame.
    pub fn last_position(&self) -> Option<[f64; 2]> {
        self.positions.last().copied()
    }
}

/// Index of the region whose centroid is nearest to `point`.
///
/// Returns `None` for an empty region list. Ties keep the earliest region.
pub fn nearest_region(point: [f64; 2], regions: &[Region]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, region) in regions.iter().enumerate() {
        let dx = region.centroid[0] - point[0];
        let dy = region.centroid[1] - point[1];
        let d2 = dx * dx + dy * dy;
        match best {
            Some((_, best_d2)) if d2 >= best_d2 => {}
            _ => best = Some((i, d2)),
        }
    }
    best.map(|(i, _)| i)
}

/// Owner of all tracks during the frame walk.
#[derive(Debug, Clone)]
pub struct Tracker {
    tracks: Vec<Track>,
    frames_processed: usize,
}

impl Tracker {
    /// Bind each seed to its nearest frame-1 region centroid.
    ///
    /// `frame_size` is `(width, height)` of frame 1; seeds must lie inside it.
    pub fn initialize(
        regions: &[Region],
        seeds: &[SeedPoint],
        frame_size: (u32, u32),
    ) -> Result<Self, TrackError> {
        if seeds.is_empty() {
            return Err(TrackError::InvalidConfig(
                "at least one seed point is required".to_string(),
            ));
        }
        let (width, height) = frame_size;
        for (i, seed) in seeds.iter().enumerate() {
            if !seed.in_bounds(width, height) {
                return Err(TrackError::InvalidSeedPoint {
                    seed: i,
                    x: seed.x,
                    y: seed.y,
                    width,
                    height,
                });
            }
        }
        if regions.is_empty() {
            return Err(TrackError::NoRegionsAvailable { frame: 1 });
        }

        let tracks: Vec<Track> = seeds
            .iter()
            .enumerate()
            .map(|(i, seed)| {
                let nearest = nearest_region([seed.x, seed.y], regions)
                    .expect("region list is non-empty");
                tracing::trace!(
                    "track {}: seed ({:.1}, {:.1}) -> region {}",
                    i + 1,
                    seed.x,
                    seed.y,
                    regions[nearest].label
                );
                Track {
                    id: i + 1,
                    positions: vec![regions[nearest].centroid],
                }
            })
            .collect();

        tracing::debug!(
            "initialized {} tracks from {} frame-1 regions",
            tracks.len(),
            regions.len()
        );
        Ok(Self {
            tracks,
            frames_processed: 1,
        })
    }

    /// Extend every track into the next frame.
    ///
    /// Returns, per track, the index of the region it was assigned to. On
    /// error no track is modified.
    pub fn advance(&mut self, regions: &[Region]) -> Result<Vec<usize>, TrackError> {
        let frame = self.frames_processed + 1;
        if regions.is_empty() {
            return Err(TrackError::NoRegionsAvailable { frame });
        }

        let assignments: Vec<usize> = self
            .tracks
            .iter()
            .map(|track| {
                let prev = track.last_position().expect("tracks start with one position");
                nearest_region(prev, regions).expect("region list is non-empty")
            })
            .collect();

        for (track, &region_idx) in self.tracks.iter_mut().zip(&assignments) {
            track.positions.push(regions[region_idx].centroid);
        }
        self.frames_processed = frame;

        let mut shared = assignments.clone();
        shared.sort_unstable();
        shared.dedup();
        if shared.len() < assignments.len() {
            tracing::debug!(
                "frame {}: {} tracks share {} regions",
                frame,
                assignments.len(),
                shared.len()
            );
        }
        Ok(assignments)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of frames every track has a position for.
    pub fn frames_processed(&self) -> usize {
        self.frames_processed
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(label: u32, x: f64, y: f64) -> Region {
        Region {
            label,
            area: 10,
            centroid: [x, y],
        }
    }

    #[test]
    fn nearest_region_prefers_first_on_ties() {
        let regions = [region(1, 0.0, 0.0), region(2, 4.0, 0.0), region(3, 2.0, 2.0)];
        assert_eq!(nearest_region([2.0, 0.0], &regions), Some(0));
        assert_eq!(nearest_region([3.9, 0.0], &regions), Some(1));
        assert_eq!(nearest_region([2.0, 1.9], &regions), Some(2));
        assert_eq!(nearest_region([2.0, 1.9], &[]), None);
    }

    #[test]
    fn seeds_bind_to_nearest_centroid() {
        let regions = [region(1, 10.0, 10.0), region(2, 40.0, 12.0)];
        let seeds = [SeedPoint::new(38.0, 15.0), SeedPoint::new(11.0, 9.0)];
        let tracker = Tracker::initialize(&regions, &seeds, (64, 64)).unwrap();
        let tracks = tracker.tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id, 1);
        assert_eq!(tracks[0].positions, vec![[40.0, 12.0]]);
        assert_eq!(tracks[1].positions, vec![[10.0, 10.0]]);
        assert_eq!(tracker.frames_processed(), 1);
    }

    #[test]
    fn two_seeds_may_share_a_region() {
        let regions = [region(1, 10.0, 10.0), region(2, 50.0, 50.0)];
        let seeds = [SeedPoint::new(8.0, 8.0), SeedPoint::new(12.0, 13.0)];
        let tracker = Tracker::initialize(&regions, &seeds, (64, 64)).unwrap();
        assert_eq!(
            tracker.tracks()[0].positions[0],
            tracker.tracks()[1].positions[0]
        );
    }

    #[test]
    fn initialization_requires_regions() {
        let err = Tracker::initialize(&[], &[SeedPoint::new(1.0, 1.0)], (8, 8)).unwrap_err();
        assert_eq!(err, TrackError::NoRegionsAvailable { frame: 1 });
    }

    #[test]
    fn seeds_outside_frame_are_rejected() {
        let regions = [region(1, 2.0, 2.0)];
        for (x, y) in [(-0.5, 2.0), (8.0, 2.0), (2.0, 8.0), (f64::NAN, 1.0)] {
            let err = Tracker::initialize(&regions, &[SeedPoint::new(x, y)], (8, 8)).unwrap_err();
            assert!(matches!(err, TrackError::InvalidSeedPoint { seed: 0, .. }));
        }
        assert!(Tracker::initialize(&regions, &[SeedPoint::new(7.9, 0.0)], (8, 8)).is_ok());
    }

    #[test]
    fn initialization_requires_seeds() {
        let regions = [region(1, 2.0, 2.0)];
        assert!(matches!(
            Tracker::initialize(&regions, &[], (8, 8)),
            Err(TrackError::InvalidConfig(_))
        ));
    }

    #[test]
    fn advance_follows_nearest_centroid_without_gaps() {
        let seeds = [SeedPoint::new(10.0, 10.0), SeedPoint::new(40.0, 40.0)];
        let mut tracker =
            Tracker::initialize(&[region(1, 10.0, 10.0), region(2, 40.0, 40.0)], &seeds, (64, 64))
                .unwrap();

        let frames = [
            vec![region(1, 42.0, 41.0), region(2, 12.0, 11.0)],
            vec![region(1, 15.0, 11.0), region(2, 45.0, 43.0), region(3, 30.0, 30.0)],
        ];
        for (k, regions) in frames.iter().enumerate() {
            tracker.advance(regions).unwrap();
            assert_eq!(tracker.frames_processed(), k + 2);
            for track in tracker.tracks() {
                assert_eq!(track.len(), k + 2);
            }
        }
        let tracks = tracker.into_tracks();
        assert_eq!(
            tracks[0].positions,
            vec![[10.0, 10.0], [12.0, 11.0], [15.0, 11.0]]
        );
        assert_eq!(
            tracks[1].positions,
            vec![[40.0, 40.0], [42.0, 41.0], [45.0, 43.0]]
        );
    }

    #[test]
    fn tracks_may_collapse_onto_one_region() {
        let seeds = [SeedPoint::new(10.0, 10.0), SeedPoint::new(20.0, 10.0)];
        let mut tracker =
            Tracker::initialize(&[region(1, 10.0, 10.0), region(2, 20.0, 10.0)], &seeds, (32, 32))
                .unwrap();
        let assigned = tracker.advance(&[region(1, 15.0, 10.0)]).unwrap();
        assert_eq!(assigned, vec![0, 0]);
        assert_eq!(tracker.tracks()[0].last_position(), Some([15.0, 10.0]));
        assert_eq!(tracker.tracks()[1].last_position(), Some([15.0, 10.0]));
    }

    #[test]
    fn empty_frame_mid_sequence_fails_without_mutation() {
        let seeds = [SeedPoint::new(5.0, 5.0)];
        let mut tracker = Tracker::initialize(&[region(1, 5.0, 5.0)], &seeds, (16, 16)).unwrap();
        tracker.advance(&[region(1, 6.0, 5.0)]).unwrap();
        let err = tracker.advance(&[]).unwrap_err();
        assert_eq!(err, TrackError::NoRegionsAvailable { frame: 3 });
        assert_eq!(tracker.frames_processed(), 2);
        assert_eq!(tracker.tracks()[0].len(), 2);
    }

    #[test]
    fn seed_points_serialize_as_pairs() {
        let seeds: Vec<SeedPoint> = serde_json::from_str("[[1.5, 2.0], [3, 4]]").unwrap();
        assert_eq!(seeds, vec![SeedPoint::new(1.5, 2.0), SeedPoint::new(3.0, 4.0)]);
        assert_eq!(serde_json::to_string(&seeds[0]).unwrap(), "[1.5,2.0]");
    }
}
