//! Kinematic descriptors derived from completed tracks.
//!
//! Per track and frame `k` (1-based):
//! - `step[k]`: physical distance from the previous position (`NaN` at k = 1),
//! - `length[k]`: cumulative path length, `sum(step[2..=k])`,
//! - `displacement_to_start[k]`: beeline distance to the first position,
//! - `velocity[k] = step[k] / frame_interval`,
//! - `heading[k]`: `atan(Δy / Δx)` in degrees, two-quadrant (`[-90, 90]`),
//! - `turning_angle[k] = heading[k] - heading[k - 1]` for k >= 3,
//! - `cos_turning_angle[k]`.
//!
//! Undefined values are `NaN`, never zero.

use crate::error::TrackError;
use crate::tracker::Track;

/// Physical scale of the stack. Both values must be given explicitly.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KinematicsConfig {
    /// Time between consecutive frames.
    pub frame_interval: f64,
    /// Physical edge length of one pixel.
    pub pixel_size: f64,
}

impl KinematicsConfig {
    pub fn validate(&self) -> Result<(), TrackError> {
        if !self.frame_interval.is_finite() || self.frame_interval <= 0.0 {
            return Err(TrackError::InvalidConfig(
                "frame_interval must be finite and > 0".to_string(),
            ));
        }
        if !self.pixel_size.is_finite() || self.pixel_size <= 0.0 {
            return Err(TrackError::InvalidConfig(
                "pixel_size must be finite and > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Derived quantities of one track at one frame.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KinematicRecord {
    /// 1-based frame index.
    pub frame: usize,
    /// `(frame - 1) * frame_interval`.
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub step: f64,
    pub length: f64,
    pub displacement_to_start: f64,
    pub velocity: f64,
    /// Degrees.
    pub heading: f64,
    /// Degrees.
    pub turning_angle: f64,
    pub cos_turning_angle: f64,
}

/// All records of one track, in frame order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackKinematics {
    pub track_id: usize,
    pub records: Vec<KinematicRecord>,
}

/// Whole-track migration summary.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackSummary {
    pub track_id: usize,
    pub path_length: f64,
    pub net_displacement: f64,
    /// Mean of the defined per-frame velocities.
    pub mean_velocity: f64,
    /// `net_displacement / path_length`; `NaN` for a track that never moves.
    pub directionality: f64,
    /// Mean of the defined turning-angle cosines.
    pub mean_cos_turning_angle: f64,
}

impl TrackKinematics {
    pub fn summary(&self) -> TrackSummary {
        let last = self.records.last();
        let path_length = last.map(|r| r.length).unwrap_or(f64::NAN);
        let net_displacement = last.map(|r| r.displacement_to_start).unwrap_or(f64::NAN);
        let directionality = if path_length > 0.0 {
            net_displacement / path_length
        } else {
            f64::NAN
        };
        TrackSummary {
            track_id: self.track_id,
            path_length,
            net_displacement,
            mean_velocity: nan_mean(self.records.iter().map(|r| r.velocity)),
            directionality,
            mean_cos_turning_angle: nan_mean(self.records.iter().map(|r| r.cos_turning_angle)),
        }
    }
}

fn nan_mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

#[inline]
fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

/// Two-quadrant heading of the vector `(dx, dy)` in degrees.
///
/// Vertical steps map to ±90° by the sign of `dy`; a zero-length step has no
/// heading and yields `NaN`.
pub fn heading_deg(dx: f64, dy: f64) -> f64 {
    if dx == 0.0 {
        if dy > 0.0 {
            90.0
        } else if dy < 0.0 {
            -90.0
        } else {
            f64::NAN
        }
    } else {
        (dy / dx).atan().to_degrees()
    }
}

/// Derive per-frame records for one track.
pub fn track_kinematics(track: &Track, config: &KinematicsConfig) -> TrackKinematics {
    let positions = &track.positions;
    let mut records = Vec::with_capacity(positions.len());
    let Some(&start) = positions.first() else {
        return TrackKinematics {
            track_id: track.id,
            records,
        };
    };

    let mut length = 0.0;
    let mut prev_heading = f64::NAN;
    for (i, &pos) in positions.iter().enumerate() {
        let (step, heading) = if i == 0 {
            (f64::NAN, f64::NAN)
        } else {
            let prev = positions[i - 1];
            (
                config.pixel_size * distance(pos, prev),
                heading_deg(pos[0] - prev[0], pos[1] - prev[1]),
            )
        };
        if i > 0 {
            length += step;
        }
        // prev_heading is NaN at i <= 1, which makes the turning angle NaN there.
        let turning_angle = heading - prev_heading;

        records.push(KinematicRecord {
            frame: i + 1,
            time: i as f64 * config.frame_interval,
            x: pos[0],
            y: pos[1],
            step,
            length,
            displacement_to_start: config.pixel_size * distance(pos, start),
            velocity: step / config.frame_interval,
            heading,
            turning_angle,
            cos_turning_angle: turning_angle.to_radians().cos(),
        });
        prev_heading = heading;
    }

    TrackKinematics {
        track_id: track.id,
        records,
    }
}

/// Derive records for every track.
pub fn compute_kinematics(tracks: &[Track], config: &KinematicsConfig) -> Vec<TrackKinematics> {
    tracks
        .iter()
        .map(|track| track_kinematics(track, config))
        .collect()
}
