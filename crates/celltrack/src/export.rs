//! Data contracts toward exporters and annotation renderers.

use crate::kinematics::TrackKinematics;
use crate::tracker::Track;

/// One exported table row. Field order is the column order.
///
/// Undefined quantities are `None`, which serializes to JSON `null` and to
/// an empty CSV cell.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResultRow {
    pub track_id: usize,
    pub frame: usize,
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub step: Option<f64>,
    pub length: Option<f64>,
    pub displacement_to_start: Option<f64>,
    pub velocity: Option<f64>,
    pub heading: Option<f64>,
    pub turning_angle: Option<f64>,
    pub cos_turning_angle: Option<f64>,
}

impl ResultRow {
    pub const COLUMNS: [&'static str; 12] = [
        "track_id",
        "frame",
        "time",
        "x",
        "y",
        "step",
        "length",
        "displacement_to_start",
        "velocity",
        "heading",
        "turning_angle",
        "cos_turning_angle",
    ];
}

#[inline]
fn defined(v: f64) -> Option<f64> {
    (!v.is_nan()).then_some(v)
}

/// Flatten kinematics into rows, track-major then frame order.
pub fn result_rows(kinematics: &[TrackKinematics]) -> Vec<ResultRow> {
    kinematics
        .iter()
        .flat_map(|tk| {
            tk.records.iter().map(move |r| ResultRow {
                track_id: tk.track_id,
                frame: r.frame,
                time: r.time,
                x: r.x,
                y: r.y,
                step: defined(r.step),
                length: defined(r.length),
                displacement_to_start: defined(r.displacement_to_start),
                velocity: defined(r.velocity),
                heading: defined(r.heading),
                turning_angle: defined(r.turning_angle),
                cos_turning_angle: defined(r.cos_turning_angle),
            })
        })
        .collect()
}

/// Consumer of result rows (spreadsheet, CSV, database, ...).
pub trait ResultSink {
    fn write_row(&mut self, row: &ResultRow) -> Result<(), Box<dyn std::error::Error>>;
}

impl ResultSink for Vec<ResultRow> {
    fn write_row(&mut self, row: &ResultRow) -> Result<(), Box<dyn std::error::Error>> {
        self.push(*row);
        Ok(())
    }
}

/// Push every row of `kinematics` into `sink`; returns the row count.
pub fn write_rows(
    kinematics: &[TrackKinematics],
    sink: &mut dyn ResultSink,
) -> Result<usize, Box<dyn std::error::Error>> {
    let rows = result_rows(kinematics);
    for row in &rows {
        sink.write_row(row)?;
    }
    Ok(rows.len())
}

/// A track as seen at one frame: current position plus the path so far.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnnotatedTrack {
    pub track_id: usize,
    pub position: [f64; 2],
    pub path: Vec<[f64; 2]>,
}

/// Everything a renderer needs to draw one frame's overlay.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnnotationFrame {
    pub frame: usize,
    pub tracks: Vec<AnnotatedTrack>,
}

impl AnnotationFrame {
    /// Snapshot of `tracks` after `frame` has been processed.
    pub fn from_tracks(frame: usize, tracks: &[Track]) -> Self {
        let tracks = tracks
            .iter()
            .filter_map(|t| {
                let path = t.positions.get(..frame)?.to_vec();
                let position = *path.last()?;
                Some(AnnotatedTrack {
                    track_id: t.id,
                    position,
                    path,
                })
            })
            .collect();
        Self { frame, tracks }
    }
}

/// Consumer of per-frame track overlays.
pub trait AnnotationSink {
    fn annotate(&mut self, frame: &AnnotationFrame);
}

impl AnnotationSink for Vec<AnnotationFrame> {
    fn annotate(&mut self, frame: &AnnotationFrame) {
        self.push(frame.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::{compute_kinematics, KinematicsConfig};

    fn tracks() -> Vec<Track> {
        vec![
            Track {
                id: 1,
                positions: vec![[10.0, 10.0], [12.0, 11.0], [15.0, 11.0]],
            },
            Track {
                id: 2,
                positions: vec![[30.0, 5.0], [30.0, 5.0], [31.0, 5.0]],
            },
        ]
    }

    fn unit() -> KinematicsConfig {
        KinematicsConfig {
            frame_interval: 1.0,
            pixel_size: 1.0,
        }
    }

    #[test]
    fn rows_are_track_major_with_undefined_as_none() {
        let rows = result_rows(&compute_kinematics(&tracks(), &unit()));
        assert_eq!(rows.len(), 6);
        let order: Vec<(usize, usize)> = rows.iter().map(|r| (r.track_id, r.frame)).collect();
        assert_eq!(order, vec![(1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (2, 3)]);

        assert_eq!(rows[0].step, None);
        assert_eq!(rows[0].length, Some(0.0));
        assert_eq!(rows[2].step, Some(3.0));
        // Track 2 stands still between frames 1 and 2: no heading.
        assert_eq!(rows[4].step, Some(0.0));
        assert_eq!(rows[4].heading, None);
        assert_eq!(rows[5].turning_angle, None);
    }

    #[test]
    fn json_columns_follow_declared_order() {
        let rows = result_rows(&compute_kinematics(&tracks(), &unit()));
        let json = serde_json::to_string(&rows[0]).unwrap();
        let mut last = 0;
        for col in ResultRow::COLUMNS {
            let pos = json.find(&format!("\"{}\"", col)).unwrap();
            assert!(pos >= last, "{} out of order", col);
            last = pos;
        }
        assert!(json.contains("\"step\":null"));
    }

    #[test]
    fn vec_sink_collects_rows() {
        let mut sink: Vec<ResultRow> = Vec::new();
        let n = write_rows(&compute_kinematics(&tracks(), &unit()), &mut sink).unwrap();
        assert_eq!(n, 6);
        assert_eq!(sink.len(), 6);
    }

    #[test]
    fn annotation_paths_grow_with_frames() {
        let tracks = tracks();
        let f2 = AnnotationFrame::from_tracks(2, &tracks);
        assert_eq!(f2.tracks.len(), 2);
        assert_eq!(f2.tracks[0].position, [12.0, 11.0]);
        assert_eq!(f2.tracks[0].path, vec![[10.0, 10.0], [12.0, 11.0]]);
        assert!(AnnotationFrame::from_tracks(0, &tracks).tracks.is_empty());
    }
}
