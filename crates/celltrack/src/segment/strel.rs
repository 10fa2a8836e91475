//! Flat structuring elements as lists of pixel offsets.

/// Orientations (degrees, counter-clockwise from +x) of the gap-closing lines.
pub const GAP_CLOSING_ANGLES_DEG: [f64; 4] = [0.0, 30.0, 60.0, 90.0];

/// A flat structuring element: the set of `[dx, dy]` offsets it covers.
///
/// Offsets are kept sorted and unique; `[0, 0]` is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    offsets: Vec<[i32; 2]>,
}

impl StructuringElement {
    pub fn from_offsets(mut offsets: Vec<[i32; 2]>) -> Self {
        offsets.push([0, 0]);
        offsets.sort_unstable_by_key(|&[dx, dy]| (dy, dx));
        offsets.dedup();
        Self { offsets }
    }

    /// A centered line segment of `length` pixels at `angle_deg`.
    ///
    /// Angles follow the usual image convention of counter-clockwise from
    /// the +x axis with y pointing down, so 90° is vertical.
    pub fn line(length: u32, angle_deg: f64) -> Self {
        if length <= 1 {
            return Self::from_offsets(Vec::new());
        }
        let theta = angle_deg.to_radians();
        let (sin, cos) = theta.sin_cos();
        let half = (length - 1) as f64 / 2.0;
        let steps = (length - 1) * 4;
        let offsets = (0..=steps)
            .map(|i| {
                let t = -half + i as f64 * 0.25;
                [(t * cos).round() as i32, -(t * sin).round() as i32]
            })
            .collect();
        Self::from_offsets(offsets)
    }

    /// Union of centered lines of the same length at several orientations.
    pub fn oriented_lines(length: u32, angles_deg: &[f64]) -> Self {
        let offsets = angles_deg
            .iter()
            .flat_map(|&a| Self::line(length, a).offsets)
            .collect();
        Self::from_offsets(offsets)
    }

    /// Euclidean disk of the given radius.
    pub fn disk(radius: u32) -> Self {
        let r = radius as i32;
        let r2 = r * r;
        let mut offsets = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r2 {
                    offsets.push([dx, dy]);
                }
            }
        }
        Self::from_offsets(offsets)
    }

    pub fn offsets(&self) -> &[[i32; 2]] {
        &self.offsets
    }
}
