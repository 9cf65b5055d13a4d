//! Epipolar lines induced by a fundamental matrix.

use crate::models::FundamentalMatrix;
use nalgebra::{Point2, Vector3};
use serde::{Deserialize, Serialize};

/// Image a set of points belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageIndex {
    /// Points of set A; their lines live in image B.
    First,
    /// Points of set B; their lines live in image A.
    Second,
}

/// Line `(a, b, c)` with `a·x + b·y + c = 0` in the other image for every
/// point, scaled so that `a² + b² = 1` when possible.
pub fn compute_correspond_epilines(
    points: &[Point2<f64>],
    image: ImageIndex,
    model: &FundamentalMatrix,
) -> Vec<Vector3<f64>> {
    let f = match image {
        ImageIndex::First => model.f,
        ImageIndex::Second => model.f.transpose(),
    };
    points
        .iter()
        .map(|p| {
            let line = f * p.to_homogeneous();
            let norm = line.x.hypot(line.y);
            if norm != 0.0 {
                line / norm
            } else {
                line
            }
        })
        .collect()
}
