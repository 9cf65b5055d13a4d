//! Collinearity test for minimal samples.
//!
//! A sample is rejected when one of its points lies on the line through two
//! other points of the same set. The tolerance scales with the magnitude of
//! the difference vectors involved, so the test behaves identically for
//! pixel and normalized coordinates.

use crate::types::{point_a, point_b, DataMatrix};
use nalgebra::Point2;

/// Relative tolerance of the collinearity test.
pub const COLLINEARITY_EPSILON: f64 = f32::EPSILON as f64;

/// Check that the last point of `points` is not collinear with any pair of
/// earlier points.
pub fn is_last_point_valid(points: &[Point2<f64>]) -> bool {
    let Some((last, earlier)) = points.split_last() else {
        return true;
    };

    for (j, pj) in earlier.iter().enumerate() {
        let d1 = pj - last;
        for pk in &earlier[..j] {
            let d2 = pk - last;
            let cross = d2.x * d1.y - d2.y * d1.x;
            let scale = d1.x.abs() + d1.y.abs() + d2.x.abs() + d2.y.abs();
            if cross.abs() < COLLINEARITY_EPSILON * scale {
                return false;
            }
        }
    }
    true
}

/// Check every point of `points` against all pairs before it.
pub fn is_point_set_valid(points: &[Point2<f64>]) -> bool {
    (3..=points.len()).all(|len| is_last_point_valid(&points[..len]))
}

/// Incremental check on both point sets of a correspondence sample: only
/// the newest index of `sample` is tested.
pub fn is_partial_sample_valid(data: &DataMatrix, sample: &[usize]) -> bool {
    let a: Vec<Point2<f64>> = sample.iter().map(|&i| point_a(data, i)).collect();
    let b: Vec<Point2<f64>> = sample.iter().map(|&i| point_b(data, i)).collect();
    is_last_point_valid(&a) && is_last_point_valid(&b)
}

/// Full check on both point sets of a complete sample.
pub fn is_sample_valid(data: &DataMatrix, sample: &[usize]) -> bool {
    let a: Vec<Point2<f64>> = sample.iter().map(|&i| point_a(data, i)).collect();
    let b: Vec<Point2<f64>> = sample.iter().map(|&i| point_b(data, i)).collect();
    is_point_set_valid(&a) && is_point_set_valid(&b)
}
