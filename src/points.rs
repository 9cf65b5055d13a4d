//! Conversion between caller point arrays and the internal representation.
//!
//! Point matrices may hold one point per row (`N×2`, `N×3`) or one point per
//! column (`2×N`, `3×N`). The longer dimension is the point count; square
//! inputs are read column-wise. Homogeneous points are divided by their last
//! coordinate, with a zero last coordinate treated as one.

use crate::error::InputError;
use crate::types::{DataMatrix, DATA_COLUMNS};
use nalgebra::{DMatrix, Point2};

/// Read 2-D points from a matrix in any supported layout.
pub fn points_from_matrix(m: &DMatrix<f64>) -> Result<Vec<Point2<f64>>, InputError> {
    let (rows, cols) = m.shape();
    let layout_error = InputError::PointLayout { rows, cols };

    let (per_row, dims) = if rows > cols {
        (true, cols)
    } else {
        (false, rows)
    };
    if dims != 2 && dims != 3 {
        return Err(layout_error);
    }
    let count = if per_row { rows } else { cols };

    let coord = |i: usize, k: usize| if per_row { m[(i, k)] } else { m[(k, i)] };
    let points = (0..count)
        .map(|i| {
            let (x, y) = (coord(i, 0), coord(i, 1));
            if dims == 3 {
                let w = coord(i, 2);
                let scale = if w != 0.0 { 1.0 / w } else { 1.0 };
                Point2::new(x * scale, y * scale)
            } else {
                Point2::new(x, y)
            }
        })
        .collect();
    Ok(points)
}

/// Homogeneous `N×3` matrix with unit last coordinate.
pub fn to_homogeneous(points: &[Point2<f64>]) -> DMatrix<f64> {
    DMatrix::from_fn(points.len(), 3, |i, k| match k {
        0 => points[i].x,
        1 => points[i].y,
        _ => 1.0,
    })
}

/// Pair two point sets into a correspondence [`DataMatrix`].
pub fn data_from_points(
    points_a: &[Point2<f64>],
    points_b: &[Point2<f64>],
) -> Result<DataMatrix, InputError> {
    if points_a.len() != points_b.len() {
        return Err(InputError::LengthMismatch {
            a: points_a.len(),
            b: points_b.len(),
        });
    }
    if points_a
        .iter()
        .chain(points_b)
        .any(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        return Err(InputError::NonFinite("points"));
    }

    let mut data = DataMatrix::zeros(points_a.len(), DATA_COLUMNS);
    for (i, (a, b)) in points_a.iter().zip(points_b).enumerate() {
        data[(i, 0)] = a.x;
        data[(i, 1)] = a.y;
        data[(i, 2)] = b.x;
        data[(i, 3)] = b.y;
    }
    Ok(data)
}
