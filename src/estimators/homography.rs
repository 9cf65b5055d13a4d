//! Homography estimator using the normalized direct linear transform.

use super::{centroids, null_vector};
use crate::core::Estimator;
use crate::error::InputError;
use crate::models::Homography;
use crate::types::DataMatrix;
use nalgebra::{Matrix3, SMatrix, SVector, Vector2};

/// Homography estimator using the normalized DLT.
///
/// Accepts any sample of at least four correspondences; larger samples are
/// solved in the least-squares sense. `sample_size` only decides how many
/// correspondences the robust loops draw per hypothesis.
#[derive(Debug, Clone, Copy)]
pub struct HomographyEstimator {
    sample_size: usize,
}

impl Default for HomographyEstimator {
    fn default() -> Self {
        Self { sample_size: 4 }
    }
}

impl HomographyEstimator {
    pub const ALLOWED_SAMPLE_SIZES: &'static [usize] = &[4, 5];

    pub fn new(sample_size: usize) -> Result<Self, InputError> {
        if !Self::ALLOWED_SAMPLE_SIZES.contains(&sample_size) {
            return Err(InputError::SampleSize {
                size: sample_size,
                allowed: Self::ALLOWED_SAMPLE_SIZES,
            });
        }
        Ok(Self { sample_size })
    }
}

/// Per-axis inverse mean absolute deviation around `center`.
fn axis_scales(
    data: &DataMatrix,
    sample: &[usize],
    column: usize,
    center: Vector2<f64>,
) -> Option<Vector2<f64>> {
    let mut spread = Vector2::<f64>::zeros();
    for &i in sample {
        spread.x += (data[(i, column)] - center.x).abs();
        spread.y += (data[(i, column + 1)] - center.y).abs();
    }
    if spread.x < f64::EPSILON || spread.y < f64::EPSILON {
        return None;
    }
    let count = sample.len() as f64;
    Some(Vector2::new(count / spread.x, count / spread.y))
}

impl Estimator for HomographyEstimator {
    type Model = Homography;

    fn sample_size(&self) -> usize {
        self.sample_size
    }

    fn estimate_model(&self, data: &DataMatrix, sample: &[usize]) -> Vec<Homography> {
        if sample.len() < 4 {
            return Vec::new();
        }

        // Set A is the source (M), set B the destination (m).
        let (c_src, c_dst) = centroids(data, sample);
        let (c_src, c_dst) = (c_src.coords, c_dst.coords);
        let (Some(s_src), Some(s_dst)) = (
            axis_scales(data, sample, 0, c_src),
            axis_scales(data, sample, 2, c_dst),
        ) else {
            return Vec::new();
        };

        let mut ltl = SMatrix::<f64, 9, 9>::zeros();
        for &i in sample {
            let sx = (data[(i, 0)] - c_src.x) * s_src.x;
            let sy = (data[(i, 1)] - c_src.y) * s_src.y;
            let dx = (data[(i, 2)] - c_dst.x) * s_dst.x;
            let dy = (data[(i, 3)] - c_dst.y) * s_dst.y;

            let lx = SVector::<f64, 9>::from([
                sx,
                sy,
                1.0,
                0.0,
                0.0,
                0.0,
                -dx * sx,
                -dx * sy,
                -dx,
            ]);
            let ly = SVector::<f64, 9>::from([
                0.0,
                0.0,
                0.0,
                sx,
                sy,
                1.0,
                -dy * sx,
                -dy * sy,
                -dy,
            ]);
            ltl.ger(1.0, &lx, &lx, 1.0);
            ltl.ger(1.0, &ly, &ly, 1.0);
        }

        let Some((h0, _)) = null_vector(ltl) else {
            return Vec::new();
        };
        let h0 = Matrix3::from_row_slice(h0.as_slice());

        let inv_norm_dst = Matrix3::new(
            1.0 / s_dst.x,
            0.0,
            c_dst.x,
            0.0,
            1.0 / s_dst.y,
            c_dst.y,
            0.0,
            0.0,
            1.0,
        );
        let norm_src = Matrix3::new(
            s_src.x,
            0.0,
            -c_src.x * s_src.x,
            0.0,
            s_src.y,
            -c_src.y * s_src.y,
            0.0,
            0.0,
            1.0,
        );

        let h = inv_norm_dst * h0 * norm_src;
        let scale = h[(2, 2)];
        if scale.abs() < f64::EPSILON {
            return Vec::new();
        }
        let h = h / scale;
        if h.iter().any(|v| !v.is_finite()) {
            return Vec::new();
        }
        vec![Homography::new(h)]
    }

    /// Squared reprojection distance of set B from the projection of set A.
    fn residual(&self, model: &Homography, data: &DataMatrix, row: usize) -> f64 {
        let h = &model.h;
        let (x, y) = (data[(row, 0)], data[(row, 1)]);
        let w = h[(2, 0)] * x + h[(2, 1)] * y + h[(2, 2)];
        if w == 0.0 {
            return f64::INFINITY;
        }
        let ww = 1.0 / w;
        let dx = (h[(0, 0)] * x + h[(0, 1)] * y + h[(0, 2)]) * ww - data[(row, 2)];
        let dy = (h[(1, 0)] * x + h[(1, 1)] * y + h[(1, 2)]) * ww - data[(row, 3)];
        dx * dx + dy * dy
    }
}
