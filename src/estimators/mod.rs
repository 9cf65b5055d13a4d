//! Closed-form model kernels.
//!
//! - [`HomographyEstimator`]: normalized DLT over 4 or more correspondences.
//! - [`SevenPointFundamentalEstimator`]: minimal solver, up to 3 candidates.
//! - [`EightPointFundamentalEstimator`]: normalized least squares over 8 or
//!   more correspondences.

pub mod fundamental;
pub mod homography;

pub use fundamental::{EightPointFundamentalEstimator, SevenPointFundamentalEstimator};
pub use homography::HomographyEstimator;

use crate::types::DataMatrix;
use nalgebra::{Point2, SMatrix, SVector};

/// Centroids of set A and set B over the rows listed in `sample`.
pub(crate) fn centroids(data: &DataMatrix, sample: &[usize]) -> (Point2<f64>, Point2<f64>) {
    let mut ca = Point2::<f64>::origin();
    let mut cb = Point2::<f64>::origin();
    for &i in sample {
        ca.x += data[(i, 0)];
        ca.y += data[(i, 1)];
        cb.x += data[(i, 2)];
        cb.y += data[(i, 3)];
    }
    let inv = 1.0 / sample.len() as f64;
    (ca * inv, cb * inv)
}

/// Right singular vector of the smallest singular value of a 9x9 system,
/// together with the number of the remaining singular values that are not
/// negligible.
pub(crate) fn null_vector(system: SMatrix<f64, 9, 9>) -> Option<(SVector<f64, 9>, usize)> {
    let svd = system.svd(false, true);
    let v_t = svd.v_t?;
    let smallest = svd.singular_values.imin();
    let significant = svd
        .singular_values
        .iter()
        .enumerate()
        .filter(|&(i, &s)| i != smallest && s.abs() >= f64::EPSILON)
        .count();
    Some((v_t.row(smallest).transpose(), significant))
}

#[cfg(test)]
pub(crate) mod test_data {
    //! Synthetic correspondences shared by the kernel tests.

    use crate::types::DataMatrix;
    use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
    use rand::prelude::*;

    /// Source points in general position mapped through `h`.
    pub fn homography_data(h: &Matrix3<f64>, n: usize, seed: u64) -> DataMatrix {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut data = DataMatrix::zeros(n, 4);
        for i in 0..n {
            let x = rng.gen_range(0.0..640.0);
            let y = rng.gen_range(0.0..480.0);
            let q = h * Vector3::new(x, y, 1.0);
            data[(i, 0)] = x;
            data[(i, 1)] = y;
            data[(i, 2)] = q.x / q.z;
            data[(i, 3)] = q.y / q.z;
        }
        data
    }

    pub fn test_homography() -> Matrix3<f64> {
        Matrix3::new(1.1, 0.05, 12.0, -0.08, 0.95, -7.0, 1.0e-4, -5.0e-5, 1.0)
    }

    /// Two-view scene with intrinsics of focal length `focal`; returns the
    /// correspondences and the ground-truth fundamental matrix.
    pub fn epipolar_data(n: usize, focal: f64, seed: u64) -> (DataMatrix, Matrix3<f64>) {
        let k = Matrix3::new(focal, 0.0, 0.6 * focal, 0.0, focal, 0.45 * focal, 0.0, 0.0, 1.0);
        let r = Rotation3::from_euler_angles(0.05, -0.12, 0.03);
        let t = Vector3::new(0.8, 0.15, 0.1);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut data = DataMatrix::zeros(n, 4);
        for i in 0..n {
            let p = Point3::new(
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-1.5..1.5),
                rng.gen_range(4.0..9.0),
            );
            let a = k * p.coords;
            let b = k * (r * p.coords + t);
            data[(i, 0)] = a.x / a.z;
            data[(i, 1)] = a.y / a.z;
            data[(i, 2)] = b.x / b.z;
            data[(i, 3)] = b.y / b.z;
        }

        let k_inv = k.try_inverse().unwrap();
        let f = k_inv.transpose() * t.cross_matrix() * r.matrix() * k_inv;
        (data, f)
    }

    /// Compare two matrices up to a non-zero scale factor.
    pub fn same_up_to_scale(a: &Matrix3<f64>, b: &Matrix3<f64>, tol: f64) -> bool {
        let a = a / a.norm();
        let b = b / b.norm();
        (a - b).norm() < tol || (a + b).norm() < tol
    }
}
