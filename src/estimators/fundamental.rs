//! Fundamental matrix estimators: the minimal 7-point solver and the
//! normalized 8-point least-squares solver.

use super::{centroids, null_vector};
use crate::core::Estimator;
use crate::models::FundamentalMatrix;
use crate::types::DataMatrix;
use crate::utils::solve_cubic;
use nalgebra::{Matrix3, SMatrix, SVector};

/// Epipolar constraint row for `xbᵀ F xa = 0` with F stored row-major.
fn constraint_row(xa: f64, ya: f64, xb: f64, yb: f64) -> SVector<f64, 9> {
    SVector::<f64, 9>::from([
        xb * xa,
        xb * ya,
        xb,
        yb * xa,
        yb * ya,
        yb,
        xa,
        ya,
        1.0,
    ])
}

/// Symmetric epipolar distance shared by both solvers.
///
/// Sum of the squared distances of each point to the epipolar line induced
/// by its partner. Infinite if either line is undefined.
fn symmetric_epipolar_distance(model: &FundamentalMatrix, data: &DataMatrix, row: usize) -> f64 {
    let f = &model.f;
    let (xa, ya, xb, yb) = (
        data[(row, 0)],
        data[(row, 1)],
        data[(row, 2)],
        data[(row, 3)],
    );

    // Line in image B.
    let a = f[(0, 0)] * xa + f[(0, 1)] * ya + f[(0, 2)];
    let b = f[(1, 0)] * xa + f[(1, 1)] * ya + f[(1, 2)];
    let c = f[(2, 0)] * xa + f[(2, 1)] * ya + f[(2, 2)];
    let norm_b = a * a + b * b;
    let d_b = xb * a + yb * b + c;

    // Line in image A.
    let a = f[(0, 0)] * xb + f[(1, 0)] * yb + f[(2, 0)];
    let b = f[(0, 1)] * xb + f[(1, 1)] * yb + f[(2, 1)];
    let c = f[(0, 2)] * xb + f[(1, 2)] * yb + f[(2, 2)];
    let norm_a = a * a + b * b;
    let d_a = xa * a + ya * b + c;

    if norm_a == 0.0 || norm_b == 0.0 {
        return f64::INFINITY;
    }
    d_a * d_a / norm_a + d_b * d_b / norm_b
}

/// Minimal fundamental matrix solver.
///
/// The seven constraints leave a two-dimensional null space `{F1, F2}`;
/// the rank-2 condition `det(λ·F1 + (1 - λ)·F2) = 0` is a cubic in λ, so a
/// sample yields up to three candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SevenPointFundamentalEstimator;

impl SevenPointFundamentalEstimator {
    pub fn new() -> Self {
        Self
    }
}

/// Coefficients of `det(λ·f1 + f2)`, highest power first.
fn determinant_cubic(f1: &[f64; 9], f2: &[f64; 9]) -> [f64; 4] {
    let mut c = [0.0; 4];

    let t0 = f2[4] * f2[8] - f2[5] * f2[7];
    let t1 = f2[3] * f2[8] - f2[5] * f2[6];
    let t2 = f2[3] * f2[7] - f2[4] * f2[6];

    c[3] = f2[0] * t0 - f2[1] * t1 + f2[2] * t2;

    c[2] = f1[0] * t0 - f1[1] * t1 + f1[2] * t2 - f1[3] * (f2[1] * f2[8] - f2[2] * f2[7])
        + f1[4] * (f2[0] * f2[8] - f2[2] * f2[6])
        - f1[5] * (f2[0] * f2[7] - f2[1] * f2[6])
        + f1[6] * (f2[1] * f2[5] - f2[2] * f2[4])
        - f1[7] * (f2[0] * f2[5] - f2[2] * f2[3])
        + f1[8] * (f2[0] * f2[4] - f2[1] * f2[3]);

    let t0 = f1[4] * f1[8] - f1[5] * f1[7];
    let t1 = f1[3] * f1[8] - f1[5] * f1[6];
    let t2 = f1[3] * f1[7] - f1[4] * f1[6];

    c[1] = f2[0] * t0 - f2[1] * t1 + f2[2] * t2 - f2[3] * (f1[1] * f1[8] - f1[2] * f1[7])
        + f2[4] * (f1[0] * f1[8] - f1[2] * f1[6])
        - f2[5] * (f1[0] * f1[7] - f1[1] * f1[6])
        + f2[6] * (f1[1] * f1[5] - f1[2] * f1[4])
        - f2[7] * (f1[0] * f1[5] - f1[2] * f1[3])
        + f2[8] * (f1[0] * f1[4] - f1[1] * f1[3]);

    c[0] = f1[0] * t0 - f1[1] * t1 + f1[2] * t2;
    c
}

impl Estimator for SevenPointFundamentalEstimator {
    type Model = FundamentalMatrix;

    fn sample_size(&self) -> usize {
        7
    }

    fn max_solutions(&self) -> usize {
        3
    }

    fn estimate_model(&self, data: &DataMatrix, sample: &[usize]) -> Vec<FundamentalMatrix> {
        if sample.len() != 7 {
            return Vec::new();
        }

        // 7x9 system padded to 9x9 with zero rows.
        let mut system = SMatrix::<f64, 9, 9>::zeros();
        for (r, &i) in sample.iter().enumerate() {
            let row = constraint_row(data[(i, 0)], data[(i, 1)], data[(i, 2)], data[(i, 3)]);
            system.set_row(r, &row.transpose());
        }

        let svd = system.svd(false, true);
        let Some(v_t) = svd.v_t else {
            return Vec::new();
        };
        let mut order: [usize; 9] = std::array::from_fn(|i| i);
        order.sort_by(|&a, &b| svd.singular_values[a].total_cmp(&svd.singular_values[b]));

        let mut f1 = [0.0; 9];
        let mut f2 = [0.0; 9];
        for k in 0..9 {
            f1[k] = v_t[(order[1], k)];
            f2[k] = v_t[(order[0], k)];
        }
        // Any solution is λ·f1 + μ·f2; with μ = 1 - λ this becomes λ·(f1 - f2) + f2.
        for k in 0..9 {
            f1[k] -= f2[k];
        }

        let mut roots = [0.0; 3];
        let n = solve_cubic(determinant_cubic(&f1, &f2), &mut roots);

        let mut models = Vec::with_capacity(n);
        for &root in &roots[..n] {
            let mut lambda = root;
            let mut mu = 1.0;
            let s = f1[8] * root + f2[8];
            let mut f = [0.0; 9];
            if s.abs() > f64::EPSILON {
                mu = 1.0 / s;
                lambda *= mu;
                f[8] = 1.0;
            }
            for k in 0..8 {
                f[k] = f1[k] * lambda + f2[k] * mu;
            }
            if f.iter().all(|v| v.is_finite()) {
                models.push(FundamentalMatrix::new(Matrix3::from_row_slice(&f)));
            }
        }
        models
    }

    fn residual(&self, model: &FundamentalMatrix, data: &DataMatrix, row: usize) -> f64 {
        symmetric_epipolar_distance(model, data, row)
    }
}

/// Normalized 8-point solver.
///
/// Each point set is translated to its centroid and scaled to a mean
/// distance of √2. The least-squares solution is projected onto the rank-2
/// matrices before being mapped back to pixel coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct EightPointFundamentalEstimator;

impl EightPointFundamentalEstimator {
    pub fn new() -> Self {
        Self
    }
}

/// Mean distance of set A or set B from `center`.
fn mean_distance(data: &DataMatrix, sample: &[usize], column: usize, cx: f64, cy: f64) -> f64 {
    let sum: f64 = sample
        .iter()
        .map(|&i| (data[(i, column)] - cx).hypot(data[(i, column + 1)] - cy))
        .sum();
    sum / sample.len() as f64
}

impl Estimator for EightPointFundamentalEstimator {
    type Model = FundamentalMatrix;

    fn sample_size(&self) -> usize {
        8
    }

    fn estimate_model(&self, data: &DataMatrix, sample: &[usize]) -> Vec<FundamentalMatrix> {
        if sample.len() < 8 {
            return Vec::new();
        }

        let (ca, cb) = centroids(data, sample);
        let dist_a = mean_distance(data, sample, 0, ca.x, ca.y);
        let dist_b = mean_distance(data, sample, 2, cb.x, cb.y);
        let min_spread = f32::EPSILON as f64;
        if dist_a < min_spread || dist_b < min_spread {
            return Vec::new();
        }
        let scale_a = std::f64::consts::SQRT_2 / dist_a;
        let scale_b = std::f64::consts::SQRT_2 / dist_b;

        let mut ata = SMatrix::<f64, 9, 9>::zeros();
        for &i in sample {
            let row = constraint_row(
                (data[(i, 0)] - ca.x) * scale_a,
                (data[(i, 1)] - ca.y) * scale_a,
                (data[(i, 2)] - cb.x) * scale_b,
                (data[(i, 3)] - cb.y) * scale_b,
            );
            ata.ger(1.0, &row, &row, 1.0);
        }

        let Some((f0, significant)) = null_vector(ata) else {
            return Vec::new();
        };
        if significant < 7 {
            return Vec::new();
        }

        let mut svd = Matrix3::from_row_slice(f0.as_slice()).svd(true, true);
        let smallest = svd.singular_values.imin();
        svd.singular_values[smallest] = 0.0;
        let Ok(f0) = svd.recompose() else {
            return Vec::new();
        };

        let t_a = Matrix3::new(
            scale_a,
            0.0,
            -scale_a * ca.x,
            0.0,
            scale_a,
            -scale_a * ca.y,
            0.0,
            0.0,
            1.0,
        );
        let t_b = Matrix3::new(
            scale_b,
            0.0,
            -scale_b * cb.x,
            0.0,
            scale_b,
            -scale_b * cb.y,
            0.0,
            0.0,
            1.0,
        );

        let mut f = t_b.transpose() * f0 * t_a;
        let scale = f[(2, 2)];
        if scale.abs() > min_spread {
            f /= scale;
        }
        vec![FundamentalMatrix::new(f)]
    }

    fn residual(&self, model: &FundamentalMatrix, data: &DataMatrix, row: usize) -> f64 {
        symmetric_epipolar_distance(model, data, row)
    }
}
