//! Nonlinear refinement of a homography over its inlier set.
//!
//! The homography is parameterised by its first eight entries with the
//! bottom-right entry fixed at one. Residuals are the per-axis reprojection
//! differences of every correspondence, so the minimised cost is the summed
//! squared reprojection error.

use crate::models::Homography;
use crate::types::DataMatrix;
use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use log::{debug, warn};
use nalgebra::{storage::Owned, DMatrix, DVector, Dyn, Matrix3};

/// Number of free homography parameters.
pub const HOMOGRAPHY_PARAMS: usize = 8;

/// Reprojection least-squares problem over a fixed set of correspondences.
pub struct HomographyRefinement<'a> {
    data: &'a DataMatrix,
    params: DVector<f64>,
}

impl<'a> HomographyRefinement<'a> {
    /// Problem over `data`, starting from `h` scaled so that `h22 = 1`.
    pub fn new(data: &'a DataMatrix, h: &Matrix3<f64>) -> Self {
        Self {
            data,
            params: Self::params_from_matrix(h),
        }
    }

    pub fn params_from_matrix(h: &Matrix3<f64>) -> DVector<f64> {
        DVector::from_iterator(
            HOMOGRAPHY_PARAMS,
            h.transpose().iter().take(HOMOGRAPHY_PARAMS).copied(),
        )
    }

    pub fn matrix_from_params(p: &DVector<f64>) -> Matrix3<f64> {
        Matrix3::new(p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7], 1.0)
    }

    /// Current estimate as a matrix.
    pub fn matrix(&self) -> Matrix3<f64> {
        Self::matrix_from_params(&self.params)
    }

    /// Summed squared reprojection error at the current parameters.
    pub fn cost(&self) -> f64 {
        self.residual_vector().norm_squared()
    }

    /// Projection of `(x, y)` and the inverse of its homogeneous scale.
    fn project(&self, x: f64, y: f64) -> (f64, f64, f64) {
        let p = &self.params;
        let w = p[6] * x + p[7] * y + 1.0;
        let ww = if w.abs() > f64::EPSILON { 1.0 / w } else { 0.0 };
        (
            (p[0] * x + p[1] * y + p[2]) * ww,
            (p[3] * x + p[4] * y + p[5]) * ww,
            ww,
        )
    }

    fn residual_vector(&self) -> DVector<f64> {
        let n = self.data.nrows();
        let mut residuals = DVector::zeros(2 * n);
        for i in 0..n {
            let (px, py, _) = self.project(self.data[(i, 0)], self.data[(i, 1)]);
            residuals[2 * i] = px - self.data[(i, 2)];
            residuals[2 * i + 1] = py - self.data[(i, 3)];
        }
        residuals
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for HomographyRefinement<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.params.clone_from(x);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        Some(self.residual_vector())
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let n = self.data.nrows();
        let mut j = DMatrix::zeros(2 * n, HOMOGRAPHY_PARAMS);
        for i in 0..n {
            let (x, y) = (self.data[(i, 0)], self.data[(i, 1)]);
            let (px, py, ww) = self.project(x, y);
            let (xw, yw) = (x * ww, y * ww);

            let rx = 2 * i;
            j[(rx, 0)] = xw;
            j[(rx, 1)] = yw;
            j[(rx, 2)] = ww;
            j[(rx, 6)] = -xw * px;
            j[(rx, 7)] = -yw * px;

            let ry = rx + 1;
            j[(ry, 3)] = xw;
            j[(ry, 4)] = yw;
            j[(ry, 5)] = ww;
            j[(ry, 6)] = -xw * py;
            j[(ry, 7)] = -yw * py;
        }
        Some(j)
    }
}

/// Polish `model` by minimising the reprojection error over all rows of
/// `data`.
///
/// Returns the input unchanged when refinement is disabled, the data is
/// too small, or the solver does not lower the cost.
pub fn refine_homography(data: &DataMatrix, model: &Homography, max_iterations: usize) -> Homography {
    if max_iterations == 0 || data.nrows() < 4 {
        return model.clone();
    }
    let start = model.normalized();
    if start.h[(2, 2)] != 1.0 {
        return model.clone();
    }

    let problem = HomographyRefinement::new(data, &start.h);
    let initial_cost = problem.cost();
    let (problem, report) = LevenbergMarquardt::new()
        .with_patience(max_iterations)
        .minimize(problem);

    let refined = problem.matrix();
    let cost = problem.cost();
    if !refined.iter().all(|v| v.is_finite()) || !(cost <= initial_cost) {
        warn!(
            "refinement stopped with {:?} without improving the model, keeping it",
            report.termination
        );
        return model.clone();
    }
    debug!(
        "refinement: {} evaluations, cost {initial_cost:e} -> {cost:e}, {:?}",
        report.number_of_evaluations, report.termination
    );
    Homography::new(refined)
}
