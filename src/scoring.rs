//! Residual evaluation and the statistics the search loops score with.

use crate::core::Estimator;
use crate::types::DataMatrix;

/// Fill `residuals` with the residual of every correspondence in `data`.
pub fn compute_residuals<E: Estimator>(
    estimator: &E,
    model: &E::Model,
    data: &DataMatrix,
    residuals: &mut Vec<f64>,
) {
    residuals.clear();
    residuals.extend((0..data.nrows()).map(|row| estimator.residual(model, data, row)));
}

/// Mark every residual not exceeding `threshold_sq` and return the count.
///
/// `mask` must have the same length as `residuals`.
pub fn find_inliers(residuals: &[f64], threshold_sq: f64, mask: &mut [bool]) -> usize {
    let mut inlier_count = 0usize;
    for (flag, &r) in mask.iter_mut().zip(residuals) {
        *flag = r <= threshold_sq;
        if *flag {
            inlier_count += 1;
        }
    }
    inlier_count
}

/// Median of `values`, sorting them in place.
///
/// For an even count the two middle values are averaged. Returns `f64::MAX`
/// for an empty slice.
pub fn median(values: &mut [f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return f64::MAX;
    }
    values.sort_unstable_by(f64::total_cmp);
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) * 0.5
    }
}
