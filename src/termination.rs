//! Adaptive iteration budget for the RANSAC loop.
//!
//! The required number of iterations follows the standard formula
//! `N = log(1 - confidence) / log(1 - (1 - outlier_ratio)^sample_size)`,
//! rounded up and clamped so the budget never grows.

/// Recompute the iteration budget after a better model has been found.
///
/// `confidence` and `outlier_ratio` are clamped into `[0, 1]`. The result
/// lies in `[0, current]`. When the probability of drawing a contaminated
/// sample is numerically zero the current budget is returned unchanged.
pub fn update_num_iterations(
    confidence: f64,
    outlier_ratio: f64,
    sample_size: usize,
    current: usize,
) -> usize {
    let confidence = confidence.clamp(0.0, 1.0);
    let outlier_ratio = outlier_ratio.clamp(0.0, 1.0);

    let num = (1.0 - confidence).max(f64::MIN_POSITIVE);
    let denom = 1.0 - (1.0 - outlier_ratio).powi(sample_size as i32);
    if denom < f64::MIN_POSITIVE {
        return current;
    }

    let num = num.ln();
    let denom = denom.ln();
    if denom >= 0.0 || -num >= current as f64 * -denom {
        return current;
    }

    ((num / denom).ceil().max(0.0) as usize).min(current)
}

/// Termination criterion deciding how long the RANSAC loop may run.
pub trait TerminationCriterion {
    /// Budget after a model with `inlier_count` of `point_count` inliers
    /// has been accepted.
    fn update(
        &mut self,
        inlier_count: usize,
        point_count: usize,
        sample_size: usize,
        current: usize,
    ) -> usize;
}

/// Confidence-driven criterion shrinking the budget as the inlier ratio
/// improves.
#[derive(Debug, Clone, Copy)]
pub struct RansacTerminationCriterion {
    /// Desired confidence in \[0, 1\].
    pub confidence: f64,
}

impl RansacTerminationCriterion {
    pub fn new(confidence: f64) -> Self {
        Self { confidence }
    }
}

impl TerminationCriterion for RansacTerminationCriterion {
    fn update(
        &mut self,
        inlier_count: usize,
        point_count: usize,
        sample_size: usize,
        current: usize,
    ) -> usize {
        if point_count == 0 {
            return current;
        }
        let outlier_ratio = (point_count - inlier_count.min(point_count)) as f64 / point_count as f64;
        update_num_iterations(self.confidence, outlier_ratio, sample_size, current)
    }
}
