//! Core traits and the robust search loops.
//!
//! [`Estimator`] is the per-family kernel interface: a closed-form solver
//! mapping a sample of correspondence indices to candidate models, and a
//! residual evaluator. [`RobustEstimator`] owns a kernel and a sampler and
//! drives either the RANSAC or the LMedS search over a [`DataMatrix`].

use crate::error::EstimationError;
use crate::samplers::{Sampler, UniformRandomSampler};
use crate::scoring::{compute_residuals, find_inliers, median};
use crate::settings::RansacSettings;
use crate::termination::{RansacTerminationCriterion, TerminationCriterion};
use crate::types::DataMatrix;
use log::{debug, trace};

/// Outlier ratio LMedS assumes when sizing its fixed iteration budget.
pub const LMEDS_OUTLIER_RATIO: f64 = 0.45;

/// Estimator responsible for generating model hypotheses from samples.
pub trait Estimator {
    /// Model type produced by this estimator.
    type Model: Clone;

    /// Size of a minimal sample for this estimator.
    fn sample_size(&self) -> usize;

    /// Upper bound on the number of candidates one call may return.
    fn max_solutions(&self) -> usize {
        1
    }

    /// Estimate candidate models from the correspondences listed in `sample`.
    ///
    /// An empty result means the sample was degenerate for this kernel.
    fn estimate_model(&self, data: &DataMatrix, sample: &[usize]) -> Vec<Self::Model>;

    /// Non-negative disagreement of correspondence `row` with `model`.
    fn residual(&self, model: &Self::Model, data: &DataMatrix, row: usize) -> f64;
}

/// Result of a successful robust search.
#[derive(Debug, Clone)]
pub struct RobustOutcome<M> {
    pub model: M,
    /// Inlier flags aligned with the rows of the searched data.
    pub inlier_mask: Vec<bool>,
    pub inlier_count: usize,
    /// Iterations actually run.
    pub iterations: usize,
}

/// Sampling-based robust estimator built around a model kernel.
///
/// The instance owns its random state. It is not meant to be shared
/// between concurrent calls; give every thread its own instance.
#[derive(Debug, Clone)]
pub struct RobustEstimator<E, S = UniformRandomSampler>
where
    E: Estimator,
    S: Sampler,
{
    pub estimator: E,
    pub sampler: S,
    /// Draw attempts per RANSAC sample.
    pub max_sample_attempts: usize,
    /// Draw attempts per LMedS sample.
    pub lmeds_sample_attempts: usize,
}

impl<E: Estimator> RobustEstimator<E, UniformRandomSampler> {
    /// Uniform sampler seeded and configured from `settings`.
    pub fn new(estimator: E, settings: &RansacSettings) -> Self {
        let sampler = UniformRandomSampler::from_seed(settings.seed)
            .with_partial_checks(settings.check_partial_subsets);
        Self::with_sampler(estimator, sampler, settings)
    }
}

impl<E, S> RobustEstimator<E, S>
where
    E: Estimator,
    S: Sampler,
{
    pub fn with_sampler(estimator: E, sampler: S, settings: &RansacSettings) -> Self {
        Self {
            estimator,
            sampler,
            max_sample_attempts: settings.max_sample_attempts,
            lmeds_sample_attempts: settings.lmeds_sample_attempts,
        }
    }

    /// Restart the random sequence.
    pub fn set_seed(&mut self, seed: u64) {
        self.sampler.set_seed(seed);
    }

    /// Draw a sample, or take every row when the data is exactly minimal.
    fn next_sample(&mut self, data: &DataMatrix, sample: &mut [usize], attempts: usize) -> bool {
        if data.nrows() == sample.len() {
            for (i, slot) in sample.iter_mut().enumerate() {
                *slot = i;
            }
            return true;
        }
        self.sampler.sample(data, sample, attempts)
    }

    fn check_size(&self, data: &DataMatrix) -> Result<usize, EstimationError> {
        let sample_size = self.estimator.sample_size();
        if data.nrows() < sample_size {
            return Err(EstimationError::InsufficientData {
                required: sample_size,
                actual: data.nrows(),
            });
        }
        Ok(sample_size)
    }

    /// Random Sample Consensus.
    ///
    /// `threshold` is compared against the square root of the residual,
    /// i.e. a correspondence is an inlier when `residual <= threshold²`.
    /// The budget starts at `max_iterations` and shrinks with every better
    /// model. Exactly minimal data is solved once without sampling.
    pub fn run_ransac(
        &mut self,
        data: &DataMatrix,
        threshold: f64,
        confidence: f64,
        max_iterations: usize,
    ) -> Result<RobustOutcome<E::Model>, EstimationError> {
        let sample_size = self.check_size(data)?;
        let n = data.nrows();
        let threshold_sq = threshold * threshold;
        let mut termination = RansacTerminationCriterion::new(confidence);

        let mut max_iterations = if n == sample_size { 1 } else { max_iterations };
        let mut sample = vec![0usize; sample_size];
        let mut residuals = Vec::with_capacity(n);
        let mut mask = vec![false; n];
        let mut best_mask = vec![false; n];
        let mut best_model: Option<E::Model> = None;
        let mut best_count = 0usize;
        let mut iteration = 0usize;

        while iteration < max_iterations {
            if !self.next_sample(data, &mut sample, self.max_sample_attempts) {
                if iteration == 0 {
                    return Err(EstimationError::SamplingExhausted);
                }
                trace!("ransac: sampling exhausted at iteration {iteration}");
                break;
            }
            iteration += 1;

            for model in self.estimator.estimate_model(data, &sample) {
                compute_residuals(&self.estimator, &model, data, &mut residuals);
                let count = find_inliers(&residuals, threshold_sq, &mut mask);

                if count > best_count.max(sample_size - 1) {
                    std::mem::swap(&mut mask, &mut best_mask);
                    best_model = Some(model);
                    best_count = count;
                    max_iterations =
                        termination.update(count, n, sample_size, max_iterations);
                    debug!(
                        "ransac: iteration {iteration}, {count}/{n} inliers, budget {max_iterations}"
                    );
                }
            }

            // No candidate can beat a full inlier set.
            if best_count == n {
                break;
            }
        }

        let model = best_model.ok_or(EstimationError::NoModelFound)?;
        debug!("ransac: finished after {iteration} iterations with {best_count}/{n} inliers");
        Ok(RobustOutcome {
            model,
            inlier_mask: best_mask,
            inlier_count: best_count,
            iterations: iteration,
        })
    }

    /// Least Median of Squares.
    ///
    /// The iteration count is fixed up front from an assumed outlier ratio
    /// of [`LMEDS_OUTLIER_RATIO`]. The model with the smallest median
    /// residual wins; inliers are then selected against a robust noise
    /// scale derived from that median.
    pub fn run_lmeds(
        &mut self,
        data: &DataMatrix,
        confidence: f64,
        max_iterations: usize,
    ) -> Result<RobustOutcome<E::Model>, EstimationError> {
        let sample_size = self.check_size(data)?;
        let n = data.nrows();

        let iterations = if n == sample_size {
            1
        } else {
            lmeds_iterations(confidence, sample_size).max(3).min(max_iterations)
        };
        let mut sample = vec![0usize; sample_size];
        let mut residuals = Vec::with_capacity(n);
        let mut best_model: Option<E::Model> = None;
        let mut min_median = f64::MAX;
        let mut iteration = 0usize;

        while iteration < iterations {
            if !self.next_sample(data, &mut sample, self.lmeds_sample_attempts) {
                if iteration == 0 {
                    return Err(EstimationError::SamplingExhausted);
                }
                trace!("lmeds: sampling exhausted at iteration {iteration}");
                break;
            }
            iteration += 1;

            for model in self.estimator.estimate_model(data, &sample) {
                compute_residuals(&self.estimator, &model, data, &mut residuals);
                let med = median(&mut residuals);
                if med < min_median {
                    debug!("lmeds: iteration {iteration}, median residual {med:e}");
                    min_median = med;
                    best_model = Some(model);
                }
            }
        }

        let model = best_model.ok_or(EstimationError::NoModelFound)?;

        let sigma = lmeds_sigma(min_median, n, sample_size);
        compute_residuals(&self.estimator, &model, data, &mut residuals);
        let mut mask = vec![false; n];
        let inlier_count = find_inliers(&residuals, sigma * sigma, &mut mask);
        debug!("lmeds: sigma {sigma:e}, {inlier_count}/{n} inliers after {iteration} iterations");

        if inlier_count < sample_size {
            return Err(EstimationError::NoModelFound);
        }
        Ok(RobustOutcome {
            model,
            inlier_mask: mask,
            inlier_count,
            iterations: iteration,
        })
    }
}

/// Fixed LMedS budget before clamping.
fn lmeds_iterations(confidence: f64, sample_size: usize) -> usize {
    let good = (1.0 - LMEDS_OUTLIER_RATIO).powi(sample_size as i32);
    let n = (1.0 - confidence).ln() / (1.0 - good).ln();
    if n.is_finite() && n > 0.0 {
        n.round() as usize
    } else {
        0
    }
}

/// Robust noise scale from the smallest median residual.
fn lmeds_sigma(min_median: f64, n: usize, sample_size: usize) -> f64 {
    let correction = if n > sample_size {
        1.0 + 5.0 / (n - sample_size) as f64
    } else {
        1.0
    };
    let sigma = 2.5 * 1.4826 * correction * min_median.sqrt();
    sigma.max(f32::EPSILON as f64 * 100.0)
}
