//! Top-level estimation entry points.
//!
//! [`estimate_homography`] and [`estimate_fundamental_matrix`] take two
//! positionally paired point sets, pick the kernel and the search strategy
//! for the requested method, and report the model together with an inlier
//! mask aligned to the input order.

use crate::core::{Estimator, RobustEstimator, RobustOutcome};
use crate::error::{EstimationError, InputError};
use crate::estimators::{
    EightPointFundamentalEstimator, HomographyEstimator, SevenPointFundamentalEstimator,
};
use crate::models::{FundamentalMatrix, Homography};
use crate::points::data_from_points;
use crate::refinement::refine_homography;
use crate::settings::{
    effective_threshold, FundamentalMethod, FundamentalSolver, HomographyMethod, RansacSettings,
};
use crate::types::{compact_rows, DataMatrix};
use log::debug;
use nalgebra::Point2;

const HOMOGRAPHY_MIN_POINTS: usize = 4;
const FUNDAMENTAL_MIN_POINTS: usize = 7;

/// Result of a successful estimation.
#[derive(Debug, Clone)]
pub struct EstimationResult<M> {
    /// The estimated model.
    pub model: M,
    /// Every candidate the final solve produced; `solutions[0] == model`.
    /// Only the 7-point solver on exactly seven correspondences yields more
    /// than one.
    pub solutions: Vec<M>,
    /// Inlier flags aligned with the input correspondences.
    pub inlier_mask: Vec<bool>,
    /// Search iterations run (1 for direct solves).
    pub iterations: usize,
}

impl<M> EstimationResult<M> {
    /// Indices of the inlier correspondences.
    pub fn inliers(&self) -> Vec<usize> {
        self.inlier_mask
            .iter()
            .enumerate()
            .filter_map(|(i, &inlier)| inlier.then_some(i))
            .collect()
    }

    pub fn inlier_count(&self) -> usize {
        self.inlier_mask.iter().filter(|&&inlier| inlier).count()
    }

    fn single(model: M, inlier_mask: Vec<bool>, iterations: usize) -> Self
    where
        M: Clone,
    {
        Self {
            solutions: vec![model.clone()],
            model,
            inlier_mask,
            iterations,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Search {
    Ransac,
    Lmeds,
}

/// Validate the shared inputs and build the correspondence matrix.
fn prepare(
    points_a: &[Point2<f64>],
    points_b: &[Point2<f64>],
    mask: Option<&[bool]>,
    required: usize,
) -> Result<DataMatrix, EstimationError> {
    let data = data_from_points(points_a, points_b)?;
    let n = data.nrows();
    if let Some(mask) = mask {
        if mask.len() != n {
            return Err(InputError::MaskLength {
                mask: mask.len(),
                expected: n,
            }
            .into());
        }
    }
    if n < required {
        return Err(EstimationError::InsufficientData {
            required,
            actual: n,
        });
    }
    Ok(data)
}

fn search<E: Estimator>(
    estimator: E,
    data: &DataMatrix,
    search: Search,
    threshold: f64,
    settings: &RansacSettings,
) -> Result<RobustOutcome<E::Model>, EstimationError> {
    let confidence = settings.effective_confidence();
    let mut robust = RobustEstimator::new(estimator, settings);
    match search {
        Search::Ransac => robust.run_ransac(data, threshold, confidence, settings.max_iterations),
        Search::Lmeds => robust.run_lmeds(data, confidence, settings.max_iterations),
    }
}

/// Solve `estimator` once over every correspondence.
fn solve_all<E: Estimator>(estimator: &E, data: &DataMatrix) -> Result<Vec<E::Model>, EstimationError> {
    let all: Vec<usize> = (0..data.nrows()).collect();
    let models = estimator.estimate_model(data, &all);
    if models.is_empty() {
        return Err(EstimationError::NoModelFound);
    }
    Ok(models)
}

fn write_mask(mask: Option<&mut [bool]>, inliers: &[bool]) {
    if let Some(mask) = mask {
        mask.copy_from_slice(inliers);
    }
}

/// Estimate the homography mapping `points_a` onto `points_b`.
///
/// * Exactly four correspondences are always solved directly.
/// * `Direct` with more correspondences is a least-squares DLT over all of
///   them; every correspondence is reported as an inlier.
/// * `Ransac` counts a correspondence as an inlier when its reprojection
///   distance is at most `threshold`.
/// * `Lmeds` ignores `threshold`.
///
/// A non-positive `threshold` is replaced by 3 pixels, the same rule the
/// fundamental matrix search applies, rather than being used as given.
///
/// With more than four correspondences the result is refined over its
/// inliers. `mask`, when given, must have one entry per correspondence and
/// is only written on success.
pub fn estimate_homography(
    points_a: &[Point2<f64>],
    points_b: &[Point2<f64>],
    method: HomographyMethod,
    threshold: f64,
    settings: Option<RansacSettings>,
    mask: Option<&mut [bool]>,
) -> Result<EstimationResult<Homography>, EstimationError> {
    let settings = settings.unwrap_or_default();
    let data = prepare(points_a, points_b, mask.as_deref(), HOMOGRAPHY_MIN_POINTS)?;
    let n = data.nrows();

    let configured = HomographyEstimator::new(settings.homography_sample_size)?;
    let estimator = HomographyEstimator::new(configured.sample_size().min(n))?;
    let method = if n == HOMOGRAPHY_MIN_POINTS {
        HomographyMethod::Direct
    } else {
        method
    };
    let threshold = effective_threshold(threshold);

    let (model, inlier_mask, iterations) = match method {
        HomographyMethod::Direct => {
            let model = solve_all(&estimator, &data)?.swap_remove(0);
            (model, vec![true; n], 1)
        }
        HomographyMethod::Ransac | HomographyMethod::Lmeds => {
            let strategy = match method {
                HomographyMethod::Ransac => Search::Ransac,
                _ => Search::Lmeds,
            };
            let outcome = search(estimator, &data, strategy, threshold, &settings)?;
            (outcome.model, outcome.inlier_mask, outcome.iterations)
        }
    };

    let model = if n > HOMOGRAPHY_MIN_POINTS {
        let inliers = compact_rows(&data, &inlier_mask);
        refine_homography(&inliers, &model, settings.refine_max_iterations)
    } else {
        model
    };

    let result = EstimationResult::single(model, inlier_mask, iterations);
    debug!(
        "homography ({method:?}): {}/{n} inliers after {iterations} iterations",
        result.inlier_count()
    );
    write_mask(mask, &result.inlier_mask);
    Ok(result)
}

fn eight_point_over_all(
    data: &DataMatrix,
) -> Result<EstimationResult<FundamentalMatrix>, EstimationError> {
    let model = solve_all(&EightPointFundamentalEstimator::new(), data)?.swap_remove(0);
    Ok(EstimationResult::single(model, vec![true; data.nrows()], 1))
}

/// Robust search followed by an 8-point re-fit over the inliers.
fn robust_fundamental(
    data: &DataMatrix,
    strategy: Search,
    threshold: f64,
    settings: &RansacSettings,
) -> Result<EstimationResult<FundamentalMatrix>, EstimationError> {
    let threshold = effective_threshold(threshold);
    let eight_point = EightPointFundamentalEstimator::new();
    let outcome = match settings.fundamental_solver {
        FundamentalSolver::SevenPoint => search(
            SevenPointFundamentalEstimator::new(),
            data,
            strategy,
            threshold,
            settings,
        )?,
        FundamentalSolver::EightPoint => search(eight_point, data, strategy, threshold, settings)?,
    };

    let inliers = compact_rows(data, &outcome.inlier_mask);
    let model = if inliers.nrows() >= eight_point.sample_size() {
        solve_all(&eight_point, &inliers)
            .map(|mut models| models.swap_remove(0))
            .unwrap_or(outcome.model)
    } else {
        outcome.model
    };
    Ok(EstimationResult::single(
        model,
        outcome.inlier_mask,
        outcome.iterations,
    ))
}

/// Estimate the fundamental matrix `F` with `xbᵀ F xa = 0` for every
/// inlier correspondence `(xa, xb)`.
///
/// * Exactly seven correspondences always use the 7-point solver and may
///   return up to three `solutions`.
/// * Exactly eight, or `EightPoint`, solve the normalized 8-point problem
///   over all correspondences.
/// * `Ransac` and `Lmeds` search with the kernel selected by
///   `settings.fundamental_solver` and re-fit the 8-point solution over the
///   inliers. `threshold` bounds the symmetric epipolar distance;
///   non-positive values fall back to 3.
/// * `SevenPoint` with more than eight correspondences is rejected.
pub fn estimate_fundamental_matrix(
    points_a: &[Point2<f64>],
    points_b: &[Point2<f64>],
    method: FundamentalMethod,
    threshold: f64,
    settings: Option<RansacSettings>,
    mask: Option<&mut [bool]>,
) -> Result<EstimationResult<FundamentalMatrix>, EstimationError> {
    let settings = settings.unwrap_or_default();
    let data = prepare(points_a, points_b, mask.as_deref(), FUNDAMENTAL_MIN_POINTS)?;
    let n = data.nrows();

    let result = match method {
        _ if n == FUNDAMENTAL_MIN_POINTS => {
            let seven_point = SevenPointFundamentalEstimator::new();
            let mut solutions = solve_all(&seven_point, &data)?;
            solutions.truncate(seven_point.max_solutions());
            EstimationResult {
                model: solutions[0].clone(),
                solutions,
                inlier_mask: vec![true; n],
                iterations: 1,
            }
        }
        _ if n == 8 => eight_point_over_all(&data)?,
        FundamentalMethod::EightPoint => eight_point_over_all(&data)?,
        FundamentalMethod::SevenPoint => {
            return Err(InputError::UnsupportedMethod {
                method: "seven_point",
                count: n,
            }
            .into());
        }
        FundamentalMethod::Ransac => robust_fundamental(&data, Search::Ransac, threshold, &settings)?,
        FundamentalMethod::Lmeds => robust_fundamental(&data, Search::Lmeds, threshold, &settings)?,
    };

    debug!(
        "fundamental matrix ({method:?}): {} solution(s), {}/{n} inliers",
        result.solutions.len(),
        result.inlier_count()
    );
    write_mask(mask, &result.inlier_mask);
    Ok(result)
}
