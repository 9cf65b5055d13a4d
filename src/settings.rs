//! Configuration types for the robust estimators.
//!
//! [`RansacSettings`] collects every knob of the search loops and the
//! entry points in [`crate::api`]. It is `serde`-enabled with per-field
//! defaults, so a partially specified JSON or TOML document deserializes
//! into a complete configuration.

use serde::{Deserialize, Serialize};

/// Seed used when the caller does not supply one. Keeps repeated calls
/// bit-identical.
pub const DEFAULT_SEED: u64 = u64::MAX;

/// Confidence substituted when the requested one is outside `(0, 1)`.
pub const DEFAULT_CONFIDENCE: f64 = 0.99;

/// Threshold substituted when the requested one is not positive.
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// Homography estimation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomographyMethod {
    /// Single least-squares solve over all correspondences.
    Direct,
    /// Least Median of Squares.
    Lmeds,
    /// Random Sample Consensus.
    Ransac,
}

/// Fundamental matrix estimation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundamentalMethod {
    /// Minimal 7-point solver; needs exactly 7 correspondences.
    SevenPoint,
    /// Normalized 8-point solver over all correspondences.
    EightPoint,
    /// Least Median of Squares.
    Lmeds,
    /// Random Sample Consensus.
    Ransac,
}

/// Kernel used inside the robust fundamental matrix search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundamentalSolver {
    SevenPoint,
    EightPoint,
}

/// Main configuration object for the robust estimators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacSettings {
    /// Upper bound on search iterations (RANSAC and LMedS).
    pub max_iterations: usize,
    /// Desired probability of drawing at least one outlier-free sample.
    pub confidence: f64,
    /// Minimal sample size for homography search (4 or 5).
    pub homography_sample_size: usize,
    /// Kernel used by robust fundamental matrix search.
    pub fundamental_solver: FundamentalSolver,
    /// Check degeneracy after every drawn index instead of once per sample.
    pub check_partial_subsets: bool,
    /// Draw attempts per sample in RANSAC.
    pub max_sample_attempts: usize,
    /// Draw attempts per sample in LMedS.
    pub lmeds_sample_attempts: usize,
    /// Levenberg-Marquardt iterations for homography refinement; 0 disables it.
    pub refine_max_iterations: usize,
    /// Seed of the estimator's random generator.
    pub seed: u64,
}

impl Default for RansacSettings {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            confidence: DEFAULT_CONFIDENCE,
            homography_sample_size: 5,
            fundamental_solver: FundamentalSolver::EightPoint,
            check_partial_subsets: true,
            max_sample_attempts: 1000,
            lmeds_sample_attempts: 300,
            refine_max_iterations: 10,
            seed: DEFAULT_SEED,
        }
    }
}

impl RansacSettings {
    /// Confidence clamped into the open unit interval, falling back to
    /// [`DEFAULT_CONFIDENCE`] for unusable values.
    pub fn effective_confidence(&self) -> f64 {
        if self.confidence.is_finite()
            && self.confidence >= f64::EPSILON
            && self.confidence <= 1.0 - f64::EPSILON
        {
            self.confidence
        } else {
            DEFAULT_CONFIDENCE
        }
    }
}

/// Positive threshold or [`DEFAULT_THRESHOLD`].
pub fn effective_threshold(threshold: f64) -> f64 {
    if threshold > 0.0 {
        threshold
    } else {
        DEFAULT_THRESHOLD
    }
}
