//! Error types.
//!
//! Two channels are kept apart: [`InputError`] reports caller contract
//! violations and is raised before any work is done, while the remaining
//! [`EstimationError`] variants are expected outcomes of a well-formed call
//! that simply did not produce a model.

use thiserror::Error;

/// Caller contract violations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    /// The two point sets have different lengths.
    #[error("point sets differ in length: {a} points in set A, {b} in set B")]
    LengthMismatch { a: usize, b: usize },
    /// The supplied mask does not match the number of correspondences.
    #[error("mask has length {mask}, expected {expected}")]
    MaskLength { mask: usize, expected: usize },
    /// A point matrix is not N×2, N×3, 2×N or 3×N.
    #[error("point matrix of shape {rows}x{cols} is not a 2-D or homogeneous point layout")]
    PointLayout { rows: usize, cols: usize },
    /// The requested method cannot run on the given number of points.
    #[error("method {method} is not supported for {count} correspondences")]
    UnsupportedMethod { method: &'static str, count: usize },
    /// Minimal sample size outside of what the kernel accepts.
    #[error("sample size {size} is not supported, expected one of {allowed:?}")]
    SampleSize {
        size: usize,
        allowed: &'static [usize],
    },
    /// A numeric parameter is NaN or infinite.
    #[error("parameter `{0}` must be finite")]
    NonFinite(&'static str),
}

/// Top-level estimation error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstimationError {
    /// Fewer correspondences than the kernel needs.
    #[error("need at least {required} correspondences, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    /// No non-degenerate minimal sample could be drawn before any model was found.
    #[error("could not draw a non-degenerate minimal sample")]
    SamplingExhausted,
    /// The search finished without accepting a model.
    #[error("no model found")]
    NoModelFound,
    /// The call itself was malformed.
    #[error(transparent)]
    InvalidInput(#[from] InputError),
}

impl EstimationError {
    /// `true` for programming errors, `false` for data-dependent failures.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, EstimationError::InvalidInput(_))
    }
}
