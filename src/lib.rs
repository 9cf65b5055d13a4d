//! # georobust - Robust Homography and Fundamental Matrix Estimation
//!
//! `georobust` fits a planar homography or a two-view fundamental matrix to
//! point correspondences contaminated by outliers, using RANSAC or Least
//! Median of Squares around closed-form kernels, and reports which
//! correspondences agree with the fitted model.
//!
//! ## Quick Start
//!
//! ```rust
//! use georobust::{estimate_homography, HomographyMethod};
//! use nalgebra::Point2;
//!
//! let a = vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//!     Point2::new(0.3, 0.6),
//! ];
//! let b: Vec<_> = a.iter().map(|p| Point2::new(p.x + 1.0, p.y + 2.0)).collect();
//!
//! let mut mask = vec![false; a.len()];
//! let result =
//!     estimate_homography(&a, &b, HomographyMethod::Ransac, 1.0, None, Some(&mut mask)).unwrap();
//! assert_eq!(result.inlier_count(), 5);
//! assert!(mask.iter().all(|&m| m));
//! ```
//!
//! ## Extending the Library
//!
//! The search loops are generic over two traits:
//!
//! - **[`Estimator`](core::Estimator)**: a closed-form kernel plus its residual
//! - **[`Sampler`](samplers::Sampler)**: the minimal-sample strategy
//!
//! ```rust
//! use georobust::core::{Estimator, RobustEstimator};
//! use georobust::settings::RansacSettings;
//! use georobust::types::DataMatrix;
//!
//! /// Horizontal offset between the two point sets.
//! #[derive(Clone)]
//! struct Shift(f64);
//!
//! struct ShiftEstimator;
//!
//! impl Estimator for ShiftEstimator {
//!     type Model = Shift;
//!
//!     fn sample_size(&self) -> usize {
//!         1
//!     }
//!
//!     fn estimate_model(&self, data: &DataMatrix, sample: &[usize]) -> Vec<Shift> {
//!         vec![Shift(data[(sample[0], 2)] - data[(sample[0], 0)])]
//!     }
//!
//!     fn residual(&self, model: &Shift, data: &DataMatrix, row: usize) -> f64 {
//!         let d = data[(row, 2)] - data[(row, 0)] - model.0;
//!         d * d
//!     }
//! }
//!
//! let data = DataMatrix::from_row_slice(3, 4, &[
//!     0.0, 0.0, 2.0, 0.0,
//!     1.0, 0.0, 3.0, 0.0,
//!     5.0, 0.0, -9.0, 0.0,
//! ]);
//! let mut robust = RobustEstimator::new(ShiftEstimator, &RansacSettings::default());
//! let outcome = robust.run_ransac(&data, 0.1, 0.99, 100).unwrap();
//! assert_eq!(outcome.inlier_mask, vec![true, true, false]);
//! ```
//!
//! ## Modules
//!
//! - **[`api`](api)**: entry points for homography and fundamental matrix estimation
//! - **[`core`](core)**: the `Estimator` trait and the RANSAC / LMedS loops
//! - **[`estimators`](estimators)**: homography, 7-point and 8-point kernels
//! - **[`samplers`](samplers)**: minimal-sample selection
//! - **[`degeneracy`](degeneracy)**: collinearity rejection of samples
//! - **[`termination`](termination)**: adaptive RANSAC iteration budget
//! - **[`scoring`](scoring)**: residuals, inlier counting and medians
//! - **[`refinement`](refinement)**: Levenberg-Marquardt polishing of homographies
//! - **[`points`](points)** and **[`epipolar`](epipolar)**: point conversion and epipolar lines

pub mod api;
pub mod core;
pub mod degeneracy;
pub mod epipolar;
pub mod error;
pub mod estimators;
pub mod models;
pub mod points;
pub mod refinement;
pub mod samplers;
pub mod scoring;
pub mod settings;
pub mod termination;
pub mod types;
pub mod utils;

// Re-export high-level API
pub use api::{estimate_fundamental_matrix, estimate_homography, EstimationResult};

// Re-export core traits for easy access
pub use core::{Estimator, RobustEstimator, RobustOutcome};
pub use samplers::Sampler;

pub use epipolar::{compute_correspond_epilines, ImageIndex};
pub use error::{EstimationError, InputError};
pub use models::{FundamentalMatrix, Homography};
pub use settings::{FundamentalMethod, FundamentalSolver, HomographyMethod, RansacSettings};
