//! Geometric models produced by the estimators.

use nalgebra::{Matrix3, Point2, Vector3};

/// Planar projective transformation represented by a 3x3 matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    /// Map `p` through the homography. Returns `None` when `p` lands on the
    /// line at infinity.
    pub fn transform_point(&self, p: &Point2<f64>) -> Option<Point2<f64>> {
        let q = self.h * Vector3::new(p.x, p.y, 1.0);
        if q.z.abs() < f64::EPSILON {
            return None;
        }
        Some(Point2::new(q.x / q.z, q.y / q.z))
    }

    /// Copy scaled so that the bottom-right entry equals one, if possible.
    pub fn normalized(&self) -> Self {
        let s = self.h[(2, 2)];
        if s.abs() > f64::EPSILON {
            Self::new(self.h / s)
        } else {
            self.clone()
        }
    }
}

/// Fundamental matrix relating two pinhole views: `xbᵀ F xa = 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct FundamentalMatrix {
    pub f: Matrix3<f64>,
}

impl FundamentalMatrix {
    pub fn new(f: Matrix3<f64>) -> Self {
        Self { f }
    }

    /// Algebraic epipolar residual `xbᵀ F xa`.
    pub fn epipolar_constraint(&self, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
        Vector3::new(b.x, b.y, 1.0).dot(&(self.f * Vector3::new(a.x, a.y, 1.0)))
    }
}
