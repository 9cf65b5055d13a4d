//! Example: Homography estimation from point correspondences
//!
//! Synthetic points on a plane are mapped through a known homography, a
//! quarter of the matches are replaced by random ones, and the transform is
//! recovered with RANSAC and with LMedS.

use georobust::points::points_from_matrix;
use georobust::*;
use nalgebra::{DMatrix, Matrix3, Point2};
use rand::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Homography Estimation Example ===\n");

    let n_inliers = 60;
    let n_outliers = 20;
    let n_total = n_inliers + n_outliers;

    let truth = Homography::new(Matrix3::new(
        0.98, -0.12, 24.0, 0.09, 1.02, -8.0, 1.5e-4, 0.8e-4, 1.0,
    ));

    // Points are stored one per column here, the layout a 2xN image
    // measurement buffer would have.
    let mut rng = StdRng::seed_from_u64(2024);
    let mut raw_a = DMatrix::<f64>::zeros(2, n_total);
    let mut raw_b = DMatrix::<f64>::zeros(2, n_total);
    for i in 0..n_total {
        let (x, y) = (rng.gen_range(0.0..640.0), rng.gen_range(0.0..480.0));
        raw_a[(0, i)] = x;
        raw_a[(1, i)] = y;
        if i < n_inliers {
            let q = truth
                .transform_point(&Point2::new(x, y))
                .ok_or("synthetic point mapped to infinity")?;
            raw_b[(0, i)] = q.x + rng.gen_range(-0.3..0.3);
            raw_b[(1, i)] = q.y + rng.gen_range(-0.3..0.3);
        } else {
            raw_b[(0, i)] = rng.gen_range(0.0..640.0);
            raw_b[(1, i)] = rng.gen_range(0.0..480.0);
        }
    }

    let points_a = points_from_matrix(&raw_a)?;
    let points_b = points_from_matrix(&raw_b)?;
    println!("Generated {n_inliers} inliers and {n_outliers} outliers");
    println!("True homography:{}", truth.h);

    for method in [HomographyMethod::Ransac, HomographyMethod::Lmeds] {
        let mut mask = vec![false; n_total];
        let result = estimate_homography(
            &points_a,
            &points_b,
            method,
            2.0,
            None,
            Some(&mut mask),
        )?;

        let recovered = mask[..n_inliers].iter().filter(|&&m| m).count();
        let false_positives = mask[n_inliers..].iter().filter(|&&m| m).count();

        println!("--- {method:?} ---");
        println!("Iterations: {}", result.iterations);
        println!(
            "Inliers: {} (true inliers kept: {recovered}/{n_inliers}, outliers accepted: {false_positives})",
            result.inlier_count()
        );
        println!("Estimated homography:{}", result.model.normalized().h);
    }

    Ok(())
}
