//! Example: Fundamental matrix estimation from point correspondences
//!
//! A random scene is viewed by two pinhole cameras. Some matches are
//! corrupted, the fundamental matrix is estimated with RANSAC, and the
//! epipolar lines of a few inliers are printed together with the distance
//! of their partners from those lines.

use georobust::*;
use nalgebra::{Matrix3, Point2, Rotation3, Vector3};
use rand::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Fundamental Matrix Estimation Example ===\n");

    let n_points = 80;
    let n_outliers = 20;
    let n_total = n_points + n_outliers;

    let focal = 800.0;
    let k = Matrix3::new(focal, 0.0, 320.0, 0.0, focal, 240.0, 0.0, 0.0, 1.0);
    let r = Rotation3::from_euler_angles(0.02, -0.1, 0.01);
    let t = Vector3::new(-1.0, 0.05, 0.1);

    let mut rng = StdRng::seed_from_u64(7);
    let mut points_a = Vec::with_capacity(n_total);
    let mut points_b = Vec::with_capacity(n_total);
    for i in 0..n_total {
        let p = Vector3::new(
            rng.gen_range(-3.0..3.0),
            rng.gen_range(-2.0..2.0),
            rng.gen_range(6.0..12.0),
        );
        let pa = k * p;
        let pb = k * (r * p + t);
        points_a.push(Point2::new(pa.x / pa.z, pa.y / pa.z));
        if i < n_points {
            points_b.push(Point2::new(
                pb.x / pb.z + rng.gen_range(-0.2..0.2),
                pb.y / pb.z + rng.gen_range(-0.2..0.2),
            ));
        } else {
            points_b.push(Point2::new(rng.gen_range(0.0..640.0), rng.gen_range(0.0..480.0)));
        }
    }
    println!("Generated {n_points} inliers and {n_outliers} outliers");

    let settings = RansacSettings {
        seed: 7,
        ..RansacSettings::default()
    };
    let result = estimate_fundamental_matrix(
        &points_a,
        &points_b,
        FundamentalMethod::Ransac,
        1.0,
        Some(settings),
        None,
    )?;

    let false_positives = result.inlier_mask[n_points..].iter().filter(|&&m| m).count();
    println!("Iterations: {}", result.iterations);
    println!(
        "Inliers: {} ({false_positives} of them corrupted)",
        result.inlier_count()
    );
    let f = result.model.f / result.model.f.norm();
    println!("Estimated F (unit norm):{f}");
    println!("det(F) = {:e}\n", f.determinant());

    let sample: Vec<usize> = result.inliers().into_iter().take(5).collect();
    let firsts: Vec<Point2<f64>> = sample.iter().map(|&i| points_a[i]).collect();
    let lines = compute_correspond_epilines(&firsts, ImageIndex::First, &result.model);
    for (&i, line) in sample.iter().zip(&lines) {
        let distance = line.dot(&points_b[i].to_homogeneous()).abs();
        println!(
            "match {i:>2}: line ({:+.4}, {:+.4}, {:+.1}), distance {distance:.3} px",
            line.x, line.y, line.z
        );
    }

    Ok(())
}
