//! Integration tests for the high-level API.
//!
//! Synthetic scenes are generated from seeded random number generators so
//! every run sees the same data.

use approx::assert_relative_eq;
use georobust::*;
use nalgebra::{Matrix3, Point2, Point3, Rotation3, Vector3};
use rand::prelude::*;

fn truth_homography() -> Matrix3<f64> {
    Matrix3::new(0.92, -0.11, 35.0, 0.07, 1.04, -12.0, 2.0e-4, -1.0e-4, 1.0)
}

fn homography_scene(n: usize, seed: u64) -> (Vec<Point2<f64>>, Vec<Point2<f64>>) {
    let h = truth_homography();
    let mut rng = StdRng::seed_from_u64(seed);
    let a: Vec<Point2<f64>> = (0..n)
        .map(|_| Point2::new(rng.gen_range(0.0..640.0), rng.gen_range(0.0..480.0)))
        .collect();
    let b = a
        .iter()
        .map(|p| Homography::new(h).transform_point(p).unwrap())
        .collect();
    (a, b)
}

fn is_outlier_index(i: usize) -> bool {
    matches!(i % 10, 1 | 4 | 7)
}

/// Move the flagged points of set B 20 to 80 pixels away from where they belong.
fn corrupt_homography_scene(b: &mut [Point2<f64>], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for (i, p) in b.iter_mut().enumerate() {
        if is_outlier_index(i) {
            let angle: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
            let radius: f64 = rng.gen_range(20.0..80.0);
            p.x += radius * angle.cos();
            p.y += radius * angle.sin();
        }
    }
}

fn camera_scene(n: usize, focal: f64, seed: u64) -> (Vec<Point2<f64>>, Vec<Point2<f64>>, Matrix3<f64>) {
    let k = Matrix3::new(focal, 0.0, 0.5 * focal, 0.0, focal, 0.4 * focal, 0.0, 0.0, 1.0);
    let r = Rotation3::from_euler_angles(-0.04, 0.15, 0.02);
    let t = Vector3::new(-0.9, 0.1, 0.2);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut a = Vec::with_capacity(n);
    let mut b = Vec::with_capacity(n);
    for _ in 0..n {
        let p = Point3::new(
            rng.gen_range(-2.0..2.0),
            rng.gen_range(-1.5..1.5),
            rng.gen_range(5.0..10.0),
        );
        let pa = k * p.coords;
        let pb = k * (r * p.coords + t);
        a.push(Point2::new(pa.x / pa.z, pa.y / pa.z));
        b.push(Point2::new(pb.x / pb.z, pb.y / pb.z));
    }

    let k_inv = k.try_inverse().unwrap();
    let f = k_inv.transpose() * t.cross_matrix() * r.matrix() * k_inv;
    (a, b, f)
}

/// Push the flagged points of set B 20 to 80 pixels off their epipolar lines.
fn corrupt_camera_scene(a: &[Point2<f64>], b: &mut [Point2<f64>], f: &Matrix3<f64>, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for (i, p) in b.iter_mut().enumerate() {
        if is_outlier_index(i) {
            let line = f * a[i].to_homogeneous();
            let normal = Vector3::new(line.x, line.y, 0.0) / line.x.hypot(line.y);
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let offset: f64 = rng.gen_range(20.0..80.0) * sign;
            p.x += offset * normal.x;
            p.y += offset * normal.y;
        }
    }
}

fn same_up_to_scale(a: &Matrix3<f64>, b: &Matrix3<f64>, tol: f64) -> bool {
    let a = a / a.norm();
    let b = b / b.norm();
    (a - b).norm() < tol || (a + b).norm() < tol
}

fn seeded(seed: u64) -> RansacSettings {
    RansacSettings {
        seed,
        ..RansacSettings::default()
    }
}

#[test]
fn homography_exact_recovery_for_every_method() {
    let (a, b) = homography_scene(30, 1);
    for method in [
        HomographyMethod::Direct,
        HomographyMethod::Ransac,
        HomographyMethod::Lmeds,
    ] {
        let mut mask = vec![false; a.len()];
        let result = estimate_homography(&a, &b, method, 1.0, None, Some(&mut mask)).unwrap();
        assert_relative_eq!(
            result.model.normalized().h,
            truth_homography(),
            epsilon = 1e-6,
            max_relative = 1e-6
        );
        assert!(mask.iter().all(|&m| m), "{method:?}");
        assert_eq!(result.inlier_mask, mask);
    }
}

#[test]
fn homography_with_minimal_four_point_sample() {
    let (a, b) = homography_scene(20, 2);
    let settings = RansacSettings {
        homography_sample_size: 4,
        ..seeded(5)
    };
    let result =
        estimate_homography(&a, &b, HomographyMethod::Ransac, 0.5, Some(settings), None).unwrap();
    assert_eq!(result.inlier_count(), 20);
    assert_relative_eq!(result.model.h, truth_homography(), epsilon = 1e-6, max_relative = 1e-6);
}

#[test]
fn homography_ransac_rejects_outliers() {
    let (a, mut b) = homography_scene(100, 3);
    corrupt_homography_scene(&mut b, 4);

    let mut mask = vec![true; 100];
    let result =
        estimate_homography(&a, &b, HomographyMethod::Ransac, 0.5, Some(seeded(9)), Some(&mut mask))
            .unwrap();

    for (i, &m) in mask.iter().enumerate() {
        assert_eq!(m, !is_outlier_index(i), "correspondence {i}");
    }
    assert_eq!(result.inlier_count(), 70);
    assert_relative_eq!(result.model.h, truth_homography(), epsilon = 1e-6, max_relative = 1e-6);
}

#[test]
fn homography_lmeds_rejects_outliers() {
    let (a, mut b) = homography_scene(100, 6);
    corrupt_homography_scene(&mut b, 7);

    let result =
        estimate_homography(&a, &b, HomographyMethod::Lmeds, 0.0, Some(seeded(2)), None).unwrap();
    for (i, &m) in result.inlier_mask.iter().enumerate() {
        assert_eq!(m, !is_outlier_index(i), "correspondence {i}");
    }
    assert_relative_eq!(result.model.h, truth_homography(), epsilon = 1e-6, max_relative = 1e-6);
}

#[test]
fn homography_is_deterministic_for_a_seed() {
    let (a, mut b) = homography_scene(60, 10);
    corrupt_homography_scene(&mut b, 11);

    for method in [HomographyMethod::Ransac, HomographyMethod::Lmeds] {
        let r1 = estimate_homography(&a, &b, method, 1.0, Some(seeded(42)), None).unwrap();
        let r2 = estimate_homography(&a, &b, method, 1.0, Some(seeded(42)), None).unwrap();
        assert_eq!(r1.model.h, r2.model.h);
        assert_eq!(r1.inlier_mask, r2.inlier_mask);
        assert_eq!(r1.iterations, r2.iterations);
    }
}

#[test]
fn homography_insufficient_data_leaves_mask_untouched() {
    let (a, b) = homography_scene(3, 12);
    let mut mask = vec![true, false, true];
    let err = estimate_homography(&a, &b, HomographyMethod::Ransac, 1.0, None, Some(&mut mask))
        .unwrap_err();
    assert_eq!(
        err,
        EstimationError::InsufficientData {
            required: 4,
            actual: 3
        }
    );
    assert!(!err.is_contract_violation());
    assert_eq!(mask, vec![true, false, true]);
}

#[test]
fn mismatched_inputs_are_contract_violations() {
    let (a, b) = homography_scene(10, 13);
    let err =
        estimate_homography(&a, &b[..9], HomographyMethod::Ransac, 1.0, None, None).unwrap_err();
    assert_eq!(err, EstimationError::InvalidInput(InputError::LengthMismatch { a: 10, b: 9 }));

    let mut mask = vec![false; 11];
    let err = estimate_fundamental_matrix(
        &a,
        &b,
        FundamentalMethod::Ransac,
        1.0,
        None,
        Some(&mut mask),
    )
    .unwrap_err();
    assert!(err.is_contract_violation());
    assert!(mask.iter().all(|&m| !m));
}

#[test]
fn fundamental_from_exactly_seven_points() {
    let (a, b, truth) = camera_scene(7, 2.0, 20);
    let mut mask = vec![false; 7];
    let result = estimate_fundamental_matrix(
        &a,
        &b,
        FundamentalMethod::Ransac,
        1.0,
        None,
        Some(&mut mask),
    )
    .unwrap();

    assert!((1..=3).contains(&result.solutions.len()));
    assert_eq!(result.model, result.solutions[0]);
    assert!(result
        .solutions
        .iter()
        .any(|s| same_up_to_scale(&s.f, &truth, 1e-6)));
    for s in &result.solutions {
        assert!((s.f / s.f.norm()).determinant().abs() < 1e-7);
    }
    assert!(mask.iter().all(|&m| m));
}

#[test]
fn fundamental_exact_recovery_for_every_method() {
    let (a, b, truth) = camera_scene(40, 700.0, 21);
    for method in [
        FundamentalMethod::EightPoint,
        FundamentalMethod::Ransac,
        FundamentalMethod::Lmeds,
    ] {
        let result = estimate_fundamental_matrix(&a, &b, method, 0.5, Some(seeded(3)), None).unwrap();
        assert!(same_up_to_scale(&result.model.f, &truth, 1e-6), "{method:?}");
        assert_eq!(result.inlier_count(), 40, "{method:?}");
        assert_eq!(result.solutions.len(), 1);

        let unit = FundamentalMatrix::new(result.model.f / result.model.f.norm());
        for (pa, pb) in a.iter().zip(&b) {
            let scale = pa.coords.norm() * pb.coords.norm();
            assert!(unit.epipolar_constraint(pa, pb).abs() < 1e-7 * scale, "{method:?}");
        }
    }
}

#[test]
fn fundamental_eight_points_use_the_linear_solver() {
    let (a, b, truth) = camera_scene(8, 700.0, 22);
    let result =
        estimate_fundamental_matrix(&a, &b, FundamentalMethod::Lmeds, 1.0, None, None).unwrap();
    assert_eq!(result.iterations, 1);
    assert!(same_up_to_scale(&result.model.f, &truth, 1e-6));
}

#[test]
fn fundamental_ransac_rejects_outliers() {
    let (a, mut b, truth) = camera_scene(100, 700.0, 23);
    corrupt_camera_scene(&a, &mut b, &truth, 24);

    for solver in [FundamentalSolver::EightPoint, FundamentalSolver::SevenPoint] {
        let settings = RansacSettings {
            fundamental_solver: solver,
            ..seeded(8)
        };
        let mut mask = vec![false; 100];
        let result = estimate_fundamental_matrix(
            &a,
            &b,
            FundamentalMethod::Ransac,
            0.5,
            Some(settings),
            Some(&mut mask),
        )
        .unwrap();

        for (i, &m) in mask.iter().enumerate() {
            assert_eq!(m, !is_outlier_index(i), "{solver:?}: correspondence {i}");
        }
        assert!(same_up_to_scale(&result.model.f, &truth, 1e-6), "{solver:?}");
    }
}

#[test]
fn fundamental_lmeds_rejects_outliers() {
    let (a, mut b, truth) = camera_scene(100, 700.0, 25);
    corrupt_camera_scene(&a, &mut b, &truth, 26);

    let result =
        estimate_fundamental_matrix(&a, &b, FundamentalMethod::Lmeds, 0.0, Some(seeded(4)), None)
            .unwrap();
    assert_eq!(result.inlier_count(), 70);
    assert!(same_up_to_scale(&result.model.f, &truth, 1e-6));
}

#[test]
fn fundamental_is_deterministic_for_a_seed() {
    let (a, mut b, truth) = camera_scene(50, 600.0, 27);
    corrupt_camera_scene(&a, &mut b, &truth, 28);

    for method in [FundamentalMethod::Ransac, FundamentalMethod::Lmeds] {
        let r1 = estimate_fundamental_matrix(&a, &b, method, 1.0, Some(seeded(77)), None).unwrap();
        let r2 = estimate_fundamental_matrix(&a, &b, method, 1.0, Some(seeded(77)), None).unwrap();
        assert_eq!(r1.model, r2.model);
        assert_eq!(r1.inlier_mask, r2.inlier_mask);
    }
}

#[test]
fn fundamental_insufficient_data_leaves_mask_untouched() {
    let (a, b, _) = camera_scene(6, 700.0, 29);
    let mut mask = vec![false, true, false, true, false, true];
    let err = estimate_fundamental_matrix(
        &a,
        &b,
        FundamentalMethod::Ransac,
        1.0,
        None,
        Some(&mut mask),
    )
    .unwrap_err();
    assert_eq!(
        err,
        EstimationError::InsufficientData {
            required: 7,
            actual: 6
        }
    );
    assert_eq!(mask, vec![false, true, false, true, false, true]);
}

#[test]
fn epilines_pass_through_corresponding_points() {
    let (a, b, f) = camera_scene(12, 700.0, 30);
    let model = FundamentalMatrix::new(f);

    let lines_b = compute_correspond_epilines(&a, ImageIndex::First, &model);
    let lines_a = compute_correspond_epilines(&b, ImageIndex::Second, &model);
    for i in 0..12 {
        assert!(lines_b[i].dot(&b[i].to_homogeneous()).abs() < 1e-6);
        assert!(lines_a[i].dot(&a[i].to_homogeneous()).abs() < 1e-6);
    }
}
