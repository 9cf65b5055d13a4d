//! Miscellaneous utilities: the estimator-owned random generator and a
//! closed-form real cubic solver.

use rand::distributions::{Distribution, Uniform};
use rand::prelude::*;

/// Uniform index generator backed by a seedable `StdRng`.
///
/// Each estimator owns one; it is plain mutable state and must not be
/// shared between concurrent calls.
#[derive(Debug, Clone)]
pub struct UniformRandomGenerator {
    rng: StdRng,
}

impl Default for UniformRandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformRandomGenerator {
    /// Construct with an entropy seed.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Construct with a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Restart the sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Draw an index uniformly from `[0, upper)`. `upper` must be positive.
    pub fn next_index(&mut self, upper: usize) -> usize {
        Uniform::new(0, upper).sample(&mut self.rng)
    }
}

/// Real roots of `c[0]·x³ + c[1]·x² + c[2]·x + c[3] = 0`.
///
/// Degrades to the quadratic and linear cases when leading coefficients
/// vanish. Roots are written to `roots`; the count (0 to 3) is returned.
/// A polynomial that is identically zero reports no roots. Each cubic root
/// receives one Newton step.
pub fn solve_cubic(c: [f64; 4], roots: &mut [f64; 3]) -> usize {
    let [a0, a1, a2, a3] = c;

    if a0 == 0.0 {
        if a1 == 0.0 {
            if a2 == 0.0 {
                return 0;
            }
            roots[0] = -a3 / a2;
            return 1;
        }
        let d = a2 * a2 - 4.0 * a1 * a3;
        if d < 0.0 {
            return 0;
        }
        let d = d.sqrt();
        let q = -0.5 * (a2 + if a2 < 0.0 { -d } else { d });
        if q == 0.0 {
            // a2 == 0 and a3 == 0: double root at the origin.
            roots[0] = 0.0;
            return 1;
        }
        roots[0] = q / a1;
        if d == 0.0 {
            return 1;
        }
        roots[1] = a3 / q;
        return 2;
    }

    let inv = 1.0 / a0;
    let (b, c1, d) = (a1 * inv, a2 * inv, a3 * inv);

    let q = (b * b - 3.0 * c1) / 9.0;
    let r = (2.0 * b * b * b - 9.0 * b * c1 + 27.0 * d) / 54.0;
    let q3 = q * q * q;
    let disc = q3 - r * r;

    let n = if disc >= 0.0 && q > 0.0 {
        let ratio = (r / q3.sqrt()).clamp(-1.0, 1.0);
        let theta = ratio.acos();
        let t0 = -2.0 * q.sqrt();
        let shift = b / 3.0;
        roots[0] = t0 * (theta / 3.0).cos() - shift;
        roots[1] = t0 * ((theta + 2.0 * std::f64::consts::PI) / 3.0).cos() - shift;
        roots[2] = t0 * ((theta - 2.0 * std::f64::consts::PI) / 3.0).cos() - shift;
        3
    } else {
        let s = (-disc).max(0.0).sqrt();
        let mut e = (s + r.abs()).cbrt();
        if r > 0.0 {
            e = -e;
        }
        roots[0] = if e != 0.0 { e + q / e } else { 0.0 } - b / 3.0;
        1
    };

    for root in roots.iter_mut().take(n) {
        let x = *root;
        let f = ((x + b) * x + c1) * x + d;
        let df = (3.0 * x + 2.0 * b) * x + c1;
        if df.abs() > f64::EPSILON {
            *root -= f / df;
        }
    }

    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sorted(roots: &[f64]) -> Vec<f64> {
        let mut v = roots.to_vec();
        v.sort_by(f64::total_cmp);
        v
    }

    #[test]
    fn deterministic_with_same_seed() {
        let mut rng1 = UniformRandomGenerator::from_seed(42);
        let mut rng2 = UniformRandomGenerator::from_seed(42);

        let a1: Vec<usize> = (0..10).map(|_| rng1.next_index(100)).collect();
        let a2: Vec<usize> = (0..10).map(|_| rng2.next_index(100)).collect();
        assert_eq!(a1, a2);
        assert!(a1.iter().all(|&v| v < 100));
    }

    #[test]
    fn reseed_restarts_sequence() {
        let mut rng = UniformRandomGenerator::from_seed(7);
        let first: Vec<usize> = (0..5).map(|_| rng.next_index(1000)).collect();
        rng.reseed(7);
        let second: Vec<usize> = (0..5).map(|_| rng.next_index(1000)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn cubic_with_three_real_roots() {
        // (x - 1)(x + 2)(x - 3) = x^3 - 2x^2 - 5x + 6
        let mut roots = [0.0; 3];
        let n = solve_cubic([1.0, -2.0, -5.0, 6.0], &mut roots);
        assert_eq!(n, 3);
        let r = sorted(&roots);
        assert_relative_eq!(r[0], -2.0, epsilon = 1e-10);
        assert_relative_eq!(r[1], 1.0, epsilon = 1e-10);
        assert_relative_eq!(r[2], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn cubic_with_one_real_root() {
        // (x - 2)(x^2 + 1) = x^3 - 2x^2 + x - 2
        let mut roots = [0.0; 3];
        let n = solve_cubic([2.0, -4.0, 2.0, -4.0], &mut roots);
        assert_eq!(n, 1);
        assert_relative_eq!(roots[0], 2.0, epsilon = 1e-10);
    }

    #[test]
    fn cubic_triple_root() {
        // (x - 1)^3
        let mut roots = [0.0; 3];
        let n = solve_cubic([1.0, -3.0, 3.0, -1.0], &mut roots);
        assert!(n >= 1);
        for r in roots.iter().take(n) {
            assert_relative_eq!(*r, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn degenerate_leading_coefficients() {
        let mut roots = [0.0; 3];
        // 2x^2 - 8 = 0
        let n = solve_cubic([0.0, 2.0, 0.0, -8.0], &mut roots);
        assert_eq!(n, 2);
        let r = sorted(&roots[..2]);
        assert_relative_eq!(r[0], -2.0, epsilon = 1e-12);
        assert_relative_eq!(r[1], 2.0, epsilon = 1e-12);

        // 4x + 2 = 0
        assert_eq!(solve_cubic([0.0, 0.0, 4.0, 2.0], &mut roots), 1);
        assert_relative_eq!(roots[0], -0.5);

        // x^2 + 1 = 0
        assert_eq!(solve_cubic([0.0, 1.0, 0.0, 1.0], &mut roots), 0);
        // 0 = 0
        assert_eq!(solve_cubic([0.0; 4], &mut roots), 0);
    }
}
