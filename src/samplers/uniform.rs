//! Uniform random sampler drawing minimal samples without replacement.

use super::Sampler;
use crate::degeneracy::{is_partial_sample_valid, is_sample_valid};
use crate::types::DataMatrix;
use crate::utils::UniformRandomGenerator;

/// Uniform random sampler with collinearity rejection.
///
/// In incremental mode (the default) every drawn index is checked against
/// the points already in the sample and rejected on its own; otherwise the
/// sample is assembled first and checked once as a whole.
#[derive(Debug, Clone)]
pub struct UniformRandomSampler {
    rng: UniformRandomGenerator,
    check_partial_subsets: bool,
}

impl Default for UniformRandomSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformRandomSampler {
    /// Construct a new sampler with a random seed.
    pub fn new() -> Self {
        Self {
            rng: UniformRandomGenerator::new(),
            check_partial_subsets: true,
        }
    }

    /// Construct a sampler from a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: UniformRandomGenerator::from_seed(seed),
            check_partial_subsets: true,
        }
    }

    pub fn with_partial_checks(mut self, enabled: bool) -> Self {
        self.check_partial_subsets = enabled;
        self
    }

    /// Fill `out` index by index. Returns the number of accepted indices.
    fn fill(&mut self, data: &DataMatrix, out: &mut [usize], max_attempts: usize) -> usize {
        let n = data.nrows();
        let mut filled = 0;
        let mut attempts = 0;

        while filled < out.len() && attempts < max_attempts {
            attempts += 1;
            let candidate = self.rng.next_index(n);
            if out[..filled].contains(&candidate) {
                continue;
            }
            out[filled] = candidate;
            if self.check_partial_subsets && !is_partial_sample_valid(data, &out[..=filled]) {
                continue;
            }
            filled += 1;
            attempts = 0;
        }
        filled
    }
}

impl Sampler for UniformRandomSampler {
    fn sample(
        &mut self,
        data: &DataMatrix,
        out_indices: &mut [usize],
        max_attempts: usize,
    ) -> bool {
        let sample_size = out_indices.len();
        if sample_size == 0 || sample_size > data.nrows() {
            return false;
        }

        if self.check_partial_subsets {
            return self.fill(data, out_indices, max_attempts) == sample_size;
        }

        for _ in 0..max_attempts.max(1) {
            if self.fill(data, out_indices, max_attempts) < sample_size {
                return false;
            }
            if is_sample_valid(data, out_indices) {
                return true;
            }
        }
        false
    }

    fn set_seed(&mut self, seed: u64) {
        self.rng.reseed(seed);
    }
}
