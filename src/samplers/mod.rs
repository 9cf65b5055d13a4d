//! Minimal-sample selection.
//!
//! A [`Sampler`] fills a caller-owned index buffer with distinct
//! correspondence indices. The built-in [`UniformRandomSampler`] draws
//! uniformly and rejects indices that would make the sample degenerate.

pub mod uniform;

pub use uniform::UniformRandomSampler;

use crate::types::DataMatrix;

/// Sampler responsible for drawing minimal samples from the data.
pub trait Sampler {
    /// Draw `out_indices.len()` distinct indices into `out_indices`.
    ///
    /// Returns `false` when no acceptable sample was found within
    /// `max_attempts` draws; the buffer contents are then unspecified.
    fn sample(&mut self, data: &DataMatrix, out_indices: &mut [usize], max_attempts: usize)
        -> bool;

    /// Restart the sampler's random sequence.
    fn set_seed(&mut self, seed: u64);
}
