// koopman_core/src/utils/prng.rs

use nalgebra::DMatrix;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// A newtype wrapper around `ChaCha8Rng`.
/// Every random draw a fitter makes goes through its own instance of this, so
/// two fitters never share generator state.
#[derive(Debug, Clone)]
pub struct OperatorRng(pub ChaCha8Rng);

impl OperatorRng {
    /// Deterministic when a seed is given, entropy-seeded otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(ChaCha8Rng::seed_from_u64(seed)),
            None => Self(ChaCha8Rng::from_entropy()),
        }
    }

    /// An `nrows x ncols` matrix of independent `N(0, 1)` draws scaled by `scale`.
    pub fn gaussian_matrix(&mut self, nrows: usize, ncols: usize, scale: f64) -> DMatrix<f64> {
        DMatrix::from_fn(nrows, ncols, |_, _| {
            let draw: f64 = self.0.sample(StandardNormal);
            draw * scale
        })
    }
}
